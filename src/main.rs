// What you SEE:
// • A white canvas under a small HUD strip. Hold Left Mouse to draw.
// • 1 pen, 2 rectangle, 3 circle, 4 line. [ and ] change stroke width.
// • X clears, S saves the drawing as PNG.
// • Enter shows the analysis layers; Left/Right flip views; Backspace returns.
// • ESC quits.

mod blend;
mod compositor;
mod config;
mod draw;
mod error;
mod files;
mod logging;
mod mode;
mod pointer;
mod preview;
mod raster;
mod stroke;
mod types;
mod views;

use clap::Parser;
use config::{Args, Config};
use draw::{Command, Drawer, HUD_HEIGHT, PointerPhase, draw_crosshair, draw_text_5x7};
use error::Error;
use mode::{Mode, ModeController};
use pointer::{BoundingRect, PointerEvent};
use tracing::{info, warn};
use types::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, Surface, ToolState};

const HUD_BG: u32 = 0x00_30_30_30;
const HUD_TEXT: u32 = 0x00_FF_FF_FF;
const CROSSHAIR: u32 = 0x00_FF_CC_33;

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let config = config::resolve(&args)?;
    logging::init(&config.log_file_path)?;
    info!(?config, "configuration resolved");

    let result = run(&config);
    if let Err(err) = &result {
        tracing::error!(error = %err, "exiting with error");
    }
    result
}

fn run(config: &Config) -> Result<(), Error> {
    let mut drawer = Drawer::new("Sketch Lens", config.width, config.height)?;
    let mut app = ModeController::new(config.width, config.height, config.background);
    let mut tool: ToolState = config.tool;

    // The surface sits right below the HUD strip.
    let rect = BoundingRect {
        left: 0.0,
        top: HUD_HEIGHT as f32,
        width: config.width as f32,
        height: config.height as f32,
    };

    // What actually goes to the window: HUD strip + surface + crosshair, rebuilt each frame.
    let mut screen = Surface::new(config.width, config.height + HUD_HEIGHT, HUD_BG);

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Commands (tool picks, mode triggers) */
        for cmd in drawer.commands() {
            handle_command(cmd, &mut app, &mut tool, config);
        }

        /* 2) Pointer: only the Drawing mode listens, the controller enforces it. */
        for phase in drawer.pointer_phases() {
            match phase {
                PointerPhase::Down(x, y) => app.pointer_down(&PointerEvent::mouse(x, y), &rect, &tool),
                PointerPhase::Move(x, y) => app.pointer_move(&PointerEvent::mouse(x, y), &rect, &tool),
                PointerPhase::Up => app.pointer_up(),
            }
        }

        /* 3) Finished layer decodes land on the surface here. */
        app.pump();

        /* 4) Build the frame */
        screen.pixels[..config.width * HUD_HEIGHT].fill(HUD_BG);
        screen.pixels[config.width * HUD_HEIGHT..].copy_from_slice(&app.surface().pixels);
        draw_text_5x7(&mut screen, 6, 4, &hud_text(&app, &tool), HUD_TEXT);
        if app.mode() == Mode::Drawing {
            if let Some((mx, my)) = drawer.mouse_pos().filter(|&(x, y)| rect.contains(x, y)) {
                draw_crosshair(&mut screen, mx as i32, my as i32, 8, CROSSHAIR);
            }
        }

        /* 5) Present */
        drawer.present(&screen)?;
    }

    Ok(())
}

fn handle_command(cmd: Command, app: &mut ModeController, tool: &mut ToolState, config: &Config) {
    match cmd {
        Command::SelectTool(t) => tool.tool = t,
        Command::Narrower => tool.stroke_width = (tool.stroke_width - 1.0).max(MIN_STROKE_WIDTH),
        Command::Wider => tool.stroke_width = (tool.stroke_width + 1.0).min(MAX_STROKE_WIDTH),
        Command::Clear => app.clear(),
        Command::Export => {
            if let Err(err) = files::export_png(app.surface(), &config.export_path) {
                warn!(error = %err, "export failed");
            }
        }
        Command::ShowLayers => match files::read_layer_set(&config.layers) {
            Ok(Some(layers)) => {
                app.enter_viewing(layers);
            }
            Ok(None) => warn!("no base layer configured; staying in drawing mode"),
            Err(err) => warn!(error = %err, "layers unavailable; staying in drawing mode"),
        },
        Command::NextView => {
            app.next_view();
        }
        Command::PrevView => {
            app.prev_view();
        }
        Command::BackToDrawing => app.return_to_drawing(),
    }
}

fn hud_text(app: &ModeController, tool: &ToolState) -> String {
    match app.mode() {
        Mode::Drawing => format!("DRAWING | {} | W: {}", tool.tool, tool.stroke_width as u32),
        Mode::Viewing => {
            let mut text = format!(
                "VIEWING | <- {} {}/{} ->",
                app.current_view().label(),
                app.view_index() + 1,
                app.view_count()
            );
            if app.is_compositing() {
                text.push_str(" DECODING");
            }
            text
        }
    }
}
