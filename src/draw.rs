// Window + on-screen overlays.
// 1) A window showing the HUD strip above the drawing surface.
// 2) Pointer and key input turned into gesture phases and commands.
// 3) A crosshair and a tiny 5x7 bitmap font, drawn into the per-frame screen buffer
//    (never into the surface itself).

use crate::error::Error;
use crate::raster::put_pixel;
use crate::types::{Rgb, Surface, Tool};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// Height of the HUD strip above the surface, in pixels.
pub const HUD_HEIGHT: usize = 16;

/// Pointer activity since the last frame, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerPhase {
    Down(f32, f32),
    Move(f32, f32),
    Up,
}

/// What a key press asks the app to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SelectTool(Tool),
    Narrower,
    Wider,
    Clear,
    Export,
    ShowLayers,
    NextView,
    PrevView,
    BackToDrawing,
}

const KEYMAP: &[(Key, Command)] = &[
    (Key::Key1, Command::SelectTool(Tool::Pen)),
    (Key::Key2, Command::SelectTool(Tool::Rect)),
    (Key::Key3, Command::SelectTool(Tool::Circle)),
    (Key::Key4, Command::SelectTool(Tool::Line)),
    (Key::LeftBracket, Command::Narrower),
    (Key::RightBracket, Command::Wider),
    (Key::X, Command::Clear),
    (Key::S, Command::Export),
    (Key::Enter, Command::ShowLayers),
    (Key::Right, Command::NextView),
    (Key::Left, Command::PrevView),
    (Key::Backspace, Command::BackToDrawing),
];

pub struct Drawer {
    window: Window,
    button_was_down: bool,
    last_pos: Option<(f32, f32)>,
}

impl Drawer {
    /// Window sized to fit the HUD strip plus the surface.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height + HUD_HEIGHT, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, button_was_down: false, last_pos: None })
    }

    pub fn present(&mut self, screen: &Surface) -> Result<(), Error> {
        self.window
            .update_with_buffer(&screen.pixels, screen.width, screen.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Raw mouse position; may lie outside the window while a button is held.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Pass)
    }

    /// Left-button edges and motion since the previous call, oldest first.
    pub fn pointer_phases(&mut self) -> Vec<PointerPhase> {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.mouse_pos();
        let mut phases = Vec::with_capacity(2);
        match (self.button_was_down, down, pos) {
            (false, true, Some((x, y))) => phases.push(PointerPhase::Down(x, y)),
            (true, true, Some((x, y))) if self.last_pos != pos => phases.push(PointerPhase::Move(x, y)),
            (true, false, _) => {
                // the final position counts before the release
                if let Some((x, y)) = pos.filter(|_| self.last_pos != pos) {
                    phases.push(PointerPhase::Move(x, y));
                }
                phases.push(PointerPhase::Up);
            }
            _ => {}
        }
        self.button_was_down = down && (pos.is_some() || self.button_was_down);
        self.last_pos = pos;
        phases
    }

    /// Key presses this frame, without auto-repeat.
    pub fn commands(&self) -> Vec<Command> {
        KEYMAP
            .iter()
            .filter(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .map(|&(_, cmd)| cmd)
            .collect()
    }
}

/* ---------- Overlays ---------- */

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(fb: &mut Surface, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// A "+" with a small gap at the center, following the pointer.
pub fn draw_crosshair(fb: &mut Surface, cx: i32, cy: i32, size: i32, color: Rgb) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/// Return a 5x7 glyph bitmap; each u8 is a row, bit 4 = leftmost pixel.
/// Lowercase letters render as uppercase.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '<' => g!(0b00010,0b00100,0b01000,0b10000,0b01000,0b00100,0b00010),
        '>' => g!(0b01000,0b00100,0b00010,0b00001,0b00010,0b00100,0b01000),

        _ => None,
    }
}

/// Draw one glyph with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut Surface, x: i32, y: i32, ch: char, color: Rgb) {
    let Some(rows) = glyph5x7(ch) else {
        return;
    };
    for (offset, ink) in [(1, 0x00_00_00_00), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if rowbits & (1 << (4 - rx)) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, ink);
                }
            }
        }
    }
}

/// Draw a text string; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut Surface, mut x: i32, y: i32, text: &str, color: Rgb) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}
