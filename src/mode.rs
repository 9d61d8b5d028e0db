// Top-level Drawing / Viewing state machine. It owns the surface and lends it
// to exactly one writer at a time: the pen or the shape preview while Drawing,
// the compositor while Viewing. Inputs for the inactive half are ignored.

use crate::compositor::{CompositeEvent, Generation, LayerCompositor, LayerSet};
use crate::pointer::{BoundingRect, PointerEvent, map_press, map_to_surface};
use crate::preview::ShapePreviewController;
use crate::stroke::StrokeRenderer;
use crate::types::{Rgb, Surface, Tool, ToolState};
use crate::views::{View, ViewCycler};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Drawing,
    Viewing,
}

pub struct ModeController {
    mode: Mode,
    surface: Surface,
    background: Rgb,
    /// Tool that owns the gesture in progress, fixed at pointer-down.
    gesture: Option<Tool>,
    pen: StrokeRenderer,
    shapes: ShapePreviewController,
    compositor: LayerCompositor,
    views: ViewCycler,
    layers: Option<LayerSet>,
}

impl ModeController {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            mode: Mode::Drawing,
            surface: Surface::new(width, height, background),
            background,
            gesture: None,
            pen: StrokeRenderer::new(),
            shapes: ShapePreviewController::new(),
            compositor: LayerCompositor::new(background),
            views: ViewCycler::default(),
            layers: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn view_index(&self) -> usize {
        self.views.index()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn current_view(&self) -> View {
        self.views.current()
    }

    /// A composite for the current view is still decoding.
    pub fn is_compositing(&self) -> bool {
        self.compositor.is_pending()
    }

    /* ---------- Drawing inputs ---------- */

    /// Start a gesture with the current tool. Shapes snapshot the surface
    /// here; the pen only records its first point.
    pub fn pointer_down(&mut self, event: &PointerEvent, rect: &BoundingRect, tool: &ToolState) {
        if self.mode != Mode::Drawing {
            return;
        }
        // presses on the HUD or outside the window never start a gesture
        let Some(pos) = map_press(event, rect) else {
            return;
        };
        // a down without an up (pointer left the window) closes the old gesture first
        self.finish_gesture();
        if tool.tool.is_shape() {
            self.shapes.begin(&self.surface, tool.tool, pos);
        } else {
            self.pen.begin(pos);
        }
        self.gesture = Some(tool.tool);
    }

    /// Feed the gesture in progress. The position may be off the surface.
    pub fn pointer_move(&mut self, event: &PointerEvent, rect: &BoundingRect, tool: &ToolState) {
        if self.mode != Mode::Drawing {
            return;
        }
        let (Some(active), Some(pos)) = (self.gesture, map_to_surface(event, rect)) else {
            return;
        };
        if active.is_shape() {
            self.shapes.update(&mut self.surface, tool, pos);
        } else {
            self.pen.extend(&mut self.surface, tool, pos);
        }
    }

    pub fn pointer_up(&mut self) {
        if self.mode != Mode::Drawing {
            return;
        }
        self.finish_gesture();
    }

    fn finish_gesture(&mut self) {
        match self.gesture.take() {
            Some(tool) if tool.is_shape() => self.shapes.end(),
            Some(_) => self.pen.end(),
            None => {}
        }
    }

    /// Wipe the drawing back to the baseline background.
    pub fn clear(&mut self) {
        if self.mode != Mode::Drawing {
            return;
        }
        self.abort_gesture();
        self.surface.fill(self.background);
        debug!("surface cleared");
    }

    fn abort_gesture(&mut self) {
        self.gesture = None;
        self.shapes.cancel();
        self.pen.end();
    }

    /* ---------- Mode transitions ---------- */

    /// Analysis result arrived: keep the layers, show view 0.
    pub fn enter_viewing(&mut self, layers: LayerSet) -> Generation {
        self.abort_gesture();
        self.mode = Mode::Viewing;
        self.views.reset();
        let generation = self.compositor.request(&self.views.current().select(&layers));
        self.layers = Some(layers);
        info!(view = self.views.current().label(), "entered viewing");
        generation
    }

    /// Back to a blank drawing.
    pub fn return_to_drawing(&mut self) {
        if self.mode != Mode::Viewing {
            return;
        }
        self.compositor.invalidate();
        self.layers = None;
        self.views.reset();
        self.surface.fill(self.background);
        self.mode = Mode::Drawing;
        info!("returned to drawing");
    }

    /* ---------- Viewing inputs ---------- */

    /// Cycle forward and request the new view's composite. `None` while Drawing.
    pub fn next_view(&mut self) -> Option<Generation> {
        if self.mode != Mode::Viewing {
            return None;
        }
        let view = self.views.next();
        self.show(view)
    }

    pub fn prev_view(&mut self) -> Option<Generation> {
        if self.mode != Mode::Viewing {
            return None;
        }
        let view = self.views.prev();
        self.show(view)
    }

    fn show(&mut self, view: View) -> Option<Generation> {
        let layers = self.layers.as_ref()?;
        debug!(view = view.label(), index = self.views.index(), "view changed");
        Some(self.compositor.request(&view.select(layers)))
    }

    /// Apply any finished decodes. Call once per event-loop turn.
    pub fn pump(&mut self) -> Option<CompositeEvent> {
        self.compositor.poll(&mut self.surface)
    }

    #[cfg(test)]
    pub(crate) fn wait_for_composite(&mut self, timeout: std::time::Duration) -> CompositeEvent {
        self.compositor.wait(&mut self.surface, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::test_support::solid_png;
    use std::time::Duration;

    const BG: Rgb = 0x00_FF_FF_FF;
    const RECT: BoundingRect = BoundingRect { left: 0.0, top: 16.0, width: 64.0, height: 64.0 };
    const TIMEOUT: Duration = Duration::from_secs(10);

    fn at(x: f32, y: f32) -> PointerEvent {
        // window coordinates: the surface starts 16px down
        PointerEvent::mouse(x, y + 16.0)
    }

    fn tool(kind: Tool, color: Rgb) -> ToolState {
        ToolState { tool: kind, color, stroke_width: 2.0 }
    }

    fn layers() -> LayerSet {
        LayerSet::new(solid_png(4, 4, [255, 0, 0, 255]))
            .with_mid(solid_png(4, 4, [0, 255, 0, 255]), 1.0)
            .with_top(solid_png(4, 4, [0, 0, 255, 255]))
    }

    fn gesture(ctrl: &mut ModeController, t: &ToolState, points: &[(f32, f32)]) {
        let (first, rest) = points.split_first().expect("at least one point");
        ctrl.pointer_down(&at(first.0, first.1), &RECT, t);
        for &(x, y) in rest {
            ctrl.pointer_move(&at(x, y), &RECT, t);
        }
        ctrl.pointer_up();
    }

    #[test]
    fn starts_in_drawing_with_blank_surface() {
        let ctrl = ModeController::new(64, 64, BG);
        assert_eq!(ctrl.mode(), Mode::Drawing);
        assert_eq!(ctrl.view_index(), 0);
        assert!(ctrl.surface().pixels.iter().all(|&p| p == BG));
    }

    #[test]
    fn pen_strokes_survive_a_later_shape_gesture() {
        let mut ctrl = ModeController::new(64, 64, BG);
        let pen = tool(Tool::Pen, 0x00_FF_00_00);
        gesture(&mut ctrl, &pen, &[(5.0, 5.0), (5.0, 30.0)]);
        assert_eq!(ctrl.surface().get(5, 20), Some(pen.color));

        let rect = tool(Tool::Rect, 0x00_00_00_FF);
        gesture(&mut ctrl, &rect, &[(40.0, 40.0), (60.0, 60.0), (50.0, 50.0)]);
        assert_eq!(ctrl.surface().get(5, 20), Some(pen.color), "pen stroke was rolled back");
        assert_eq!(ctrl.surface().get(45, 45), Some(rect.color));
        assert_eq!(ctrl.surface().get(55, 55), Some(BG), "earlier preview leaked");
    }

    #[test]
    fn gesture_keeps_the_tool_it_started_with() {
        let mut ctrl = ModeController::new(64, 64, BG);
        let line = tool(Tool::Line, 0x00_00_80_00);
        ctrl.pointer_down(&at(10.0, 10.0), &RECT, &line);
        // switching to pen mid-gesture does not turn the preview into ink
        let pen = tool(Tool::Pen, 0x00_00_80_00);
        ctrl.pointer_move(&at(50.0, 10.0), &RECT, &pen);
        ctrl.pointer_move(&at(10.0, 50.0), &RECT, &pen);
        ctrl.pointer_up();
        assert_eq!(ctrl.surface().get(40, 10), Some(BG));
        assert_eq!(ctrl.surface().get(10, 40), Some(line.color));
    }

    #[test]
    fn press_above_the_surface_starts_no_gesture() {
        let mut ctrl = ModeController::new(64, 64, BG);
        let pen = tool(Tool::Pen, 0);
        // window y = 5 is inside the HUD strip
        ctrl.pointer_down(&PointerEvent::mouse(10.0, 5.0), &RECT, &pen);
        ctrl.pointer_move(&PointerEvent::mouse(10.0, 40.0), &RECT, &pen);
        ctrl.pointer_up();
        assert!(ctrl.surface().pixels.iter().all(|&p| p == BG));

        // the same drag started on the surface inks as usual
        gesture(&mut ctrl, &pen, &[(10.0, 0.0), (10.0, 24.0)]);
        assert_eq!(ctrl.surface().get(10, 0), Some(0));
    }

    #[test]
    fn moves_without_a_gesture_paint_nothing() {
        let mut ctrl = ModeController::new(64, 64, BG);
        let pen = tool(Tool::Pen, 0);
        ctrl.pointer_move(&at(10.0, 10.0), &RECT, &pen);
        ctrl.pointer_move(&at(20.0, 20.0), &RECT, &pen);
        assert!(ctrl.surface().pixels.iter().all(|&p| p == BG));
    }

    #[test]
    fn viewing_ignores_pointer_input_and_drawing_ignores_view_keys() {
        let mut ctrl = ModeController::new(64, 64, BG);
        assert_eq!(ctrl.next_view(), None);
        assert_eq!(ctrl.view_index(), 0);

        let g = ctrl.enter_viewing(layers());
        assert_eq!(ctrl.wait_for_composite(TIMEOUT), CompositeEvent::Drawn(g));
        let shown = ctrl.surface().clone();
        gesture(&mut ctrl, &tool(Tool::Pen, 0), &[(1.0, 1.0), (60.0, 60.0)]);
        ctrl.clear();
        assert_eq!(ctrl.surface(), &shown);
    }

    #[test]
    fn cycling_views_composites_the_matching_layers() {
        let mut ctrl = ModeController::new(16, 16, BG);
        let g = ctrl.enter_viewing(layers());
        assert!(ctrl.is_compositing());
        assert_eq!(ctrl.wait_for_composite(TIMEOUT), CompositeEvent::Drawn(g));
        assert!(!ctrl.is_compositing());
        assert_eq!(ctrl.surface().get(3, 3), Some(0x00_FF_00_00));

        let g = ctrl.next_view().expect("viewing");
        assert_eq!(ctrl.current_view(), View::Heatmap);
        assert_eq!(ctrl.wait_for_composite(TIMEOUT), CompositeEvent::Drawn(g));
        assert_eq!(ctrl.surface().get(3, 3), Some(0x00_00_FF_00));

        let g = ctrl.next_view().expect("viewing");
        assert_eq!(ctrl.wait_for_composite(TIMEOUT), CompositeEvent::Drawn(g));
        assert_eq!(ctrl.surface().get(3, 3), Some(0x00_00_00_FF));

        ctrl.next_view();
        assert_eq!(ctrl.view_index(), 0);
        ctrl.prev_view();
        assert_eq!(ctrl.view_index(), 2);
    }

    #[test]
    fn rapid_view_changes_only_draw_the_last_one() {
        let mut ctrl = ModeController::new(16, 16, BG);
        ctrl.enter_viewing(layers());
        ctrl.next_view();
        let last = ctrl.next_view().expect("viewing");
        assert_eq!(ctrl.wait_for_composite(TIMEOUT), CompositeEvent::Drawn(last));
        std::thread::sleep(Duration::from_millis(50));
        ctrl.pump();
        assert!(ctrl.surface().pixels.iter().all(|&p| p == 0x00_00_00_FF));
    }

    #[test]
    fn entering_viewing_always_starts_at_view_zero() {
        let mut ctrl = ModeController::new(16, 16, BG);
        ctrl.enter_viewing(layers());
        ctrl.next_view();
        ctrl.next_view();
        assert_eq!(ctrl.view_index(), 2);
        ctrl.return_to_drawing();

        ctrl.enter_viewing(layers());
        assert_eq!(ctrl.view_index(), 0);
        assert_eq!(ctrl.current_view(), View::Cleaned);

        // re-entering while already viewing resets as well
        ctrl.next_view();
        ctrl.enter_viewing(layers());
        assert_eq!(ctrl.view_index(), 0);
    }

    #[test]
    fn returning_to_drawing_clears_and_blocks_late_composites() {
        let mut ctrl = ModeController::new(16, 16, BG);
        ctrl.enter_viewing(layers());
        ctrl.return_to_drawing();
        assert_eq!(ctrl.mode(), Mode::Drawing);
        assert_eq!(ctrl.view_index(), 0);
        assert!(ctrl.surface().pixels.iter().all(|&p| p == BG));

        assert_eq!(ctrl.wait_for_composite(Duration::from_millis(300)), CompositeEvent::Waiting);
        assert!(ctrl.surface().pixels.iter().all(|&p| p == BG));

        let pen = tool(Tool::Pen, 0x00_12_34_56);
        gesture(&mut ctrl, &pen, &[(2.0, 2.0), (12.0, 2.0)]);
        assert_eq!(ctrl.surface().get(8, 2), Some(pen.color));
    }

    #[test]
    fn entering_viewing_mid_gesture_drops_the_preview_snapshot() {
        let mut ctrl = ModeController::new(32, 32, BG);
        let rect = tool(Tool::Rect, 0);
        ctrl.pointer_down(&at(2.0, 2.0), &RECT, &rect);
        ctrl.pointer_move(&at(20.0, 20.0), &RECT, &rect);
        ctrl.enter_viewing(layers());
        ctrl.return_to_drawing();
        // no gesture survives the round trip
        ctrl.pointer_move(&at(8.0, 8.0), &RECT, &rect);
        assert!(ctrl.surface().pixels.iter().all(|&p| p == BG));
    }

    #[test]
    fn clear_wipes_the_drawing() {
        let mut ctrl = ModeController::new(32, 32, BG);
        gesture(&mut ctrl, &tool(Tool::Line, 0), &[(1.0, 1.0), (30.0, 30.0)]);
        assert!(ctrl.surface().pixels.iter().any(|&p| p != BG));
        ctrl.clear();
        assert!(ctrl.surface().pixels.iter().all(|&p| p == BG));
    }
}
