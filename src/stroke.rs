// Freehand pen: every move paints one round-capped segment straight into the
// surface. Nothing is ever rolled back.

use crate::raster::stroke_segment;
use crate::types::{PointerPosition, Surface, ToolState};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeState {
    Idle,
    /// Holds the path's current point.
    Stroking(PointerPosition),
}

#[derive(Debug)]
pub struct StrokeRenderer {
    state: StrokeState,
}

impl StrokeRenderer {
    pub fn new() -> Self {
        Self { state: StrokeState::Idle }
    }

    #[cfg(test)]
    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Begin a new path at `pos`. Paints nothing yet.
    pub fn begin(&mut self, pos: PointerPosition) {
        debug!(x = pos.x, y = pos.y, "pen stroke started");
        self.state = StrokeState::Stroking(pos);
    }

    /// Append a segment from the current point to `pos` and render it now.
    pub fn extend(&mut self, surface: &mut Surface, tool: &ToolState, pos: PointerPosition) {
        let StrokeState::Stroking(last) = self.state else {
            return;
        };
        trace!(x = pos.x, y = pos.y, "pen segment");
        stroke_segment(surface, last, pos, tool.stroke_width, tool.color);
        self.state = StrokeState::Stroking(pos);
    }

    pub fn end(&mut self) {
        if matches!(self.state, StrokeState::Stroking(_)) {
            debug!("pen stroke finished");
        }
        self.state = StrokeState::Idle;
    }
}
