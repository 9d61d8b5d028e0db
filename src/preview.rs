// Non-destructive live preview for rectangle / circle / line.
//
// Gesture start snapshots the surface before anything is drawn. Every move
// restores that snapshot and draws exactly one shape from anchor to pointer,
// so at most one preview is ever visible. Gesture end just drops the snapshot:
// the last preview already sits on the surface and becomes the committed shape.

use crate::raster::{fill_disc, fill_rect, stroke_ring, stroke_segment};
use crate::types::{PointerPosition, Snapshot, Surface, Tool, ToolState};
use tracing::{debug, trace};

/// A parametric shape resolved from a gesture's anchor and current point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Corner at `origin`, signed extent; negative width/height are fine.
    Rect { origin: PointerPosition, width: f32, height: f32 },
    Circle { center: PointerPosition, radius: f32 },
    Line { from: PointerPosition, to: PointerPosition },
}

impl Shape {
    /// `None` for the pen, which has no parametric form.
    pub fn from_drag(tool: Tool, anchor: PointerPosition, current: PointerPosition) -> Option<Shape> {
        let (dx, dy) = (current.x - anchor.x, current.y - anchor.y);
        match tool {
            Tool::Pen => None,
            Tool::Rect => Some(Shape::Rect { origin: anchor, width: dx, height: dy }),
            Tool::Circle => Some(Shape::Circle { center: anchor, radius: (dx * dx + dy * dy).sqrt() }),
            Tool::Line => Some(Shape::Line { from: anchor, to: current }),
        }
    }

    /// Normalized geometric bounds (min corner, max corner), ignoring stroke width.
    #[cfg(test)]
    pub fn bounds(&self) -> (PointerPosition, PointerPosition) {
        let (a, b) = match *self {
            Shape::Rect { origin, width, height } => {
                (origin, PointerPosition::new(origin.x + width, origin.y + height))
            }
            Shape::Circle { center, radius } => (
                PointerPosition::new(center.x - radius, center.y - radius),
                PointerPosition::new(center.x + radius, center.y + radius),
            ),
            Shape::Line { from, to } => (from, to),
        };
        (
            PointerPosition::new(a.x.min(b.x), a.y.min(b.y)),
            PointerPosition::new(a.x.max(b.x), a.y.max(b.y)),
        )
    }

    /// Fill, then stroke, both in the active color.
    pub fn draw(&self, surface: &mut Surface, tool: &ToolState) {
        let (color, width) = (tool.color, tool.stroke_width);
        match *self {
            Shape::Rect { origin, width: w, height: h } => {
                let far = PointerPosition::new(origin.x + w, origin.y + h);
                fill_rect(surface, origin, far, color);
                let corners = [
                    origin,
                    PointerPosition::new(far.x, origin.y),
                    far,
                    PointerPosition::new(origin.x, far.y),
                ];
                for i in 0..corners.len() {
                    stroke_segment(surface, corners[i], corners[(i + 1) % corners.len()], width, color);
                }
            }
            Shape::Circle { center, radius } => {
                fill_disc(surface, center, radius, color);
                stroke_ring(surface, center, radius, width, color);
            }
            // A line encloses no area, so its fill paints nothing.
            Shape::Line { from, to } => stroke_segment(surface, from, to, width, color),
        }
    }
}

#[derive(Debug)]
struct Gesture {
    tool: Tool,
    anchor: PointerPosition,
    snapshot: Snapshot,
}

#[derive(Debug, Default)]
pub struct ShapePreviewController {
    gesture: Option<Gesture>,
}

impl ShapePreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_previewing(&self) -> bool {
        self.gesture.is_some()
    }

    /// Snapshot the untouched surface and remember the anchor.
    /// Non-shape tools are ignored.
    pub fn begin(&mut self, surface: &Surface, tool: Tool, anchor: PointerPosition) {
        if !tool.is_shape() {
            return;
        }
        debug!(%tool, x = anchor.x, y = anchor.y, "shape preview started");
        self.gesture = Some(Gesture { tool, anchor, snapshot: surface.snapshot() });
    }

    /// Restore the snapshot and draw the shape for the current point. Without a
    /// snapshot for this gesture the call does nothing.
    pub fn update(&mut self, surface: &mut Surface, tool: &ToolState, current: PointerPosition) {
        let Some(gesture) = &self.gesture else {
            trace!("preview move without a gesture; ignored");
            return;
        };
        surface.restore(&gesture.snapshot);
        if let Some(shape) = Shape::from_drag(gesture.tool, gesture.anchor, current) {
            trace!(?shape, "shape preview");
            shape.draw(surface, tool);
        }
    }

    /// Commit whatever is on the surface by discarding the snapshot.
    pub fn end(&mut self) {
        if self.gesture.take().is_some() {
            debug!("shape preview committed");
        }
    }

    /// Drop the snapshot without touching the surface (mode exit, clear).
    pub fn cancel(&mut self) {
        self.gesture = None;
    }
}
