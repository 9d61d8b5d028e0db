// Raw pointer input and its translation into surface-local coordinates.

use crate::types::PointerPosition;

/// Where the surface sits inside the window, in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingRect {
    /// Whether a client-space point lies on the surface.
    pub fn contains(&self, client_x: f32, client_y: f32) -> bool {
        client_x >= self.left
            && client_y >= self.top
            && client_x < self.left + self.width
            && client_y < self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub client_x: f32,
    pub client_y: f32,
}

/// A pointer sample as the host delivers it. Touch events carry the list of
/// active touch points; mouse events carry a single client position.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    Mouse { client_x: f32, client_y: f32 },
    Touch { touches: Vec<TouchPoint> },
}

impl PointerEvent {
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        PointerEvent::Mouse { client_x, client_y }
    }
}

/// Client coordinates minus the surface origin. Touch events use their first
/// touch point; a touch event with no points left (a lift) has no position.
pub fn map_to_surface(event: &PointerEvent, rect: &BoundingRect) -> Option<PointerPosition> {
    let (cx, cy) = match event {
        PointerEvent::Mouse { client_x, client_y } => (*client_x, *client_y),
        PointerEvent::Touch { touches } => {
            let first = touches.first()?;
            (first.client_x, first.client_y)
        }
    };
    Some(PointerPosition::new(cx - rect.left, cy - rect.top))
}

/// Position of a press, but only if it lands on the surface. Once a gesture
/// has started its moves may leave the rect; the start may not.
pub fn map_press(event: &PointerEvent, rect: &BoundingRect) -> Option<PointerPosition> {
    map_to_surface(event, rect)
        .filter(|p| (0.0..rect.width).contains(&p.x) && (0.0..rect.height).contains(&p.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: BoundingRect = BoundingRect { left: 10.0, top: 16.0, width: 100.0, height: 100.0 };

    #[test]
    fn mouse_is_offset_by_rect_origin() {
        let pos = map_to_surface(&PointerEvent::mouse(15.0, 20.0), &RECT);
        assert_eq!(pos, Some(PointerPosition::new(5.0, 4.0)));
    }

    #[test]
    fn touch_uses_first_point_only() {
        let event = PointerEvent::Touch {
            touches: vec![
                TouchPoint { client_x: 30.0, client_y: 40.0 },
                TouchPoint { client_x: 90.0, client_y: 90.0 },
            ],
        };
        assert_eq!(map_to_surface(&event, &RECT), Some(PointerPosition::new(20.0, 24.0)));
    }

    #[test]
    fn positions_outside_the_rect_are_not_clamped() {
        let pos = map_to_surface(&PointerEvent::mouse(0.0, 0.0), &RECT);
        assert_eq!(pos, Some(PointerPosition::new(-10.0, -16.0)));
    }

    #[test]
    fn contains_excludes_the_far_edges() {
        assert!(RECT.contains(10.0, 16.0));
        assert!(RECT.contains(109.5, 115.5));
        assert!(!RECT.contains(110.0, 50.0));
        assert!(!RECT.contains(50.0, 15.9));
    }

    #[test]
    fn presses_off_the_surface_have_no_position() {
        // the HUD strip above the surface
        assert_eq!(map_press(&PointerEvent::mouse(15.0, 5.0), &RECT), None);
        assert_eq!(map_press(&PointerEvent::mouse(110.0, 50.0), &RECT), None);
        assert_eq!(map_press(&PointerEvent::mouse(10.0, 16.0), &RECT), Some(PointerPosition::new(0.0, 0.0)));
    }

    #[test]
    fn empty_touch_list_has_no_position() {
        let event = PointerEvent::Touch { touches: Vec::new() };
        assert_eq!(map_to_surface(&event, &RECT), None);
    }
}
