// Hard-edged software rasterizer for pen strokes and preview shapes.
// A pixel is covered when its center (x + 0.5, y + 0.5) lies inside the shape,
// so the same geometry always produces the same pixels (no anti-aliasing).

use crate::types::{PointerPosition, Rgb, Surface};
use std::ops::Range;

/// Put a pixel on the surface if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(s: &mut Surface, x: i32, y: i32, color: Rgb) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= s.width || y >= s.height {
        return;
    }
    s.pixels[y * s.width + x] = color;
}

/// Pixel indices whose centers fall in [lo, hi], clipped to 0..len.
fn span(lo: f32, hi: f32, len: usize) -> Range<i32> {
    let start = (lo - 0.5).ceil().max(0.0) as i32;
    let end = ((hi - 0.5).floor() + 1.0).min(len as f32) as i32;
    start..end.max(start)
}

/// Shortest distance from (px,py) to the segment a-b (a point if a == b).
fn dist_to_segment(px: f32, py: f32, a: PointerPosition, b: PointerPosition) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Axis-aligned filled rectangle between two corners given in any order.
pub fn fill_rect(s: &mut Surface, a: PointerPosition, b: PointerPosition, color: Rgb) {
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    for y in span(y0, y1, s.height) {
        for x in span(x0, x1, s.width) {
            put_pixel(s, x, y, color);
        }
    }
}

/// Thick segment with round caps: every pixel within width/2 of a-b.
/// Consecutive segments sharing an endpoint therefore meet with a round join.
pub fn stroke_segment(s: &mut Surface, a: PointerPosition, b: PointerPosition, width: f32, color: Rgb) {
    let half = (width * 0.5).max(0.0);
    let xs = span(a.x.min(b.x) - half, a.x.max(b.x) + half, s.width);
    for y in span(a.y.min(b.y) - half, a.y.max(b.y) + half, s.height) {
        for x in xs.clone() {
            if dist_to_segment(x as f32 + 0.5, y as f32 + 0.5, a, b) <= half {
                put_pixel(s, x, y, color);
            }
        }
    }
}

/// Filled disc; radius 0 covers nothing.
pub fn fill_disc(s: &mut Surface, c: PointerPosition, radius: f32, color: Rgb) {
    let r2 = radius * radius;
    let xs = span(c.x - radius, c.x + radius, s.width);
    for y in span(c.y - radius, c.y + radius, s.height) {
        for x in xs.clone() {
            let (dx, dy) = (x as f32 + 0.5 - c.x, y as f32 + 0.5 - c.y);
            if dx * dx + dy * dy <= r2 {
                put_pixel(s, x, y, color);
            }
        }
    }
}

/// Circle outline of the given stroke width, centered on the radius.
pub fn stroke_ring(s: &mut Surface, c: PointerPosition, radius: f32, width: f32, color: Rgb) {
    let half = (width * 0.5).max(0.0);
    let outer = radius + half;
    let xs = span(c.x - outer, c.x + outer, s.width);
    for y in span(c.y - outer, c.y + outer, s.height) {
        for x in xs.clone() {
            let (dx, dy) = (x as f32 + 0.5 - c.x, y as f32 + 0.5 - c.y);
            if ((dx * dx + dy * dy).sqrt() - radius).abs() <= half {
                put_pixel(s, x, y, color);
            }
        }
    }
}
