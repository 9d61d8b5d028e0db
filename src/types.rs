// Core types shared by the drawing and viewing halves of the app.

use serde::Deserialize;
use std::fmt;

/// Packed 0x00RRGGBB color, the same layout minifb expects.
pub type Rgb = u32;

/// Parse `#RRGGBB` (leading `#` optional) into a packed color.
pub fn parse_hex_color(s: &str) -> Option<Rgb> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

#[inline]
pub fn unpack(px: Rgb) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}

#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> Rgb {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// The raster everything draws into. One instance exists, owned by the
/// mode controller and lent out to whichever component may write it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgb>, // row-major, len = width * height
}

impl Surface {
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self { width, height, pixels: vec![fill; width * height] }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Copy every pixel out. Only the shape preview controller keeps one of these.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { width: self.width, height: self.height, pixels: self.pixels.clone() }
    }

    /// Overwrite the whole surface from a snapshot taken of it earlier.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        debug_assert_eq!((self.width, self.height), (snapshot.width, snapshot.height));
        self.pixels.copy_from_slice(&snapshot.pixels);
    }
}

/// Frozen copy of a surface, taken at shape-gesture start.
#[derive(Clone, Debug)]
pub struct Snapshot {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

/// Surface-local pointer coordinates, recomputed for every event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Rect,
    Circle,
    Line,
}

impl Tool {
    /// Tools that preview through a snapshot instead of painting directly.
    pub fn is_shape(self) -> bool {
        !matches!(self, Tool::Pen)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Pen => "PEN",
            Tool::Rect => "RECT",
            Tool::Circle => "CIRCLE",
            Tool::Line => "LINE",
        };
        f.write_str(name)
    }
}

pub const MIN_STROKE_WIDTH: f32 = 1.0;
pub const MAX_STROKE_WIDTH: f32 = 20.0;

/// Tool selection as configured from outside; the core only reads it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub color: Rgb,
    pub stroke_width: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self { tool: Tool::Pen, color: 0x00_00_00_00, stroke_width: 3.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors_with_and_without_hash() {
        assert_eq!(parse_hex_color("#FF8000"), Some(0x00_FF_80_00));
        assert_eq!(parse_hex_color("00ff00"), Some(0x00_00_FF_00));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn restore_overwrites_everything_drawn_after_snapshot() {
        let mut surface = Surface::new(4, 3, 0x00_FF_FF_FF);
        let snap = surface.snapshot();
        surface.pixels[5] = 0x00_12_34_56;
        surface.fill(0);
        surface.restore(&snap);
        assert!(surface.pixels.iter().all(|&p| p == 0x00_FF_FF_FF));
    }

    #[test]
    fn pack_unpack_agree() {
        assert_eq!(unpack(pack(1, 2, 3)), (1, 2, 3));
    }
}
