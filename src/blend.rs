// Source-over alpha for translucent layers, straight on the sRGB bytes.

use crate::types::{Rgb, pack, unpack};

/// Lay `src` over `dst` at coverage `alpha` (0 keeps dst, 1 replaces it).
#[inline]
pub fn mix(dst: Rgb, src: Rgb, alpha: f32) -> Rgb {
    if alpha.is_nan() || alpha <= 0.0 {
        return dst;
    }
    if alpha >= 1.0 {
        return src;
    }
    let (dr, dg, db) = unpack(dst);
    let (sr, sg, sb) = unpack(src);
    let ch = |d: u8, s: u8| {
        let d = d as f32;
        (d + (s as f32 - d) * alpha).round() as u8
    };
    pack(ch(dr, sr), ch(dg, sg), ch(db, sb))
}
