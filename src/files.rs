// Disk side of the app: PNG export of the drawing, and reading the layer
// files that stand in for the analysis service's reply.

use crate::compositor::{LayerSet, Payload};
use crate::config::LayerPaths;
use crate::error::Error;
use crate::types::{Surface, unpack};
use image::{ImageFormat, RgbImage};
use std::path::Path;
use tracing::info;

/// Encode the surface as an RGB PNG.
pub fn export_png(surface: &Surface, path: &Path) -> Result<(), Error> {
    let img = RgbImage::from_fn(surface.width as u32, surface.height as u32, |x, y| {
        let (r, g, b) = unpack(surface.pixels[y as usize * surface.width + x as usize]);
        image::Rgb([r, g, b])
    });
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::Export { path: path.to_path_buf(), source })?;
    info!(?path, "drawing exported");
    Ok(())
}

fn read_payload(path: &Path) -> Result<Payload, Error> {
    std::fs::read(path)
        .map(Payload::from)
        .map_err(|source| Error::LayerRead { path: path.to_path_buf(), source })
}

/// Read the configured layer files as raw payloads; decoding happens later in
/// the compositor. `None` when no base layer is configured.
pub fn read_layer_set(paths: &LayerPaths) -> Result<Option<LayerSet>, Error> {
    let Some(base) = &paths.base else {
        return Ok(None);
    };
    let mut set = LayerSet::new(read_payload(base)?);
    if let Some(mid) = &paths.mid {
        set = set.with_mid(read_payload(mid)?, paths.mid_alpha);
    }
    if let Some(top) = &paths.top {
        set = set.with_top(read_payload(top)?);
    }
    Ok(Some(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::test_support::solid_png;

    #[test]
    fn export_round_trips_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing.png");
        let mut surface = Surface::new(3, 2, 0x00_FF_FF_FF);
        surface.pixels[4] = 0x00_12_34_56;
        export_png(&surface, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(1, 1).0, [0x12, 0x34, 0x56]);
        assert_eq!(back.get_pixel(0, 0).0, [0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("drawing.png");
        let err = export_png(&Surface::new(1, 1, 0), &path).unwrap_err();
        assert!(matches!(err, Error::Export { .. }));
    }

    #[test]
    fn layer_files_are_read_as_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.png");
        let top = dir.path().join("top.png");
        std::fs::write(&base, solid_png(2, 2, [1, 2, 3, 255])).unwrap();
        std::fs::write(&top, solid_png(2, 2, [4, 5, 6, 255])).unwrap();

        let paths = LayerPaths { base: Some(base), mid: None, top: Some(top), mid_alpha: 0.5 };
        let set = read_layer_set(&paths).unwrap().expect("base configured");
        assert!(set.mid.is_none());
        assert!(set.top.is_some());
        assert_eq!(&*set.base, &solid_png(2, 2, [1, 2, 3, 255])[..]);
    }

    #[test]
    fn no_base_means_no_layer_set() {
        let paths = LayerPaths { base: None, mid: None, top: None, mid_alpha: 0.5 };
        assert!(read_layer_set(&paths).unwrap().is_none());
    }

    #[test]
    fn missing_layer_file_is_reported() {
        let paths = LayerPaths { base: Some("/definitely/not/here.png".into()), mid: None, top: None, mid_alpha: 0.5 };
        assert!(matches!(read_layer_set(&paths), Err(Error::LayerRead { .. })));
    }
}
