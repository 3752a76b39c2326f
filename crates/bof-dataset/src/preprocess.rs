//! Squish-resize preprocessing.
//!
//! Images are resized to an exact square without preserving aspect
//! ratio, converted to RGB, and laid out as a CHW float buffer in
//! `[0, 1]`. Channel normalization happens later in the batcher.

use bof_core::{Error, Result};
use image::imageops::FilterType;
use image::ImageReader;
use std::path::Path;

/// Non-aspect-preserving resize to a fixed square size.
#[derive(Debug, Clone, Copy)]
pub struct SquishResize {
    target: u32,
}

impl SquishResize {
    pub fn new(target: u32) -> Result<Self> {
        if target == 0 {
            return Err(Error::InvalidArgument(
                "resize target must be greater than 0".to_string(),
            ));
        }
        Ok(Self { target })
    }

    /// Target edge length in pixels.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Loads an image file and returns a CHW float buffer of length
    /// `3 * target * target` with values in `[0, 1]`.
    pub fn load_chw(&self, path: &Path) -> Result<Vec<f32>> {
        let img = ImageReader::open(path)
            .map_err(|e| Error::Image(format!("Failed to open {}: {e}", path.display())))?
            .decode()
            .map_err(|e| Error::Image(format!("Failed to decode {}: {e}", path.display())))?
            .resize_exact(self.target, self.target, FilterType::Triangle)
            .to_rgb8();

        let size = self.target as usize;
        let mut buffer = vec![0.0f32; 3 * size * size];

        for y in 0..size {
            for x in 0..size {
                let pixel = img.get_pixel(x as u32, y as u32);
                for c in 0..3 {
                    buffer[c * size * size + y * size + x] = pixel[c] as f32 / 255.0;
                }
            }
        }

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn save_image(dir: &TempDir, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let img = image::ImageBuffer::from_fn(width, height, |_, _| {
            image::Rgb([255u8, 0u8, 0u8])
        });
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_rejects_zero_target() {
        assert!(SquishResize::new(0).is_err());
    }

    #[test]
    fn test_squish_resize_exact_dimensions() {
        let dir = TempDir::new().unwrap();
        let resize = SquishResize::new(32).unwrap();

        // Wide, tall and square sources all end up at 3 * 32 * 32.
        for (name, w, h) in [("wide.png", 100, 20), ("tall.png", 20, 100), ("sq.png", 32, 32)] {
            let path = save_image(&dir, name, w, h);
            let buffer = resize.load_chw(&path).unwrap();
            assert_eq!(buffer.len(), 3 * 32 * 32);
        }
    }

    #[test]
    fn test_values_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = save_image(&dir, "red.png", 16, 16);
        let buffer = SquishResize::new(8).unwrap().load_chw(&path).unwrap();

        assert!(buffer.iter().all(|v| (0.0..=1.0).contains(v)));
        // Red channel saturated, green and blue empty.
        assert!((buffer[0] - 1.0).abs() < 1e-6);
        assert!(buffer[8 * 8].abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let resize = SquishResize::new(8).unwrap();
        let result = resize.load_chw(Path::new("/no/such/image.png"));
        assert!(matches!(result, Err(Error::Image(_))));
    }
}
