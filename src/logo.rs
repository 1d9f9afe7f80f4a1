//! Optional company logo for the invoice header.

use image::ImageReader;
use std::path::Path;
use tracing::debug;

use crate::error::{InvoiceError, Result};

/// Decoded logo pixels, alpha already blended onto white.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    /// Packed 8-bit RGB, row-major.
    pub rgb: Vec<u8>,
}

/// Whether the header carries a logo. A missing asset is not an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LogoAsset {
    WithLogo(LogoImage),
    #[default]
    TextOnly,
}

impl LogoAsset {
    /// Loads the logo at `path`. Returns `TextOnly` when the file does not
    /// exist and `RenderFailure` when it exists but cannot be decoded.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "logo not found, using text-only header");
            return Ok(LogoAsset::TextOnly);
        }

        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| InvoiceError::RenderFailure(format!("cannot open logo: {e}")))?
            .decode()?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for pixel in rgba.pixels() {
            let alpha = pixel[3] as f32 / 255.0;
            for channel in &pixel.0[..3] {
                rgb.push((*channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8);
            }
        }

        debug!(path = %path.display(), width, height, "logo loaded");
        Ok(LogoAsset::WithLogo(LogoImage { width, height, rgb }))
    }

    pub fn is_present(&self) -> bool {
        matches!(self, LogoAsset::WithLogo(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("invoice-logo-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_logo_degrades_to_text() {
        let asset = LogoAsset::load(Path::new("no/such/logo.png")).unwrap();
        assert_eq!(asset, LogoAsset::TextOnly);
        assert!(!asset.is_present());
    }

    #[test]
    fn test_png_logo_is_blended_onto_white() {
        let dir = scratch_dir("png");
        let path = dir.join("logo.png");

        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));
        img.save(&path).unwrap();

        let LogoAsset::WithLogo(logo) = LogoAsset::load(&path).unwrap() else {
            panic!("expected a logo");
        };
        assert_eq!((logo.width, logo.height), (2, 1));
        assert_eq!(logo.rgb, vec![255, 0, 0, 255, 255, 255]);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_corrupt_logo_is_render_failure() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("logo.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let err = LogoAsset::load(&path).unwrap_err();
        assert!(matches!(err, InvoiceError::RenderFailure(_)));

        fs::remove_dir_all(dir).ok();
    }
}
