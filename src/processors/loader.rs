// pulp-image/src/processors/loader.rs
use crate::core::formats::AVIF_DECODE_ENABLED;
use crate::core::{ImageMetadata, PulpError, Result};
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageFormat, ImageReader};
use std::path::Path;

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    /// Reads dimensions, container format and alpha presence from the header
    /// without decoding pixel data.
    pub fn probe(&self, path: &Path) -> Result<ImageMetadata> {
        let reader = ImageReader::open(path)?
            .with_guessed_format()
            .map_err(|e| PulpError::decode(path, e))?;

        let format = reader
            .format()
            .ok_or_else(|| PulpError::decode(path, "unrecognised image format"))?;
        ensure_decodable(format)?;
        let decoder = reader.into_decoder().map_err(|e| PulpError::decode(path, e))?;
        let (width, height) = decoder.dimensions();
        self.check_dimensions(width, height)?;

        Ok(ImageMetadata {
            width,
            height,
            format: format_name(format),
            has_alpha: decoder.color_type().has_alpha(),
        })
    }

    pub fn load(&self, path: &Path) -> Result<DynamicImage> {
        log::debug!("Loading image from: {}", path.display());

        let reader = ImageReader::open(path)?
            .with_guessed_format()
            .map_err(|e| PulpError::decode(path, e))?;
        if let Some(format) = reader.format() {
            ensure_decodable(format)?;
        }
        let image = reader.decode().map_err(|e| PulpError::decode(path, e))?;

        let (width, height) = image.dimensions();
        self.check_dimensions(width, height)?;

        log::debug!(
            "Loaded image: {}x{} pixels, color: {:?}",
            width,
            height,
            image.color()
        );

        Ok(image)
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if let Some((max_w, max_h)) = self.max_dimensions {
            if width > max_w || height > max_h {
                return Err(PulpError::InvalidParameter(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }
        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_decodable(format: ImageFormat) -> Result<()> {
    if format == ImageFormat::Avif && !AVIF_DECODE_ENABLED {
        log::debug!("AVIF decoding requires the avif-decode feature");
        return Err(PulpError::UnsupportedFormat {
            format: "avif".to_string(),
        });
    }
    Ok(())
}

/// Lowercase container name as reported in result metadata.
pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Avif => "avif",
        ImageFormat::Gif => "gif",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Ico => "ico",
        ImageFormat::Qoi => "qoi",
        _ => "unknown",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_reports_alpha_and_format() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("rgba.png");
        image::RgbaImage::new(7, 3).save(&path).unwrap();

        let meta = Loader::new().probe(&path).unwrap();
        assert_eq!(meta.width, 7);
        assert_eq!(meta.height, 3);
        assert_eq!(meta.format, "png");
        assert!(meta.has_alpha);
    }

    #[test]
    fn test_probe_detects_content_not_extension() {
        let temp = tempfile::tempdir().unwrap();
        let jpg = temp.path().join("real.jpg");
        image::RgbImage::new(4, 4).save(&jpg).unwrap();
        let renamed = temp.path().join("looks-like.png");
        std::fs::rename(&jpg, &renamed).unwrap();

        let meta = Loader::new().probe(&renamed).unwrap();
        assert_eq!(meta.format, "jpeg");
        assert!(!meta.has_alpha);
    }

    #[test]
    fn test_probe_rejects_garbage() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        assert!(matches!(
            Loader::new().probe(&path),
            Err(PulpError::Decode { .. })
        ));
    }

    #[test]
    fn test_dimension_limit() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wide.png");
        image::RgbImage::new(20, 2).save(&path).unwrap();

        let loader = Loader::new().with_max_dimensions(10, 10);
        assert!(matches!(
            loader.probe(&path),
            Err(PulpError::InvalidParameter(_))
        ));
    }
}
