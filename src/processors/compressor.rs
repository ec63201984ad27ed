// pulp-image/src/processors/compressor.rs
use crate::core::{OutputFormat, PulpError, Result};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use oxipng::{optimize_from_memory, Options};
use std::io::Cursor;

/// Encoder speed for AVIF; 1 is slowest, 10 fastest.
const AVIF_SPEED: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Lossless,
    /// `None` leaves the encoder at its own setting (PNG).
    Quality(Option<u8>),
}

pub struct Compressor {
    optimize_png: bool,
}

impl Compressor {
    pub fn new() -> Self {
        Self { optimize_png: true }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        compression: Compression,
    ) -> Result<Vec<u8>> {
        log::debug!(
            "Encoding {}x{} image as {} ({:?})",
            image.width(),
            image.height(),
            format,
            compression
        );

        match format {
            OutputFormat::Jpg => self.encode_jpeg(image, compression),
            OutputFormat::Png => self.encode_png(image),
            OutputFormat::Webp => self.encode_webp(image, compression),
            OutputFormat::Avif => self.encode_avif(image, compression),
        }
    }

    fn encode_jpeg(&self, image: &DynamicImage, compression: Compression) -> Result<Vec<u8>> {
        let quality = match compression {
            Compression::Quality(q) => q.unwrap_or(80),
            Compression::Lossless => 100,
        };

        // JPEG has no alpha; callers flatten first, this only drops the channel
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|e| encode_error(OutputFormat::Jpg, e))?;
        Ok(buffer)
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_with_encoder(PngEncoder::new(&mut buffer))
            .map_err(|e| encode_error(OutputFormat::Png, e))?;

        if !self.optimize_png {
            return Ok(buffer.into_inner());
        }

        optimize_from_memory(&buffer.into_inner(), &Options::default())
            .map_err(|e| encode_error(OutputFormat::Png, format!("PNG optimization failed: {}", e)))
    }

    fn encode_webp(&self, image: &DynamicImage, compression: Compression) -> Result<Vec<u8>> {
        let (width, height) = (image.width(), image.height());

        let (lossless, quality) = match compression {
            Compression::Lossless => (true, 100.0),
            Compression::Quality(q) => (false, q.unwrap_or(80) as f32),
        };

        let encoded = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            let encoder = webp::Encoder::from_rgba(rgba.as_raw(), width, height);
            encoder.encode_simple(lossless, quality).map(|m| m.to_vec())
        } else {
            let rgb = image.to_rgb8();
            let encoder = webp::Encoder::from_rgb(rgb.as_raw(), width, height);
            encoder.encode_simple(lossless, quality).map(|m| m.to_vec())
        };

        encoded.map_err(|e| encode_error(OutputFormat::Webp, format!("{:?}", e)))
    }

    fn encode_avif(&self, image: &DynamicImage, compression: Compression) -> Result<Vec<u8>> {
        let quality = match compression {
            // the AV1 encoder has no true lossless mode; max quality is closest
            Compression::Lossless => 100,
            Compression::Quality(q) => q.unwrap_or(50),
        };

        let mut buffer = Vec::new();
        let encoder =
            AvifEncoder::new_with_speed_quality(&mut buffer, AVIF_SPEED, quality.clamp(1, 100));
        let prepared = if image.color().has_alpha() {
            DynamicImage::ImageRgba8(image.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        };
        prepared
            .write_with_encoder(encoder)
            .map_err(|e| encode_error(OutputFormat::Avif, e))?;
        Ok(buffer)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_error(format: OutputFormat, err: impl std::fmt::Display) -> PulpError {
    PulpError::Encode {
        format,
        message: err.to_string(),
    }
}
