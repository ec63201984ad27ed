// pulp-image/src/core/formats.rs
use super::{PulpError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// AVIF inputs need the dav1d decoder, only linked with the `avif-decode` feature.
#[cfg(feature = "avif-decode")]
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "avif"];
#[cfg(not(feature = "avif-decode"))]
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub const AVIF_DECODE_ENABLED: bool = cfg!(feature = "avif-decode");

pub const SUPPORTED_OUTPUT_FORMATS: [OutputFormat; 4] = [
    OutputFormat::Png,
    OutputFormat::Jpg,
    OutputFormat::Webp,
    OutputFormat::Avif,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpg,
    Webp,
    Avif,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpg => "JPG",
            OutputFormat::Webp => "WebP",
            OutputFormat::Avif => "AVIF",
        }
    }

    pub fn supports_transparency(self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Webp | OutputFormat::Avif)
    }

    pub fn supports_lossless(self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Webp | OutputFormat::Avif)
    }

    /// PNG has no quality knob; it is always lossless.
    pub fn default_quality(self) -> Option<u8> {
        match self {
            OutputFormat::Jpg => Some(80),
            OutputFormat::Webp => Some(80),
            OutputFormat::Avif => Some(50),
            OutputFormat::Png => None,
        }
    }

    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(OutputFormat::Png),
            image::ImageFormat::Jpeg => Some(OutputFormat::Jpg),
            image::ImageFormat::WebP => Some(OutputFormat::Webp),
            image::ImageFormat::Avif => Some(OutputFormat::Avif),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = PulpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "webp" => Ok(OutputFormat::Webp),
            "avif" => Ok(OutputFormat::Avif),
            _ => Err(PulpError::UnsupportedFormat { format: s.to_string() }),
        }
    }
}

pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_INPUT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
