// pulp-image/src/core/mod.rs
pub mod formats;
pub mod job;
pub mod processor;
pub mod reporter;

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use formats::OutputFormat;

/// What to do when a transparent image is written to a format without alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Flatten,
    Error,
}

/// How output file names are derived from input names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingStrategy {
    /// `{name}-{auto}-{custom}{ext}`; either part may be absent.
    Suffix { auto: bool, custom: Option<String> },
    /// User pattern with `{name}`, `{ext}` and `{index}` placeholders.
    Template { pattern: String },
}

impl NamingStrategy {
    /// A non-empty template always wins over suffix composition.
    pub fn from_parts(template: Option<String>, custom: Option<String>, auto: bool) -> Self {
        match template.filter(|t| !t.trim().is_empty()) {
            Some(pattern) => NamingStrategy::Template { pattern },
            None => NamingStrategy::Suffix {
                auto,
                custom: custom.filter(|s| !s.is_empty()),
            },
        }
    }
}

impl Default for NamingStrategy {
    fn default() -> Self {
        NamingStrategy::Suffix { auto: false, custom: None }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<OutputFormat>,
    pub out_dir: PathBuf,
    pub naming: NamingStrategy,
    pub quality: Option<u8>,
    pub lossless: bool,
    pub background: String,
    pub alpha_mode: AlphaMode,
    pub overwrite: bool,
    pub delete_original: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            format: None,
            out_dir: PathBuf::from("./dist"),
            naming: NamingStrategy::default(),
            quality: None,
            lossless: false,
            background: "#ffffff".to_string(),
            alpha_mode: AlphaMode::Flatten,
            overwrite: false,
            delete_original: false,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [("Width", self.width), ("Height", self.height)] {
            match value {
                Some(0) => {
                    return Err(PulpError::InvalidParameter(format!(
                        "{} must be greater than 0",
                        label
                    )))
                }
                Some(v) if v > 100_000 => {
                    return Err(PulpError::InvalidParameter(format!(
                        "{} too large (max 100,000 pixels)",
                        label
                    )))
                }
                _ => {}
            }
        }

        if let Some(quality) = self.quality {
            if quality == 0 || quality > 100 {
                return Err(PulpError::InvalidParameter(
                    "Quality must be between 1 and 100".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Header-level facts about a source image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub has_alpha: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub original_size: u64,
    pub final_size: u64,
    pub bytes_saved: i64,
    pub percent_saved: f64,
    pub metadata: ImageMetadata,
    pub delete_error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRecord {
    pub file_path: PathBuf,
    pub reason: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub file_path: PathBuf,
    pub error: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_original: u64,
    pub total_final: u64,
    pub total_saved: i64,
    pub percent_saved: f64,
    pub processed_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
}

#[derive(Error, Debug)]
pub enum PulpError {
    #[error("Input not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input must be a file or directory: {}", .path.display())]
    InvalidInputType { path: PathBuf },

    #[error("Failed to read directory {}: {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Input and output paths are the same: {}. Use --overwrite to process in-place.", .path.display())]
    SamePath { path: PathBuf },

    #[error("Output file already exists: {} (use --overwrite to overwrite)", .path.display())]
    OutputExists { path: PathBuf },

    #[error("Input has transparency but output format {format} does not support it. Use --alpha-mode flatten or choose a format that supports transparency.")]
    UnsupportedTransparency { format: OutputFormat },

    #[error("Failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Failed to encode {format}: {message}")]
    Encode { format: OutputFormat, message: String },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl PulpError {
    /// Skips are safety-guard non-actions, not failures.
    pub fn is_skip(&self) -> bool {
        self.kind().is_skip()
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PulpError::InputNotFound { .. } => ErrorKind::InputNotFound,
            PulpError::InvalidInputType { .. } => ErrorKind::InvalidInputType,
            PulpError::DirectoryRead { .. } => ErrorKind::DirectoryRead,
            PulpError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            PulpError::SamePath { .. } => ErrorKind::SamePath,
            PulpError::OutputExists { .. } => ErrorKind::OutputExists,
            PulpError::UnsupportedTransparency { .. } => ErrorKind::UnsupportedTransparency,
            PulpError::Decode { .. } | PulpError::Image(_) => ErrorKind::Decode,
            PulpError::Encode { .. } => ErrorKind::Encode,
            PulpError::WriteFailure { .. } => ErrorKind::WriteFailure,
            PulpError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            PulpError::Io(_) => ErrorKind::Io,
        }
    }

    /// Short text for the browser UI, free of paths and library detail.
    pub fn user_message(&self) -> String {
        match self {
            PulpError::UnsupportedFormat { format } => {
                format!("The format \"{}\" is not supported.", format)
            }
            PulpError::UnsupportedTransparency { format } => format!(
                "This image has transparency, which {} cannot store. Choose flatten or a format with transparency.",
                format.label()
            ),
            PulpError::Encode { format, .. } => {
                format!("The image could not be converted to {}.", format.label())
            }
            PulpError::InvalidParameter(message) => message.clone(),
            other => other.kind().user_message().to_string(),
        }
    }

    pub(crate) fn decode(path: &Path, err: impl std::fmt::Display) -> Self {
        PulpError::Decode {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PulpError>;

/// Payload-free tag of a [`PulpError`], carried on skip and failure records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InputNotFound,
    InvalidInputType,
    DirectoryRead,
    UnsupportedFormat,
    SamePath,
    OutputExists,
    UnsupportedTransparency,
    Decode,
    Encode,
    WriteFailure,
    InvalidParameter,
    Io,
}

impl ErrorKind {
    pub fn is_skip(self) -> bool {
        matches!(self, ErrorKind::SamePath | ErrorKind::OutputExists)
    }

    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::InputNotFound => "The file could not be found.",
            ErrorKind::InvalidInputType => "Only files and folders can be processed.",
            ErrorKind::DirectoryRead => "The folder could not be read.",
            ErrorKind::UnsupportedFormat => "This image format is not supported.",
            ErrorKind::SamePath => {
                "The output would replace the original file. Enable overwrite to allow this."
            }
            ErrorKind::OutputExists => {
                "A file with this name already exists. Enable overwrite to replace it."
            }
            ErrorKind::UnsupportedTransparency => {
                "This image has transparency that the chosen format cannot store."
            }
            ErrorKind::Decode => {
                "The image could not be read. It may be damaged or in an unsupported format."
            }
            ErrorKind::Encode => "The image could not be converted.",
            ErrorKind::WriteFailure | ErrorKind::Io => {
                "The result could not be saved. Check that the output folder is writable."
            }
            ErrorKind::InvalidParameter => "Some settings are invalid.",
        }
    }
}
