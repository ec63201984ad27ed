// pulp-image/src/processors/mod.rs
mod alpha;
mod compressor;
mod loader;
mod planner;
mod resizer;

pub use alpha::{parse_background, Flattener};
pub use compressor::{Compression, Compressor};
pub use loader::{format_name, Loader};
pub use planner::plan_tasks;
pub use resizer::{calculate_dimensions, ResizeMode, Resizer};

use crate::core::{ImageMetadata, OutputFormat, PulpError, Result};
use image::Rgb;
use std::path::Path;

/// Everything the backend needs to turn one input into one output file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub format: OutputFormat,
    pub compression: Compression,
    pub resize: Option<ResizeMode>,
    /// Background to composite onto when alpha must be removed.
    pub flatten: Option<Rgb<u8>>,
}

/// The pixel-level engine: decode, transform, encode.
pub trait ImageBackend {
    fn probe(&self, path: &Path) -> Result<ImageMetadata>;

    /// Writes the encoded result to `output`, whose parent must already exist.
    fn render(&self, input: &Path, output: &Path, plan: &RenderPlan) -> Result<()>;
}

#[derive(Default)]
pub struct CodecBackend {
    loader: Loader,
    resizer: Resizer,
    compressor: Compressor,
}

impl CodecBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageBackend for CodecBackend {
    fn probe(&self, path: &Path) -> Result<ImageMetadata> {
        self.loader.probe(path)
    }

    fn render(&self, input: &Path, output: &Path, plan: &RenderPlan) -> Result<()> {
        let mut image = self.loader.load(input)?;

        if let Some(mode) = plan.resize {
            image = self.resizer.resize(image, mode);
        }

        if let Some(background) = plan.flatten {
            image = Flattener::new(background).flatten(&image);
        }

        let bytes = self.compressor.encode(&image, plan.format, plan.compression)?;
        drop(image);

        std::fs::write(output, &bytes).map_err(|source| PulpError::WriteFailure {
            path: output.to_path_buf(),
            source,
        })?;

        log::debug!("Wrote {} ({} bytes)", output.display(), bytes.len());
        Ok(())
    }
}
