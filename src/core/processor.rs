// pulp-image/src/core/processor.rs
use super::{AlphaMode, OutputFormat, ProcessConfig, ProcessResult, PulpError, Result};
use crate::processors::{
    parse_background, CodecBackend, Compression, ImageBackend, RenderPlan, ResizeMode,
};
use crate::utils::{build_output_path, calculate_stats, resolve_path, OutputDirs};
use std::path::Path;

/// Processes single images under one configuration.
///
/// Holds the set of output directories already created, so one processor
/// should be used per run.
pub struct ImageProcessor<B: ImageBackend = CodecBackend> {
    config: ProcessConfig,
    backend: B,
    output_dirs: OutputDirs,
}

impl ImageProcessor<CodecBackend> {
    pub fn new(config: ProcessConfig) -> Self {
        Self::with_backend(config, CodecBackend::new())
    }
}

impl<B: ImageBackend> ImageProcessor<B> {
    pub fn with_backend(config: ProcessConfig, backend: B) -> Self {
        Self {
            config,
            backend,
            output_dirs: OutputDirs::new(),
        }
    }

    /// Runs the full pipeline for `input_path`. `file_index` is the 0-based
    /// batch position used by rename templates.
    pub fn process<P: AsRef<Path>>(
        &mut self,
        input_path: P,
        file_index: Option<usize>,
    ) -> Result<ProcessResult> {
        let input_path = resolve_path(input_path.as_ref())?;

        if !input_path.exists() {
            return Err(PulpError::InputNotFound { path: input_path });
        }

        let original_size = std::fs::metadata(&input_path)?.len();
        let metadata = self.backend.probe(&input_path)?;

        let format = match self.config.format {
            Some(format) => format,
            None => metadata.format.parse::<OutputFormat>()?,
        };

        let output_path = build_output_path(&input_path, &self.config, file_index)?;

        if input_path == output_path && !self.config.overwrite {
            return Err(PulpError::SamePath { path: output_path });
        }
        if !self.config.overwrite && output_path.exists() {
            return Err(PulpError::OutputExists { path: output_path });
        }

        let mut warnings = Vec::new();

        let flatten = if metadata.has_alpha && !format.supports_transparency() {
            if self.config.alpha_mode == AlphaMode::Error {
                return Err(PulpError::UnsupportedTransparency { format });
            }
            Some(parse_background(&self.config.background))
        } else {
            None
        };

        let compression = if self.config.lossless && format.supports_lossless() {
            Compression::Lossless
        } else {
            if self.config.lossless {
                let warning = format!(
                    "Lossless compression not supported for {}, using quality settings instead.",
                    format.label()
                );
                log::warn!("{}", warning);
                warnings.push(warning);
            }
            Compression::Quality(match format {
                OutputFormat::Png => None,
                _ => self.config.quality.or(format.default_quality()),
            })
        };

        let plan = RenderPlan {
            format,
            compression,
            resize: ResizeMode::from_dimensions(self.config.width, self.config.height),
            flatten,
        };

        if let Some(parent) = output_path.parent() {
            self.output_dirs
                .ensure(parent)
                .map_err(|source| PulpError::WriteFailure {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        self.backend.render(&input_path, &output_path, &plan)?;

        let final_size = std::fs::metadata(&output_path)?.len();
        let stats = calculate_stats(original_size, final_size);

        let delete_error = if self.config.delete_original && input_path != output_path {
            self.delete_original(&input_path)
        } else {
            None
        };

        log::info!(
            "Processed {} -> {} ({} -> {} bytes)",
            input_path.display(),
            output_path.display(),
            original_size,
            final_size
        );

        Ok(ProcessResult {
            input_path,
            output_path,
            original_size,
            final_size,
            bytes_saved: stats.bytes_saved,
            percent_saved: stats.percent_saved,
            metadata,
            delete_error,
            warnings,
        })
    }

    fn delete_original(&self, input_path: &Path) -> Option<String> {
        if !input_path.exists() {
            log::warn!(
                "Original file already deleted or not found: {}",
                input_path.display()
            );
            return None;
        }

        match std::fs::remove_file(input_path) {
            Ok(()) => {
                log::debug!("Deleted original {}", input_path.display());
                None
            }
            Err(e) => {
                log::warn!(
                    "Failed to delete original file {}: {}",
                    input_path.display(),
                    e
                );
                Some(e.to_string())
            }
        }
    }
}

/// Processes one image with a fresh processor.
pub fn process_image<P: AsRef<Path>>(
    input_path: P,
    config: &ProcessConfig,
    file_index: Option<usize>,
) -> Result<ProcessResult> {
    ImageProcessor::new(config.clone()).process(input_path, file_index)
}
