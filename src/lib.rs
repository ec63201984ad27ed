pub mod cli;
pub mod core;
pub mod processors;
pub mod server;
pub mod update;
pub mod utils;

pub use core::job::{run_job, run_job_with, JobEvent};
pub use core::processor::{process_image, ImageProcessor};
pub use core::reporter::{JobReport, OutcomeKind, Reporter};
pub use core::{
    AlphaMode, ErrorKind, ImageMetadata, NamingStrategy, OutputFormat, ProcessConfig,
    ProcessResult, PulpError, Result,
};
pub use processors::{plan_tasks, CodecBackend, ImageBackend, RenderPlan};
pub use utils::{build_output_path, calculate_stats, format_file_size};

pub mod prelude {
    pub use crate::{
        process_image, run_job, AlphaMode, ImageProcessor, JobReport, NamingStrategy,
        OutputFormat, ProcessConfig, PulpError,
    };
}
