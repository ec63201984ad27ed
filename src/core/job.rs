// pulp-image/src/core/job.rs
use super::processor::ImageProcessor;
use super::reporter::{JobReport, OutcomeKind, Reporter};
use super::{ProcessConfig, PulpError, Result};
use crate::processors::{plan_tasks, CodecBackend, ImageBackend};
use crate::utils::resolve_path;
use std::path::{Path, PathBuf};

/// Progress notifications for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Directory mode only, once planning succeeds.
    Planned { total: usize },
    Finished {
        index: usize,
        path: PathBuf,
        outcome: OutcomeKind,
    },
}

/// Processes a file or every supported image directly inside a directory.
///
/// Prints nothing. Per-file problems land in the report; only invalid input
/// or an unreadable directory fail the whole job.
pub fn run_job(input_path: &Path, config: &ProcessConfig) -> Result<JobReport> {
    run_job_with(input_path, config, CodecBackend::new(), |_| {})
}

pub fn run_job_with<B, F>(
    input_path: &Path,
    config: &ProcessConfig,
    backend: B,
    mut on_event: F,
) -> Result<JobReport>
where
    B: ImageBackend,
    F: FnMut(&JobEvent),
{
    let input_path = resolve_path(input_path)?;

    let metadata = match std::fs::metadata(&input_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PulpError::InputNotFound { path: input_path })
        }
        Err(e) => return Err(PulpError::Io(e)),
    };

    let mut processor = ImageProcessor::with_backend(config.clone(), backend);
    let mut reporter = Reporter::new();

    if metadata.is_file() {
        log::debug!("Single file mode: {}", input_path.display());
        let outcome = processor.process(&input_path, Some(0));
        let kind = reporter.record_outcome(&input_path, outcome);
        on_event(&JobEvent::Finished {
            index: 0,
            path: input_path,
            outcome: kind,
        });
    } else if metadata.is_dir() {
        let tasks = plan_tasks(&input_path)?;
        if tasks.is_empty() {
            log::debug!("No supported images in {}", input_path.display());
            return Ok(JobReport::default());
        }

        log::debug!("Processing {} task(s) from {}", tasks.len(), input_path.display());
        on_event(&JobEvent::Planned { total: tasks.len() });

        for (index, task) in tasks.into_iter().enumerate() {
            let outcome = processor.process(&task, Some(index));
            if let Err(err) = &outcome {
                log::debug!("{}: {}", task.display(), err);
            }
            let kind = reporter.record_outcome(&task, outcome);
            on_event(&JobEvent::Finished {
                index,
                path: task,
                outcome: kind,
            });
        }
    } else {
        return Err(PulpError::InvalidInputType { path: input_path });
    }

    Ok(reporter.into_report())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImageMetadata, NamingStrategy, Totals};
    use crate::processors::RenderPlan;
    use std::fs;

    /// Fails to probe any file whose name contains "bad".
    struct FlakyBackend;

    impl ImageBackend for FlakyBackend {
        fn probe(&self, path: &Path) -> Result<ImageMetadata> {
            if path.to_string_lossy().contains("bad") {
                return Err(PulpError::Decode {
                    path: path.to_path_buf(),
                    message: "corrupt".to_string(),
                });
            }
            Ok(ImageMetadata {
                width: 1,
                height: 1,
                format: "png".to_string(),
                has_alpha: false,
            })
        }

        fn render(&self, _input: &Path, output: &Path, _plan: &RenderPlan) -> Result<()> {
            fs::write(output, b"out")?;
            Ok(())
        }
    }

    #[test]
    fn test_missing_input() {
        let temp = tempfile::tempdir().unwrap();
        let err = run_job(&temp.path().join("missing"), &ProcessConfig::default()).unwrap_err();
        assert!(matches!(err, PulpError::InputNotFound { .. }));
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("notes.txt"), b"x").unwrap();

        let mut events = Vec::new();
        let report = run_job_with(
            temp.path(),
            &ProcessConfig::default(),
            FlakyBackend,
            |e| events.push(e.clone()),
        )
        .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.totals, Totals::default());
        assert!(events.is_empty());
    }

    #[test]
    fn test_partial_failure_keeps_going_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        fs::create_dir(&input).unwrap();
        for name in ["1.png", "2-bad.png", "3.png"] {
            fs::write(input.join(name), b"source-bytes").unwrap();
        }
        let config = ProcessConfig {
            out_dir: temp.path().join("out"),
            ..Default::default()
        };

        let mut events = Vec::new();
        let report = run_job_with(&input, &config, FlakyBackend, |e| events.push(e.clone())).unwrap();

        assert_eq!(report.processed.len() + report.skipped.len() + report.failed.len(), 3);
        let processed: Vec<_> = report
            .processed
            .iter()
            .map(|r| r.input_path.file_name().unwrap().to_owned())
            .collect();
        assert_eq!(processed, vec!["1.png", "3.png"]);
        assert!(report.failed[0].file_path.ends_with("2-bad.png"));

        assert_eq!(events[0], JobEvent::Planned { total: 3 });
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[2],
            JobEvent::Finished { index: 1, outcome: OutcomeKind::Failed, .. }
        ));
    }

    #[test]
    fn test_template_index_follows_listing_order() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        fs::create_dir(&input).unwrap();
        for name in ["b.png", "a.png"] {
            fs::write(input.join(name), b"x").unwrap();
        }
        let config = ProcessConfig {
            out_dir: temp.path().join("out"),
            naming: NamingStrategy::Template { pattern: "{index}-{name}".to_string() },
            ..Default::default()
        };

        let report = run_job_with(&input, &config, FlakyBackend, |_| {}).unwrap();
        let outputs: Vec<_> = report
            .processed
            .iter()
            .map(|r| r.output_path.file_name().unwrap().to_owned())
            .collect();
        assert_eq!(outputs, vec!["1-a.png", "2-b.png"]);
    }

    #[test]
    fn test_single_file_skip_is_classified() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("a.png");
        fs::write(&input, b"x").unwrap();
        let config = ProcessConfig {
            out_dir: temp.path().to_path_buf(),
            ..Default::default()
        };

        let report = run_job_with(&input, &config, FlakyBackend, |_| {}).unwrap();
        assert_eq!(report.totals.skipped_count, 1);
        assert!(report.skipped[0].reason.contains("same"));
    }

    #[test]
    fn test_colliding_template_skips_second_file() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        fs::create_dir(&input).unwrap();
        for name in ["a.png", "b.png"] {
            fs::write(input.join(name), b"x").unwrap();
        }
        let config = ProcessConfig {
            out_dir: temp.path().join("out"),
            naming: NamingStrategy::Template { pattern: "same".to_string() },
            ..Default::default()
        };

        let report = run_job_with(&input, &config, FlakyBackend, |_| {}).unwrap();
        assert_eq!(report.totals.processed_count, 1);
        assert_eq!(report.totals.skipped_count, 1);
    }
}
