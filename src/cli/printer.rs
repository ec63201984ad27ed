// pulp-image/src/cli/printer.rs
//! Terminal presentation for CLI runs.
use crate::core::reporter::JobReport;
use crate::core::{FailureRecord, ProcessResult, SkipRecord};
use crate::utils::{format_file_size, format_signed_size};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Boxed title shown at the start of every run.
pub fn banner(version: &str) -> String {
    let title = format!("🍊 pulp-image v{}", version);
    let subtitle = "Image processing made simple";
    let width = title.chars().count().max(subtitle.chars().count()) + 4;

    let center = |text: &str| {
        let spaces = width - text.chars().count();
        let left = spaces / 2;
        format!("║{}{}{}║", " ".repeat(left), text, " ".repeat(spaces - left))
    };
    let empty = format!("║{}║", " ".repeat(width));

    [
        format!("╔{}╗", "═".repeat(width)),
        empty.clone(),
        center(&title),
        empty.clone(),
        center(subtitle),
        empty,
        format!("╚{}╝", "═".repeat(width)),
    ]
    .join("\n")
}

pub fn print_banner() {
    println!("\n{}\n", banner(env!("CARGO_PKG_VERSION")).cyan());
}

fn result_lines(result: &ProcessResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "  Original: {} ({}x{})",
            format_file_size(result.original_size),
            result.metadata.width,
            result.metadata.height
        ),
        format!("  Final:    {}", format_file_size(result.final_size)),
        format!(
            "  Saved:    {} ({}%)",
            format_signed_size(result.bytes_saved),
            result.percent_saved
        ),
    ];
    for warning in &result.warnings {
        lines.push(format!("  Warning: {}", warning));
    }
    lines
}

fn print_result(result: &ProcessResult, label: &str) {
    println!("{}", format!("\n✓ {}{}", label, result.output_path.display()).green());
    for line in result_lines(result) {
        println!("{}", line.dimmed());
    }
    if let Some(err) = &result.delete_error {
        println!("{}", format!("  Warning: Failed to delete original: {}", err).yellow());
    }
}

fn print_skip(record: &SkipRecord) {
    println!("{}", format!("⚠ Skipped: {}", record.file_path.display()).yellow());
    println!("{}", format!("  Reason: {}", record.reason).dimmed());
}

fn print_failure(record: &FailureRecord, verbose: bool) {
    eprintln!("{}", format!("✗ Failed: {}", record.file_path.display()).red());
    if verbose {
        eprintln!("{}", format!("  Error: {}", record.error).dimmed());
    }
}

/// Detail for a single-file run: exactly one of the buckets is populated.
pub fn print_single(report: &JobReport, verbose: bool) {
    if let Some(result) = report.processed.first() {
        print_result(result, "Processed: ");
    } else if let Some(record) = report.skipped.first() {
        println!();
        print_skip(record);
    } else if let Some(record) = report.failed.first() {
        eprintln!("{}", format!("\n✗ Error: {}", record.error).red());
        if verbose {
            eprintln!("{}", format!("  File: {}", record.file_path.display()).dimmed());
        }
    }
}

/// Per-file lines for a directory run. Quiet mode only lists failures.
pub fn print_batch(report: &JobReport, verbose: bool) {
    if verbose {
        for result in &report.processed {
            print_result(result, "");
        }
        for record in &report.skipped {
            print_skip(record);
        }
    }
    for record in &report.failed {
        print_failure(record, verbose);
    }
}

pub fn summary_lines(report: &JobReport, verbose: bool) -> Vec<String> {
    let totals = &report.totals;
    let mut lines = Vec::new();

    if totals.processed_count > 0 {
        lines.push(format!("\n✓ Processed: {} file(s)", totals.processed_count));
        lines.push(format!("  Total original size: {}", format_file_size(totals.total_original)));
        lines.push(format!("  Total final size:    {}", format_file_size(totals.total_final)));
        lines.push(format!(
            "  Total saved:         {} ({}%)",
            format_signed_size(totals.total_saved),
            totals.percent_saved
        ));
    }

    if totals.skipped_count > 0 {
        lines.push(format!("\n⚠ Skipped: {} file(s)", totals.skipped_count));
        if verbose {
            lines.extend(
                report
                    .skipped
                    .iter()
                    .map(|s| format!("  - {}: {}", s.file_path.display(), s.reason)),
            );
        }
    }

    if totals.failed_count > 0 {
        lines.push(format!("\n✗ Failed: {} file(s)", totals.failed_count));
        if verbose {
            lines.extend(
                report
                    .failed
                    .iter()
                    .map(|f| format!("  - {}: {}", f.file_path.display(), f.error)),
            );
        }
    }

    lines
}

pub fn print_summary(report: &JobReport, verbose: bool) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}", format!("\n{}", rule).cyan());
    println!("{}", "Processing Summary".cyan().bold());
    println!("{}", rule.cyan());

    for line in summary_lines(report, verbose) {
        let trimmed = line.trim_start();
        if trimmed.starts_with('✓') {
            println!("{}", line.green());
        } else if trimmed.starts_with('⚠') {
            println!("{}", line.yellow());
        } else if trimmed.starts_with('✗') {
            println!("{}", line.red());
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!("{}", format!("\n{}", rule).cyan());
}

pub fn print_found(total: usize) {
    println!("{}", format!("Found {} image file(s) to process...\n", total).dimmed());
}

pub fn print_nothing_to_do(dir: &Path) {
    println!(
        "{}",
        format!("\nNo supported image files found in: {}", dir.display()).yellow()
    );
}

pub fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::debug!("Progress template rejected: {}", e),
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, Totals};
    use std::path::PathBuf;

    #[test]
    fn test_banner_lines_have_equal_width() {
        let banner = banner("0.1.0");
        let widths: Vec<usize> = banner.lines().map(|l| l.chars().count()).collect();
        assert_eq!(widths.len(), 7);
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(banner.contains("pulp-image v0.1.0"));
    }

    #[test]
    fn test_summary_lists_details_only_when_verbose() {
        let report = JobReport {
            skipped: vec![SkipRecord {
                file_path: PathBuf::from("/in/a.png"),
                reason: "Output file already exists".to_string(),
                kind: ErrorKind::OutputExists,
            }],
            totals: Totals { skipped_count: 1, ..Default::default() },
            ..Default::default()
        };

        let quiet = summary_lines(&report, false);
        assert_eq!(quiet, vec!["\n⚠ Skipped: 1 file(s)".to_string()]);

        let verbose = summary_lines(&report, true);
        assert_eq!(verbose.len(), 2);
        assert!(verbose[1].contains("/in/a.png: Output file already exists"));
    }

    #[test]
    fn test_summary_reports_growth_as_negative() {
        let report = JobReport {
            totals: Totals {
                total_original: 1024,
                total_final: 2048,
                total_saved: -1024,
                percent_saved: -100.0,
                processed_count: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let lines = summary_lines(&report, false);
        assert!(lines[3].contains("-1.00 KB (-100%)"));
    }
}
