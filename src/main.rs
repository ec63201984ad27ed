use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use pulp_image::cli::printer;
use pulp_image::cli::{Cli, Commands};
use pulp_image::core::job::{run_job_with, JobEvent};
use pulp_image::processors::CodecBackend;
use pulp_image::update::{format_update_message, CratesIoSource, FileCacheStore, SystemClock, UpdateChecker};
use pulp_image::utils::resolve_path;
use pulp_image::{server, ProcessConfig};
use std::path::Path;
use std::process::ExitCode;
use std::thread::JoinHandle;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    printer::print_banner();

    let result = match cli.command {
        Some(Commands::Ui { port, no_open }) => run_ui(port, !no_open),
        None => run_cli(&cli),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("\nError: {:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

fn run_ui(port: u16, open_browser: bool) -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::serve(port, open_browser))?;
    Ok(ExitCode::SUCCESS)
}

fn run_cli(cli: &Cli) -> anyhow::Result<ExitCode> {
    let Some(input) = cli.input.as_deref() else {
        println!(
            "{}",
            "\nNo input specified. Use --help for usage information.".yellow()
        );
        return Ok(ExitCode::FAILURE);
    };

    let config = cli.process_config();
    config.validate()?;

    let update_check = (!cli.no_update_check).then(spawn_update_check);
    let code = process(input, &config, cli.verbose);

    if let Some(message) = update_check.and_then(|handle| handle.join().ok().flatten()) {
        println!("{}", format!("\n{}", message).yellow());
    }

    code
}

fn process(input: &Path, config: &ProcessConfig, verbose: bool) -> anyhow::Result<ExitCode> {
    let input = resolve_path(input)?;
    let is_dir = input.is_dir();

    if !is_dir && verbose {
        println!("{}", format!("\nProcessing: {}", input.display()).dimmed());
    }

    let mut bar = None;
    let report = run_job_with(&input, config, CodecBackend::new(), |event| match event {
        JobEvent::Planned { total } => {
            printer::print_found(*total);
            if !verbose {
                bar = Some(printer::progress_bar(*total));
            }
        }
        JobEvent::Finished { path, .. } => {
            if let Some(pb) = &bar {
                pb.set_message(
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
                pb.inc(1);
            }
        }
    });

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }
    let report = report?;

    if is_dir {
        if report.is_empty() {
            printer::print_nothing_to_do(&input);
            return Ok(ExitCode::SUCCESS);
        }
        printer::print_batch(&report, verbose);
    } else {
        printer::print_single(&report, verbose);
    }

    if is_dir || !report.skipped.is_empty() || !report.failed.is_empty() {
        printer::print_summary(&report, verbose);
    }

    if !is_dir && !report.failed.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs alongside processing; yields a notice only when a newer release exists.
fn spawn_update_check() -> JoinHandle<Option<String>> {
    std::thread::spawn(|| {
        let store = FileCacheStore::default_location()?;
        let checker = UpdateChecker::new(SystemClock, store, CratesIoSource::new());
        let info = checker.check(env!("CARGO_PKG_VERSION"), false);
        format_update_message(&info)
    })
}
