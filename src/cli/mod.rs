// pulp-image/src/cli/mod.rs
pub mod printer;

use crate::core::{AlphaMode, NamingStrategy, OutputFormat, ProcessConfig};
use crate::server::DEFAULT_PORT;
use clap::{value_parser, ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Examples:
  $ pulp image.png --format webp --quality 95
  $ pulp image.png --width 800
  $ pulp image.png --width 800 --height 600 --auto-suffix
  $ pulp ./images --format webp --out ./output --verbose
  $ pulp image.png --format jpg --background \"#ff0000\"
  $ pulp ./images --rename \"{name}-{index}\" --format avif
  $ pulp ui --port 8080

Compression:
  PNG:  always lossless (no quality setting)
  JPG:  always lossy, default quality 80
  WebP: lossy by default (quality 80), --lossless for lossless
  AVIF: lossy by default (quality 50), --lossless for lossless";

/// Resize, convert and compress images
#[derive(Parser, Debug)]
#[command(name = "pulp", author, version, about, after_help = AFTER_HELP)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Input file or directory
    pub input: Option<PathBuf>,

    /// Output width in pixels
    #[arg(short, long, value_parser = value_parser!(u32).range(1..=100_000))]
    pub width: Option<u32>,

    /// Output height in pixels
    #[arg(short = 'h', long, value_parser = value_parser!(u32).range(1..=100_000))]
    pub height: Option<u32>,

    /// Output format (defaults to the input's format)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output directory, created if missing
    #[arg(short, long, default_value = "./dist")]
    pub out: PathBuf,

    /// Custom suffix added before the extension
    #[arg(long)]
    pub suffix: Option<String>,

    /// Add a size-based suffix such as 800x600
    #[arg(long)]
    pub auto_suffix: bool,

    /// Rename pattern using {name}, {ext} and {index}; overrides suffixes
    #[arg(long, value_name = "PATTERN")]
    pub rename: Option<String>,

    /// Quality for lossy formats (1-100)
    #[arg(long, value_parser = value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Lossless compression where supported (PNG, WebP, AVIF)
    #[arg(long)]
    pub lossless: bool,

    /// Background colour used when flattening transparency
    #[arg(long, default_value = "#ffffff", value_name = "COLOR")]
    pub background: String,

    /// How to handle transparency the output format cannot store
    #[arg(long, value_enum, default_value_t = AlphaModeArg::Flatten)]
    pub alpha_mode: AlphaModeArg,

    /// Overwrite existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Delete originals after successful processing
    #[arg(long)]
    pub delete_original: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip the check for a newer release
    #[arg(long, global = true)]
    pub no_update_check: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the local browser UI
    Ui {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT, value_parser = value_parser!(u16).range(1..))]
        port: u16,

        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
    Webp,
    Avif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpg => OutputFormat::Jpg,
            FormatArg::Webp => OutputFormat::Webp,
            FormatArg::Avif => OutputFormat::Avif,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlphaModeArg {
    Flatten,
    Error,
}

impl From<AlphaModeArg> for AlphaMode {
    fn from(arg: AlphaModeArg) -> Self {
        match arg {
            AlphaModeArg::Flatten => AlphaMode::Flatten,
            AlphaModeArg::Error => AlphaMode::Error,
        }
    }
}

impl Cli {
    pub fn process_config(&self) -> ProcessConfig {
        ProcessConfig {
            width: self.width,
            height: self.height,
            format: self.format.map(Into::into),
            out_dir: self.out.clone(),
            naming: NamingStrategy::from_parts(
                self.rename.clone(),
                self.suffix.clone(),
                self.auto_suffix,
            ),
            quality: self.quality,
            lossless: self.lossless,
            background: self.background.clone(),
            alpha_mode: self.alpha_mode.into(),
            overwrite: self.overwrite,
            delete_original: self.delete_original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pulp", "photo.png"]).unwrap();
        let config = cli.process_config();
        assert_eq!(config.out_dir, PathBuf::from("./dist"));
        assert_eq!(config.background, "#ffffff");
        assert_eq!(config.alpha_mode, AlphaMode::Flatten);
        assert_eq!(config.format, None);
        assert_eq!(config.naming, NamingStrategy::default());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "pulp", "./images", "-w", "800", "-h", "600", "-f", "jpeg", "--quality", "70",
            "--suffix", "thumb", "--auto-suffix", "--alpha-mode", "error", "--overwrite",
        ])
        .unwrap();
        let config = cli.process_config();
        assert_eq!((config.width, config.height), (Some(800), Some(600)));
        assert_eq!(config.format, Some(OutputFormat::Jpg));
        assert_eq!(config.quality, Some(70));
        assert_eq!(config.alpha_mode, AlphaMode::Error);
        assert!(config.overwrite);
        assert_eq!(
            config.naming,
            NamingStrategy::Suffix { auto: true, custom: Some("thumb".to_string()) }
        );
    }

    #[test]
    fn test_rename_overrides_suffix() {
        let cli = Cli::try_parse_from(["pulp", "a.png", "--rename", "{name}_{index}", "--suffix", "x"])
            .unwrap();
        assert!(matches!(cli.process_config().naming, NamingStrategy::Template { .. }));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(Cli::try_parse_from(["pulp", "a.png", "--quality", "0"]).is_err());
        assert!(Cli::try_parse_from(["pulp", "a.png", "--quality", "101"]).is_err());
        assert!(Cli::try_parse_from(["pulp", "a.png", "--width", "0"]).is_err());
        assert!(Cli::try_parse_from(["pulp", "a.png", "--format", "gif"]).is_err());
    }

    #[test]
    fn test_ui_subcommand() {
        let cli = Cli::try_parse_from(["pulp", "ui", "--port", "8080", "--no-open"]).unwrap();
        match cli.command {
            Some(Commands::Ui { port, no_open }) => {
                assert_eq!(port, 8080);
                assert!(no_open);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["pulp", "ui"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Ui { port: DEFAULT_PORT, .. })));
        assert!(Cli::try_parse_from(["pulp", "ui", "--port", "0"]).is_err());
    }
}
