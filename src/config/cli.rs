use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

use crate::application::indexer::SourceFormat;

/// Command-line arguments for the `lectio` binary.
#[derive(Debug, Parser)]
#[command(
    name = "lectio",
    version,
    about = "Reading-position tracking for long-form posts"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "LECTIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the table of contents of a markdown or HTML document.
    Index(IndexArgs),
    /// Print rendered HTML with heading anchors applied.
    Ids(IdsArgs),
    /// Play back a recorded viewport trace and print one JSON line per result.
    Replay(ReplayArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Markdown,
    Html,
}

impl From<FormatArg> for SourceFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Markdown => SourceFormat::Markdown,
            FormatArg::Html => SourceFormat::Html,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct IndexArgs {
    /// Document to index.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Source format; inferred from the file extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Region identifier attached to the emitted markers.
    #[arg(long, default_value = "document")]
    pub region: String,

    /// Emit markers as JSON instead of an indented outline.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

impl IndexArgs {
    pub fn source_format(&self) -> SourceFormat {
        self.format
            .map(SourceFormat::from)
            .unwrap_or_else(|| infer_format(&self.file))
    }
}

#[derive(Debug, Args, Clone)]
pub struct IdsArgs {
    /// Rendered HTML document.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Default, Clone)]
pub struct TrackerOverrides {
    /// Override the active-heading threshold in pixels from the viewport top.
    #[arg(long = "active-threshold-px", value_name = "PX")]
    pub active_threshold_px: Option<f64>,

    /// Override the load-trigger distance in pixels below the viewport.
    #[arg(long = "trigger-distance-px", value_name = "PX")]
    pub trigger_distance_px: Option<f64>,

    /// Override the fixed-header offset used when scrolling to a heading.
    #[arg(long = "header-offset-px", value_name = "PX")]
    pub header_offset_px: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub overrides: TrackerOverrides,

    /// JSON trace to play back.
    #[arg(value_name = "TRACE", value_hint = ValueHint::FilePath)]
    pub trace: PathBuf,
}

fn infer_format(path: &Path) -> SourceFormat {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("html" | "htm") => SourceFormat::Html,
        _ => SourceFormat::Markdown,
    }
}
