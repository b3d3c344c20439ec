//! Command-line interface definitions for xtract.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueHint};

const CLI_EXAMPLES: &str = "Examples:\n  xtract extract backup.tar.gz\n  xtract x photo.zip -C ./photos\n  xtract extract --verify --tool 7z=7zz bundle.7z\n  xtract classify --json *.tgz\n";

/// Top-level CLI parser.
#[derive(Debug, Parser)]
#[command(
    name = "xtract",
    version,
    about = "Extract an archive with the right tool for its filename",
    long_about = "Classifies an archive by its filename suffix and runs exactly one external tool (tar, unzip, 7z, ...) to extract it.",
    after_help = CLI_EXAMPLES,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Emit debug logging.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
    /// Reduce output to errors only.
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract an archive with its external tool.
    #[command(alias = "x")]
    Extract(ExtractArgs),
    /// Show how paths would be extracted without running anything.
    #[command(alias = "c")]
    Classify(ClassifyArgs),
    /// List recognised suffixes in match order.
    Formats(ToolArgs),
}

/// Tool override sources shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct ToolArgs {
    /// Replace the program used for a tool, e.g. `gunzip=/opt/bin/gunzip`.
    #[arg(long = "tool", value_name = "NAME=PROGRAM")]
    pub tool: Vec<String>,
    /// JSON file with a `tools` table of overrides.
    #[arg(long = "config", value_hint = ValueHint::FilePath)]
    pub config: Option<Utf8PathBuf>,
}

/// Arguments for the `extract` subcommand.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Archive to extract.
    #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub path: Utf8PathBuf,
    /// Run the tool from this directory.
    #[arg(short = 'C', long = "directory", value_hint = ValueHint::DirPath)]
    pub directory: Option<Utf8PathBuf>,
    /// Refuse to run when the file header does not match its suffix.
    #[arg(long = "verify")]
    pub verify: bool,
    /// Print the command instead of running it.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    #[command(flatten)]
    pub tools: ToolArgs,
}

/// Arguments for the `classify` subcommand.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Paths to classify; they need not exist.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<Utf8PathBuf>,
    /// Emit machine-readable JSON.
    #[arg(long = "json")]
    pub json: bool,
    #[command(flatten)]
    pub tools: ToolArgs,
}
