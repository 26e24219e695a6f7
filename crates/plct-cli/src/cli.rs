//! CLI command definitions and argument parsing.

use crate::config::{OutputFormat, Provider};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// PLCT - Extract scored digital-transformation initiatives from annual reports.
#[derive(Debug, Parser)]
#[command(name = "plct")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.plct/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process every PDF in a directory
    Run(RunArgs),

    /// Show persisted companies or one company's initiatives
    Show(ShowArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Directory containing the annual-report PDFs
    pub dir: PathBuf,

    /// Database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Documents processed in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Reasoning engine provider
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Re-extract documents that were already persisted
    #[arg(long)]
    pub reprocess: bool,

    /// Seconds in-flight extractions may run after Ctrl-C
    #[arg(long)]
    pub grace_secs: Option<u64>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Filter by sector (e.g. "Financial Services")
    #[arg(short, long)]
    pub sector: Option<String>,

    /// Filter by report year
    #[arg(short, long)]
    pub year: Option<u16>,

    /// Show the initiatives of one company
    #[arg(long)]
    pub company_id: Option<i64>,

    /// Include companies without valid initiatives
    #[arg(short, long)]
    pub all: bool,

    /// Maximum number of companies
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Print the default configuration file path instead
    #[arg(long)]
    pub path: bool,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}
