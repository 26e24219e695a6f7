//! PLCT CLI - batch extraction of digital-transformation initiatives from annual reports.

use clap::Parser;
use plct_cli::commands;
use plct_cli::{AppConfig, Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr; RUST_LOG wins over --verbose
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> plct_cli::Result<i32> {
    let config = AppConfig::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.output.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.output.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => {
            let status = commands::execute_run(args, config, &formatter).await?;
            Ok(commands::exit_code(status))
        }
        Command::Show(args) => {
            commands::execute_show(args, config, &formatter)?;
            Ok(0)
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, cli.config.as_deref())?;
            Ok(0)
        }
    }
}
