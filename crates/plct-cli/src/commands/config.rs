//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::AppConfig;
use crate::error::Result;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &AppConfig, explicit: Option<&Path>) -> Result<()> {
    if args.path {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => AppConfig::default_path()?,
        };
        println!("{}", path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
