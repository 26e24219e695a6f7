//! Command implementations.

pub mod config;
pub mod run;
pub mod show;

pub use self::config::execute_config;
pub use self::run::{execute_run, exit_code};
pub use self::show::execute_show;
