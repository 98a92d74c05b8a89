//! diskparam CLI
//!
//! Command-line interface for building and scheduling simulation
//! parameter files.

use diskparam::cli::{run_cli, Args};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run_cli(Args::parse())
}
