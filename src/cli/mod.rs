//! CLI module for diskparam.
//!
//! All CLI logic lives here rather than in main.rs so that it can be
//! tested. `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{
    find, run_cli, run_plan, schedule, show_setup_units, show_units, write_director, write_param,
};
pub use output::{
    format_unit_system, print_found, print_help, print_unit_system, print_version,
    unit_system_json,
};
