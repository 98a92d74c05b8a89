//! CLI output formatting.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{ParamError, ParamResult};
use crate::units::UnitSystem;

/// Print version information.
pub fn print_version() {
    println!(
        "diskparam {} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("DISKPARAM_GIT_HASH").unwrap_or("unknown")
    );
}

/// Print help message.
pub fn print_help() {
    println!(
        r"diskparam - parameter files for protoplanetary disk simulations

USAGE:
    diskparam <COMMAND> [OPTIONS]

COMMANDS:
    units <file.param>          Print the unit system a param file implies
        --json                  Print as JSON

    setup-units <mass> <length> Derive time, velocity, density and pressure
                                units, e.g. setup-units Msol au
        --json                  Print as JSON

    director <sigma_min> <sigma_max> <r>
                                Write a director file for new density bounds
        --resolution <N>        Pixels per side (default: 1200)
        --file <NAME>           Frame file prefix (default: snapshot)
        -o, --output <FILE>     Write to FILE instead of stdout

    schedule <file.param>       Set nSteps and output intervals from the
                                orbital period at the disk edge
        --snapshot <FILE>       Tipsy snapshot (default: the param's achInFile)
        --plan <plan.yaml>      Read r_orb, n_orb and output counts from a plan
        -o, --output <FILE>     Write to FILE instead of stdout

    make-param <snapshot>       Write a param for a tipsy snapshot
        --units <file.param>    Param whose units the snapshot is in (required)
        --name <FILE>           Input file name to record (default: snapshot)
        -o, --output <FILE>     Write to FILE instead of stdout

    plan <plan.yaml>            Validate a plan and run its units and director
                                sections
        -o, --output <DIR>      Directory for the director file (default: .)

    find [DIR]                  Locate the .param and .log files of a run
        --prefix <P>            Try P.param and P.log first

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    diskparam setup-units '0.8 Msol' au
    diskparam director 1e-6 0.01 40 --resolution 800 -o disk.director
    diskparam schedule disk.param --plan plan.yaml -o disk.param

Log verbosity follows RUST_LOG (default: info).
"
    );
}

/// Unit system as aligned `key = unit` lines.
#[must_use]
pub fn format_unit_system(system: &UnitSystem) -> String {
    let mut out = String::new();
    for (role, unit) in system.iter() {
        let _ = writeln!(out, "{:<9} = {unit}  ({})", role.key(), unit.canonical());
    }
    out
}

/// Unit system as a JSON object of unit labels.
///
/// # Errors
///
/// Returns [`ParamError::Serialization`] if encoding fails.
pub fn unit_system_json(system: &UnitSystem) -> ParamResult<String> {
    serde_json::to_string_pretty(system).map_err(|e| ParamError::Serialization(e.to_string()))
}

/// Print a unit system, as JSON when `json` is set.
///
/// # Errors
///
/// Returns [`ParamError::Serialization`] if JSON encoding fails.
pub fn print_unit_system(system: &UnitSystem, json: bool) -> ParamResult<()> {
    if json {
        println!("{}", unit_system_json(system)?);
    } else {
        print!("{}", format_unit_system(system));
    }
    Ok(())
}

/// Print the result of a param/log search.
pub fn print_found(param: Option<&Path>, log: Option<&Path>) {
    let show = |path: Option<&Path>| path.map_or_else(|| "not found".to_string(), |p| p.display().to_string());
    println!("param: {}", show(param));
    println!("log:   {}", show(log));
}

/// Report a file written by a command.
pub fn print_written(path: &Path, what: &str) {
    println!("✓ wrote {what} to {}", path.display());
}
