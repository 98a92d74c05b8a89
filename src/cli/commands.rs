//! CLI command handlers.
//!
//! Each handler returns a [`ParamResult`]; [`run_cli`] turns errors into a
//! message on stderr and exit code 1.

use std::path::Path;
use std::process::ExitCode;

use super::output::{print_found, print_help, print_unit_system, print_version, print_written};
use super::{Args, Command};
use crate::changa::{
    make_director, make_param, setup_param, units_from_param, ParamSource, SnapshotSource,
};
use crate::config::{DirectorRequest, RunPlan, ScheduleOptions};
use crate::defaults::Defaults;
use crate::discovery::find_param_names;
use crate::error::ParamResult;
use crate::format::{Config, Dialect};
use crate::snapshot::{read_tipsy, TipsyUnits};
use crate::units::setup_units;

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    let result = match args.command {
        Command::Units { param_path, json } => show_units(&param_path, json),
        Command::SetupUnits { mass, length, json } => show_setup_units(&mass, &length, json),
        Command::Director {
            sigma_min,
            sigma_max,
            r,
            resolution,
            filename,
            output,
        } => {
            let mut request = DirectorRequest::new(sigma_min, sigma_max, r);
            if let Some(resolution) = resolution {
                request = request.with_resolution(resolution);
            }
            if let Some(filename) = filename {
                request = request.with_filename(filename);
            }
            write_director(&request, output.as_deref())
        }
        Command::Schedule {
            param_path,
            snapshot,
            plan,
            output,
        } => schedule(&param_path, snapshot.as_deref(), plan.as_deref(), output.as_deref()),
        Command::MakeParam {
            snapshot,
            units_param,
            name,
            output,
        } => write_param(&snapshot, &units_param, name.as_deref(), output.as_deref()),
        Command::Plan {
            plan_path,
            output_dir,
        } => run_plan(&plan_path, output_dir.as_deref().unwrap_or_else(|| Path::new("."))),
        Command::Find { simdir, prefix } => find(&simdir, prefix.as_deref()),
        Command::Invalid { message } => {
            eprintln!("Error: {message}\n");
            print_help();
            return ExitCode::from(1);
        }
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Print the unit system of a param file.
///
/// # Errors
///
/// Returns an error if the param cannot be read or has non-numeric units.
pub fn show_units(param_path: &Path, json: bool) -> ParamResult<()> {
    let defaults = Defaults::bundled()?;
    let system = units_from_param(&defaults, ParamSource::Path(param_path))?;
    print_unit_system(&system, json)
}

/// Print the unit system derived from a mass and a length unit.
///
/// # Errors
///
/// Returns a unit error if either cannot be parsed.
pub fn show_setup_units(mass: &str, length: &str, json: bool) -> ParamResult<()> {
    let system = setup_units(mass, length)?;
    print_unit_system(&system, json)
}

/// Write a director file, or print it when `output` is `None`.
///
/// # Errors
///
/// Returns an error for an invalid request or if writing fails.
pub fn write_director(request: &DirectorRequest, output: Option<&Path>) -> ParamResult<()> {
    let defaults = Defaults::bundled()?;
    let director = make_director(&defaults, request)?;
    log::info!("logscale_min = {:e}", director.logscale_min);
    emit(&director.config, Dialect::Director, output, "director")
}

/// Schedule a run and write the updated param.
///
/// # Errors
///
/// Returns an error if the plan is invalid, a file cannot be read, or the
/// schedule cannot be computed.
pub fn schedule(
    param_path: &Path,
    snapshot: Option<&Path>,
    plan: Option<&Path>,
    output: Option<&Path>,
) -> ParamResult<()> {
    let defaults = Defaults::bundled()?;
    let opts = match plan {
        Some(plan) => RunPlan::load(plan)?.schedule,
        None => ScheduleOptions::default(),
    };
    let source = snapshot.map_or(SnapshotSource::FromParam, SnapshotSource::Path);
    let param = setup_param(&defaults, ParamSource::Path(param_path), source, &opts)?;
    emit(&param, Dialect::Param, output, "param")
}

/// Write a fresh param for a tipsy snapshot.
///
/// # Errors
///
/// Returns an error if either file cannot be read or writing fails.
pub fn write_param(
    snapshot: &Path,
    units_param: &Path,
    name: Option<&str>,
    output: Option<&Path>,
) -> ParamResult<()> {
    let defaults = Defaults::bundled()?;
    let units = TipsyUnits::from_param(&defaults, ParamSource::Path(units_param))?;
    let snapshot = read_tipsy(snapshot, &units)?;
    let param = make_param(&defaults, &snapshot, name)?;
    emit(&param, Dialect::Param, output, "param")
}

/// Validate a plan, print its unit system and write its director file.
///
/// # Errors
///
/// Returns an error if the plan is invalid or writing fails.
pub fn run_plan(plan_path: &Path, output_dir: &Path) -> ParamResult<()> {
    let plan = RunPlan::load(plan_path)?;
    println!("✓ plan {} is valid", plan_path.display());

    if let Some(units) = &plan.units {
        print_unit_system(&setup_units(&units.mass, &units.length)?, false)?;
    }
    if let Some(request) = &plan.director {
        let path = output_dir.join(format!("{}.director", request.filename));
        write_director(request, Some(&path))?;
    }
    Ok(())
}

/// Print the param and log files found in `simdir`.
///
/// # Errors
///
/// Returns an error if `simdir` cannot be listed.
pub fn find(simdir: &Path, prefix: Option<&str>) -> ParamResult<()> {
    let defaults = Defaults::bundled()?;
    let (param, log) = find_param_names(&defaults, simdir, None, prefix)?;
    print_found(param.as_deref(), log.as_deref());
    Ok(())
}

fn emit(config: &Config, dialect: Dialect, output: Option<&Path>, what: &str) -> ParamResult<()> {
    match output {
        Some(path) => {
            config.save(path, dialect)?;
            print_written(path, what);
        }
        None => {
            config.check_writable(dialect)?;
            print!("{}", config.to_text(dialect));
        }
    }
    Ok(())
}
