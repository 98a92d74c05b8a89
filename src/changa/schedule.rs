//! Run length and output cadence from an orbital period.

use std::f64::consts::PI;
use std::path::Path;

use super::{getpar, getpar_f64, units_from_param, ParamSource};
use crate::config::ScheduleOptions;
use crate::defaults::Defaults;
use crate::error::{ParamError, ParamResult};
use crate::format::Config;
use crate::snapshot::{read_tipsy, ParticleSnapshot, Snapshot, TipsyUnits};

/// Where [`setup_param`] gets its snapshot.
#[derive(Clone, Copy)]
pub enum SnapshotSource<'a> {
    Loaded(&'a dyn Snapshot),
    /// A tipsy file, read with the param's units.
    Path(&'a Path),
    /// The tipsy file named by the param's `achInFile`.
    FromParam,
}

impl<'a> From<&'a dyn Snapshot> for SnapshotSource<'a> {
    fn from(snapshot: &'a dyn Snapshot) -> Self {
        Self::Loaded(snapshot)
    }
}

impl<'a> From<&'a ParticleSnapshot> for SnapshotSource<'a> {
    fn from(snapshot: &'a ParticleSnapshot) -> Self {
        Self::Loaded(snapshot)
    }
}

impl<'a> From<&'a Path> for SnapshotSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

/// Set `nSteps` and the output intervals of a param.
///
/// The run lasts `n_orb` Keplerian periods at `r_orb` times the outermost
/// gas radius around the total star mass, in the param's own units (G = 1):
///
/// * `nSteps = round(n_orb · 2π √(R³/M) / dDelta)`
/// * `dDumpFrameStep = nSteps / n_image`
/// * `iOutInterval = nSteps / n_snap`
/// * `iCheckInterval = nSteps / n_check`
///
/// Intervals use integer division. The caller's param is not modified.
///
/// # Errors
///
/// Returns a validation error for bad options (checked before anything is
/// loaded), a snapshot without gas, a non-positive star mass or `dDelta`,
/// or a step count that does not fit an integer. Load errors propagate.
pub fn setup_param(
    defaults: &Defaults,
    param: ParamSource<'_>,
    snapshot: SnapshotSource<'_>,
    opts: &ScheduleOptions,
) -> ParamResult<Config> {
    opts.check()?;
    let mut param = param.resolve()?.into_owned();

    let loaded: ParticleSnapshot;
    let snapshot: &dyn Snapshot = match snapshot {
        SnapshotSource::Loaded(snapshot) => snapshot,
        SnapshotSource::Path(path) => {
            let units = TipsyUnits::from_param(defaults, ParamSource::Config(&param))?;
            loaded = read_tipsy(path, &units)?;
            &loaded
        }
        SnapshotSource::FromParam => {
            let infile = getpar(defaults, "achInFile", ParamSource::Config(&param))?;
            let infile = infile
                .as_str()
                .ok_or_else(|| ParamError::validation("achInFile must be a file name"))?
                .to_string();
            let units = TipsyUnits::from_param(defaults, ParamSource::Config(&param))?;
            loaded = read_tipsy(&infile, &units)?;
            &loaded
        }
    };

    let units = units_from_param(defaults, ParamSource::Config(&param))?;
    let r_max = snapshot
        .gas_max_rxy()
        .ok_or_else(|| ParamError::validation("snapshot has no gas particles"))?;
    let r = opts.r_orb * r_max.in_units(&units.length)?;
    let m = snapshot.star_total_mass().in_units(&units.mass)?;
    if !(m.is_finite() && m > 0.0) {
        return Err(ParamError::validation("total star mass must be positive"));
    }

    let delta = getpar_f64(defaults, "dDelta", ParamSource::Config(&param))?;
    if !(delta.is_finite() && delta > 0.0) {
        return Err(ParamError::validation(format!(
            "dDelta must be positive, got {delta}"
        )));
    }

    let period = 2.0 * PI * (r.powi(3) / m).sqrt();
    let n_steps = step_count(opts.n_orb * period / delta)?;
    log::info!("orbital period {period:.6} (sim units), {n_steps} steps of {delta}");

    param.set("nSteps", n_steps);
    param.set("dDumpFrameStep", interval(n_steps, opts.images(), "n_image")?);
    param.set("iOutInterval", interval(n_steps, opts.n_snap, "n_snap")?);
    param.set("iCheckInterval", interval(n_steps, opts.checkpoints(), "n_check")?);
    Ok(param)
}

#[allow(clippy::cast_possible_truncation)]
fn step_count(steps: f64) -> ParamResult<i64> {
    // Halves go to the even neighbour
    let steps = steps.round_ties_even();
    // i64::MAX is not exactly representable; stay below 2^63
    if !steps.is_finite() || steps < 0.0 || steps >= 2f64.powi(63) {
        return Err(ParamError::validation(format!(
            "step count {steps} is out of range"
        )));
    }
    Ok(steps as i64)
}

fn interval(n_steps: i64, count: u32, name: &str) -> ParamResult<i64> {
    if count == 0 {
        return Err(ParamError::validation(format!("{name} must be at least 1")));
    }
    Ok(n_steps / i64::from(count))
}
