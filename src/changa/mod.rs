//! Parameter operations for the external N-body/SPH simulator.
//!
//! Everything here takes the [`Defaults`] explicitly; lookups fall back to
//! the simulator's built-in defaults when a run's param omits a key.

mod builders;
mod schedule;

pub use builders::{make_director, make_param, Director};
pub use schedule::{setup_param, SnapshotSource};

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::defaults::Defaults;
use crate::error::{ParamError, ParamResult};
use crate::format::{Config, Dialect, Value};
use crate::units::{Unit, UnitSystem};

/// A param given either in memory or as a file to parse.
#[derive(Debug, Clone, Copy, Default)]
pub enum ParamSource<'a> {
    /// No param: only the simulator defaults apply.
    #[default]
    Empty,
    Config(&'a Config),
    Path(&'a Path),
}

impl<'a> ParamSource<'a> {
    /// Borrow or load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an I/O or parse error when loading from a path fails.
    pub fn resolve(self) -> ParamResult<Cow<'a, Config>> {
        match self {
            Self::Empty => Ok(Cow::Owned(Config::new())),
            Self::Config(config) => Ok(Cow::Borrowed(config)),
            Self::Path(path) => Ok(Cow::Owned(Config::load(path, Dialect::Param)?)),
        }
    }
}

impl<'a> From<&'a Config> for ParamSource<'a> {
    fn from(config: &'a Config) -> Self {
        Self::Config(config)
    }
}

impl<'a> From<&'a Path> for ParamSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ParamSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::Path(path.as_path())
    }
}

/// Look up `key` in `param`, falling back to the simulator defaults.
///
/// # Errors
///
/// Returns [`ParamError::KeyNotFound`] if neither has the key, or a load
/// error if `param` is a path that cannot be read.
pub fn getpar(defaults: &Defaults, key: &str, param: ParamSource<'_>) -> ParamResult<Value> {
    let param = param.resolve()?;
    param
        .get(key)
        .or_else(|| defaults.simulator().get(key))
        .cloned()
        .ok_or_else(|| ParamError::key_not_found(key))
}

/// [`getpar`] for numeric keys.
///
/// # Errors
///
/// As [`getpar`], plus a validation error if the value is not a number.
pub fn getpar_f64(defaults: &Defaults, key: &str, param: ParamSource<'_>) -> ParamResult<f64> {
    let value = getpar(defaults, key, param)?;
    value
        .as_f64()
        .ok_or_else(|| ParamError::validation(format!("'{key}' must be numeric, got '{value}'")))
}

/// Simulation units described by a param.
///
/// Mass unit is `dMsolUnit` solar masses, length unit is `dKpcUnit`
/// kiloparsecs, and the time unit (G = 1) is re-expressed in years.
///
/// # Errors
///
/// Returns an error if the param cannot be loaded or its unit keys are not
/// numeric.
pub fn units_from_param(defaults: &Defaults, param: ParamSource<'_>) -> ParamResult<UnitSystem> {
    let param = param.resolve()?;
    let source = ParamSource::Config(&*param);

    let kpc_unit = getpar_f64(defaults, "dKpcUnit", source)?;
    let msol_unit = getpar_f64(defaults, "dMsolUnit", source)?;

    let mass = Unit::scaled(msol_unit, &Unit::parse("Msol")?);
    let length = Unit::scaled(kpc_unit, &Unit::parse("kpc")?);
    let time = UnitSystem::dynamical_time(&mass, &length)?.rescaled(&Unit::parse("yr")?)?;

    log::debug!("units_from_param: m = {mass}, l = {length}, t = {time}");
    UnitSystem::from_parts(mass, length, time)
}

/// [`units_from_param`] over several params, computed lazily and in order.
pub fn units_from_params<'a, I>(
    defaults: &'a Defaults,
    params: I,
) -> impl Iterator<Item = ParamResult<UnitSystem>> + 'a
where
    I: IntoIterator<Item = ParamSource<'a>>,
    I::IntoIter: 'a,
{
    params
        .into_iter()
        .map(move |param| units_from_param(defaults, param))
}
