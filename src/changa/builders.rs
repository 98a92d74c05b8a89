//! Builders for new param and director configurations.

use std::path::Path;

use serde::Serialize;

use crate::config::DirectorRequest;
use crate::defaults::Defaults;
use crate::error::{ParamError, ParamResult};
use crate::format::{Config, Value, COMMENT_MARKER};
use crate::snapshot::Snapshot;
use crate::units::Unit;

/// Annotation in the director template naming its reference surface density.
const SIGMA_MAX_ANNOTATION: &str = "sigma_max";

/// A param for `snapshot`, seeded from the param template.
///
/// File names come from `filename` when given, else from the snapshot's
/// backing file. The output name is the input name without its extension.
/// Length and mass units are recorded as multiples of kpc and Msol.
///
/// # Errors
///
/// Returns [`ParamError::Validation`] if the file name would not survive a
/// save (whitespace, `#`, or a bare number), or
/// [`ParamError::IncompatibleUnits`] if the snapshot's position or mass unit
/// has the wrong dimension.
pub fn make_param(
    defaults: &Defaults,
    snapshot: &dyn Snapshot,
    filename: Option<&str>,
) -> ParamResult<Config> {
    let mut param = defaults.param().clone();

    let input = filename
        .map(Path::new)
        .or_else(|| snapshot.filename());
    if let Some(input) = input {
        let stem = input.with_extension("");
        param.set("achInFile", file_value(input)?);
        param.set("achOutName", file_value(&stem)?);
    }

    let kpc_unit = snapshot.position_unit().ratio(&Unit::parse("kpc")?)?;
    let msol_unit = snapshot.mass_unit().ratio(&Unit::parse("Msol")?)?;
    param.set("dKpcUnit", kpc_unit);
    param.set("dMsolUnit", msol_unit);

    match snapshot.gas_mean_mol_weight() {
        Some(mu) => param.set("dMeanMolWeight", mu),
        None => log::warn!("snapshot has no gas mu; keeping template dMeanMolWeight"),
    }

    log::debug!("make_param: dKpcUnit = {kpc_unit:e}, dMsolUnit = {msol_unit:e}");
    Ok(param)
}

fn file_value(path: &Path) -> ParamResult<Value> {
    let text = path.to_string_lossy();
    let value = Value::from(text.as_ref());
    if !value.round_trips() || text.contains(COMMENT_MARKER) {
        return Err(ParamError::validation(format!(
            "file name '{text}' must be a single token without '{COMMENT_MARKER}'"
        )));
    }
    Ok(value)
}

/// A director configuration plus the normalized lower color bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Director {
    /// Ready to save in the director dialect.
    #[serde(skip)]
    pub config: Config,
    /// `sigma_min / sigma_max`.
    pub logscale_min: f64,
}

fn template_number(template: &Config, key: &str, index: usize) -> ParamResult<f64> {
    let value = template
        .get(key)
        .and_then(|v| v.element(index))
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            ParamError::template(format!("director template has no numeric {key}[{index}]"))
        })?;
    if value == 0.0 {
        return Err(ParamError::template(format!(
            "director template {key}[{index}] is zero"
        )));
    }
    Ok(value)
}

/// Rescale the director template to new density bounds and resolution.
///
/// The template renders one density scale well: gas color `c0` at
/// resolution `n0`, camera distance `r0` and reference density `σ0`
/// (the `#sigma_max` annotation). With `A = c0 n0² / (σ0 r0²)` the new
/// gas color is `A σmax r² / res²`.
///
/// # Errors
///
/// Returns a validation error for a bad request, or
/// [`ParamError::TemplateIntegrity`] if the template lacks the reference
/// annotation or the fields being rescaled.
pub fn make_director(defaults: &Defaults, request: &DirectorRequest) -> ParamResult<Director> {
    request.check()?;
    let template = defaults.director();

    let sigma0 = template
        .annotation(SIGMA_MAX_ANNOTATION)
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            ParamError::template("director template has no '#sigma_max' annotation")
        })?;
    if sigma0 == 0.0 {
        return Err(ParamError::template("director template '#sigma_max' is zero"));
    }
    let c0 = template_number(template, "colgas", 3)?;
    let n0 = template_number(template, "size", 0)?;
    let r0 = template_number(template, "eye", 2)?;

    let a = c0 * n0.powi(2) / (sigma0 * r0.powi(2));
    let resolution = f64::from(request.resolution);
    let colgas = a * request.sigma_max * request.r.powi(2) / resolution.powi(2);

    let mut config = template.clone();
    config.remove_annotation(SIGMA_MAX_ANNOTATION);
    set_element(&mut config, "colgas", 3, colgas)?;
    config.set(
        "size",
        vec![Value::from(request.resolution), Value::from(request.resolution)],
    );
    set_element(&mut config, "eye", 2, request.r)?;
    config.set("file", request.filename.as_str());

    let logscale_min = request.sigma_min / request.sigma_max;
    log::debug!("make_director: A = {a:e}, colgas = {colgas:e}, logscale_min = {logscale_min:e}");
    Ok(Director {
        config,
        logscale_min,
    })
}

fn set_element(config: &mut Config, key: &str, index: usize, value: f64) -> ParamResult<()> {
    config
        .get_mut(key)
        .ok_or_else(|| ParamError::template(format!("director template has no {key}")))?
        .set_element(index, value)
}
