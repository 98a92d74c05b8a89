//! Run plans: YAML descriptions of what to generate.
//!
//! Mistake-proofing through:
//! - Type-safe plan structs with explicit units (`"1 Msol"`, `"10 au"`)
//! - Declarative range checks via `validator`
//! - Semantic checks that ranges cannot express
//!
//! ```yaml
//! units:
//!   mass: "1 Msol"
//!   length: "1 au"
//! schedule:
//!   r_orb: 0.8
//!   n_orb: 20
//!   n_snap: 200
//! director:
//!   sigma_min: 1.0e-6
//!   sigma_max: 0.01
//!   r: 40.0
//!   resolution: 1200
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ParamError, ParamResult};
use crate::format::Value;
use crate::units::{Bare, Quantity};

/// Top-level run plan.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RunPlan {
    /// Base units for `setup_units`.
    #[serde(default)]
    pub units: Option<UnitPlan>,

    /// Output cadence for `setup_param`.
    #[validate(nested)]
    #[serde(default)]
    pub schedule: ScheduleOptions,

    /// Image settings for `make_director`.
    #[validate(nested)]
    #[serde(default)]
    pub director: Option<DirectorRequest>,
}

impl RunPlan {
    /// Load a plan from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> ParamResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a plan from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> ParamResult<Self> {
        let plan: Self = serde_yaml::from_str(yaml)?;
        plan.validate()?;
        plan.schedule.validate_semantic()?;
        if let Some(director) = &plan.director {
            director.validate_semantic()?;
        }
        Ok(plan)
    }
}

/// Mass and length units, each with a mandatory explicit unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitPlan {
    pub mass: Quantity,
    pub length: Quantity,
}

/// How long to run and how often to write output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ScheduleOptions {
    /// Radius for the orbital period, as a fraction of the outermost gas
    /// particle's cylindrical radius.
    #[validate(range(min = 0.0, max = 1.0, message = "r_orb must be between 0 and 1"))]
    #[serde(default = "default_r_orb")]
    pub r_orb: f64,

    /// Number of orbital periods to run for.
    #[validate(range(min = 0.0, message = "n_orb must not be negative"))]
    #[serde(default = "default_n_orb")]
    pub n_orb: f64,

    /// Total number of image frames; defaults to `n_snap`.
    #[validate(range(min = 1))]
    #[serde(default)]
    pub n_image: Option<u32>,

    /// Total number of snapshot outputs.
    #[validate(range(min = 1))]
    #[serde(default = "default_n_snap")]
    pub n_snap: u32,

    /// Total number of checkpoints; defaults to `n_snap`.
    #[validate(range(min = 1))]
    #[serde(default)]
    pub n_check: Option<u32>,
}

const fn default_r_orb() -> f64 {
    1.0
}

const fn default_n_orb() -> f64 {
    10.0
}

const fn default_n_snap() -> u32 {
    100
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            r_orb: default_r_orb(),
            n_orb: default_n_orb(),
            n_image: None,
            n_snap: default_n_snap(),
            n_check: None,
        }
    }
}

impl ScheduleOptions {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> ScheduleOptionsBuilder {
        ScheduleOptionsBuilder::default()
    }

    /// Run declarative and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn check(&self) -> ParamResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    fn validate_semantic(&self) -> ParamResult<()> {
        // NaN slips through range checks
        if !self.r_orb.is_finite() || !(0.0..=1.0).contains(&self.r_orb) {
            return Err(ParamError::validation("r_orb must be between 0 and 1"));
        }
        if !self.n_orb.is_finite() {
            return Err(ParamError::validation("n_orb must be finite"));
        }
        Ok(())
    }

    /// Frames to dump, falling back to `n_snap`.
    #[must_use]
    pub fn images(&self) -> u32 {
        self.n_image.unwrap_or(self.n_snap)
    }

    /// Checkpoints to write, falling back to `n_snap`.
    #[must_use]
    pub fn checkpoints(&self) -> u32 {
        self.n_check.unwrap_or(self.n_snap)
    }
}

/// Builder for [`ScheduleOptions`].
#[derive(Debug, Default)]
pub struct ScheduleOptionsBuilder {
    options: ScheduleOptions,
}

impl ScheduleOptionsBuilder {
    #[must_use]
    pub const fn r_orb(mut self, r_orb: f64) -> Self {
        self.options.r_orb = r_orb;
        self
    }

    #[must_use]
    pub const fn n_orb(mut self, n_orb: f64) -> Self {
        self.options.n_orb = n_orb;
        self
    }

    #[must_use]
    pub const fn n_image(mut self, n_image: u32) -> Self {
        self.options.n_image = Some(n_image);
        self
    }

    #[must_use]
    pub const fn n_snap(mut self, n_snap: u32) -> Self {
        self.options.n_snap = n_snap;
        self
    }

    #[must_use]
    pub const fn n_check(mut self, n_check: u32) -> Self {
        self.options.n_check = Some(n_check);
        self
    }

    #[must_use]
    pub fn build(self) -> ScheduleOptions {
        self.options
    }
}

/// Inputs for a director file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DirectorRequest {
    /// Surface density mapped to the bottom of the color scale.
    pub sigma_min: f64,

    /// Peak surface density of the run.
    pub sigma_max: f64,

    /// Image half-width; the camera distance.
    pub r: f64,

    /// Pixels per side.
    #[validate(range(min = 1))]
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Prefix for the rendered frames.
    #[validate(length(min = 1))]
    #[serde(default = "default_filename")]
    pub filename: String,
}

const fn default_resolution() -> u32 {
    1200
}

fn default_filename() -> String {
    "snapshot".to_string()
}

impl DirectorRequest {
    /// Request with the default resolution and file prefix. Units, if
    /// any, are stripped.
    #[must_use]
    pub fn new(sigma_min: impl Bare, sigma_max: impl Bare, r: impl Bare) -> Self {
        Self {
            sigma_min: sigma_min.bare(),
            sigma_max: sigma_max.bare(),
            r: r.bare(),
            resolution: default_resolution(),
            filename: default_filename(),
        }
    }

    #[must_use]
    pub const fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Run declarative and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn check(&self) -> ParamResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    fn validate_semantic(&self) -> ParamResult<()> {
        if !(self.sigma_max.is_finite() && self.sigma_max > 0.0) {
            return Err(ParamError::validation("sigma_max must be positive"));
        }
        if !self.sigma_min.is_finite() {
            return Err(ParamError::validation("sigma_min must be finite"));
        }
        if !(self.r.is_finite() && self.r > 0.0) {
            return Err(ParamError::validation("r must be positive"));
        }
        if !Value::from(self.filename.as_str()).round_trips() {
            return Err(ParamError::validation(format!(
                "filename '{}' must be a single non-numeric word",
                self.filename
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_defaults() {
        let options = ScheduleOptions::default();
        assert!((options.r_orb - 1.0).abs() < f64::EPSILON);
        assert!((options.n_orb - 10.0).abs() < f64::EPSILON);
        assert_eq!(options.n_snap, 100);
        assert_eq!(options.images(), 100);
        assert_eq!(options.checkpoints(), 100);
        assert!(options.check().is_ok());
    }

    #[test]
    fn test_schedule_builder() {
        let options = ScheduleOptions::builder()
            .r_orb(0.5)
            .n_orb(20.0)
            .n_snap(50)
            .n_image(500)
            .build();
        assert_eq!(options.images(), 500);
        assert_eq!(options.checkpoints(), 50);
    }

    #[test]
    fn test_r_orb_out_of_range() {
        for r_orb in [1.5, -0.1, f64::NAN] {
            let options = ScheduleOptions::builder().r_orb(r_orb).build();
            let err = options.check().unwrap_err();
            assert!(err.is_validation(), "{r_orb}: {err}");
        }
    }

    #[test]
    fn test_zero_counts_rejected() {
        assert!(ScheduleOptions::builder().n_snap(0).build().check().is_err());
        assert!(ScheduleOptions::builder().n_image(0).build().check().is_err());
        assert!(ScheduleOptions::builder().n_check(0).build().check().is_err());
    }

    #[test]
    fn test_plan_yaml_parse() {
        let yaml = r#"
units:
  mass: "1 Msol"
  length: "10 au"
schedule:
  r_orb: 0.8
  n_orb: 20
director:
  sigma_min: 1.0e-6
  sigma_max: 0.01
  r: 40.0
"#;
        let plan = RunPlan::from_yaml(yaml).unwrap();
        let units = plan.units.unwrap();
        assert_eq!(units.length.unit.label(), "au");
        assert!((plan.schedule.r_orb - 0.8).abs() < f64::EPSILON);
        assert_eq!(plan.schedule.n_snap, 100);
        let director = plan.director.unwrap();
        assert_eq!(director.resolution, 1200);
        assert_eq!(director.filename, "snapshot");
    }

    #[test]
    fn test_plan_rejects_bad_r_orb() {
        let err = RunPlan::from_yaml("schedule:\n  r_orb: 1.5\n").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_plan_rejects_unitless_mass() {
        let yaml = "units:\n  mass: \"1 bananas\"\n  length: \"1 au\"\n";
        assert!(matches!(RunPlan::from_yaml(yaml), Err(ParamError::Yaml(_))));
    }

    #[test]
    fn test_plan_rejects_unknown_fields() {
        assert!(RunPlan::from_yaml("schedule:\n  n_orbits: 3\n").is_err());
    }

    #[test]
    fn test_empty_plan_is_default() {
        let plan = RunPlan::from_yaml("{}").unwrap();
        assert!(plan.units.is_none());
        assert_eq!(plan.schedule, ScheduleOptions::default());
    }

    #[test]
    fn test_director_request_strips_units() {
        let sigma = Quantity::parse("0.01 Msol au**-2").unwrap();
        let request = DirectorRequest::new(1e-6, &sigma, 40.0).with_resolution(600);
        assert!((request.sigma_max - 0.01).abs() < f64::EPSILON);
        assert_eq!(request.resolution, 600);
        assert!(request.check().is_ok());
    }

    #[test]
    fn test_director_request_semantic_checks() {
        assert!(DirectorRequest::new(0.0, 0.0, 1.0).check().is_err());
        assert!(DirectorRequest::new(0.0, 1.0, -1.0).check().is_err());
        assert!(DirectorRequest::new(0.0, 1.0, 1.0)
            .with_resolution(0)
            .check()
            .is_err());
        assert!(DirectorRequest::new(0.0, 1.0, 1.0)
            .with_filename("")
            .check()
            .is_err());
        for name in ["my disk", "1e5"] {
            let err = DirectorRequest::new(0.0, 1.0, 1.0)
                .with_filename(name)
                .check()
                .unwrap_err();
            assert!(err.is_validation(), "{name}");
        }
    }
}
