//! Default templates.
//!
//! Three configurations back every operation: the param template new runs
//! start from, the director template images are scaled from, and the
//! simulator's own built-in parameter defaults. They are loaded once,
//! never mutated, and handed to whatever needs them.

use std::path::Path;

use crate::error::ParamResult;
use crate::format::{Config, Dialect};

/// File name of the param template.
pub const PARAM_TEMPLATE: &str = "default.param";
/// File name of the director template.
pub const DIRECTOR_TEMPLATE: &str = "default.director";
/// File name of the simulator defaults.
pub const SIMULATOR_DEFAULTS: &str = "changadefaults.param";

const BUNDLED_PARAM: &str = include_str!("../templates/default.param");
const BUNDLED_DIRECTOR: &str = include_str!("../templates/default.director");
const BUNDLED_SIMULATOR: &str = include_str!("../templates/changadefaults.param");

/// The three immutable default configurations.
#[derive(Debug, Clone)]
pub struct Defaults {
    param: Config,
    director: Config,
    simulator: Config,
}

impl Defaults {
    /// Defaults compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ParamError::Parse`] if a bundled template is malformed,
    /// which indicates a broken build.
    pub fn bundled() -> ParamResult<Self> {
        log::debug!("loading bundled templates");
        Ok(Self {
            param: Config::parse(BUNDLED_PARAM, Dialect::Param)?,
            director: Config::parse(BUNDLED_DIRECTOR, Dialect::Director)?,
            simulator: Config::parse(BUNDLED_SIMULATOR, Dialect::Param)?,
        })
    }

    /// Load the three template files from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ParamError::Io`] if a file is missing or
    /// [`crate::ParamError::Parse`] if one is malformed.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> ParamResult<Self> {
        let dir = dir.as_ref();
        log::debug!("loading templates from {}", dir.display());
        Ok(Self {
            param: Config::load(dir.join(PARAM_TEMPLATE), Dialect::Param)?,
            director: Config::load(dir.join(DIRECTOR_TEMPLATE), Dialect::Director)?,
            simulator: Config::load(dir.join(SIMULATOR_DEFAULTS), Dialect::Param)?,
        })
    }

    /// Assemble from already-parsed configurations.
    #[must_use]
    pub const fn from_configs(param: Config, director: Config, simulator: Config) -> Self {
        Self {
            param,
            director,
            simulator,
        }
    }

    /// Template for new param files.
    #[must_use]
    pub const fn param(&self) -> &Config {
        &self.param
    }

    /// Template for director files.
    #[must_use]
    pub const fn director(&self) -> &Config {
        &self.director
    }

    /// Simulator built-in defaults.
    #[must_use]
    pub const fn simulator(&self) -> &Config {
        &self.simulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Value;

    #[test]
    fn test_bundled_templates_parse() {
        let defaults = Defaults::bundled().unwrap();
        assert!(defaults.param().contains_key("dDelta"));
        assert!(defaults.simulator().contains_key("achOutName"));
        assert!(defaults.director().annotation("sigma_max").is_some());
    }

    #[test]
    fn test_director_template_fields() {
        let defaults = Defaults::bundled().unwrap();
        let director = defaults.director();
        assert!(director.get("colgas").and_then(|v| v.element(3)).is_some());
        assert!(director.get("size").and_then(|v| v.element(0)).is_some());
        assert!(director.get("eye").and_then(|v| v.element(2)).is_some());
    }

    #[test]
    fn test_from_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = Defaults::bundled().unwrap();
        bundled
            .param()
            .save(dir.path().join(PARAM_TEMPLATE), Dialect::Param)
            .unwrap();
        bundled
            .director()
            .save(dir.path().join(DIRECTOR_TEMPLATE), Dialect::Director)
            .unwrap();
        bundled
            .simulator()
            .save(dir.path().join(SIMULATOR_DEFAULTS), Dialect::Param)
            .unwrap();

        let loaded = Defaults::from_dir(dir.path()).unwrap();
        assert_eq!(loaded.param(), bundled.param());
        assert_eq!(loaded.director(), bundled.director());
        assert_eq!(
            loaded.simulator().get("achOutName"),
            Some(&Value::from("pargrav"))
        );
    }

    #[test]
    fn test_from_dir_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Defaults::from_dir(dir.path()).unwrap_err();
        assert!(err.is_unreadable_file());
    }
}
