//! # diskparam
//!
//! Parameter, director and unit-system tooling for protoplanetary disk
//! runs of an N-body/SPH simulator.
//!
//! - Line-oriented `.param` and `.director` files, read and written
//!   without losing key order, annotations or comments
//! - A small physical-unit system with explicit dimensions
//! - Builders for new params and director files, and a scheduler that
//!   sizes a run from the disk's orbital period
//!
//! ## Example
//!
//! ```rust
//! use diskparam::prelude::*;
//!
//! let defaults = Defaults::bundled()?;
//! let units = setup_units("Msol", "au")?;
//! assert!(units.time.scale() > 0.0);
//!
//! let director = make_director(&defaults, &DirectorRequest::new(1e-6, 0.01, 40.0))?;
//! assert!(director.config.contains_key("colgas"));
//! # Ok::<(), diskparam::ParamError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::many_single_char_names,
    clippy::float_cmp,             // Exact zero checks guard divisions
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod changa;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod format;
pub mod snapshot;
pub mod units;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::changa::{
        getpar, make_director, make_param, setup_param, units_from_param, units_from_params,
        Director, ParamSource, SnapshotSource,
    };
    pub use crate::config::{DirectorRequest, RunPlan, ScheduleOptions};
    pub use crate::defaults::Defaults;
    pub use crate::discovery::find_param_names;
    pub use crate::error::{ParamError, ParamResult};
    pub use crate::format::{Config, Dialect, Value};
    pub use crate::snapshot::{ParticleSnapshot, Snapshot};
    pub use crate::units::{setup_units, Quantity, Unit, UnitSystem};
}

/// Re-export for public API
pub use error::{ParamError, ParamResult};
