//! Consistent simulation unit systems.
//!
//! With G = 1 in simulation units, a mass unit and a length unit fix
//! everything else: `t = sqrt(x³ / (G m))`, `v = x / t`, and so on.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::{Dimension, IntoUnit, Unit};
use crate::error::{ParamError, ParamResult};

/// Semantic role of a unit within a [`UnitSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRole {
    Length,
    Mass,
    Time,
    Velocity,
    Density,
    Acceleration,
    Pressure,
    Temperature,
}

impl UnitRole {
    pub const ALL: [Self; 8] = [
        Self::Length,
        Self::Mass,
        Self::Time,
        Self::Velocity,
        Self::Density,
        Self::Acceleration,
        Self::Pressure,
        Self::Temperature,
    ];

    /// Key used when printing a unit system.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Length => "l_unit",
            Self::Mass => "m_unit",
            Self::Time => "t_unit",
            Self::Velocity => "v_unit",
            Self::Density => "rho_unit",
            Self::Acceleration => "acc_unit",
            Self::Pressure => "pres_unit",
            Self::Temperature => "temp_unit",
        }
    }
}

impl fmt::Display for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for UnitRole {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = match s {
            "x" | "l" | "l_unit" | "length" => Self::Length,
            "m" | "m_unit" | "mass" => Self::Mass,
            "t" | "t_unit" | "time" => Self::Time,
            "v" | "v_unit" | "velocity" => Self::Velocity,
            "rho" | "rho_unit" | "density" => Self::Density,
            "acc" | "acc_unit" | "acceleration" => Self::Acceleration,
            "pres" | "pres_unit" | "pressure" => Self::Pressure,
            "temp" | "temp_unit" | "temperature" => Self::Temperature,
            other => return Err(ParamError::unit(format!("unknown unit role '{other}'"))),
        };
        Ok(role)
    }
}

/// A full set of simulation units.
#[derive(Debug, Clone, Serialize)]
pub struct UnitSystem {
    pub length: Unit,
    pub mass: Unit,
    pub time: Unit,
    pub velocity: Unit,
    pub density: Unit,
    pub acceleration: Unit,
    pub pressure: Unit,
    pub temperature: Unit,
}

fn require_dims(unit: &Unit, dims: Dimension, expected: &str) -> ParamResult<()> {
    if unit.dims() == dims {
        Ok(())
    } else {
        Err(ParamError::IncompatibleUnits {
            from: unit.label().to_string(),
            to: expected.to_string(),
        })
    }
}

impl UnitSystem {
    /// Time unit for which G = 1: `sqrt(length³ / (G mass))`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::IncompatibleUnits`] if `mass` or `length` has the
    /// wrong dimension.
    pub fn dynamical_time(mass: &Unit, length: &Unit) -> ParamResult<Unit> {
        require_dims(mass, Dimension::MASS, "kg")?;
        require_dims(length, Dimension::LENGTH, "m")?;
        let g = Unit::parse("G")?;
        let gm = (&g * mass)?;
        (&length.powi(3)? / &gm)?.sqrt()
    }

    /// Derive velocity, density, acceleration and pressure from the three
    /// base units. Temperature is Kelvin.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::IncompatibleUnits`] if a base unit has the wrong
    /// dimension.
    pub fn from_parts(mass: Unit, length: Unit, time: Unit) -> ParamResult<Self> {
        require_dims(&mass, Dimension::MASS, "kg")?;
        require_dims(&length, Dimension::LENGTH, "m")?;
        require_dims(&time, Dimension::TIME, "s")?;

        let velocity = (&length / &time)?;
        let density = (&mass / &length.powi(3)?)?;
        let acceleration = (&length / &time.powi(2)?)?;
        let pressure = (&density * &velocity.powi(2)?)?;

        Ok(Self {
            length,
            mass,
            time,
            velocity,
            density,
            acceleration,
            pressure,
            temperature: Unit::parse("K")?,
        })
    }

    #[must_use]
    pub const fn get(&self, role: UnitRole) -> &Unit {
        match role {
            UnitRole::Length => &self.length,
            UnitRole::Mass => &self.mass,
            UnitRole::Time => &self.time,
            UnitRole::Velocity => &self.velocity,
            UnitRole::Density => &self.density,
            UnitRole::Acceleration => &self.acceleration,
            UnitRole::Pressure => &self.pressure,
            UnitRole::Temperature => &self.temperature,
        }
    }

    /// All units in a fixed order, keyed by role.
    pub fn iter(&self) -> impl Iterator<Item = (UnitRole, &Unit)> {
        UnitRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }
}

/// Set up units for a run from a mass and a position unit.
///
/// * time unit = `sqrt(x³ / (G m))`
/// * velocity unit = `x / t`, re-expressed in km/s
/// * temperature unit = Kelvin
///
/// # Errors
///
/// Returns a unit error if either unit string cannot be parsed or has the wrong
/// dimension.
pub fn setup_units(m: impl IntoUnit, x: impl IntoUnit) -> ParamResult<UnitSystem> {
    let mass = m.into_unit()?;
    let length = x.into_unit()?;
    let time = UnitSystem::dynamical_time(&mass, &length)?;

    let mut system = UnitSystem::from_parts(mass, length, time)?;
    system.velocity = system.velocity.rescaled(&Unit::parse("km s**-1")?)?;
    log::debug!(
        "setup_units: t = {:e} s, v = {}",
        system.time.scale(),
        system.velocity
    );
    Ok(system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Quantity, AU, G, SOLAR_MASS, YEAR};

    #[test]
    fn test_au_msol_time_unit() {
        // One AU around one solar mass: t = 1 yr / 2π.
        let system = setup_units("Msol", "au").unwrap();
        let expected = (AU.powi(3) / (G * SOLAR_MASS)).sqrt();
        assert!((system.time.scale() - expected).abs() / expected < 1e-12);
        let yr_over_2pi = YEAR / (2.0 * std::f64::consts::PI);
        assert!((system.time.scale() - yr_over_2pi).abs() / yr_over_2pi < 1e-3);
    }

    #[test]
    fn test_velocity_in_km_per_s() {
        let system = setup_units("Msol", "au").unwrap();
        assert!(system.velocity.label().ends_with("km s**-1"));
        // Earth's orbital speed is ~29.8 km/s.
        let kms = Unit::parse("km s**-1").unwrap();
        let v = system.velocity.ratio(&kms).unwrap();
        assert!((v - 29.78).abs() < 0.05);
    }

    #[test]
    fn test_temperature_is_kelvin() {
        let system = setup_units("Msol", "au").unwrap();
        assert_eq!(system.temperature.label(), "K");
        assert_eq!(system.temperature.dims(), Dimension::TEMPERATURE);
    }

    #[test]
    fn test_accepts_quantity_and_unit() {
        let m = Quantity::parse("0.5 Msol").unwrap();
        let x = Unit::parse("10 au").unwrap();
        let system = setup_units(m, &x).unwrap();
        let msol = Unit::parse("Msol").unwrap();
        assert!((system.mass.ratio(&msol).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_swapped_dimensions() {
        assert!(matches!(
            setup_units("au", "Msol"),
            Err(ParamError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_derived_dimensions() {
        let system = setup_units("Msol", "au").unwrap();
        assert_eq!(system.density.dims(), Dimension::new(1, -3, 0, 0));
        assert_eq!(system.acceleration.dims(), Dimension::new(0, 1, -2, 0));
        assert_eq!(system.pressure.dims(), Dimension::new(1, -1, -2, 0));
    }

    #[test]
    fn test_role_lookup() {
        let system = setup_units("Msol", "au").unwrap();
        let role: UnitRole = "x".parse().unwrap();
        assert_eq!(system.get(role).label(), "au");
        assert_eq!("temp".parse::<UnitRole>().unwrap(), UnitRole::Temperature);
        assert!("flux".parse::<UnitRole>().is_err());
        assert_eq!(system.iter().count(), 8);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::units::G;
    use proptest::prelude::*;

    proptest! {
        /// t² G m = x³ and v = x / t for any positive base units.
        #[test]
        fn prop_unit_consistency(m in 1e-6f64..1e6, x in 1e-6f64..1e6) {
            let system = setup_units(format!("{m} Msol"), format!("{x} au")).unwrap();
            let t = system.time.scale();
            let lhs = t * t * G * system.mass.scale();
            let rhs = system.length.scale().powi(3);
            prop_assert!((lhs - rhs).abs() / rhs < 1e-10);

            let v = system.length.scale() / t;
            prop_assert!((system.velocity.scale() - v).abs() / v < 1e-10);
        }
    }
}
