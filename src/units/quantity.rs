//! Numbers with attached units, and the conversions that feed unit setup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use super::Unit;
use crate::error::{ParamError, ParamResult};

/// A value carrying its unit.
#[derive(Debug, Clone, Serialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    #[must_use]
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Parse `"<number> [unit]"`; a bare number is dimensionless.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnitParse`] if the number or the unit is invalid.
    pub fn parse(s: &str) -> ParamResult<Self> {
        let trimmed = s.trim();
        let (number, unit) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
        let value = number
            .parse::<f64>()
            .map_err(|_| ParamError::unit(format!("expected '<number> <unit>', got '{s}'")))?;
        let unit = if unit.trim().is_empty() {
            Unit::dimensionless()
        } else {
            Unit::parse(unit)?
        };
        Ok(Self { value, unit })
    }

    /// Numeric value expressed in `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::IncompatibleUnits`] when the dimensions differ.
    pub fn in_units(&self, target: &Unit) -> ParamResult<f64> {
        Ok(self.value * self.unit.ratio(target)?)
    }

    /// Fold the value into the unit (`3 kpc` becomes the unit `3 kpc`).
    #[must_use]
    pub fn to_unit(&self) -> Unit {
        Unit::scaled(self.value, &self.unit)
    }
}

impl Mul<f64> for Quantity {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            unit: self.unit,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl FromStr for Quantity {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Strip units: the bare number a caller passed, with or without a unit.
pub trait Bare {
    fn bare(&self) -> f64;
}

impl Bare for f64 {
    fn bare(&self) -> f64 {
        *self
    }
}

impl Bare for f32 {
    fn bare(&self) -> f64 {
        f64::from(*self)
    }
}

impl Bare for u32 {
    fn bare(&self) -> f64 {
        f64::from(*self)
    }
}

impl Bare for Quantity {
    fn bare(&self) -> f64 {
        self.value
    }
}

impl<T: Bare + ?Sized> Bare for &T {
    fn bare(&self) -> f64 {
        (**self).bare()
    }
}

/// Anything that can name a unit: a [`Unit`], a unit string, or a quantity.
pub trait IntoUnit {
    /// Normalize to a [`Unit`].
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnitParse`] for unparseable strings.
    fn into_unit(self) -> ParamResult<Unit>;
}

impl IntoUnit for Unit {
    fn into_unit(self) -> ParamResult<Unit> {
        Ok(self)
    }
}

impl IntoUnit for &Unit {
    fn into_unit(self) -> ParamResult<Unit> {
        Ok(self.clone())
    }
}

impl IntoUnit for &str {
    fn into_unit(self) -> ParamResult<Unit> {
        Unit::parse(self)
    }
}

impl IntoUnit for String {
    fn into_unit(self) -> ParamResult<Unit> {
        Unit::parse(&self)
    }
}

impl IntoUnit for Quantity {
    fn into_unit(self) -> ParamResult<Unit> {
        Ok(self.to_unit())
    }
}

impl IntoUnit for &Quantity {
    fn into_unit(self) -> ParamResult<Unit> {
        Ok(self.to_unit())
    }
}
