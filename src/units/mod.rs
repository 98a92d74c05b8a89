//! Physical units as dimension vectors with an SI scale factor.
//!
//! A [`Unit`] is an exponent vector over {mass, length, time, temperature}
//! plus the size of the unit in SI base units. Two units are convertible
//! iff their exponent vectors are equal; arithmetic combines the vectors
//! and multiplies the scales.
//!
//! Units are built from strings such as `"3.0 kpc"`, `"km s**-1"` or
//! `"g/cm**3"`. The leading number (if any) becomes part of the unit, so
//! `"2.5 yr"` is a unit that is two and a half years long.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

use crate::error::{ParamError, ParamResult};

mod quantity;
mod system;

pub use quantity::{Bare, IntoUnit, Quantity};
pub use system::{setup_units, UnitRole, UnitSystem};

/// Gravitational constant (m³ kg⁻¹ s⁻²).
pub const G: f64 = 6.674_30e-11;

/// Solar mass in kilograms.
pub const SOLAR_MASS: f64 = 1.988_92e30;

/// Earth mass in kilograms.
pub const EARTH_MASS: f64 = 5.972_2e24;

/// Jupiter mass in kilograms.
pub const JUPITER_MASS: f64 = 1.898_13e27;

/// Astronomical unit in meters.
pub const AU: f64 = 1.495_978_707e11;

/// Parsec in meters.
pub const PARSEC: f64 = 3.085_677_581_491_367e16;

/// Day in seconds.
pub const DAY: f64 = 86_400.0;

/// Julian year in seconds.
pub const YEAR: f64 = 365.25 * DAY;

/// Exponents over the base dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub mass: i32,
    pub length: i32,
    pub time: i32,
    pub temperature: i32,
}

impl Dimension {
    /// Dimensionless.
    pub const NONE: Self = Self::new(0, 0, 0, 0);
    pub const MASS: Self = Self::new(1, 0, 0, 0);
    pub const LENGTH: Self = Self::new(0, 1, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1);

    #[must_use]
    pub const fn new(mass: i32, length: i32, time: i32, temperature: i32) -> Self {
        Self {
            mass,
            length,
            time,
            temperature,
        }
    }

    #[must_use]
    pub const fn is_dimensionless(&self) -> bool {
        self.mass == 0 && self.length == 0 && self.time == 0 && self.temperature == 0
    }

    fn exponents(self) -> [i32; 4] {
        [self.mass, self.length, self.time, self.temperature]
    }

    fn try_map(self, other: Self, f: impl Fn(i32, i32) -> Option<i32>) -> Option<Self> {
        let [m, l, t, k] = self.exponents();
        let [om, ol, ot, ok] = other.exponents();
        Some(Self::new(f(m, om)?, f(l, ol)?, f(t, ot)?, f(k, ok)?))
    }

    /// Exponent-wise `self + other`, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.try_map(other, i32::checked_add)
    }

    /// Exponent-wise `self - other`, or `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.try_map(other, i32::checked_sub)
    }

    /// Multiply every exponent by `n`, or `None` on overflow.
    #[must_use]
    pub fn checked_scaled(self, n: i32) -> Option<Self> {
        self.try_map(Self::NONE, |e, _| e.checked_mul(n))
    }

    /// Halve every exponent, if all are even.
    fn halved(self) -> Option<Self> {
        let all_even = self.exponents().iter().all(|e| e % 2 == 0);
        all_even.then(|| Self::new(self.mass / 2, self.length / 2, self.time / 2, self.temperature / 2))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let parts: Vec<String> = [
            ("kg", self.mass),
            ("m", self.length),
            ("s", self.time),
            ("K", self.temperature),
        ]
        .iter()
        .filter(|(_, e)| *e != 0)
        .map(|(sym, e)| if *e == 1 { (*sym).to_string() } else { format!("{sym}**{e}") })
        .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Look up a unit symbol: `(size in SI, dimension)`.
fn lookup(symbol: &str) -> Option<(f64, Dimension)> {
    let unit = match symbol {
        "1" => (1.0, Dimension::NONE),
        // mass
        "kg" => (1.0, Dimension::MASS),
        "g" => (1e-3, Dimension::MASS),
        "Msol" | "msol" | "Msun" => (SOLAR_MASS, Dimension::MASS),
        "Mearth" => (EARTH_MASS, Dimension::MASS),
        "Mjup" => (JUPITER_MASS, Dimension::MASS),
        // length
        "m" => (1.0, Dimension::LENGTH),
        "cm" => (1e-2, Dimension::LENGTH),
        "km" => (1e3, Dimension::LENGTH),
        "au" | "AU" => (AU, Dimension::LENGTH),
        "pc" => (PARSEC, Dimension::LENGTH),
        "kpc" => (1e3 * PARSEC, Dimension::LENGTH),
        "Mpc" => (1e6 * PARSEC, Dimension::LENGTH),
        // time
        "s" => (1.0, Dimension::TIME),
        "min" => (60.0, Dimension::TIME),
        "h" | "hr" => (3600.0, Dimension::TIME),
        "d" | "day" => (DAY, Dimension::TIME),
        "yr" => (YEAR, Dimension::TIME),
        "kyr" => (1e3 * YEAR, Dimension::TIME),
        "Myr" => (1e6 * YEAR, Dimension::TIME),
        "Gyr" => (1e9 * YEAR, Dimension::TIME),
        // temperature
        "K" => (1.0, Dimension::TEMPERATURE),
        // constants
        "G" => (G, Dimension::new(-1, 3, -2, 0)),
        _ => return None,
    };
    Some(unit)
}

/// Split `sym**exp` / `sym^exp` into its parts.
fn split_power(part: &str) -> ParamResult<(&str, i32)> {
    let Some((symbol, exponent)) = part.split_once("**").or_else(|| part.split_once('^')) else {
        return Ok((part, 1));
    };
    let exponent = exponent
        .parse::<i32>()
        .map_err(|_| ParamError::unit(format!("invalid exponent in '{part}'")))?;
    Ok((symbol, exponent))
}

/// Split `"2.5 yr"` into `(2.5, "yr")`; labels without a number get 1.
fn split_leading_factor(label: &str) -> (f64, &str) {
    let trimmed = label.trim();
    let (head, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    match head.parse::<f64>() {
        Ok(factor) => (factor, rest.trim()),
        Err(_) => (1.0, trimmed),
    }
}

fn wrap(label: &str) -> String {
    if label.contains(' ') {
        format!("({label})")
    } else {
        label.to_string()
    }
}

/// A physical unit.
#[derive(Debug, Clone)]
pub struct Unit {
    scale: f64,
    dims: Dimension,
    label: String,
}

impl Unit {
    /// Create a unit from its SI size and dimension.
    #[must_use]
    pub fn new(scale: f64, dims: Dimension, label: impl Into<String>) -> Self {
        Self {
            scale,
            dims,
            label: label.into(),
        }
    }

    /// The dimensionless unit `1`.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self::new(1.0, Dimension::NONE, "1")
    }

    /// `factor` times `base`, labelled `"<factor> <base>"`.
    #[must_use]
    pub fn scaled(factor: f64, base: &Self) -> Self {
        let (base_factor, rest) = split_leading_factor(&base.label);
        let factor_total = factor * base_factor;
        let label = if rest.is_empty() {
            format!("{factor_total}")
        } else {
            format!("{factor_total} {rest}")
        };
        Self::new(factor * base.scale, base.dims, label)
    }

    /// Parse a unit expression.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnitParse`] for empty input, unknown symbols
    /// or malformed exponents.
    pub fn parse(s: &str) -> ParamResult<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(ParamError::unit("empty unit string"));
        }

        let mut scale = 1.0;
        let mut dims = Dimension::NONE;

        for (i, token) in tokens.iter().enumerate() {
            if i == 0 {
                if let Ok(factor) = token.parse::<f64>() {
                    scale *= factor;
                    continue;
                }
            }
            for (j, part) in token.split('/').enumerate() {
                if part.is_empty() {
                    return Err(ParamError::unit(format!("dangling '/' in '{s}'")));
                }
                let (symbol, exponent) = split_power(part)?;
                let (size, dim) = lookup(symbol)
                    .ok_or_else(|| ParamError::unit(format!("unknown unit '{symbol}' in '{s}'")))?;
                let exponent = if j == 0 { Some(exponent) } else { exponent.checked_neg() };
                let Some((n, next)) = exponent.and_then(|n| {
                    let next = dims.checked_add(dim.checked_scaled(n)?)?;
                    Some((n, next))
                }) else {
                    return Err(ParamError::unit(format!("exponent overflow in '{s}'")));
                };
                scale *= size.powi(n);
                dims = next;
            }
        }

        Ok(Self::new(scale, dims, tokens.join(" ")))
    }

    /// Size of this unit in SI base units.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub const fn dims(&self) -> Dimension {
        self.dims
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.dims == other.dims
    }

    /// How many `other` fit in one `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::IncompatibleUnits`] when the dimensions differ.
    pub fn ratio(&self, other: &Self) -> ParamResult<f64> {
        if !self.is_compatible(other) {
            return Err(ParamError::IncompatibleUnits {
                from: self.label.clone(),
                to: other.label.clone(),
            });
        }
        Ok(self.scale / other.scale)
    }

    /// Re-express this unit as a plain multiple of `base`.
    ///
    /// The result has the same size but a flat `"<n> <base>"` label.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::IncompatibleUnits`] when the dimensions differ.
    pub fn rescaled(&self, base: &Self) -> ParamResult<Self> {
        let factor = self.ratio(base)?;
        Ok(Self::scaled(factor, base))
    }

    /// Raise to an integer power.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnitParse`] if an exponent overflows.
    pub fn powi(&self, n: i32) -> ParamResult<Self> {
        let dims = self.dims.checked_scaled(n).ok_or_else(|| self.overflow())?;
        Ok(Self::new(
            self.scale.powi(n),
            dims,
            format!("{}**{n}", wrap(&self.label)),
        ))
    }

    fn overflow(&self) -> ParamError {
        ParamError::unit(format!("exponent overflow in '{}'", self.label))
    }

    /// Square root.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnitParse`] if any exponent is odd.
    pub fn sqrt(&self) -> ParamResult<Self> {
        let dims = self
            .dims
            .halved()
            .ok_or_else(|| ParamError::unit(format!("cannot take square root of '{}'", self.label)))?;
        Ok(Self::new(self.scale.sqrt(), dims, format!("{}**1/2", wrap(&self.label))))
    }

    /// SI form, e.g. `"3.085677581491367e19 m"`.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{:e} {}", self.scale, self.dims)
    }
}

/// Products can overflow an exponent, so they yield a [`ParamResult`].
impl Mul for &Unit {
    type Output = ParamResult<Unit>;

    fn mul(self, other: Self) -> ParamResult<Unit> {
        let dims = self.dims.checked_add(other.dims).ok_or_else(|| self.overflow())?;
        Ok(Unit::new(
            self.scale * other.scale,
            dims,
            format!("{} {}", wrap(&self.label), wrap(&other.label)),
        ))
    }
}

impl Div for &Unit {
    type Output = ParamResult<Unit>;

    fn div(self, other: Self) -> ParamResult<Unit> {
        let dims = self.dims.checked_sub(other.dims).ok_or_else(|| self.overflow())?;
        Ok(Unit::new(
            self.scale / other.scale,
            dims,
            format!("{} / {}", wrap(&self.label), wrap(&other.label)),
        ))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl FromStr for Unit {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Unit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.label)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(|e| {
            serde::de::Error::custom(format!(
                "Invalid unit '{s}': {e}. Expected e.g. '1 Msol', '3.0 kpc' or 'km s**-1'"
            ))
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Converting there and back is the identity.
        #[test]
        fn prop_ratio_inverse(a in 1e-6f64..1e6, b in 1e-6f64..1e6) {
            let x = Unit::parse(&format!("{a} kpc")).unwrap();
            let y = Unit::parse(&format!("{b} au")).unwrap();
            let there = x.ratio(&y).unwrap();
            let back = y.ratio(&x).unwrap();
            prop_assert!((there * back - 1.0).abs() < 1e-12);
        }

        /// Squaring then rooting recovers the unit.
        #[test]
        fn prop_sqrt_of_square(a in 1e-3f64..1e3) {
            let x = Unit::parse(&format!("{a} Msol")).unwrap();
            let root = x.powi(2).unwrap().sqrt().unwrap();
            prop_assert!((root.ratio(&x).unwrap() - 1.0).abs() < 1e-12);
        }
    }
}
