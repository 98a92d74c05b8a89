//! Read-only view of a simulation snapshot.
//!
//! Only a handful of facts about a snapshot matter here: where it came
//! from, the units of its positions and masses, how far out the gas
//! reaches, and how massive the star is.

mod tipsy;

pub use tipsy::{decode_tipsy, read_tipsy, TipsyUnits};

use std::path::{Path, PathBuf};

use crate::units::{Quantity, Unit};

/// What the parameter builders need from a snapshot.
pub trait Snapshot {
    /// Backing file, or `None` for a snapshot created in memory.
    fn filename(&self) -> Option<&Path>;

    /// Unit of particle positions.
    fn position_unit(&self) -> &Unit;

    /// Unit of particle masses.
    fn mass_unit(&self) -> &Unit;

    /// Largest cylindrical radius among gas particles, if there is gas.
    fn gas_max_rxy(&self) -> Option<Quantity>;

    /// Total mass of star particles.
    fn star_total_mass(&self) -> Quantity;

    /// Mean molecular weight of the first gas particle, if known.
    fn gas_mean_mol_weight(&self) -> Option<f64>;
}

/// A gas particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasParticle {
    pub mass: f64,
    pub pos: [f64; 3],
    pub mu: Option<f64>,
}

impl GasParticle {
    /// Cylindrical radius.
    #[must_use]
    pub fn rxy(&self) -> f64 {
        self.pos[0].hypot(self.pos[1])
    }
}

/// A star particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarParticle {
    pub mass: f64,
    pub pos: [f64; 3],
}

/// In-memory particle data with units attached.
#[derive(Debug, Clone)]
pub struct ParticleSnapshot {
    filename: Option<PathBuf>,
    position_unit: Unit,
    mass_unit: Unit,
    pub gas: Vec<GasParticle>,
    pub stars: Vec<StarParticle>,
}

impl ParticleSnapshot {
    /// Empty snapshot with no backing file.
    #[must_use]
    pub const fn new(position_unit: Unit, mass_unit: Unit) -> Self {
        Self {
            filename: None,
            position_unit,
            mass_unit,
            gas: Vec::new(),
            stars: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn push_gas(&mut self, mass: f64, pos: [f64; 3], mu: Option<f64>) {
        self.gas.push(GasParticle { mass, pos, mu });
    }

    pub fn push_star(&mut self, mass: f64, pos: [f64; 3]) {
        self.stars.push(StarParticle { mass, pos });
    }
}

impl Snapshot for ParticleSnapshot {
    fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    fn position_unit(&self) -> &Unit {
        &self.position_unit
    }

    fn mass_unit(&self) -> &Unit {
        &self.mass_unit
    }

    fn gas_max_rxy(&self) -> Option<Quantity> {
        self.gas
            .iter()
            .map(GasParticle::rxy)
            .reduce(f64::max)
            .map(|r| Quantity::new(r, self.position_unit.clone()))
    }

    fn star_total_mass(&self) -> Quantity {
        let total = self.stars.iter().map(|s| s.mass).sum();
        Quantity::new(total, self.mass_unit.clone())
    }

    fn gas_mean_mol_weight(&self) -> Option<f64> {
        self.gas.first().and_then(|g| g.mu)
    }
}
