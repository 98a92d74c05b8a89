//! Reader for tipsy binary snapshots.
//!
//! Layout: a header (`f64` time, then `i32` nbodies, ndim, nsph, ndark,
//! nstar and usually one `i32` of padding) followed by gas, dark and star
//! records of `f32` fields. Standard files are big-endian; native
//! little-endian files are detected from the header.
//!
//! Tipsy files carry no units. They come from the run's param file.

use std::path::Path;

use super::ParticleSnapshot;
use crate::changa::{getpar, units_from_param, ParamSource};
use crate::defaults::Defaults;
use crate::error::{ParamError, ParamResult};
use crate::units::Unit;

const GAS_RECORD: usize = 12 * 4;
const DARK_RECORD: usize = 9 * 4;
const STAR_RECORD: usize = 11 * 4;
const HEADER_PADDED: usize = 32;
const HEADER_BARE: usize = 28;

/// Units to attach to a tipsy file's raw numbers.
#[derive(Debug, Clone)]
pub struct TipsyUnits {
    pub length: Unit,
    pub mass: Unit,
    /// Applied to every gas particle.
    pub mean_mol_weight: Option<f64>,
}

impl TipsyUnits {
    #[must_use]
    pub const fn new(length: Unit, mass: Unit) -> Self {
        Self {
            length,
            mass,
            mean_mol_weight: None,
        }
    }

    /// Units of the run described by a param file.
    ///
    /// # Errors
    ///
    /// Returns an error if the param cannot be loaded or its units are not
    /// numeric.
    pub fn from_param(defaults: &Defaults, source: ParamSource<'_>) -> ParamResult<Self> {
        let param = source.resolve()?;
        let units = units_from_param(defaults, ParamSource::Config(&*param))?;
        let mean_mol_weight = getpar(defaults, "dMeanMolWeight", ParamSource::Config(&*param))
            .ok()
            .and_then(|v| v.as_f64());
        Ok(Self {
            length: units.length,
            mass: units.mass,
            mean_mol_weight,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Header {
    nsph: usize,
    ndark: usize,
    nstar: usize,
    big_endian: bool,
    size: usize,
}

fn word(bytes: &[u8], offset: usize) -> [u8; 4] {
    let mut w = [0u8; 4];
    w.copy_from_slice(&bytes[offset..offset + 4]);
    w
}

fn i32_at(bytes: &[u8], offset: usize, big_endian: bool) -> i32 {
    let w = word(bytes, offset);
    if big_endian {
        i32::from_be_bytes(w)
    } else {
        i32::from_le_bytes(w)
    }
}

fn f32_at(bytes: &[u8], offset: usize, big_endian: bool) -> f64 {
    let w = word(bytes, offset);
    let x = if big_endian {
        f32::from_be_bytes(w)
    } else {
        f32::from_le_bytes(w)
    };
    f64::from(x)
}

fn read_header(bytes: &[u8]) -> ParamResult<Header> {
    if bytes.len() < HEADER_BARE {
        return Err(ParamError::snapshot("file too short for a tipsy header"));
    }

    for big_endian in [true, false] {
        let count = |offset| usize::try_from(i32_at(bytes, offset, big_endian)).ok();
        let (Some(nbodies), Some(ndim), Some(nsph), Some(ndark), Some(nstar)) =
            (count(8), count(12), count(16), count(20), count(24))
        else {
            continue;
        };
        if !(1..=3).contains(&ndim) || nsph + ndark + nstar != nbodies {
            continue;
        }

        let records = GAS_RECORD * nsph + DARK_RECORD * ndark + STAR_RECORD * nstar;
        let size = if bytes.len() >= HEADER_PADDED + records {
            HEADER_PADDED
        } else if bytes.len() >= HEADER_BARE + records {
            HEADER_BARE
        } else {
            return Err(ParamError::snapshot(format!(
                "truncated tipsy file: {nbodies} particles need {records} bytes of records"
            )));
        };

        return Ok(Header {
            nsph,
            ndark,
            nstar,
            big_endian,
            size,
        });
    }

    Err(ParamError::snapshot("not a tipsy file (inconsistent header)"))
}

/// Decode tipsy bytes into an in-memory snapshot.
///
/// # Errors
///
/// Returns [`ParamError::Snapshot`] if the header is inconsistent or the
/// data is truncated.
pub fn decode_tipsy(bytes: &[u8], units: &TipsyUnits) -> ParamResult<ParticleSnapshot> {
    let header = read_header(bytes)?;
    let be = header.big_endian;
    let mut snapshot = ParticleSnapshot::new(units.length.clone(), units.mass.clone());

    let position = |base: usize| {
        [
            f32_at(bytes, base + 4, be),
            f32_at(bytes, base + 8, be),
            f32_at(bytes, base + 12, be),
        ]
    };

    let gas_start = header.size;
    for i in 0..header.nsph {
        let base = gas_start + i * GAS_RECORD;
        snapshot.push_gas(f32_at(bytes, base, be), position(base), units.mean_mol_weight);
    }

    let star_start = gas_start + header.nsph * GAS_RECORD + header.ndark * DARK_RECORD;
    for i in 0..header.nstar {
        let base = star_start + i * STAR_RECORD;
        snapshot.push_star(f32_at(bytes, base, be), position(base));
    }

    log::debug!(
        "tipsy: {} gas, {} dark, {} star ({})",
        header.nsph,
        header.ndark,
        header.nstar,
        if be { "big-endian" } else { "little-endian" }
    );
    Ok(snapshot)
}

/// Read a tipsy snapshot from disk.
///
/// # Errors
///
/// Returns [`ParamError::Io`] if the file cannot be read, or
/// [`ParamError::Snapshot`] if it is not a valid tipsy file.
pub fn read_tipsy<P: AsRef<Path>>(path: P, units: &TipsyUnits) -> ParamResult<ParticleSnapshot> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let snapshot = decode_tipsy(&bytes, units)
        .map_err(|e| ParamError::snapshot(format!("{}: {e}", path.display())))?;
    Ok(snapshot.with_filename(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    fn encode(gas: &[[f32; 4]], dark: usize, stars: &[[f32; 4]], big_endian: bool) -> Vec<u8> {
        let put_i32 = |out: &mut Vec<u8>, x: i32| {
            out.extend_from_slice(&if big_endian { x.to_be_bytes() } else { x.to_le_bytes() });
        };
        let put_f32 = |out: &mut Vec<u8>, x: f32| {
            out.extend_from_slice(&if big_endian { x.to_be_bytes() } else { x.to_le_bytes() });
        };

        let mut out = Vec::new();
        let time = 0.0f64;
        out.extend_from_slice(&if big_endian { time.to_be_bytes() } else { time.to_le_bytes() });
        let n = |len: usize| i32::try_from(len).unwrap();
        put_i32(&mut out, n(gas.len() + dark + stars.len()));
        put_i32(&mut out, 3);
        put_i32(&mut out, n(gas.len()));
        put_i32(&mut out, n(dark));
        put_i32(&mut out, n(stars.len()));
        put_i32(&mut out, 0);

        for g in gas {
            for x in g {
                put_f32(&mut out, *x);
            }
            for _ in 4..12 {
                put_f32(&mut out, 0.0);
            }
        }
        for _ in 0..dark * 9 {
            put_f32(&mut out, 0.0);
        }
        for s in stars {
            for x in s {
                put_f32(&mut out, *x);
            }
            for _ in 4..11 {
                put_f32(&mut out, 0.0);
            }
        }
        out
    }

    fn units() -> TipsyUnits {
        let mut units = TipsyUnits::new(Unit::parse("au").unwrap(), Unit::parse("Msol").unwrap());
        units.mean_mol_weight = Some(2.35);
        units
    }

    #[test]
    fn test_decode_big_endian() {
        let bytes = encode(
            &[[1e-6, 3.0, 4.0, 0.1], [1e-6, 0.0, 2.0, 0.0]],
            1,
            &[[1.0, 0.0, 0.0, 0.0]],
            true,
        );
        let snap = decode_tipsy(&bytes, &units()).unwrap();
        assert_eq!(snap.gas.len(), 2);
        assert_eq!(snap.stars.len(), 1);
        assert!((snap.gas_max_rxy().unwrap().value - 5.0).abs() < 1e-6);
        assert!((snap.star_total_mass().value - 1.0).abs() < 1e-6);
        assert_eq!(snap.gas_mean_mol_weight(), Some(2.35));
    }

    #[test]
    fn test_decode_little_endian() {
        let bytes = encode(&[[1e-6, 6.0, 8.0, 0.0]], 0, &[[0.5, 0.0, 0.0, 0.0]], false);
        let snap = decode_tipsy(&bytes, &units()).unwrap();
        assert!((snap.gas_max_rxy().unwrap().value - 10.0).abs() < 1e-5);
        assert!((snap.star_total_mass().value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_truncated() {
        let mut bytes = encode(&[[1e-6, 1.0, 0.0, 0.0]], 0, &[[1.0, 0.0, 0.0, 0.0]], true);
        bytes.truncate(bytes.len() - 10);
        assert!(matches!(
            decode_tipsy(&bytes, &units()),
            Err(ParamError::Snapshot(_))
        ));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_tipsy(&[0u8; 10], &units()).is_err());
        assert!(decode_tipsy(&[0xffu8; 64], &units()).is_err());
    }

    #[test]
    fn test_read_sets_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.std");
        std::fs::write(&path, encode(&[[1e-6, 1.0, 0.0, 0.0]], 0, &[[1.0, 0.0, 0.0, 0.0]], true))
            .unwrap();
        let snap = read_tipsy(&path, &units()).unwrap();
        assert_eq!(snap.filename(), Some(path.as_path()));
    }

    #[test]
    fn test_units_from_param() {
        let defaults = Defaults::bundled().unwrap();
        let units = TipsyUnits::from_param(&defaults, ParamSource::Config(defaults.param())).unwrap();
        let au = Unit::parse("au").unwrap();
        assert!((units.length.ratio(&au).unwrap() - 1.0).abs() < 1e-3);
        assert_eq!(units.mean_mol_weight, Some(2.35));
    }
}
