//! Compact Position Reporting — CPR decode for ADS-B positions.
//!
//! A single position message only carries 17-bit encoded coordinates that
//! repeat every few degrees. Two decode modes recover the real position:
//! - Global: an even/odd sample pair, supplied in reception order.
//! - Local: a single sample plus a reference position within one zone.
//!
//! Key constants:
//! - NZ = 15 (latitude zones per hemisphere, airborne table)
//! - 17 bits per coordinate
//! - Dlat_even = 360 / (4 * NZ) = 6.0 degrees
//! - Dlat_odd = 360 / (4 * NZ - 1) ≈ 6.1017 degrees

use std::f64::consts::PI;
use std::fmt;

use serde::Serialize;

use crate::bits::{fixed, Bits, Layout};
use crate::types::{Error, Result};

/// Number of latitude zones per hemisphere.
const NZ: f64 = 15.0;

/// Scale of one 17-bit CPR coordinate (2^17).
const CPR_MAX: f64 = (1u32 << 17) as f64;

/// CPR frame format, alternated by the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CprFormat {
    Even,
    Odd,
}

impl fmt::Display for CprFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CprFormat::Even => write!(f, "even"),
            CprFormat::Odd => write!(f, "odd"),
        }
    }
}

/// Raw CPR fields of one position message. On its own this only pins the
/// position down to one cell per zone; pair it with a sample of the other
/// format (or a reference position) to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CprSample {
    pub format: CprFormat,
    /// 17-bit encoded latitude, 0..131071.
    pub latitude: u32,
    /// 17-bit encoded longitude, 0..131071.
    pub longitude: u32,
}

/// Resolved geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Extract the CPR sample (1-bit format + 17-bit latitude + 17-bit
/// longitude) from the tail of a position-bearing payload. Shared by every
/// position message type.
pub fn extract_sample(bits: &Bits) -> Result<CprSample> {
    let layout = Layout::new(&[
        fixed("cpr_format", 1),
        fixed("cpr_latitude", 17),
        fixed("cpr_longitude", 17),
    ])?;
    let fields = layout.extract(bits)?;
    let format = if fields.flag("cpr_format")? {
        CprFormat::Odd
    } else {
        CprFormat::Even
    };
    Ok(CprSample {
        format,
        latitude: fields.uint("cpr_latitude")? as u32,
        longitude: fields.uint("cpr_longitude")? as u32,
    })
}

/// Number of longitude zones at a given latitude (NL function). Ranges
/// from 59 at the equator down to 1 near the poles.
pub fn nl(lat: f64) -> i32 {
    if lat == 0.0 {
        return 59;
    }
    if lat.abs() == 87.0 {
        return 2;
    }
    if lat.abs() > 87.0 {
        return 1;
    }
    let a = 1.0 - (PI / (2.0 * NZ)).cos();
    let b = (PI / 180.0 * lat).cos().powi(2);
    ((2.0 * PI) / (1.0 - a / b).acos()).floor() as i32
}

/// Modulo that always returns a non-negative result.
fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// Resolve an unambiguous position from an even/odd sample pair.
///
/// `first` is the earlier reception, `second` the most recent; the decoded
/// position is the one the more recent sample describes. Passing the
/// samples in the wrong order yields a plausible but wrong position, so the
/// reception order is part of the contract, not a hint.
///
/// Fails with [`Error::CprFormatCollision`] when both samples share a
/// format and with [`Error::CprZoneMismatch`] when the pair straddles a
/// longitude zone boundary and cannot be combined.
pub fn resolve_global(first: &CprSample, second: &CprSample) -> Result<Location> {
    if first.format == second.format {
        return Err(Error::CprFormatCollision(first.format));
    }
    let (even, odd) = match first.format {
        CprFormat::Even => (first, second),
        CprFormat::Odd => (second, first),
    };

    let lat_even = f64::from(even.latitude) / CPR_MAX;
    let lon_even = f64::from(even.longitude) / CPR_MAX;
    let lat_odd = f64::from(odd.latitude) / CPR_MAX;
    let lon_odd = f64::from(odd.longitude) / CPR_MAX;

    let dlat_even = 360.0 / (4.0 * NZ);
    let dlat_odd = 360.0 / (4.0 * NZ - 1.0);

    // Latitude zone index.
    let j = (59.0 * lat_even - 60.0 * lat_odd + 0.5).floor();

    let mut lat_e = dlat_even * (modulo(j, 60.0) + lat_even);
    let mut lat_o = dlat_odd * (modulo(j, 59.0) + lat_odd);
    if lat_e >= 270.0 {
        lat_e -= 360.0;
    }
    if lat_o >= 270.0 {
        lat_o -= 360.0;
    }

    // Both candidates must sit in the same longitude zone band.
    if nl(lat_e) != nl(lat_o) {
        return Err(Error::CprZoneMismatch);
    }

    let lat = if second.format == CprFormat::Even {
        lat_e
    } else {
        lat_o
    };

    let nl_lat = nl(lat);
    let m = (lon_even * f64::from(nl_lat - 1) - lon_odd * f64::from(nl_lat) + 0.5).floor();
    let n_even = nl_lat.max(1);
    let n_odd = nl(lat - 1.0).max(1);

    let mut lon = if second.format == CprFormat::Even {
        (360.0 / f64::from(n_even)) * (modulo(m, f64::from(n_even)) + lon_even)
    } else {
        (360.0 / f64::from(n_odd)) * (modulo(m, f64::from(n_odd)) + lon_odd)
    };
    if lon >= 180.0 {
        lon -= 360.0;
    }

    Ok(Location {
        latitude: lat,
        longitude: lon,
    })
}

/// Resolve a single sample against a known approximate position.
///
/// Valid while the aircraft is within half a zone (~180 nm) of the
/// reference, e.g. a previously resolved position or the receiver site.
pub fn resolve_local(sample: &CprSample, reference: &Location) -> Location {
    let i = match sample.format {
        CprFormat::Even => 0.0,
        CprFormat::Odd => 1.0,
    };
    let dlat = 360.0 / (4.0 * NZ - i);

    let lat_cpr = f64::from(sample.latitude) / CPR_MAX;
    let lon_cpr = f64::from(sample.longitude) / CPR_MAX;

    let j = (reference.latitude / dlat).floor()
        + (modulo(reference.latitude, dlat) / dlat - lat_cpr + 0.5).floor();
    let mut lat = dlat * (j + lat_cpr);

    let n = (nl(lat) - i as i32).max(1);
    let dlon = 360.0 / f64::from(n);

    let m = (reference.longitude / dlon).floor()
        + (modulo(reference.longitude, dlon) / dlon - lon_cpr + 0.5).floor();
    let mut lon = dlon * (m + lon_cpr);

    if lat > 90.0 {
        lat -= 360.0;
    }
    if lon >= 180.0 {
        lon -= 360.0;
    }

    Location {
        latitude: lat,
        longitude: lon,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // The reference pair from the two recorded DF17 frames
    // 8D40621D58C386435CC412692AD6 (odd, received first) and
    // 8D40621D58C382D690C8AC2863A7 (even, received second).
    const ODD: CprSample = CprSample {
        format: CprFormat::Odd,
        latitude: 74158,
        longitude: 50194,
    };
    const EVEN: CprSample = CprSample {
        format: CprFormat::Even,
        latitude: 93000,
        longitude: 51372,
    };

    #[test]
    fn test_nl_special_cases() {
        assert_eq!(nl(0.0), 59);
        assert_eq!(nl(87.0), 2);
        assert_eq!(nl(-87.0), 2);
        assert_eq!(nl(88.0), 1);
        assert_eq!(nl(-90.0), 1);
    }

    #[test]
    fn test_nl_mid_latitude() {
        assert_eq!(nl(52.0), 36);
        assert_eq!(nl(-52.0), 36);
    }

    #[test]
    fn test_resolve_global_known_pair() {
        let loc = resolve_global(&ODD, &EVEN).unwrap();
        assert!((loc.latitude - 52.2572021484375).abs() < 1e-10);
        assert!((loc.longitude - 3.91937255859375).abs() < 1e-10);
    }

    #[test]
    fn test_resolve_global_order_matters() {
        // Same samples, reversed reception order: the odd frame's candidate
        // is selected instead, which is a different (wrong) position.
        let forward = resolve_global(&ODD, &EVEN).unwrap();
        let reversed = resolve_global(&EVEN, &ODD).unwrap();
        assert!((forward.latitude - reversed.latitude).abs() > 1e-3);
    }

    #[test]
    fn test_resolve_global_same_format_fails() {
        let err = resolve_global(&ODD, &ODD).unwrap_err();
        assert!(matches!(err, Error::CprFormatCollision(CprFormat::Odd)));
        let err = resolve_global(&EVEN, &EVEN).unwrap_err();
        assert!(matches!(err, Error::CprFormatCollision(CprFormat::Even)));
        // Same raw values, same format: still a collision, never a decode.
        let even_copy = EVEN;
        assert!(resolve_global(&EVEN, &even_copy).is_err());
    }

    #[test]
    fn test_resolve_global_zone_mismatch() {
        // Candidate latitudes straddle the NL 36 -> 35 boundary at 53.087
        // degrees: the even candidate decodes to 53.0500 (NL 36), the odd
        // one to 53.0994 (NL 35), so the pair cannot be combined.
        let even = CprSample {
            format: CprFormat::Even,
            latitude: 110319,
            longitude: 0,
        };
        let odd = CprSample {
            format: CprFormat::Odd,
            latitude: 92065,
            longitude: 0,
        };
        let err = resolve_global(&even, &odd).unwrap_err();
        assert!(matches!(err, Error::CprZoneMismatch));
    }

    #[test]
    fn test_resolve_local_even() {
        let reference = Location {
            latitude: 52.25,
            longitude: 3.92,
        };
        let loc = resolve_local(&EVEN, &reference);
        assert!((loc.latitude - 52.2572021484375).abs() < 1e-6);
        assert!((loc.longitude - 3.91937255859375).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_local_odd() {
        let reference = Location {
            latitude: 52.25,
            longitude: 3.92,
        };
        let loc = resolve_local(&ODD, &reference);
        assert!((loc.latitude - 52.2572).abs() < 0.05);
        assert!((loc.longitude - 3.92).abs() < 0.05);
    }

    #[test]
    fn test_modulo_non_negative() {
        assert!((modulo(7.0, 3.0) - 1.0).abs() < 1e-10);
        assert!((modulo(-1.0, 60.0) - 59.0).abs() < 1e-10);
    }
}
