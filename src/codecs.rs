//! Fixed lookup tables and small value codecs shared by the ADS-B decoders.
//!
//! Gray-coded altitude, quantized ground speed, packed callsign characters
//! and the wake vortex category table. All tables are immutable constants;
//! every function here is pure.

use crate::bits::Bits;
use crate::types::{Error, GroundSpeed, Result, SpeedMeasurement, WakeVortexCategory};

// ---------------------------------------------------------------------------
// Gray code
// ---------------------------------------------------------------------------

/// Reflected-binary encode. Only used by tests to pin the round-trip.
pub fn gray_encode(n: u32) -> u32 {
    n ^ (n >> 1)
}

/// Reflected-binary to natural binary, for the Q=0 barometric altitude
/// encoding.
pub fn gray_decode(encoded: u32) -> u32 {
    let mut n = encoded;
    let mut g = encoded >> 1;
    while g != 0 {
        n ^= g;
        g >>= 1;
    }
    n
}

// ---------------------------------------------------------------------------
// Quantized ground speed
// ---------------------------------------------------------------------------

struct SpeedBand {
    from: u8,
    to: u8,
    begin_kt: f64,
    step_kt: f64,
}

const SPEED_BANDS: &[SpeedBand] = &[
    SpeedBand { from: 2, to: 8, begin_kt: 0.125, step_kt: 0.125 },
    SpeedBand { from: 9, to: 12, begin_kt: 1.0, step_kt: 0.25 },
    SpeedBand { from: 13, to: 38, begin_kt: 2.0, step_kt: 0.5 },
    SpeedBand { from: 39, to: 93, begin_kt: 15.0, step_kt: 1.0 },
    SpeedBand { from: 94, to: 108, begin_kt: 70.0, step_kt: 2.0 },
    SpeedBand { from: 109, to: 123, begin_kt: 100.0, step_kt: 5.0 },
];

/// Decode the 7-bit movement field of a surface position message.
///
/// Code 0 means no speed information, code 1 is standstill, code 124 means
/// "175 kt or more" (reported as 175 with the at-least flag set), codes 125
/// and above are not assigned.
pub fn ground_speed(code: u8) -> Result<GroundSpeed> {
    match code {
        0 => Ok(GroundSpeed::Unavailable),
        1 => Ok(measured(0.0)),
        124 => Ok(measured(175.0)),
        125.. => Err(Error::FieldOutOfRange {
            field: "ground_speed",
            value: u64::from(code),
        }),
        _ => {
            let band = SPEED_BANDS
                .iter()
                .find(|b| code >= b.from && code <= b.to)
                .ok_or(Error::FieldOutOfRange {
                    field: "ground_speed",
                    value: u64::from(code),
                })?;
            Ok(measured(
                band.begin_kt + f64::from(code - band.from) * band.step_kt,
            ))
        }
    }
}

fn measured(knots: f64) -> GroundSpeed {
    GroundSpeed::Measured(SpeedMeasurement {
        knots,
        at_least_175_kt: knots >= 175.0,
    })
}

// ---------------------------------------------------------------------------
// Callsign characters
// ---------------------------------------------------------------------------

/// 6-bit character table for callsign encoding. `#` marks codes with no
/// assigned character; they pass through verbatim.
pub const CALLSIGN_CHARSET: &[u8; 64] =
    b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ##### ###############0123456789######";

/// Decode packed 6-bit callsign characters. The identification message
/// carries 48 bits, i.e. 8 characters.
pub fn callsign(bits: &Bits) -> String {
    let mut s = String::with_capacity(bits.len() / 6);
    for chunk in bits.chunks(6) {
        let idx = chunk
            .iter()
            .fold(0usize, |acc, bit| (acc << 1) | usize::from(*bit));
        s.push(CALLSIGN_CHARSET[idx] as char);
    }
    s
}

// ---------------------------------------------------------------------------
// Wake vortex category
// ---------------------------------------------------------------------------

/// Map the identification message's outer type code (2, 3 or 4) and 3-bit
/// category code to a wake vortex category. Category code 0 always means no
/// category information; other combinations outside the table are errors.
pub fn wake_vortex_category(type_code: u8, category: u8) -> Result<WakeVortexCategory> {
    use WakeVortexCategory::*;

    if category == 0 {
        return Ok(NoCategoryInformation);
    }
    let cat = match (type_code, category) {
        (2, 1) => SurfaceEmergencyVehicle,
        (2, 3) => SurfaceServiceVehicle,
        (2, 4..=7) => GroundObstruction,
        (3, 1) => GliderOrSailplane,
        (3, 2) => LighterThanAir,
        (3, 3) => ParachutistOrSkydiver,
        (3, 4) => UltralightOrHangGlider,
        (3, 6) => UnmannedAerialVehicle,
        (3, 7) => SpaceVehicle,
        (4, 1) => Light,
        (4, 2) => Medium1,
        (4, 3) => Medium2,
        (4, 4) => HighVortexAircraft,
        (4, 5) => Heavy,
        (4, 6) => HighPerformance,
        (4, 7) => Rotorcraft,
        _ => {
            return Err(Error::WakeVortexCategory {
                type_code,
                category,
            })
        }
    };
    Ok(cat)
}

// ---------------------------------------------------------------------------
// Unit conversions
// ---------------------------------------------------------------------------

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * 0.3048
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters / 0.3048
}

pub fn knots_to_kmh(knots: f64) -> f64 {
    knots * 1.852
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
