//! Shared types, error enum, and decoded message types for squitter.

use serde::Serialize;
use thiserror::Error;

use crate::cpr::{CprFormat, CprSample};
use crate::codecs;

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid field layout at {field:?}: {reason}")]
    Layout {
        field: &'static str,
        reason: &'static str,
    },
    #[error("bit sequence too short: layout needs {needed} bits, got {available}")]
    BitSequenceTooShort { needed: usize, available: usize },
    #[error("field {field:?} has disallowed value {value}")]
    FieldOutOfRange { field: &'static str, value: u64 },
    #[error("field {field:?} is {width} bits wide, more than a u64 can hold")]
    FieldTooWide { field: &'static str, width: usize },
    #[error("not supported: {0}")]
    NotSupported(&'static str),
    #[error("invalid ADS-B type code: {0}")]
    InvalidTypeCode(u8),
    #[error("no wake vortex category for type code {type_code} with category code {category}")]
    WakeVortexCategory { type_code: u8, category: u8 },
    #[error("both CPR samples use the {0} format")]
    CprFormatCollision(CprFormat),
    #[error("CPR samples fall into different longitude zones")]
    CprZoneMismatch,
    #[error("invalid frame length: {0} bytes (expected 7 or 14)")]
    FrameLength(usize),
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// ICAO address helpers
// ---------------------------------------------------------------------------

/// 3-byte ICAO address. Stored as raw bytes to avoid per-frame String allocation.
pub type Icao = [u8; 3];

/// Format ICAO address as 6-char uppercase hex string.
pub fn icao_to_string(icao: &Icao) -> String {
    format!("{:02X}{:02X}{:02X}", icao[0], icao[1], icao[2])
}

/// Convert ICAO bytes to u32 for numeric comparisons.
pub fn icao_to_u32(icao: &Icao) -> u32 {
    ((icao[0] as u32) << 16) | ((icao[1] as u32) << 8) | (icao[2] as u32)
}

/// Build ICAO from a 24-bit integer.
pub fn icao_from_u32(val: u32) -> Icao {
    [
        ((val >> 16) & 0xFF) as u8,
        ((val >> 8) & 0xFF) as u8,
        (val & 0xFF) as u8,
    ]
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive, must be even length.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(Error::InvalidHex(hex.to_string()));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        let high = hex_digit(chunk[0]).ok_or_else(|| Error::InvalidHex(hex.to_string()))?;
        let low = hex_digit(chunk[1]).ok_or_else(|| Error::InvalidHex(hex.to_string()))?;
        bytes.push((high << 4) | low);
    }
    Ok(bytes)
}

/// Encode bytes as uppercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        s.push(HEX_CHARS[(b >> 4) as usize] as char);
        s.push(HEX_CHARS[(b & 0x0F) as usize] as char);
    }
    s
}

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Semantic message kinds
// ---------------------------------------------------------------------------

/// Semantic message kind derived from the 5-bit type code (and, for type
/// code 31, the embedded ADS-B version field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageType {
    /// TC 1-4: callsign and wake vortex category.
    Identification,
    /// TC 5-8: ground movement and CPR position.
    SurfacePosition,
    /// TC 9-18: CPR position with barometric altitude.
    AirbornePositionBaroAltitude,
    /// TC 20-22: CPR position with GNSS altitude.
    AirbornePositionGnssAltitude,
    /// TC 19. Recognized but not decoded.
    AirborneVelocity,
    /// TC 31 with ADS-B version 1.
    OperationStatusV1,
    /// TC 31 with ADS-B version 2.
    OperationStatusV2,
}

/// Wake vortex category from the identification message (type code +
/// 3-bit category code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WakeVortexCategory {
    /// Category code 0, regardless of type code.
    NoCategoryInformation,
    SurfaceEmergencyVehicle,
    SurfaceServiceVehicle,
    GroundObstruction,
    GliderOrSailplane,
    LighterThanAir,
    ParachutistOrSkydiver,
    UltralightOrHangGlider,
    UnmannedAerialVehicle,
    SpaceVehicle,
    /// Less than 7000 kg.
    Light,
    /// 7000 kg to 34000 kg.
    Medium1,
    /// 34000 kg to 136000 kg.
    Medium2,
    HighVortexAircraft,
    /// More than 136000 kg.
    Heavy,
    /// Above 5 g acceleration and above 400 kt.
    HighPerformance,
    Rotorcraft,
}

// ---------------------------------------------------------------------------
// Decoded message types
// ---------------------------------------------------------------------------

/// TC 1-4: Aircraft identification and category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identification {
    pub category: WakeVortexCategory,
    /// Exactly 8 characters from the fixed 64-char table, space padded.
    pub callsign: String,
}

/// Quantized ground speed from a surface position message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GroundSpeed {
    /// Speed code 0.
    Unavailable,
    Measured(SpeedMeasurement),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedMeasurement {
    pub knots: f64,
    /// Speed code 124 reports "175 kt or more"; the exact speed is unknown.
    pub at_least_175_kt: bool,
}

impl SpeedMeasurement {
    pub fn kmh(&self) -> f64 {
        codecs::knots_to_kmh(self.knots)
    }

    /// km/h view of [`Self::at_least_175_kt`] (175 kt = 324.1 km/h).
    pub fn at_least_324_kmh(&self) -> bool {
        self.at_least_175_kt
    }
}

/// TC 5-8: Surface position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfacePosition {
    pub ground_speed: GroundSpeed,
    /// Degrees from true north, when the track-status bit is set.
    pub ground_track: Option<f64>,
    pub time: bool,
    pub cpr: CprSample,
}

/// 2-bit surveillance status from an airborne position message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SurveillanceStatus {
    NoCondition,
    PermanentAlert,
    TemporaryAlert,
    SpiCondition,
}

/// Altitude from an airborne position message. Barometric for TC 9-18,
/// GNSS for TC 20-22.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Altitude {
    Barometric { feet: i32 },
    Gnss { meters: u32 },
}

impl Altitude {
    pub fn feet(&self) -> f64 {
        match *self {
            Altitude::Barometric { feet } => f64::from(feet),
            Altitude::Gnss { meters } => codecs::meters_to_feet(f64::from(meters)),
        }
    }

    pub fn meters(&self) -> f64 {
        match *self {
            Altitude::Barometric { feet } => codecs::feet_to_meters(f64::from(feet)),
            Altitude::Gnss { meters } => f64::from(meters),
        }
    }
}

/// TC 9-18 / 20-22: Airborne position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirbornePosition {
    pub surveillance_status: SurveillanceStatus,
    pub single_antenna: bool,
    pub altitude: Altitude,
    pub time: bool,
    pub cpr: CprSample,
}

/// TC 31, ADS-B version 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OperationStatusV1 {
    Airborne(OperationStatusV1Airborne),
    Surface(OperationStatusV1Surface),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStatusV1Airborne {
    pub capability_class: u16,
    pub operational_mode: u16,
    pub nic_supplement: bool,
    pub nac_position: u8,
    pub baro_altitude_quality: u8,
    pub sil: u8,
    pub baro_altitude_integrity: u8,
    pub horizontal_reference_direction: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStatusV1Surface {
    /// 12-bit code; the lower 4 bits of the raw 16-bit capacity class field
    /// are the length/width code.
    pub capability_class: u16,
    pub length_width_code: u8,
    pub operational_mode: u16,
    pub nic_supplement: bool,
    pub nac_position: u8,
    pub sil: u8,
    pub track_angle_or_heading: bool,
    pub horizontal_reference_direction: bool,
}

/// TC 31, ADS-B version 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OperationStatusV2 {
    Airborne(OperationStatusV2Airborne),
    Surface(OperationStatusV2Surface),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStatusV2Airborne {
    pub capability_class: u16,
    pub operational_mode: u16,
    pub nic_supplement_a: bool,
    pub nac_position: u8,
    pub geometric_vertical_accuracy: u8,
    pub sil: u8,
    pub baro_altitude_integrity: u8,
    pub horizontal_reference_direction: bool,
    pub sil_supplement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStatusV2Surface {
    /// 12-bit code; see [`OperationStatusV1Surface::capability_class`].
    pub capability_class: u16,
    pub length_width_code: u8,
    pub operational_mode: u16,
    pub nic_supplement_a: bool,
    pub nac_position: u8,
    pub sil: u8,
    pub track_angle_or_heading: bool,
    pub horizontal_reference_direction: bool,
    pub sil_supplement: bool,
}

/// Union type for all fully decoded ADS-B messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum AdsbMessage {
    Identification(Identification),
    SurfacePosition(SurfacePosition),
    AirbornePosition(AirbornePosition),
    OperationStatusV1(OperationStatusV1),
    OperationStatusV2(OperationStatusV2),
}

impl AdsbMessage {
    /// Semantic kind of this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            AdsbMessage::Identification(_) => MessageType::Identification,
            AdsbMessage::SurfacePosition(_) => MessageType::SurfacePosition,
            AdsbMessage::AirbornePosition(p) => match p.altitude {
                Altitude::Barometric { .. } => MessageType::AirbornePositionBaroAltitude,
                Altitude::Gnss { .. } => MessageType::AirbornePositionGnssAltitude,
            },
            AdsbMessage::OperationStatusV1(_) => MessageType::OperationStatusV1,
            AdsbMessage::OperationStatusV2(_) => MessageType::OperationStatusV2,
        }
    }

    /// CPR sample for the position-bearing message kinds.
    pub fn cpr(&self) -> Option<&CprSample> {
        match self {
            AdsbMessage::SurfacePosition(p) => Some(&p.cpr),
            AdsbMessage::AirbornePosition(p) => Some(&p.cpr),
            _ => None,
        }
    }
}

/// Result of the lightweight decode path: the message kind plus, for the
/// position-bearing kinds, the raw CPR sample. All other fields are skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageBasics {
    pub message_type: MessageType,
    pub cpr: Option<CprSample>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icao_roundtrip() {
        let icao = icao_from_u32(0x4840D6);
        assert_eq!(icao, [0x48, 0x40, 0xD6]);
        assert_eq!(icao_to_string(&icao), "4840D6");
        assert_eq!(icao_to_u32(&icao), 0x4840D6);
    }

    #[test]
    fn test_hex_decode() {
        assert_eq!(hex_decode("4840D6").unwrap(), vec![0x48, 0x40, 0xD6]);
        assert_eq!(hex_decode("4840d6").unwrap(), vec![0x48, 0x40, 0xD6]);
        assert!(hex_decode("odd").is_err());
        assert!(hex_decode("ZZZZ").is_err());
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x48, 0x40, 0xD6]), "4840D6");
    }

    #[test]
    fn test_speed_measurement_kmh_view() {
        let m = SpeedMeasurement {
            knots: 175.0,
            at_least_175_kt: true,
        };
        assert!((m.kmh() - 324.1).abs() < 1e-9);
        assert!(m.at_least_324_kmh());
    }

    #[test]
    fn test_altitude_unit_views() {
        let baro = Altitude::Barometric { feet: 38000 };
        assert!((baro.meters() - 11582.4).abs() < 1e-9);
        let gnss = Altitude::Gnss { meters: 3048 };
        assert!((gnss.feet() - 10000.0).abs() < 1e-9);
    }
}
