//! Decode DF17 extended squitter payloads into typed ADS-B messages.
//!
//! The 5-bit type code at the front of the 56-bit ME field selects the
//! message layout:
//! - TC 1-4:   Aircraft identification (wake vortex category + callsign)
//! - TC 5-8:   Surface position (ground movement + CPR-encoded lat/lon)
//! - TC 9-18:  Airborne position (barometric altitude + CPR)
//! - TC 19:    Airborne velocity (recognized, not decoded)
//! - TC 20-22: Airborne position (GNSS altitude + CPR)
//! - TC 31:    Aircraft operation status (version 1 and 2 layouts)

use crate::bits::{fixed, rest, Bits, Layout};
use crate::codecs;
use crate::cpr;
use crate::frame::ExtendedSquitter;
use crate::types::{
    AdsbMessage, AirbornePosition, Altitude, Error, Identification, MessageBasics, MessageType,
    OperationStatusV1, OperationStatusV1Airborne, OperationStatusV1Surface, OperationStatusV2,
    OperationStatusV2Airborne, OperationStatusV2Surface, Result, SurfacePosition,
    SurveillanceStatus,
};

/// ME bit offset of the CPR sample. The same for surface (5 TC + 7 speed +
/// 1 + 7 track + 1 time) and airborne (5 TC + 2 status + 1 antenna +
/// 12 altitude + 1 time) layouts.
const CPR_OFFSET: usize = 21;

// ---------------------------------------------------------------------------
// Type code dispatch
// ---------------------------------------------------------------------------

/// Classify a message from its type code.
///
/// Type code 31 alone does not pin down the layout; the 3-bit ADS-B version
/// field inside the ME (after sub-type, capability class and operational
/// mode codes) selects between the version 1 and version 2 variants.
/// Version 0 transponders do not emit operation status, so version 0 is
/// rejected as unsupported rather than malformed.
pub fn message_type(type_code: u8, me: &Bits) -> Result<MessageType> {
    match type_code {
        1..=4 => Ok(MessageType::Identification),
        5..=8 => Ok(MessageType::SurfacePosition),
        9..=18 => Ok(MessageType::AirbornePositionBaroAltitude),
        19 => Ok(MessageType::AirborneVelocity),
        20..=22 => Ok(MessageType::AirbornePositionGnssAltitude),
        28 => Err(Error::NotSupported("aircraft status (type code 28)")),
        29 => Err(Error::NotSupported(
            "target state and status (type code 29)",
        )),
        31 => {
            let layout = Layout::new(&[
                fixed("head", 40),
                fixed("adsb_version", 3),
                rest("tail"),
            ])?;
            match layout.extract(me)?.uint("adsb_version")? {
                0 => Err(Error::NotSupported("ADS-B version 0 operation status")),
                1 => Ok(MessageType::OperationStatusV1),
                2 => Ok(MessageType::OperationStatusV2),
                value => Err(Error::FieldOutOfRange {
                    field: "adsb_version",
                    value,
                }),
            }
        }
        _ => Err(Error::InvalidTypeCode(type_code)),
    }
}

/// Fully decode the ME payload of an extended squitter.
pub fn decode(frame: &ExtendedSquitter) -> Result<AdsbMessage> {
    let layout = Layout::new(&[fixed("type_code", 5), rest("data")])?;
    let fields = layout.extract(&frame.me)?;
    let type_code = fields.uint("type_code")? as u8;
    let data = fields.bits("data");

    match message_type(type_code, &frame.me)? {
        MessageType::Identification => {
            decode_identification(type_code, data).map(AdsbMessage::Identification)
        }
        MessageType::SurfacePosition => {
            decode_surface_position(data).map(AdsbMessage::SurfacePosition)
        }
        MessageType::AirbornePositionBaroAltitude => {
            decode_airborne_position(data, AltitudeEncoding::Barometric)
                .map(AdsbMessage::AirbornePosition)
        }
        MessageType::AirbornePositionGnssAltitude => {
            decode_airborne_position(data, AltitudeEncoding::Gnss)
                .map(AdsbMessage::AirbornePosition)
        }
        MessageType::AirborneVelocity => {
            Err(Error::NotSupported("airborne velocity (type code 19)"))
        }
        MessageType::OperationStatusV1 => {
            decode_operation_status_v1(data).map(AdsbMessage::OperationStatusV1)
        }
        MessageType::OperationStatusV2 => {
            decode_operation_status_v2(data).map(AdsbMessage::OperationStatusV2)
        }
    }
}

/// Lightweight decode: message type plus, for the position-bearing types,
/// the raw CPR sample. Skips every other field, so a caller that only wants
/// positions does not pay for full decoding of each frame.
pub fn decode_basics(frame: &ExtendedSquitter) -> Result<MessageBasics> {
    let layout = Layout::new(&[fixed("type_code", 5), rest("data")])?;
    let type_code = layout.extract(&frame.me)?.uint("type_code")? as u8;
    let message_type = message_type(type_code, &frame.me)?;

    let cpr = match message_type {
        MessageType::SurfacePosition
        | MessageType::AirbornePositionBaroAltitude
        | MessageType::AirbornePositionGnssAltitude => {
            let cpr_layout = Layout::new(&[fixed("head", CPR_OFFSET), rest("cpr")])?;
            let sample = cpr::extract_sample(cpr_layout.extract(&frame.me)?.bits("cpr"))?;
            Some(sample)
        }
        _ => None,
    };
    Ok(MessageBasics { message_type, cpr })
}

// ---------------------------------------------------------------------------
// Per-type decoders
// ---------------------------------------------------------------------------

fn decode_identification(type_code: u8, data: &Bits) -> Result<Identification> {
    let layout = Layout::new(&[fixed("category", 3), fixed("callsign", 48)])?;
    let fields = layout.extract(data)?;
    let category_code = fields.uint("category")? as u8;
    Ok(Identification {
        category: codecs::wake_vortex_category(type_code, category_code)?,
        callsign: codecs::callsign(fields.bits("callsign")),
    })
}

fn decode_surface_position(data: &Bits) -> Result<SurfacePosition> {
    let layout = Layout::new(&[
        fixed("ground_speed", 7),
        fixed("ground_track_status", 1),
        fixed("ground_track", 7),
        fixed("time", 1),
        rest("cpr"),
    ])?;
    let fields = layout.extract(data)?;

    let ground_speed = codecs::ground_speed(fields.uint("ground_speed")? as u8)?;
    // 7-bit track in steps of 360/128 degrees from true north, valid only
    // when the status bit is set.
    let ground_track = if fields.flag("ground_track_status")? {
        Some(f64::from(fields.uint("ground_track")? as u8) * 360.0 / 128.0)
    } else {
        None
    };

    Ok(SurfacePosition {
        ground_speed,
        ground_track,
        time: fields.flag("time")?,
        cpr: cpr::extract_sample(fields.bits("cpr"))?,
    })
}

/// Altitude encoding of an airborne position message, selected by the type
/// code range (9-18 barometric, 20-22 GNSS).
enum AltitudeEncoding {
    Barometric,
    Gnss,
}

fn decode_airborne_position(
    data: &Bits,
    encoding: AltitudeEncoding,
) -> Result<AirbornePosition> {
    let layout = Layout::new(&[
        fixed("surveillance_status", 2),
        fixed("single_antenna", 1),
        fixed("altitude", 12),
        fixed("time", 1),
        rest("cpr"),
    ])?;
    let fields = layout.extract(data)?;

    let surveillance_status = match fields.uint("surveillance_status")? {
        0 => SurveillanceStatus::NoCondition,
        1 => SurveillanceStatus::PermanentAlert,
        2 => SurveillanceStatus::TemporaryAlert,
        _ => SurveillanceStatus::SpiCondition,
    };
    let altitude = match encoding {
        AltitudeEncoding::Barometric => decode_barometric_altitude(fields.bits("altitude"))?,
        AltitudeEncoding::Gnss => Altitude::Gnss {
            meters: fields.uint("altitude")? as u32,
        },
    };

    Ok(AirbornePosition {
        surveillance_status,
        single_antenna: fields.flag("single_antenna")?,
        altitude,
        time: fields.flag("time")?,
        cpr: cpr::extract_sample(fields.bits("cpr"))?,
    })
}

/// The 12-bit barometric altitude field carries a Q-bit at position 7. With
/// Q set, the remaining 11 bits are a binary count in 25 ft steps offset by
/// -1000 ft; with Q clear, they are gray coded in 100 ft steps.
fn decode_barometric_altitude(bits: &Bits) -> Result<Altitude> {
    let layout = Layout::new(&[fixed("high", 7), fixed("q", 1), fixed("low", 4)])?;
    let fields = layout.extract(bits)?;
    let n = ((fields.uint("high")? as u32) << 4) | fields.uint("low")? as u32;
    let feet = if fields.flag("q")? {
        25 * n as i32 - 1000
    } else {
        100 * codecs::gray_decode(n) as i32
    };
    Ok(Altitude::Barometric { feet })
}

// ---------------------------------------------------------------------------
// Operation status (type code 31)
// ---------------------------------------------------------------------------

fn decode_operation_status_v1(data: &Bits) -> Result<OperationStatusV1> {
    let layout = Layout::new(&[
        fixed("sub_type", 3),
        fixed("capability_class", 16),
        fixed("operational_mode", 16),
        fixed("adsb_version", 3),
        fixed("nic_supplement", 1),
        fixed("nac_position", 4),
        fixed("baro_altitude_quality", 2),
        fixed("sil", 2),
        fixed("baro_integrity_or_track_heading", 1),
        fixed("horizontal_reference", 1),
        fixed("reserved", 2),
    ])?;
    let fields = layout.extract(data)?;

    let capability_class = fields.uint("capability_class")?;
    let operational_mode = fields.uint("operational_mode")? as u16;
    let nic_supplement = fields.flag("nic_supplement")?;
    let nac_position = fields.uint("nac_position")? as u8;
    let sil = fields.uint("sil")? as u8;
    let horizontal_reference_direction = fields.flag("horizontal_reference")?;

    match fields.uint_in("sub_type", &[0, 1])? {
        0 => Ok(OperationStatusV1::Airborne(OperationStatusV1Airborne {
            capability_class: capability_class as u16,
            operational_mode,
            nic_supplement,
            nac_position,
            baro_altitude_quality: fields.uint("baro_altitude_quality")? as u8,
            sil,
            baro_altitude_integrity: fields.uint("baro_integrity_or_track_heading")? as u8,
            horizontal_reference_direction,
        })),
        _ => Ok(OperationStatusV1::Surface(OperationStatusV1Surface {
            // The surface variant splits the 16-bit capacity class field
            // into a 12-bit code and a 4-bit length/width code.
            capability_class: (capability_class >> 4) as u16,
            length_width_code: (capability_class & 0xF) as u8,
            operational_mode,
            nic_supplement,
            nac_position,
            sil,
            track_angle_or_heading: fields.flag("baro_integrity_or_track_heading")?,
            horizontal_reference_direction,
        })),
    }
}

fn decode_operation_status_v2(data: &Bits) -> Result<OperationStatusV2> {
    let layout = Layout::new(&[
        fixed("sub_type", 3),
        fixed("capability_class", 16),
        fixed("operational_mode", 16),
        fixed("adsb_version", 3),
        fixed("nic_supplement_a", 1),
        fixed("nac_position", 4),
        fixed("geometric_vertical_accuracy", 2),
        fixed("sil", 2),
        fixed("baro_integrity_or_track_heading", 1),
        fixed("horizontal_reference", 1),
        fixed("sil_supplement", 1),
        fixed("reserved", 1),
    ])?;
    let fields = layout.extract(data)?;

    let capability_class = fields.uint("capability_class")?;
    let operational_mode = fields.uint("operational_mode")? as u16;
    let nic_supplement_a = fields.flag("nic_supplement_a")?;
    let nac_position = fields.uint("nac_position")? as u8;
    let sil = fields.uint("sil")? as u8;
    let horizontal_reference_direction = fields.flag("horizontal_reference")?;
    let sil_supplement = fields.flag("sil_supplement")?;

    match fields.uint_in("sub_type", &[0, 1])? {
        0 => Ok(OperationStatusV2::Airborne(OperationStatusV2Airborne {
            capability_class: capability_class as u16,
            operational_mode,
            nic_supplement_a,
            nac_position,
            geometric_vertical_accuracy: fields.uint("geometric_vertical_accuracy")? as u8,
            sil,
            baro_altitude_integrity: fields.uint("baro_integrity_or_track_heading")? as u8,
            horizontal_reference_direction,
            sil_supplement,
        })),
        _ => Ok(OperationStatusV2::Surface(OperationStatusV2Surface {
            capability_class: (capability_class >> 4) as u16,
            length_width_code: (capability_class & 0xF) as u8,
            operational_mode,
            nic_supplement_a,
            nac_position,
            sil,
            track_angle_or_heading: fields.flag("baro_integrity_or_track_heading")?,
            horizontal_reference_direction,
            sil_supplement,
        })),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
