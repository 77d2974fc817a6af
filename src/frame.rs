//! Classify and decompose raw Mode S frames.
//!
//! Responsibilities:
//! - Classify the Downlink Format (DF) from the first 5 bits
//! - Split long (112-bit) and short (56-bit) frames into data + parity
//! - For DF17 (ADS-B extended squitter): transponder capability, ICAO
//!   address and the 56-bit ME payload
//! - Record the CRC check result on the frame
//!
//! The framer never decodes ME payload fields; that is `decode`'s job.

use bitvec::prelude::*;
use log::debug;

use crate::bits::{fixed, BitBuf, Bits, Layout};
use crate::crc;
use crate::types::{icao_from_u32, Error, Icao, Result};

/// Short frame length in bytes (56 bits).
pub const SHORT_FRAME_BYTES: usize = 7;
/// Long frame length in bytes (112 bits).
pub const LONG_FRAME_BYTES: usize = 14;

/// DF17: ADS-B extended squitter, the only fully decoded frame kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedSquitter {
    /// Transponder capability, one of 0, 4, 5, 6, 7.
    pub capability: u8,
    /// 24-bit ICAO aircraft address.
    pub icao: Icao,
    /// 56-bit ME payload (type code + type-specific fields).
    pub me: BitBuf,
    /// 24-bit parity trailer as transmitted.
    pub parity: u32,
    /// Whether the CRC check over the received frame passed.
    pub parity_ok: bool,
}

/// A classified Mode S frame.
///
/// Only [`ModeSFrame::ExtendedSquitter`] has a semantic decode; the other
/// arms are recognized frame kinds carried as raw data + parity.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeSFrame {
    ExtendedSquitter(ExtendedSquitter),
    /// DF >= 16 other than 17: 112-bit frame, no decode defined.
    Long {
        downlink_format: u8,
        data: BitBuf,
        parity: u32,
    },
    /// DF < 16: 56-bit frame, no decode defined.
    Short {
        downlink_format: u8,
        data: BitBuf,
        parity: u32,
    },
}

impl ModeSFrame {
    pub fn downlink_format(&self) -> u8 {
        match self {
            ModeSFrame::ExtendedSquitter(_) => 17,
            ModeSFrame::Long {
                downlink_format, ..
            }
            | ModeSFrame::Short {
                downlink_format, ..
            } => *downlink_format,
        }
    }
}

/// Parse one frame-aligned chunk of 7 or 14 bytes into a [`ModeSFrame`].
///
/// Frames whose two leading bits are `11` belong to the DF24 family, where
/// the format field steals bits from the application field; they are
/// rejected as unsupported, distinct from malformed input.
pub fn parse(bytes: &[u8]) -> Result<ModeSFrame> {
    if bytes.len() != SHORT_FRAME_BYTES && bytes.len() != LONG_FRAME_BYTES {
        return Err(Error::FrameLength(bytes.len()));
    }
    let bits = bytes.view_bits::<Msb0>();

    if bits[0] && bits[1] {
        return Err(Error::NotSupported("downlink format 24 family"));
    }

    let df_layout = Layout::new(&[fixed("downlink_format", 5)])?;
    let downlink_format = df_layout.extract(bits)?.uint("downlink_format")? as u8;

    if downlink_format >= 16 {
        if bytes.len() != LONG_FRAME_BYTES {
            return Err(Error::FrameLength(bytes.len()));
        }
        if downlink_format == 17 {
            parse_extended_squitter(bits).map(ModeSFrame::ExtendedSquitter)
        } else {
            let layout = Layout::new(&[
                fixed("downlink_format", 5),
                fixed("data", 83),
                fixed("parity", 24),
            ])?;
            let fields = layout.extract(bits)?;
            Ok(ModeSFrame::Long {
                downlink_format,
                data: fields.bits("data").to_bitvec(),
                parity: fields.uint("parity")? as u32,
            })
        }
    } else {
        if bytes.len() != SHORT_FRAME_BYTES {
            return Err(Error::FrameLength(bytes.len()));
        }
        let layout = Layout::new(&[
            fixed("downlink_format", 5),
            fixed("data", 27),
            fixed("parity", 24),
        ])?;
        let fields = layout.extract(bits)?;
        Ok(ModeSFrame::Short {
            downlink_format,
            data: fields.bits("data").to_bitvec(),
            parity: fields.uint("parity")? as u32,
        })
    }
}

fn parse_extended_squitter(bits: &Bits) -> Result<ExtendedSquitter> {
    let layout = Layout::new(&[
        fixed("downlink_format", 5),
        fixed("capability", 3),
        fixed("icao", 24),
        fixed("me", 56),
        fixed("parity", 24),
    ])?;
    let fields = layout.extract(bits)?;

    let capability = fields.uint_in("capability", &[0, 4, 5, 6, 7])? as u8;
    let icao = icao_from_u32(fields.uint("icao")? as u32);
    let parity = fields.uint("parity")? as u32;

    let parity_ok = crc::check(bits);
    if !parity_ok {
        debug!(
            "parity mismatch on extended squitter, icao candidate {:02X}{:02X}{:02X}",
            icao[0], icao[1], icao[2]
        );
    }

    Ok(ExtendedSquitter {
        capability,
        icao,
        me: fields.bits("me").to_bitvec(),
        parity,
        parity_ok,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
