//! CRC-24 parity for Mode S frames.
//!
//! The 25-bit generator `1111111111111010000001001` (polynomial 0xFFF409
//! with its implicit leading term) is applied MSB-first as an XOR reduction
//! over the message bits. DF17 frames carry the pure remainder in their last
//! 24 bits, so a valid frame reduces to zero.
//!
//! Everything here is a pure function over bit slices with no knowledge of
//! frames or messages, so it can be pinned against known-good reference
//! transmissions on its own.

use crate::bits::Bits;

/// Generator bit pattern, MSB first.
const GENERATOR: [u8; 25] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1,
];

/// Width of the parity trailer.
pub const PARITY_BITS: usize = 24;

/// XOR-reduction remainder over an arbitrary bit sequence.
///
/// Scans left to right; wherever the current bit is set, the generator is
/// XORed into the 25-bit window starting there. The last 24 bits of the
/// reduced buffer are the remainder. Sequences of 24 bits or fewer reduce
/// to their own value.
pub fn remainder(bits: &Bits) -> u32 {
    let mut buf = bits.to_bitvec();
    if buf.len() > PARITY_BITS {
        for i in 0..buf.len() - PARITY_BITS {
            if buf[i] {
                for (k, &g) in GENERATOR.iter().enumerate() {
                    if g == 1 {
                        let flipped = !buf[i + k];
                        buf.set(i + k, flipped);
                    }
                }
            }
        }
    }
    let tail_start = buf.len().saturating_sub(PARITY_BITS);
    buf[tail_start..]
        .iter()
        .fold(0u32, |acc, bit| (acc << 1) | u32::from(*bit))
}

/// Parity trailer for `data` (encode convention: data followed by 24 zero
/// bits).
pub fn parity(data: &Bits) -> u32 {
    let mut buf = data.to_bitvec();
    buf.resize(data.len() + PARITY_BITS, false);
    remainder(&buf)
}

/// Check a full frame (data + transmitted parity) as received. The
/// remainder of a clean frame is zero.
pub fn check(frame: &Bits) -> bool {
    remainder(frame) == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hex_decode;
    use bitvec::prelude::*;

    // Recorded DF17 transmissions with clean parity.
    const VALID_FRAMES: &[&str] = &[
        "8D4840D6202CC371C32CE0576098",
        "8D40621D58C382D690C8AC2863A7",
        "8D40621D58C386435CC412692AD6",
        "8D485020994409940838175B284F",
    ];

    #[test]
    fn test_valid_frames_reduce_to_zero() {
        for hex in VALID_FRAMES {
            let data = hex_decode(hex).unwrap();
            let bits = data.view_bits::<Msb0>();
            assert_eq!(remainder(bits), 0, "remainder should be 0 for {hex}");
            assert!(check(bits));
        }
    }

    #[test]
    fn test_parity_matches_transmitted_trailer() {
        for hex in VALID_FRAMES {
            let data = hex_decode(hex).unwrap();
            let bits = data.view_bits::<Msb0>();
            let transmitted = (u32::from(data[11]) << 16)
                | (u32::from(data[12]) << 8)
                | u32::from(data[13]);
            assert_eq!(parity(&bits[..88]), transmitted, "parity mismatch for {hex}");
        }
    }

    #[test]
    fn test_encode_then_check_is_zero() {
        let data = hex_decode("8D4840D6202CC371C32CE0").unwrap();
        let data_bits = data.view_bits::<Msb0>();
        let p = parity(data_bits);

        let mut frame = data_bits.to_bitvec();
        for i in (0..PARITY_BITS).rev() {
            frame.push((p >> i) & 1 == 1);
        }
        assert!(check(&frame));
    }

    #[test]
    fn test_any_single_bit_flip_changes_remainder() {
        let data = hex_decode(VALID_FRAMES[0]).unwrap();
        let bits = data.view_bits::<Msb0>();
        for i in 0..bits.len() {
            let mut corrupted = bits.to_bitvec();
            let flipped = !corrupted[i];
            corrupted.set(i, flipped);
            assert_ne!(remainder(&corrupted), 0, "flip of bit {i} went unnoticed");
        }
    }

    #[test]
    fn test_short_sequence_is_its_own_remainder() {
        let bytes = [0xABu8, 0xCD];
        assert_eq!(remainder(bytes.view_bits::<Msb0>()), 0xABCD);
    }
}
