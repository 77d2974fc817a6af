//! Generic bit-field extraction.
//!
//! Frames and payloads are MSB-first bit sequences. A [`Layout`] names the
//! fixed-width fields of such a sequence (the last field may take all
//! remaining bits) and is validated when it is built, so a bad layout fails
//! before any frame is touched.

use bitvec::prelude::*;

use crate::types::{Error, Result};

/// MSB-first view of a bit sequence.
pub type Bits = BitSlice<u8, Msb0>;

/// Owned MSB-first bit buffer.
pub type BitBuf = BitVec<u8, Msb0>;

/// Width of one layout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    Bits(usize),
    /// All bits left over after the fixed-width fields. Legal only on the
    /// last entry of a layout.
    Remainder,
}

/// One named field of a [`Layout`].
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub width: FieldWidth,
}

/// Fixed-width field.
pub const fn fixed(name: &'static str, bits: usize) -> FieldDef {
    FieldDef {
        name,
        width: FieldWidth::Bits(bits),
    }
}

/// Remainder field.
pub const fn rest(name: &'static str) -> FieldDef {
    FieldDef {
        name,
        width: FieldWidth::Remainder,
    }
}

/// Validated ordered list of named bit fields.
#[derive(Debug, Clone)]
pub struct Layout {
    fields: Vec<FieldDef>,
    fixed_bits: usize,
}

impl Layout {
    /// Validate eagerly: zero-width fields and remainder fields anywhere but
    /// the last position are layout bugs, not input problems.
    pub fn new(fields: &[FieldDef]) -> Result<Layout> {
        let mut fixed_bits = 0;
        for (i, def) in fields.iter().enumerate() {
            match def.width {
                FieldWidth::Bits(0) => {
                    return Err(Error::Layout {
                        field: def.name,
                        reason: "zero-width field",
                    })
                }
                FieldWidth::Bits(w) => fixed_bits += w,
                FieldWidth::Remainder => {
                    if i + 1 != fields.len() {
                        return Err(Error::Layout {
                            field: def.name,
                            reason: "remainder field must be the last entry",
                        });
                    }
                }
            }
        }
        Ok(Layout {
            fields: fields.to_vec(),
            fixed_bits,
        })
    }

    /// Slice `bits` into the layout's fields. Fails when the input is
    /// shorter than the sum of fixed widths; a trailing remainder field may
    /// be empty.
    pub fn extract<'a>(&self, bits: &'a Bits) -> Result<Fields<'a>> {
        if bits.len() < self.fixed_bits {
            return Err(Error::BitSequenceTooShort {
                needed: self.fixed_bits,
                available: bits.len(),
            });
        }
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut pos = 0;
        for def in &self.fields {
            let end = match def.width {
                FieldWidth::Bits(w) => pos + w,
                FieldWidth::Remainder => bits.len(),
            };
            fields.push((def.name, &bits[pos..end]));
            pos = end;
        }
        Ok(Fields { fields })
    }
}

/// Extracted fields of one input, in layout order, looked up by name.
#[derive(Debug)]
pub struct Fields<'a> {
    fields: Vec<(&'static str, &'a Bits)>,
}

impl<'a> Fields<'a> {
    /// Raw bits of a field.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not part of the layout this was extracted with;
    /// that is a programmer error, like an out-of-bounds index.
    pub fn bits(&self, name: &'static str) -> &'a Bits {
        match self.fields.iter().find(|(n, _)| *n == name) {
            Some((_, bits)) => bits,
            None => panic!("field {name:?} is not part of this layout"),
        }
    }

    /// Field value as an unsigned integer. The value is always within the
    /// natural range `[0, 2^width - 1]`; fields wider than 64 bits are an
    /// error.
    pub fn uint(&self, name: &'static str) -> Result<u64> {
        uint_value(name, self.bits(name))
    }

    /// Like [`Self::uint`], constrained to an explicit allow-list.
    pub fn uint_in(&self, name: &'static str, allowed: &[u64]) -> Result<u64> {
        let value = self.uint(name)?;
        if allowed.contains(&value) {
            Ok(value)
        } else {
            Err(Error::FieldOutOfRange { field: name, value })
        }
    }

    /// Single-bit field as a flag.
    pub fn flag(&self, name: &'static str) -> Result<bool> {
        Ok(self.uint(name)? == 1)
    }
}

/// Interpret an MSB-first bit slice as an unsigned integer.
pub fn uint_value(field: &'static str, bits: &Bits) -> Result<u64> {
    if bits.len() > 64 {
        return Err(Error::FieldTooWide {
            field,
            width: bits.len(),
        });
    }
    Ok(bits.iter().fold(0u64, |acc, bit| (acc << 1) | u64::from(*bit)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn push_uint(buf: &mut BitBuf, value: u64, width: usize) {
    for i in (0..width).rev() {
        buf.push((value >> i) & 1 == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_rejects_zero_width() {
        let err = Layout::new(&[fixed("a", 3), fixed("b", 0)]).unwrap_err();
        assert!(matches!(err, Error::Layout { field: "b", .. }));
    }

    #[test]
    fn test_layout_rejects_remainder_not_last() {
        let err = Layout::new(&[rest("a"), fixed("b", 3)]).unwrap_err();
        assert!(matches!(err, Error::Layout { field: "a", .. }));
    }

    #[test]
    fn test_layout_rejects_multiple_remainders() {
        let err = Layout::new(&[fixed("a", 3), rest("b"), rest("c")]).unwrap_err();
        assert!(matches!(err, Error::Layout { field: "b", .. }));
    }

    #[test]
    fn test_extract_too_short() {
        let layout = Layout::new(&[fixed("a", 5), fixed("b", 5)]).unwrap();
        let bytes = [0xFFu8];
        let err = layout.extract(bytes.view_bits::<Msb0>()).unwrap_err();
        assert!(matches!(
            err,
            Error::BitSequenceTooShort {
                needed: 10,
                available: 8
            }
        ));
    }

    #[test]
    fn test_extract_values() {
        // 0xA5 0x3C = 1010 0101 0011 1100
        let bytes = [0xA5u8, 0x3C];
        let layout = Layout::new(&[fixed("a", 3), fixed("b", 5), rest("c")]).unwrap();
        let fields = layout.extract(bytes.view_bits::<Msb0>()).unwrap();
        assert_eq!(fields.uint("a").unwrap(), 0b101);
        assert_eq!(fields.uint("b").unwrap(), 0b00101);
        assert_eq!(fields.uint("c").unwrap(), 0x3C);
    }

    #[test]
    fn test_extract_widths_sum_and_prefix_order() {
        let bytes = [0x8Du8, 0x40, 0x62];
        let bits = bytes.view_bits::<Msb0>();
        let layout = Layout::new(&[fixed("df", 5), fixed("ca", 3), fixed("addr", 16)]).unwrap();
        let fields = layout.extract(bits).unwrap();

        let total: usize = ["df", "ca", "addr"]
            .iter()
            .map(|n| fields.bits(n).len())
            .sum();
        assert_eq!(total, 24);

        // Concatenated fields reproduce the consumed prefix in order.
        let mut joined = BitBuf::new();
        for name in ["df", "ca", "addr"] {
            joined.extend_from_bitslice(fields.bits(name));
        }
        assert_eq!(&joined[..], &bits[..24]);
    }

    #[test]
    fn test_remainder_may_be_empty() {
        let bytes = [0xFFu8];
        let layout = Layout::new(&[fixed("a", 8), rest("b")]).unwrap();
        let fields = layout.extract(bytes.view_bits::<Msb0>()).unwrap();
        assert!(fields.bits("b").is_empty());
        assert_eq!(fields.uint("b").unwrap(), 0);
    }

    #[test]
    fn test_uint_in_allow_list() {
        let bytes = [0b101_00000u8];
        let layout = Layout::new(&[fixed("ca", 3), rest("pad")]).unwrap();
        let fields = layout.extract(bytes.view_bits::<Msb0>()).unwrap();
        assert_eq!(fields.uint_in("ca", &[0, 4, 5, 6, 7]).unwrap(), 5);
        let err = fields.uint_in("ca", &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldOutOfRange {
                field: "ca",
                value: 5
            }
        ));
    }

    #[test]
    fn test_uint_too_wide() {
        let bytes = [0u8; 9];
        let layout = Layout::new(&[fixed("wide", 65), rest("pad")]).unwrap();
        let fields = layout.extract(bytes.view_bits::<Msb0>()).unwrap();
        let err = fields.uint("wide").unwrap_err();
        assert!(matches!(
            err,
            Error::FieldTooWide {
                field: "wide",
                width: 65
            }
        ));
    }

    #[test]
    fn test_push_uint_helper() {
        let mut buf = BitBuf::new();
        push_uint(&mut buf, 0b101, 3);
        push_uint(&mut buf, 0x1F, 5);
        assert_eq!(uint_value("buf", &buf).unwrap(), 0b101_11111);
    }
}
