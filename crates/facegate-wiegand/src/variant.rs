//! Facility/card decoding for 26- and 34-bit frames.
//!
//! These formats never reach the canonical 32-bit channel. The reader only
//! decodes them for diagnostics when asked to.

use crate::frame::Frame;
use facegate_core::constants::{WIEGAND_26_BITS, WIEGAND_34_BITS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized legacy frame layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WiegandFormat {
    /// P + 8-bit facility + 16-bit card + P.
    W26,
    /// P + 16-bit facility + 16-bit card + P.
    W34,
}

impl WiegandFormat {
    /// Format for a frame of the given length, if any.
    pub fn for_length(bit_count: usize) -> Option<Self> {
        match bit_count {
            WIEGAND_26_BITS => Some(Self::W26),
            WIEGAND_34_BITS => Some(Self::W34),
            _ => None,
        }
    }

    pub fn bit_count(&self) -> usize {
        match self {
            Self::W26 => WIEGAND_26_BITS,
            Self::W34 => WIEGAND_34_BITS,
        }
    }

    fn data_bits(&self) -> u32 {
        match self {
            Self::W26 => 24,
            Self::W34 => 32,
        }
    }

    fn facility_mask(&self) -> u64 {
        match self {
            Self::W26 => 0xFF,
            Self::W34 => 0xFFFF,
        }
    }
}

impl fmt::Display for WiegandFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::W26 => write!(f, "Wiegand-26"),
            Self::W34 => write!(f, "Wiegand-34"),
        }
    }
}

/// Structured fields of a 26- or 34-bit frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCard {
    pub format: WiegandFormat,
    pub facility_code: u16,
    pub card_number: u16,
    pub leading_parity: bool,
    pub trailing_parity: bool,
    pub raw: u64,
}

impl DecodedCard {
    /// Decode a frame of a recognized length.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_wiegand::{DecodedCard, Frame, WiegandFormat};
    ///
    /// // facility 18, card 4660
    /// let raw = (0x12u64 << 17) | (0x1234 << 1);
    /// let card = DecodedCard::decode(&Frame::new(26, raw)).unwrap();
    /// assert_eq!(card.format, WiegandFormat::W26);
    /// assert_eq!(card.facility_code, 18);
    /// assert_eq!(card.card_number, 4660);
    ///
    /// assert!(DecodedCard::decode(&Frame::new(32, raw)).is_none());
    /// ```
    pub fn decode(frame: &Frame) -> Option<Self> {
        let format = WiegandFormat::for_length(frame.bit_count())?;
        let raw = frame.value();
        let data_bits = format.data_bits();
        let data = (raw >> 1) & ((1u64 << data_bits) - 1);

        Some(Self {
            format,
            facility_code: ((data >> 16) & format.facility_mask()) as u16,
            card_number: (data & 0xFFFF) as u16,
            leading_parity: (raw >> (data_bits + 1)) & 1 == 1,
            trailing_parity: raw & 1 == 1,
            raw,
        })
    }

    /// Leading bit gives even parity over the first data half, trailing bit
    /// odd parity over the second.
    pub fn parity_valid(&self) -> bool {
        let data_bits = self.format.data_bits();
        let half = data_bits / 2;
        let data = (self.raw >> 1) & ((1u64 << data_bits) - 1);
        let first = data >> half;
        let second = data & ((1u64 << half) - 1);

        let leading_ones = first.count_ones() + u32::from(self.leading_parity);
        let trailing_ones = second.count_ones() + u32::from(self.trailing_parity);
        leading_ones % 2 == 0 && trailing_ones % 2 == 1
    }
}

impl fmt::Display for DecodedCard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: facility={} card={} p0={} p1={}",
            self.format,
            self.facility_code,
            self.card_number,
            u8::from(self.leading_parity),
            u8::from(self.trailing_parity)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parity::{even_parity_bit, odd_parity_bit};
    use rstest::rstest;

    /// Build a valid frame from facility and card fields.
    fn build(format: WiegandFormat, facility: u64, card: u64) -> Frame {
        let data = (facility << 16) | card;
        let half = format.data_bits() / 2;
        let p0 = u64::from(even_parity_bit(data >> half));
        let p1 = u64::from(odd_parity_bit(data & ((1 << half) - 1)));
        let raw = (p0 << (format.data_bits() + 1)) | (data << 1) | p1;
        Frame::new(format.bit_count(), raw)
    }

    #[rstest]
    #[case(26, Some(WiegandFormat::W26))]
    #[case(34, Some(WiegandFormat::W34))]
    #[case(32, None)]
    #[case(0, None)]
    fn test_format_for_length(#[case] len: usize, #[case] expected: Option<WiegandFormat>) {
        assert_eq!(WiegandFormat::for_length(len), expected);
    }

    #[rstest]
    #[case(WiegandFormat::W26, 0x7B, 0xBEEF)]
    #[case(WiegandFormat::W26, 0, 0)]
    #[case(WiegandFormat::W34, 0xCAFE, 0x0102)]
    #[case(WiegandFormat::W34, 0xFFFF, 0xFFFF)]
    fn test_decode_fields(#[case] format: WiegandFormat, #[case] facility: u64, #[case] card: u64) {
        let decoded = DecodedCard::decode(&build(format, facility, card)).unwrap();
        assert_eq!(decoded.format, format);
        assert_eq!(u64::from(decoded.facility_code), facility);
        assert_eq!(u64::from(decoded.card_number), card);
        assert!(decoded.parity_valid());
    }

    #[test]
    fn test_corrupted_parity_detected() {
        let frame = build(WiegandFormat::W26, 12, 3456);
        let corrupted = Frame::new(26, frame.value() ^ 1);
        let decoded = DecodedCard::decode(&corrupted).unwrap();
        assert!(!decoded.parity_valid());
    }

    #[test]
    fn test_display() {
        let decoded = DecodedCard::decode(&build(WiegandFormat::W34, 1, 2)).unwrap();
        let text = decoded.to_string();
        assert!(text.starts_with("Wiegand-34: facility=1 card=2"));
    }
}
