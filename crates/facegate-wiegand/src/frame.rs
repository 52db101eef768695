//! Finalized Wiegand frames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete bit sequence bounded by silence.
///
/// Immutable once produced. `value` holds the bits MSB-first; for frames
/// longer than 64 bits only the first 64 received are kept, while
/// `bit_count` still reports the full length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    bit_count: usize,
    value: u64,
}

impl Frame {
    pub fn new(bit_count: usize, value: u64) -> Self {
        Self { bit_count, value }
    }

    /// Build a frame from bits in arrival order.
    ///
    /// Bits past the 64th count towards the length but not the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_wiegand::Frame;
    ///
    /// let frame = Frame::from_bits(&[true, true, false]);
    /// assert_eq!(frame.bit_count(), 3);
    /// assert_eq!(frame.value(), 0b110);
    /// ```
    pub fn from_bits(bits: &[bool]) -> Self {
        let kept = &bits[..bits.len().min(64)];
        Self::new(bits.len(), crate::bits::bits_to_value(kept))
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Whether the frame has exactly `width` bits.
    pub fn has_width(&self, width: u8) -> bool {
        self.bit_count == usize::from(width)
    }

    /// Value as `u32`, if the frame fits in 32 bits.
    pub fn to_u32(&self) -> Option<u32> {
        if self.bit_count <= 32 {
            u32::try_from(self.value).ok()
        } else {
            None
        }
    }

    /// Bits rendered as `0`/`1`, first-received leftmost.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_wiegand::Frame;
    ///
    /// assert_eq!(Frame::new(6, 0b000101).bit_string(), "000101");
    /// ```
    pub fn bit_string(&self) -> String {
        let width = self.bit_count.min(64);
        (0..width)
            .rev()
            .map(|shift| if (self.value >> shift) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "W{}:0x{:X}", self.bit_count, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(32, 0xFFFF_FFFF, Some(0xFFFF_FFFF))]
    #[case(26, 0x3FF_FFFF, Some(0x3FF_FFFF))]
    #[case(34, 0x1, None)]
    fn test_to_u32(#[case] bits: usize, #[case] value: u64, #[case] expected: Option<u32>) {
        assert_eq!(Frame::new(bits, value).to_u32(), expected);
    }

    #[test]
    fn test_has_width() {
        let frame = Frame::new(32, 0);
        assert!(frame.has_width(32));
        assert!(!frame.has_width(26));
    }

    #[test]
    fn test_display() {
        assert_eq!(Frame::new(32, 0xDEAD_BEEF).to_string(), "W32:0xDEADBEEF");
    }

    #[test]
    fn test_from_bits_keeps_first_64_of_long_frame() {
        let mut bits = vec![true; 64];
        bits.extend([false; 6]);

        let frame = Frame::from_bits(&bits);
        assert_eq!(frame.bit_count(), 70);
        assert_eq!(frame.value(), u64::MAX);
    }

    #[test]
    fn test_from_bits_matches_accumulator_on_overflow() {
        use crate::BitAccumulator;
        use std::time::Instant;

        let bits: Vec<bool> = (0..80).map(|i| i % 3 == 0).collect();
        let at = Instant::now();
        let mut acc = BitAccumulator::new();
        for &bit in &bits {
            acc.push(bit, at);
        }

        assert_eq!(Frame::from_bits(&bits), acc.take());
    }

    #[test]
    fn test_bit_string_keeps_leading_zeros() {
        let frame = Frame::from_bits(&[false, false, true]);
        assert_eq!(frame.bit_string(), "001");
    }
}
