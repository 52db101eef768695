//! 1-30-1 parity framing.
//!
//! ```text
//!  bit 31      30 ........ 16  15 ......... 1    0
//! ┌──────┬─────────────────┬─────────────────┬──────┐
//! │ Peven│  data[29..15]   │  data[14..0]    │ Podd │
//! └──────┴─────────────────┴─────────────────┴──────┘
//!  even parity over bits 31..16      odd parity over bits 15..0
//! ```

use facegate_core::constants::{PARITY_DATA_BITS, PARITY_HALF_BITS};

const DATA_MASK: u32 = (1 << PARITY_DATA_BITS) - 1;
const HALF_MASK: u32 = (1 << PARITY_HALF_BITS) - 1;

/// Bit that makes `bits` plus itself carry an even number of ones.
pub fn even_parity_bit(bits: u64) -> bool {
    bits.count_ones() % 2 == 1
}

/// Bit that makes `bits` plus itself carry an odd number of ones.
pub fn odd_parity_bit(bits: u64) -> bool {
    bits.count_ones() % 2 == 0
}

/// Wrap the low 30 bits of `value` in leading even and trailing odd parity.
///
/// Bits above the low 30 are ignored.
///
/// # Examples
///
/// ```
/// use facegate_wiegand::parity::{check_1_30_1, encode_1_30_1};
///
/// let frame = encode_1_30_1(0x1234_5678);
/// assert!(check_1_30_1(frame));
/// assert_eq!((frame >> 1) & 0x3FFF_FFFF, 0x1234_5678 & 0x3FFF_FFFF);
/// ```
pub fn encode_1_30_1(value: u32) -> u32 {
    let data = value & DATA_MASK;
    let first = data >> PARITY_HALF_BITS;
    let second = data & HALF_MASK;

    let leading = u32::from(even_parity_bit(u64::from(first)));
    let trailing = u32::from(odd_parity_bit(u64::from(second)));

    (leading << (PARITY_DATA_BITS + 1)) | (data << 1) | trailing
}

/// Check both parity halves of a 32-bit 1-30-1 frame.
pub fn check_1_30_1(frame: u32) -> bool {
    let leading_half = frame >> 16;
    let trailing_half = frame & 0xFFFF;
    leading_half.count_ones() % 2 == 0 && trailing_half.count_ones() % 2 == 1
}

/// The 30 data bits of a 1-30-1 frame, parity stripped.
pub fn data_1_30_1(frame: u32) -> u32 {
    (frame >> 1) & DATA_MASK
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0b0, false)]
    #[case(0b1, true)]
    #[case(0b11, false)]
    #[case(0b111, true)]
    fn test_even_parity_bit(#[case] bits: u64, #[case] expected: bool) {
        assert_eq!(even_parity_bit(bits), expected);
        assert_eq!(odd_parity_bit(bits), !expected);
    }

    #[test]
    fn test_encode_zero() {
        // Empty halves: leading 0 keeps even, trailing 1 makes odd
        assert_eq!(encode_1_30_1(0), 0b1);
    }

    #[test]
    fn test_encode_all_ones() {
        // 15 ones per half: leading 1 makes 16 (even), trailing 0 keeps 15 (odd)
        let frame = encode_1_30_1(DATA_MASK);
        assert_eq!(frame, 0xFFFF_FFFE);
        assert!(check_1_30_1(frame));
    }

    #[test]
    fn test_high_bits_ignored() {
        assert_eq!(encode_1_30_1(0xC000_0001), encode_1_30_1(0x0000_0001));
    }

    #[test]
    fn test_data_roundtrip() {
        let frame = encode_1_30_1(0x2AAA_5555);
        assert_eq!(data_1_30_1(frame), 0x2AAA_5555);
    }

    #[test]
    fn test_check_rejects_flipped_bit() {
        let frame = encode_1_30_1(0x0ABC_DEF0);
        assert!(check_1_30_1(frame));
        assert!(!check_1_30_1(frame ^ (1 << 20)));
        assert!(!check_1_30_1(frame ^ (1 << 3)));
    }
}
