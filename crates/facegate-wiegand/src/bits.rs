//! In-flight bit accumulation and MSB-first packing.
//!
//! The accumulator is the only state shared between the edge capture path
//! and the frame watcher. It carries no lock of its own; the owner wraps it
//! in a single mutex so a push and a finalize can never interleave.

use crate::frame::Frame;
use facegate_core::constants::MAX_FRAME_BITS;
use std::time::{Duration, Instant};

/// Bits of the frame currently on the wire.
///
/// Non-empty only while a frame is in flight. [`BitAccumulator::finalize_if_idle`]
/// swaps the sequence out for an empty one in the same call that reads it.
#[derive(Debug, Clone, Default)]
pub struct BitAccumulator {
    bits: Vec<bool>,
    /// Edges beyond `MAX_FRAME_BITS`, counted so the frame length stays honest.
    overflow: usize,
    last_activity: Option<Instant>,
}

impl BitAccumulator {
    pub fn new() -> Self {
        Self {
            bits: Vec::with_capacity(MAX_FRAME_BITS),
            overflow: 0,
            last_activity: None,
        }
    }

    /// Append one bit in arrival order and stamp the activity time.
    ///
    /// Bounded work: past `MAX_FRAME_BITS` only a counter is bumped.
    pub fn push(&mut self, bit: bool, at: Instant) {
        if self.bits.len() < MAX_FRAME_BITS {
            self.bits.push(bit);
        } else {
            self.overflow += 1;
        }
        self.last_activity = Some(at);
    }

    /// Number of bits received for the in-flight frame.
    pub fn len(&self) -> usize {
        self.bits.len() + self.overflow
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    /// Finalize the in-flight frame if the line has been silent for longer
    /// than `gap`.
    ///
    /// Returns `None` when nothing is in flight or the gap has not elapsed.
    /// On success the accumulator is left empty with no recorded activity.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_wiegand::BitAccumulator;
    /// use std::time::{Duration, Instant};
    ///
    /// let t0 = Instant::now();
    /// let gap = Duration::from_millis(30);
    /// let mut acc = BitAccumulator::new();
    /// acc.push(true, t0);
    /// acc.push(false, t0);
    ///
    /// assert!(acc.finalize_if_idle(t0 + Duration::from_millis(30), gap).is_none());
    ///
    /// let frame = acc.finalize_if_idle(t0 + Duration::from_millis(31), gap).unwrap();
    /// assert_eq!(frame.bit_count(), 2);
    /// assert_eq!(frame.value(), 0b10);
    /// assert!(acc.is_empty());
    /// ```
    pub fn finalize_if_idle(&mut self, now: Instant, gap: Duration) -> Option<Frame> {
        let last = self.last_activity?;
        if self.is_empty() || now.saturating_duration_since(last) <= gap {
            return None;
        }
        Some(self.take())
    }

    /// Finalize unconditionally, whatever the line timing.
    pub fn take(&mut self) -> Frame {
        let bits = std::mem::replace(&mut self.bits, Vec::with_capacity(MAX_FRAME_BITS));
        let bit_count = bits.len() + std::mem::take(&mut self.overflow);
        self.last_activity = None;
        Frame::new(bit_count, bits_to_value(&bits))
    }

    /// Drop any in-flight bits.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.overflow = 0;
        self.last_activity = None;
    }
}

/// Pack bits into an integer, first bit most significant.
///
/// Only the last 64 bits survive for longer inputs.
///
/// # Examples
///
/// ```
/// use facegate_wiegand::bits_to_value;
///
/// assert_eq!(bits_to_value(&[true, false, true, true]), 0b1011);
/// assert_eq!(bits_to_value(&[]), 0);
/// ```
pub fn bits_to_value(bits: &[bool]) -> u64 {
    bits.iter()
        .fold(0u64, |value, &bit| (value << 1) | u64::from(bit))
}

/// Unpack the low `width` bits of `value`, most significant first.
///
/// # Examples
///
/// ```
/// use facegate_wiegand::value_to_bits;
///
/// assert_eq!(value_to_bits(0b101, 4), vec![false, true, false, true]);
/// ```
pub fn value_to_bits(value: u64, width: u32) -> Vec<bool> {
    (0..width.min(64))
        .rev()
        .map(|shift| (value >> shift) & 1 == 1)
        .collect()
}
