//! Core constants for the Wiegand line codec.
//!
//! This module collects the defaults, clamps and frame widths shared by the
//! reader and writer sides. Keeping them in one place lets a deployment reason
//! about timing without opening the hardware crate.
//!
//! # Line Timing
//!
//! A Wiegand frame is a train of short active pulses, one per bit, each on
//! either the D0 rail (logical 0) or the D1 rail (logical 1):
//!
//! ```text
//!        pulse   space
//! D0 ‾‾‾‾\_/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾\_/‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! D1 ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾\_/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!         0           1           0      ...gap...
//! ```
//!
//! The receiver finalizes a frame once no edge has arrived for the gap
//! timeout.
//!
//! # Usage
//!
//! ```
//! use facegate_core::constants::*;
//! use std::time::Duration;
//!
//! let gap = Duration::from_millis(DEFAULT_GAP_MS);
//! assert!(gap > Duration::from_micros(DEFAULT_PULSE_SPACE_US));
//! assert_eq!(CANONICAL_FRAME_BITS, 32);
//! ```

// ============================================================================
// GPIO Line Assignment
// ============================================================================

/// Default GPIO controller index (`/dev/gpiochip0`).
pub const DEFAULT_CHIP: u32 = 0;

/// Default reader D0 line offset (BCM numbering).
pub const DEFAULT_READER_D0_LINE: u32 = 17;

/// Default reader D1 line offset (BCM numbering).
pub const DEFAULT_READER_D1_LINE: u32 = 27;

/// Default writer D0 line offset.
///
/// Drives the first opto-isolator input, which pulls the panel's D0 low.
pub const DEFAULT_WRITER_D0_LINE: u32 = 22;

/// Default writer D1 line offset.
pub const DEFAULT_WRITER_D1_LINE: u32 = 23;

/// Consumer label attached to claimed lines.
pub const DEFAULT_CONSUMER: &str = "facegate-wiegand";

// ============================================================================
// Receive Timing
// ============================================================================

/// Default inter-bit gap that ends a frame, in milliseconds.
pub const DEFAULT_GAP_MS: u64 = 30;

/// Smallest accepted gap timeout, in milliseconds.
///
/// Must stay above the watcher poll interval or frames get split.
pub const MIN_GAP_MS: u64 = 2;

/// Frame watcher poll interval, in milliseconds.
pub const FRAME_POLL_INTERVAL_MS: u64 = 1;

/// Capacity of the finalized frame hand-off queue.
pub const FRAME_QUEUE_CAPACITY: usize = 64;

/// Bits kept per in-flight frame. Edges past this are counted, not stored.
pub const MAX_FRAME_BITS: usize = 64;

// ============================================================================
// Transmit Timing
// ============================================================================

/// Default active pulse width, in microseconds.
pub const DEFAULT_PULSE_WIDTH_US: u64 = 80;

/// Default inter-bit spacing, in microseconds.
pub const DEFAULT_PULSE_SPACE_US: u64 = 2000;

/// Smallest accepted pulse width, in microseconds.
pub const MIN_PULSE_WIDTH_US: u64 = 20;

/// Smallest accepted inter-bit spacing, in microseconds.
pub const MIN_PULSE_SPACE_US: u64 = 200;

// ============================================================================
// Frame Widths
// ============================================================================

/// Width of the canonical frame accepted by the consumer API.
pub const CANONICAL_FRAME_BITS: u8 = 32;

/// Largest configurable word width (the consumer API yields `u32`).
pub const MAX_WORD_BITS: u8 = 32;

/// Data bits carried by a 1-30-1 parity frame.
pub const PARITY_DATA_BITS: u32 = 30;

/// Data bits in each parity-covered half of a 1-30-1 frame.
pub const PARITY_HALF_BITS: u32 = 15;

/// Length of the standard 26-bit facility/card format.
pub const WIEGAND_26_BITS: usize = 26;

/// Length of the 34-bit facility/card format.
pub const WIEGAND_34_BITS: usize = 34;
