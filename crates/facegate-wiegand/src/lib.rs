//! Wiegand frame codec.
//!
//! Pure, I/O-free building blocks for the Wiegand line protocol:
//!
//! - [`BitAccumulator`]: in-flight bits plus last-activity time, finalized
//!   into a [`Frame`] once the line has been silent for the gap timeout.
//! - [`Frame`]: finalized bit count and MSB-first value.
//! - [`parity`]: the 1-30-1 layout (even parity over the first data half,
//!   odd parity over the second).
//! - [`PulseTrain`]: the ordered rail pulses that transmit a frame.
//! - [`variant`]: 26- and 34-bit facility/card decoding for diagnostics.
//!
//! The hardware crate drives these from GPIO edges and output lines.
//!
//! # Example
//!
//! ```
//! use facegate_wiegand::{BitAccumulator, PulseTrain};
//! use std::time::{Duration, Instant};
//!
//! let train = PulseTrain::raw(0xDEAD_BEEF);
//!
//! let start = Instant::now();
//! let mut acc = BitAccumulator::new();
//! for step in train.active_steps() {
//!     acc.push(step.rail.bit(), start);
//! }
//!
//! let gap = Duration::from_millis(30);
//! let frame = acc.finalize_if_idle(start + Duration::from_millis(31), gap).unwrap();
//! assert_eq!(frame.to_u32(), Some(0xDEAD_BEEF));
//! ```

pub mod bits;
pub mod frame;
pub mod parity;
pub mod pulse;
pub mod variant;

pub use bits::{BitAccumulator, bits_to_value, value_to_bits};
pub use frame::Frame;
pub use pulse::{PulseStep, PulseTrain};
pub use variant::{DecodedCard, WiegandFormat};
