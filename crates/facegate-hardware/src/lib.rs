//! Wiegand line I/O for the Facegate access controller.
//!
//! This crate connects the pure codec in `facegate-wiegand` to a pair of
//! physical data lines. It provides:
//!
//! - [`WiegandReader`]: claims two input lines, turns active edges into
//!   bits and hands finalized 32-bit frames to the caller
//! - [`WiegandWriter`]: claims two output lines and emits frames as timed
//!   pulses, optionally with 1-30-1 parity
//! - Line backends behind the [`WiegandInput`] and [`WiegandOutput`] traits:
//!   mocks for tests, and the Linux GPIO character device behind the
//!   `hardware-wiegand` feature
//!
//! # Reading
//!
//! ```no_run
//! use facegate_core::LineConfig;
//! use facegate_hardware::WiegandReader;
//! use facegate_hardware::devices::AnyWiegandInput;
//! use facegate_hardware::mock::MockWiegandInput;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> facegate_hardware::Result<()> {
//!     let (input, _handle) = MockWiegandInput::new();
//!     let mut reader = WiegandReader::new(
//!         LineConfig::reader().build()?,
//!         AnyWiegandInput::Mock(input),
//!     );
//!     reader.initialize().await?;
//!
//!     while let Some(card) = reader.get_next_frame(Some(Duration::from_secs(5))).await? {
//!         println!("card {card:#010x}");
//!     }
//!
//!     reader.shutdown().await
//! }
//! ```
//!
//! # Error Handling
//!
//! Only lifecycle problems surface as [`HardwareError`]: claiming lines that
//! cannot be opened, or using a reader or writer before `initialize()`. A
//! read timeout is `Ok(None)`, and frames of the wrong length are filtered
//! and counted in [`ReaderStats`].

mod assembler;
mod capture;
pub mod devices;
pub mod error;
#[cfg(feature = "hardware-wiegand")]
pub mod gpio;
pub mod mock;
pub mod reader;
pub mod traits;
pub mod writer;

pub use assembler::ReaderStats;
pub use capture::EdgeCapture;
pub use error::{HardwareError, Result};
pub use reader::WiegandReader;
pub use traits::{WiegandInput, WiegandOutput};
pub use writer::WiegandWriter;
