//! Line backend trait definitions.
//!
//! These traits are the seam between the Wiegand reader/writer lifecycle and
//! the thing that actually owns the GPIO lines: the Linux character device,
//! or a mock for tests.
//!
//! Unlike most device traits in an async codebase these are synchronous.
//! Edge delivery happens in an interrupt-like context and pulse emission
//! happens on the caller's thread with microsecond holds, so neither side
//! can afford to go through the async scheduler.

use crate::capture::EdgeCapture;
use crate::error::Result;
use facegate_core::{LineConfig, Level, Rail};

/// Input side of a Wiegand interface.
///
/// # Examples
///
/// ```
/// use facegate_hardware::mock::MockWiegandInput;
/// use facegate_hardware::traits::WiegandInput;
///
/// let (input, _handle) = MockWiegandInput::new();
/// assert!(!input.is_claimed());
/// ```
pub trait WiegandInput: Send {
    /// Claim both data lines as inputs with the configured bias and start
    /// delivering active edges to `capture`.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO controller cannot be opened or either
    /// line cannot be claimed. Nothing is left claimed on failure.
    fn claim(&mut self, config: &LineConfig, capture: EdgeCapture) -> Result<()>;

    /// Stop edge delivery and release the lines.
    ///
    /// No call into the capture sink may happen after this returns.
    /// Calling it on an unclaimed input is a no-op.
    fn release(&mut self) -> Result<()>;

    fn is_claimed(&self) -> bool;
}

/// Output side of a Wiegand interface.
pub trait WiegandOutput: Send {
    /// Claim both data lines as outputs, driven to the configured idle level.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO controller cannot be opened or either
    /// line cannot be claimed.
    fn claim(&mut self, config: &LineConfig) -> Result<()>;

    /// Set the electrical level of one rail.
    fn drive(&mut self, rail: Rail, level: Level) -> Result<()>;

    /// Release the lines. Calling it on an unclaimed output is a no-op.
    fn release(&mut self) -> Result<()>;

    fn is_claimed(&self) -> bool;
}
