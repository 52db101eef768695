//! Enum wrappers for line backend dispatch.
//!
//! The reader and writer own their backend by value. Wrapping the concrete
//! backends in an enum keeps that ownership static while still letting a
//! feature flag add the GPIO variant.
//!
//! # Examples
//!
//! ```
//! use facegate_hardware::devices::AnyWiegandInput;
//! use facegate_hardware::mock::MockWiegandInput;
//! use facegate_hardware::traits::WiegandInput;
//!
//! let (input, _handle) = MockWiegandInput::new();
//! let input = AnyWiegandInput::Mock(input);
//! assert!(!input.is_claimed());
//! ```

use crate::capture::EdgeCapture;
use crate::error::Result;
use crate::mock::{MockWiegandInput, MockWiegandOutput};
use crate::traits::{WiegandInput, WiegandOutput};
use facegate_core::{LineConfig, Level, Rail};

#[cfg(feature = "hardware-wiegand")]
use crate::gpio::{GpioWiegandInput, GpioWiegandOutput};

/// Enum wrapper for Wiegand input dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyWiegandInput {
    /// Mock input for development and testing.
    Mock(MockWiegandInput),

    /// Linux GPIO character device.
    #[cfg(feature = "hardware-wiegand")]
    Gpio(GpioWiegandInput),
}

impl WiegandInput for AnyWiegandInput {
    fn claim(&mut self, config: &LineConfig, capture: EdgeCapture) -> Result<()> {
        match self {
            Self::Mock(input) => input.claim(config, capture),
            #[cfg(feature = "hardware-wiegand")]
            Self::Gpio(input) => input.claim(config, capture),
        }
    }

    fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(input) => input.release(),
            #[cfg(feature = "hardware-wiegand")]
            Self::Gpio(input) => input.release(),
        }
    }

    fn is_claimed(&self) -> bool {
        match self {
            Self::Mock(input) => input.is_claimed(),
            #[cfg(feature = "hardware-wiegand")]
            Self::Gpio(input) => input.is_claimed(),
        }
    }
}

/// Enum wrapper for Wiegand output dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyWiegandOutput {
    /// Mock output for development and testing.
    Mock(MockWiegandOutput),

    /// Linux GPIO character device.
    #[cfg(feature = "hardware-wiegand")]
    Gpio(GpioWiegandOutput),
}

impl WiegandOutput for AnyWiegandOutput {
    fn claim(&mut self, config: &LineConfig) -> Result<()> {
        match self {
            Self::Mock(output) => output.claim(config),
            #[cfg(feature = "hardware-wiegand")]
            Self::Gpio(output) => output.claim(config),
        }
    }

    fn drive(&mut self, rail: Rail, level: Level) -> Result<()> {
        match self {
            Self::Mock(output) => output.drive(rail, level),
            #[cfg(feature = "hardware-wiegand")]
            Self::Gpio(output) => output.drive(rail, level),
        }
    }

    fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(output) => output.release(),
            #[cfg(feature = "hardware-wiegand")]
            Self::Gpio(output) => output.release(),
        }
    }

    fn is_claimed(&self) -> bool {
        match self {
            Self::Mock(output) => output.is_claimed(),
            #[cfg(feature = "hardware-wiegand")]
            Self::Gpio(output) => output.is_claimed(),
        }
    }
}
