//! Wiegand writer: timed pulse emission on two output lines.
//!
//! The writer has no background work. Each send blocks the calling thread
//! for the whole frame, roughly `bits * (pulse_width + pulse_space)`, so
//! async callers should run it through `spawn_blocking`.

use crate::devices::AnyWiegandOutput;
use crate::error::{HardwareError, Result};
use crate::traits::WiegandOutput;
use facegate_core::LineConfig;
use facegate_wiegand::PulseTrain;
use tracing::{info, trace, warn};

const COMPONENT: &str = "Wiegand writer";

/// Transmit side of a Wiegand interface.
///
/// # Examples
///
/// ```
/// use facegate_core::LineConfig;
/// use facegate_hardware::WiegandWriter;
/// use facegate_hardware::devices::AnyWiegandOutput;
/// use facegate_hardware::mock::MockWiegandOutput;
///
/// # fn main() -> facegate_hardware::Result<()> {
/// let (output, handle) = MockWiegandOutput::new();
/// let mut writer = WiegandWriter::new(
///     LineConfig::writer().build()?,
///     AnyWiegandOutput::Mock(output),
/// );
///
/// assert!(writer.send_raw(1).unwrap_err().is_not_initialized());
///
/// writer.initialize()?;
/// writer.send_with_parity_1_30_1(0)?;
/// assert_eq!(handle.decoded_bits().len(), 32);
/// writer.shutdown()
/// # }
/// ```
#[derive(Debug)]
pub struct WiegandWriter {
    config: LineConfig,
    output: AnyWiegandOutput,
    initialized: bool,
}

impl WiegandWriter {
    pub fn new(config: LineConfig, output: AnyWiegandOutput) -> Self {
        Self {
            config,
            output,
            initialized: false,
        }
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Claim both output lines at their idle level.
    ///
    /// Calling it on an initialized writer is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the lines cannot be claimed.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.output.claim(&self.config)?;
        self.initialized = true;
        info!(
            chip = %self.config.chip_path(),
            d0 = self.config.d0_line(),
            d1 = self.config.d1_line(),
            polarity = ?self.config.polarity(),
            "Wiegand writer started"
        );
        Ok(())
    }

    /// Send the 32 bits of `value`, MSB first, without parity.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotInitialized`] before `initialize()`.
    pub fn send_raw(&mut self, value: u32) -> Result<()> {
        self.send_train(&PulseTrain::raw(value))
    }

    /// Send the low 30 bits of `value` framed by 1-30-1 parity bits.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotInitialized`] before `initialize()`.
    pub fn send_with_parity_1_30_1(&mut self, value: u32) -> Result<()> {
        self.send_train(&PulseTrain::parity_1_30_1(value))
    }

    /// Send an arbitrary bit sequence, first bit first.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotInitialized`] before `initialize()`.
    pub fn send_bits(&mut self, bits: &[bool]) -> Result<()> {
        self.send_train(&PulseTrain::from_bits(bits))
    }

    /// Emit a pulse train with the configured timing.
    ///
    /// A failed line write is logged and the train carries on, so the
    /// frame keeps its length and timing.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotInitialized`] before `initialize()`.
    pub fn send_train(&mut self, train: &PulseTrain) -> Result<()> {
        if !self.initialized {
            return Err(HardwareError::not_initialized(COMPONENT));
        }

        let polarity = self.config.polarity();
        let pulse_width = self.config.pulse_width();
        let pulse_space = self.config.pulse_space();

        for step in train.steps() {
            let level = polarity.level(step.active);
            if let Err(e) = self.output.drive(step.rail, level) {
                warn!(rail = %step.rail, ?level, error = %e, "Wiegand line write failed");
            }
            std::thread::sleep(if step.active { pulse_width } else { pulse_space });
        }

        trace!(
            bits = train.bit_count(),
            duration_us = train.duration(pulse_width, pulse_space).as_micros() as u64,
            "Wiegand frame sent"
        );
        Ok(())
    }

    /// Release the output lines. Safe to call on a writer that was never
    /// initialized.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the lines cannot be released. The
    /// writer then stays initialized and the call can be retried.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }

        self.output.release()?;
        self.initialized = false;
        info!("Wiegand writer stopped");
        Ok(())
    }
}

impl Drop for WiegandWriter {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Failed to release Wiegand output lines on drop");
        }
    }
}
