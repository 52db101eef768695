//! Mock Wiegand input for testing and development.
//!
//! This module provides a simulated pair of input lines that can be pulsed
//! programmatically, standing in for a card reader head wired to GPIO.

use crate::capture::EdgeCapture;
use crate::error::{HardwareError, Result};
use crate::traits::WiegandInput;
use facegate_core::{LineConfig, Rail};
use facegate_wiegand::{PulseTrain, value_to_bits};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct InputState {
    capture: Option<EdgeCapture>,
    config: Option<LineConfig>,
    fail_next_claim: Option<String>,
    claims: usize,
    releases: usize,
}

fn lock(state: &Mutex<InputState>) -> MutexGuard<'_, InputState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock Wiegand input lines.
///
/// Edges are injected through the paired [`MockWiegandInputHandle`] and are
/// time-stamped with the tokio clock, so tests running with a paused clock
/// see deterministic gaps.
///
/// # Examples
///
/// ```
/// use facegate_core::LineConfig;
/// use facegate_hardware::WiegandReader;
/// use facegate_hardware::devices::AnyWiegandInput;
/// use facegate_hardware::mock::MockWiegandInput;
///
/// #[tokio::main]
/// async fn main() -> facegate_hardware::Result<()> {
///     let (input, handle) = MockWiegandInput::new();
///     let config = LineConfig::reader().build()?;
///     let mut reader = WiegandReader::new(config, AnyWiegandInput::Mock(input));
///     reader.initialize().await?;
///
///     handle.send_value(0x1234_5678, 32)?;
///
///     let value = reader.get_next_frame(None).await?;
///     assert_eq!(value, Some(0x1234_5678));
///
///     reader.shutdown().await
/// }
/// ```
#[derive(Debug)]
pub struct MockWiegandInput {
    state: Arc<Mutex<InputState>>,
}

impl MockWiegandInput {
    /// Create a new mock input and its controlling handle.
    pub fn new() -> (Self, MockWiegandInputHandle) {
        let state = Arc::new(Mutex::new(InputState::default()));
        let input = Self {
            state: Arc::clone(&state),
        };
        (input, MockWiegandInputHandle { state })
    }
}

impl WiegandInput for MockWiegandInput {
    fn claim(&mut self, config: &LineConfig, capture: EdgeCapture) -> Result<()> {
        let mut state = lock(&self.state);

        if let Some(message) = state.fail_next_claim.take() {
            return Err(HardwareError::initialization_failed(message));
        }

        debug!(
            d0 = config.d0_line(),
            d1 = config.d1_line(),
            "Mock Wiegand input claimed"
        );
        state.capture = Some(capture);
        state.config = Some(config.clone());
        state.claims += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.capture.take().is_some() {
            state.config = None;
            state.releases += 1;
            debug!("Mock Wiegand input released");
        }
        Ok(())
    }

    fn is_claimed(&self) -> bool {
        lock(&self.state).capture.is_some()
    }
}

/// Handle for driving a mock Wiegand input.
///
/// Cloning the handle shares the same lines.
#[derive(Debug, Clone)]
pub struct MockWiegandInputHandle {
    state: Arc<Mutex<InputState>>,
}

impl MockWiegandInputHandle {
    /// Deliver an active edge on a raw line offset.
    ///
    /// Offsets that are not D0 or D1 reach the capture sink and are ignored
    /// there, like stray interrupts on real hardware.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines are not claimed.
    pub fn edge(&self, line: u32) -> Result<()> {
        let state = lock(&self.state);
        let capture = state
            .capture
            .as_ref()
            .ok_or_else(|| HardwareError::communication("Mock Wiegand input not claimed"))?;

        // Delivered under the state lock so release() waits for it.
        capture.on_edge(line, tokio::time::Instant::now().into_std());
        Ok(())
    }

    /// Deliver one pulse on a rail.
    pub fn pulse(&self, rail: Rail) -> Result<()> {
        let line = {
            let state = lock(&self.state);
            state
                .config
                .as_ref()
                .map(|config| config.line_for(rail))
                .ok_or_else(|| HardwareError::communication("Mock Wiegand input not claimed"))?
        };
        self.edge(line)
    }

    /// Deliver a burst of bits, first bit first, with no delay between them.
    pub fn send_bits(&self, bits: &[bool]) -> Result<()> {
        bits.iter()
            .try_for_each(|&bit| self.pulse(Rail::for_bit(bit)))
    }

    /// Deliver the low `bit_count` bits of `value`, MSB first.
    pub fn send_value(&self, value: u64, bit_count: u32) -> Result<()> {
        self.send_bits(&value_to_bits(value, bit_count))
    }

    /// Deliver the active steps of a pulse train.
    pub fn send_train(&self, train: &PulseTrain) -> Result<()> {
        self.send_bits(&train.bits())
    }

    /// Make the next claim fail with an initialization error.
    pub fn fail_next_claim(&self, message: impl Into<String>) {
        lock(&self.state).fail_next_claim = Some(message.into());
    }

    pub fn is_claimed(&self) -> bool {
        lock(&self.state).capture.is_some()
    }

    /// Number of successful claims so far.
    pub fn claim_count(&self) -> usize {
        lock(&self.state).claims
    }

    /// Number of releases of claimed lines so far.
    pub fn release_count(&self) -> usize {
        lock(&self.state).releases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{SharedAccumulator, lock as lock_acc};

    fn claimed() -> (MockWiegandInput, MockWiegandInputHandle, SharedAccumulator) {
        let (mut input, handle) = MockWiegandInput::new();
        let config = LineConfig::reader().build().unwrap();
        let accumulator = SharedAccumulator::default();
        input
            .claim(&config, EdgeCapture::new(&config, accumulator.clone()))
            .unwrap();
        (input, handle, accumulator)
    }

    #[tokio::test]
    async fn test_send_value_reaches_accumulator() {
        let (_input, handle, accumulator) = claimed();

        handle.send_value(0b1011, 4).unwrap();

        let frame = lock_acc(&accumulator).take();
        assert_eq!(frame.bit_count(), 4);
        assert_eq!(frame.value(), 0b1011);
    }

    #[tokio::test]
    async fn test_edges_rejected_when_unclaimed() {
        let (_input, handle) = MockWiegandInput::new();
        assert!(handle.pulse(Rail::One).is_err());
        assert!(handle.edge(17).is_err());
    }

    #[tokio::test]
    async fn test_release_stops_delivery() {
        let (mut input, handle, accumulator) = claimed();

        input.release().unwrap();
        assert!(handle.send_value(1, 1).is_err());
        assert!(lock_acc(&accumulator).is_empty());
        assert_eq!(handle.release_count(), 1);

        // Second release is a no-op
        input.release().unwrap();
        assert_eq!(handle.release_count(), 1);
    }

    #[test]
    fn test_fail_next_claim() {
        let (mut input, handle) = MockWiegandInput::new();
        let config = LineConfig::reader().build().unwrap();
        handle.fail_next_claim("gpiochip busy");

        let capture = EdgeCapture::new(&config, SharedAccumulator::default());
        let result = input.claim(&config, capture.clone());
        assert!(matches!(
            result,
            Err(HardwareError::InitializationFailed { .. })
        ));
        assert!(!input.is_claimed());

        // Only the next claim fails
        input.claim(&config, capture).unwrap();
        assert!(handle.is_claimed());
        assert_eq!(handle.claim_count(), 1);
    }
}
