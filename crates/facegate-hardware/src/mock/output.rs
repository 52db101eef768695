//! Mock Wiegand output for testing and development.
//!
//! Records every level written to the two data lines so tests can check the
//! emitted pulse train and its timing. Optionally wired to a mock input,
//! which turns the pair into a loopback cable.

use crate::error::{HardwareError, Result};
use crate::mock::input::MockWiegandInputHandle;
use crate::traits::WiegandOutput;
use facegate_core::{LineConfig, Level, OutputPolarity, Rail};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, trace};

/// One recorded line write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWrite {
    pub rail: Rail,
    pub line: u32,
    pub level: Level,
    /// Wall-clock time of the write, for pulse timing checks.
    pub at: Instant,
}

#[derive(Debug, Default)]
struct OutputState {
    config: Option<LineConfig>,
    levels: [Option<Level>; 2],
    writes: Vec<LineWrite>,
    fail_next_claim: Option<String>,
    fail_next_release: Option<String>,
    wired_to: Option<MockWiegandInputHandle>,
}

fn lock(state: &Mutex<OutputState>) -> MutexGuard<'_, OutputState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn rail_index(rail: Rail) -> usize {
    match rail {
        Rail::Zero => 0,
        Rail::One => 1,
    }
}

/// Mock Wiegand output lines.
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
/// let config = LineConfig::writer().build()?;
/// let mut writer = WiegandWriter::new(config, AnyWiegandOutput::Mock(output));
/// writer.initialize()?;
///
/// writer.send_bits(&[true, false, true])?;
/// assert_eq!(handle.decoded_bits(), vec![true, false, true]);
/// # writer.shutdown()
/// # }
/// ```
#[derive(Debug)]
pub struct MockWiegandOutput {
    state: Arc<Mutex<OutputState>>,
}

impl MockWiegandOutput {
    /// Create a new mock output and its inspection handle.
    pub fn new() -> (Self, MockWiegandOutputHandle) {
        let state = Arc::new(Mutex::new(OutputState::default()));
        let output = Self {
            state: Arc::clone(&state),
        };
        (output, MockWiegandOutputHandle { state })
    }

    /// Create a mock output whose active pulses arrive as edges on `input`.
    pub fn wired(input: MockWiegandInputHandle) -> (Self, MockWiegandOutputHandle) {
        let (output, handle) = Self::new();
        lock(&output.state).wired_to = Some(input);
        (output, handle)
    }
}

impl WiegandOutput for MockWiegandOutput {
    fn claim(&mut self, config: &LineConfig) -> Result<()> {
        let mut state = lock(&self.state);

        if let Some(message) = state.fail_next_claim.take() {
            return Err(HardwareError::initialization_failed(message));
        }

        let idle = config.polarity().idle_level();
        state.levels = [Some(idle), Some(idle)];
        state.config = Some(config.clone());
        debug!(
            d0 = config.d0_line(),
            d1 = config.d1_line(),
            ?idle,
            "Mock Wiegand output claimed"
        );
        Ok(())
    }

    fn drive(&mut self, rail: Rail, level: Level) -> Result<()> {
        let mut state = lock(&self.state);
        let config = state
            .config
            .as_ref()
            .ok_or_else(|| HardwareError::communication("Mock Wiegand output not claimed"))?;

        let line = config.line_for(rail);
        let polarity = config.polarity();
        let previous = state.levels[rail_index(rail)].replace(level);

        state.writes.push(LineWrite {
            rail,
            line,
            level,
            at: Instant::now(),
        });
        trace!(%rail, line, ?level, "Mock line write");

        let became_active = polarity.is_active(level)
            && previous.is_none_or(|prev| !polarity.is_active(prev));
        if became_active && let Some(input) = state.wired_to.as_ref() {
            input.pulse(rail)?;
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if let Some(message) = state.fail_next_release.take() {
            return Err(HardwareError::communication(message));
        }
        if state.config.take().is_some() {
            state.levels = [None, None];
            debug!("Mock Wiegand output released");
        }
        Ok(())
    }

    fn is_claimed(&self) -> bool {
        lock(&self.state).config.is_some()
    }
}

/// Handle for inspecting a mock Wiegand output.
#[derive(Debug, Clone)]
pub struct MockWiegandOutputHandle {
    state: Arc<Mutex<OutputState>>,
}

impl MockWiegandOutputHandle {
    /// All line writes since creation or the last [`clear`](Self::clear).
    pub fn writes(&self) -> Vec<LineWrite> {
        lock(&self.state).writes.clone()
    }

    /// Bits recovered from the recorded writes.
    ///
    /// Each transition of a rail into its active level counts as one bit.
    pub fn decoded_bits(&self) -> Vec<bool> {
        let state = lock(&self.state);
        let polarity = state
            .config
            .as_ref()
            .map(LineConfig::polarity)
            .unwrap_or_default();
        decode(&state.writes, polarity)
    }

    /// Current level of a rail, `None` when unclaimed.
    pub fn level(&self, rail: Rail) -> Option<Level> {
        lock(&self.state).levels[rail_index(rail)]
    }

    pub fn is_claimed(&self) -> bool {
        lock(&self.state).config.is_some()
    }

    /// Make the next claim fail with an initialization error.
    pub fn fail_next_claim(&self, message: impl Into<String>) {
        lock(&self.state).fail_next_claim = Some(message.into());
    }

    /// Make the next release fail, leaving the lines claimed.
    pub fn fail_next_release(&self, message: impl Into<String>) {
        lock(&self.state).fail_next_release = Some(message.into());
    }

    /// Forget recorded writes.
    pub fn clear(&self) {
        lock(&self.state).writes.clear();
    }
}

/// Decode active transitions into bits, assuming both rails start idle.
pub fn decode(writes: &[LineWrite], polarity: OutputPolarity) -> Vec<bool> {
    let mut active = [false, false];
    let mut bits = Vec::new();
    for write in writes {
        let now_active = polarity.is_active(write.level);
        let slot = &mut active[rail_index(write.rail)];
        if now_active && !*slot {
            bits.push(write.rail.bit());
        }
        *slot = now_active;
    }
    bits
}
