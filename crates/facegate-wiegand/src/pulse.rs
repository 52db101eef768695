//! Pulse trains for the transmit side.
//!
//! A [`PulseTrain`] is the ordered list of rail transitions that put a frame
//! on the wire: each bit becomes an active step on its rail followed by an
//! idle step on the same rail. The hardware writer turns active steps into a
//! pulse-width hold and idle steps into an inter-bit spacing hold.

use crate::bits::value_to_bits;
use crate::parity::encode_1_30_1;
use facegate_core::{Error, Rail, Result};
use std::time::Duration;

/// One transition in a pulse train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseStep {
    pub rail: Rail,
    /// `true` drives the rail to its active level, `false` back to idle.
    pub active: bool,
}

/// Ordered steps transmitting one frame, MSB first.
///
/// Exactly one rail is pulsed per bit.
///
/// # Examples
///
/// ```
/// use facegate_wiegand::PulseTrain;
/// use facegate_core::Rail;
///
/// let train = PulseTrain::from_bits(&[true, false]);
/// let rails: Vec<Rail> = train.active_steps().map(|s| s.rail).collect();
/// assert_eq!(rails, vec![Rail::One, Rail::Zero]);
/// assert_eq!(train.steps().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PulseTrain {
    steps: Vec<PulseStep>,
}

impl PulseTrain {
    pub fn from_bits(bits: &[bool]) -> Self {
        let steps = bits
            .iter()
            .flat_map(|&bit| {
                let rail = Rail::for_bit(bit);
                [
                    PulseStep { rail, active: true },
                    PulseStep {
                        rail,
                        active: false,
                    },
                ]
            })
            .collect();
        Self { steps }
    }

    /// 32 data bits, no parity.
    pub fn raw(value: u32) -> Self {
        Self::from_bits(&value_to_bits(u64::from(value), 32))
    }

    /// Leading even parity, low 30 bits of `value`, trailing odd parity.
    pub fn parity_1_30_1(value: u32) -> Self {
        let train = Self::raw(encode_1_30_1(value));
        debug_assert_eq!(train.bit_count(), 32);
        train
    }

    /// Parse a string of `0`/`1` characters, first character sent first.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBitString` on any other character.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_wiegand::PulseTrain;
    ///
    /// let train = PulseTrain::from_bit_str("1101").unwrap();
    /// assert_eq!(train.bits(), vec![true, true, false, true]);
    ///
    /// assert!(PulseTrain::from_bit_str("10x1").is_err());
    /// ```
    pub fn from_bit_str(bits: &str) -> Result<Self> {
        let parsed = bits
            .chars()
            .enumerate()
            .map(|(i, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(Error::InvalidBitString(format!(
                    "unexpected {other:?} at position {i}"
                ))),
            })
            .collect::<Result<Vec<bool>>>()?;
        Ok(Self::from_bits(&parsed))
    }

    pub fn steps(&self) -> &[PulseStep] {
        &self.steps
    }

    /// Steps that start a pulse, one per bit.
    pub fn active_steps(&self) -> impl Iterator<Item = &PulseStep> {
        self.steps.iter().filter(|step| step.active)
    }

    pub fn bit_count(&self) -> usize {
        self.active_steps().count()
    }

    /// Bits carried by the train, in transmit order.
    pub fn bits(&self) -> Vec<bool> {
        self.active_steps().map(|step| step.rail.bit()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Wire time of the whole train.
    pub fn duration(&self, pulse_width: Duration, pulse_space: Duration) -> Duration {
        let bits = u32::try_from(self.bit_count()).unwrap_or(u32::MAX);
        (pulse_width + pulse_space) * bits
    }
}

impl IntoIterator for PulseTrain {
    type Item = PulseStep;
    type IntoIter = std::vec::IntoIter<PulseStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
