use crate::{
    Result,
    constants::{
        CANONICAL_FRAME_BITS, DEFAULT_CHIP, DEFAULT_CONSUMER, DEFAULT_GAP_MS,
        DEFAULT_PULSE_SPACE_US, DEFAULT_PULSE_WIDTH_US, DEFAULT_READER_D0_LINE,
        DEFAULT_READER_D1_LINE, DEFAULT_WRITER_D0_LINE, DEFAULT_WRITER_D1_LINE, MAX_WORD_BITS,
        MIN_GAP_MS, MIN_PULSE_SPACE_US, MIN_PULSE_WIDTH_US,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One of the two Wiegand data rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rail {
    /// D0, pulsed for a logical 0.
    Zero,
    /// D1, pulsed for a logical 1.
    One,
}

impl Rail {
    /// Rail that carries the given bit.
    #[must_use]
    pub fn for_bit(bit: bool) -> Self {
        if bit { Rail::One } else { Rail::Zero }
    }

    /// Bit value signalled by a pulse on this rail.
    #[must_use]
    pub fn bit(&self) -> bool {
        matches!(self, Rail::One)
    }
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rail::Zero => write!(f, "D0"),
            Rail::One => write!(f, "D1"),
        }
    }
}

/// Electrical level of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[must_use]
    pub fn is_high(&self) -> bool {
        matches!(self, Level::High)
    }
}

/// Pull bias applied to input lines.
///
/// Wiegand lines are open-collector and idle high, so readers default to
/// pull-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineBias {
    #[default]
    PullUp,
    PullDown,
    Disabled,
}

/// Transition direction that marks a bit arrival on an input line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveEdge {
    #[default]
    Falling,
    Rising,
}

/// How a logical "active" pulse maps to the GPIO output level.
///
/// With [`OutputPolarity::ActiveHigh`] the GPIO is driven high to switch an
/// opto-isolator on, which pulls the panel's data line low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputPolarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl OutputPolarity {
    /// Electrical level that realizes the requested logical state.
    ///
    /// # Examples
    ///
    /// ```
    /// use facegate_core::{Level, OutputPolarity};
    ///
    /// assert_eq!(OutputPolarity::ActiveHigh.level(true), Level::High);
    /// assert_eq!(OutputPolarity::ActiveLow.level(true), Level::Low);
    /// assert_eq!(OutputPolarity::ActiveLow.idle_level(), Level::High);
    /// ```
    #[must_use]
    pub fn level(&self, active: bool) -> Level {
        let active_high = matches!(self, OutputPolarity::ActiveHigh);
        if active == active_high {
            Level::High
        } else {
            Level::Low
        }
    }

    #[must_use]
    pub fn idle_level(&self) -> Level {
        self.level(false)
    }

    /// Inverse of [`OutputPolarity::level`].
    #[must_use]
    pub fn is_active(&self, level: Level) -> bool {
        self.level(true) == level
    }
}

/// Immutable line parameters shared by the reader and writer.
///
/// Built through [`LineConfigBuilder`]; timing values are clamped to safe
/// minimums and line assignment is validated when the builder runs, and
/// deserialization goes through the same path.
///
/// # Examples
///
/// ```
/// use facegate_core::LineConfig;
/// use std::time::Duration;
///
/// let config = LineConfig::writer()
///     .lines(5, 6)
///     .pulse_width(Duration::from_micros(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.d0_line(), 5);
/// // Clamped to the 20 us minimum
/// assert_eq!(config.pulse_width(), Duration::from_micros(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineConfigBuilder", into = "LineConfigBuilder")]
pub struct LineConfig {
    chip: u32,
    d0_line: u32,
    d1_line: u32,
    bias: LineBias,
    active_edge: ActiveEdge,
    gap_timeout: Duration,
    polarity: OutputPolarity,
    pulse_width: Duration,
    pulse_space: Duration,
    frame_bits: u8,
    decode_variants: bool,
    consumer: String,
}

impl LineConfig {
    /// Builder seeded with the reader line defaults.
    pub fn reader() -> LineConfigBuilder {
        LineConfigBuilder::default()
    }

    /// Builder seeded with the writer line defaults.
    pub fn writer() -> LineConfigBuilder {
        LineConfigBuilder::default().lines(DEFAULT_WRITER_D0_LINE, DEFAULT_WRITER_D1_LINE)
    }

    pub fn builder() -> LineConfigBuilder {
        LineConfigBuilder::default()
    }

    pub fn chip(&self) -> u32 {
        self.chip
    }

    /// Character device path of the GPIO controller.
    pub fn chip_path(&self) -> String {
        format!("/dev/gpiochip{}", self.chip)
    }

    pub fn d0_line(&self) -> u32 {
        self.d0_line
    }

    pub fn d1_line(&self) -> u32 {
        self.d1_line
    }

    /// Line offset carrying the given rail.
    pub fn line_for(&self, rail: Rail) -> u32 {
        match rail {
            Rail::Zero => self.d0_line,
            Rail::One => self.d1_line,
        }
    }

    /// Rail carried by the given line offset, if it is one of ours.
    pub fn rail_for(&self, line: u32) -> Option<Rail> {
        if line == self.d0_line {
            Some(Rail::Zero)
        } else if line == self.d1_line {
            Some(Rail::One)
        } else {
            None
        }
    }

    pub fn bias(&self) -> LineBias {
        self.bias
    }

    pub fn active_edge(&self) -> ActiveEdge {
        self.active_edge
    }

    /// Silence after the last bit that ends a frame.
    pub fn gap_timeout(&self) -> Duration {
        self.gap_timeout
    }

    pub fn polarity(&self) -> OutputPolarity {
        self.polarity
    }

    pub fn pulse_width(&self) -> Duration {
        self.pulse_width
    }

    pub fn pulse_space(&self) -> Duration {
        self.pulse_space
    }

    /// Time one bit occupies on the wire when transmitted.
    pub fn bit_period(&self) -> Duration {
        self.pulse_width + self.pulse_space
    }

    /// Word width accepted by the canonical frame channel.
    pub fn frame_bits(&self) -> u8 {
        self.frame_bits
    }

    pub fn decode_variants(&self) -> bool {
        self.decode_variants
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            chip: DEFAULT_CHIP,
            d0_line: DEFAULT_READER_D0_LINE,
            d1_line: DEFAULT_READER_D1_LINE,
            bias: LineBias::default(),
            active_edge: ActiveEdge::default(),
            gap_timeout: Duration::from_millis(DEFAULT_GAP_MS),
            polarity: OutputPolarity::default(),
            pulse_width: Duration::from_micros(DEFAULT_PULSE_WIDTH_US),
            pulse_space: Duration::from_micros(DEFAULT_PULSE_SPACE_US),
            frame_bits: CANONICAL_FRAME_BITS,
            decode_variants: false,
            consumer: DEFAULT_CONSUMER.to_string(),
        }
    }
}

/// Builder and serialized shape of [`LineConfig`].
///
/// Timing fields are plain integers so a config file reads naturally:
///
/// ```
/// use facegate_core::{LineConfig, LineConfigBuilder};
///
/// let builder: LineConfigBuilder =
///     serde_json::from_str(r#"{ "d0_line": 4, "d1_line": 5, "gap_ms": 25 }"#).unwrap();
/// let config = builder.build().unwrap();
/// assert_eq!(config.gap_timeout().as_millis(), 25);
/// assert_eq!(config.frame_bits(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfigBuilder {
    pub chip: u32,
    pub d0_line: u32,
    pub d1_line: u32,
    pub bias: LineBias,
    pub active_edge: ActiveEdge,
    pub gap_ms: u64,
    pub polarity: OutputPolarity,
    pub pulse_width_us: u64,
    pub pulse_space_us: u64,
    pub frame_bits: u8,
    pub decode_variants: bool,
    pub consumer: String,
}

impl Default for LineConfigBuilder {
    fn default() -> Self {
        Self {
            chip: DEFAULT_CHIP,
            d0_line: DEFAULT_READER_D0_LINE,
            d1_line: DEFAULT_READER_D1_LINE,
            bias: LineBias::default(),
            active_edge: ActiveEdge::default(),
            gap_ms: DEFAULT_GAP_MS,
            polarity: OutputPolarity::default(),
            pulse_width_us: DEFAULT_PULSE_WIDTH_US,
            pulse_space_us: DEFAULT_PULSE_SPACE_US,
            frame_bits: CANONICAL_FRAME_BITS,
            decode_variants: false,
            consumer: DEFAULT_CONSUMER.to_string(),
        }
    }
}

impl LineConfigBuilder {
    pub fn chip(mut self, chip: u32) -> Self {
        self.chip = chip;
        self
    }

    /// Set the D0 and D1 line offsets.
    pub fn lines(mut self, d0_line: u32, d1_line: u32) -> Self {
        self.d0_line = d0_line;
        self.d1_line = d1_line;
        self
    }

    pub fn bias(mut self, bias: LineBias) -> Self {
        self.bias = bias;
        self
    }

    pub fn active_edge(mut self, edge: ActiveEdge) -> Self {
        self.active_edge = edge;
        self
    }

    /// Set the gap timeout. Millisecond resolution.
    pub fn gap_timeout(mut self, gap: Duration) -> Self {
        self.gap_ms = u64::try_from(gap.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn polarity(mut self, polarity: OutputPolarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Set the active pulse width. Microsecond resolution.
    pub fn pulse_width(mut self, width: Duration) -> Self {
        self.pulse_width_us = u64::try_from(width.as_micros()).unwrap_or(u64::MAX);
        self
    }

    /// Set the inter-bit spacing. Microsecond resolution.
    pub fn pulse_space(mut self, space: Duration) -> Self {
        self.pulse_space_us = u64::try_from(space.as_micros()).unwrap_or(u64::MAX);
        self
    }

    pub fn frame_bits(mut self, bits: u8) -> Self {
        self.frame_bits = bits;
        self
    }

    /// Decode 26- and 34-bit frames on the diagnostic path.
    pub fn decode_variants(mut self, enabled: bool) -> Self {
        self.decode_variants = enabled;
        self
    }

    pub fn consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = consumer.into();
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - D0 and D1 are the same line
    /// - `frame_bits` is outside 1-32
    pub fn build(self) -> Result<LineConfig> {
        if self.d0_line == self.d1_line {
            return Err(Error::Config(format!(
                "D0 and D1 must be distinct lines, both are {}",
                self.d0_line
            )));
        }

        if !(1..=MAX_WORD_BITS).contains(&self.frame_bits) {
            return Err(Error::Config(format!(
                "Frame width must be 1-{MAX_WORD_BITS} bits, got {}",
                self.frame_bits
            )));
        }

        Ok(LineConfig {
            chip: self.chip,
            d0_line: self.d0_line,
            d1_line: self.d1_line,
            bias: self.bias,
            active_edge: self.active_edge,
            gap_timeout: Duration::from_millis(self.gap_ms.max(MIN_GAP_MS)),
            polarity: self.polarity,
            pulse_width: Duration::from_micros(self.pulse_width_us.max(MIN_PULSE_WIDTH_US)),
            pulse_space: Duration::from_micros(self.pulse_space_us.max(MIN_PULSE_SPACE_US)),
            frame_bits: self.frame_bits,
            decode_variants: self.decode_variants,
            consumer: self.consumer,
        })
    }
}

impl TryFrom<LineConfigBuilder> for LineConfig {
    type Error = Error;

    fn try_from(builder: LineConfigBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<LineConfig> for LineConfigBuilder {
    fn from(config: LineConfig) -> Self {
        Self {
            chip: config.chip,
            d0_line: config.d0_line,
            d1_line: config.d1_line,
            bias: config.bias,
            active_edge: config.active_edge,
            gap_ms: u64::try_from(config.gap_timeout.as_millis()).unwrap_or(u64::MAX),
            polarity: config.polarity,
            pulse_width_us: u64::try_from(config.pulse_width.as_micros()).unwrap_or(u64::MAX),
            pulse_space_us: u64::try_from(config.pulse_space.as_micros()).unwrap_or(u64::MAX),
            frame_bits: config.frame_bits,
            decode_variants: config.decode_variants,
            consumer: config.consumer,
        }
    }
}
