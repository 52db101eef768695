//! Edge capture: one active edge in, one bit out.
//!
//! [`EdgeCapture`] is handed to an input backend when its lines are claimed.
//! The backend calls [`EdgeCapture::on_edge`] from whatever context delivers
//! line events (a GPIO edge thread, a mock handle). The call locks the shared
//! accumulator for a single push and never blocks on anything else.

use facegate_core::LineConfig;
use facegate_wiegand::BitAccumulator;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Accumulator shared between edge capture and the frame watcher.
pub(crate) type SharedAccumulator = Arc<Mutex<BitAccumulator>>;

/// Lock the accumulator, recovering it if a holder panicked.
///
/// A panic cannot leave the accumulator half-pushed, so the data is usable.
pub(crate) fn lock(accumulator: &SharedAccumulator) -> MutexGuard<'_, BitAccumulator> {
    accumulator.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sink for active edges on the two data lines.
#[derive(Debug, Clone)]
pub struct EdgeCapture {
    d0_line: u32,
    d1_line: u32,
    accumulator: SharedAccumulator,
}

impl EdgeCapture {
    pub(crate) fn new(config: &LineConfig, accumulator: SharedAccumulator) -> Self {
        Self {
            d0_line: config.d0_line(),
            d1_line: config.d1_line(),
            accumulator,
        }
    }

    /// Record an active edge on `line` seen at `at`.
    ///
    /// D0 appends a 0, D1 appends a 1. Edges on any other line are ignored.
    pub fn on_edge(&self, line: u32, at: Instant) {
        let bit = if line == self.d0_line {
            false
        } else if line == self.d1_line {
            true
        } else {
            return;
        };

        lock(&self.accumulator).push(bit, at);
    }

    /// Line offsets this sink listens to, D0 first.
    pub fn lines(&self) -> [u32; 2] {
        [self.d0_line, self.d1_line]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> (EdgeCapture, SharedAccumulator) {
        let config = LineConfig::reader().lines(17, 27).build().unwrap();
        let accumulator = SharedAccumulator::default();
        (EdgeCapture::new(&config, accumulator.clone()), accumulator)
    }

    #[test]
    fn test_edges_map_to_bits() {
        let (capture, accumulator) = capture();
        let now = Instant::now();

        capture.on_edge(27, now);
        capture.on_edge(17, now);
        capture.on_edge(27, now);

        let frame = lock(&accumulator).take();
        assert_eq!(frame.bit_count(), 3);
        assert_eq!(frame.value(), 0b101);
    }

    #[test]
    fn test_foreign_line_ignored() {
        let (capture, accumulator) = capture();

        capture.on_edge(4, Instant::now());

        let acc = lock(&accumulator);
        assert!(acc.is_empty());
        assert_eq!(acc.last_activity(), None);
    }

    #[test]
    fn test_last_activity_tracks_latest_edge() {
        let (capture, accumulator) = capture();
        let t0 = Instant::now();
        let t1 = t0 + std::time::Duration::from_millis(3);

        capture.on_edge(17, t0);
        capture.on_edge(17, t1);

        assert_eq!(lock(&accumulator).last_activity(), Some(t1));
    }

    #[test]
    fn test_lines() {
        let (capture, _) = capture();
        assert_eq!(capture.lines(), [17, 27]);
    }
}
