//! Frame assembly: the watcher side of the reader.
//!
//! A [`FrameAssembler`] owns the sending half of the frame queues and
//! polls the shared accumulator. Once the lines have been quiet for longer
//! than the gap timeout the pending bits become a [`Frame`], and frames of
//! the configured width are handed to the consumer.

use crate::capture::{SharedAccumulator, lock};
use facegate_core::LineConfig;
use facegate_core::constants::{FRAME_POLL_INTERVAL_MS, MAX_FRAME_BITS};
use facegate_wiegand::{DecodedCard, Frame};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Reader counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Frames of the configured width delivered to the queue.
    pub frames_accepted: u64,
    /// Finalized frames of any other width.
    pub frames_dropped: u64,
    /// Frames discarded because the consumer queue was full.
    pub frames_overrun: u64,
    /// Frames decoded on the 26/34-bit diagnostic path.
    pub variants_decoded: u64,
    /// Bits discarded because a burst exceeded the accumulator cap.
    pub bits_overflowed: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    frames_accepted: AtomicU64,
    frames_dropped: AtomicU64,
    frames_overrun: AtomicU64,
    variants_decoded: AtomicU64,
    bits_overflowed: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn snapshot(&self) -> ReaderStats {
        ReaderStats {
            frames_accepted: self.frames_accepted.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_overrun: self.frames_overrun.load(Ordering::Relaxed),
            variants_decoded: self.variants_decoded.load(Ordering::Relaxed),
            bits_overflowed: self.bits_overflowed.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Turns idle accumulator contents into delivered frames.
pub(crate) struct FrameAssembler {
    accumulator: SharedAccumulator,
    gap: Duration,
    frame_bits: u8,
    frames: mpsc::Sender<u32>,
    decoded: Option<mpsc::Sender<DecodedCard>>,
    stats: Arc<StatsCounters>,
}

impl FrameAssembler {
    pub(crate) fn new(
        config: &LineConfig,
        accumulator: SharedAccumulator,
        frames: mpsc::Sender<u32>,
        decoded: Option<mpsc::Sender<DecodedCard>>,
        stats: Arc<StatsCounters>,
    ) -> Self {
        Self {
            accumulator,
            gap: config.gap_timeout(),
            frame_bits: config.frame_bits(),
            frames,
            decoded,
            stats,
        }
    }

    /// Finalize and route a pending frame if the gap has elapsed at `now`.
    pub(crate) fn tick(&self, now: Instant) {
        let Some(frame) = lock(&self.accumulator).finalize_if_idle(now, self.gap) else {
            return;
        };

        let overflow = frame.bit_count().saturating_sub(MAX_FRAME_BITS);
        if overflow > 0 {
            self.stats
                .bits_overflowed
                .fetch_add(overflow as u64, Ordering::Relaxed);
            warn!(
                bits = frame.bit_count(),
                "Wiegand burst exceeded accumulator capacity"
            );
        }

        self.route(frame);
    }

    fn route(&self, frame: Frame) {
        if frame.has_width(self.frame_bits) {
            // has_width bounds the frame to at most 32 bits
            let Some(value) = frame.to_u32() else {
                return;
            };
            match self.frames.try_send(value) {
                Ok(()) => {
                    StatsCounters::bump(&self.stats.frames_accepted);
                    debug!(%frame, "Wiegand frame accepted");
                }
                Err(TrySendError::Full(_)) => {
                    StatsCounters::bump(&self.stats.frames_overrun);
                    warn!(%frame, "Wiegand frame queue full, frame discarded");
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(%frame, "Wiegand frame queue closed");
                }
            }
            return;
        }

        StatsCounters::bump(&self.stats.frames_dropped);

        if let Some(decoded) = self.decoded.as_ref()
            && let Some(card) = DecodedCard::decode(&frame)
        {
            StatsCounters::bump(&self.stats.variants_decoded);
            debug!(%card, parity_ok = card.parity_valid(), "Wiegand variant decoded");
            if let Err(TrySendError::Full(_)) = decoded.try_send(card) {
                warn!(%card, "Wiegand decode queue full, card discarded");
            }
            return;
        }

        trace!(%frame, expected = self.frame_bits, "Wiegand frame dropped");
    }

    /// Poll until `cancel` fires.
    pub(crate) async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_millis(FRAME_POLL_INTERVAL_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.tick(tokio::time::Instant::now().into_std()),
            }
        }

        trace!("Wiegand frame watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facegate_wiegand::value_to_bits;

    struct Fixture {
        assembler: FrameAssembler,
        accumulator: SharedAccumulator,
        frames: mpsc::Receiver<u32>,
        decoded: mpsc::Receiver<DecodedCard>,
        stats: Arc<StatsCounters>,
    }

    fn fixture(decode_variants: bool, capacity: usize) -> Fixture {
        let config = LineConfig::reader().build().unwrap();
        let accumulator = SharedAccumulator::default();
        let (frame_tx, frames) = mpsc::channel(capacity);
        let (decoded_tx, decoded) = mpsc::channel(capacity);
        let stats = Arc::new(StatsCounters::default());
        let assembler = FrameAssembler::new(
            &config,
            accumulator.clone(),
            frame_tx,
            decode_variants.then_some(decoded_tx),
            Arc::clone(&stats),
        );
        Fixture {
            assembler,
            accumulator,
            frames,
            decoded,
            stats,
        }
    }

    fn push_value(acc: &SharedAccumulator, value: u64, width: u32, at: Instant) {
        let mut acc = lock(acc);
        for bit in value_to_bits(value, width) {
            acc.push(bit, at);
        }
    }

    #[test]
    fn test_frame_not_final_within_gap() {
        let mut fx = fixture(false, 4);
        let t0 = Instant::now();
        push_value(&fx.accumulator, 0xDEAD_BEEF, 32, t0);

        // Exactly the gap is not enough
        fx.assembler.tick(t0 + Duration::from_millis(30));
        assert!(fx.frames.try_recv().is_err());

        fx.assembler.tick(t0 + Duration::from_millis(31));
        assert_eq!(fx.frames.try_recv().unwrap(), 0xDEAD_BEEF);
        assert!(lock(&fx.accumulator).is_empty());
    }

    #[test]
    fn test_wrong_width_dropped() {
        let mut fx = fixture(false, 4);
        let t0 = Instant::now();
        push_value(&fx.accumulator, 0x1FF_FFFF, 26, t0);

        fx.assembler.tick(t0 + Duration::from_millis(50));

        assert!(fx.frames.try_recv().is_err());
        assert!(lock(&fx.accumulator).is_empty());
        let stats = fx.stats.snapshot();
        assert_eq!(stats.frames_dropped, 1);
        assert_eq!(stats.frames_accepted, 0);
    }

    #[test]
    fn test_variant_decoded_when_enabled() {
        let mut fx = fixture(true, 4);
        let t0 = Instant::now();
        // facility 0x12, card 0x3456, parity bits left clear
        push_value(&fx.accumulator, 0x12_3456 << 1, 26, t0);

        fx.assembler.tick(t0 + Duration::from_millis(50));

        assert!(fx.frames.try_recv().is_err());
        let card = fx.decoded.try_recv().unwrap();
        assert_eq!(card.facility_code, 0x12);
        assert_eq!(card.card_number, 0x3456);
        assert_eq!(fx.stats.snapshot().variants_decoded, 1);
    }

    #[test]
    fn test_full_queue_discards_newest() {
        let mut fx = fixture(false, 1);
        let t0 = Instant::now();

        push_value(&fx.accumulator, 1, 32, t0);
        fx.assembler.tick(t0 + Duration::from_millis(40));
        let t1 = t0 + Duration::from_millis(100);
        push_value(&fx.accumulator, 2, 32, t1);
        fx.assembler.tick(t1 + Duration::from_millis(40));

        assert_eq!(fx.frames.try_recv().unwrap(), 1);
        assert!(fx.frames.try_recv().is_err());
        let stats = fx.stats.snapshot();
        assert_eq!(stats.frames_accepted, 1);
        assert_eq!(stats.frames_overrun, 1);
    }

    #[test]
    fn test_overflow_counted() {
        let mut fx = fixture(false, 4);
        let t0 = Instant::now();
        {
            let mut acc = lock(&fx.accumulator);
            for _ in 0..(MAX_FRAME_BITS + 6) {
                acc.push(true, t0);
            }
        }

        fx.assembler.tick(t0 + Duration::from_millis(40));

        assert!(fx.frames.try_recv().is_err());
        let stats = fx.stats.snapshot();
        assert_eq!(stats.bits_overflowed, 6);
        assert_eq!(stats.frames_dropped, 1);
    }

    #[test]
    fn test_empty_accumulator_is_quiet() {
        let mut fx = fixture(false, 4);
        fx.assembler.tick(Instant::now());
        assert!(fx.frames.try_recv().is_err());
        assert_eq!(fx.stats.snapshot(), ReaderStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel() {
        let fx = fixture(false, 4);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(fx.assembler.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(5)).await;
        cancel.cancel();
        task.await.unwrap();
    }
}
