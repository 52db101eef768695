//! Wiegand reader: line claim, frame watcher and consumer API.
//!
//! # Lifecycle
//!
//! 1. Create the reader with a [`LineConfig`] and an input backend
//! 2. `initialize()` claims the lines and spawns the frame watcher
//! 3. `get_next_frame()` yields finalized 32-bit frames or `None` on timeout
//! 4. `shutdown()` releases the lines and stops the watcher
//!
//! Initialize and shutdown are both idempotent, and a reader can be
//! initialized again after a shutdown.

use crate::assembler::{FrameAssembler, ReaderStats, StatsCounters};
use crate::capture::{EdgeCapture, SharedAccumulator, lock};
use crate::devices::AnyWiegandInput;
use crate::error::{HardwareError, Result};
use crate::traits::WiegandInput;
use facegate_core::LineConfig;
use facegate_core::constants::FRAME_QUEUE_CAPACITY;
use facegate_wiegand::DecodedCard;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const COMPONENT: &str = "Wiegand reader";

/// State that exists only between initialize and shutdown.
struct Session {
    frames: mpsc::Receiver<u32>,
    decoded: Option<mpsc::Receiver<DecodedCard>>,
    cancel: CancellationToken,
    watcher: JoinHandle<()>,
}

/// Receive side of a Wiegand interface.
///
/// # Examples
///
/// ```
/// use facegate_core::LineConfig;
/// use facegate_hardware::WiegandReader;
/// use facegate_hardware::devices::AnyWiegandInput;
/// use facegate_hardware::mock::MockWiegandInput;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> facegate_hardware::Result<()> {
///     let (input, _handle) = MockWiegandInput::new();
///     let mut reader = WiegandReader::new(
///         LineConfig::reader().build()?,
///         AnyWiegandInput::Mock(input),
///     );
///
///     // Using the reader before initialize() is a contract violation
///     let err = reader.get_next_frame(None).await.unwrap_err();
///     assert!(err.is_not_initialized());
///
///     reader.initialize().await?;
///     let frame = reader.get_next_frame(Some(Duration::from_millis(10))).await?;
///     assert_eq!(frame, None);
///
///     reader.shutdown().await
/// }
/// ```
pub struct WiegandReader {
    config: LineConfig,
    input: AnyWiegandInput,
    accumulator: SharedAccumulator,
    stats: Arc<StatsCounters>,
    session: Option<Session>,
}

impl WiegandReader {
    pub fn new(config: LineConfig, input: AnyWiegandInput) -> Self {
        Self {
            config,
            input,
            accumulator: SharedAccumulator::default(),
            stats: Arc::new(StatsCounters::default()),
            session: None,
        }
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Claim the input lines and start assembling frames.
    ///
    /// Calling it on an initialized reader is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the lines cannot be claimed. The
    /// reader stays uninitialized and nothing is left running.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        lock(&self.accumulator).clear();
        let capture = EdgeCapture::new(&self.config, Arc::clone(&self.accumulator));
        self.input.claim(&self.config, capture)?;

        let (frame_tx, frames) = mpsc::channel(FRAME_QUEUE_CAPACITY);
        let (decoded_tx, decoded) = if self.config.decode_variants() {
            let (tx, rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        let assembler = FrameAssembler::new(
            &self.config,
            Arc::clone(&self.accumulator),
            frame_tx,
            decoded_tx,
            Arc::clone(&self.stats),
        );
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(assembler.run(cancel.clone()));

        info!(
            chip = %self.config.chip_path(),
            d0 = self.config.d0_line(),
            d1 = self.config.d1_line(),
            gap_ms = self.config.gap_timeout().as_millis() as u64,
            frame_bits = self.config.frame_bits(),
            "Wiegand reader started"
        );
        self.session = Some(Session {
            frames,
            decoded,
            cancel,
            watcher,
        });
        Ok(())
    }

    /// Wait for the next frame of the configured width.
    ///
    /// `None` as the timeout waits until a frame arrives. A timeout is not
    /// an error: it yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotInitialized`] before `initialize()`.
    pub async fn get_next_frame(&mut self, timeout: Option<Duration>) -> Result<Option<u32>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| HardwareError::not_initialized(COMPONENT))?;

        Ok(recv_within(session.frames.recv(), timeout).await)
    }

    /// Wait for the next 26- or 34-bit frame decoded on the diagnostic path.
    ///
    /// Always yields `Ok(None)` unless the configuration enables
    /// `decode_variants`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::NotInitialized`] before `initialize()`.
    pub async fn get_next_decoded(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<DecodedCard>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| HardwareError::not_initialized(COMPONENT))?;

        match session.decoded.as_mut() {
            Some(decoded) => Ok(recv_within(decoded.recv(), timeout).await),
            None => Ok(None),
        }
    }

    /// Counters accumulated over the reader's lifetime.
    pub fn stats(&self) -> ReaderStats {
        self.stats.snapshot()
    }

    /// Release the lines and stop the frame watcher.
    ///
    /// No edge is captured after this returns. Frames still queued are
    /// discarded. Safe to call on a reader that was never initialized.
    ///
    /// Releasing a GPIO input joins its edge thread, which can block for up
    /// to one edge-wait period (10 ms). On a multi-thread runtime the release
    /// runs under `block_in_place`; on a current-thread runtime it blocks the
    /// executor for that long.
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        let released = if on_multi_thread_runtime() {
            tokio::task::block_in_place(|| self.input.release())
        } else {
            self.input.release()
        };
        if let Err(e) = &released {
            warn!(error = %e, "Failed to release Wiegand input lines");
        }

        session.cancel.cancel();
        if let Err(e) = session.watcher.await {
            warn!(error = %e, "Wiegand frame watcher ended abnormally");
        }
        lock(&self.accumulator).clear();

        info!("Wiegand reader stopped");
        released
    }
}

fn on_multi_thread_runtime() -> bool {
    tokio::runtime::Handle::try_current()
        .is_ok_and(|h| h.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread)
}

async fn recv_within<T>(
    recv: impl Future<Output = Option<T>>,
    timeout: Option<Duration>,
) -> Option<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, recv).await.ok().flatten(),
        None => recv.await,
    }
}

impl std::fmt::Debug for WiegandReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiegandReader")
            .field("config", &self.config)
            .field("input", &self.input)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Drop for WiegandReader {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = self.input.release() {
                warn!(error = %e, "Failed to release Wiegand input lines on drop");
            }
            session.cancel.cancel();
        }
    }
}
