//! Linux GPIO character device backend.
//!
//! Lines are requested through `/dev/gpiochipN` with the `gpiocdev` crate.
//! The input side runs a dedicated thread that waits for edge events and
//! forwards them to the capture sink; the output side sets line values
//! directly from the caller's thread.

use crate::capture::EdgeCapture;
use crate::error::{HardwareError, Result};
use crate::traits::{WiegandInput, WiegandOutput};
use facegate_core::{ActiveEdge, Level, LineBias, LineConfig, Rail};
use gpiocdev::Request;
use gpiocdev::line::{Bias, EdgeDetection, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Upper bound on how long the edge thread waits before checking for stop.
const EDGE_WAIT: Duration = Duration::from_millis(10);

fn bias(bias: LineBias) -> Bias {
    match bias {
        LineBias::PullUp => Bias::PullUp,
        LineBias::PullDown => Bias::PullDown,
        LineBias::Disabled => Bias::Disabled,
    }
}

fn edge(edge: ActiveEdge) -> EdgeDetection {
    match edge {
        ActiveEdge::Falling => EdgeDetection::FallingEdge,
        ActiveEdge::Rising => EdgeDetection::RisingEdge,
    }
}

fn value(level: Level) -> Value {
    if level.is_high() {
        Value::Active
    } else {
        Value::Inactive
    }
}

fn claim_failed(config: &LineConfig, err: impl std::fmt::Display) -> HardwareError {
    HardwareError::initialization_failed(format!(
        "{} lines {}/{}: {err}",
        config.chip_path(),
        config.d0_line(),
        config.d1_line()
    ))
}

struct EdgeThread {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Wiegand input on two GPIO lines with kernel edge detection.
#[derive(Default)]
pub struct GpioWiegandInput {
    request: Option<Arc<Request>>,
    edges: Option<EdgeThread>,
}

impl GpioWiegandInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn run_edges(request: Arc<Request>, capture: EdgeCapture, stop: Arc<AtomicBool>) {
        while !stop.load(Ordering::Acquire) {
            match request.wait_edge_event(EDGE_WAIT) {
                Ok(true) => match request.read_edge_event() {
                    Ok(event) => capture.on_edge(event.offset, Instant::now()),
                    Err(e) => warn!(error = %e, "Failed to read Wiegand edge event"),
                },
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Wiegand edge wait failed, stopping edge thread");
                    break;
                }
            }
        }
    }
}

impl std::fmt::Debug for GpioWiegandInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioWiegandInput")
            .field("claimed", &self.request.is_some())
            .finish()
    }
}

impl WiegandInput for GpioWiegandInput {
    fn claim(&mut self, config: &LineConfig, capture: EdgeCapture) -> Result<()> {
        if self.request.is_some() {
            return Ok(());
        }

        let request = Request::builder()
            .on_chip(config.chip_path())
            .with_consumer(config.consumer())
            .with_lines(&capture.lines())
            .as_input()
            .with_bias(bias(config.bias()))
            .with_edge_detection(edge(config.active_edge()))
            .request()
            .map(Arc::new)
            .map_err(|e| claim_failed(config, e))?;

        let stop = Arc::new(AtomicBool::new(false));
        let handle = std::thread::Builder::new()
            .name("wiegand-edges".to_string())
            .spawn({
                let request = Arc::clone(&request);
                let stop = Arc::clone(&stop);
                move || Self::run_edges(request, capture, stop)
            })?;

        info!(
            chip = %config.chip_path(),
            d0 = config.d0_line(),
            d1 = config.d1_line(),
            "Wiegand input lines claimed"
        );
        self.request = Some(request);
        self.edges = Some(EdgeThread { stop, handle });
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if let Some(edges) = self.edges.take() {
            edges.stop.store(true, Ordering::Release);
            if edges.handle.join().is_err() {
                warn!("Wiegand edge thread panicked");
            }
        }
        if self.request.take().is_some() {
            info!("Wiegand input lines released");
        }
        Ok(())
    }

    fn is_claimed(&self) -> bool {
        self.request.is_some()
    }
}

impl Drop for GpioWiegandInput {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Wiegand output on two GPIO lines.
#[derive(Default)]
pub struct GpioWiegandOutput {
    request: Option<Request>,
    lines: [u32; 2],
}

impl GpioWiegandOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for GpioWiegandOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioWiegandOutput")
            .field("claimed", &self.request.is_some())
            .field("lines", &self.lines)
            .finish()
    }
}

impl WiegandOutput for GpioWiegandOutput {
    fn claim(&mut self, config: &LineConfig) -> Result<()> {
        if self.request.is_some() {
            return Ok(());
        }

        let lines = [config.d0_line(), config.d1_line()];
        let idle = config.polarity().idle_level();
        let request = Request::builder()
            .on_chip(config.chip_path())
            .with_consumer(config.consumer())
            .with_lines(&lines)
            .as_output(value(idle))
            .request()
            .map_err(|e| claim_failed(config, e))?;

        info!(
            chip = %config.chip_path(),
            d0 = lines[0],
            d1 = lines[1],
            ?idle,
            "Wiegand output lines claimed"
        );
        self.request = Some(request);
        self.lines = lines;
        Ok(())
    }

    fn drive(&mut self, rail: Rail, level: Level) -> Result<()> {
        let request = self
            .request
            .as_ref()
            .ok_or_else(|| HardwareError::communication("Wiegand output lines not claimed"))?;
        let line = match rail {
            Rail::Zero => self.lines[0],
            Rail::One => self.lines[1],
        };
        request
            .set_value(line, value(level))
            .map_err(|e| HardwareError::communication(format!("line {line}: {e}")))?;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.request.take().is_some() {
            debug!(lines = ?self.lines, "Wiegand output lines released");
        }
        Ok(())
    }

    fn is_claimed(&self) -> bool {
        self.request.is_some()
    }
}
