//! Mock line backends for testing and development.
//!
//! This module provides simulated Wiegand lines that can be driven and
//! inspected programmatically without a GPIO controller.

pub mod input;
pub mod output;

pub use input::{MockWiegandInput, MockWiegandInputHandle};
pub use output::{LineWrite, MockWiegandOutput, MockWiegandOutputHandle};
