#![forbid(unsafe_code)]

//! Test harness for Tether.
//!
//! - [`FakeControl`]: in-memory text inputs, text areas, selects, checkboxes
//!   and spans that honour the [`Control`](tether_runtime::Control) contract.
//! - [`Form`]: builds a control set and a session over it.
//! - [`fixtures`]: the sample character model used across the test suites.
//! - [`LogCapture`]: collects `tracing` output emitted during a closure.
//! - [`strategies`]: `proptest` strategies for paths and scalar values.

pub mod controls;
pub mod fixtures;
pub mod form;
pub mod logging;
pub mod strategies;

pub use controls::{FakeControl, single};
pub use form::Form;
pub use logging::{CapturedLogs, LogCapture};
