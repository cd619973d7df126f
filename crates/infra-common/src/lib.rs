//! Common infrastructure components for the LinguaCall stack
//!
//! This crate provides the shared plumbing used by the relay and call
//! crates: logging setup built on `tracing`, an injectable clock so that
//! time-dependent logic (idle eviction, call duration) can be tested with
//! a simulated time source, and the infrastructure error type.

pub mod errors;
pub mod logging;
pub mod time;

pub use errors::{Error, Result};
pub use logging::{setup_logging, LoggingConfig};
pub use time::{Clock, ManualClock, SystemClock};
