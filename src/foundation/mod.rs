//! Foundation layer: math, timing, and logging
//!
//! Pure value types and utilities with no dependency on the rest of the
//! engine.

pub mod logging;
pub mod math;
pub mod time;
