//! Utility helpers shared across the session layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, clock,
//! theme) and the single-flight primitive from the session logic to improve
//! reuse and testability.

pub mod clock;
pub mod dark_mode;
pub mod single_flight;
pub mod storage;
