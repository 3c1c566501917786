//! Session lifecycle: identity checks, termination and the route guard.
//!
//! ARCHITECTURE
//! ============
//! `verifier` turns "who am I" into session state, `terminator` runs the
//! idempotent clear-and-redirect sequence, `notice` connects the gateway's
//! 401 hook to the terminator, and `guard` decides each route transition,
//! sharing one in-flight verification across concurrent transitions.

pub mod guard;
pub mod notice;
pub mod terminator;
pub mod verifier;
