//! Shared client state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session state is read synchronously by any component; only the identity
//! verifier and the session terminator mutate it.

pub mod auth;
