//! Networking modules for the session API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` sends raw HTTP, `gateway` attaches the credential and
//! classifies responses, `accounts` wraps the account endpoints, and `types`
//! defines the wire schema.

pub mod accounts;
pub mod gateway;
pub mod transport;
pub mod types;
