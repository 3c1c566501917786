//! Client-side session layer for a browser application.
//!
//! SYSTEM CONTEXT
//! ==============
//! Page loads, background requests and route changes all touch the same
//! credential and "current user" record. This crate keeps those call sites
//! consistent: `net` attaches the credential and classifies every response,
//! `auth` owns identity checks, session termination and the route guard,
//! `state` holds the shared session record, and `router` describes the
//! application's routes.
//!
//! DESIGN
//! ======
//! Everything runs on one cooperative executor (a browser event loop, or a
//! current-thread tokio runtime natively). Shared handles are `Rc`-based and
//! futures are `!Send`; correctness relies on flags set before the first
//! `.await` and released by drop guards on every exit path.

#[cfg(all(target_arch = "wasm32", not(feature = "hydrate")))]
compile_error!("wasm32 builds need the `hydrate` feature");

pub mod auth;
pub mod config;
pub mod error;
pub mod net;
pub mod router;
pub mod session;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::SessionConfig;
pub use error::{RequestError, SessionError};
pub use net::types::Identity;
pub use session::{Session, SessionBuilder};

/// Install the browser logging sink and panic hook.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_browser_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
