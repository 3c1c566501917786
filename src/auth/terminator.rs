//! Idempotent session termination (logout and expiry).
//!
//! DESIGN
//! ======
//! The first caller takes the termination lock before its first `.await` and
//! owns the whole sequence; callers arriving while it runs return at once.
//! The lock is a drop guard, so it is released after the redirect settles
//! whether navigation succeeded or failed.

#[cfg(test)]
#[path = "terminator_test.rs"]
mod terminator_test;

use std::cell::Cell;
use std::rc::Rc;

use crate::config::EXPIRED_QUERY;
use crate::router::navigation::{Location, Navigator};
use crate::state::auth::AuthContext;
use crate::util::storage::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Expired,
    Logout,
}

pub struct SessionTerminator {
    tokens: TokenStore,
    auth: AuthContext,
    navigator: Rc<dyn Navigator>,
    login_route: String,
    ending: Cell<bool>,
}

impl SessionTerminator {
    pub fn new(tokens: TokenStore, auth: AuthContext, navigator: Rc<dyn Navigator>, login_route: impl Into<String>) -> Self {
        Self { tokens, auth, navigator, login_route: login_route.into(), ending: Cell::new(false) }
    }

    /// True while a termination owns the lock.
    #[must_use]
    pub fn is_ending(&self) -> bool {
        self.ending.get()
    }

    /// Clear the credential and identity, then redirect to the login route.
    pub async fn end_session(&self, reason: EndReason) {
        let Some(_lock) = TerminationLock::acquire(&self.ending) else {
            tracing::debug!(?reason, "session termination already in progress");
            return;
        };

        if let Err(err) = self.tokens.clear() {
            tracing::warn!(error = %err, "failed to clear stored credential");
        }
        self.auth.reset();

        if self.navigator.current_route_name().as_deref() == Some(self.login_route.as_str()) {
            tracing::info!(?reason, "session ended on login page");
            return;
        }

        let mut target = Location::named(&self.login_route);
        if reason == EndReason::Expired {
            target = target.with_query(EXPIRED_QUERY.0, EXPIRED_QUERY.1);
        }
        let destination = target.to_string();
        match self.navigator.replace(target).await {
            Ok(()) => tracing::info!(?reason, %destination, "session ended"),
            Err(err) => tracing::warn!(?reason, error = %err, "session ended but redirect failed"),
        }
    }
}

struct TerminationLock<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> TerminationLock<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for TerminationLock<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
