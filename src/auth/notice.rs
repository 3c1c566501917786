//! Expiry notice and the gateway's unauthorized hook.
//!
//! Concurrent 401s arrive in bursts (several background requests fail at
//! once). The notice is debounced on elapsed time alone: any 401 within the
//! window of the last shown notice is silent, regardless of which request
//! produced it. Termination itself is idempotent, so every 401 still asks for
//! it.

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::terminator::{EndReason, SessionTerminator};
use crate::net::gateway::UnauthorizedHook;
use crate::router::navigation::Navigator;
use crate::util::clock;

pub const EXPIRED_MESSAGE: &str = "Session expired, please sign in again";

/// User-visible notices (toast, banner, stderr).
pub trait Notifier {
    fn warn(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        tracing::warn!(notice = message, "user notice");
    }
}

/// Remembers when the last expiry notice was shown.
#[derive(Debug)]
pub struct ExpiryNotice {
    window_ms: u64,
    last_shown_ms: Cell<Option<u64>>,
}

impl ExpiryNotice {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(window: Duration) -> Self {
        Self { window_ms: window.as_millis() as u64, last_shown_ms: Cell::new(None) }
    }

    #[must_use]
    pub fn should_show(&self) -> bool {
        self.should_show_at(clock::now_ms())
    }

    /// Internal: debounce decision with an explicit timestamp (for testing).
    /// Records `now_ms` when the notice is shown.
    pub(crate) fn should_show_at(&self, now_ms: u64) -> bool {
        if let Some(last) = self.last_shown_ms.get() {
            if now_ms.saturating_sub(last) <= self.window_ms {
                return false;
            }
        }
        self.last_shown_ms.set(Some(now_ms));
        true
    }
}

/// Shows the debounced notice and ends the session on every 401, unless the
/// user is already on the login page.
pub struct SessionExpiryHandler {
    navigator: Rc<dyn Navigator>,
    login_route: String,
    notice: ExpiryNotice,
    notifier: Rc<dyn Notifier>,
    terminator: Rc<SessionTerminator>,
}

impl SessionExpiryHandler {
    pub fn new(
        navigator: Rc<dyn Navigator>,
        login_route: impl Into<String>,
        notice: ExpiryNotice,
        notifier: Rc<dyn Notifier>,
        terminator: Rc<SessionTerminator>,
    ) -> Self {
        Self { navigator, login_route: login_route.into(), notice, notifier, terminator }
    }
}

#[async_trait(?Send)]
impl UnauthorizedHook for SessionExpiryHandler {
    async fn on_unauthorized(&self, status: u16, _body: &Value) {
        if self.navigator.current_route_name().as_deref() == Some(self.login_route.as_str()) {
            return;
        }
        if self.notice.should_show() {
            self.notifier.warn(EXPIRED_MESSAGE);
        }
        tracing::debug!(status, "ending expired session");
        self.terminator.end_session(EndReason::Expired).await;
    }
}
