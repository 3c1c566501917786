//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and user-aware code read this synchronously to decide whether
//! a network check is needed at all. `AuthContext` is a cheap clonable handle
//! over one shared record; pass it to whoever needs it instead of reaching
//! for a global.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::net::types::Identity;

/// Current identity plus whether an identity check is running.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<Identity>,
    pub checking: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    inner: Rc<RefCell<AuthState>>,
}

impl AuthContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.borrow().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<Identity> {
        self.inner.borrow().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.borrow().user.is_some()
    }

    #[must_use]
    pub fn is_checking(&self) -> bool {
        self.inner.borrow().checking
    }

    pub fn set_user(&self, user: Identity) {
        self.inner.borrow_mut().user = Some(user);
    }

    pub fn clear_user(&self) {
        self.inner.borrow_mut().user = None;
    }

    /// Clear the identity and the checking flag together.
    pub fn reset(&self) {
        *self.inner.borrow_mut() = AuthState::default();
    }

    /// Mark a check as running until the returned guard drops.
    #[must_use]
    pub fn begin_check(&self) -> CheckingGuard {
        self.inner.borrow_mut().checking = true;
        CheckingGuard { ctx: self.clone() }
    }
}

/// Resets `checking` on drop, on every exit path.
pub struct CheckingGuard {
    ctx: AuthContext,
}

impl Drop for CheckingGuard {
    fn drop(&mut self) {
        self.ctx.inner.borrow_mut().checking = false;
    }
}
