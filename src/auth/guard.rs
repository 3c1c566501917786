//! Navigation guard run before every route transition.
//!
//! DESIGN
//! ======
//! All checks that need no network (public flag, credential present, identity
//! cached) happen before the first `.await`. Only a protected route with a
//! credential but no cached identity reaches `Verifying`, and every
//! transition in that state awaits the same shared verification. Once it
//! settles the handle is dropped, so the next wave starts fresh.
//!
//! A failed verification (network error, server error) denies the
//! transition; it never surfaces as a navigation error. The verification
//! runs detached from the transitions awaiting it, so a superseded
//! transition that stops waiting does not abort it.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::rc::Rc;

use futures::FutureExt;

use super::verifier::IdentityVerifier;
use crate::net::types::Identity;
use crate::router::navigation::Location;
use crate::router::routes::RouteMatch;
use crate::state::auth::AuthContext;
use crate::util::single_flight::SingleFlight;
use crate::util::storage::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Public,
    Unprotected,
    RequiresToken,
    Verifying,
    ResolvedAllow,
    ResolvedDeny,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

pub struct NavigationGuard {
    tokens: TokenStore,
    auth: AuthContext,
    verifier: Rc<IdentityVerifier>,
    verification: SingleFlight<Option<Identity>>,
    login_route: String,
}

impl NavigationGuard {
    pub fn new(tokens: TokenStore, auth: AuthContext, verifier: Rc<IdentityVerifier>, login_route: impl Into<String>) -> Self {
        Self {
            tokens,
            auth,
            verifier,
            verification: SingleFlight::new(),
            login_route: login_route.into(),
        }
    }

    /// True while a shared verification is running.
    #[must_use]
    pub fn is_verifying(&self) -> bool {
        self.verification.is_in_flight()
    }

    /// Entry state for a transition to `to`.
    #[must_use]
    pub fn classify(&self, to: &RouteMatch) -> GuardState {
        if to.is_public() {
            GuardState::Public
        } else if !to.requires_auth() {
            GuardState::Unprotected
        } else {
            GuardState::RequiresToken
        }
    }

    /// Decide whether the transition to `to` may commit.
    pub async fn before_each(&self, to: &RouteMatch) -> GuardDecision {
        let state = self.classify(to);
        let resolved = match state {
            GuardState::Public | GuardState::Unprotected => GuardState::ResolvedAllow,
            _ => self.resolve_protected(to).await,
        };
        tracing::debug!(path = %to.path, ?state, ?resolved, "route guard");

        if resolved == GuardState::ResolvedAllow {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(Location::named(&self.login_route))
        }
    }

    async fn resolve_protected(&self, to: &RouteMatch) -> GuardState {
        if self.tokens.get().is_none() {
            return GuardState::ResolvedDeny;
        }
        if self.auth.is_authenticated() {
            return GuardState::ResolvedAllow;
        }

        tracing::debug!(path = %to.path, state = ?GuardState::Verifying, "checking auth");
        let verifier = Rc::clone(&self.verifier);
        let identity = self
            .verification
            .run(move || {
                async move {
                    match verifier.check_auth().await {
                        Ok(identity) => identity,
                        Err(err) => {
                            tracing::debug!(error = %err, "identity check failed");
                            None
                        }
                    }
                }
                .boxed_local()
            })
            .await
            .flatten();

        if identity.is_some() { GuardState::ResolvedAllow } else { GuardState::ResolvedDeny }
    }
}
