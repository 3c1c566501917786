//! Identity verification and login.
//!
//! ERROR HANDLING
//! ==============
//! A 401 from the identity endpoint is the ordinary "not signed in" answer
//! and resolves to `None`. Every other failure propagates unchanged so the
//! caller can tell "signed out" apart from "server unreachable".

#[cfg(test)]
#[path = "verifier_test.rs"]
mod verifier_test;

use std::rc::Rc;

use crate::error::{RequestError, SessionError};
use crate::net::accounts;
use crate::net::gateway::Gateway;
use crate::net::types::{Identity, RegisterRequest, RegisterResponse};
use crate::state::auth::AuthContext;
use crate::util::storage::TokenStore;

pub struct IdentityVerifier {
    gateway: Rc<Gateway>,
    tokens: TokenStore,
    auth: AuthContext,
}

impl IdentityVerifier {
    pub fn new(gateway: Rc<Gateway>, tokens: TokenStore, auth: AuthContext) -> Self {
        Self { gateway, tokens, auth }
    }

    /// Confirm the stored credential with the server.
    ///
    /// Without a credential this resolves to `None` immediately, with no
    /// request and without touching the checking flag.
    ///
    /// # Errors
    ///
    /// Returns any failure other than unauthorized.
    pub async fn check_auth(&self) -> Result<Option<Identity>, RequestError> {
        if self.tokens.get().is_none() {
            self.auth.clear_user();
            return Ok(None);
        }

        let _checking = self.auth.begin_check();
        match self.fetch_identity().await {
            Ok(identity) => Ok(Some(identity)),
            Err(err) if err.is_unauthorized() => {
                tracing::debug!("credential rejected; no current user");
                self.auth.clear_user();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch the identity and make it current. No deduplication.
    ///
    /// # Errors
    ///
    /// Returns the gateway's classified failure.
    pub async fn fetch_identity(&self) -> Result<Identity, RequestError> {
        let identity = accounts::me(&self.gateway).await?;
        tracing::debug!(user_id = identity.id, "identity confirmed");
        self.auth.set_user(identity.clone());
        Ok(identity)
    }

    /// Sign in, persist the returned token, and load the identity.
    ///
    /// # Errors
    ///
    /// Returns the login or identity failure, or a storage error if the
    /// token could not be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let response = accounts::login(&self.gateway, email, password).await?;
        self.tokens.set(&response.into_token())?;
        let identity = self.fetch_identity().await?;
        tracing::info!(user_id = identity.id, "signed in");
        Ok(identity)
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns the gateway's classified failure.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<RegisterResponse, RequestError> {
        accounts::register(&self.gateway, &RegisterRequest { email, password, full_name }).await
    }
}
