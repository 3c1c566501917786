//! Session facade wiring storage, gateway, state and the auth components.
//!
//! ARCHITECTURE
//! ============
//! Construction order follows the dependency graph: the terminator needs only
//! storage, state and the navigator, so it is built first; the expiry handler
//! wraps it and is injected into the gateway as its single unauthorized hook;
//! the verifier and guard sit on top of the gateway.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::auth::guard::{GuardDecision, NavigationGuard};
use crate::auth::notice::{ExpiryNotice, Notifier, SessionExpiryHandler, TracingNotifier};
use crate::auth::terminator::{EndReason, SessionTerminator};
use crate::auth::verifier::IdentityVerifier;
use crate::config::SessionConfig;
use crate::error::{RequestError, SessionError};
use crate::net::gateway::{Gateway, RequestOptions};
use crate::net::transport::Transport;
use crate::net::types::{Identity, RegisterResponse};
use crate::router::navigation::{MemoryNavigator, Navigator};
use crate::router::routes::{RouteMatch, RouteTable, SidebarItem};
use crate::state::auth::AuthContext;
use crate::util::dark_mode::ThemeStore;
use crate::util::storage::{KeyValueStore, MemoryStore, TokenStore};

pub struct SessionBuilder {
    config: SessionConfig,
    store: Option<Rc<dyn KeyValueStore>>,
    transport: Option<Rc<dyn Transport>>,
    navigator: Option<Rc<dyn Navigator>>,
    notifier: Option<Rc<dyn Notifier>>,
    routes: Option<RouteTable>,
}

impl SessionBuilder {
    #[must_use]
    pub fn store(mut self, store: Rc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Rc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Rc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Assemble the session. Unset collaborators get defaults: in-memory
    /// store and navigator, tracing notices, and the platform transport.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no transport was given and none can be built.
    pub fn build(self) -> Result<Session, SessionError> {
        let config = self.config;
        let store = self.store.unwrap_or_else(|| Rc::new(MemoryStore::new()));
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&config)?,
        };
        let navigator = self
            .navigator
            .unwrap_or_else(|| Rc::new(MemoryNavigator::new()));
        let notifier = self.notifier.unwrap_or_else(|| Rc::new(TracingNotifier));

        let tokens = TokenStore::new(Rc::clone(&store), config.token_key.clone());
        let auth = AuthContext::new();

        let terminator = Rc::new(SessionTerminator::new(
            tokens.clone(),
            auth.clone(),
            Rc::clone(&navigator),
            config.login_route.clone(),
        ));
        let expiry = Rc::new(SessionExpiryHandler::new(
            Rc::clone(&navigator),
            config.login_route.clone(),
            ExpiryNotice::new(config.notice_window),
            notifier,
            Rc::clone(&terminator),
        ));
        let gateway = Rc::new(Gateway::new(&config, transport, tokens.clone()).with_unauthorized_hook(expiry));
        let verifier = Rc::new(IdentityVerifier::new(Rc::clone(&gateway), tokens.clone(), auth.clone()));
        let guard = NavigationGuard::new(tokens.clone(), auth.clone(), Rc::clone(&verifier), config.login_route.clone());
        let theme = ThemeStore::new(store, config.theme_key.clone());

        Ok(Session {
            tokens,
            auth,
            gateway,
            terminator,
            verifier,
            guard,
            theme,
            routes: self.routes.unwrap_or_default(),
            config,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_transport(config: &SessionConfig) -> Result<Rc<dyn Transport>, SessionError> {
    let transport = crate::net::transport::ReqwestTransport::new(config.request_timeout)
        .map_err(|e| SessionError::Config(e.to_string()))?;
    Ok(Rc::new(transport))
}

#[cfg(all(target_arch = "wasm32", feature = "hydrate"))]
#[allow(clippy::unnecessary_wraps)]
fn default_transport(_config: &SessionConfig) -> Result<Rc<dyn Transport>, SessionError> {
    Ok(Rc::new(crate::net::transport::GlooTransport))
}

pub struct Session {
    config: SessionConfig,
    tokens: TokenStore,
    auth: AuthContext,
    gateway: Rc<Gateway>,
    terminator: Rc<SessionTerminator>,
    verifier: Rc<IdentityVerifier>,
    guard: NavigationGuard,
    theme: ThemeStore,
    routes: RouteTable,
}

impl Session {
    #[must_use]
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder { config, store: None, transport: None, navigator: None, notifier: None, routes: None }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    #[must_use]
    pub fn current_user(&self) -> Option<Identity> {
        self.auth.current_user()
    }

    #[must_use]
    pub fn is_checking(&self) -> bool {
        self.auth.is_checking()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.tokens.get().is_some()
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn sidebar(&self) -> Vec<SidebarItem> {
        self.routes.sidebar()
    }

    /// # Errors
    ///
    /// See [`IdentityVerifier::login`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        self.verifier.login(email, password).await
    }

    /// # Errors
    ///
    /// See [`IdentityVerifier::register`].
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<RegisterResponse, RequestError> {
        self.verifier.register(email, password, full_name).await
    }

    /// # Errors
    ///
    /// See [`IdentityVerifier::check_auth`].
    pub async fn check_auth(&self) -> Result<Option<Identity>, RequestError> {
        self.verifier.check_auth().await
    }

    pub async fn logout(&self) {
        self.terminator.end_session(EndReason::Logout).await;
    }

    pub async fn end_session(&self, reason: EndReason) {
        self.terminator.end_session(reason).await;
    }

    /// Natively this must run inside a `tokio::task::LocalSet`: a needed
    /// identity check is spawned as a local task.
    pub async fn before_each(&self, to: &RouteMatch) -> GuardDecision {
        self.guard.before_each(to).await
    }

    /// Resolve `path` against the route table and run the guard on it.
    pub async fn guard_path(&self, path: &str) -> GuardDecision {
        let matched = self.routes.resolve(path);
        self.guard.before_each(&matched).await
    }

    /// Authenticated request through the shared gateway.
    ///
    /// # Errors
    ///
    /// See [`Gateway::request`].
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, RequestError> {
        self.gateway.request(path, options).await
    }
}
