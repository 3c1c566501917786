//! Scripted fakes shared by the async unit tests.
//!
//! The fakes yield a few times inside every call so `futures::join!` can
//! interleave concurrent callers the way a browser event loop would.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::auth::notice::Notifier;
use crate::config::SessionConfig;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::net::types::Identity;
use crate::router::navigation::{Location, NavigationError, Navigator};
use crate::session::Session;
use crate::util::storage::{KeyValueStore, MemoryStore, StorageError};

/// Run `body` inside a `LocalSet` so detached local tasks can be spawned.
pub async fn local<F: Future>(body: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(body).await
}

pub async fn settle() {
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
}

#[must_use]
pub fn sample_identity() -> Identity {
    Identity {
        id: 42,
        email: "ada@example.test".into(),
        full_name: Some("Ada Lovelace".into()),
        created_at: "2024-05-01T12:00:00Z".into(),
    }
}

#[must_use]
pub fn identity_json() -> Value {
    json!({
        "id": 42,
        "email": "ada@example.test",
        "full_name": "Ada Lovelace",
        "created_at": "2024-05-01T12:00:00Z",
    })
}

pub fn json_response(status: u16, body: &Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status, body: body.to_string() })
}

pub fn text_response(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status, body: body.to_owned() })
}

// =============================================================================
// TRANSPORT
// =============================================================================

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError>>;

pub struct FakeTransport {
    responder: Responder,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new(responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + 'static) -> Rc<Self> {
        Rc::new(Self { responder: Box::new(responder), requests: RefCell::new(Vec::new()) })
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn calls_to(&self, suffix: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        settle().await;
        (self.responder)(&request)
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

#[derive(Default)]
pub struct FakeNavigator {
    current: RefCell<Option<String>>,
    replaced: RefCell<Vec<Location>>,
    fail: Cell<bool>,
}

impl FakeNavigator {
    pub fn at(route: &str) -> Rc<Self> {
        let nav = Self::default();
        *nav.current.borrow_mut() = Some(route.to_owned());
        Rc::new(nav)
    }

    pub fn failing(route: &str) -> Rc<Self> {
        let nav = Self::at(route);
        nav.fail.set(true);
        nav
    }

    pub fn replaced(&self) -> Vec<Location> {
        self.replaced.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Navigator for FakeNavigator {
    fn current_route_name(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    async fn replace(&self, target: Location) -> Result<(), NavigationError> {
        self.replaced.borrow_mut().push(target.clone());
        settle().await;
        if self.fail.get() {
            return Err(NavigationError { target: target.to_string(), reason: "aborted".into() });
        }
        *self.current.borrow_mut() = Some(target.name);
        Ok(())
    }
}

// =============================================================================
// NOTIFIER / STORE
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_owned());
    }
}

/// Memory store that counts credential removals.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    removes: Cell<usize>,
}

impl CountingStore {
    pub fn removes(&self) -> usize {
        self.removes.get()
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.removes.set(self.removes.get() + 1);
        self.inner.remove(key)
    }
}

// =============================================================================
// HARNESS
// =============================================================================

pub struct Harness {
    pub session: Session,
    pub transport: Rc<FakeTransport>,
    pub navigator: Rc<FakeNavigator>,
    pub notifier: Rc<RecordingNotifier>,
    pub store: Rc<CountingStore>,
}

impl Harness {
    /// A session on `route` whose server answers with `responder`.
    pub fn new(
        route: &str,
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + 'static,
    ) -> Self {
        let transport = FakeTransport::new(responder);
        let navigator = FakeNavigator::at(route);
        let notifier = Rc::new(RecordingNotifier::default());
        let store = Rc::new(CountingStore::default());
        let session = Session::builder(SessionConfig::default())
            .store(store.clone())
            .transport(transport.clone())
            .navigator(navigator.clone())
            .notifier(notifier.clone())
            .build()
            .unwrap();
        Self { session, transport, navigator, notifier, store }
    }

    pub fn with_token(self, token: &str) -> Self {
        self.store.set("token", token).unwrap();
        self
    }

    pub fn token(&self) -> Option<String> {
        self.store.get("token")
    }
}
