use std::cell::Cell;

use serde_json::json;

use super::*;
use crate::config::SessionConfig;
use crate::net::gateway::Gateway;
use crate::net::transport::{HttpRequest, HttpResponse, TransportError};
use crate::router::routes::RouteTable;
use crate::test_helpers::{FakeTransport, identity_json, json_response, local, sample_identity, text_response};
use crate::util::storage::MemoryStore;

const ME: &str = "/accounts/me";

struct Fixture {
    guard: NavigationGuard,
    transport: Rc<FakeTransport>,
    auth: AuthContext,
    routes: RouteTable,
}

fn fixture(
    token: Option<&str>,
    responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + 'static,
) -> Fixture {
    let transport = FakeTransport::new(responder);
    let tokens = TokenStore::new(Rc::new(MemoryStore::new()), "token");
    if let Some(token) = token {
        tokens.set(token).unwrap();
    }
    let auth = AuthContext::new();
    let gateway = Rc::new(Gateway::new(&SessionConfig::default(), transport.clone(), tokens.clone()));
    let verifier = Rc::new(IdentityVerifier::new(gateway, tokens.clone(), auth.clone()));
    let guard = NavigationGuard::new(tokens, auth.clone(), verifier, "login");
    Fixture { guard, transport, auth, routes: RouteTable::default() }
}

fn deny() -> GuardDecision {
    GuardDecision::Redirect(Location::named("login"))
}

// =============================================================================
// classification
// =============================================================================

#[test]
fn classify_by_route_meta() {
    let f = fixture(None, |_| json_response(200, &identity_json()));
    assert_eq!(f.guard.classify(&f.routes.resolve("/login")), GuardState::Public);
    assert_eq!(f.guard.classify(&f.routes.resolve("/nowhere")), GuardState::Unprotected);
    assert_eq!(f.guard.classify(&f.routes.resolve("/dashboard")), GuardState::RequiresToken);
    assert_eq!(f.guard.classify(&f.routes.resolve("/")), GuardState::RequiresToken);
}

// =============================================================================
// decisions without network
// =============================================================================

#[tokio::test]
async fn public_route_is_allowed_without_request() {
    let f = fixture(None, |_| json_response(200, &identity_json()));
    assert_eq!(f.guard.before_each(&f.routes.resolve("/register")).await, GuardDecision::Allow);
    assert_eq!(f.transport.calls(), 0);
}

#[tokio::test]
async fn unprotected_route_is_allowed_without_token() {
    let f = fixture(None, |_| json_response(200, &identity_json()));
    assert_eq!(f.guard.before_each(&f.routes.resolve("/nowhere")).await, GuardDecision::Allow);
    assert_eq!(f.transport.calls(), 0);
}

#[tokio::test]
async fn protected_route_without_token_redirects() {
    let f = fixture(None, |_| json_response(200, &identity_json()));
    assert_eq!(f.guard.before_each(&f.routes.resolve("/stocks")).await, deny());
    assert_eq!(f.transport.calls(), 0);
}

#[tokio::test]
async fn cached_identity_is_allowed_without_request() {
    let f = fixture(Some("t1"), |_| json_response(200, &identity_json()));
    f.auth.set_user(sample_identity());

    assert_eq!(f.guard.before_each(&f.routes.resolve("/dashboard")).await, GuardDecision::Allow);
    assert_eq!(f.transport.calls(), 0);
}

// =============================================================================
// shared verification
// =============================================================================

#[tokio::test]
async fn concurrent_transitions_share_one_check() {
    local(async {
        let f = fixture(Some("t1"), |_| json_response(200, &identity_json()));
        let dashboard = f.routes.resolve("/dashboard");
        let stocks = f.routes.resolve("/stocks");
        let settings = f.routes.resolve("/settings");

        let (a, b, c, d) = futures::join!(
            f.guard.before_each(&dashboard),
            f.guard.before_each(&stocks),
            f.guard.before_each(&settings),
            f.guard.before_each(&dashboard),
        );

        assert_eq!(
            [a, b, c, d],
            [GuardDecision::Allow, GuardDecision::Allow, GuardDecision::Allow, GuardDecision::Allow]
        );
        assert_eq!(f.transport.calls_to(ME), 1);
        assert_eq!(f.auth.current_user(), Some(sample_identity()));
        assert!(!f.guard.is_verifying());
    })
    .await;
}

#[tokio::test]
async fn concurrent_transitions_share_one_rejection() {
    local(async {
        let f = fixture(Some("stale"), |_| json_response(401, &json!({"detail": "Invalid token"})));
        let dashboard = f.routes.resolve("/dashboard");

        let (a, b, c) = futures::join!(
            f.guard.before_each(&dashboard),
            f.guard.before_each(&dashboard),
            f.guard.before_each(&dashboard),
        );

        assert_eq!([a, b, c], [deny(), deny(), deny()]);
        assert_eq!(f.transport.calls_to(ME), 1);
        assert_eq!(f.auth.current_user(), None);
    })
    .await;
}

#[tokio::test]
async fn verification_is_visible_while_in_flight() {
    local(async {
        let f = fixture(Some("t1"), |_| json_response(200, &identity_json()));
        let dashboard = f.routes.resolve("/dashboard");
        let observed = Cell::new(false);

        futures::join!(f.guard.before_each(&dashboard), async {
            tokio::task::yield_now().await;
            observed.set(f.guard.is_verifying());
        });

        assert!(observed.get());
        assert!(!f.guard.is_verifying());
    })
    .await;
}

#[tokio::test]
async fn superseded_transition_still_completes_verification() {
    local(async {
        let f = fixture(Some("t1"), |_| json_response(200, &identity_json()));
        let dashboard = f.routes.resolve("/dashboard");

        {
            let transition = f.guard.before_each(&dashboard);
            futures::pin_mut!(transition);
            assert!(futures::poll!(transition.as_mut()).is_pending());
        }
        assert!(f.guard.is_verifying());

        for _ in 0..50 {
            tokio::task::yield_now().await;
        }

        assert_eq!(f.transport.calls_to(ME), 1);
        assert_eq!(f.auth.current_user(), Some(sample_identity()));
        assert!(!f.auth.is_checking());
        assert!(!f.guard.is_verifying());

        // The stored identity now lets the next transition through directly.
        assert_eq!(f.guard.before_each(&dashboard).await, GuardDecision::Allow);
        assert_eq!(f.transport.calls_to(ME), 1);
    })
    .await;
}

#[tokio::test]
async fn failed_check_denies_instead_of_erroring() {
    local(async {
        let f = fixture(Some("t1"), |_| text_response(500, "boom"));

        let decision = f.guard.before_each(&f.routes.resolve("/stocks")).await;

        assert_eq!(decision, deny());
        assert!(!f.guard.is_verifying());
        assert!(!f.auth.is_checking());
    })
    .await;
}

#[tokio::test]
async fn settled_check_is_not_reused_by_next_wave() {
    local(async {
        let attempts = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&attempts);
        let f = fixture(Some("t1"), move |_| {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                text_response(503, "starting up")
            } else {
                json_response(200, &identity_json())
            }
        });
        let dashboard = f.routes.resolve("/dashboard");

        let (a, b) = futures::join!(f.guard.before_each(&dashboard), f.guard.before_each(&dashboard));
        assert_eq!([a, b], [deny(), deny()]);

        let (c, d) = futures::join!(f.guard.before_each(&dashboard), f.guard.before_each(&dashboard));
        assert_eq!([c, d], [GuardDecision::Allow, GuardDecision::Allow]);

        assert_eq!(attempts.get(), 2);
        assert_eq!(f.transport.calls_to(ME), 2);
    })
    .await;
}
