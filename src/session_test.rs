use serde_json::{Value, json};

use super::*;
use crate::auth::notice::EXPIRED_MESSAGE;
use crate::net::transport::{HttpRequest, HttpResponse, TransportError};
use crate::router::navigation::Location;
use crate::test_helpers::{Harness, identity_json, json_response, local, sample_identity};
use crate::util::dark_mode::ThemePreference;
use crate::util::storage::KeyValueStore;

fn api(request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    if request.url.ends_with("/accounts/login") {
        json_response(200, &json!({"access_token": "fresh", "token_type": "bearer"}))
    } else if request.header("authorization") == Some("Bearer fresh") {
        if request.url.ends_with("/accounts/me") {
            json_response(200, &identity_json())
        } else {
            json_response(200, &json!([{"symbol": "ACME"}]))
        }
    } else {
        json_response(401, &json!({"detail": "Not authenticated"}))
    }
}

// =============================================================================
// login / logout
// =============================================================================

#[tokio::test]
async fn login_persists_token_and_identity() {
    let h = Harness::new("login", api);

    let identity = h.session.login("ada@example.test", "pw").await.unwrap();

    assert_eq!(identity, sample_identity());
    assert_eq!(h.token().as_deref(), Some("fresh"));
    assert!(h.session.has_token());
    assert_eq!(h.session.current_user(), Some(sample_identity()));
    assert!(h.navigator.replaced().is_empty());
}

#[tokio::test]
async fn failed_login_on_login_page_is_quiet() {
    let h = Harness::new("login", |_| json_response(401, &json!({"detail": "Invalid credentials"})));

    let err = h.session.login("ada@example.test", "wrong").await.unwrap_err();

    assert!(matches!(err, SessionError::Request(RequestError::Unauthorized { status: 401, .. })));
    assert!(h.notifier.messages().is_empty());
    assert!(h.navigator.replaced().is_empty());
    assert_eq!(h.token(), None);
}

#[tokio::test]
async fn logout_clears_state_and_redirects_plainly() {
    let h = Harness::new("dashboard", api).with_token("fresh");
    h.session.check_auth().await.unwrap();
    assert!(h.session.auth().is_authenticated());

    h.session.logout().await;

    assert_eq!(h.token(), None);
    assert_eq!(h.session.current_user(), None);
    assert_eq!(h.navigator.replaced(), vec![Location::named("login")]);
    assert!(h.notifier.messages().is_empty());
}

// =============================================================================
// expiry
// =============================================================================

#[tokio::test]
async fn unauthorized_request_ends_session_once() {
    let h = Harness::new("stocks", api).with_token("revoked");

    let err = h.session.request::<Value>("stocks", RequestOptions::get()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.token(), None);
    assert_eq!(h.notifier.messages(), vec![EXPIRED_MESSAGE.to_owned()]);
    let replaced = h.navigator.replaced();
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].to_string(), "login?r=expired");
}

#[tokio::test]
async fn termination_completes_before_error_reaches_caller() {
    let h = Harness::new("stocks", api);

    let result = h.session.request::<Value>("/api/v1/stocks", RequestOptions::get()).await;

    assert!(result.is_err());
    assert!(!h.session.has_token());
    assert_eq!(h.navigator.replaced().len(), 1);
}

#[tokio::test]
async fn burst_of_unauthorized_requests_terminates_once() {
    let h = Harness::new("dashboard", api).with_token("revoked");

    let (a, b, c) = futures::join!(
        h.session.request::<Value>("stocks", RequestOptions::get()),
        h.session.request::<Value>("accounts/me", RequestOptions::get()),
        h.session.request::<Value>("/stocks", RequestOptions::get()),
    );

    assert!(a.is_err() && b.is_err() && c.is_err());
    assert_eq!(h.transport.calls(), 3);
    assert_eq!(h.store.removes(), 1);
    assert_eq!(h.notifier.messages().len(), 1);
    assert_eq!(h.navigator.replaced().len(), 1);
}

#[tokio::test]
async fn authorized_request_returns_body() {
    let h = Harness::new("stocks", api).with_token("fresh");

    let body: Value = h.session.request("stocks", RequestOptions::get()).await.unwrap();

    assert_eq!(body, json!([{"symbol": "ACME"}]));
    assert!(h.navigator.replaced().is_empty());
}

// =============================================================================
// guard
// =============================================================================

#[tokio::test]
async fn guard_path_redirects_without_token() {
    let h = Harness::new("login", api);

    assert_eq!(
        h.session.guard_path("/stocks").await,
        GuardDecision::Redirect(Location::named("login"))
    );
    assert_eq!(h.session.guard_path("/register").await, GuardDecision::Allow);
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn guard_path_verifies_stored_token() {
    local(async {
        let h = Harness::new("login", api).with_token("fresh");

        assert_eq!(h.session.guard_path("/").await, GuardDecision::Allow);
        assert_eq!(h.session.current_user(), Some(sample_identity()));

        assert_eq!(h.session.guard_path("/stocks").await, GuardDecision::Allow);
        assert_eq!(h.transport.calls(), 1);
    })
    .await;
}

#[tokio::test]
async fn abandoned_guard_path_still_loads_identity() {
    local(async {
        let h = Harness::new("login", api).with_token("fresh");

        {
            let transition = h.session.guard_path("/dashboard");
            futures::pin_mut!(transition);
            assert!(futures::poll!(transition.as_mut()).is_pending());
        }

        for _ in 0..50 {
            tokio::task::yield_now().await;
        }

        assert!(!h.session.is_checking());
        assert_eq!(h.session.current_user(), Some(sample_identity()));
        assert_eq!(h.transport.calls_to("/accounts/me"), 1);
    })
    .await;
}

#[tokio::test]
async fn guard_with_revoked_token_ends_session() {
    local(async {
        let h = Harness::new("dashboard", api).with_token("revoked");

        let decision = h.session.guard_path("/settings").await;

        assert_eq!(decision, GuardDecision::Redirect(Location::named("login")));
        assert_eq!(h.token(), None);
        assert_eq!(h.navigator.replaced()[0].to_string(), "login?r=expired");
        assert!(!h.session.is_checking());
    })
    .await;
}

// =============================================================================
// ui preferences
// =============================================================================

#[test]
fn sidebar_lists_visible_pages() {
    let h = Harness::new("login", api);
    let labels: Vec<_> = h.session.sidebar().into_iter().map(|item| item.label).collect();
    assert_eq!(labels, ["Dashboard", "Stocks"]);
}

#[test]
fn theme_toggle_persists_in_session_store() {
    let h = Harness::new("login", api);

    assert_eq!(h.session.theme().read(false), ThemePreference::Light);
    assert_eq!(h.session.theme().toggle(false).unwrap(), ThemePreference::Dark);
    assert_eq!(h.store.get("theme").as_deref(), Some("dark"));
}
