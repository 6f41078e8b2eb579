//! SessionManager login/logout/restore behavior.

mod common;

use common::{MockGateway, profile_json};
use http::Method;
use platter_console::{
    ApiError, AppState, AuthError, FlagStore, MemoryFlagStore, NotificationBus, NotificationKind,
    Role, SessionManager, SessionState,
};
use serde_json::{Value, json};
use std::sync::Arc;

struct Harness {
    mock: Arc<MockGateway>,
    flags: Arc<MemoryFlagStore>,
    app_state: AppState,
    bus: NotificationBus,
    session: SessionManager,
}

fn harness() -> Harness {
    let mock = Arc::new(MockGateway::new());
    let flags = Arc::new(MemoryFlagStore::new());
    let app_state = AppState::new();
    let bus = NotificationBus::new();
    let session = SessionManager::new(
        mock.clone(),
        bus.clone(),
        flags.clone(),
        app_state.clone(),
    );
    Harness {
        mock,
        flags,
        app_state,
        bus,
        session,
    }
}

#[tokio::test]
async fn staff_login_transitions_and_persists_flag() {
    let h = harness();
    h.mock.respond(
        Method::POST,
        "/auth/login",
        Ok(json!({ "user": profile_json("u-1", "Admin", "admin", "active") })),
    );
    let mut rx = h.bus.subscribe();

    let role = h.session.login("admin@example.com", "secret").await.unwrap();

    assert_eq!(role, Role::Admin);
    assert_eq!(h.session.state(), SessionState::LoggedIn { role: Role::Admin });
    assert!(h.flags.read().unwrap());
    assert_eq!(rx.try_recv().unwrap().kind, NotificationKind::Success);
}

#[tokio::test]
async fn manager_role_is_accepted() {
    let h = harness();
    h.mock.respond(
        Method::POST,
        "/auth/login",
        Ok(json!({ "user": profile_json("u-2", "Mana", "restaurant manager", "active") })),
    );

    let role = h.session.login("mana@example.com", "secret").await.unwrap();

    assert_eq!(role, Role::RestaurantManager);
    assert!(h.session.state().is_authenticated());
}

#[tokio::test]
async fn customer_login_is_rejected_without_transition() {
    let h = harness();
    h.mock.respond(
        Method::POST,
        "/auth/login",
        Ok(json!({ "user": profile_json("u-3", "Asha", "user", "active") })),
    );
    let mut rx = h.bus.subscribe();

    let err = h.session.login("asha@example.com", "secret").await.unwrap_err();

    // The HTTP exchange succeeded; the rejection is an authorization
    // decision, not a transport failure.
    assert!(matches!(err, AuthError::NotAuthorized { ref role } if role == "user"));
    assert_eq!(h.session.state(), SessionState::LoggedOut);
    assert!(!h.flags.read().unwrap(), "flag must not be persisted");
    assert_eq!(rx.try_recv().unwrap().kind, NotificationKind::Error);
}

#[tokio::test]
async fn bad_credentials_surface_as_api_error() {
    let h = harness();
    h.mock.respond(Method::POST, "/auth/login", Err(ApiError::Unauthorized));

    let err = h.session.login("admin@example.com", "wrong").await.unwrap_err();

    assert!(matches!(err, AuthError::Api(ApiError::Unauthorized)));
    assert_eq!(h.session.state(), SessionState::LoggedOut);
}

#[tokio::test]
async fn logout_clears_locally_even_when_server_fails() {
    let h = harness();
    h.mock.respond(
        Method::POST,
        "/auth/login",
        Ok(json!({ "user": profile_json("u-1", "Admin", "admin", "active") })),
    );
    h.mock.respond(
        Method::PUT,
        "/auth/logout",
        Err(ApiError::Network("connection refused".to_string())),
    );
    h.session.login("admin@example.com", "secret").await.unwrap();
    h.app_state.set("selected_restaurant", json!("r-1"));

    let result = h.session.logout().await;

    assert!(result.is_err(), "server failure still reported");
    assert_eq!(h.session.state(), SessionState::LoggedOut);
    assert!(!h.flags.read().unwrap());
    assert_eq!(h.app_state.get("selected_restaurant"), None);
}

#[tokio::test]
async fn logout_success_round_trip() {
    let h = harness();
    h.mock.respond(
        Method::POST,
        "/auth/login",
        Ok(json!({ "user": profile_json("u-1", "Admin", "admin", "active") })),
    );
    h.mock.respond(Method::PUT, "/auth/logout", Ok(Value::Null));
    h.session.login("admin@example.com", "secret").await.unwrap();

    h.session.logout().await.unwrap();

    assert_eq!(h.session.state(), SessionState::LoggedOut);
}

#[tokio::test]
async fn restore_without_flag_skips_the_network() {
    let h = harness();

    let state = h.session.restore_session().await.unwrap();

    assert_eq!(state, SessionState::LoggedOut);
    assert_eq!(h.mock.call_count(), 0);
}

#[tokio::test]
async fn restore_with_valid_flag_refetches_the_role() {
    let h = harness();
    h.flags.set().unwrap();
    h.mock.respond(
        Method::GET,
        "/auth/profile",
        Ok(profile_json("u-1", "Admin", "admin", "active")),
    );

    let state = h.session.restore_session().await.unwrap();

    assert_eq!(state, SessionState::LoggedIn { role: Role::Admin });
    assert_eq!(h.session.state(), state);
}

#[tokio::test]
async fn restore_clears_flag_on_401() {
    let h = harness();
    h.flags.set().unwrap();
    h.mock
        .respond(Method::GET, "/auth/profile", Err(ApiError::Unauthorized));

    let state = h.session.restore_session().await.unwrap();

    assert_eq!(state, SessionState::LoggedOut);
    assert!(!h.flags.read().unwrap(), "stale flag must be discarded");
}

#[tokio::test]
async fn restore_keeps_flag_on_network_failure() {
    let h = harness();
    h.flags.set().unwrap();
    h.mock.respond(
        Method::GET,
        "/auth/profile",
        Err(ApiError::Network("offline".to_string())),
    );

    let result = h.session.restore_session().await;

    assert!(result.is_err());
    assert_eq!(h.session.state(), SessionState::LoggedOut);
    assert!(h.flags.read().unwrap(), "flag survives for a later retry");
}

#[tokio::test]
async fn restore_clears_flag_for_non_staff_role() {
    let h = harness();
    h.flags.set().unwrap();
    h.mock.respond(
        Method::GET,
        "/auth/profile",
        Ok(profile_json("u-3", "Asha", "user", "active")),
    );

    let state = h.session.restore_session().await.unwrap();

    assert_eq!(state, SessionState::LoggedOut);
    assert!(!h.flags.read().unwrap());
}

#[tokio::test]
async fn routing_guards_observe_transitions() {
    let h = harness();
    h.mock.respond(
        Method::POST,
        "/auth/login",
        Ok(json!({ "user": profile_json("u-1", "Admin", "admin", "active") })),
    );
    let mut rx = h.session.subscribe();
    assert_eq!(*rx.borrow(), SessionState::LoggedOut);

    h.session.login("admin@example.com", "secret").await.unwrap();

    rx.changed().await.unwrap();
    assert!(rx.borrow().is_authenticated());
}
