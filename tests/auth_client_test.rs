mod common;

use common::{alice, Harness};
use judge_gateway::clients::{AuthClient, AuthError};
use judge_gateway::codes;
use judge_gateway::config::GatewayConfig;
use judge_gateway::gateway::GatewayError;
use judge_gateway::model::{LoginForm, RegisterForm, TokenPayload};
use judge_gateway::ui::{Navigator, NoticeLevel, Route};
use serde_json::json;

fn client(h: &Harness) -> AuthClient {
    AuthClient::new(h.gateway.clone())
}

#[tokio::test]
async fn test_login_stores_token_and_profile() {
    let h = Harness::new(GatewayConfig::default());
    h.mock
        .expect_post("/api/auth/login")
        .return_data(TokenPayload { token: "t-1".into() });
    h.mock.expect_get("/api/auth/me").return_data(alice());

    let user = client(&h)
        .login(&LoginForm::new("alice", "secret1"))
        .await
        .expect("login succeeds");
    assert_eq!(user.username.as_deref(), Some("alice"));

    let session = h.gateway.session().snapshot();
    assert_eq!(session.token.as_deref(), Some("t-1"));
    assert_eq!(session.user, Some(alice()));

    let sent = h.mock.requests();
    assert_eq!(
        sent[0].body,
        Some(json!({ "username": "alice", "password": "secret1" }))
    );
    assert_eq!(sent[0].bearer, None);
    assert_eq!(sent[1].bearer.as_deref(), Some("t-1"));

    let notices = h.notifier.notices();
    assert_eq!(notices.last().map(|n| n.level), Some(NoticeLevel::Success));
    h.mock.verify();
}

/// Invalid forms are rejected before anything is sent.
#[tokio::test]
async fn test_login_validation_sends_nothing() {
    let h = Harness::new(GatewayConfig::default());
    let err = client(&h)
        .login(&LoginForm::new("al", "secret1"))
        .await
        .expect_err("username too short");
    assert!(matches!(err, AuthError::Validation(_)));
    assert_eq!(h.mock.request_count(), 0);
}

#[tokio::test]
async fn test_wrong_password_keeps_user_logged_out() {
    let h = Harness::new(GatewayConfig::default());
    h.mock
        .expect_post("/api/auth/login")
        .return_code(codes::USERNAME_PASSWORD_ERROR, "bad credentials");

    let err = client(&h)
        .login(&LoginForm::new("alice", "wrong-pass"))
        .await
        .expect_err("login fails");
    assert!(matches!(
        err,
        AuthError::Gateway(GatewayError::Api { code: codes::USERNAME_PASSWORD_ERROR, .. })
    ));
    assert!(!h.gateway.session().is_logged_in());
    assert_eq!(h.navigator.login_redirects(), 0);
    assert_eq!(h.notifier.notices()[0].message, "Incorrect username or password");
}

/// A token the server rejects on the profile call is not kept.
#[tokio::test]
async fn test_login_discards_rejected_token() {
    let h = Harness::new(GatewayConfig::default());
    h.mock
        .expect_post("/api/auth/login")
        .return_data(TokenPayload { token: "t-1".into() });
    h.mock
        .expect_get("/api/auth/me")
        .return_code(codes::INVALID_TOKEN, "bad token");

    let err = client(&h)
        .login(&LoginForm::new("alice", "secret1"))
        .await
        .expect_err("profile rejected");
    assert!(err.is_auth_rejection());
    assert!(!h.gateway.session().is_logged_in());
    h.mock.verify();
}

/// A server-side failure loading the profile keeps the new token for a later retry.
#[tokio::test]
async fn test_login_keeps_token_when_profile_errors() {
    let h = Harness::new(GatewayConfig::default());
    h.mock
        .expect_post("/api/auth/login")
        .return_data(TokenPayload { token: "t-1".into() });
    h.mock
        .expect_get("/api/auth/me")
        .return_code(codes::INTERNAL_SERVER_ERROR, "db down");

    let err = client(&h)
        .login(&LoginForm::new("alice", "secret1"))
        .await
        .expect_err("profile fails");
    assert!(!err.is_auth_rejection());
    assert_eq!(h.gateway.session().token().as_deref(), Some("t-1"));
    assert_eq!(h.storage.token_removals(), 0);
    h.mock.verify();
}

/// Logging in right after an expired session was detected works without waiting.
#[tokio::test(start_paused = true)]
async fn test_relogin_right_after_expired_session() {
    let h = Harness::new(GatewayConfig::default());
    h.gateway.session().set_token("stale").expect("token stored");
    h.mock.expect_get("/api/auth/me").return_status(401, "");
    let auth = client(&h);

    let err = auth.fetch_user_info().await.expect_err("stale token");
    assert!(err.is_auth_rejection());
    assert!(!h.gateway.session().is_logged_in());

    h.mock
        .expect_post("/api/auth/login")
        .return_data(TokenPayload { token: "fresh".into() });
    h.mock.expect_get("/api/auth/me").return_data(alice());

    let user = auth
        .login(&LoginForm::new("alice", "secret1"))
        .await
        .expect("login succeeds inside the window");
    assert_eq!(user, alice());

    let session = h.gateway.session().snapshot();
    assert_eq!(session.token.as_deref(), Some("fresh"));
    assert_eq!(session.user, Some(alice()));
    assert_eq!(h.mock.requests()[2].bearer.as_deref(), Some("fresh"));
    h.mock.verify();
}

/// After login the user lands back where the auth failure interrupted them.
#[tokio::test]
async fn test_login_returns_to_redirect_target() {
    let h = Harness::logged_in(GatewayConfig::default());
    h.mock
        .expect_get("/api/contests/3")
        .return_code(codes::EXPIRED_TOKEN, "expired");
    let _ = h.gateway.get::<serde_json::Value>("/api/contests/3").await;
    assert_eq!(h.navigator.current_route().name, "login");

    h.mock
        .expect_post("/api/auth/login")
        .return_data(TokenPayload { token: "t-2".into() });
    h.mock.expect_get("/api/auth/me").return_data(alice());
    client(&h)
        .login(&LoginForm::new("alice", "secret1"))
        .await
        .expect("login succeeds");

    let current = h.navigator.current_route();
    assert_eq!(current.full_path, "/problems?page=2");
    assert_eq!(current.name, "problems");
}

/// Without a remembered target login lands on the home page.
#[tokio::test]
async fn test_login_without_redirect_goes_home() {
    let h = Harness::on_route(GatewayConfig::default(), Route::new("login", "/login"));
    h.mock
        .expect_post("/api/auth/login")
        .return_data(TokenPayload { token: "t-1".into() });
    h.mock.expect_get("/api/auth/me").return_data(alice());

    client(&h)
        .login(&LoginForm::new("alice", "secret1"))
        .await
        .expect("login succeeds");
    assert_eq!(h.navigator.current_route().full_path, "/");
    assert_eq!(h.navigator.current_route().name, "home");
}

#[tokio::test]
async fn test_logout_clears_even_when_server_unreachable() {
    let h = Harness::logged_in(GatewayConfig::default());
    h.mock.expect_post("/api/auth/logout").return_unreachable();

    client(&h).logout().await;

    assert!(!h.gateway.session().is_logged_in());
    assert_eq!(h.storage.token_removals(), 1);
    assert_eq!(
        h.mock.requests()[0].body,
        Some(json!({ "token": "t-1" }))
    );
    h.mock.verify();
}

#[tokio::test]
async fn test_logout_without_session_skips_server() {
    let h = Harness::new(GatewayConfig::default());
    client(&h).logout().await;
    assert_eq!(h.mock.request_count(), 0);
}

#[tokio::test]
async fn test_fetch_user_info_uses_cache_then_server() {
    // No token: nothing to fetch.
    let h = Harness::new(GatewayConfig::default());
    assert_eq!(client(&h).fetch_user_info().await.expect("no session"), None);
    assert_eq!(h.mock.request_count(), 0);

    // Cached profile: no call.
    let h = Harness::logged_in(GatewayConfig::default());
    let cached = client(&h).fetch_user_info().await.expect("cached");
    assert_eq!(cached, Some(alice()));
    assert_eq!(h.mock.request_count(), 0);

    // Token only: loaded and cached.
    let h = Harness::new(GatewayConfig::default());
    h.gateway.session().set_token("t-1").expect("token stored");
    h.mock.expect_get("/api/auth/me").return_data(alice());
    let loaded = client(&h).fetch_user_info().await.expect("loaded");
    assert_eq!(loaded, Some(alice()));
    assert_eq!(h.gateway.session().user(), Some(alice()));
    h.mock.verify();
}

#[tokio::test]
async fn test_fetch_user_info_with_expired_token_logs_out() {
    let h = Harness::new(GatewayConfig::default());
    h.gateway.session().set_token("stale").expect("token stored");
    h.mock
        .expect_get("/api/auth/me")
        .return_code(codes::EXPIRED_TOKEN, "expired");

    let err = client(&h).fetch_user_info().await.expect_err("token expired");
    assert!(matches!(err, AuthError::Gateway(GatewayError::Api { .. })));
    assert!(!h.gateway.session().is_logged_in());
    assert_eq!(h.navigator.login_redirects(), 1);
}

/// An unreachable backend is no reason to drop a session.
#[tokio::test]
async fn test_fetch_user_info_keeps_session_when_unreachable() {
    let h = Harness::new(GatewayConfig::default());
    h.gateway.session().set_token("good").expect("token stored");
    h.mock.expect_get("/api/auth/me").return_unreachable();

    let err = client(&h).fetch_user_info().await.expect_err("backend down");
    assert!(matches!(err, AuthError::Gateway(GatewayError::Network(_))));
    assert!(!err.is_auth_rejection());
    assert_eq!(h.gateway.session().token().as_deref(), Some("good"));
    assert_eq!(h.storage.token_removals(), 0);
    assert_eq!(h.navigator.login_redirects(), 0);
}

#[tokio::test]
async fn test_send_code_passes_email_as_query() {
    let h = Harness::new(GatewayConfig::default());
    let auth = client(&h);

    let err = auth.send_code("  ").await.expect_err("email required");
    assert!(matches!(err, AuthError::Validation(_)));
    assert_eq!(h.mock.request_count(), 0);

    h.mock.expect_post("/api/auth/send-code").return_data(json!(null));
    auth.send_code(" bob@example.com ").await.expect("code sent");

    let sent = h.mock.requests();
    assert_eq!(sent[0].query, vec![("email".to_owned(), "bob@example.com".to_owned())]);
    assert_eq!(sent[0].body, None);
    h.mock.verify();
}

#[tokio::test]
async fn test_register_sends_form_without_confirmation() {
    let h = Harness::new(GatewayConfig::default());
    h.mock.expect_post("/api/auth/register").return_data(json!(null));

    let form = RegisterForm {
        username: "bob".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        email: "bob@example.com".into(),
        code: "123456".into(),
    };
    client(&h).register(&form).await.expect("registered");

    let body = h.mock.requests()[0].body.clone().expect("body sent");
    assert!(body.get("confirmPassword").is_none());
    assert_eq!(body["code"], "123456");
    assert!(!h.gateway.session().is_logged_in());
}

#[tokio::test]
async fn test_validate_token_leaves_session_alone() {
    let h = Harness::new(GatewayConfig::default());
    h.mock.expect_get("/api/auth/validate/abc").return_data(alice());

    let user = client(&h).validate_token("abc").await.expect("valid token");
    assert_eq!(user.user_id, Some(1));
    assert_eq!(h.mock.requests()[0].path, "/api/auth/validate/abc");
    assert!(!h.gateway.session().is_logged_in());
}
