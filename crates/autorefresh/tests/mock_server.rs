//! Mock server tests for the autorefresh library.
//!
//! These tests use wiremock to simulate an API server with login, refresh and
//! protected routes, and exercise the client's recovery behavior end to end.

use std::time::Duration;

use autorefresh::error::{AuthError, InvalidInputError, TransportError};
use autorefresh::{AuthClient, BaseUrl, Error, MainToken, Method, RefreshPolicy, RefreshToken, StatusCode};
use futures_util::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALID_CLIENT_ID: &str = "validClientId";
const VALID_CLIENT_SECRET: &str = "validClientSecret";
const VALID_MAIN_TOKEN: &str = "validMainToken";
const VALID_REFRESH_TOKEN: &str = "validRefreshToken";

fn tokens() -> serde_json::Value {
    json!({
        "mainToken": VALID_MAIN_TOKEN,
        "refreshToken": VALID_REFRESH_TOKEN
    })
}

/// Login answers with tokens for the valid credentials and 401 otherwise.
async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({
            "clientId": VALID_CLIENT_ID,
            "clientSecret": VALID_CLIENT_SECRET
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens()))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Refresh answers with tokens for the valid refresh token and 401 otherwise.
/// `expected` is the number of successful refreshes the test allows.
async fn mount_refresh(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .and(body_json(json!({ "refreshToken": VALID_REFRESH_TOKEN })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens()))
        .with_priority(1)
        .expect(expected)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(10)
        .mount(server)
        .await;
}

/// `POST /test` answers `true` for the valid main token and 401 otherwise.
async fn mount_protected(server: &MockServer, authorization: &str) {
    Mock::given(method("POST"))
        .and(path("/test"))
        .and(header("authorization", authorization))
        .respond_with(ResponseTemplate::new(200).set_body_json(true))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(10)
        .mount(server)
        .await;
}

async fn full_server(expected_refreshes: u64) -> MockServer {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_refresh(&server, expected_refreshes).await;
    mount_protected(&server, VALID_MAIN_TOKEN).await;
    server
}

fn client_for(server: &MockServer) -> AuthClient {
    AuthClient::builder(BaseUrl::new(server.uri()).unwrap())
        .build()
        .unwrap()
}

async fn force_tokens(client: &AuthClient, main: &str, refresh: &str) {
    client
        .session()
        .update(MainToken::new(main), RefreshToken::new(refresh))
        .await;
}

async fn assert_session(client: &AuthClient, main: &str, refresh: &str) {
    let session = client.session().snapshot().await;
    assert_eq!(session.main_token().as_str(), main);
    assert_eq!(session.refresh_token().as_str(), refresh);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_stores_tokens() {
    let server = full_server(0).await;
    let client = client_for(&server);

    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = full_server(0).await;
    let client = client_for(&server);

    let err = client.login("any", "thing").await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(!err.is_redirect());
    assert_session(&client, "", "").await;
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
    let server = full_server(0).await;
    let client = client_for(&server);

    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();
    let err = client.login("any", "thing").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_login_not_found_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_refresh(&server, 0).await;
    let client = client_for(&server);

    let err = client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_request_after_login() {
    let server = full_server(0).await;
    let client = client_for(&server);

    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();
    let ok: bool = client.request(Method::POST, "test", Some(json!({}))).await.unwrap();

    assert!(ok);
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_unauthorized_without_refresh_token_redirects() {
    let server = full_server(0).await;
    let client = client_for(&server);

    let err = client
        .request::<bool>(Method::POST, "test", Some(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Redirect");
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    // Calling again gives the same outcome
    let err = client
        .request::<bool>(Method::POST, "test", Some(json!({})))
        .await
        .unwrap_err();
    assert!(err.is_redirect());
    assert_session(&client, "", "").await;
}

#[tokio::test]
async fn test_expired_main_token_is_refreshed() {
    let server = full_server(1).await;
    let client = client_for(&server);

    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();
    force_tokens(&client, "invalidMainToken", VALID_REFRESH_TOKEN).await;

    let ok: bool = client.request(Method::POST, "test", Some(json!({}))).await.unwrap();

    assert!(ok);
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_both_tokens_invalid_redirects() {
    let server = full_server(0).await;
    let client = client_for(&server);

    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();
    force_tokens(&client, "invalidMainToken", "invalidRefreshToken").await;

    let err = client
        .request::<bool>(Method::POST, "test", Some(json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), autorefresh::REDIRECT_MESSAGE);
    match err {
        Error::Redirect(redirect) => assert!(redirect.cause().url.ends_with("/test")),
        other => panic!("expected redirect, got {other:?}"),
    }
    assert_session(&client, "", "").await;
}

#[tokio::test]
async fn test_server_error_is_not_intercepted() {
    let server = full_server(0).await;
    Mock::given(method("GET"))
        .and(path("/test500"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "InternalError",
            "message": "boom"
        })))
        .mount(&server)
        .await;
    let client = client_for(&server);
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    let err = client
        .request::<serde_json::Value>(Method::GET, "test500", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    match err {
        Error::Status(status) => assert_eq!(status.message.as_deref(), Some("boom")),
        other => panic!("expected status error, got {other:?}"),
    }
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_forbidden_is_not_intercepted() {
    let server = full_server(0).await;
    Mock::given(method("DELETE"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let client = client_for(&server);
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    let err = client
        .request::<()>(Method::DELETE, "admin", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert!(client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_retry_failure_is_returned_verbatim() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_refresh(&server, 1).await;
    // The route rejects every token, even a fresh one.
    Mock::given(method("GET"))
        .and(path("/locked"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    let client = client_for(&server);
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    let err = client
        .request::<()>(Method::GET, "locked", None)
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_token_is_read_at_dispatch_time() {
    let server = full_server(0).await;
    let client = client_for(&server);

    force_tokens(&client, VALID_MAIN_TOKEN, "").await;
    let ok: bool = client.request(Method::POST, "test", Some(json!({}))).await.unwrap();

    assert!(ok);
}

#[tokio::test]
async fn test_empty_success_body() {
    let server = full_server(0).await;
    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .and(header("authorization", VALID_MAIN_TOKEN))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let client = client_for(&server);
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    client
        .request::<()>(Method::PUT, "items/1", Some(json!({"name": "x"})))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() {
    let server = full_server(0).await;
    let client = client_for(&server);
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    let err = client
        .request::<Vec<String>>(Method::POST, "test", Some(json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_auth_scheme_prefix() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_refresh(&server, 0).await;
    mount_protected(&server, "Bearer validMainToken").await;
    let client = AuthClient::builder(BaseUrl::new(server.uri()).unwrap())
        .auth_scheme("Bearer")
        .build()
        .unwrap();

    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();
    let ok: bool = client.request(Method::POST, "test", Some(json!({}))).await.unwrap();

    assert!(ok);
}

#[tokio::test]
async fn test_custom_endpoint_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/renew"))
        .and(body_json(json!({ "refreshToken": VALID_REFRESH_TOKEN })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens()))
        .expect(1)
        .mount(&server)
        .await;
    let base = BaseUrl::new(format!("{}/api", server.uri())).unwrap();
    let client = AuthClient::builder(base)
        .login_path("auth/token")
        .refresh_path("auth/renew")
        .build()
        .unwrap();

    client.login("id", "secret").await.unwrap();
    client.refresh().await.unwrap();

    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_transport_error_propagates() {
    // Nothing listens on port 1
    let client = AuthClient::builder(BaseUrl::new("http://127.0.0.1:1").unwrap())
        .build()
        .unwrap();
    force_tokens(&client, "main", "refresh").await;

    let err = client
        .request::<()>(Method::GET, "anything", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.status(), None);
    assert_session(&client, "main", "refresh").await;
}

#[tokio::test]
async fn test_sub_second_timeout_allows_fast_response() {
    let server = full_server(0).await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(true))
        .mount(&server)
        .await;
    let client = AuthClient::builder(BaseUrl::new(server.uri()).unwrap())
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();

    let ok: bool = client.request(Method::GET, "fast", None).await.unwrap();

    assert!(ok);
}

#[tokio::test]
async fn test_sub_second_timeout_still_applies() {
    let server = full_server(0).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(true)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let client = AuthClient::builder(BaseUrl::new(server.uri()).unwrap())
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = client
        .request::<bool>(Method::GET, "slow", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })), "{err:?}");
}

#[tokio::test]
async fn test_foreign_origin_never_receives_token() {
    let server = full_server(0).await;
    let elsewhere = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(true))
        .expect(0)
        .mount(&elsewhere)
        .await;
    let client = client_for(&server);
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    let err = client
        .request::<bool>(Method::POST, &format!("{}/test", elsewhere.uri()), Some(json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(InvalidInputError::Path { .. })), "{err:?}");
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

// ============================================================================
// Explicit refresh and logout
// ============================================================================

#[tokio::test]
async fn test_explicit_refresh_without_token() {
    let server = full_server(0).await;
    let client = client_for(&server);

    let err = client.refresh().await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::MissingRefreshToken)));
}

#[tokio::test]
async fn test_explicit_refresh_failure_keeps_session() {
    let server = full_server(0).await;
    let client = client_for(&server);
    force_tokens(&client, "main", "invalidRefreshToken").await;

    let err = client.refresh().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_session(&client, "main", "invalidRefreshToken").await;
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = full_server(0).await;
    let client = client_for(&server);
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();

    client.logout().await;

    assert_session(&client, "", "").await;
}

// ============================================================================
// Scenario
// ============================================================================

#[tokio::test]
async fn test_refresh_then_redirect_scenario() {
    let server = full_server(1).await;
    let client = client_for(&server);

    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;

    force_tokens(&client, "invalidMainToken", VALID_REFRESH_TOKEN).await;
    let ok: bool = client.request(Method::POST, "test", Some(json!({}))).await.unwrap();
    assert!(ok);
    assert_eq!(client.session().main_token().await.as_str(), VALID_MAIN_TOKEN);

    force_tokens(&client, "invalidMainToken", "invalidRefreshToken").await;
    let err = client
        .request::<bool>(Method::POST, "test", Some(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Redirect");
    assert_session(&client, "", "").await;
}

// ============================================================================
// Concurrency
// ============================================================================

async fn concurrent_stale_requests(client: &AuthClient, count: usize) -> Vec<Result<bool, Error>> {
    force_tokens(client, "invalidMainToken", VALID_REFRESH_TOKEN).await;
    let requests = (0..count).map(|_| {
        let client = client.clone();
        async move {
            client
                .request::<bool>(Method::POST, "test", Some(json!({})))
                .await
        }
    });
    join_all(requests).await
}

#[tokio::test]
async fn test_per_request_policy_refreshes_for_each_401() {
    let server = full_server(3).await;
    let client = client_for(&server);

    let results = concurrent_stale_requests(&client, 3).await;

    assert!(results.iter().all(|r| matches!(r, Ok(true))));
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_single_flight_policy_refreshes_once() {
    let server = full_server(1).await;
    let client = AuthClient::builder(BaseUrl::new(server.uri()).unwrap())
        .refresh_policy(RefreshPolicy::SingleFlight)
        .build()
        .unwrap();

    let results = concurrent_stale_requests(&client, 4).await;

    assert!(results.iter().all(|r| matches!(r, Ok(true))));
    assert_session(&client, VALID_MAIN_TOKEN, VALID_REFRESH_TOKEN).await;
}

#[tokio::test]
async fn test_single_flight_failed_refresh_redirects_everyone() {
    let server = full_server(0).await;
    let client = AuthClient::builder(BaseUrl::new(server.uri()).unwrap())
        .refresh_policy(RefreshPolicy::SingleFlight)
        .build()
        .unwrap();
    client.login(VALID_CLIENT_ID, VALID_CLIENT_SECRET).await.unwrap();
    force_tokens(&client, "invalidMainToken", "invalidRefreshToken").await;

    let requests = (0..3).map(|_| {
        let client = client.clone();
        async move {
            client
                .request::<bool>(Method::POST, "test", Some(json!({})))
                .await
        }
    });
    let results = join_all(requests).await;

    assert!(results.iter().all(|r| matches!(r, Err(e) if e.is_redirect())));
    assert_session(&client, "", "").await;
}
