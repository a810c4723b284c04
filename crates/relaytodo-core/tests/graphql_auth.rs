//! Login flow against a mock GraphQL server.

use relaytodo_core::api::{ApiClient, ApiError, AuthOutcome};
use relaytodo_core::auth::{Credentials, MemoryStore, SessionStore};
use relaytodo_core::flow::{LoginFlow, SubmitOutcome};
use relaytodo_core::nav::{Navigator, Route};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(format!("{}/graphql", server.uri()), 5).expect("client builds")
}

fn mutation_response(payload: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": { "AuthUserMutation": payload } }))
}

#[tokio::test]
async fn sends_credentials_as_mutation_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": { "input": { "email": "a@a.com", "password": "secret" } }
        })))
        .respond_with(mutation_response(json!({
            "me": { "id": "1", "username": "ana", "email": "a@a.com" },
            "token": "t1",
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let outcome = client
        .login(&Credentials::new("a@a.com", "secret"))
        .await
        .expect("request succeeds");

    match outcome {
        AuthOutcome::Authenticated(session) => {
            assert_eq!(session.token, "t1");
            assert_eq!(session.user.id, "1");
            assert_eq!(session.user.username, "ana");
            assert_eq!(session.user.email, "a@a.com");
        }
        other => panic!("expected Authenticated, got {:?}", other),
    }
}

#[tokio::test]
async fn server_error_message_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(mutation_response(json!({
            "me": null,
            "token": null,
            "error": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .await
        .login(&Credentials::new("a@a.com", "wrongpass"))
        .await
        .expect("request succeeds");
    assert_eq!(outcome, AuthOutcome::Rejected("Invalid credentials".to_string()));
}

#[tokio::test]
async fn empty_payload_is_incomplete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(mutation_response(json!({ "me": null, "token": null, "error": null })))
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .await
        .login(&Credentials::new("a@a.com", "secret"))
        .await
        .expect("request succeeds");
    assert_eq!(outcome, AuthOutcome::Incomplete);
}

#[tokio::test]
async fn top_level_graphql_errors_surface_as_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Cannot query field \"AuthUserMutation\"" }]
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .await
        .login(&Credentials::new("a@a.com", "secret"))
        .await;
    assert!(matches!(result, Err(ApiError::GraphQl(ref m)) if m.contains("AuthUserMutation")));
}

#[tokio::test]
async fn http_failures_map_through_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .await
        .login(&Credentials::new("a@a.com", "secret"))
        .await;
    assert!(matches!(result, Err(ApiError::ServerError(ref body)) if body == "maintenance"));
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .await
        .login(&Credentials::new("a@a.com", "secret"))
        .await;
    assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
}

#[tokio::test]
async fn login_flow_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(mutation_response(json!({
            "me": { "id": "1", "username": "ana", "email": "a@a.com" },
            "token": "t1",
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut store = SessionStore::new(MemoryStore::new());
    let mut nav = Navigator::default();

    // Invalid form first: the mock expects exactly one request overall
    let mut flow = LoginFlow::with_credentials(Credentials::new("a@a.com", "123"));
    let outcome = flow.submit(&client, &mut store, &mut nav).await;
    assert!(matches!(outcome, SubmitOutcome::Invalid(_)));

    flow.set_password("secret");
    let outcome = flow.submit(&client, &mut store, &mut nav).await;
    assert_eq!(outcome, SubmitOutcome::Succeeded);
    assert_eq!(nav.current(), Route::Home);

    let session = store.get().expect("session stored");
    assert_eq!(session.token, "t1");
    assert_eq!(session.user.username, "ana");

    // A fresh login screen now redirects straight home
    let mut nav = Navigator::default();
    assert_eq!(
        LoginFlow::on_mount(&store, &mut nav),
        relaytodo_core::flow::MountDecision::Redirected
    );
}
