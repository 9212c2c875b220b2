//! End-to-end chat flow against mocked Azure endpoints
//!
//! `AppState::build` wires the real HTTP clients; wiremock stands in for the
//! search index and the completion deployment.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rag_gateway::config::Settings;
use rag_gateway::server::{create_app, AppState};

const SECRET: &str = "rag-integration-secret";

fn settings(azure: &MockServer, search_enabled: bool) -> Settings {
    let mut settings = Settings::default();
    settings.auth.secret = Some(SECRET.to_string());

    settings.completion.endpoint = azure.uri();
    settings.completion.api_key = "openai-key".to_string();
    settings.completion.deployment = "gpt-4o".to_string();

    settings.search.enabled = search_enabled;
    settings.search.endpoint = azure.uri();
    settings.search.api_key = "search-key".to_string();
    settings.search.index_name = "composers".to_string();
    settings
}

async fn app(settings: Settings) -> Router {
    let state = assert_ok!(AppState::build(settings).await);
    create_app(state)
}

fn chat_request(query: &str) -> Request<Body> {
    let token = encode(
        &Header::default(),
        &json!({ "sub": "listener-1", "exp": Utc::now().timestamp() + 600 }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn mount_completion(server: &MockServer, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-4o/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": answer } }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_chat_grounded_on_search_results() {
    let azure = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/composers/docs/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "content": "Bach composed the Goldberg Variations in 1741." }]
        })))
        .expect(1)
        .mount(&azure)
        .await;
    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-4o/chat/completions"))
        .and(body_string_contains("[1] Bach composed the Goldberg Variations in 1741."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "J. S. Bach." } }]
        })))
        .expect(1)
        .mount(&azure)
        .await;

    let (status, body) = send(
        app(settings(&azure, true)).await,
        chat_request("Who wrote the Goldberg Variations?"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "J. S. Bach.");
    assert_eq!(body["sources"], json!(["Bach composed the Goldberg Variations in 1741."]));
}

#[tokio::test]
async fn test_chat_without_search_skips_index() {
    let azure = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/composers/docs/search"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&azure)
        .await;
    mount_completion(&azure, "Hello there.").await;

    let (status, body) = send(app(settings(&azure, false)).await, chat_request("Hi")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Hello there.");
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn test_search_outage_still_answers() {
    let azure = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/composers/docs/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&azure)
        .await;
    mount_completion(&azure, "From memory: Bach.").await;

    let (status, body) = send(app(settings(&azure, true)).await, chat_request("Goldberg?")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "From memory: Bach.");
}

#[tokio::test]
async fn test_completion_outage_is_bad_gateway() {
    let azure = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-4o/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&azure)
        .await;

    let (status, body) = send(app(settings(&azure, false)).await, chat_request("Hi")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");
}

#[tokio::test]
async fn test_build_verifies_tokens_against_fetched_key_set() {
    let azure = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(include_str!("fixtures/jwks.json"), "application/json"),
        )
        .expect(1)
        .mount(&azure)
        .await;

    let mut settings = settings(&azure, false);
    settings.auth.secret = None;
    settings.auth.jwks_url = Some(format!("{}/.well-known/jwks.json", azure.uri()));

    let state = assert_ok!(AppState::build(settings).await);
    assert!(state.authenticator.is_verifying());
    let app = create_app(state);

    let me = |pem: &str| {
        let mut jwt_header = Header::new(Algorithm::RS256);
        jwt_header.kid = Some("gateway-test-key".to_string());
        let token = encode(
            &jwt_header,
            &json!({ "sub": "listener-9", "exp": Utc::now().timestamp() + 600 }),
            &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
        )
        .unwrap();
        Request::builder()
            .uri("/api/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(app.clone(), me(include_str!("fixtures/rsa_signing_key.pem"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "listener-9");

    let (status, body) = send(app, me(include_str!("fixtures/rsa_foreign_key.pem"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}
