mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{article, MockBackend};
use notion_clipper::app_state::AppState;
use notion_clipper::config::Config;
use notion_clipper::models::{PropertyDefinition, PropertyType, TranslatedContent};
use notion_clipper::server::{create_router, ROUTES};

fn test_state() -> AppState {
    let backend = MockBackend::new()
        .with_content(
            "https://example.com",
            article("abc", "T", "<p>B</p><script>x()</script>", "https://example.com"),
        )
        .with_translation("abc", TranslatedContent::new("T2", "<p>B2</p>"))
        .with_catalog(vec![
            PropertyDefinition::new("date", "Date", PropertyType::Date),
            PropertyDefinition::new("summary", "Summary", PropertyType::RichText),
        ]);
    AppState::with_backend(Config::default(), Arc::new(backend)).unwrap()
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = create_router(test_state());
    let (status, body) = call(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn test_session_workflow() {
    let state = test_state();
    let app = create_router(state.clone());

    let (status, body) = call(&app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["session_id"].as_str().unwrap().to_string();
    state.registry.settle_all().await;

    let (_, body) = call(&app, Method::GET, &format!("/api/sessions/{}", id), None).await;
    let properties = body["data"]["properties"].as_array().unwrap();
    assert_eq!(properties.len(), 2);
    assert_eq!(properties[1]["control"], json!("text_area"));

    let (_, body) = call(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/url", id),
        Some(json!({ "url": "https://example.com" })),
    )
    .await;
    assert!(body["data"]["loading"]["message"].is_string());
    state.registry.settle_all().await;

    let (_, body) = call(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/mode", id),
        Some(json!({ "mode": "both" })),
    )
    .await;
    assert_eq!(body["data"]["content"]["layout"], json!("adaptive"));
    assert_eq!(body["data"]["content"]["translated"]["state"], json!("pending"));
    assert_eq!(body["data"]["content"]["original"]["body_html"], json!("<p>B</p>"));
    state.registry.settle_all().await;

    let (_, body) = call(&app, Method::GET, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(
        body["data"]["content"]["translated"]["article"]["title"],
        json!("T2")
    );

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/api/sessions/{}/properties/summary", id),
        Some(json!({ "value": "Short summary" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["properties"][1]["value"], json!("Short summary"));

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/properties/move", id),
        Some(json!({ "from": 1, "to": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["properties"][0]["id"], json!("summary"));

    call(&app, Method::POST, &format!("/api/sessions/{}/pages", id), None).await;
    state.registry.settle_all().await;
    let (_, body) = call(&app, Method::GET, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(body["data"]["last_page_id"], json!("page-1"));
}

#[tokio::test]
async fn test_invalid_move_is_bad_request() {
    let state = test_state();
    let app = create_router(state.clone());
    let (_, body) = call(&app, Method::POST, "/api/sessions", None).await;
    let id = body["data"]["session_id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/properties/move", id),
        Some(json!({ "from": 0, "to": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let app = create_router(test_state());
    let (status, body) = call(
        &app,
        Method::GET,
        "/api/sessions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_deleted_session_is_gone() {
    let state = test_state();
    let app = create_router(state.clone());
    let (_, body) = call(&app, Method::POST, "/api/sessions", None).await;
    let id = body["data"]["session_id"].as_str().unwrap().to_string();

    let (status, _) = call(&app, Method::DELETE, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.registry.len().await, 0);

    let (status, _) = call(&app, Method::GET, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_every_listed_route_is_served() {
    let state = test_state();
    let app = create_router(state.clone());
    let (_, body) = call(&app, Method::POST, "/api/sessions", None).await;
    let id = body["data"]["session_id"].as_str().unwrap().to_string();

    for (method, path, _) in ROUTES {
        let uri = path
            .replace("{id}", &id)
            .replace("{property_id}", "date")
            .replace("{notification_id}", "00000000-0000-0000-0000-000000000000");
        let request = Request::builder()
            .method(*method)
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        assert_ne!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        // Unrouted paths answer 404 with an empty body; handler 404s carry JSON.
        assert!(
            status != StatusCode::NOT_FOUND || !bytes.is_empty(),
            "{} {} is not routed",
            method,
            uri
        );
    }
}
