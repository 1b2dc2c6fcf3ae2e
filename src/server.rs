// Session HTTP API - exposes sessions to the browser front end. Every mutating
// route answers with the freshly rendered view.

use axum::{
    extract::{Path as AxumPath, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::view::{PageView, ViewMode};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

type ViewResponse = AppResult<Json<ApiResponse<PageView>>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub view: PageView,
}

#[derive(Deserialize)]
pub struct SubmitUrlRequest {
    pub url: String,
}

#[derive(Deserialize)]
pub struct SelectModeRequest {
    pub mode: ViewMode,
}

#[derive(Deserialize)]
pub struct EditPropertyRequest {
    pub value: String,
}

#[derive(Deserialize)]
pub struct MovePropertyRequest {
    pub from: usize,
    pub to: usize,
}

// HTTP Handlers

pub async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("Notion clipper is running".to_string()))
}

pub async fn create_session_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<SessionCreated>> {
    let session = state.registry.create().await;
    Json(ApiResponse::success(SessionCreated {
        session_id: session.id(),
        view: session.view().await,
    }))
}

pub async fn get_view_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    Ok(Json(ApiResponse::success(session.view().await)))
}

pub async fn delete_session_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> AppResult<Json<ApiResponse<Uuid>>> {
    state.registry.remove(id).await?;
    Ok(Json(ApiResponse::success(id)))
}

pub async fn submit_url_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<SubmitUrlRequest>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    Ok(Json(ApiResponse::success(session.submit_url(&req.url).await)))
}

pub async fn select_mode_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<SelectModeRequest>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    Ok(Json(ApiResponse::success(session.select_mode(req.mode).await)))
}

pub async fn retry_translation_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    Ok(Json(ApiResponse::success(session.retry_translation().await)))
}

pub async fn reload_catalog_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    Ok(Json(ApiResponse::success(session.reload_catalog().await)))
}

pub async fn edit_property_handler(
    State(state): State<AppState>,
    AxumPath((id, property_id)): AxumPath<(Uuid, String)>,
    Json(req): Json<EditPropertyRequest>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    Ok(Json(ApiResponse::success(
        session.edit_property(&property_id, &req.value).await,
    )))
}

pub async fn move_property_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<MovePropertyRequest>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    let view = session.move_property(req.from, req.to).await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn create_page_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    Ok(Json(ApiResponse::success(session.create_page().await)))
}

pub async fn dismiss_notification_handler(
    State(state): State<AppState>,
    AxumPath((id, notification_id)): AxumPath<(Uuid, Uuid)>,
) -> ViewResponse {
    let session = state.registry.get(id).await?;
    let view = session.dismiss_notification(notification_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// Every route served by [`create_router`], as (method, path, summary).
pub const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/api/health", "Health check"),
    ("POST", "/api/sessions", "Create session"),
    ("GET", "/api/sessions/{id}", "Current view"),
    ("POST", "/api/sessions/{id}/url", "Submit URL"),
    ("POST", "/api/sessions/{id}/mode", "Switch content mode"),
    ("POST", "/api/sessions/{id}/translation/retry", "Retry translation"),
    ("POST", "/api/sessions/{id}/catalog/reload", "Reload property schema"),
    ("PUT", "/api/sessions/{id}/properties/{property_id}", "Edit property"),
    ("POST", "/api/sessions/{id}/properties/move", "Reorder properties"),
    ("POST", "/api/sessions/{id}/pages", "Create Notion page"),
    (
        "DELETE",
        "/api/sessions/{id}/notifications/{notification_id}",
        "Dismiss notification",
    ),
    ("DELETE", "/api/sessions/{id}", "Drop session"),
];

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/{id}", get(get_view_handler))
        .route("/api/sessions/{id}", delete(delete_session_handler))
        .route("/api/sessions/{id}/url", post(submit_url_handler))
        .route("/api/sessions/{id}/mode", post(select_mode_handler))
        .route(
            "/api/sessions/{id}/translation/retry",
            post(retry_translation_handler),
        )
        .route(
            "/api/sessions/{id}/catalog/reload",
            post(reload_catalog_handler),
        )
        .route(
            "/api/sessions/{id}/properties/move",
            post(move_property_handler),
        )
        .route(
            "/api/sessions/{id}/properties/{property_id}",
            put(edit_property_handler),
        )
        .route("/api/sessions/{id}/pages", post(create_page_handler))
        .route(
            "/api/sessions/{id}/notifications/{notification_id}",
            delete(dismiss_notification_handler),
        )
        .with_state(state)
}
