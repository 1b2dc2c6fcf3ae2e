use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Transport(String),
    /// The collaborator answered with a failure.
    Endpoint {
        status: Option<u16>,
        message: String,
        details: Option<String>,
    },
    /// A 2xx answer that is missing an expected field or is not JSON.
    MalformedResponse(String),
    Validation(String),
    NotFound(String),
    ConfigurationError(String),
    Internal(String),
}

impl AppError {
    pub fn endpoint(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Endpoint {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Text shown verbatim in an error notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport(msg) => msg.clone(),
            AppError::Endpoint {
                message, details, ..
            } => match details {
                Some(details) if !details.is_empty() => format!("{}\n{}", message, details),
                _ => message.clone(),
            },
            AppError::MalformedResponse(msg) => format!("Malformed response: {}", msg),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AppError::Endpoint {
                status: Some(status),
                message,
                ..
            } => write!(f, "Endpoint error ({}): {}", status, message),
            AppError::Endpoint {
                status: None,
                message,
                ..
            } => write!(f, "Endpoint error: {}", message),
            AppError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Transport(msg) => {
                tracing::error!("Transport error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Endpoint { .. } => (StatusCode::BAD_GATEWAY, self.user_message()),
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed backend response: {}", msg);
                (StatusCode::BAD_GATEWAY, self.user_message())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ConfigurationError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::endpoint(Some(status.as_u16()), err.to_string()),
            None if err.is_decode() => AppError::MalformedResponse(err.to_string()),
            None => AppError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
