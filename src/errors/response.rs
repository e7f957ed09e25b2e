use axum::{
    response::{IntoResponse, Response, Redirect, Json},
    http::StatusCode,
};
use serde_json::json;
use crate::errors::AppError;

// Form flows get a redirect carrying a flash message; JSON endpoints get a JSON error body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::DuplicateUsername(_) => {
                flash_redirect("/register", "Username already taken")
            }

            AppError::Validation(msg) => flash_redirect("/register", &msg),

            AppError::InvalidCredentials => {
                flash_redirect("/login", "Invalid username or password")
            }

            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            ).into_response(),

            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Task not found" })),
            ).into_response(),

            // Internals are logged here and never echoed to the client
            AppError::Storage(e) => {
                tracing::error!("Storage failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error").into_response()
            }

            AppError::Hash(e) => {
                tracing::error!("Password hashing failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }

            AppError::Session(e) => {
                tracing::error!("Session failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error").into_response()
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

pub fn flash_redirect(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{}?error={}", path, urlencoding::encode(message))).into_response()
}
