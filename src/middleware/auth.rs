use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::Request,
    http::Method,
};
use crate::errors::AppError;
use crate::models::UserId;
use crate::services::AuthSession;

/// The user resolved from the session, available to handlers behind `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: UserId,
}

pub async fn require_auth(
    session: AuthSession,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    if path == "/login" || path == "/register" {
        return next.run(req).await;
    }

    match session.resolve().await {
        Ok(Some(id)) => {
            req.extensions_mut().insert(CurrentUser { id });
            next.run(req).await
        }
        Ok(None) => {
            tracing::debug!("Anonymous request to {} {}", req.method(), path);
            if is_json_read(req.method(), &path) {
                AppError::Unauthorized.into_response()
            } else {
                Redirect::to("/login").into_response()
            }
        }
        Err(e) => e.into_response(),
    }
}

// The JSON read endpoints answer 401 instead of redirecting
fn is_json_read(method: &Method, path: &str) -> bool {
    method == Method::GET && (path == "/tasks" || path.starts_with("/tasks/"))
}
