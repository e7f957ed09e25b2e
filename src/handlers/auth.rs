use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Response, Redirect},
};
use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::{FlashQuery, LoginForm, RegisterForm};
use crate::services::AuthSession;
use super::pages;

pub async fn serve_login_page(
    session: AuthSession,
    Query(flash): Query<FlashQuery>,
) -> AppResult<Response> {
    if session.resolve().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(pages::login_page(flash.error.as_deref())).into_response())
}

pub async fn handle_login(
    State(state): State<AppState>,
    session: AuthSession,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for user: {}", login_form.username);

    let user_id = state
        .credentials
        .authenticate(&login_form.username, &login_form.password)
        .await
        .map_err(|e| {
            if matches!(e, AppError::InvalidCredentials) {
                tracing::warn!("Rejected login for user: {}", login_form.username);
            }
            e
        })?;

    session.start(&user_id).await?;
    tracing::info!("User {} logged in", login_form.username);
    Ok(Redirect::to("/").into_response())
}

pub async fn serve_register_page(
    session: AuthSession,
    Query(flash): Query<FlashQuery>,
) -> AppResult<Response> {
    if session.resolve().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(pages::register_page(flash.error.as_deref())).into_response())
}

pub async fn handle_register(
    State(state): State<AppState>,
    session: AuthSession,
    Form(register_form): Form<RegisterForm>,
) -> AppResult<Response> {
    if let Some(confirm) = &register_form.confirm_password {
        if confirm != &register_form.password {
            return Err(AppError::Validation("Passwords don't match".into()));
        }
    }

    let user_id = state
        .credentials
        .register(&register_form.username, &register_form.password)
        .await?;

    // Registration logs the new user straight in
    session.start(&user_id).await?;
    tracing::info!("Registered user {} ({})", register_form.username, user_id);
    Ok(Redirect::to("/").into_response())
}

pub async fn handle_logout(
    session: AuthSession,
) -> AppResult<Response> {
    if let Some(user_id) = session.resolve().await? {
        tracing::info!("User {} logged out", user_id);
    }
    session.end().await?;
    Ok(Redirect::to("/login").into_response())
}
