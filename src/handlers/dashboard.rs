use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use crate::app::AppState;
use crate::errors::AppResult;
use crate::middleware::CurrentUser;
use super::pages;

pub async fn serve_home(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Response> {
    let Some(account) = state.credentials.get(&user.id).await else {
        // users.json was edited under a live session
        tracing::warn!("Session refers to unknown user {}", user.id);
        return Ok(Redirect::to("/logout").into_response());
    };

    let tasks = state.tasks.list_by_owner(&user.id).await;
    tracing::debug!("Rendering {} tasks for {}", tasks.len(), account.username);

    Ok(Html(pages::index_page(&account.username, &tasks)).into_response())
}
