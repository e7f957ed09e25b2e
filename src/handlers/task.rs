use axum::{
    extract::{Extension, Form, Path, State},
    response::{IntoResponse, Json, Redirect, Response},
};
use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{Task, TaskForm};

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Vec<Task>> {
    Json(state.tasks.list_by_owner(&user.id).await)
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    let task_id = state
        .tasks
        .create(
            &user.id,
            form.title.unwrap_or_default(),
            form.description.unwrap_or_default(),
            form.status.unwrap_or_default(),
        )
        .await?;

    tracing::info!("User {} created task {}", user.id, task_id);
    Ok(Redirect::to("/").into_response())
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<String>,
) -> AppResult<Json<Task>> {
    let task = state
        .tasks
        .get_by_owner(&user.id, &task_id)
        .await
        .map_err(log_miss)?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<String>,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    let task = state
        .tasks
        .update(&user.id, &task_id, form.into())
        .await
        .map_err(log_miss)?;

    tracing::info!("User {} updated task {} (status: {})", user.id, task.id, task.status);
    Ok(Redirect::to("/").into_response())
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<String>,
) -> AppResult<Response> {
    state
        .tasks
        .delete(&user.id, &task_id)
        .await
        .map_err(log_miss)?;

    tracing::info!("User {} deleted task {}", user.id, task_id);
    Ok(Redirect::to("/").into_response())
}

fn log_miss(e: AppError) -> AppError {
    if let AppError::NotFound(id) = &e {
        tracing::warn!("Task lookup missed: {}", id);
    }
    e
}
