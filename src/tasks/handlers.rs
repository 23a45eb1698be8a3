use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{dto::MessageResponse, extractors::CurrentUser},
    error::ApiError,
    state::AppState,
    tasks::dto::{CreateTaskRequest, UpdateTaskRequest},
    tasks::repo::{Task, TaskChanges},
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task).get(list_tasks))
        .route(
            "/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/restore/:id", patch(restore_task))
        .route("/tasks/complete/:id", patch(complete_task))
        .route("/tasks/incomplete/:id", patch(incomplete_task))
}

fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

#[instrument(skip(state, claims, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let title = require(&payload.title, "title")?;
    let description = require(&payload.description, "description")?;

    // Owner always comes from the verified token, never from the body.
    let task = Task::create(&state.db, claims.sub, title, description).await?;

    info!(task_id = %task.id, user_id = %claims.sub, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, claims))]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = Task::list_by_owner(&state.db, claims.sub).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state, claims))]
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = Task::find_active(&state.db, claims.sub, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(task))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let changes = TaskChanges {
        title: payload.title.filter(|t| !t.trim().is_empty()),
        description: payload.description,
        is_completed: payload.is_completed,
    };

    let task = Task::update_fields(&state.db, claims.sub, id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    info!(task_id = %task.id, user_id = %claims.sub, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state, claims))]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    Task::set_deleted(&state.db, claims.sub, id, true)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    info!(task_id = %id, user_id = %claims.sub, "task soft-deleted");
    Ok(Json(MessageResponse::new("Task soft-deleted successfully")))
}

#[instrument(skip(state, claims))]
pub async fn restore_task(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = Task::set_deleted(&state.db, claims.sub, id, false)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found or not deleted".into()))?;

    info!(task_id = %task.id, user_id = %claims.sub, "task restored");
    Ok(Json(task))
}

#[instrument(skip(state, claims))]
pub async fn complete_task(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = Task::set_completed(&state.db, claims.sub, id, true)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(task))
}

#[instrument(skip(state, claims))]
pub async fn incomplete_task(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = Task::set_completed(&state.db, claims.sub, id, false)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(task))
}
