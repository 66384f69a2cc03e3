use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::dto::{
    CreateTaskRequest, DeletedTask, DeletedTaskResponse, TaskListResponse, TaskResponse,
    UpdateTaskRequest,
};
use super::repo_types::Task;

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks))
        .route("/", post(create_task))
        .route("/:id", get(get_task))
        .route("/:id", patch(update_task))
        .route("/:id", delete(delete_task))
}

fn parse_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::Validation("Invalid id".into()))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = Task::list_by_user(&state.db, user.id).await?;
    Ok(Json(TaskListResponse {
        success: true,
        data: tasks,
    }))
}

#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id)?;
    let task = Task::find_by_id(&state.db, user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(TaskResponse {
        success: true,
        data: task,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let text = payload
        .text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("Task text is required".into()))?;

    let task = Task::create(&state.db, user.id, &text).await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            success: true,
            data: task,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id)?;

    if payload.text.is_none() && payload.done.is_none() {
        return Err(ApiError::Validation(
            "Either text or done must be provided".into(),
        ));
    }

    let task = Task::update(&state.db, user.id, id, payload.text.as_deref(), payload.done)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(TaskResponse {
        success: true,
        data: task,
    }))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedTaskResponse>> {
    let id = parse_id(&id)?;
    let deleted = Task::delete(&state.db, user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(DeletedTaskResponse {
        success: true,
        data: DeletedTask { id: deleted },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_uuid() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn parse_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
