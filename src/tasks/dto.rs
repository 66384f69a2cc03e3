use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Task;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub text: Option<String>,
}

/// Partial update: at least one field must be present.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub text: Option<String>,
    pub done: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub data: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub success: bool,
    pub data: Task,
}

#[derive(Debug, Serialize)]
pub struct DeletedTaskResponse {
    pub success: bool,
    pub data: DeletedTask,
}

#[derive(Debug, Serialize)]
pub struct DeletedTask {
    pub id: Uuid,
}
