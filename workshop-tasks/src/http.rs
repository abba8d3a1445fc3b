use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use workshop_kit::{ApiResult, Id, QueryParams, Valid};

use crate::board::SharedBoard;
use crate::models::TaskInput;

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateQuery {
    #[serde(default)]
    pub auto_id: bool,
}

pub fn build_router(board: SharedBoard) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .with_state(board)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Task Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tasks": "/tasks",
            "health": "/health"
        }
    }))
}

async fn list_tasks(
    State(board): State<SharedBoard>,
    QueryParams(query): QueryParams<TaskListQuery>,
) -> Json<Value> {
    Json(json!({ "tasks": board.tasks(query.completed) }))
}

async fn create_task(
    State(board): State<SharedBoard>,
    QueryParams(query): QueryParams<CreateQuery>,
    Valid(input): Valid<TaskInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let task = board.create(input, query.auto_id)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Task created", "task": task }))))
}

async fn get_task(State(board): State<SharedBoard>, Id(id): Id) -> ApiResult<Json<Value>> {
    let task = board.task(id)?;
    Ok(Json(json!({ "message": "Task found", "task": task })))
}

async fn update_task(
    State(board): State<SharedBoard>,
    Id(id): Id,
    Valid(input): Valid<TaskInput>,
) -> ApiResult<Json<Value>> {
    let task = board.update(id, input)?;
    Ok(Json(json!({ "message": "Task updated", "task": task })))
}

async fn delete_task(State(board): State<SharedBoard>, Id(id): Id) -> ApiResult<Json<Value>> {
    let task = board.delete(id)?;
    Ok(Json(json!({ "message": "Task deleted", "task": task })))
}
