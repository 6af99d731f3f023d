use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use task_shared::{CreateTaskRequest, Task, UpdateTaskRequest};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::service::{DeleteConfirmation, HealthStatus, TaskService};

/// Binds the health check and the `/api/tasks` routes to `service`.
pub fn router(service: TaskService, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn health_check(State(service): State<TaskService>) -> Json<HealthStatus> {
    Json(service.health_check())
}

async fn create_task(
    State(service): State<TaskService>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = payload?;
    let task = service.create_task(request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(State(service): State<TaskService>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(service.list_tasks().await?))
}

async fn get_task(
    Path(id): Path<String>,
    State(service): State<TaskService>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(service.get_task(&id).await?))
}

async fn update_task(
    Path(id): Path<String>,
    State(service): State<TaskService>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(service.update_task(&id, request).await?))
}

async fn delete_task(
    Path(id): Path<String>,
    State(service): State<TaskService>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    Ok(Json(service.delete_task(&id).await?))
}
