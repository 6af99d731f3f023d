//! Task operations behind the HTTP routes.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use task_shared::{CreateTaskRequest, Task, UpdateTaskRequest, ValidationError};
use thiserror::Error;

use crate::store::{SortOrder, StoreError, TaskStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid task ID")]
    InvalidIdentifier,

    #[error("Task not found")]
    NotFound,

    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InvalidId(_) => Self::InvalidIdentifier,
            other => Self::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn health_check(&self) -> HealthStatus {
        HealthStatus {
            status: "OK".to_string(),
            message: "Task Manager API is running".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> ServiceResult<Task> {
        let task = request.validate()?;
        Ok(self.store.insert(task).await?)
    }

    /// All tasks, newest first.
    pub async fn list_tasks(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.store.find_all(SortOrder::CreatedAtDescending).await?)
    }

    pub async fn get_task(&self, id: &str) -> ServiceResult<Task> {
        self.store.find_by_id(id).await?.ok_or(ServiceError::NotFound)
    }

    /// Validation runs before the store is touched, so a rejected update leaves the
    /// stored task as it was.
    pub async fn update_task(&self, id: &str, request: UpdateTaskRequest) -> ServiceResult<Task> {
        let changes = request.validate()?;
        self.store
            .update_by_id(id, changes)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete_task(&self, id: &str) -> ServiceResult<DeleteConfirmation> {
        if !self.store.delete_by_id(id).await? {
            return Err(ServiceError::NotFound);
        }
        Ok(DeleteConfirmation {
            message: "Task deleted successfully".to_string(),
        })
    }
}
