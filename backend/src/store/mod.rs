//! Task record store.
//!
//! Identifiers are canonical UUID strings. Anything `Uuid::parse_str` rejects is
//! reported as [`StoreError::InvalidId`], which callers keep distinct from a
//! well-formed identifier that matches nothing.

use async_trait::async_trait;
use task_shared::{NewTask, Task, TaskChanges};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryTaskStore;
pub use self::redis::RedisTaskStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid task identifier: {0}")]
    InvalidId(String),

    #[error("database error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    CreatedAtDescending,
    CreatedAtAscending,
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task, assigning its identifier and timestamps.
    async fn insert(&self, task: NewTask) -> StoreResult<Task>;

    async fn find_all(&self, order: SortOrder) -> StoreResult<Vec<Task>>;

    /// Returns `None` when no task has this identifier.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Task>>;

    /// Applies `changes`, refreshes `updatedAt`, and returns the stored result.
    ///
    /// Returns `None` when no task has this identifier.
    async fn update_by_id(&self, id: &str, changes: TaskChanges) -> StoreResult<Option<Task>>;

    /// Returns `false` when no task has this identifier.
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool>;
}

/// Stable sort on `created_at`, so equal timestamps keep their incoming order.
pub fn sort_by_created_at(tasks: &mut [Task], order: SortOrder) {
    match order {
        SortOrder::CreatedAtAscending => tasks.sort_by_key(|task| task.created_at),
        SortOrder::CreatedAtDescending => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// # Errors
///
/// Returns `StoreError::InvalidId` when `raw` is not a UUID.
pub fn parse_task_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
