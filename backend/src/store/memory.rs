//! In-memory task store for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use task_shared::{NewTask, Task, TaskChanges};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{parse_task_id, sort_by_created_at, SortOrder, StoreResult, TaskStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    tasks: HashMap<Uuid, Task>,
    // Insertion order, oldest first. Breaks ties between equal `created_at` values.
    order: Vec<Uuid>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let task = Task::new(Uuid::new_v4(), task, Utc::now());
        let mut state = self.state.write().await;
        state.order.push(task.id);
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_all(&self, order: SortOrder) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .order
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect();
        if order == SortOrder::CreatedAtDescending {
            tasks.reverse();
        }
        sort_by_created_at(&mut tasks, order);
        Ok(tasks)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Task>> {
        let id = parse_task_id(id)?;
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn update_by_id(&self, id: &str, changes: TaskChanges) -> StoreResult<Option<Task>> {
        let id = parse_task_id(id)?;
        let mut state = self.state.write().await;
        let Some(task) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(task);
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let id = parse_task_id(id)?;
        let mut state = self.state.write().await;
        if state.tasks.remove(&id).is_none() {
            return Ok(false);
        }
        state.order.retain(|existing| *existing != id);
        Ok(true)
    }
}
