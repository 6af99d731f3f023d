//! Redis-backed task store.
//!
//! # Key Design
//!
//! - `task:{id}` -> JSON document
//! - `tasks:by_created` -> ZSET of ids scored by `createdAt` in microseconds
//!
//! Equal scores come back in member order, so listings are re-sorted on the
//! decoded `createdAt` before they are returned.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use task_shared::{NewTask, Task, TaskChanges};
use uuid::Uuid;

use super::{parse_task_id, sort_by_created_at, SortOrder, StoreError, StoreResult, TaskStore};

const TASK_KEY_PREFIX: &str = "task:";
const CREATED_INDEX_KEY: &str = "tasks:by_created";

// Merges the supplied fields into the stored document in one step. Returns nil when
// the document does not exist so a concurrent delete is never undone.
const UPDATE_SCRIPT: &str = r"
local existing = redis.call('GET', KEYS[1])
if not existing then
    return false
end
local task = cjson.decode(existing)
for field, value in pairs(cjson.decode(ARGV[1])) do
    task[field] = value
end
task['updatedAt'] = ARGV[2]
local updated = cjson.encode(task)
redis.call('SET', KEYS[1], updated)
return updated
";

fn task_key(id: &Uuid) -> String {
    format!("{TASK_KEY_PREFIX}{id}")
}

fn connection_error(error: redis::RedisError) -> StoreError {
    StoreError::Connection(error.to_string())
}

fn decode(json: &str) -> StoreResult<Task> {
    serde_json::from_str(json).map_err(|error| StoreError::Serialization(error.to_string()))
}

#[derive(Clone)]
pub struct RedisTaskStore {
    connection: ConnectionManager,
    update_script: Script,
}

impl RedisTaskStore {
    /// Opens the long-lived connection shared by every request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` when the URL is invalid or the server is unreachable.
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        let client = Client::open(redis_url).map_err(connection_error)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(connection_error)?;
        Ok(Self {
            connection,
            update_script: Script::new(UPDATE_SCRIPT),
        })
    }
}

#[async_trait]
impl TaskStore for RedisTaskStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let task = Task::new(Uuid::new_v4(), task, Utc::now());
        let json = serde_json::to_string(&task)
            .map_err(|error| StoreError::Serialization(error.to_string()))?;

        let mut connection = self.connection.clone();
        redis::pipe()
            .atomic()
            .set(task_key(&task.id), json)
            .ignore()
            .zadd(
                CREATED_INDEX_KEY,
                task.id.to_string(),
                task.created_at.timestamp_micros(),
            )
            .ignore()
            .query_async::<_, ()>(&mut connection)
            .await
            .map_err(connection_error)?;

        Ok(task)
    }

    async fn find_all(&self, order: SortOrder) -> StoreResult<Vec<Task>> {
        let mut connection = self.connection.clone();
        let ids: Vec<String> = match order {
            SortOrder::CreatedAtDescending => connection.zrevrange(CREATED_INDEX_KEY, 0, -1).await,
            SortOrder::CreatedAtAscending => connection.zrange(CREATED_INDEX_KEY, 0, -1).await,
        }
        .map_err(connection_error)?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids
            .iter()
            .map(|id| format!("{TASK_KEY_PREFIX}{id}"))
            .collect();
        let documents: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut connection)
            .await
            .map_err(connection_error)?;

        // Documents removed between the two reads are skipped.
        let mut tasks = documents
            .iter()
            .flatten()
            .map(|json| decode(json))
            .collect::<StoreResult<Vec<Task>>>()?;
        sort_by_created_at(&mut tasks, order);
        Ok(tasks)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Task>> {
        let id = parse_task_id(id)?;
        let mut connection = self.connection.clone();
        let json: Option<String> = connection
            .get(task_key(&id))
            .await
            .map_err(connection_error)?;
        json.as_deref().map(decode).transpose()
    }

    async fn update_by_id(&self, id: &str, changes: TaskChanges) -> StoreResult<Option<Task>> {
        let id = parse_task_id(id)?;
        let changes = serde_json::to_string(&changes)
            .map_err(|error| StoreError::Serialization(error.to_string()))?;
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true);

        let mut connection = self.connection.clone();
        let json: Option<String> = self
            .update_script
            .key(task_key(&id))
            .arg(changes)
            .arg(updated_at)
            .invoke_async(&mut connection)
            .await
            .map_err(connection_error)?;
        json.as_deref().map(decode).transpose()
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let id = parse_task_id(id)?;
        let mut connection = self.connection.clone();
        let (deleted, _unindexed): (u64, u64) = redis::pipe()
            .atomic()
            .del(task_key(&id))
            .zrem(CREATED_INDEX_KEY, id.to_string())
            .query_async(&mut connection)
            .await
            .map_err(connection_error)?;
        Ok(deleted > 0)
    }
}
