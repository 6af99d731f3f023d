//! Task record and request payloads shared by the API and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum number of characters in a trimmed title.
pub const TITLE_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a record for a freshly inserted task, both timestamps set to `now`.
    pub fn new(id: Uuid, fields: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            completed: fields.completed,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// `title` keeps an explicit `null` (`Some(None)`) apart from an absent field (`None`):
/// a null title is rejected as missing, an absent one leaves the stored title alone.
/// `description` and `completed` treat `null` as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Validated fields of a task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub completed: bool,
}

/// Validated field changes for an existing task. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task title is required")]
    TitleRequired,
    #[error("Title must be at least 3 characters long")]
    TitleTooShort,
}

/// Trims a title and enforces the minimum length.
pub fn validate_title(raw: Option<&str>) -> Result<String, ValidationError> {
    let title = raw.ok_or(ValidationError::TitleRequired)?.trim();
    if title.chars().count() < TITLE_MIN_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    Ok(title.to_string())
}

// Only called for fields present in the input; `#[serde(default)]` covers absent ones.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn normalize_description(raw: &str) -> String {
    raw.trim().to_string()
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<NewTask, ValidationError> {
        Ok(NewTask {
            title: validate_title(self.title.as_deref())?,
            description: self
                .description
                .as_deref()
                .map(normalize_description)
                .unwrap_or_default(),
            completed: self.completed.unwrap_or(false),
        })
    }
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<TaskChanges, ValidationError> {
        let title = match &self.title {
            Some(title) => Some(validate_title(title.as_deref())?),
            None => None,
        };
        Ok(TaskChanges {
            title,
            description: self.description.as_deref().map(normalize_description),
            completed: self.completed,
        })
    }
}
