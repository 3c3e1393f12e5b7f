//! Task - pool が扱う作業単位
//!
//! Wire shape: `{"id": "...", "type": "...", "data": {...}}`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload of a task: a JSON object (string keys, arbitrary values).
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Opaque, producer-assigned identifier of a task.
///
/// The pool never checks it for uniqueness; it is only carried into events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Task type tag, used as the dispatch key of the handler registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Immutable unit of work: id + type tag + payload.
///
/// `Pool::submit` takes a `Task` by value, so a task can be enqueued at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    #[serde(rename = "type")]
    task_type: TaskType,
    #[serde(rename = "data", default)]
    payload: Payload,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, task_type: impl Into<TaskType>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            task_type: task_type.into(),
            payload,
        }
    }

    /// Build a task from a JSON value; anything but an object becomes an empty payload.
    pub fn from_json(
        id: impl Into<TaskId>,
        task_type: impl Into<TaskType>,
        data: serde_json::Value,
    ) -> Self {
        let payload = match data {
            serde_json::Value::Object(map) => map,
            _ => Payload::new(),
        };
        Self::new(id, task_type, payload)
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
