//! Errors - pool 境界を越えるエラー
//!
//! タスク単位の失敗（queue full / unknown type / handler failure）は
//! ここには現れない。それらは EventSink に流して握りつぶす。

use std::time::Duration;

use thiserror::Error;

use super::{DropReason, PoolState, Task};

/// Errors returned by the pool lifecycle operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// `start` was called on a pool that is not in `Created`.
    #[error("pool cannot be started in state {0}")]
    NotStartable(PoolState),

    /// The workers did not finish draining before the deadline.
    /// They keep running in the background.
    #[error("shutdown timed out after {0:?}; workers still running")]
    ShutdownTimeout(Duration),
}

/// A task `Pool::try_submit` could not enqueue, handed back to the caller.
#[derive(Debug, Error)]
#[error("task {} rejected: {reason}", .task.id())]
pub struct Rejected {
    pub task: Task,
    pub reason: DropReason,
}

impl Rejected {
    pub fn into_task(self) -> Task {
        self.task
    }
}

/// Failure reported by a task handler.
///
/// The worker logs it and discards the task; it never reaches the pool's caller.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("payload decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
