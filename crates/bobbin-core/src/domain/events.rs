//! Events - pool で発生したイベント
//!
//! Pool / worker は直接ログを書かず、`PoolEvent` を EventSink に渡す。
//! ログに落とすかどうか、どのレベルで落とすかは sink 側が決める。

use std::fmt;
use std::time::Duration;

use super::{TaskId, TaskType};

/// Severity of an event, mirroring the usual debug/info/warn/error levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Why a submitted task never made it into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    QueueFull,
    QueueClosed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::QueueFull => f.write_str("queue full"),
            DropReason::QueueClosed => f.write_str("queue closed"),
        }
    }
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The queue was closed and every queued task was taken.
    Drained,
    /// The quit signal fired; any backlog was left behind.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Drained => f.write_str("drained"),
            StopReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PoolEvent {
    PoolStarted {
        worker_count: usize,
        queue_capacity: usize,
    },
    WorkerStarted {
        worker_id: usize,
    },
    WorkerStopped {
        worker_id: usize,
        reason: StopReason,
    },
    TaskAccepted {
        task_id: TaskId,
    },
    TaskDropped {
        task_id: TaskId,
        reason: DropReason,
    },
    TaskStarted {
        worker_id: usize,
        task_id: TaskId,
        task_type: TaskType,
    },
    TaskCompleted {
        worker_id: usize,
        task_id: TaskId,
        duration: Duration,
    },
    TaskFailed {
        worker_id: usize,
        task_id: TaskId,
        error: String,
    },
    UnknownTaskType {
        worker_id: usize,
        task_id: TaskId,
        task_type: TaskType,
    },
    StopRequested,
    DrainStarted {
        queued: usize,
    },
    BacklogAbandoned {
        count: usize,
    },
    ShutdownTimedOut {
        timeout: Duration,
    },
    PoolStopped,
}

impl PoolEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            PoolEvent::TaskAccepted { .. } | PoolEvent::TaskStarted { .. } => EventLevel::Debug,
            PoolEvent::TaskDropped { .. }
            | PoolEvent::UnknownTaskType { .. }
            | PoolEvent::BacklogAbandoned { .. }
            | PoolEvent::ShutdownTimedOut { .. } => EventLevel::Warn,
            PoolEvent::TaskFailed { .. } => EventLevel::Error,
            _ => EventLevel::Info,
        }
    }

    /// Task the event refers to, if any.
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            PoolEvent::TaskAccepted { task_id }
            | PoolEvent::TaskDropped { task_id, .. }
            | PoolEvent::TaskStarted { task_id, .. }
            | PoolEvent::TaskCompleted { task_id, .. }
            | PoolEvent::TaskFailed { task_id, .. }
            | PoolEvent::UnknownTaskType { task_id, .. } => Some(task_id),
            _ => None,
        }
    }
}
