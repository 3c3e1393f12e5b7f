//! TracingEventSink - PoolEvent を tracing に流す
//!
//! レベルは `PoolEvent::level()` に従う。ここでは fields と message だけを決める。

use tracing::{debug, error, info, warn};

use crate::domain::{EventLevel, PoolEvent};
use crate::ports::EventSink;

// tracing の macro はレベルを静的に要求するので、ここで分岐する
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            EventLevel::Debug => debug!($($arg)+),
            EventLevel::Info => info!($($arg)+),
            EventLevel::Warn => warn!($($arg)+),
            EventLevel::Error => error!($($arg)+),
        }
    };
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: &PoolEvent) {
        let level = event.level();
        match event {
            PoolEvent::PoolStarted {
                worker_count,
                queue_capacity,
            } => log_at!(level, worker_count, queue_capacity, "pool started"),
            PoolEvent::WorkerStarted { worker_id } => log_at!(level, worker_id, "worker started"),
            PoolEvent::WorkerStopped { worker_id, reason } => {
                log_at!(level, worker_id, reason = %reason, "worker stopped")
            }
            PoolEvent::TaskAccepted { task_id } => {
                log_at!(level, task_id = %task_id, "task queued")
            }
            PoolEvent::TaskDropped { task_id, reason } => {
                log_at!(level, task_id = %task_id, reason = %reason, "task dropped")
            }
            PoolEvent::TaskStarted {
                worker_id,
                task_id,
                task_type,
            } => log_at!(
                level,
                worker_id,
                task_id = %task_id,
                task_type = %task_type,
                "task started"
            ),
            PoolEvent::TaskCompleted {
                worker_id,
                task_id,
                duration,
            } => log_at!(
                level,
                worker_id,
                task_id = %task_id,
                duration_ms = duration.as_millis() as u64,
                "task completed"
            ),
            PoolEvent::TaskFailed {
                worker_id,
                task_id,
                error,
            } => log_at!(level, worker_id, task_id = %task_id, error = %error, "task failed"),
            PoolEvent::UnknownTaskType {
                worker_id,
                task_id,
                task_type,
            } => log_at!(
                level,
                worker_id,
                task_id = %task_id,
                task_type = %task_type,
                "unknown task type"
            ),
            PoolEvent::StopRequested => log_at!(level, "stop requested, abandoning backlog"),
            PoolEvent::DrainStarted { queued } => log_at!(level, queued, "draining queue"),
            PoolEvent::BacklogAbandoned { count } => log_at!(level, count, "queued tasks abandoned"),
            PoolEvent::ShutdownTimedOut { timeout } => log_at!(
                level,
                timeout_ms = timeout.as_millis() as u64,
                "shutdown timed out, workers left running"
            ),
            PoolEvent::PoolStopped => log_at!(level, "pool stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use rstest::rstest;

    use super::*;
    use crate::domain::{DropReason, StopReason, TaskId, TaskType};

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged(event: &PoolEvent) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || TracingEventSink::new().emit(event));
        captured.text()
    }

    fn level_name(level: EventLevel) -> &'static str {
        match level {
            EventLevel::Debug => "DEBUG",
            EventLevel::Info => "INFO",
            EventLevel::Warn => "WARN",
            EventLevel::Error => "ERROR",
        }
    }

    #[rstest]
    #[case::pool_started(PoolEvent::PoolStarted { worker_count: 2, queue_capacity: 4 })]
    #[case::worker_stopped(PoolEvent::WorkerStopped { worker_id: 1, reason: StopReason::Drained })]
    #[case::accepted(PoolEvent::TaskAccepted { task_id: TaskId::new("t") })]
    #[case::dropped(PoolEvent::TaskDropped { task_id: TaskId::new("t"), reason: DropReason::QueueFull })]
    #[case::completed(PoolEvent::TaskCompleted {
        worker_id: 1,
        task_id: TaskId::new("t"),
        duration: Duration::from_millis(5),
    })]
    #[case::failed(PoolEvent::TaskFailed {
        worker_id: 1,
        task_id: TaskId::new("t"),
        error: "boom".into(),
    })]
    #[case::unknown_type(PoolEvent::UnknownTaskType {
        worker_id: 1,
        task_id: TaskId::new("t"),
        task_type: TaskType::new("bogus"),
    })]
    #[case::abandoned(PoolEvent::BacklogAbandoned { count: 3 })]
    #[case::timed_out(PoolEvent::ShutdownTimedOut { timeout: Duration::from_secs(1) })]
    #[case::stopped(PoolEvent::PoolStopped)]
    fn logs_each_event_at_its_level(#[case] event: PoolEvent) {
        let line = logged(&event);
        let first = line.split_whitespace().next().unwrap_or_default();
        assert_eq!(first, level_name(event.level()), "output: {line}");
    }

    #[test]
    fn queue_full_drop_is_a_warning_with_fields() {
        let line = logged(&PoolEvent::TaskDropped {
            task_id: TaskId::new("T2"),
            reason: DropReason::QueueFull,
        });
        assert!(line.trim_start().starts_with("WARN"), "output: {line}");
        assert!(line.contains("task dropped"));
        assert!(line.contains("task_id=T2"));
        assert!(line.contains("reason=queue full"));
    }
}
