//! WorkerLoop - タスク実行ループ
//!
//! # フロー
//! 1. quit signal と queue.recv() を select で待つ（quit を優先）
//! 2. task_type から handler を引く（なければ warn して捨てる）
//! 3. handler 実行（panic も含めて worker 内で握りつぶす）
//! 4. 結果を EventSink と stats に反映

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;

use super::pool::PoolInner;
use crate::domain::{PoolEvent, StopReason, Task};

/// One worker of the pool. Processes a single task at a time.
pub(crate) struct WorkerLoop {
    worker_id: usize,
    inner: Arc<PoolInner>,
}

impl WorkerLoop {
    pub(crate) fn new(worker_id: usize, inner: Arc<PoolInner>) -> Self {
        Self { worker_id, inner }
    }

    /// Run until the queue is closed and drained, or the quit signal fires.
    pub(crate) async fn run(self) {
        let worker_id = self.worker_id;
        self.inner.emit(PoolEvent::WorkerStarted { worker_id });

        let reason = loop {
            let task = tokio::select! {
                biased;
                _ = self.inner.quit.cancelled() => break StopReason::Cancelled,
                next = self.inner.queue_rx.recv() => match next {
                    Ok(task) => task,
                    // closed かつ空
                    Err(_) => break StopReason::Drained,
                },
            };
            self.process(task).await;
        };

        self.inner.emit(PoolEvent::WorkerStopped { worker_id, reason });
    }

    async fn process(&self, task: Task) {
        let worker_id = self.worker_id;
        let inner = &self.inner;

        let Some(handler) = inner.registry.get(task.task_type()) else {
            inner.stats.record_unknown_type();
            inner.emit(PoolEvent::UnknownTaskType {
                worker_id,
                task_id: task.id().clone(),
                task_type: task.task_type().clone(),
            });
            return;
        };

        inner.emit(PoolEvent::TaskStarted {
            worker_id,
            task_id: task.id().clone(),
            task_type: task.task_type().clone(),
        });

        // handler の await 中に quit が来ても中断しない（次のループで抜ける）
        let started = Instant::now();
        let result = AssertUnwindSafe(handler.handle(&task)).catch_unwind().await;

        let task_id = task.id().clone();
        match result {
            Ok(Ok(())) => {
                inner.stats.record_processed();
                inner.emit(PoolEvent::TaskCompleted {
                    worker_id,
                    task_id,
                    duration: started.elapsed(),
                });
            }
            Ok(Err(err)) => {
                inner.stats.record_failed();
                inner.emit(PoolEvent::TaskFailed {
                    worker_id,
                    task_id,
                    error: err.to_string(),
                });
            }
            Err(panic) => {
                inner.stats.record_failed();
                inner.emit(PoolEvent::TaskFailed {
                    worker_id,
                    task_id,
                    error: format!("handler panicked: {}", panic_message(panic.as_ref())),
                });
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
