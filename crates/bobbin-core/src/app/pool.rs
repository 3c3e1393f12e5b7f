//! Pool - worker 群と bounded queue の管理
//!
//! # 停止の二経路
//! - **cancel**（`start` に渡した token / `stop()`）: quit を立てて即停止。queue の残りは捨てる
//! - **shutdown**（deadline 付き）: queue を閉じて残りを流し切るのを待つ
//!
//! どちらも同じ状態機械（`PoolState`）を前に進めるだけ。
//! 同時に来た場合は cancel が勝つ（stopping > draining）。

use std::sync::Arc;
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use super::worker_loop::WorkerLoop;
use crate::domain::{DropReason, PoolError, PoolEvent, PoolState, Rejected, Task};
use crate::observability::{PoolStats, StatsSnapshot};
use crate::ports::EventSink;
use crate::typed::HandlerRegistry;

// Instant + Duration::MAX overflows.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// State shared by the pool handle and every worker.
pub(crate) struct PoolInner {
    pub(crate) worker_count: usize,
    pub(crate) queue_capacity: usize,
    pub(crate) queue_tx: Sender<Task>,
    pub(crate) queue_rx: Receiver<Task>,
    pub(crate) registry: HandlerRegistry,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) stats: PoolStats,
    /// Raised once to make every worker leave without draining.
    pub(crate) quit: CancellationToken,
    /// Join barrier over the workers.
    tracker: TaskTracker,
    state: watch::Sender<PoolState>,
}

impl PoolInner {
    pub(crate) fn emit(&self, event: PoolEvent) {
        self.sink.emit(&event);
    }

    /// Move the state forward to `to`. Never moves backwards.
    fn advance(&self, to: PoolState) -> bool {
        self.state.send_if_modified(|state| {
            if *state < to {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    fn transition(&self, from: PoolState, to: PoolState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    /// Stop a pool whose workers were never spawned. Returns false if it was already started.
    fn stop_unstarted(&self) -> bool {
        if !self.transition(PoolState::Created, PoolState::Stopped) {
            return false;
        }
        self.queue_tx.close();
        self.tracker.close();
        self.report_abandoned();
        self.emit(PoolEvent::PoolStopped);
        true
    }

    /// Called once every worker has exited. Only the first caller reports.
    fn finish(&self) {
        if !self.advance(PoolState::Stopped) {
            return;
        }
        self.report_abandoned();
        self.emit(PoolEvent::PoolStopped);
    }

    fn report_abandoned(&self) {
        let count = self.queue_rx.len();
        if count > 0 {
            self.stats.record_abandoned(count);
            self.emit(PoolEvent::BacklogAbandoned { count });
        }
    }
}

/// A fixed-size pool of workers draining a bounded task queue.
///
/// Cheap to clone; every clone drives the same pool.
///
/// # 使用例
/// ```ignore
/// let pool = PoolBuilder::new(4).queue_capacity(64).with_builtin_handlers()?.build()?;
/// let cancel = CancellationToken::new();
/// let runner = tokio::spawn({
///     let pool = pool.clone();
///     let cancel = cancel.clone();
///     async move { pool.start(cancel).await }
/// });
///
/// pool.submit(task);
/// pool.shutdown(Duration::from_secs(30)).await?;
/// ```
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    pub(crate) fn new(
        worker_count: usize,
        queue_capacity: usize,
        registry: HandlerRegistry,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (queue_tx, queue_rx) = async_channel::bounded(queue_capacity);
        let (state, _) = watch::channel(PoolState::Created);
        Self {
            inner: Arc::new(PoolInner {
                worker_count,
                queue_capacity,
                queue_tx,
                queue_rx,
                registry,
                sink,
                stats: PoolStats::default(),
                quit: CancellationToken::new(),
                tracker: TaskTracker::new(),
                state,
            }),
        }
    }

    /// Spawn the workers and run until `cancel` fires, `stop` is called, or a
    /// `shutdown` has drained every worker.
    ///
    /// Cancellation abandons whatever is still queued. Returns once all workers
    /// have exited. Can only be called once.
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), PoolError> {
        let inner = &self.inner;
        if !inner.transition(PoolState::Created, PoolState::Running) {
            return Err(PoolError::NotStartable(self.state()));
        }

        inner.emit(PoolEvent::PoolStarted {
            worker_count: inner.worker_count,
            queue_capacity: inner.queue_capacity,
        });

        for worker_id in 1..=inner.worker_count {
            let worker = WorkerLoop::new(worker_id, Arc::clone(inner));
            inner
                .tracker
                .spawn(worker.run().instrument(tracing::info_span!("worker", worker_id)));
        }
        inner.tracker.close();

        tokio::select! {
            _ = cancel.cancelled() => self.stop(),
            _ = inner.quit.cancelled() => {}
            _ = inner.tracker.wait() => {}
        }

        inner.tracker.wait().await;
        inner.finish();
        Ok(())
    }

    /// Raise the quit signal: stop intake and make every worker leave after
    /// its current task, without draining the queue.
    pub fn stop(&self) {
        let inner = &self.inner;
        if inner.stop_unstarted() {
            return;
        }
        if inner.advance(PoolState::Stopping) {
            inner.emit(PoolEvent::StopRequested);
        }
        inner.queue_tx.close();
        inner.quit.cancel();
    }

    /// Enqueue without blocking. A full or closed queue drops the task with a warning.
    pub fn submit(&self, task: Task) {
        if let Err(rejected) = self.try_submit(task) {
            self.inner.stats.record_dropped();
            self.inner.emit(PoolEvent::TaskDropped {
                task_id: rejected.task.id().clone(),
                reason: rejected.reason,
            });
        }
    }

    /// Enqueue without blocking, handing the task back if it cannot be queued.
    ///
    /// Rejections are not logged or counted; the caller owns the task again.
    pub fn try_submit(&self, task: Task) -> Result<(), Rejected> {
        let task_id = task.id().clone();
        match self.inner.queue_tx.try_send(task) {
            Ok(()) => {
                self.inner.stats.record_accepted();
                self.inner.emit(PoolEvent::TaskAccepted { task_id });
                Ok(())
            }
            Err(TrySendError::Full(task)) => Err(Rejected {
                task,
                reason: DropReason::QueueFull,
            }),
            Err(TrySendError::Closed(task)) => Err(Rejected {
                task,
                reason: DropReason::QueueClosed,
            }),
        }
    }

    /// Close the queue and wait up to `timeout` for the queued tasks to drain.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), PoolError> {
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        self.shutdown_until(deadline).await
    }

    /// Close the queue and wait until `deadline` for the queued tasks to drain.
    ///
    /// On timeout the workers are left running; a later call may wait again.
    pub async fn shutdown_until(&self, deadline: Instant) -> Result<(), PoolError> {
        let inner = &self.inner;
        let budget = deadline.saturating_duration_since(Instant::now());

        if inner.stop_unstarted() || self.state() == PoolState::Stopped {
            return Ok(());
        }

        if inner.advance(PoolState::Draining) {
            inner.emit(PoolEvent::DrainStarted {
                queued: inner.queue_rx.len(),
            });
        }
        inner.queue_tx.close();

        match tokio::time::timeout_at(deadline, inner.tracker.wait()).await {
            Ok(()) => {
                inner.finish();
                Ok(())
            }
            Err(_) => {
                inner.emit(PoolEvent::ShutdownTimedOut { timeout: budget });
                Err(PoolError::ShutdownTimeout(budget))
            }
        }
    }

    pub fn state(&self) -> PoolState {
        *self.inner.state.borrow()
    }

    pub fn worker_count(&self) -> usize {
        self.inner.worker_count
    }

    pub fn queue_capacity(&self) -> usize {
        self.inner.queue_capacity
    }

    /// Number of tasks currently waiting in the queue.
    pub fn queued(&self) -> usize {
        self.inner.queue_rx.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }
}
