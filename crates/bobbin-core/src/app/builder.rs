//! PoolBuilder - pool の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 依存（EventSink, handler）はコンストラクタで注入する

use std::sync::Arc;

use crate::config::PoolConfig;
use crate::impls::{TracingEventSink, register_builtin};
use crate::ports::EventSink;
use crate::typed::{Handler, HandlerRegistry, RegistryError, TaskHandler, TaskPayload};

use super::pool::Pool;

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// PoolBuilder は Pool を構築
///
/// # 使用例
/// ```ignore
/// let pool = PoolBuilder::new(4)
///     .queue_capacity(256)
///     .event_sink(Arc::new(TracingEventSink))
///     .register_typed::<EmailTask, _>(EmailHandler::new())?
///     .expect_tasks(&["email"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - worker 数 0 / queue 容量 0 は build() で拒否
/// - expect_tasks() で指定した task_type が未登録なら build() で拒否
pub struct PoolBuilder {
    worker_count: usize,
    queue_capacity: usize,
    sink: Option<Arc<dyn EventSink>>,
    registry: HandlerRegistry,
    expected_tasks: Option<Vec<String>>,
}

/// BuildError は pool 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("queue capacity must be at least 1")]
    InvalidQueueCapacity,

    #[error("Missing task types: {0:?}. These tasks were expected but not registered.")]
    MissingTaskTypes(Vec<String>),
}

impl PoolBuilder {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            sink: None,
            registry: HandlerRegistry::new(),
            expected_tasks: None,
        }
    }

    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(config.worker_count).queue_capacity(config.queue_capacity)
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Where pool events go. Defaults to [`TracingEventSink`].
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn register(
        mut self,
        task_type: &str,
        handler: Arc<dyn TaskHandler>,
    ) -> Result<Self, RegistryError> {
        self.registry.register(task_type, handler)?;
        Ok(self)
    }

    pub fn register_typed<P: TaskPayload, H: Handler<P> + 'static>(
        mut self,
        handler: H,
    ) -> Result<Self, RegistryError> {
        self.registry.register_typed::<P, H>(handler)?;
        Ok(self)
    }

    /// Register the email / notification / data_processing handlers.
    pub fn with_builtin_handlers(mut self) -> Result<Self, RegistryError> {
        register_builtin(&mut self.registry)?;
        Ok(self)
    }

    pub fn expect_tasks(mut self, task_types: &[&str]) -> Self {
        self.expected_tasks = Some(task_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<Pool, BuildError> {
        if self.worker_count == 0 {
            return Err(BuildError::InvalidWorkerCount(self.worker_count));
        }
        if self.queue_capacity == 0 {
            return Err(BuildError::InvalidQueueCapacity);
        }
        if let Some(expected_tasks) = &self.expected_tasks {
            let missing_tasks: Vec<String> = expected_tasks
                .iter()
                .filter(|t| !self.registry.contains(t))
                .cloned()
                .collect();
            if !missing_tasks.is_empty() {
                return Err(BuildError::MissingTaskTypes(missing_tasks));
            }
        }

        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingEventSink::new()));
        Ok(Pool::new(
            self.worker_count,
            self.queue_capacity,
            self.registry,
            sink,
        ))
    }
}
