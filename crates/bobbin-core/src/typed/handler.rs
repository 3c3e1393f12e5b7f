//! Handler traits - Task を処理する handler の定義
//!
//! # 二層構造
//! - **TaskHandler**: object-safe。registry に `Arc<dyn TaskHandler>` として格納される
//! - **Handler<P>**: 型付き。payload を `P` に decode してから呼ばれる
//!
//! `TypedHandler<P, H>` が `Handler<P>` を `TaskHandler` に変換する（type erasure）。

use std::marker::PhantomData;

use async_trait::async_trait;

use super::task::TaskPayload;
use crate::domain::{HandlerError, Task};

/// A handler for one task type.
///
/// Runs inside a worker; the worker awaits it before taking the next task.
/// Errors are reported through the pool's event sink and the task is discarded.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task: &Task) -> Result<(), HandlerError>;
}

/// Typed handler: receives the payload already decoded into `P`.
///
/// # 使用例
/// ```ignore
/// struct ResizeHandler;
///
/// #[async_trait]
/// impl Handler<ResizeImage> for ResizeHandler {
///     async fn handle(&self, task: &Task, payload: ResizeImage) -> Result<(), HandlerError> {
///         resize(&payload.path).await.map_err(|e| HandlerError::failed(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<P: TaskPayload>: Send + Sync {
    async fn handle(&self, task: &Task, payload: P) -> Result<(), HandlerError>;
}

pub struct TypedHandler<P: TaskPayload, H: Handler<P>> {
    handler: H,
    _marker: PhantomData<fn() -> P>,
}

impl<P: TaskPayload, H: Handler<P>> TypedHandler<P, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<P: TaskPayload, H: Handler<P>> TaskHandler for TypedHandler<P, H> {
    async fn handle(&self, task: &Task) -> Result<(), HandlerError> {
        let value = serde_json::Value::Object(task.payload().clone());
        let payload: P = serde_json::from_value(value)?;
        self.handler.handle(task, payload).await
    }
}
