//! bobbin-core
//!
//! A fixed-size worker pool draining a bounded task queue.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（task, state, events, errors）
//! - **typed**: handler 登録（TaskHandler, Handler<P>, HandlerRegistry, TaskPayload）
//! - **ports**: 抽象化レイヤー（EventSink, Clock, IdGenerator）
//! - **app**: pool 本体（PoolBuilder, Pool, worker loop）
//! - **impls**: 実装（TracingEventSink, MemoryEventSink, 組み込み handler）
//! - **config**: 設定の読み込みと検証
//! - **observability**: pool のカウンタ

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod typed;

pub use app::{BuildError, Pool, PoolBuilder};
pub use config::{ConfigError, PoolConfig};
pub use domain::{HandlerError, PoolError, PoolEvent, PoolState, Rejected, Task, TaskId, TaskType};
pub use observability::StatsSnapshot;
pub use ports::EventSink;
pub use typed::{Handler, HandlerRegistry, TaskHandler, TaskPayload};
