//! Impls - ports の実装と組み込み handler
//!
//! # 含まれる実装
//! - **TracingEventSink**: tracing へのログ出力
//! - **MemoryEventSink** / **NoopEventSink**: テスト・組み込み用
//! - **handlers**: email / notification / data_processing

pub mod handlers;
pub mod memory_sink;
pub mod tracing_sink;

pub use self::handlers::register_builtin;
pub use self::memory_sink::{MemoryEventSink, NoopEventSink};
pub use self::tracing_sink::TracingEventSink;
