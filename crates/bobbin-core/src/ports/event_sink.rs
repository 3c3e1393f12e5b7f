//! EventSink port - pool のログ出力先の抽象化
//!
//! Pool は構築時に `Arc<dyn EventSink>` を受け取る（グローバルな logger は持たない）。
//!
//! # 実装
//! - `TracingEventSink`: tracing に流す（本番用）
//! - `MemoryEventSink`: メモリに貯める（テスト用）
//! - `NoopEventSink`: 何もしない

use crate::domain::PoolEvent;

/// Receives every event the pool and its workers produce.
///
/// Called from the producer's thread (`submit`) and from worker tasks, so
/// implementations must be cheap and must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PoolEvent);
}
