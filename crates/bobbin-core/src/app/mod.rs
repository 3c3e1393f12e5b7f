//! App - アプリケーション層
//!
//! domain / typed / ports を組み合わせて pool を組み立てる。
//!
//! # 主要コンポーネント
//! - **PoolBuilder**: pool の構築とワイヤリング（起動時検証）
//! - **Pool**: queue と worker 群の管理、停止の状態機械
//! - **WorkerLoop**: タスク実行ループ（recv→dispatch→handle→report）

pub mod builder;
pub mod pool;
mod worker_loop;

pub use self::builder::{BuildError, DEFAULT_QUEUE_CAPACITY, PoolBuilder};
pub use self::pool::Pool;
