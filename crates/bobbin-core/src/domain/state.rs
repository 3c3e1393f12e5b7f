//! State - pool のライフサイクル状態
//!
//! # 状態遷移
//! - created → running: `Pool::start`
//! - running → draining: `Pool::shutdown`（queue を閉じて残りを処理）
//! - running/draining → stopping: cancel（残りの queue は処理しない）
//! - * → stopped: 全 worker 終了
//!
//! 状態は前にしか進まない。stopping は draining より後ろなので、
//! drain 中に cancel が来たら cancel が勝つ。

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    Created,
    Running,
    Draining,
    Stopping,
    Stopped,
}

impl PoolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolState::Created => "created",
            PoolState::Running => "running",
            PoolState::Draining => "draining",
            PoolState::Stopping => "stopping",
            PoolState::Stopped => "stopped",
        }
    }

    /// Whether the pool still accepts new tasks into its queue.
    pub fn accepts_tasks(&self) -> bool {
        matches!(self, PoolState::Created | PoolState::Running)
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
