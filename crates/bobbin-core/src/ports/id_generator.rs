//! IdGenerator port - TaskId 生成の抽象化
//!
//! Pool 自体は TaskId を検証も生成もしない（producer が付ける）。
//! これは producer 側が使うためのヘルパー。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース。`task-` プレフィックス付き

use ulid::Ulid;

use crate::domain::TaskId;
use crate::ports::Clock;

/// IdGenerator は producer 向けに TaskId を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数の producer から使える）
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> TaskId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// テスト時に FixedClock を使えば timestamp 部分が固定されます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self) -> TaskId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        TaskId::new(format!("task-{ulid}"))
    }
}
