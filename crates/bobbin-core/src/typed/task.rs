//! TaskPayload trait - task_type と payload の型を対応付ける
//!
//! # 学習ポイント
//! - Associated Constants (`const TYPE`)
//! - Trait bounds の組み合わせ (Serialize + DeserializeOwned + Send + Sync + 'static)

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{Task, TaskId, TaskType};

/// TaskPayload は task_type と payload の型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct ResizeImage {
///     path: String,
/// }
///
/// impl TaskPayload for ResizeImage {
///     const TYPE: &'static str = "resize_image";
/// }
/// ```
pub trait TaskPayload: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE: &'static str;

    fn task_type() -> TaskType {
        TaskType::new(Self::TYPE)
    }

    /// Wrap this payload into a [`Task`] tagged with `Self::TYPE`.
    fn into_task(&self, id: impl Into<TaskId>) -> Result<Task, serde_json::Error> {
        let data = serde_json::to_value(self)?;
        Ok(Task::from_json(id, Self::task_type(), data))
    }
}
