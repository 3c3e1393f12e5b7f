//! Built-in handlers: email, notification, data_processing.
//!
//! どれも外部への送信はシミュレーション（sleep）のみ。
//! payload の欠けたフィールドは空文字 / 0 として扱う。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{HandlerError, Task};
use crate::typed::{Handler, HandlerRegistry, RegistryError, TaskPayload};

/// Upper bound on the simulated data processing time.
pub const MAX_DATA_PROCESSING: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailTask {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl TaskPayload for EmailTask {
    const TYPE: &'static str = "email";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationTask {
    pub user_id: String,
    pub message: String,
}

impl TaskPayload for NotificationTask {
    const TYPE: &'static str = "notification";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataProcessingTask {
    pub size: u64,
}

impl TaskPayload for DataProcessingTask {
    const TYPE: &'static str = "data_processing";
}

pub struct EmailHandler {
    delay: Duration,
}

impl EmailHandler {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(500))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for EmailHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler<EmailTask> for EmailHandler {
    async fn handle(&self, task: &Task, payload: EmailTask) -> Result<(), HandlerError> {
        info!(task_id = %task.id(), to = %payload.to, subject = %payload.subject, "sending email");
        tokio::time::sleep(self.delay).await;
        info!(task_id = %task.id(), "email sent");
        Ok(())
    }
}

pub struct NotificationHandler {
    delay: Duration,
}

impl NotificationHandler {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(300))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for NotificationHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler<NotificationTask> for NotificationHandler {
    async fn handle(&self, task: &Task, payload: NotificationTask) -> Result<(), HandlerError> {
        info!(
            task_id = %task.id(),
            user_id = %payload.user_id,
            message = %payload.message,
            "sending notification"
        );
        tokio::time::sleep(self.delay).await;
        info!(task_id = %task.id(), "notification sent");
        Ok(())
    }
}

/// Simulates work proportional to `size`: `per_unit × size`, capped at [`MAX_DATA_PROCESSING`].
pub struct DataProcessingHandler {
    per_unit: Duration,
}

impl DataProcessingHandler {
    pub fn new() -> Self {
        Self::with_unit_cost(Duration::from_millis(10))
    }

    pub fn with_unit_cost(per_unit: Duration) -> Self {
        Self { per_unit }
    }

    fn processing_time(&self, size: u64) -> Duration {
        let size = u32::try_from(size).unwrap_or(u32::MAX);
        self.per_unit
            .checked_mul(size)
            .map_or(MAX_DATA_PROCESSING, |d| d.min(MAX_DATA_PROCESSING))
    }
}

impl Default for DataProcessingHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler<DataProcessingTask> for DataProcessingHandler {
    async fn handle(&self, task: &Task, payload: DataProcessingTask) -> Result<(), HandlerError> {
        info!(task_id = %task.id(), data_size = payload.size, "processing data");
        tokio::time::sleep(self.processing_time(payload.size)).await;
        info!(task_id = %task.id(), "data processed");
        Ok(())
    }
}

/// Register the three built-in handlers with their default delays.
pub fn register_builtin(registry: &mut HandlerRegistry) -> Result<(), RegistryError> {
    registry.register_typed::<EmailTask, _>(EmailHandler::new())?;
    registry.register_typed::<NotificationTask, _>(NotificationHandler::new())?;
    registry.register_typed::<DataProcessingTask, _>(DataProcessingHandler::new())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn data_processing_time_is_capped() {
        let handler = DataProcessingHandler::new();
        assert_eq!(handler.processing_time(0), Duration::ZERO);
        assert_eq!(handler.processing_time(15), Duration::from_millis(150));
        assert_eq!(handler.processing_time(1_000), MAX_DATA_PROCESSING);
        assert_eq!(handler.processing_time(u64::MAX), MAX_DATA_PROCESSING);
    }

    #[test]
    fn builtin_registration_covers_all_types() {
        let mut registry = HandlerRegistry::new();
        register_builtin(&mut registry).unwrap();
        assert_eq!(
            registry.registered_types(),
            vec!["data_processing", "email", "notification"]
        );
        assert!(register_builtin(&mut registry).is_err());
    }

    #[tokio::test]
    async fn email_with_missing_fields_is_still_sent() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_typed::<EmailTask, _>(EmailHandler::with_delay(Duration::ZERO))
            .unwrap();
        let handler = registry.get(&EmailTask::task_type()).unwrap();

        let missing = Task::from_json("e-1", "email", json!({ "subject": "hi" }));
        handler.handle(&missing).await.unwrap();

        let ok = Task::from_json("e-2", "email", json!({ "to": "user@example.com" }));
        handler.handle(&ok).await.unwrap();
    }
}
