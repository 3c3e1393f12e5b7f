//! HandlerRegistry - task_type → handler の対応表
//!
//! # 設計
//! - 構築時（PoolBuilder）にだけ変更される
//! - pool 起動後は `Arc<HandlerRegistry>` として worker 間で共有（読み取り専用、ロック不要）

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{Handler, TaskHandler, TypedHandler};
use super::task::TaskPayload;
use crate::domain::TaskType;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler for task type '{0}' is already registered")]
    AlreadyRegistered(TaskType),
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TaskType, Arc<dyn TaskHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a task type. Registering the same type twice is an error.
    pub fn register(
        &mut self,
        task_type: impl Into<TaskType>,
        handler: Arc<dyn TaskHandler>,
    ) -> Result<(), RegistryError> {
        let task_type = task_type.into();
        if self.handlers.contains_key(&task_type) {
            return Err(RegistryError::AlreadyRegistered(task_type));
        }
        self.handlers.insert(task_type, handler);
        Ok(())
    }

    /// Register a typed handler under `P::TYPE`.
    pub fn register_typed<P: TaskPayload, H: Handler<P> + 'static>(
        &mut self,
        handler: H,
    ) -> Result<(), RegistryError> {
        self.register(P::task_type(), Arc::new(TypedHandler::<P, H>::new(handler)))
    }

    pub fn get(&self, task_type: &TaskType) -> Option<&Arc<dyn TaskHandler>> {
        self.handlers.get(task_type)
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.handlers.contains_key(&TaskType::new(task_type))
    }

    /// Registered task types, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .handlers
            .keys()
            .map(|t| t.as_str().to_string())
            .collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{HandlerError, Task};
    use crate::typed::task::fixtures::CountTask;

    struct OkHandler;

    #[async_trait]
    impl TaskHandler for OkHandler {
        async fn handle(&self, _task: &Task) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Handler<CountTask> for OkHandler {
        async fn handle(&self, _task: &Task, _payload: CountTask) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = HandlerRegistry::new();
        registry.register("email", Arc::new(OkHandler)).unwrap();

        assert!(registry.get(&TaskType::new("email")).is_some());
        assert!(registry.get(&TaskType::new("sms")).is_none());
    }

    #[test]
    fn test_double_registration() {
        let mut registry = HandlerRegistry::new();
        registry.register("email", Arc::new(OkHandler)).unwrap();
        let result = registry.register("email", Arc::new(OkHandler));
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(t)) if t.as_str() == "email"));
    }

    #[test]
    fn test_typed_registration_uses_payload_type() {
        let mut registry = HandlerRegistry::new();
        registry.register_typed::<CountTask, _>(OkHandler).unwrap();
        registry.register("email", Arc::new(OkHandler)).unwrap();

        assert!(registry.contains(CountTask::TYPE));
        assert_eq!(
            registry.registered_types(),
            vec!["email".to_string(), CountTask::TYPE.to_string()]
        );
        assert_eq!(registry.len(), 2);
    }
}
