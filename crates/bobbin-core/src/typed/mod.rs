//! Typed - handler 登録と型付き payload API
//!
//! # 二層構造
//! - **表層（Typed）**: `TaskPayload` trait, `Handler<P>` trait - 型安全
//! - **内部（Dyn）**: `TaskHandler` trait - object-safe, registry に格納される

pub mod handler;
pub mod registry;
pub mod task;

pub use self::handler::{Handler, TaskHandler, TypedHandler};
pub use self::registry::{HandlerRegistry, RegistryError};
pub use self::task::TaskPayload;
