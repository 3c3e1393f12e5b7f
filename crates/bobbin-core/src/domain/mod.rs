//! Domain model (task, pool state, events, errors).

pub mod errors;
pub mod events;
pub mod state;
pub mod task;

pub use self::errors::{HandlerError, PoolError, Rejected};
pub use self::events::{DropReason, EventLevel, PoolEvent, StopReason};
pub use self::state::PoolState;
pub use self::task::{Payload, Task, TaskId, TaskType};
