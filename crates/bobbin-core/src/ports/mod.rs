//! Ports - 抽象化レイヤー
//!
//! Pool が外部に依存する部分（ログ出力先、時刻、ID 生成）を trait として切り出す。

pub mod clock;
pub mod event_sink;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
