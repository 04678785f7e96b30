//! Ports - 抽象化レイヤー。
//!
//! 各 trait は外部システム（SQL ストア、カタログ、ログストアなど）への
//! インターフェースを提供し、実装の詳細を隠蔽する。開発用の in-memory
//! 実装は impls/ にある。

pub mod catalog;
pub mod clock;
pub mod id_generator;
pub mod log_sink;
pub mod run_store;

pub use self::catalog::{TenantDirectory, VersionCatalog};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::log_sink::LogSink;
pub use self::run_store::{Page, RunFilter, RunPage, RunStore, UpdateOutcome};
