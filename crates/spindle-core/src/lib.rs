//! spindle-core
//!
//! Run coordination for horizontally-scaled workers: an authoritative run
//! lifecycle state machine, an atomic claim protocol (exactly one worker
//! receives each queued run), heartbeat liveness bookkeeping, and
//! retry-with-lineage derivation.
//!
//! # Module layout
//! - **domain**: ids, run records, statuses, versions, log entries
//! - **ports**: abstraction layer (RunStore, VersionCatalog, TenantDirectory,
//!   LogSink, Clock, IdGenerator)
//! - **impls**: in-memory port implementations (development/test)
//! - **engine**: claim protocol, lifecycle operations, retry, read path
//! - **app**: worker loop, executor seam, status views

pub mod app;
pub mod domain;
pub mod engine;
pub mod error;
pub mod impls;
pub mod ports;

pub use self::app::{Executor, RunCounts, SimulatedExecutor, WorkerConfig, WorkerGroup};
pub use self::engine::{ClaimedRun, CreateRun, Engine};
pub use self::error::{EngineError, ErrorKind, StoreError};
