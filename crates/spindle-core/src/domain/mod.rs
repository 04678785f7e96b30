//! Domain model (ids, run records, statuses, versions, log entries).

pub mod ids;
pub mod log;
pub mod run;
pub mod status;
pub mod tenant;
pub mod version;

pub use self::ids::{Id, IdMarker, LogId, RunId, TenantId, VersionId, WorkerId};
pub use self::log::{LogAppend, LogEntry, LogLevel, LogOrder, LogQuery};
pub use self::run::{RunRecord, TriggerKind};
pub use self::status::{ApprovalStatus, RunOutcome, RunStatus};
pub use self::tenant::Tenant;
pub use self::version::PipelineVersion;
