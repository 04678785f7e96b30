//! Run record: the central entity of the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{RunId, TenantId, VersionId, WorkerId};
use super::status::{RunOutcome, RunStatus};

/// Trigger classification. Informational only, except that retries always
/// stamp `retry`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerKind(String);

impl TriggerKind {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn manual() -> Self {
        Self::new("manual")
    }

    pub fn scheduled() -> Self {
        Self::new("scheduled")
    }

    pub fn retry() -> Self {
        Self::new("retry")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_retry(&self) -> bool {
        self.0 == "retry"
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One pipeline run: queued, handed to exactly one worker, finished exactly
/// once.
///
/// Design:
/// - This record is the single source of truth for run state.
/// - State transitions happen through methods here; the store decides *when*
///   a transition may be applied (status precondition), the record decides
///   *what* a transition writes.
/// - Ownership markers (claimed_by/claimed_at/started_at) are set once at
///   claim time and never unset; they are a historical record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub tenant_id: TenantId,
    pub version_id: VersionId,

    pub status: RunStatus,
    pub trigger: TriggerKind,

    /// Opaque payload handed to execution unchanged (unless a retry
    /// overrides it).
    pub parameters: serde_json::Value,

    pub claimed_by: Option<WorkerId>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub heartbeat_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Set only when status is Failed.
    pub error_message: Option<String>,

    /// Immediate parent in a retry chain.
    pub retry_of: Option<RunId>,

    /// Original ancestor of a retry chain; None for a run that was not
    /// derived from another (see `root_id`).
    pub root: Option<RunId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunRecord {
    /// A fresh run in Queued. The approval gate on the version is the
    /// engine's job; this constructor only shapes the record.
    pub fn new(
        id: RunId,
        tenant_id: TenantId,
        version_id: VersionId,
        trigger: TriggerKind,
        parameters: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            version_id,
            status: RunStatus::Queued,
            trigger,
            parameters,
            claimed_by: None,
            claimed_at: None,
            started_at: None,
            heartbeat_at: None,
            finished_at: None,
            error_message: None,
            retry_of: None,
            root: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive a new queued run from a terminal source, threading lineage.
    ///
    /// The source itself is never mutated. Parameters are copied unless an
    /// override is supplied. Every member of a retry chain shares one root.
    pub fn derived_retry(
        source: &RunRecord,
        id: RunId,
        parameters: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut run = Self::new(
            id,
            source.tenant_id,
            source.version_id,
            TriggerKind::retry(),
            parameters.unwrap_or_else(|| source.parameters.clone()),
            now,
        );
        run.retry_of = Some(source.id);
        run.root = Some(source.root_id());
        run
    }

    /// Root of the retry chain this run belongs to; its own id if it is the
    /// original.
    pub fn root_id(&self) -> RunId {
        self.root.unwrap_or(self.id)
    }

    /// Queued -> Running. Records the owning worker and stamps
    /// claimed_at/started_at/heartbeat_at with one instant.
    pub fn mark_claimed(&mut self, worker: &WorkerId, now: DateTime<Utc>) {
        self.status = RunStatus::Running;
        self.claimed_by = Some(worker.clone());
        self.claimed_at = Some(now);
        self.started_at = Some(now);
        self.heartbeat_at = Some(now);
        self.updated_at = now;
    }

    /// Running -> Succeeded/Failed. `error_message` is kept only on Failed.
    pub fn mark_finished(
        &mut self,
        outcome: RunOutcome,
        error_message: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = outcome.as_status();
        self.error_message = match outcome {
            RunOutcome::Failed => error_message,
            RunOutcome::Succeeded => None,
        };
        self.heartbeat_at = Some(now);
        self.finished_at = Some(now);
        self.updated_at = now;
    }

    /// Queued/Running -> Cancelled.
    pub fn mark_cancelled(&mut self, now: DateTime<Utc>) {
        self.status = RunStatus::Cancelled;
        self.finished_at = Some(now);
        self.updated_at = now;
    }

    /// Liveness ping from the owning worker. No status change.
    pub fn touch_heartbeat(&mut self, now: DateTime<Utc>) {
        self.heartbeat_at = Some(now);
        self.updated_at = now;
    }
}
