//! RunStore port - the durable, transactional record of every run.
//!
//! The store has no lifecycle logic of its own; it exposes atomic
//! read-modify-write primitives and the engine decides what they mean.
//! Every mutating primitive is one conditional update: check the status
//! precondition, apply the new fields, or change nothing. "Zero rows
//! affected" is a value (`UpdateOutcome`), never an `Err` - `Err` is
//! reserved for infrastructure failure.
//!
//! A SQL implementation maps each primitive to
//! `UPDATE ... WHERE id = ? AND status = ? ... RETURNING *`, and
//! `claim_next` to `SELECT ... WHERE status = 'QUEUED' ORDER BY created_at
//! FOR UPDATE SKIP LOCKED LIMIT 1` plus the claiming UPDATE in the same
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::status::RunCounts;
use crate::domain::{RunId, RunOutcome, RunRecord, RunStatus, TenantId, WorkerId};
use crate::error::StoreError;

/// Result of a conditional update.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// Precondition held; the updated record.
    Updated(RunRecord),

    /// No run with that id.
    NotFound,

    /// The run exists but its current status (or ownership, for heartbeats)
    /// failed the precondition. Nothing changed.
    Conflict { status: RunStatus },
}

/// Filters for the list read path. All optional, all ANDed.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub tenant: Option<TenantId>,
    pub status: Option<RunStatus>,
    pub retry_of: Option<RunId>,
}

/// Offset/limit window. Limit is clamped into 1..=MAX_LIMIT.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// One page of runs plus the total match count (not the page length).
#[derive(Debug, Clone)]
pub struct RunPage {
    pub items: Vec<RunRecord>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[async_trait]
pub trait RunStore: Send + Sync {
    async fn insert(&self, run: RunRecord) -> Result<(), StoreError>;

    async fn get(&self, id: RunId) -> Result<Option<RunRecord>, StoreError>;

    /// Newest-first page of runs matching the filter.
    async fn list(&self, filter: &RunFilter, page: Page) -> Result<RunPage, StoreError>;

    async fn counts(&self) -> Result<RunCounts, StoreError>;

    /// Atomically select one queued run (oldest first, optionally tenant
    /// scoped) and transition it to Running owned by `worker`. Selection and
    /// transition are a single atomic unit: under concurrent callers no run
    /// is ever handed out twice, and candidates already taken or no longer
    /// queued are skipped, not waited on. `None` means nothing eligible.
    async fn claim_next(
        &self,
        worker: &WorkerId,
        tenant: Option<&TenantId>,
        now: DateTime<Utc>,
    ) -> Result<Option<RunRecord>, StoreError>;

    /// Running -> Succeeded/Failed, only if currently Running.
    async fn finish_if_running(
        &self,
        id: RunId,
        outcome: RunOutcome,
        error_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Queued/Running -> Cancelled, only if currently active.
    async fn cancel_if_active(
        &self,
        id: RunId,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Touch heartbeat_at, only if Running and owned by `worker`.
    async fn heartbeat_if_owned(
        &self,
        id: RunId,
        worker: &WorkerId,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError>;
}
