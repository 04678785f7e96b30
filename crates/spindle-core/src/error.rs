//! Engine error taxonomy.
//!
//! Four operational classes, surfaced distinctly so callers can react
//! correctly: validation (fix the request), conflict (wrong current state,
//! never auto-retried), not-found, infrastructure (retriable).

use thiserror::Error;

use crate::domain::{RunId, RunStatus, TenantId, VersionId};

/// Operational classification of an engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request; no state change happened.
    Validation,

    /// Precondition failed (wrong status, unapproved version, ownership
    /// mismatch). Distinct from NotFound so a caller can tell "gone" from
    /// "in the wrong state".
    Conflict,

    NotFound,

    /// Store or collaborator unavailable; safe to retry.
    Infrastructure,
}

/// Failure of a port implementation (store, catalog, sink). Always
/// infrastructure-class: the in-memory implementations never produce one,
/// a networked store maps its transport errors here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("run not found: {0}")]
    RunNotFound(RunId),

    #[error("pipeline version not found: {0}")]
    VersionNotFound(VersionId),

    #[error("tenant not found: {0}")]
    TenantNotFound(TenantId),

    #[error("run {id} is {status}: cannot {action}")]
    StatusConflict {
        id: RunId,
        status: RunStatus,
        action: &'static str,
    },

    #[error("pipeline version {0} is not approved")]
    VersionNotApproved(VersionId),

    #[error("heartbeat rejected for run {0}: not running or not owned by caller")]
    HeartbeatRejected(RunId),

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::RunNotFound(_)
            | EngineError::VersionNotFound(_)
            | EngineError::TenantNotFound(_) => ErrorKind::NotFound,
            EngineError::StatusConflict { .. }
            | EngineError::VersionNotApproved(_)
            | EngineError::HeartbeatRejected(_) => ErrorKind::Conflict,
            EngineError::Invalid(_) => ErrorKind::Validation,
            EngineError::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// Only infrastructure errors are worth retrying; conflicts and
    /// validation failures will fail the same way again.
    pub fn is_retriable(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}
