//! Lifecycle operations: complete, cancel, heartbeat.
//!
//! Every rejected transition is reported to the caller; nothing is
//! swallowed and nothing is auto-retried here. Conflicts (wrong current
//! status) are distinct from not-found so a caller can tell "run is gone"
//! from "run is in the wrong state".

use chrono::{DateTime, Utc};

use crate::domain::{RunId, RunOutcome, RunRecord, WorkerId};
use crate::error::EngineError;
use crate::ports::UpdateOutcome;

use super::Engine;

impl Engine {
    /// Finish a running run. FAILED requires a non-empty error message,
    /// SUCCEEDED forbids one; both are validation errors before any state
    /// is touched. Conflict if the run is not currently Running.
    pub async fn complete_run(
        &self,
        id: RunId,
        outcome: RunOutcome,
        error_message: Option<String>,
    ) -> Result<RunRecord, EngineError> {
        match outcome {
            RunOutcome::Failed => {
                if error_message.as_deref().is_none_or(|m| m.trim().is_empty()) {
                    return Err(EngineError::Invalid(
                        "a FAILED completion requires a non-empty error message".into(),
                    ));
                }
            }
            RunOutcome::Succeeded => {
                if error_message.is_some() {
                    return Err(EngineError::Invalid(
                        "a SUCCEEDED completion must not carry an error message".into(),
                    ));
                }
            }
        }

        let now = self.clock().now();
        match self
            .store()
            .finish_if_running(id, outcome, error_message, now)
            .await?
        {
            UpdateOutcome::Updated(run) => {
                tracing::info!(run = %run.id, status = %run.status, "run finished");
                Ok(run)
            }
            UpdateOutcome::NotFound => Err(EngineError::RunNotFound(id)),
            UpdateOutcome::Conflict { status } => Err(EngineError::StatusConflict {
                id,
                status,
                action: "complete",
            }),
        }
    }

    /// Cancel a queued or running run.
    ///
    /// For a running run this marks intent only; the owning worker observes
    /// the cancellation (its next heartbeat is rejected) and stops. The
    /// state machine never preempts work.
    pub async fn cancel_run(&self, id: RunId) -> Result<RunRecord, EngineError> {
        let now = self.clock().now();
        match self.store().cancel_if_active(id, now).await? {
            UpdateOutcome::Updated(run) => {
                tracing::info!(run = %run.id, "run cancelled");
                Ok(run)
            }
            UpdateOutcome::NotFound => Err(EngineError::RunNotFound(id)),
            UpdateOutcome::Conflict { status } => Err(EngineError::StatusConflict {
                id,
                status,
                action: "cancel",
            }),
        }
    }

    /// Liveness ping from the worker holding `id`. Rejected unless the run
    /// is Running and owned by `worker`. The timestamp this maintains is
    /// the input a stale-run reaper would consult.
    pub async fn heartbeat(
        &self,
        id: RunId,
        worker: &WorkerId,
    ) -> Result<DateTime<Utc>, EngineError> {
        let now = self.clock().now();
        match self.store().heartbeat_if_owned(id, worker, now).await? {
            UpdateOutcome::Updated(_) => Ok(now),
            UpdateOutcome::NotFound => Err(EngineError::RunNotFound(id)),
            UpdateOutcome::Conflict { .. } => Err(EngineError::HeartbeatRejected(id)),
        }
    }
}
