//! Retry: derive a new queued run from a terminal one, threading lineage.
//!
//! The source run is never mutated. Only FAILED/CANCELLED sources qualify;
//! a run still queued, running, or succeeded has nothing to retry. The
//! version must still be approved at retry time - a deprecated pipeline
//! cannot be re-run, even though its past runs stay valid.

use crate::domain::{RunId, RunRecord};
use crate::error::EngineError;

use super::Engine;

impl Engine {
    /// Queue a retry of `id`. Parameters are copied from the source unless
    /// an override is supplied. The new run carries `retry_of = source` and
    /// shares the source's root, so a whole retry chain hangs off one
    /// original run.
    pub async fn retry_run(
        &self,
        id: RunId,
        parameters: Option<serde_json::Value>,
    ) -> Result<RunRecord, EngineError> {
        let source = self
            .store()
            .get(id)
            .await?
            .ok_or(EngineError::RunNotFound(id))?;

        if !source.status.is_retryable() {
            return Err(EngineError::StatusConflict {
                id,
                status: source.status,
                action: "retry",
            });
        }

        let version = self
            .catalog()
            .get(source.version_id)
            .await?
            .ok_or(EngineError::VersionNotFound(source.version_id))?;
        if !version.is_approved() {
            return Err(EngineError::VersionNotApproved(version.id));
        }

        let run = RunRecord::derived_retry(&source, self.ids().run_id(), parameters, self.clock().now());
        self.store().insert(run.clone()).await?;
        tracing::info!(run = %run.id, retry_of = %id, root = %run.root_id(), "retry queued");
        Ok(run)
    }
}
