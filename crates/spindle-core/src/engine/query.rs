//! Read path: get/list runs, per-run logs, status counts.
//!
//! Pure reads plus the log append (which only gates on run existence).
//! No concurrency hazards beyond snapshot reads from the store.

use crate::app::status::RunCounts;
use crate::domain::{LogAppend, LogEntry, LogQuery, RunId, RunRecord};
use crate::error::EngineError;
use crate::ports::{Page, RunFilter, RunPage};

use super::Engine;

impl Engine {
    pub async fn get_run(&self, id: RunId) -> Result<RunRecord, EngineError> {
        self.store()
            .get(id)
            .await?
            .ok_or(EngineError::RunNotFound(id))
    }

    /// Newest-first page of runs plus the total match count.
    pub async fn list_runs(&self, filter: &RunFilter, page: Page) -> Result<RunPage, EngineError> {
        Ok(self.store().list(filter, page).await?)
    }

    /// Append one entry to a run's log stream. The run must exist; the
    /// entry's tenant is taken from the run, id/ts are stamped here and the
    /// sink assigns the insertion sequence.
    pub async fn append_log(
        &self,
        run_id: RunId,
        append: LogAppend,
    ) -> Result<LogEntry, EngineError> {
        let run = self
            .store()
            .get(run_id)
            .await?
            .ok_or(EngineError::RunNotFound(run_id))?;

        let entry = LogEntry {
            id: self.ids().log_id(),
            run_id,
            tenant_id: run.tenant_id,
            ts: self.clock().now(),
            seq: 0,
            level: append.level,
            message: append.message,
            source: append.source,
            meta: append.meta,
        };
        Ok(self.logs().append(entry).await?)
    }

    /// Ordered page of a run's log entries. Not-found if the run does not
    /// exist (distinct from an existing run with no entries yet).
    pub async fn list_logs(
        &self,
        run_id: RunId,
        query: &LogQuery,
    ) -> Result<Vec<LogEntry>, EngineError> {
        self.store()
            .get(run_id)
            .await?
            .ok_or(EngineError::RunNotFound(run_id))?;
        Ok(self.logs().list(run_id, query).await?)
    }

    pub async fn counts(&self) -> Result<RunCounts, EngineError> {
        Ok(self.store().counts().await?)
    }
}
