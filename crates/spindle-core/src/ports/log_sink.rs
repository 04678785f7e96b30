//! LogSink port - append-only per-run event stream.
//!
//! The engine writes to it, dashboards read from it. No ordering logic
//! beyond (ts, seq) ascending; entries are never mutated or deleted.

use async_trait::async_trait;

use crate::domain::{LogEntry, LogQuery, RunId};
use crate::error::StoreError;

#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one entry. The sink assigns the insertion sequence (`seq`)
    /// and returns the stored entry.
    async fn append(&self, entry: LogEntry) -> Result<LogEntry, StoreError>;

    /// Page of one run's entries, ordered by (ts, seq) in the requested
    /// direction, bounded by the query's ts window and limit.
    async fn list(&self, run_id: RunId, query: &LogQuery) -> Result<Vec<LogEntry>, StoreError>;
}
