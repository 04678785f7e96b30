//! In-memory LogSink implementation.
//!
//! Per-run vectors plus one global insertion counter; entries are appended
//! in seq order, so reads only need the ts-window filter and a sort by
//! (ts, seq) to honor out-of-order timestamps from different writers.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LogEntry, LogOrder, LogQuery, RunId};
use crate::error::StoreError;
use crate::ports::log_sink::LogSink;

struct SinkState {
    entries: HashMap<RunId, Vec<LogEntry>>,
    next_seq: u64,
}

pub struct InMemoryLogSink {
    state: Mutex<SinkState>,
}

impl InMemoryLogSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SinkState {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }
}

impl Default for InMemoryLogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSink for InMemoryLogSink {
    async fn append(&self, mut entry: LogEntry) -> Result<LogEntry, StoreError> {
        let mut state = self.state.lock().await;
        entry.seq = state.next_seq;
        state.next_seq += 1;
        state
            .entries
            .entry(entry.run_id)
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, run_id: RunId, query: &LogQuery) -> Result<Vec<LogEntry>, StoreError> {
        let state = self.state.lock().await;
        let mut page: Vec<LogEntry> = state
            .entries
            .get(&run_id)
            .map(|v| v.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|e| query.before.is_none_or(|b| e.ts < b))
            .filter(|e| query.after.is_none_or(|a| e.ts > a))
            .cloned()
            .collect();

        page.sort_by(|a, b| a.ts.cmp(&b.ts).then_with(|| a.seq.cmp(&b.seq)));
        if query.order == LogOrder::Desc {
            page.reverse();
        }
        page.truncate(query.effective_limit());
        Ok(page)
    }
}
