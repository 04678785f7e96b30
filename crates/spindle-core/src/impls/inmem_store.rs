//! In-memory RunStore implementation.
//!
//! Development/test grade. One `tokio::sync::Mutex` guards the record map
//! and the queued index, so every primitive - including selection plus
//! transition inside `claim_next` - is a single atomic unit. A run handed
//! to one claimer is transitioned to Running before the lock is released,
//! which is what makes the exactly-once-claim guarantee hold under any
//! number of concurrent callers.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::app::status::RunCounts;
use crate::domain::{RunId, RunOutcome, RunRecord, RunStatus, TenantId, WorkerId};
use crate::error::StoreError;
use crate::ports::run_store::{Page, RunFilter, RunPage, RunStore, UpdateOutcome};

struct StoreState {
    /// All run records (single source of truth).
    runs: HashMap<RunId, RunRecord>,

    /// Queued index in creation order (RunIds only). Entries for runs that
    /// left Queued by another path (cancel while queued) go stale and are
    /// dropped lazily during claim scans.
    queued: VecDeque<RunId>,
}

pub struct InMemoryRunStore {
    state: Mutex<StoreState>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                runs: HashMap::new(),
                queued: VecDeque::new(),
            }),
        }
    }
}

impl Default for InMemoryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn insert(&self, run: RunRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let id = run.id;
        let queued = run.status == RunStatus::Queued;
        state.runs.insert(id, run);
        if queued {
            state.queued.push_back(id);
        }
        Ok(())
    }

    async fn get(&self, id: RunId) -> Result<Option<RunRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.runs.get(&id).cloned())
    }

    async fn list(&self, filter: &RunFilter, page: Page) -> Result<RunPage, StoreError> {
        let state = self.state.lock().await;

        let mut matched: Vec<&RunRecord> = state
            .runs
            .values()
            .filter(|r| filter.tenant.is_none_or(|t| r.tenant_id == t))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| filter.retry_of.is_none_or(|p| r.retry_of == Some(p)))
            .collect();

        // Newest first; id breaks created_at ties deterministically.
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matched.len();
        let limit = page.effective_limit();
        let items = matched
            .into_iter()
            .skip(page.offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(RunPage {
            items,
            total,
            limit,
            offset: page.offset,
        })
    }

    async fn counts(&self) -> Result<RunCounts, StoreError> {
        let state = self.state.lock().await;
        let mut counts = RunCounts::default();
        for run in state.runs.values() {
            match run.status {
                RunStatus::Queued => counts.queued += 1,
                RunStatus::Running => counts.running += 1,
                RunStatus::Succeeded => counts.succeeded += 1,
                RunStatus::Failed => counts.failed += 1,
                RunStatus::Cancelled => counts.cancelled += 1,
            }
        }
        Ok(counts)
    }

    async fn claim_next(
        &self,
        worker: &WorkerId,
        tenant: Option<&TenantId>,
        now: DateTime<Utc>,
    ) -> Result<Option<RunRecord>, StoreError> {
        let mut state = self.state.lock().await;

        let mut i = 0;
        while i < state.queued.len() {
            let id = state.queued[i];
            let candidate = state.runs.get(&id).map(|r| (r.status, r.tenant_id));

            match candidate {
                // Stale index entry: the run left Queued by another path.
                None => {
                    state.queued.remove(i);
                }
                Some((status, _)) if status != RunStatus::Queued => {
                    state.queued.remove(i);
                }
                // Eligible but filtered out: skip, keep it for other claimers.
                Some((_, tenant_id)) if tenant.is_some_and(|t| *t != tenant_id) => {
                    i += 1;
                }
                Some(_) => {
                    state.queued.remove(i);
                    let run = state.runs.get_mut(&id).expect("record exists for index entry");
                    run.mark_claimed(worker, now);
                    return Ok(Some(run.clone()));
                }
            }
        }

        Ok(None)
    }

    async fn finish_if_running(
        &self,
        id: RunId,
        outcome: RunOutcome,
        error_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut state = self.state.lock().await;
        let Some(run) = state.runs.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if run.status != RunStatus::Running {
            return Ok(UpdateOutcome::Conflict { status: run.status });
        }
        run.mark_finished(outcome, error_message, now);
        Ok(UpdateOutcome::Updated(run.clone()))
    }

    async fn cancel_if_active(
        &self,
        id: RunId,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut state = self.state.lock().await;
        let Some(run) = state.runs.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if !run.status.is_active() {
            return Ok(UpdateOutcome::Conflict { status: run.status });
        }
        run.mark_cancelled(now);
        Ok(UpdateOutcome::Updated(run.clone()))
    }

    async fn heartbeat_if_owned(
        &self,
        id: RunId,
        worker: &WorkerId,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut state = self.state.lock().await;
        let Some(run) = state.runs.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if run.status != RunStatus::Running || run.claimed_by.as_ref() != Some(worker) {
            return Ok(UpdateOutcome::Conflict { status: run.status });
        }
        run.touch_heartbeat(now);
        Ok(UpdateOutcome::Updated(run.clone()))
    }
}
