//! Claim protocol: hand exactly one queued run to exactly one caller.
//!
//! The heavy lifting is the store's `claim_next` (selection and transition
//! as one atomic unit); this layer resolves the version payload the worker
//! executes against and shapes the result.

use crate::domain::{PipelineVersion, RunRecord, TenantId, WorkerId};
use crate::error::EngineError;

use super::Engine;

/// A successful claim: the run (now Running, owned by the caller) plus the
/// resolved version payload.
#[derive(Debug, Clone)]
pub struct ClaimedRun {
    pub run: RunRecord,
    pub version: PipelineVersion,
}

impl Engine {
    /// Claim one queued run for `worker`, optionally scoped to a tenant.
    ///
    /// `Ok(None)` means nothing eligible - not an error; the caller polls
    /// again later. Under concurrent callers each eligible run is returned
    /// to at most one of them.
    pub async fn claim_run(
        &self,
        worker: &WorkerId,
        tenant: Option<&TenantId>,
    ) -> Result<Option<ClaimedRun>, EngineError> {
        let now = self.clock().now();
        let Some(run) = self.store().claim_next(worker, tenant, now).await? else {
            return Ok(None);
        };

        // The run was created against this version, so a miss here means the
        // catalog lost a record out from under us.
        let version = self
            .catalog()
            .get(run.version_id)
            .await?
            .ok_or(EngineError::VersionNotFound(run.version_id))?;

        tracing::info!(run = %run.id, worker = %worker, "run claimed");
        Ok(Some(ClaimedRun { run, version }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::domain::{RunStatus, WorkerId};
    use crate::engine::harness;
    use crate::engine::CreateRun;

    #[tokio::test]
    async fn claim_transitions_the_run_and_returns_the_version() {
        let h = harness::engine().await;
        let created = h
            .engine
            .create_run(CreateRun::new(h.tenant_id, h.version_id))
            .await
            .unwrap();

        let w = WorkerId::new("w1");
        let claimed = h.engine.claim_run(&w, None).await.unwrap().unwrap();

        assert_eq!(claimed.run.id, created.id);
        assert_eq!(claimed.run.status, RunStatus::Running);
        assert_eq!(claimed.run.claimed_by, Some(w));
        assert!(claimed.run.claimed_at.is_some());
        assert!(claimed.run.started_at.is_some());
        assert_eq!(claimed.version.id, h.version_id);

        // The stored record agrees with what the claimer saw.
        let stored = h.engine.get_run(created.id).await.unwrap();
        assert_eq!(stored.status, RunStatus::Running);
    }

    #[tokio::test]
    async fn empty_queue_claims_nothing() {
        let h = harness::engine().await;
        let w = WorkerId::new("w1");
        assert!(h.engine.claim_run(&w, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn two_claimers_one_run_exactly_one_wins() {
        let h = harness::engine().await;
        let run = h
            .engine
            .create_run(CreateRun::new(h.tenant_id, h.version_id))
            .await
            .unwrap();

        let e1 = Arc::clone(&h.engine);
        let e2 = Arc::clone(&h.engine);
        let (a, b) = tokio::join!(
            async move { e1.claim_run(&WorkerId::new("w1"), None).await.unwrap() },
            async move { e2.claim_run(&WorkerId::new("w2"), None).await.unwrap() },
        );

        let winners = [a.is_some(), b.is_some()];
        assert_eq!(winners.iter().filter(|w| **w).count(), 1);
        let claimed = a.or(b).unwrap();
        assert_eq!(claimed.run.id, run.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claimers_never_share_a_run() {
        let h = harness::engine().await;

        const RUNS: usize = 5;
        const CLAIMERS: usize = 16;

        for _ in 0..RUNS {
            h.engine
                .create_run(CreateRun::new(h.tenant_id, h.version_id))
                .await
                .unwrap();
        }

        let mut joins = Vec::with_capacity(CLAIMERS);
        for i in 0..CLAIMERS {
            let engine = Arc::clone(&h.engine);
            joins.push(tokio::spawn(async move {
                engine
                    .claim_run(&WorkerId::new(format!("w{i}")), None)
                    .await
                    .unwrap()
            }));
        }

        let mut claimed = HashSet::new();
        let mut misses = 0;
        for join in joins {
            match join.await.unwrap() {
                Some(c) => {
                    // A run id showing up twice would be a double claim.
                    assert!(claimed.insert(c.run.id));
                }
                None => misses += 1,
            }
        }

        assert_eq!(claimed.len(), RUNS);
        assert_eq!(misses, CLAIMERS - RUNS);
    }

    #[tokio::test]
    async fn tenant_filter_only_claims_matching_runs() {
        let h = harness::engine().await;
        h.engine
            .create_run(CreateRun::new(h.tenant_id, h.version_id))
            .await
            .unwrap();

        let other_tenant = {
            use crate::ports::{IdGenerator, SystemClock, UlidGenerator};
            UlidGenerator::new(SystemClock).tenant_id()
        };

        let w = WorkerId::new("w1");
        assert!(
            h.engine
                .claim_run(&w, Some(&other_tenant))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            h.engine
                .claim_run(&w, Some(&h.tenant_id))
                .await
                .unwrap()
                .is_some()
        );
    }
}
