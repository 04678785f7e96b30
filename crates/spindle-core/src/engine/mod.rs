//! Engine - the run lifecycle and queue core.
//!
//! One struct over five ports. The engine owns the lifecycle rules (which
//! transition is legal, what each operation validates); the store owns
//! atomicity (each transition is one conditional update). Split by concern:
//! - claim: the atomic claim protocol
//! - lifecycle: complete / cancel / heartbeat
//! - retry: lineage-threading derivation of new runs
//! - query: the read path (runs, logs, counts)

mod claim;
mod lifecycle;
mod query;
mod retry;

pub use self::claim::ClaimedRun;

use std::sync::Arc;

use crate::domain::{RunRecord, TenantId, TriggerKind, VersionId};
use crate::error::EngineError;
use crate::ports::{Clock, IdGenerator, LogSink, RunStore, TenantDirectory, VersionCatalog};

/// Request to create a run. Trigger defaults to `manual`, parameters to `{}`.
#[derive(Debug, Clone)]
pub struct CreateRun {
    pub tenant_id: TenantId,
    pub version_id: VersionId,
    pub trigger: TriggerKind,
    pub parameters: serde_json::Value,
}

impl CreateRun {
    pub fn new(tenant_id: TenantId, version_id: VersionId) -> Self {
        Self {
            tenant_id,
            version_id,
            trigger: TriggerKind::manual(),
            parameters: serde_json::json!({}),
        }
    }

    pub fn with_trigger(mut self, trigger: TriggerKind) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

pub struct Engine {
    store: Arc<dyn RunStore>,
    catalog: Arc<dyn VersionCatalog>,
    directory: Arc<dyn TenantDirectory>,
    logs: Arc<dyn LogSink>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn RunStore>,
        catalog: Arc<dyn VersionCatalog>,
        directory: Arc<dyn TenantDirectory>,
        logs: Arc<dyn LogSink>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            directory,
            logs,
            ids,
            clock,
        }
    }

    pub(crate) fn store(&self) -> &Arc<dyn RunStore> {
        &self.store
    }

    pub(crate) fn catalog(&self) -> &Arc<dyn VersionCatalog> {
        &self.catalog
    }

    pub(crate) fn logs(&self) -> &Arc<dyn LogSink> {
        &self.logs
    }

    pub(crate) fn ids(&self) -> &Arc<dyn IdGenerator> {
        &self.ids
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Create a new queued run. Gated on tenant existence and version
    /// approval; a run may never be created against a non-approved version.
    pub async fn create_run(&self, req: CreateRun) -> Result<RunRecord, EngineError> {
        self.directory
            .get(req.tenant_id)
            .await?
            .ok_or(EngineError::TenantNotFound(req.tenant_id))?;

        let version = self
            .catalog
            .get(req.version_id)
            .await?
            .ok_or(EngineError::VersionNotFound(req.version_id))?;
        if !version.is_approved() {
            return Err(EngineError::VersionNotApproved(version.id));
        }

        let run = RunRecord::new(
            self.ids.run_id(),
            req.tenant_id,
            req.version_id,
            req.trigger,
            req.parameters,
            self.clock.now(),
        );
        self.store.insert(run.clone()).await?;
        tracing::info!(run = %run.id, tenant = %run.tenant_id, trigger = %run.trigger, "run queued");
        Ok(run)
    }
}

#[cfg(test)]
pub(crate) mod harness {
    //! Fully wired in-memory engine for the engine tests.

    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::Engine;
    use crate::domain::{ApprovalStatus, PipelineVersion, Tenant, TenantId, VersionId};
    use crate::impls::{InMemoryCatalog, InMemoryDirectory, InMemoryLogSink, InMemoryRunStore};
    use crate::ports::{
        Clock, FixedClock, IdGenerator, SystemClock, TenantDirectory, UlidGenerator, VersionCatalog,
    };

    pub(crate) struct TestEngine {
        pub engine: Arc<Engine>,
        pub tenant_id: TenantId,
        pub version_id: VersionId,
        pub catalog: Arc<InMemoryCatalog>,
        pub clock: Arc<FixedClock>,
    }

    /// Engine over in-memory ports, with one registered tenant and one
    /// approved version ready to run against. The clock is pinned; advance
    /// it explicitly where a test cares about time.
    pub(crate) async fn engine() -> TestEngine {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
        ));
        let ids = Arc::new(UlidGenerator::new(SystemClock));
        let catalog = Arc::new(InMemoryCatalog::new());
        let directory = Arc::new(InMemoryDirectory::new());

        let tenant_id = ids.tenant_id();
        directory
            .register(Tenant::new(tenant_id, "acme", clock.now()))
            .await
            .unwrap();

        let version_id = ids.version_id();
        catalog
            .register(PipelineVersion::new(
                version_id,
                tenant_id,
                "daily-ingest",
                "v1",
                serde_json::json!({"steps": ["extract", "load"]}),
                clock.now(),
            ))
            .await
            .unwrap();
        catalog
            .set_status(version_id, ApprovalStatus::Approved)
            .await
            .unwrap();

        let engine = Arc::new(Engine::new(
            Arc::new(InMemoryRunStore::new()),
            catalog.clone(),
            directory,
            Arc::new(InMemoryLogSink::new()),
            ids,
            clock.clone(),
        ));

        TestEngine {
            engine,
            tenant_id,
            version_id,
            catalog,
            clock,
        }
    }

    impl TestEngine {
        /// Register another version for this tenant in the given state.
        pub(crate) async fn version_with_status(&self, status: ApprovalStatus) -> VersionId {
            let ids = UlidGenerator::new(SystemClock);
            let id = ids.version_id();
            self.catalog
                .register(PipelineVersion::new(
                    id,
                    self.tenant_id,
                    "daily-ingest",
                    "v2",
                    serde_json::json!({"steps": []}),
                    self.clock.now(),
                ))
                .await
                .unwrap();
            self.catalog.set_status(id, status).await.unwrap();
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::harness;
    use super::*;
    use crate::domain::{ApprovalStatus, RunStatus};
    use crate::error::{EngineError, ErrorKind};
    use crate::ports::{IdGenerator, SystemClock, UlidGenerator};

    #[tokio::test]
    async fn create_run_starts_queued_against_an_approved_version() {
        let h = harness::engine().await;

        let run = h
            .engine
            .create_run(
                CreateRun::new(h.tenant_id, h.version_id)
                    .with_parameters(serde_json::json!({"day": "2026-02-01"})),
            )
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Queued);
        assert_eq!(run.tenant_id, h.tenant_id);
        assert_eq!(run.version_id, h.version_id);
        assert_eq!(run.trigger.as_str(), "manual");
        assert!(run.claimed_by.is_none());
    }

    #[tokio::test]
    async fn create_run_rejects_unknown_tenant_and_version() {
        let h = harness::engine().await;
        let ids = UlidGenerator::new(SystemClock);

        let err = h
            .engine
            .create_run(CreateRun::new(ids.tenant_id(), h.version_id))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::TenantNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = h
            .engine
            .create_run(CreateRun::new(h.tenant_id, ids.version_id()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::VersionNotFound(_)));
    }

    #[tokio::test]
    async fn create_run_rejects_non_approved_versions_and_creates_no_row() {
        let h = harness::engine().await;

        for status in [ApprovalStatus::Draft, ApprovalStatus::Deprecated] {
            let version_id = h.version_with_status(status).await;
            let err = h
                .engine
                .create_run(CreateRun::new(h.tenant_id, version_id))
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::VersionNotApproved(_)));
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }

        let counts = h.engine.counts().await.unwrap();
        assert_eq!(counts.queued, 0);
    }

    #[tokio::test]
    async fn approval_changes_never_invalidate_existing_runs() {
        let h = harness::engine().await;
        let run = h
            .engine
            .create_run(CreateRun::new(h.tenant_id, h.version_id))
            .await
            .unwrap();

        h.catalog
            .set_status(h.version_id, ApprovalStatus::Deprecated)
            .await
            .unwrap();

        let fetched = h.engine.get_run(run.id).await.unwrap();
        assert_eq!(fetched.status, RunStatus::Queued);
    }
}
