use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use spindle_core::domain::{
    ApprovalStatus, LogQuery, PipelineVersion, RunId, RunRecord, RunStatus, Tenant,
};
use spindle_core::engine::{CreateRun, Engine};
use spindle_core::impls::{InMemoryCatalog, InMemoryDirectory, InMemoryLogSink, InMemoryRunStore};
use spindle_core::ports::{
    Clock, IdGenerator, SystemClock, TenantDirectory, UlidGenerator, VersionCatalog,
};
use spindle_core::{Executor, WorkerConfig, WorkerGroup};

/// Executor that fails the first `n` executions, then succeeds.
/// Lets the demo walk the fail -> retry -> succeed path end to end.
struct FlakyExecutor {
    remaining_failures: AtomicU32,
    work: Duration,
}

impl FlakyExecutor {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
            work: Duration::from_millis(300),
        }
    }
}

#[async_trait]
impl Executor for FlakyExecutor {
    async fn execute(&self, _run: &RunRecord, version: &PipelineVersion) -> Result<(), String> {
        if version.definition.is_null() {
            return Err("pipeline definition is required".to_string());
        }

        sleep(self.work).await;

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(format!("intentional failure (left={left})"));
        }
        Ok(())
    }
}

async fn wait_terminal(engine: &Engine, run_id: RunId) -> RunStatus {
    loop {
        let run = engine.get_run(run_id).await.expect("run exists");
        if run.status.is_terminal() {
            return run.status;
        }
        sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    // (A) Wire an in-memory engine.
    let ids = Arc::new(UlidGenerator::new(SystemClock));
    let catalog = Arc::new(InMemoryCatalog::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let clock = Arc::new(SystemClock);

    let engine = Arc::new(Engine::new(
        Arc::new(InMemoryRunStore::new()),
        catalog.clone(),
        directory.clone(),
        Arc::new(InMemoryLogSink::new()),
        ids.clone(),
        clock.clone(),
    ));

    // (B) Seed a tenant and an approved pipeline version.
    let tenant_id = ids.tenant_id();
    directory
        .register(Tenant::new(tenant_id, "acme", clock.now()))
        .await
        .expect("register tenant");

    let version_id = ids.version_id();
    catalog
        .register(PipelineVersion::new(
            version_id,
            tenant_id,
            "daily-ingest",
            "v1",
            serde_json::json!({"steps": ["extract", "transform", "load"]}),
            clock.now(),
        ))
        .await
        .expect("register version");
    catalog
        .set_status(version_id, ApprovalStatus::Approved)
        .await
        .expect("approve version");

    // (C) Start two workers. The executor fails its first execution so the
    // demo exercises the failure and retry paths.
    let config = WorkerConfig::new("demo-worker")
        .with_poll_interval(Duration::from_millis(100))
        .with_heartbeat_interval(Duration::from_secs(1));
    let group = WorkerGroup::spawn(
        2,
        config,
        Arc::clone(&engine),
        Arc::new(FlakyExecutor::new(1)),
    );

    // (D) Create a run and watch it fail.
    let run = engine
        .create_run(
            CreateRun::new(tenant_id, version_id)
                .with_parameters(serde_json::json!({"day": "2026-02-01"})),
        )
        .await
        .expect("create run");
    println!("created {} -> {}", run.id, run.status);

    let status = wait_terminal(&engine, run.id).await;
    let failed = engine.get_run(run.id).await.expect("run exists");
    println!(
        "finished {} -> {} (claimed_by={:?}, error={:?})",
        run.id, status, failed.claimed_by, failed.error_message
    );

    // (E) Retry it; the second execution succeeds.
    let retry = engine.retry_run(run.id, None).await.expect("retry run");
    println!(
        "retried as {} (retry_of={}, root={})",
        retry.id,
        retry.retry_of.expect("retry has a parent"),
        retry.root_id()
    );

    let status = wait_terminal(&engine, retry.id).await;
    println!("finished {} -> {}", retry.id, status);

    // (F) Show the failed run's log stream and the final counts.
    let entries = engine
        .list_logs(run.id, &LogQuery::default())
        .await
        .expect("list logs");
    println!("--- logs for {}", run.id);
    for e in entries {
        println!("  [{}] {} {}", e.level, e.ts.format("%H:%M:%S%.3f"), e.message);
    }

    let counts = engine.counts().await.expect("counts");
    println!(
        "counts: queued={} running={} succeeded={} failed={} cancelled={}",
        counts.queued, counts.running, counts.succeeded, counts.failed, counts.cancelled
    );

    group.shutdown_and_join().await;
}
