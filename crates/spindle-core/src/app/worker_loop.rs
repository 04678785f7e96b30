//! Worker loop: claim -> execute -> complete, repeated until shutdown.
//!
//! Workers are fully independent; all coordination goes through the
//! engine's atomicity. Infrastructure errors are logged and the loop backs
//! off and keeps polling - it never crashes. A completion conflict means
//! another actor already resolved the run (a cancellation); the worker
//! logs it and moves on, never retrying the completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::{LogAppend, RunId, RunOutcome, TenantId, WorkerId};
use crate::engine::{ClaimedRun, Engine};
use crate::error::ErrorKind;

use super::executor::Executor;

/// Worker group configuration.
///
/// Identity is an explicit value, never derived from ambient process state;
/// loop instance `i` runs as `"{identity_base}-{i}"`, so two instances of
/// the same group never share an identity.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub identity_base: String,

    /// Optional tenant scope for claims.
    pub tenant: Option<TenantId>,

    /// How long to wait after an empty claim before polling again.
    pub poll_interval: Duration,

    /// Cadence of liveness pings while a run executes.
    pub heartbeat_interval: Duration,
}

impl WorkerConfig {
    pub fn new(identity_base: impl Into<String>) -> Self {
        Self {
            identity_base: identity_base.into(),
            tenant: None,
            poll_interval: Duration::from_millis(1500),
            heartbeat_interval: Duration::from_secs(10),
        }
    }

    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }
}

/// Worker group handle.
/// - `request_shutdown()` stops taking new claims
/// - `shutdown_and_join()` waits for in-flight executions to finish
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers sharing one engine and executor.
    pub fn spawn(
        n: usize,
        config: WorkerConfig,
        engine: Arc<Engine>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for index in 0..n {
            let worker = WorkerId::new(format!("{}-{}", config.identity_base, index));
            let cfg = config.clone();
            let engine = Arc::clone(&engine);
            let executor = Arc::clone(&executor);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker, cfg, engine, executor, &mut rx).await;
            });
            joins.push(join);
        }

        Self { shutdown_tx, joins }
    }

    /// Request shutdown for all workers. In-flight executions finish; only
    /// new claims stop.
    pub fn request_shutdown(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            let _ = join.await;
        }
    }
}

async fn worker_loop(
    worker: WorkerId,
    cfg: WorkerConfig,
    engine: Arc<Engine>,
    executor: Arc<dyn Executor>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let claimed = match engine.claim_run(&worker, cfg.tenant.as_ref()).await {
            Ok(claimed) => claimed,
            Err(e) => {
                // インフラ障害はログして次のサイクルへ（ループは死なない）
                tracing::warn!(worker = %worker, error = %e, "claim failed; backing off");
                idle_wait(cfg.poll_interval, shutdown_rx).await;
                continue;
            }
        };

        let Some(claimed) = claimed else {
            // 空振り。poll_interval か shutdown のどちらか早い方まで待つ
            idle_wait(cfg.poll_interval, shutdown_rx).await;
            continue;
        };

        run_one(&worker, &cfg, &engine, executor.as_ref(), claimed).await;
    }
}

async fn idle_wait(interval: Duration, shutdown_rx: &mut watch::Receiver<bool>) {
    tokio::select! {
        _ = shutdown_rx.changed() => {}
        _ = tokio::time::sleep(interval) => {}
    }
}

/// Execute one claimed run and report its completion.
async fn run_one(
    worker: &WorkerId,
    cfg: &WorkerConfig,
    engine: &Engine,
    executor: &dyn Executor,
    claimed: ClaimedRun,
) {
    let run_id = claimed.run.id;
    append_best_effort(
        engine,
        run_id,
        LogAppend::info(format!("claimed by {worker}")).with_source("worker"),
    )
    .await;

    let exec = executor.execute(&claimed.run, &claimed.version);
    tokio::pin!(exec);

    let mut ticker = tokio::time::interval(cfg.heartbeat_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval の初回 tick は即時なので読み捨てる（claim 時に heartbeat 済み）
    ticker.tick().await;

    let result = loop {
        tokio::select! {
            result = &mut exec => break result,
            _ = ticker.tick() => {
                match engine.heartbeat(run_id, worker).await {
                    Ok(_) => {}
                    Err(e) if e.kind() == ErrorKind::Conflict => {
                        // The run left Running under us - someone cancelled
                        // it. Stop executing; completing now would conflict.
                        tracing::info!(worker = %worker, run = %run_id, "run resolved elsewhere; abandoning execution");
                        append_best_effort(
                            engine,
                            run_id,
                            LogAppend::info("execution abandoned: run no longer owned")
                                .with_source("worker"),
                        )
                        .await;
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(worker = %worker, run = %run_id, error = %e, "heartbeat failed");
                    }
                }
            }
        }
    };

    match result {
        Ok(()) => {
            append_best_effort(
                engine,
                run_id,
                LogAppend::info("execution finished").with_source("worker"),
            )
            .await;
            report_completion(engine, worker, run_id, RunOutcome::Succeeded, None).await;
        }
        Err(message) => {
            append_best_effort(
                engine,
                run_id,
                LogAppend::error(format!("run failed: {message}"))
                    .with_source("worker")
                    .with_meta(serde_json::json!({"error": message})),
            )
            .await;
            report_completion(engine, worker, run_id, RunOutcome::Failed, Some(message)).await;
        }
    }
}

async fn report_completion(
    engine: &Engine,
    worker: &WorkerId,
    run_id: RunId,
    outcome: RunOutcome,
    error_message: Option<String>,
) {
    match engine.complete_run(run_id, outcome, error_message).await {
        Ok(run) => {
            tracing::info!(worker = %worker, run = %run_id, status = %run.status, "run completed");
        }
        Err(e) if e.kind() == ErrorKind::Conflict => {
            // Already resolved by another actor; never retried.
            tracing::info!(worker = %worker, run = %run_id, error = %e, "completion conflict; moving on");
        }
        Err(e) => {
            tracing::warn!(worker = %worker, run = %run_id, error = %e, "completion failed");
        }
    }
}

/// Per-run logs are best-effort from the worker's side; a failed append
/// must not fail the run.
async fn append_best_effort(engine: &Engine, run_id: RunId, append: LogAppend) {
    if let Err(e) = engine.append_log(run_id, append).await {
        tracing::debug!(run = %run_id, error = %e, "append_log failed");
    }
}
