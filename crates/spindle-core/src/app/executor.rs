//! Executor seam: what actually happens between claim and complete.
//!
//! The engine schedules and tracks runs; executing the claimed version's
//! definition is a pluggable step behind this trait. The shipped
//! implementation is a placeholder that simulates work - a real executor
//! (DAG runner, subprocess, remote dispatch) plugs in here without
//! touching the lifecycle contract.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{PipelineVersion, RunRecord};

#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute one claimed run against its version definition.
    ///
    /// `Err` carries the human-readable failure message the worker reports
    /// via a FAILED completion.
    async fn execute(&self, run: &RunRecord, version: &PipelineVersion) -> Result<(), String>;
}

/// Placeholder executor: sleeps for a fixed duration instead of running the
/// definition. Rejects a null definition, and honors a `fail` string in the
/// run parameters so failure paths can be exercised end to end.
pub struct SimulatedExecutor {
    duration: Duration,
}

impl SimulatedExecutor {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl Executor for SimulatedExecutor {
    async fn execute(&self, run: &RunRecord, version: &PipelineVersion) -> Result<(), String> {
        if version.definition.is_null() {
            return Err("pipeline definition is required".to_string());
        }

        tokio::time::sleep(self.duration).await;

        if let Some(reason) = run.parameters.get("fail").and_then(|v| v.as_str()) {
            return Err(reason.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RunId, TenantId, TriggerKind, VersionId};
    use chrono::Utc;
    use ulid::Ulid;

    fn fixtures(parameters: serde_json::Value, definition: serde_json::Value) -> (RunRecord, PipelineVersion) {
        let now = Utc::now();
        let tenant_id = TenantId::from_ulid(Ulid::new());
        let version = PipelineVersion::new(
            VersionId::from_ulid(Ulid::new()),
            tenant_id,
            "daily-ingest",
            "v1",
            definition,
            now,
        );
        let run = RunRecord::new(
            RunId::from_ulid(Ulid::new()),
            tenant_id,
            version.id,
            TriggerKind::manual(),
            parameters,
            now,
        );
        (run, version)
    }

    #[tokio::test]
    async fn simulation_succeeds_with_a_definition() {
        let (run, version) = fixtures(serde_json::json!({}), serde_json::json!({"steps": []}));
        let exec = SimulatedExecutor::new(Duration::from_millis(1));
        assert!(exec.execute(&run, &version).await.is_ok());
    }

    #[tokio::test]
    async fn null_definition_is_rejected() {
        let (run, version) = fixtures(serde_json::json!({}), serde_json::Value::Null);
        let exec = SimulatedExecutor::new(Duration::from_millis(1));
        let err = exec.execute(&run, &version).await.unwrap_err();
        assert!(err.contains("definition"));
    }

    #[tokio::test]
    async fn fail_parameter_forces_the_failure_path() {
        let (run, version) = fixtures(
            serde_json::json!({"fail": "intentional failure"}),
            serde_json::json!({"steps": []}),
        );
        let exec = SimulatedExecutor::new(Duration::from_millis(1));
        assert_eq!(
            exec.execute(&run, &version).await.unwrap_err(),
            "intentional failure"
        );
    }
}
