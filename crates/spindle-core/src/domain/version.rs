//! Pipeline version: the approved work description a run executes against.
//!
//! The engine consumes versions through one predicate ("is it approved?")
//! plus the definition payload returned on claim. Everything else about the
//! catalog is plain CRUD and lives behind the VersionCatalog port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{TenantId, VersionId};
use super::status::ApprovalStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineVersion {
    pub id: VersionId,
    pub tenant_id: TenantId,

    /// Pipeline this version belongs to (name, not a separate entity here).
    pub pipeline: String,

    /// Version label, e.g. "v1".
    pub version: String,

    pub status: ApprovalStatus,

    /// Opaque execution definition handed to the executor as-is. Kept
    /// flexible as JSON so it can evolve without breaking the engine.
    pub definition: serde_json::Value,

    pub created_at: DateTime<Utc>,
}

impl PipelineVersion {
    /// New versions start as drafts and must be approved before any run can
    /// be created against them.
    pub fn new(
        id: VersionId,
        tenant_id: TenantId,
        pipeline: impl Into<String>,
        version: impl Into<String>,
        definition: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            pipeline: pipeline.into(),
            version: version.into(),
            status: ApprovalStatus::Draft,
            definition,
            created_at: now,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn new_version_starts_as_draft() {
        let v = PipelineVersion::new(
            VersionId::from_ulid(Ulid::new()),
            TenantId::from_ulid(Ulid::new()),
            "daily-ingest",
            "v1",
            serde_json::json!({"steps": []}),
            Utc::now(),
        );
        assert_eq!(v.status, ApprovalStatus::Draft);
        assert!(!v.is_approved());
    }
}
