//! Catalog and directory ports - the engine's external collaborators.
//!
//! Pure CRUD with no invariants beyond uniqueness; the engine consumes the
//! catalog through one predicate (is this version approved?) plus the
//! definition payload, and the directory through create-time existence
//! checks only.

use async_trait::async_trait;

use crate::domain::{ApprovalStatus, PipelineVersion, Tenant, TenantId, VersionId};
use crate::error::StoreError;

#[async_trait]
pub trait VersionCatalog: Send + Sync {
    async fn register(&self, version: PipelineVersion) -> Result<(), StoreError>;

    async fn get(&self, id: VersionId) -> Result<Option<PipelineVersion>, StoreError>;

    /// Approve/deprecate a version. Returns the updated record, or None if
    /// it does not exist. Changing approval never touches existing runs.
    async fn set_status(
        &self,
        id: VersionId,
        status: ApprovalStatus,
    ) -> Result<Option<PipelineVersion>, StoreError>;
}

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn register(&self, tenant: Tenant) -> Result<(), StoreError>;

    async fn get(&self, id: TenantId) -> Result<Option<Tenant>, StoreError>;
}
