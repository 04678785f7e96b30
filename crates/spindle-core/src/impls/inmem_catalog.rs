//! In-memory catalog and directory implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ApprovalStatus, PipelineVersion, Tenant, TenantId, VersionId};
use crate::error::StoreError;
use crate::ports::catalog::{TenantDirectory, VersionCatalog};

pub struct InMemoryCatalog {
    versions: Mutex<HashMap<VersionId, PipelineVersion>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            versions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionCatalog for InMemoryCatalog {
    async fn register(&self, version: PipelineVersion) -> Result<(), StoreError> {
        let mut versions = self.versions.lock().await;
        versions.insert(version.id, version);
        Ok(())
    }

    async fn get(&self, id: VersionId) -> Result<Option<PipelineVersion>, StoreError> {
        let versions = self.versions.lock().await;
        Ok(versions.get(&id).cloned())
    }

    async fn set_status(
        &self,
        id: VersionId,
        status: ApprovalStatus,
    ) -> Result<Option<PipelineVersion>, StoreError> {
        let mut versions = self.versions.lock().await;
        Ok(versions.get_mut(&id).map(|v| {
            v.status = status;
            v.clone()
        }))
    }
}

pub struct InMemoryDirectory {
    tenants: Mutex<HashMap<TenantId, Tenant>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            tenants: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantDirectory for InMemoryDirectory {
    async fn register(&self, tenant: Tenant) -> Result<(), StoreError> {
        let mut tenants = self.tenants.lock().await;
        tenants.insert(tenant.id, tenant);
        Ok(())
    }

    async fn get(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        let tenants = self.tenants.lock().await;
        Ok(tenants.get(&id).cloned())
    }
}
