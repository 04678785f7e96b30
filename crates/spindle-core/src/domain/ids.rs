//! Domain identifiers (strongly-typed IDs).
//!
//! ULID-based: sortable by generation time, safe to mint on any node without
//! coordination. A generic `Id<M>` with phantom marker types keeps RunId and
//! VersionId incompatible at compile time while sharing one implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait for each ID type.
///
/// Provides the prefix used in Display output ("run-", "ver-", ...).
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic identifier. The marker `M` costs nothing at runtime but prevents
/// mixing up IDs of different entities.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<M: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<M>,
}

impl<M: IdMarker> Id<M> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<M: IdMarker> From<Ulid> for Id<M> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<M: IdMarker> fmt::Display for Id<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", M::prefix(), self.ulid)
    }
}

/// Marker for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Run {}

impl IdMarker for Run {
    fn prefix() -> &'static str {
        "run-"
    }
}

/// Marker for a pipeline version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {}

impl IdMarker for Version {
    fn prefix() -> &'static str {
        "ver-"
    }
}

/// Marker for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tenant {}

impl IdMarker for Tenant {
    fn prefix() -> &'static str {
        "tenant-"
    }
}

/// Marker for a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Log {}

impl IdMarker for Log {
    fn prefix() -> &'static str {
        "log-"
    }
}

/// Identifier of a Run (the claim/complete/cancel/retry unit).
pub type RunId = Id<Run>;

/// Identifier of a PipelineVersion (the approved work description a run executes).
pub type VersionId = Id<Version>;

/// Identifier of a Tenant.
pub type TenantId = Id<Tenant>;

/// Identifier of a LogEntry.
pub type LogId = Id<Log>;

/// Worker identity.
///
/// Operator-supplied, not generated: two loop instances must never share one.
/// Recorded on the run at claim time as a historical marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
