//! Per-run log entries: an append-only event stream owned by the log sink.
//!
//! Entries are never mutated or deleted; ordering is (ts, seq) ascending,
//! where seq is the sink's insertion sequence breaking timestamp ties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{LogId, RunId, TenantId};

/// Severity of a log entry. Serialized uppercase (INFO, ERROR, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One appended entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    pub run_id: RunId,
    pub tenant_id: TenantId,

    pub ts: DateTime<Utc>,

    /// Insertion sequence assigned by the sink; breaks ts ties.
    pub seq: u64,

    pub level: LogLevel,
    pub message: String,

    /// Optional origin tag, e.g. "worker" or "engine".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// Fields a caller supplies when appending; id/ts/seq are stamped by the
/// engine and sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogAppend {
    pub level: LogLevel,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl LogAppend {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            source: None,
            meta: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Read order for a log page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOrder {
    #[default]
    Asc,
    Desc,
}

/// Pagination window over one run's entries.
///
/// `before`/`after` are exclusive ts bounds (backwards paging / tailing).
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub limit: usize,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
    pub order: LogOrder,
}

impl LogQuery {
    pub const DEFAULT_LIMIT: usize = 200;
    pub const MAX_LIMIT: usize = 1000;

    /// Limit clamped into 1..=MAX_LIMIT.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            before: None,
            after: None,
            order: LogOrder::Asc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_serializes_uppercase() {
        let s = serde_json::to_string(&LogLevel::Info).unwrap();
        assert_eq!(s, "\"INFO\"");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn append_builder_fills_optionals() {
        let a = LogAppend::info("claimed")
            .with_source("worker")
            .with_meta(serde_json::json!({"step": "claim"}));
        assert_eq!(a.level, LogLevel::Info);
        assert_eq!(a.source.as_deref(), Some("worker"));
        assert!(a.meta.is_some());
    }

    #[test]
    fn query_limit_is_clamped() {
        let q = LogQuery {
            limit: 0,
            ..LogQuery::default()
        };
        assert_eq!(q.effective_limit(), 1);

        let q = LogQuery {
            limit: 10_000,
            ..LogQuery::default()
        };
        assert_eq!(q.effective_limit(), LogQuery::MAX_LIMIT);

        assert_eq!(LogQuery::default().effective_limit(), 200);
    }
}
