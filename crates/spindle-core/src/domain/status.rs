//! Run and version status machines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Run status (the lifecycle state machine).
///
/// Transitions:
/// - Queued -> Running -> Succeeded
/// - Queued -> Running -> Failed
/// - Queued -> Cancelled
/// - Running -> Cancelled
///
/// Succeeded/Failed/Cancelled are terminal; nothing leaves a terminal state.
/// Serialized SCREAMING_SNAKE_CASE to match the wire names:
/// QUEUED / RUNNING / SUCCEEDED / FAILED / CANCELLED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Waiting to be claimed by a worker.
    Queued,

    /// Claimed; a worker owns it and is (supposed to be) executing.
    Running,

    /// Finished successfully.
    Succeeded,

    /// Finished with an error (error_message is set).
    Failed,

    /// Cancelled while queued or running.
    Cancelled,
}

impl RunStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    /// Active states are the ones Cancel may act on.
    pub fn is_active(self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::Running)
    }

    /// Only failed or cancelled runs may be retried.
    pub fn is_retryable(self) -> bool {
        matches!(self, RunStatus::Failed | RunStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "QUEUED",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a running run finished. The two legal completion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Succeeded,
    Failed,
}

impl RunOutcome {
    pub fn as_status(self) -> RunStatus {
        match self {
            RunOutcome::Succeeded => RunStatus::Succeeded,
            RunOutcome::Failed => RunStatus::Failed,
        }
    }
}

/// Approval status of a pipeline version.
///
/// Only Approved versions may back new or retried runs. Approval may change
/// later without invalidating runs that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Draft,
    Approved,
    Deprecated,
}

impl ApprovalStatus {
    pub fn is_approved(self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn status_serializes_as_wire_names() {
        let s = serde_json::to_string(&RunStatus::Queued).unwrap();
        assert_eq!(s, "\"QUEUED\"");

        let s = serde_json::to_string(&RunStatus::Cancelled).unwrap();
        assert_eq!(s, "\"CANCELLED\"");

        let back: RunStatus = serde_json::from_str("\"RUNNING\"").unwrap();
        assert_eq!(back, RunStatus::Running);
    }

    #[rstest]
    #[case::succeeded(RunStatus::Succeeded)]
    #[case::failed(RunStatus::Failed)]
    #[case::cancelled(RunStatus::Cancelled)]
    fn terminal_states_are_not_active(#[case] status: RunStatus) {
        assert!(status.is_terminal());
        assert!(!status.is_active());
    }

    #[rstest]
    #[case::queued(RunStatus::Queued)]
    #[case::running(RunStatus::Running)]
    fn active_states_are_not_terminal(#[case] status: RunStatus) {
        assert!(status.is_active());
        assert!(!status.is_terminal());
        assert!(!status.is_retryable());
    }

    #[test]
    fn only_failed_and_cancelled_are_retryable() {
        assert!(RunStatus::Failed.is_retryable());
        assert!(RunStatus::Cancelled.is_retryable());
        assert!(!RunStatus::Succeeded.is_retryable());
    }

    #[test]
    fn outcome_maps_to_status() {
        assert_eq!(RunOutcome::Succeeded.as_status(), RunStatus::Succeeded);
        assert_eq!(RunOutcome::Failed.as_status(), RunStatus::Failed);
    }

    #[test]
    fn only_approved_versions_pass_the_gate() {
        assert!(ApprovalStatus::Approved.is_approved());
        assert!(!ApprovalStatus::Draft.is_approved());
        assert!(!ApprovalStatus::Deprecated.is_approved());
    }
}
