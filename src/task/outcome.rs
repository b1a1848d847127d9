//! @ai:module:intent Structured pass/fail record returned by every eval task
//! @ai:module:layer domain
//! @ai:module:public_api EvalOutcome, GENERIC_FAILURE
//! @ai:module:stateless true

use crate::browser::InitResponse;
use crate::logger::{LogEntry, LEVEL_ERROR};
use serde::{Deserialize, Serialize};

/// Error reported when a collaborator or schema failure ends a task.
pub const GENERIC_FAILURE: &str = "An error occurred during extraction";

/// @ai:intent Result of one task invocation, owned by the harness once returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<LogEntry>,
    pub debug_url: String,
    pub session_url: String,
}

impl EvalOutcome {
    /// @ai:intent Successful outcome
    /// @ai:effects pure
    pub fn passed(logs: Vec<LogEntry>, session: &InitResponse) -> Self {
        Self {
            success: true,
            error: None,
            logs,
            debug_url: session.debug_url.clone(),
            session_url: session.session_url.clone(),
        }
    }

    /// @ai:intent Failed outcome with a human-readable reason
    /// @ai:effects pure
    pub fn failed(error: impl Into<String>, logs: Vec<LogEntry>, session: &InitResponse) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            logs,
            debug_url: session.debug_url.clone(),
            session_url: session.session_url.clone(),
        }
    }

    /// @ai:intent Error-severity entries in this outcome
    /// @ai:effects pure
    pub fn error_logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter().filter(|e| e.level == LEVEL_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> InitResponse {
        InitResponse {
            debug_url: "https://debug".to_string(),
            session_url: "https://session".to_string(),
        }
    }

    #[test]
    fn test_passed_has_no_error() {
        let outcome = EvalOutcome::passed(vec![], &urls());
        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.debug_url, "https://debug");
    }

    #[test]
    fn test_serialized_shape() {
        let outcome = EvalOutcome::failed(GENERIC_FAILURE, vec![LogEntry::error("boom")], &urls());
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], GENERIC_FAILURE);
        assert_eq!(json["sessionUrl"], "https://session");
        assert_eq!(json["logs"][0]["message"], "boom");
        assert_eq!(outcome.error_logs().count(), 1);
    }
}
