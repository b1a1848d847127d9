//! @ai:module:intent Append-only structured log collected during one task run
//! @ai:module:layer domain
//! @ai:module:public_api EvalLogger, LogEntry, AuxiliaryValue, ValueKind
//! @ai:module:stateless false

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Severity of an error entry.
pub const LEVEL_ERROR: u8 = 0;
/// Severity of an informational entry.
pub const LEVEL_INFO: u8 = 1;
/// Severity of a debug entry.
pub const LEVEL_DEBUG: u8 = 2;

/// @ai:intent Declared type of an auxiliary value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Object,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent A named value attached to a log entry, kept as text with its declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryValue {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

impl AuxiliaryValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: ValueKind::String,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            value: value.to_string(),
            kind: ValueKind::Integer,
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            value: value.to_string(),
            kind: ValueKind::Float,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            value: value.to_string(),
            kind: ValueKind::Boolean,
        }
    }

    /// @ai:intent Wrap a JSON value, serialized compactly
    /// @ai:effects pure
    pub fn object(value: &serde_json::Value) -> Self {
        Self {
            value: value.to_string(),
            kind: ValueKind::Object,
        }
    }
}

/// @ai:intent One structured log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub level: u8,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auxiliary: BTreeMap<String, AuxiliaryValue>,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, level: u8) -> Self {
        Self {
            message: message.into(),
            level,
            auxiliary: BTreeMap::new(),
        }
    }

    /// @ai:intent Error-severity entry
    /// @ai:effects pure
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, LEVEL_ERROR)
    }

    /// @ai:intent Attach an auxiliary value, replacing any previous one with the same name
    /// @ai:effects pure
    pub fn with(mut self, name: impl Into<String>, value: AuxiliaryValue) -> Self {
        self.auxiliary.insert(name.into(), value);
        self
    }
}

/// @ai:intent Per-run logger; entries are mirrored to tracing and kept for the outcome
///
/// Not `Clone`: each task invocation gets its own instance so logs never leak
/// between runs.
#[derive(Debug)]
pub struct EvalLogger {
    label: String,
    entries: Mutex<Vec<LogEntry>>,
}

impl EvalLogger {
    /// @ai:intent Create an empty logger labelled for tracing output
    /// @ai:effects pure
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// @ai:intent Append an entry at its own level
    /// @ai:effects state:write, io
    pub fn log(&self, entry: LogEntry) {
        match entry.level {
            LEVEL_ERROR => tracing::error!(run = %self.label, aux = ?entry.auxiliary, "{}", entry.message),
            LEVEL_INFO => tracing::info!(run = %self.label, "{}", entry.message),
            _ => tracing::debug!(run = %self.label, "{}", entry.message),
        }

        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }

    /// @ai:intent Append an entry forced to error severity
    /// @ai:effects state:write, io
    pub fn error(&self, entry: LogEntry) {
        self.log(LogEntry {
            level: LEVEL_ERROR,
            ..entry
        });
    }

    /// @ai:intent Append an informational message
    /// @ai:effects state:write, io
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogEntry::new(message, LEVEL_INFO));
    }

    /// @ai:intent Snapshot of entries in insertion order
    /// @ai:effects pure
    pub fn get_logs(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// @ai:intent Count of error-severity entries
    /// @ai:effects pure
    pub fn error_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|e| e.level == LEVEL_ERROR)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entries_keep_order() {
        let logger = EvalLogger::new("test");
        logger.info("navigating");
        logger.error(LogEntry::new("mismatch", LEVEL_INFO));
        logger.log(LogEntry::new("detail", LEVEL_DEBUG));

        let logs = logger.get_logs();
        let messages: Vec<_> = logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["navigating", "mismatch", "detail"]);
        assert_eq!(logs[1].level, LEVEL_ERROR);
        assert_eq!(logger.error_count(), 1);
    }

    #[test]
    fn test_separate_loggers_do_not_share_entries() {
        let first = EvalLogger::new("first");
        let second = EvalLogger::new("second");
        first.info("only in first");
        assert!(second.get_logs().is_empty());
    }

    #[test]
    fn test_entry_serialization_uses_type_key() {
        let entry = LogEntry::error("Impedance extracted does not match expected")
            .with("expected", AuxiliaryValue::string("12mohm"))
            .with("actual", AuxiliaryValue::integer(15));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], 0);
        assert_eq!(json["auxiliary"]["expected"]["type"], "string");
        assert_eq!(json["auxiliary"]["actual"]["type"], "integer");
        assert_eq!(json["auxiliary"]["actual"]["value"], "15");
    }
}
