//! @ai:module:intent Per-invocation task state machine
//! @ai:module:layer domain
//! @ai:module:public_api TaskPhase, PhaseTracker
//! @ai:module:stateless false

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// @ai:intent Phase of a single task invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPhase {
    Initializing,
    Navigating,
    Extracting,
    Comparing,
    Cleanup,
    Succeeded,
    Failed,
}

impl TaskPhase {
    /// @ai:intent Get string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPhase::Initializing => "initializing",
            TaskPhase::Navigating => "navigating",
            TaskPhase::Extracting => "extracting",
            TaskPhase::Comparing => "comparing",
            TaskPhase::Cleanup => "cleanup",
            TaskPhase::Succeeded => "succeeded",
            TaskPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskPhase::Succeeded | TaskPhase::Failed)
    }

    /// @ai:intent Whether the state machine allows moving from self to next
    /// @ai:effects pure
    pub fn can_transition_to(&self, next: TaskPhase) -> bool {
        use TaskPhase::*;

        match (*self, next) {
            (Succeeded | Failed, _) => false,
            (Cleanup, Succeeded | Failed) => true,
            (Cleanup, _) => false,
            (_, Cleanup) => true,
            (Initializing, Navigating) => true,
            (Navigating, Navigating | Extracting) => true,
            (Extracting, Extracting | Comparing) => true,
            (Comparing, Comparing) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Records the phases one task invocation passes through
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    task: String,
    history: Vec<TaskPhase>,
}

impl PhaseTracker {
    /// @ai:intent Start tracking in the Initializing phase
    /// @ai:effects pure
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            history: vec![TaskPhase::Initializing],
        }
    }

    pub fn current(&self) -> TaskPhase {
        self.history
            .last()
            .copied()
            .unwrap_or(TaskPhase::Initializing)
    }

    /// Distinct phases in the order they were entered.
    pub fn history(&self) -> &[TaskPhase] {
        &self.history
    }

    /// @ai:intent Move to the next phase; repeated entry into the current phase is a no-op
    /// @ai:effects state:write
    pub fn enter(&mut self, next: TaskPhase) -> Result<()> {
        let current = self.current();

        if current == next && !current.is_terminal() && current != TaskPhase::Cleanup {
            return Ok(());
        }

        if !current.can_transition_to(next) {
            return Err(EvalError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        tracing::debug!(task = %self.task, "{} -> {}", current, next);
        self.history.push(next);
        Ok(())
    }
}
