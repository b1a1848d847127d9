//! @ai:module:intent The contract every eval task satisfies
//! @ai:module:layer application
//! @ai:module:public_api EvalTask, ExtractionScenario, RunContext, Timeouts, Verdict, Mismatch, EvalOutcome, TaskScope
//!
//! A harness only ever sees [`EvalTask`]: give it a [`RunContext`], get back
//! an [`EvalOutcome`]. Concrete tasks are written as [`ExtractionScenario`]s
//! and pick up the shared task boundary (session cleanup, error capture,
//! outcome shape) through a blanket implementation.

pub mod outcome;
pub mod phase;
pub mod scope;

pub use outcome::{EvalOutcome, GENERIC_FAILURE};
pub use phase::{PhaseTracker, TaskPhase};
pub use scope::{run_scenario, TaskScope};

use crate::browser::SessionFactory;
use crate::error::Result;
use crate::logger::{AuxiliaryValue, EvalLogger};
use crate::matcher::StringMatcher;
use crate::model::AvailableModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// @ai:intent Bounded waits applied to collaborator calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub navigation_ms: u64,
    pub extraction_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 60_000,
            extraction_ms: 120_000,
        }
    }
}

/// @ai:intent Inputs for one task invocation
pub struct RunContext {
    pub model: AvailableModel,
    /// Fresh per invocation; its entries end up in the outcome
    pub logger: EvalLogger,
    pub use_text_extract: bool,
    pub options: serde_json::Map<String, serde_json::Value>,
    pub sessions: Arc<dyn SessionFactory>,
    pub timeouts: Timeouts,
    pub matcher: StringMatcher,
}

impl RunContext {
    /// @ai:intent Context with default timeouts, matcher and no extra options
    /// @ai:effects pure
    pub fn new(model: AvailableModel, logger: EvalLogger, sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            model,
            logger,
            use_text_extract: false,
            options: serde_json::Map::new(),
            sessions,
            timeouts: Timeouts::default(),
            matcher: StringMatcher::new(),
        }
    }

    pub fn with_text_extract(mut self, use_text_extract: bool) -> Self {
        self.use_text_extract = use_text_extract;
        self
    }

    pub fn with_options(mut self, options: serde_json::Map<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_matcher(mut self, matcher: StringMatcher) -> Self {
        self.matcher = matcher;
        self
    }
}

/// @ai:intent A failed assertion: which value was expected and what was extracted
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub message: String,
    pub expected: AuxiliaryValue,
    pub actual: AuxiliaryValue,
}

/// @ai:intent What a scenario concluded about the extracted data
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Mismatch(Mismatch),
}

/// @ai:intent Uniform entry point a harness invokes polymorphically
#[async_trait]
pub trait EvalTask: Send + Sync {
    fn name(&self) -> &str;

    /// @ai:intent Run once; expected failures come back as `success = false`
    /// @ai:post Err only for programmer errors
    async fn run(&self, ctx: RunContext) -> Result<EvalOutcome>;
}

/// @ai:intent The task-specific part of an eval: navigate, extract, judge
#[async_trait]
pub trait ExtractionScenario: Send + Sync {
    fn name(&self) -> &'static str;

    /// DOM settle timeout requested when the session is opened.
    fn dom_settle_timeout_ms(&self) -> Option<u64> {
        None
    }

    /// @ai:intent Drive the session and decide pass or mismatch
    async fn execute(&self, scope: &mut TaskScope<'_>) -> Result<Verdict>;
}

#[async_trait]
impl<S: ExtractionScenario> EvalTask for S {
    fn name(&self) -> &str {
        ExtractionScenario::name(self)
    }

    async fn run(&self, ctx: RunContext) -> Result<EvalOutcome> {
        run_scenario(self, ctx).await
    }
}
