//! @ai:module:intent Extraction eval library: fuzzy string matching and the eval task protocol
//! @ai:module:layer application
//! @ai:module:public_api matcher, task, tasks, browser, harness, report, config, logger, model, schema, error

pub mod browser;
pub mod config;
pub mod error;
pub mod harness;
pub mod logger;
pub mod matcher;
pub mod model;
pub mod report;
pub mod schema;
pub mod task;
pub mod tasks;

pub use config::EvalConfig;
pub use error::{EvalError, MatchError};
pub use harness::{EvalRunner, EvalSummary, TaskReport};
pub use logger::{AuxiliaryValue, EvalLogger, LogEntry};
pub use matcher::{ComparisonResult, StringMatcher};
pub use model::AvailableModel;
pub use report::ReportGenerator;
pub use task::{EvalOutcome, EvalTask, ExtractionScenario, RunContext};
