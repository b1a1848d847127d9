//! @ai:module:intent Run eval tasks and summarise their outcomes
//! @ai:module:layer application
//! @ai:module:public_api EvalRunner, TaskReport, EvalSummary, GroupStats

pub mod runner;
pub mod summary;

pub use runner::{EvalRunner, TaskReport};
pub use summary::{EvalSummary, GroupStats};
