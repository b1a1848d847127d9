//! @ai:module:intent Registry of the eval tasks this crate ships
//! @ai:module:layer application
//! @ai:module:public_api registry, find, select, ExtractCapacitorInfo, ExtractPressReleases

pub mod capacitor_info;
pub mod press_releases;

pub use capacitor_info::ExtractCapacitorInfo;
pub use press_releases::ExtractPressReleases;

use crate::config::TaskFilter;
use crate::error::{EvalError, Result};
use crate::task::EvalTask;
use std::sync::Arc;

/// @ai:intent All known tasks, sorted by name
/// @ai:effects pure
pub fn registry() -> Vec<Arc<dyn EvalTask>> {
    let mut tasks: Vec<Arc<dyn EvalTask>> =
        vec![Arc::new(ExtractCapacitorInfo), Arc::new(ExtractPressReleases)];
    tasks.sort_by(|a, b| a.name().cmp(b.name()));
    tasks
}

/// @ai:intent Look up one task by name
/// @ai:effects pure
pub fn find(name: &str) -> Result<Arc<dyn EvalTask>> {
    registry()
        .into_iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| EvalError::UnknownTask(name.to_string()))
}

/// @ai:intent Tasks selected by a filter; naming an unknown task is an error
/// @ai:effects pure
pub fn select(filter: &TaskFilter) -> Result<Vec<Arc<dyn EvalTask>>> {
    if let Some(names) = &filter.tasks {
        for name in names {
            find(name)?;
        }
    }

    Ok(registry()
        .into_iter()
        .filter(|t| filter.matches(t.name()))
        .collect())
}
