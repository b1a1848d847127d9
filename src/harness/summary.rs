//! @ai:module:intent Aggregate task reports into pass/fail statistics
//! @ai:module:layer application
//! @ai:module:public_api EvalSummary, GroupStats
//! @ai:module:stateless true

use crate::harness::runner::TaskReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// @ai:intent Pass/fail counts for one model or one task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub name: String,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    /// Percentage, 0 to 100
    pub pass_rate: f64,
    pub avg_duration_ms: f64,
}

/// @ai:intent Complete results of one harness run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub timestamp: String,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub pass_rate: f64,
    pub by_model: Vec<GroupStats>,
    pub by_task: Vec<GroupStats>,
    pub reports: Vec<TaskReport>,
}

impl EvalSummary {
    /// @ai:intent Summarise reports, stamping the current time
    /// @ai:effects time
    pub fn aggregate(reports: Vec<TaskReport>) -> Self {
        Self::aggregate_at(reports, chrono::Utc::now().to_rfc3339())
    }

    /// @ai:intent Summarise reports under an explicit timestamp
    /// @ai:effects pure
    pub fn aggregate_at(reports: Vec<TaskReport>, timestamp: String) -> Self {
        let all: Vec<_> = reports.iter().collect();
        let overall = calculate_group("overall", &all);

        let by_model = group_by(&reports, |r| r.model.as_str().to_string());
        let by_task = group_by(&reports, |r| r.task.clone());

        Self {
            timestamp,
            total: overall.total,
            passed: overall.passed,
            failed: overall.failed,
            pass_rate: overall.pass_rate,
            by_model,
            by_task,
            reports,
        }
    }

    /// @ai:intent Whether every invocation succeeded
    /// @ai:effects pure
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// @ai:intent Reports whose outcome failed
    /// @ai:effects pure
    pub fn failures(&self) -> impl Iterator<Item = &TaskReport> {
        self.reports.iter().filter(|r| !r.outcome.success)
    }
}

/// @ai:intent Stats for a set of reports
/// @ai:effects pure
fn calculate_group(name: &str, reports: &[&TaskReport]) -> GroupStats {
    if reports.is_empty() {
        return GroupStats {
            name: name.to_string(),
            ..Default::default()
        };
    }

    let total = reports.len() as u32;
    let passed = reports.iter().filter(|r| r.outcome.success).count() as u32;

    GroupStats {
        name: name.to_string(),
        total,
        passed,
        failed: total - passed,
        pass_rate: (passed as f64 / total as f64) * 100.0,
        avg_duration_ms: average(reports.iter().map(|r| r.duration_ms as f64)),
    }
}

/// @ai:intent Group reports by a key, sorted by key
/// @ai:effects pure
fn group_by<F>(reports: &[TaskReport], key: F) -> Vec<GroupStats>
where
    F: Fn(&TaskReport) -> String,
{
    let mut groups: BTreeMap<String, Vec<&TaskReport>> = BTreeMap::new();

    for report in reports {
        groups.entry(key(report)).or_default().push(report);
    }

    groups
        .iter()
        .map(|(name, members)| calculate_group(name, members))
        .collect()
}

fn average<I: Iterator<Item = f64>>(iter: I) -> f64 {
    let (sum, count) = iter.fold((0.0, 0u32), |(s, c), v| (s + v, c + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
