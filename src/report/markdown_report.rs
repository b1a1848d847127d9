//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::harness::{EvalSummary, GroupStats, TaskReport};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Write the summary as Markdown
    fn generate(&self, summary: &EvalSummary, output_path: &Path) -> Result<()>;
}

/// @ai:intent Renders summary tables and failure details as Markdown
pub struct MarkdownReporter;

impl MarkdownReporter {
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Render the whole report
    /// @ai:effects pure
    pub fn render(summary: &EvalSummary) -> String {
        let mut content = String::new();

        content.push_str(&Self::generate_summary(summary));
        content.push_str(&Self::generate_group_section("Results by Model", "Model", &summary.by_model));
        content.push_str(&Self::generate_group_section("Results by Task", "Task", &summary.by_task));
        content.push_str(&Self::generate_runs_section(&summary.reports));
        content.push_str(&Self::generate_failures_section(summary));

        content
    }

    /// @ai:intent Escape a value for use inside a table cell
    /// @ai:effects pure
    fn cell(value: &str) -> String {
        value.replace('|', "\\|").replace('\n', " ")
    }

    fn generate_summary(summary: &EvalSummary) -> String {
        let mut output = String::new();

        writeln!(output, "# Extraction Eval Results").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Date:** {}", summary.timestamp).unwrap();
        writeln!(
            output,
            "**Passed:** {}/{} ({:.1}%)",
            summary.passed, summary.total, summary.pass_rate
        )
        .unwrap();
        writeln!(output).unwrap();

        output
    }

    fn generate_group_section(title: &str, column: &str, groups: &[GroupStats]) -> String {
        let mut output = String::new();

        writeln!(output, "## {}", title).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| {} | Passed | Failed | Pass Rate | Avg Duration |", column).unwrap();
        writeln!(output, "|------|--------|--------|-----------|--------------|").unwrap();

        for group in groups {
            writeln!(
                output,
                "| {} | {} | {} | {:.1}% | {:.0}ms |",
                group.name, group.passed, group.failed, group.pass_rate, group.avg_duration_ms
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    fn generate_runs_section(reports: &[TaskReport]) -> String {
        let mut output = String::new();

        writeln!(output, "## Runs").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Task | Model | Result | Duration | Session |").unwrap();
        writeln!(output, "|------|-------|--------|----------|---------|").unwrap();

        for report in reports {
            let result = if report.outcome.success { "PASS" } else { "FAIL" };
            let session = if report.outcome.session_url.is_empty() {
                "-".to_string()
            } else {
                Self::cell(&report.outcome.session_url)
            };

            writeln!(
                output,
                "| {} | {} | {} | {}ms | {} |",
                report.task, report.model, result, report.duration_ms, session
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Error message and error-level log entries of each failed run
    /// @ai:effects pure
    fn generate_failures_section(summary: &EvalSummary) -> String {
        let mut output = String::new();
        let failures: Vec<_> = summary.failures().collect();

        if failures.is_empty() {
            return output;
        }

        writeln!(output, "## Failures").unwrap();
        writeln!(output).unwrap();

        for report in failures {
            writeln!(output, "### {} ({})", report.task, report.model).unwrap();
            writeln!(output).unwrap();
            writeln!(
                output,
                "**Error:** {}",
                report.outcome.error.as_deref().unwrap_or("unknown error")
            )
            .unwrap();

            if !report.outcome.debug_url.is_empty() {
                writeln!(output, "**Debug URL:** {}", report.outcome.debug_url).unwrap();
            }
            writeln!(output).unwrap();

            for entry in report.outcome.error_logs() {
                writeln!(output, "- {}", entry.message).unwrap();
                for (name, value) in &entry.auxiliary {
                    writeln!(output, "  - `{}` ({}): {}", name, value.kind, Self::cell(&value.value))
                        .unwrap();
                }
            }

            writeln!(output).unwrap();
        }

        output
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:effects fs:write
    fn generate(&self, summary: &EvalSummary, output_path: &Path) -> Result<()> {
        std::fs::write(output_path, Self::render(summary))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::InitResponse;
    use crate::logger::{AuxiliaryValue, LogEntry};
    use crate::model::AvailableModel;
    use crate::task::EvalOutcome;
    use tempfile::TempDir;

    fn summary() -> EvalSummary {
        let session = InitResponse {
            debug_url: "mock://debug/extract_capacitor_info".to_string(),
            session_url: "mock://session/extract_capacitor_info".to_string(),
        };
        let logs = vec![LogEntry::error("Impedance extracted does not match expected")
            .with("expected", AuxiliaryValue::string("12mohm"))
            .with("actual", AuxiliaryValue::string("15mohm"))];

        EvalSummary::aggregate_at(
            vec![
                TaskReport {
                    task: "extract_capacitor_info".to_string(),
                    model: AvailableModel::Gpt4o,
                    outcome: EvalOutcome::passed(vec![], &session),
                    duration_ms: 120,
                },
                TaskReport {
                    task: "extract_capacitor_info".to_string(),
                    model: AvailableModel::O1Mini,
                    outcome: EvalOutcome::failed(
                        "Impedance extracted does not match expected",
                        logs,
                        &session,
                    ),
                    duration_ms: 80,
                },
            ],
            "2026-01-19T00:00:00Z".to_string(),
        )
    }

    #[test]
    fn test_cell_escapes_pipes() {
        assert_eq!(MarkdownReporter::cell("a|b\nc"), "a\\|b c");
    }

    #[test]
    fn test_render_includes_failure_details() {
        let content = MarkdownReporter::render(&summary());

        assert!(content.contains("# Extraction Eval Results"));
        assert!(content.contains("**Passed:** 1/2 (50.0%)"));
        assert!(content.contains("| o1-mini | 0 | 1 | 0.0% | 80ms |"));
        assert!(content.contains("### extract_capacitor_info (o1-mini)"));
        assert!(content.contains("`actual` (string): 15mohm"));
    }

    #[test]
    fn test_generate_markdown_report() {
        let reporter = MarkdownReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.md");

        reporter.generate(&summary(), &output).unwrap();
        assert!(output.exists());
    }
}
