//! @ai:module:intent Human-readable run summary for the terminal
//! @ai:module:layer presentation
//! @ai:module:public_api format_summary
//! @ai:module:stateless true

use crate::harness::EvalSummary;
use colored::Colorize;

/// @ai:intent Format the run summary with PASS/FAIL markers
/// @ai:effects pure
pub fn format_summary(summary: &EvalSummary) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Extraction Eval Results\n");
    output.push_str("=======================\n\n");

    for report in &summary.reports {
        let marker = if report.outcome.success {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        output.push_str(&format!(
            "{} {:<28} {:<30} {}\n",
            marker,
            report.task,
            report.model.as_str().dimmed(),
            format!("{}ms", report.duration_ms).dimmed()
        ));

        if let Some(error) = &report.outcome.error {
            output.push_str(&format!("     {} {}\n", "error:".yellow(), error));
        }
        if !report.outcome.success && !report.outcome.debug_url.is_empty() {
            output.push_str(&format!("     {} {}\n", "debug:".cyan(), report.outcome.debug_url));
        }
    }

    output.push('\n');
    let totals = format!(
        "{}/{} passed ({:.1}%)",
        summary.passed, summary.total, summary.pass_rate
    );

    if summary.all_passed() {
        output.push_str(&format!("{} {}\n", "OK".green().bold(), totals));
    } else {
        output.push_str(&format!(
            "{} {}, {} failed\n",
            "FAILED".red().bold(),
            totals,
            summary.failed.to_string().red().bold()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::InitResponse;
    use crate::harness::TaskReport;
    use crate::model::AvailableModel;
    use crate::task::{EvalOutcome, GENERIC_FAILURE};

    #[test]
    fn test_format_summary_lists_failures() {
        colored::control::set_override(false);

        let session = InitResponse {
            debug_url: "mock://debug/extract_press_releases".to_string(),
            session_url: "mock://session/extract_press_releases".to_string(),
        };
        let summary = EvalSummary::aggregate_at(
            vec![TaskReport {
                task: "extract_press_releases".to_string(),
                model: AvailableModel::Gpt4oMini,
                outcome: EvalOutcome::failed(GENERIC_FAILURE, vec![], &session),
                duration_ms: 5,
            }],
            "2026-01-19T00:00:00Z".to_string(),
        );

        let text = format_summary(&summary);

        assert!(text.contains("FAIL extract_press_releases"));
        assert!(text.contains(GENERIC_FAILURE));
        assert!(text.contains("mock://debug/extract_press_releases"));
        assert!(text.contains("FAILED 0/1 passed (0.0%), 1 failed"));
    }
}
