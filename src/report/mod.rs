//! @ai:module:intent Report generation for eval results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter, format_summary

pub mod console;
pub mod json_report;
pub mod markdown_report;

pub use console::format_summary;
pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};

use crate::harness::EvalSummary;
use anyhow::Result;
use std::path::Path;

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
        }
    }

    /// @ai:intent Write results.json and results.md into the output directory
    /// @ai:effects fs:write
    pub fn generate_all(&self, summary: &EvalSummary, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        self.json.generate(summary, &output_dir.join("results.json"))?;
        self.markdown
            .generate(summary, &output_dir.join("results.md"))?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_all_creates_both_files() {
        let temp = TempDir::new().unwrap();
        let output_dir = temp.path().join("2026-01-19_00-00-00");

        let summary = EvalSummary::aggregate(vec![]);
        ReportGenerator::new().generate_all(&summary, &output_dir).unwrap();

        assert!(output_dir.join("results.json").exists());
        assert!(output_dir.join("results.md").exists());
    }
}
