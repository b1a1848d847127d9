//! End-to-end harness run: fixtures on disk, every registered task, reports
//! written to a results directory.

use extract_evals::browser::fixture_factory;
use extract_evals::config::EvalConfig;
use extract_evals::harness::{EvalRunner, EvalSummary};
use extract_evals::model::AvailableModel;
use extract_evals::report::{JsonReporter, ReportGenerator};
use extract_evals::tasks;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn write_fixtures(dir: &std::path::Path) {
    let capacitor = json!({
        "ECCN_code": "EAR99",
        "RoHS_Status": "RoHS Compliant",
        "Impedance": "12mOhm",
    });
    std::fs::write(
        dir.join("extract_capacitor_info.json"),
        serde_json::to_string_pretty(&capacitor).unwrap(),
    )
    .unwrap();

    // Too short a listing: the press release task fails on item count.
    let releases = json!({
        "items": [
            { "title": "UAW Region 9A Endorses Brad Lander for Mayor", "publish_date": "Dec 4, 2024" },
        ]
    });
    std::fs::write(
        dir.join("extract_press_releases.json"),
        serde_json::to_string(&releases).unwrap(),
    )
    .unwrap();
}

#[tokio::test]
async fn fixtures_run_produces_reports() {
    let temp = TempDir::new().unwrap();
    let fixtures = temp.path().join("fixtures");
    std::fs::create_dir_all(&fixtures).unwrap();
    write_fixtures(&fixtures);

    let mut config = EvalConfig::default();
    config.run.concurrency = 2;
    config
        .run
        .options
        .insert("settle_ms".to_string(), json!(0));

    let factory = fixture_factory(&fixtures).unwrap();
    let counts = factory.counts();
    let runner = EvalRunner::new(Arc::new(factory), &config);

    let selected = tasks::select(&config.run.filter).unwrap();
    let models = [AvailableModel::Gpt4o, AvailableModel::Gemini20Flash001];
    let reports = runner.run_all(&selected, &models).await.unwrap();

    assert_eq!(reports.len(), 4);
    assert_eq!(counts.init(), 4);
    assert_eq!(counts.close(), 4);

    let summary = EvalSummary::aggregate(reports);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 2);

    let press = summary
        .by_task
        .iter()
        .find(|g| g.name == "extract_press_releases")
        .unwrap();
    assert_eq!(press.passed, 0);

    for failure in summary.failures() {
        assert_eq!(failure.task, "extract_press_releases");
        assert_eq!(
            failure.outcome.error.as_deref(),
            Some("Not enough items extracted")
        );
    }

    let output_dir = temp.path().join("results").join("run");
    ReportGenerator::new()
        .generate_all(&summary, &output_dir)
        .unwrap();

    let reloaded = JsonReporter::load(&output_dir.join("results.json")).unwrap();
    assert_eq!(reloaded.total, 4);

    let markdown = std::fs::read_to_string(output_dir.join("results.md")).unwrap();
    assert!(markdown.contains("google/gemini-2.0-flash-001"));
    assert!(markdown.contains("Not enough items extracted"));
}
