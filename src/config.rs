//! @ai:module:intent Configuration structs for the eval harness
//! @ai:module:layer infrastructure
//! @ai:module:public_api EvalConfig, BrowserConfig, RunConfig, MatcherConfig, PathConfig, TaskFilter
//! @ai:module:stateless true

use crate::matcher::{NormalizeOptions, SimilarityMetric, StringMatcher, DEFAULT_THRESHOLD};
use crate::model::AvailableModel;
use crate::task::Timeouts;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Main configuration for the eval harness
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

/// @ai:intent Connection and timing settings for the automation service
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,
    #[serde(default = "default_extraction_timeout")]
    pub extraction_timeout_ms: u64,
    #[serde(default = "default_dom_settle_timeout")]
    pub dom_settle_timeout_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// @ai:intent Run configuration for eval execution
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_models")]
    pub models: Vec<AvailableModel>,
    #[serde(default)]
    pub use_text_extract: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub filter: TaskFilter,
    /// Extra options handed to every task
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// @ai:intent Normalization and scoring settings
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
    #[serde(default)]
    pub metric: SimilarityMetric,
    #[serde(flatten)]
    pub normalize: NormalizeOptions,
}

/// @ai:intent Path configuration for input/output directories
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
}

/// @ai:intent Filter configuration for selecting tasks
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub tasks: Option<Vec<String>>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            navigation_timeout_ms: default_navigation_timeout(),
            extraction_timeout_ms: default_extraction_timeout(),
            dom_settle_timeout_ms: default_dom_settle_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            use_text_extract: false,
            concurrency: default_concurrency(),
            dry_run: false,
            filter: TaskFilter::default(),
            options: serde_json::Map::new(),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            metric: SimilarityMetric::default(),
            normalize: NormalizeOptions::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            fixtures_dir: default_fixtures_dir(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_key_env() -> String {
    "BROWSER_API_KEY".to_string()
}

fn default_navigation_timeout() -> u64 {
    60_000
}

fn default_extraction_timeout() -> u64 {
    120_000
}

fn default_dom_settle_timeout() -> u64 {
    30_000
}

fn default_request_timeout() -> u64 {
    180
}

fn default_models() -> Vec<AvailableModel> {
    vec![AvailableModel::default()]
}

fn default_concurrency() -> usize {
    1
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("fixtures")
}

impl EvalConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate(path)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Reject values the harness cannot run with
    /// @ai:effects pure
    pub fn validate(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let invalid = |message: &str| crate::error::EvalError::Config {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        if !(0.0..=1.0).contains(&self.matcher.default_threshold) {
            return Err(invalid("matcher.default_threshold must be within [0, 1]"));
        }
        if self.run.concurrency == 0 {
            return Err(invalid("run.concurrency must be at least 1"));
        }
        if self.run.models.is_empty() {
            return Err(invalid("run.models must name at least one model"));
        }

        Ok(())
    }

    /// @ai:intent Timeouts applied to every task invocation
    /// @ai:effects pure
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            navigation_ms: self.browser.navigation_timeout_ms,
            extraction_ms: self.browser.extraction_timeout_ms,
        }
    }
}

impl MatcherConfig {
    /// @ai:intent Build the matcher described by this configuration
    /// @ai:effects pure
    pub fn build(&self) -> StringMatcher {
        StringMatcher::with_options(self.normalize.clone(), self.metric)
    }

    /// @ai:intent Threshold for ad-hoc comparisons: the requested one, else the configured default
    /// @ai:effects pure
    pub fn threshold(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.default_threshold)
    }
}

impl TaskFilter {
    /// @ai:intent Check if filter matches a task name
    /// @ai:effects pure
    pub fn matches(&self, name: &str) -> bool {
        self.tasks
            .as_ref()
            .map(|names| names.is_empty() || names.iter().any(|n| n == name))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filter_matches_all_when_empty() {
        let filter = TaskFilter::default();
        assert!(filter.matches("extract_capacitor_info"));

        let filter = TaskFilter {
            tasks: Some(vec![]),
        };
        assert!(filter.matches("extract_capacitor_info"));
    }

    #[test]
    fn test_filter_matches_specific_task() {
        let filter = TaskFilter {
            tasks: Some(vec!["extract_press_releases".to_string()]),
        };
        assert!(filter.matches("extract_press_releases"));
        assert!(!filter.matches("extract_capacitor_info"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EvalConfig = toml::from_str(
            r#"
[run]
models = ["claude-3-5-sonnet-latest", "gpt-4o-mini"]
concurrency = 2

[matcher]
metric = "dice"
strip_punctuation = false
"#,
        )
        .unwrap();

        assert_eq!(config.run.models.len(), 2);
        assert_eq!(config.run.models[0], AvailableModel::Claude35SonnetLatest);
        assert_eq!(config.matcher.metric, SimilarityMetric::Dice);
        assert!(!config.matcher.normalize.strip_punctuation);
        assert_eq!(config.matcher.default_threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.browser.endpoint, "http://localhost:3000");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("evals.toml");

        let mut config = EvalConfig::default();
        config.run.use_text_extract = true;
        config.save(&path).unwrap();

        let loaded = EvalConfig::load(&path).unwrap();
        assert!(loaded.run.use_text_extract);
        assert_eq!(loaded.browser.navigation_timeout_ms, 60_000);
    }

    #[test]
    fn test_invalid_threshold_rejected_on_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("evals.toml");
        std::fs::write(&path, "[matcher]\ndefault_threshold = 1.5\n").unwrap();

        assert!(EvalConfig::load(&path).is_err());
    }

    #[test]
    fn test_matcher_section_drives_comparisons() {
        let config: EvalConfig = toml::from_str(
            "[matcher]\ndefault_threshold = 0.6\nmetric = \"dice\"\nstrip_punctuation = false\n",
        )
        .unwrap();

        assert_eq!(config.matcher.threshold(None), 0.6);
        assert_eq!(config.matcher.threshold(Some(0.95)), 0.95);

        let matcher = config.matcher.build();
        assert_eq!(matcher.metric(), SimilarityMetric::Dice);
        assert!(!matcher.matches("EAR-99", "ear99"));
    }

    #[test]
    fn test_unknown_model_rejected_on_load() {
        let parsed: Result<EvalConfig, _> = toml::from_str("[run]\nmodels = [\"gpt-9\"]\n");
        assert!(parsed.is_err());
    }
}
