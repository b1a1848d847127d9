//! @ai:module:intent CLI for the extraction eval harness
//! @ai:module:layer presentation

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use extract_evals::{
    browser::{fixture_factory, HttpSessionFactory, MockSessionFactory, SessionFactory},
    config::{EvalConfig, TaskFilter},
    harness::{EvalRunner, EvalSummary},
    matcher::SimilarityMetric,
    model::AvailableModel,
    report::{format_summary, ReportGenerator},
    task::EvalTask,
    tasks,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "extract-evals")]
#[command(about = "Evaluate structured web extraction across models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run eval tasks
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Task names (comma-separated)
        #[arg(long)]
        tasks: Option<String>,

        /// Model identifiers (comma-separated)
        #[arg(long)]
        models: Option<String>,

        /// Extract from page text instead of the DOM
        #[arg(long)]
        use_text_extract: bool,

        /// Maximum task invocations in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Use the in-process mock instead of the automation service
        #[arg(long)]
        dry_run: bool,

        /// Replay extraction payloads from a fixtures directory
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available tasks
    List,

    /// List supported models
    Models,

    /// Compare two strings the way the tasks do
    Compare {
        actual: String,
        expected: String,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Defaults to matcher.default_threshold
        #[arg(short, long)]
        threshold: Option<f64>,

        /// levenshtein or dice; defaults to matcher.metric
        #[arg(short, long)]
        metric: Option<SimilarityMetric>,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "evals.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("extract_evals=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            tasks,
            models,
            use_text_extract,
            concurrency,
            dry_run,
            fixtures,
            output,
        } => {
            run_evals(RunArgs {
                config,
                tasks,
                models,
                use_text_extract,
                concurrency,
                dry_run,
                fixtures,
                output,
            })
            .await
        }
        Commands::List => list_tasks(),
        Commands::Models => list_models(),
        Commands::Compare {
            actual,
            expected,
            config,
            threshold,
            metric,
        } => compare_strings(&actual, &expected, config, threshold, metric),
        Commands::Init { output } => init_config(output),
    }
}

struct RunArgs {
    config: Option<PathBuf>,
    tasks: Option<String>,
    models: Option<String>,
    use_text_extract: bool,
    concurrency: Option<usize>,
    dry_run: bool,
    fixtures: Option<PathBuf>,
    output: Option<PathBuf>,
}

/// @ai:intent Run the selected tasks against the selected models and write reports
/// @ai:effects network, fs:write
async fn run_evals(args: RunArgs) -> Result<()> {
    let mut config = load_or_default_config(args.config)?;

    if let Some(names) = args.tasks {
        config.run.filter = TaskFilter {
            tasks: Some(split_list(&names)),
        };
    }
    if let Some(models) = args.models {
        config.run.models = split_list(&models)
            .iter()
            .map(|m| m.parse::<AvailableModel>())
            .collect::<Result<_, _>>()?;
    }
    if let Some(concurrency) = args.concurrency {
        config.run.concurrency = concurrency;
    }
    config.run.use_text_extract |= args.use_text_extract;
    config.run.dry_run |= args.dry_run;
    config.validate(std::path::Path::new("<command line>"))?;

    let selected = tasks::select(&config.run.filter)?;
    if selected.is_empty() {
        tracing::warn!("No tasks match the filter criteria");
        return Ok(());
    }

    let sessions = session_factory(&config, args.fixtures)?;
    let runner = EvalRunner::new(sessions, &config);

    tracing::info!(
        "Running {} tasks against {} models",
        selected.len(),
        config.run.models.len()
    );

    let reports = runner.run_all(&selected, &config.run.models).await?;
    let summary = EvalSummary::aggregate(reports);

    let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
    let output_dir = args
        .output
        .unwrap_or_else(|| config.paths.results_dir.clone())
        .join(timestamp.to_string());

    ReportGenerator::new().generate_all(&summary, &output_dir)?;

    print!("{}", format_summary(&summary));
    println!("Reports written to {}", output_dir.display());

    if !summary.all_passed() {
        bail!("{} of {} task invocations failed", summary.failed, summary.total);
    }

    Ok(())
}

/// @ai:intent Pick the collaborator: fixtures, dry-run mock, or the automation service
/// @ai:effects fs:read, env
fn session_factory(config: &EvalConfig, fixtures: Option<PathBuf>) -> Result<Arc<dyn SessionFactory>> {
    if let Some(dir) = fixtures {
        tracing::info!("Replaying fixtures from {}", dir.display());
        return Ok(Arc::new(fixture_factory(&dir)?));
    }

    if config.run.dry_run {
        tracing::info!("Running in dry-run mode");

        let dir = &config.paths.fixtures_dir;
        if dir.is_dir() {
            return Ok(Arc::new(fixture_factory(dir)?));
        }

        tracing::warn!(
            "No fixtures at {}; every extraction will fail",
            dir.display()
        );
        return Ok(Arc::new(MockSessionFactory::new()));
    }

    tracing::info!("Using automation service at {}", config.browser.endpoint);
    Ok(Arc::new(HttpSessionFactory::new(&config.browser)?))
}

/// @ai:intent List available tasks
/// @ai:effects io
fn list_tasks() -> Result<()> {
    let all = tasks::registry();

    println!("Available tasks ({}):", all.len());
    println!();

    for task in &all {
        println!("  {}", task.name());
    }

    Ok(())
}

/// @ai:intent List supported models with their providers
/// @ai:effects io
fn list_models() -> Result<()> {
    println!("{:<32} {:<10}", "Model", "Provider");
    println!("{}", "-".repeat(44));

    for model in AvailableModel::ALL {
        println!("{:<32} {:<10}", model.as_str(), model.provider().as_str());
    }

    Ok(())
}

/// @ai:intent Print normalized forms and similarity of two strings
/// @ai:effects fs:read, io
fn compare_strings(
    actual: &str,
    expected: &str,
    config: Option<PathBuf>,
    threshold: Option<f64>,
    metric: Option<SimilarityMetric>,
) -> Result<()> {
    let mut config = load_or_default_config(config)?;
    if let Some(metric) = metric {
        config.matcher.metric = metric;
    }

    let matcher = config.matcher.build();
    let threshold = config.matcher.threshold(threshold);
    let result = matcher.compare(actual, expected, threshold)?;

    println!("actual:     {:?}", matcher.normalize(actual));
    println!("expected:   {:?}", matcher.normalize(expected));
    println!("metric:     {}", matcher.metric());
    println!("threshold:  {}", threshold);
    println!("similarity: {:.4}", result.similarity);
    println!(
        "verdict:    {}",
        if result.meets_threshold { "match" } else { "no match" }
    );

    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = EvalConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<EvalConfig> {
    match path {
        Some(p) => EvalConfig::load(&p),
        None => {
            let default_path = PathBuf::from("evals.toml");

            if default_path.exists() {
                EvalConfig::load(&default_path)
            } else {
                Ok(EvalConfig::default())
            }
        }
    }
}

/// @ai:intent Split a comma-separated argument
/// @ai:effects pure
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
