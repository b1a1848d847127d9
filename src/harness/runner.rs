//! @ai:module:intent Execute eval tasks across models with bounded concurrency
//! @ai:module:layer application
//! @ai:module:public_api EvalRunner, TaskReport
//! @ai:module:stateless false

use crate::browser::SessionFactory;
use crate::config::{EvalConfig, RunConfig};
use crate::logger::EvalLogger;
use crate::matcher::StringMatcher;
use crate::model::AvailableModel;
use crate::task::{EvalOutcome, EvalTask, RunContext, Timeouts};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// @ai:intent Result of running one task against one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub task: String,
    pub model: AvailableModel,
    pub outcome: EvalOutcome,
    pub duration_ms: u64,
}

/// @ai:intent Runs every (task, model) pair, each with its own logger and session
pub struct EvalRunner {
    sessions: Arc<dyn SessionFactory>,
    run_config: RunConfig,
    timeouts: Timeouts,
    matcher: StringMatcher,
}

impl EvalRunner {
    /// @ai:intent Create a runner from a session factory and configuration
    /// @ai:effects pure
    pub fn new(sessions: Arc<dyn SessionFactory>, config: &EvalConfig) -> Self {
        Self {
            sessions,
            run_config: config.run.clone(),
            timeouts: config.timeouts(),
            matcher: config.matcher.build(),
        }
    }

    /// @ai:intent Build a fresh context for one invocation
    /// @ai:effects pure
    fn context(&self, task: &str, model: AvailableModel) -> RunContext {
        let logger = EvalLogger::new(format!("{}@{}", task, model));

        RunContext::new(model, logger, Arc::clone(&self.sessions))
            .with_text_extract(self.run_config.use_text_extract)
            .with_options(self.run_config.options.clone())
            .with_timeouts(self.timeouts)
            .with_matcher(self.matcher.clone())
    }

    /// @ai:intent Run a single task against a single model
    /// @ai:effects network
    pub async fn run_one(&self, task: Arc<dyn EvalTask>, model: AvailableModel) -> Result<TaskReport> {
        let ctx = self.context(task.name(), model);
        execute(task, ctx).await
    }

    /// @ai:intent Run every task against every model
    /// @ai:post reports are ordered by task, then model, as given
    /// @ai:post on Err, every started invocation has finished and released its session
    /// @ai:effects network
    pub async fn run_all(
        &self,
        tasks: &[Arc<dyn EvalTask>],
        models: &[AvailableModel],
    ) -> Result<Vec<TaskReport>> {
        let permits = Arc::new(Semaphore::new(self.run_config.concurrency.max(1)));
        let mut set = JoinSet::new();
        let mut index = 0usize;

        for task in tasks {
            for &model in models {
                let ctx = self.context(task.name(), model);
                let task = Arc::clone(task);
                let permits = Arc::clone(&permits);
                let slot = index;
                index += 1;

                set.spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .context("Runner semaphore closed")?;
                    execute(task, ctx).await.map(|report| (slot, report))
                });
            }
        }

        tracing::info!(
            "Running {} task invocations (concurrency={})",
            index,
            self.run_config.concurrency
        );

        // Siblings of an aborted invocation still run to completion and release
        // their sessions; only then is the first error surfaced.
        let mut indexed = Vec::with_capacity(index);
        let mut aborted: Option<anyhow::Error> = None;
        while let Some(joined) = set.join_next().await {
            match joined.context("Task invocation panicked").and_then(|r| r) {
                Ok(entry) => indexed.push(entry),
                Err(e) => {
                    tracing::error!("{:#}", e);
                    aborted.get_or_insert(e);
                }
            }
        }

        if let Some(e) = aborted {
            return Err(e.context(format!(
                "Run aborted ({} of {} invocations completed)",
                indexed.len(),
                index
            )));
        }

        indexed.sort_by_key(|(slot, _)| *slot);
        Ok(indexed.into_iter().map(|(_, report)| report).collect())
    }
}

/// @ai:intent Run a task and time it
/// @ai:effects network
async fn execute(task: Arc<dyn EvalTask>, ctx: RunContext) -> Result<TaskReport> {
    let model = ctx.model;
    let name = task.name().to_string();

    tracing::info!("Executing {} (model={})", name, model);

    let start = Instant::now();
    let outcome = task
        .run(ctx)
        .await
        .with_context(|| format!("Task {} aborted (model={})", name, model))?;
    let duration_ms = start.elapsed().as_millis() as u64;

    if outcome.success {
        tracing::info!("{} passed with {} in {}ms", name, model, duration_ms);
    } else {
        tracing::warn!(
            "{} failed with {}: {}",
            name,
            model,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(TaskReport {
        task: name,
        model,
        outcome,
        duration_ms,
    })
}
