//! @ai:module:intent Task boundary: session lifetime, timeouts and outcome packaging
//! @ai:module:layer application
//! @ai:module:public_api TaskScope, run_scenario
//! @ai:module:stateless false

use crate::browser::{BrowserSession, ExtractRequest, GotoOptions, InitResponse, SessionOptions};
use crate::error::{EvalError, Result};
use crate::logger::{AuxiliaryValue, EvalLogger, LogEntry, LEVEL_DEBUG};
use crate::matcher::{ComparisonResult, StringMatcher};
use crate::model::AvailableModel;
use crate::schema::Schema;
use crate::task::outcome::{EvalOutcome, GENERIC_FAILURE};
use crate::task::phase::{PhaseTracker, TaskPhase};
use crate::task::{ExtractionScenario, Mismatch, RunContext, Verdict};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// @ai:intent Holds a session until it is released, closing it on drop otherwise
///
/// Dropping an unreleased guard (the run was aborted or cancelled) hands the
/// session to the current runtime to be closed in the background.
struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
    label: String,
}

impl SessionGuard {
    fn new(session: Box<dyn BrowserSession>, label: &str) -> Self {
        Self {
            session: Some(session),
            label: label.to_string(),
        }
    }

    fn get(&mut self) -> Result<&mut (dyn BrowserSession + 'static)> {
        match self.session.as_mut() {
            Some(session) => Ok(&mut **session),
            None => Err(EvalError::collaborator("session", "already released")),
        }
    }

    /// @ai:post the session is closed at most once
    /// @ai:effects network
    async fn release(&mut self) -> Result<()> {
        match self.session.take() {
            Some(mut session) => session.close().await,
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        let label = std::mem::take(&mut self.label);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(task = %label, "Session dropped before cleanup; closing in background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        tracing::warn!(task = %label, "Failed to close session: {}", e);
                    }
                });
            }
            Err(_) => {
                tracing::error!(task = %label, "Session dropped outside a runtime; it was not closed");
            }
        }
    }
}

/// @ai:intent Everything a scenario may touch while it runs
///
/// Owns the session for the duration of the run. [`TaskScope::close`]
/// consumes the scope and closes the session; a scope dropped without it
/// still closes the session once, from its guard.
pub struct TaskScope<'a> {
    session: SessionGuard,
    ctx: &'a RunContext,
    phases: PhaseTracker,
}

impl<'a> TaskScope<'a> {
    fn new(session: Box<dyn BrowserSession>, ctx: &'a RunContext, task: &str) -> Self {
        Self {
            session: SessionGuard::new(session, ctx.logger.label()),
            ctx,
            phases: PhaseTracker::new(task),
        }
    }

    pub fn model(&self) -> AvailableModel {
        self.ctx.model
    }

    pub fn logger(&self) -> &EvalLogger {
        &self.ctx.logger
    }

    pub fn matcher(&self) -> &StringMatcher {
        &self.ctx.matcher
    }

    pub fn phase(&self) -> TaskPhase {
        self.phases.current()
    }

    /// @ai:intent Read an unsigned integer from the run's extra options
    /// @ai:effects pure
    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.ctx.options.get(key).and_then(|v| v.as_u64())
    }

    /// @ai:intent Navigate, bounded by the run's navigation timeout unless the call sets one
    /// @ai:effects network
    pub async fn goto(&mut self, url: &str, options: GotoOptions) -> Result<()> {
        self.phases.enter(TaskPhase::Navigating)?;

        let timeout_ms = options.timeout_ms.unwrap_or(self.ctx.timeouts.navigation_ms);
        let options = GotoOptions {
            timeout_ms: Some(timeout_ms),
            ..options
        };

        let session = self.session.get()?;
        with_timeout("navigation", timeout_ms, session.goto(url, &options)).await?;

        self.ctx
            .logger
            .log(LogEntry::new(format!("Navigated to {}", url), LEVEL_DEBUG));
        Ok(())
    }

    /// @ai:intent Give the page time to settle after navigation
    /// @ai:effects time
    pub async fn settle(&mut self, duration: Duration) {
        tracing::debug!(task = %self.ctx.logger.label(), "Settling for {:?}", duration);
        tokio::time::sleep(duration).await;
    }

    /// @ai:intent Extract structured data and validate it against the declared schema
    /// @ai:pre a navigation has completed
    /// @ai:effects network
    pub async fn extract<T: DeserializeOwned>(&mut self, instruction: &str, schema: &Schema) -> Result<T> {
        self.phases.enter(TaskPhase::Extracting)?;

        let request = ExtractRequest {
            instruction: instruction.to_string(),
            schema: schema.to_json_schema(),
            model_name: self.ctx.model.as_str().to_string(),
            use_text_extract: self.ctx.use_text_extract,
        };

        let session = self.session.get()?;
        let raw = with_timeout(
            "extraction",
            self.ctx.timeouts.extraction_ms,
            session.extract(&request),
        )
        .await?;

        schema.parse(raw)
    }

    /// @ai:intent Fuzzy-compare an extracted value with its expectation
    /// @ai:effects pure
    pub fn compare(&mut self, actual: &str, expected: &str, threshold: f64) -> Result<ComparisonResult> {
        self.phases.enter(TaskPhase::Comparing)?;
        Ok(self.ctx.matcher.compare(actual, expected, threshold)?)
    }

    /// @ai:intent Exact normalized comparison of one labelled field
    /// @ai:post Some(mismatch) carries normalized expected/actual values
    /// @ai:effects pure
    pub fn check_field(&mut self, label: &str, actual: &str, expected: &str) -> Result<Option<Mismatch>> {
        self.phases.enter(TaskPhase::Comparing)?;

        let matcher = &self.ctx.matcher;
        if matcher.matches(actual, expected) {
            return Ok(None);
        }

        Ok(Some(Mismatch {
            message: format!("{} extracted does not match expected", label),
            expected: AuxiliaryValue::string(matcher.normalize(expected)),
            actual: AuxiliaryValue::string(matcher.normalize(actual)),
        }))
    }

    /// @ai:intent Start the session
    /// @ai:effects network
    async fn init(&mut self) -> Result<InitResponse> {
        self.session.get()?.init().await
    }

    /// @ai:intent Enter cleanup and release the session
    /// @ai:post session.close called exactly once
    /// @ai:effects network
    async fn close(mut self) -> PhaseTracker {
        if let Err(e) = self.phases.enter(TaskPhase::Cleanup) {
            tracing::warn!("{}", e);
        }

        if let Err(e) = self.session.release().await {
            tracing::warn!(task = %self.ctx.logger.label(), "Failed to close session: {}", e);
        }

        self.phases
    }
}

async fn with_timeout<T>(
    operation: &str,
    after_ms: u64,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(Duration::from_millis(after_ms), future).await {
        Ok(result) => result,
        Err(_) => Err(EvalError::Timeout {
            operation: operation.to_string(),
            after_ms,
        }),
    }
}

/// @ai:intent Render an error with its source chain and the phase it surfaced in
/// @ai:effects pure
fn trace(error: &EvalError, phase: TaskPhase) -> String {
    let mut lines = vec![format!("{} (during {})", error, phase)];
    let mut source = std::error::Error::source(error);

    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }

    lines.join("\n")
}

/// @ai:intent Run a scenario inside the task boundary and package its outcome
///
/// Assertion mismatches and collaborator failures become failed outcomes;
/// programmer errors (invalid threshold, invalid phase transition) are
/// returned as `Err` after the session has been closed.
/// @ai:effects network, state:write
pub async fn run_scenario<S>(scenario: &S, ctx: RunContext) -> Result<EvalOutcome>
where
    S: ExtractionScenario + ?Sized,
{
    let name = scenario.name();
    let options = SessionOptions {
        task_name: name.to_string(),
        model: ctx.model,
        dom_settle_timeout_ms: scenario.dom_settle_timeout_ms(),
    };

    let mut scope = TaskScope::new(ctx.sessions.create(&options), &ctx, name);

    let (session, result) = match scope.init().await {
        Ok(session) => {
            let executed = AssertUnwindSafe(scenario.execute(&mut scope))
                .catch_unwind()
                .await;

            match executed {
                Ok(result) => (session, result),
                Err(panic) => {
                    tracing::error!(task = name, model = %ctx.model, "Task panicked during {}", scope.phase());
                    scope.close().await;
                    std::panic::resume_unwind(panic);
                }
            }
        }
        Err(e) => (InitResponse::default(), Err(e)),
    };

    let failed_in = scope.phase();
    let mut phases = scope.close().await;

    let outcome = match result {
        Ok(Verdict::Pass) => {
            phases.enter(TaskPhase::Succeeded)?;
            EvalOutcome::passed(ctx.logger.get_logs(), &session)
        }
        Ok(Verdict::Mismatch(mismatch)) => {
            phases.enter(TaskPhase::Failed)?;
            ctx.logger.error(
                LogEntry::error(mismatch.message.clone())
                    .with("expected", mismatch.expected)
                    .with("actual", mismatch.actual),
            );
            EvalOutcome::failed(mismatch.message, ctx.logger.get_logs(), &session)
        }
        Err(e) if e.is_fatal() => {
            phases.enter(TaskPhase::Failed)?;
            return Err(e);
        }
        Err(e) => {
            phases.enter(TaskPhase::Failed)?;
            ctx.logger.error(
                LogEntry::error(format!("Error in {} function", name))
                    .with("error", AuxiliaryValue::string(e.to_string()))
                    .with("trace", AuxiliaryValue::string(trace(&e, failed_in))),
            );
            EvalOutcome::failed(GENERIC_FAILURE, ctx.logger.get_logs(), &session)
        }
    };

    tracing::info!(
        task = name,
        model = %ctx.model,
        success = outcome.success,
        errors = ctx.logger.error_count(),
        "Task finished after {:?}",
        phases.history()
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{MockSessionFactory, SessionFactory};
    use std::sync::Arc;

    fn mock_context(factory: MockSessionFactory) -> RunContext {
        RunContext::new(
            AvailableModel::Gpt4o,
            EvalLogger::new("scope@gpt-4o"),
            Arc::new(factory),
        )
    }

    fn open_scope(ctx: &RunContext) -> TaskScope<'_> {
        let options = SessionOptions {
            task_name: "scope".to_string(),
            model: ctx.model,
            dom_settle_timeout_ms: None,
        };
        TaskScope::new(ctx.sessions.create(&options), ctx, "scope")
    }

    #[tokio::test]
    async fn test_dropped_scope_closes_session_in_background() {
        let factory = MockSessionFactory::new();
        let counts = factory.counts();
        let ctx = mock_context(factory);

        let mut scope = open_scope(&ctx);
        scope.init().await.unwrap();
        drop(scope);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counts.close(), 1);
    }

    #[tokio::test]
    async fn test_closed_scope_is_not_closed_again() {
        let factory = MockSessionFactory::new();
        let counts = factory.counts();
        let ctx = mock_context(factory);

        let mut scope = open_scope(&ctx);
        scope.init().await.unwrap();
        let phases = scope.close().await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(phases.current(), TaskPhase::Cleanup);
        assert_eq!(counts.close(), 1);
    }

    #[tokio::test]
    async fn test_released_guard_refuses_further_calls() {
        let factory = MockSessionFactory::new();
        let options = SessionOptions {
            task_name: "scope".to_string(),
            model: AvailableModel::Gpt4o,
            dom_settle_timeout_ms: None,
        };
        let mut guard = SessionGuard::new(factory.create(&options), "scope@gpt-4o");

        guard.release().await.unwrap();
        guard.release().await.unwrap();

        assert!(guard.get().is_err());
        assert_eq!(factory.counts().close(), 1);
    }

    #[test]
    fn test_trace_includes_phase() {
        let err = EvalError::collaborator("navigation", "net::ERR_CONNECTION_REFUSED");
        let rendered = trace(&err, TaskPhase::Navigating);
        assert_eq!(
            rendered,
            "navigation failed: net::ERR_CONNECTION_REFUSED (during navigating)"
        );
    }

    #[test]
    fn test_trace_walks_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = EvalError::from(io);
        let rendered = trace(&err, TaskPhase::Extracting);
        assert!(rendered.starts_with("IO error: disk gone"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_eval_error() {
        let result: Result<()> = with_timeout("extraction", 10, async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(EvalError::Timeout { ref operation, after_ms: 10 }) if operation == "extraction"
        ));
    }
}
