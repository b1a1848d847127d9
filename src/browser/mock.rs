//! @ai:module:intent In-process browser collaborator for dry runs and tests
//! @ai:module:layer infrastructure
//! @ai:module:public_api MockSessionFactory, CallCounts
//! @ai:module:stateless false

use crate::browser::{
    BrowserSession, ExtractRequest, GotoOptions, InitResponse, SessionFactory, SessionOptions,
};
use crate::error::{EvalError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// @ai:intent Counters of collaborator calls, shared by every session of a factory
#[derive(Debug, Default)]
pub struct CallCounts {
    pub init: AtomicUsize,
    pub goto: AtomicUsize,
    pub extract: AtomicUsize,
    pub close: AtomicUsize,
}

impl CallCounts {
    pub fn init(&self) -> usize {
        self.init.load(Ordering::SeqCst)
    }

    pub fn goto(&self) -> usize {
        self.goto.load(Ordering::SeqCst)
    }

    pub fn extract(&self) -> usize {
        self.extract.load(Ordering::SeqCst)
    }

    pub fn close(&self) -> usize {
        self.close.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
struct Behaviour {
    responses: HashMap<String, serde_json::Value>,
    default_response: Option<serde_json::Value>,
    init_error: Option<String>,
    navigation_error: Option<String>,
    extraction_error: Option<String>,
    extract_delay: Option<Duration>,
}

/// @ai:intent Session factory returning canned extraction payloads
#[derive(Debug, Default)]
pub struct MockSessionFactory {
    behaviour: Behaviour,
    counts: Arc<CallCounts>,
    requests: Arc<Mutex<Vec<ExtractRequest>>>,
}

impl MockSessionFactory {
    /// @ai:intent Create a mock with no canned payloads
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Payload returned to extractions made by the named task
    /// @ai:effects pure
    pub fn with_response(mut self, task_name: impl Into<String>, payload: serde_json::Value) -> Self {
        self.behaviour.responses.insert(task_name.into(), payload);
        self
    }

    /// @ai:intent Payload returned when no task-specific one exists
    /// @ai:effects pure
    pub fn with_default_response(mut self, payload: serde_json::Value) -> Self {
        self.behaviour.default_response = Some(payload);
        self
    }

    pub fn fail_init(mut self, message: impl Into<String>) -> Self {
        self.behaviour.init_error = Some(message.into());
        self
    }

    pub fn fail_navigation(mut self, message: impl Into<String>) -> Self {
        self.behaviour.navigation_error = Some(message.into());
        self
    }

    pub fn fail_extraction(mut self, message: impl Into<String>) -> Self {
        self.behaviour.extraction_error = Some(message.into());
        self
    }

    /// @ai:intent Delay every extraction, for exercising timeouts
    /// @ai:effects pure
    pub fn with_extract_delay(mut self, delay: Duration) -> Self {
        self.behaviour.extract_delay = Some(delay);
        self
    }

    pub fn counts(&self) -> Arc<CallCounts> {
        Arc::clone(&self.counts)
    }

    /// @ai:intent Extraction requests received so far, in call order
    /// @ai:effects pure
    pub fn extract_requests(&self) -> Vec<ExtractRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SessionFactory for MockSessionFactory {
    fn create(&self, options: &SessionOptions) -> Box<dyn BrowserSession> {
        let payload = self
            .behaviour
            .responses
            .get(&options.task_name)
            .or(self.behaviour.default_response.as_ref())
            .cloned();

        Box::new(MockSession {
            task_name: options.task_name.clone(),
            payload,
            behaviour: self.behaviour.clone(),
            counts: Arc::clone(&self.counts),
            requests: Arc::clone(&self.requests),
        })
    }
}

struct MockSession {
    task_name: String,
    payload: Option<serde_json::Value>,
    behaviour: Behaviour,
    counts: Arc<CallCounts>,
    requests: Arc<Mutex<Vec<ExtractRequest>>>,
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn init(&mut self) -> Result<InitResponse> {
        self.counts.init.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.behaviour.init_error {
            return Err(EvalError::collaborator("session init", message.clone()));
        }

        Ok(InitResponse {
            debug_url: format!("mock://debug/{}", self.task_name),
            session_url: format!("mock://session/{}", self.task_name),
        })
    }

    async fn goto(&mut self, url: &str, _options: &GotoOptions) -> Result<()> {
        self.counts.goto.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.behaviour.navigation_error {
            return Err(EvalError::collaborator(
                "navigation",
                format!("{} ({})", message, url),
            ));
        }

        Ok(())
    }

    async fn extract(&mut self, request: &ExtractRequest) -> Result<serde_json::Value> {
        self.counts.extract.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if let Some(delay) = self.behaviour.extract_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.behaviour.extraction_error {
            return Err(EvalError::collaborator("extraction", message.clone()));
        }

        self.payload.clone().ok_or_else(|| {
            EvalError::collaborator(
                "extraction",
                format!("no canned payload for task {}", self.task_name),
            )
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.counts.close.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
