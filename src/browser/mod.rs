//! @ai:module:intent Browser session, navigation and extraction collaborators
//! @ai:module:layer infrastructure
//! @ai:module:public_api BrowserSession, SessionFactory, SessionOptions, GotoOptions, WaitUntil, ExtractRequest, InitResponse
//!
//! Page rendering and LLM extraction live in an external automation service.
//! This module only defines the seam the eval tasks talk through, plus an
//! HTTP client for a remote service and an in-process mock.

pub mod fixtures;
pub mod http;
pub mod mock;

pub use fixtures::{fixture_factory, load_fixtures};
pub use http::{HttpSession, HttpSessionFactory};
pub use mock::{CallCounts, MockSessionFactory};

use crate::error::Result;
use crate::model::AvailableModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// @ai:intent Page lifecycle event navigation waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    NetworkIdle,
    Commit,
}

/// @ai:intent Options for a single navigation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_until: Option<WaitUntil>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl GotoOptions {
    pub fn wait_until(wait_until: WaitUntil) -> Self {
        Self {
            wait_until: Some(wait_until),
            timeout_ms: None,
        }
    }
}

/// @ai:intent URLs produced when a session starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub debug_url: String,
    pub session_url: String,
}

/// @ai:intent One structured extraction call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub instruction: String,
    /// JSON schema rendered from a [`crate::schema::Schema`]
    pub schema: serde_json::Value,
    pub model_name: String,
    pub use_text_extract: bool,
}

/// @ai:intent Parameters used when opening a session for one task run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    pub task_name: String,
    pub model: AvailableModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_settle_timeout_ms: Option<u64>,
}

/// @ai:intent An exclusively-owned browser session driven by one task run
#[async_trait]
pub trait BrowserSession: Send {
    /// @ai:intent Start the session and report its debug/session URLs
    async fn init(&mut self) -> Result<InitResponse>;

    /// @ai:intent Navigate the active page
    async fn goto(&mut self, url: &str, options: &GotoOptions) -> Result<()>;

    /// @ai:intent Run structured extraction on the active page
    async fn extract(&mut self, request: &ExtractRequest) -> Result<serde_json::Value>;

    /// @ai:intent Release the session
    async fn close(&mut self) -> Result<()>;
}

/// @ai:intent Creates sessions; shared across task runs
pub trait SessionFactory: Send + Sync {
    /// @ai:intent Create a new, not yet initialised session
    fn create(&self, options: &SessionOptions) -> Box<dyn BrowserSession>;
}
