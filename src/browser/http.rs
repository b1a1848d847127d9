//! @ai:module:intent HTTP client for a remote browser-automation service
//! @ai:module:layer infrastructure
//! @ai:module:public_api HttpSessionFactory, HttpSession
//! @ai:module:stateless false

use crate::browser::{
    BrowserSession, ExtractRequest, GotoOptions, InitResponse, SessionFactory, SessionOptions,
};
use crate::config::BrowserConfig;
use crate::error::{EvalError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// @ai:intent Session creation response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    id: String,
    #[serde(default)]
    debug_url: String,
    #[serde(default)]
    session_url: String,
}

/// @ai:intent Navigation request body
#[derive(Debug, Serialize)]
struct NavigateRequest<'a> {
    url: &'a str,
    #[serde(flatten)]
    options: &'a GotoOptions,
}

/// @ai:intent Extraction response body
#[derive(Debug, Deserialize)]
struct ExtractResponse {
    data: serde_json::Value,
}

/// @ai:intent Opens sessions against the automation service
pub struct HttpSessionFactory {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    dom_settle_timeout_ms: u64,
}

impl HttpSessionFactory {
    /// @ai:intent Create a factory from browser configuration
    /// @ai:effects env
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();

        if api_key.is_none() {
            tracing::warn!(
                "{} not set; calling {} without an API key",
                config.api_key_env,
                config.endpoint
            );
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            dom_settle_timeout_ms: config.dom_settle_timeout_ms,
        })
    }

    /// @ai:intent Session options with the configured DOM settle timeout as fallback
    /// @ai:effects pure
    fn session_options(&self, options: &SessionOptions) -> SessionOptions {
        SessionOptions {
            dom_settle_timeout_ms: options
                .dom_settle_timeout_ms
                .or(Some(self.dom_settle_timeout_ms)),
            ..options.clone()
        }
    }
}

impl SessionFactory for HttpSessionFactory {
    fn create(&self, options: &SessionOptions) -> Box<dyn BrowserSession> {
        Box::new(HttpSession {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            options: self.session_options(options),
            session_id: None,
        })
    }
}

/// @ai:intent A session hosted by the automation service
pub struct HttpSession {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    options: SessionOptions,
    session_id: Option<String>,
}

impl HttpSession {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn session_path(&self, operation: &str, suffix: &str) -> Result<String> {
        let id = self.session_id.as_deref().ok_or_else(|| {
            EvalError::collaborator(operation, "session has not been initialised")
        })?;

        Ok(if suffix.is_empty() {
            self.url(&format!("sessions/{}", id))
        } else {
            self.url(&format!("sessions/{}/{}", id, suffix))
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    /// @ai:intent Record the new session's id, then decode the rest of the creation body
    /// @ai:post session_id is set whenever the body carries an id, even if decoding fails
    /// @ai:effects state:write
    fn accept_created(&mut self, body: serde_json::Value) -> Result<InitResponse> {
        if let Some(id) = body.get("id").and_then(|v| v.as_str()) {
            self.session_id = Some(id.to_string());
        }

        let created: CreateSessionResponse = serde_json::from_value(body)?;

        tracing::debug!(
            "Session {} started for {} ({})",
            created.id,
            self.options.task_name,
            self.options.model
        );

        Ok(InitResponse {
            debug_url: created.debug_url,
            session_url: created.session_url,
        })
    }

    /// @ai:intent Turn a non-success status into a collaborator error
    /// @ai:effects network
    async fn check(operation: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(EvalError::collaborator(
            operation,
            format!("service returned {}: {}", status, body),
        ))
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    /// @ai:effects network
    async fn init(&mut self) -> Result<InitResponse> {
        let request = self
            .authorize(self.client.post(self.url("sessions")))
            .json(&self.options);
        let response = Self::check("session init", request.send().await?).await?;
        let body: serde_json::Value = response.json().await?;

        self.accept_created(body)
    }

    /// @ai:effects network
    async fn goto(&mut self, url: &str, options: &GotoOptions) -> Result<()> {
        let endpoint = self.session_path("navigation", "navigate")?;
        let request = self
            .authorize(self.client.post(endpoint))
            .json(&NavigateRequest { url, options });

        Self::check("navigation", request.send().await?).await?;
        Ok(())
    }

    /// @ai:effects network
    async fn extract(&mut self, request: &ExtractRequest) -> Result<serde_json::Value> {
        let endpoint = self.session_path("extraction", "extract")?;
        let builder = self.authorize(self.client.post(endpoint)).json(request);

        let response = Self::check("extraction", builder.send().await?).await?;
        let body: ExtractResponse = response.json().await?;
        Ok(body.data)
    }

    /// @ai:effects network
    async fn close(&mut self) -> Result<()> {
        let Some(id) = self.session_id.take() else {
            return Ok(());
        };

        let endpoint = self.url(&format!("sessions/{}", id));
        let request = self.authorize(self.client.delete(endpoint));
        Self::check("session close", request.send().await?).await?;

        tracing::debug!("Session {} closed", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AvailableModel;

    fn session() -> HttpSession {
        let config = BrowserConfig {
            endpoint: "http://localhost:3000/".to_string(),
            ..Default::default()
        };
        let factory = HttpSessionFactory::new(&config).unwrap();

        HttpSession {
            client: factory.client.clone(),
            endpoint: factory.endpoint.clone(),
            api_key: None,
            options: SessionOptions {
                task_name: "extract_capacitor_info".to_string(),
                model: AvailableModel::Gpt4o,
                dom_settle_timeout_ms: None,
            },
            session_id: None,
        }
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let s = session();
        assert_eq!(s.url("sessions"), "http://localhost:3000/sessions");
        assert_eq!(s.url("/sessions"), "http://localhost:3000/sessions");
    }

    #[tokio::test]
    async fn test_calls_before_init_fail_without_network() {
        let mut s = session();
        let err = s.goto("https://example.com", &GotoOptions::default()).await.unwrap_err();
        assert!(matches!(err, EvalError::Collaborator { ref operation, .. } if operation == "navigation"));
    }

    #[test]
    fn test_created_session_recorded() {
        let mut s = session();
        let init = s
            .accept_created(serde_json::json!({
                "id": "sess-1",
                "debugUrl": "https://debug/sess-1",
            }))
            .unwrap();

        assert_eq!(init.debug_url, "https://debug/sess-1");
        assert_eq!(init.session_url, "");
        assert_eq!(
            s.session_path("navigation", "navigate").unwrap(),
            "http://localhost:3000/sessions/sess-1/navigate"
        );
    }

    #[test]
    fn test_malformed_creation_body_keeps_id_for_close() {
        let mut s = session();
        let err = s
            .accept_created(serde_json::json!({ "id": "sess-2", "debugUrl": 42 }))
            .unwrap_err();

        assert!(matches!(err, EvalError::Json(_)));
        assert_eq!(s.session_id.as_deref(), Some("sess-2"));
        assert_eq!(
            s.session_path("session close", "").unwrap(),
            "http://localhost:3000/sessions/sess-2"
        );
    }

    #[tokio::test]
    async fn test_close_without_session_is_noop() {
        let mut s = session();
        assert!(s.close().await.is_ok());
    }

    #[test]
    fn test_factory_fills_default_dom_settle_timeout() {
        let factory = HttpSessionFactory::new(&BrowserConfig::default()).unwrap();
        let mut options = SessionOptions {
            task_name: "extract_press_releases".to_string(),
            model: AvailableModel::Gpt4o,
            dom_settle_timeout_ms: None,
        };
        assert_eq!(factory.session_options(&options).dom_settle_timeout_ms, Some(30_000));

        options.dom_settle_timeout_ms = Some(3_000);
        assert_eq!(factory.session_options(&options).dom_settle_timeout_ms, Some(3_000));
    }

    #[test]
    fn test_navigate_body_shape() {
        let options = GotoOptions::wait_until(crate::browser::WaitUntil::NetworkIdle);
        let body = serde_json::to_value(NavigateRequest {
            url: "https://www.landerfornyc.com/news",
            options: &options,
        })
        .unwrap();
        assert_eq!(body["waitUntil"], "networkidle");
        assert!(body.get("timeoutMs").is_none());
    }
}
