/*!
 * W3C WebDriver client for the browser session seam.
 *
 * Speaks the JSON wire protocol to a running driver (chromedriver): one
 * `POST /session` per launch with `goog:chromeOptions`, then navigation,
 * element lookup, typing and reads against that session, and a final
 * `DELETE /session/{id}`. Lookups answered with "no such element" or a
 * stale reference come back as `Ok(None)` so callers can keep polling.
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use crate::app_config::BrowserConfig;
use crate::browser::{BrowserSession, ElementRef, Locator, SessionLauncher};
use crate::errors::FetchError;

/// Key under which W3C WebDriver returns element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Error reported by a WebDriver endpoint
#[derive(Debug, Clone, PartialEq)]
struct WireError {
    /// W3C error code, e.g. "no such element"
    code: String,
    /// Human readable message
    message: String,
}

impl WireError {
    fn is_missing_element(&self) -> bool {
        self.code == "no such element" || self.code == "stale element reference"
    }
}

impl From<WireError> for FetchError {
    fn from(error: WireError) -> Self {
        FetchError::Session(format!("{}: {}", error.code, error.message))
    }
}

/// Launches Chrome sessions through a WebDriver server
pub struct WebDriverLauncher {
    /// Base URL of the WebDriver server
    endpoint: String,
    /// HTTP client shared by all sessions
    client: Client,
    /// Browser settings sent as capabilities
    config: BrowserConfig,
}

impl WebDriverLauncher {
    /// Create a launcher for the configured WebDriver server
    pub fn new(config: &BrowserConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.webdriver_url.trim_end_matches('/').to_string(),
            client,
            config: config.clone(),
        })
    }

    /// Build the new-session payload
    fn capabilities(config: &BrowserConfig) -> Value {
        let mut args: Vec<String> = Vec::new();
        if config.headless {
            args.push("--headless".to_string());
        }
        args.extend(config.args.iter().cloned());

        let mut chrome_options = json!({ "args": args });
        if let Some(binary) = config.resolved_binary() {
            chrome_options["binary"] = Value::String(binary);
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": chrome_options,
                }
            }
        })
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        let url = format!("{}/session", self.endpoint);
        let payload = Self::capabilities(&self.config);

        let value = send(&self.client, Method::POST, &url, Some(payload))
            .await?
            .map_err(FetchError::from)?;

        let session_id = value
            .get("sessionId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| FetchError::Session("WebDriver returned no session id".to_string()))?
            .to_string();

        debug!("Started WebDriver session {}", session_id);

        Ok(Box::new(WebDriverSession {
            base: format!("{}/session/{}", self.endpoint, session_id),
            client: self.client.clone(),
            session_id,
            closed: false,
        }))
    }
}

/// One Chrome session behind a WebDriver server
struct WebDriverSession {
    /// `{endpoint}/session/{id}`
    base: String,
    client: Client,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Result<Value, WireError>, FetchError> {
        if self.closed {
            return Err(FetchError::Session(format!(
                "Session {} is already closed",
                self.session_id
            )));
        }
        let url = format!("{}{}", self.base, path);
        send(&self.client, method, &url, body).await
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?
            .map_err(FetchError::from)?;
        Ok(())
    }

    async fn find_element(&mut self, locator: &Locator) -> Result<Option<ElementRef>, FetchError> {
        let body = json!({ "using": locator.strategy(), "value": locator.value() });
        match self.command(Method::POST, "/element", Some(body)).await? {
            Ok(value) => parse_element_ref(&value)
                .map(Some)
                .ok_or_else(|| FetchError::Session("Malformed element reference".to_string())),
            Err(e) if e.is_missing_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), FetchError> {
        let path = format!("/element/{}/value", element.id());
        self.command(Method::POST, &path, Some(json!({ "text": text })))
            .await?
            .map_err(FetchError::from)?;
        Ok(())
    }

    async fn read(
        &mut self,
        element: &ElementRef,
        attribute: Option<&str>,
    ) -> Result<Option<String>, FetchError> {
        let path = match attribute {
            Some(name) => format!("/element/{}/attribute/{}", element.id(), name),
            None => format!("/element/{}/text", element.id()),
        };
        match self.command(Method::GET, &path, None).await? {
            Ok(Value::String(s)) => Ok(Some(s)),
            Ok(_) => Ok(None),
            Err(e) if e.is_missing_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if self.closed {
            return Ok(());
        }
        let result = send(&self.client, Method::DELETE, &self.base, None).await;
        // The server side session is gone or unreachable either way
        self.closed = true;
        match result {
            Ok(Ok(_)) => {
                debug!("Closed WebDriver session {}", self.session_id);
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("WebDriver refused to close session {}: {}", self.session_id, e.message);
                Err(e.into())
            }
            Err(e) => Err(e),
        }
    }
}

/// Send one WebDriver command.
///
/// The outer `Result` is transport failure; the inner one is a protocol
/// level error reported by the server.
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Result<Value, WireError>, FetchError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
        error!("WebDriver request to {} failed: {}", url, e);
        FetchError::Session(format!("WebDriver request failed: {}", e))
    })?;

    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .map_err(|e| FetchError::Session(format!("Failed to parse WebDriver response: {}", e)))?;

    Ok(parse_reply(status, payload))
}

/// Split a WebDriver reply into its value or its error
fn parse_reply(status: StatusCode, payload: Value) -> Result<Value, WireError> {
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if let Some(code) = value.get("error").and_then(|v| v.as_str()) {
        return Err(WireError {
            code: code.to_string(),
            message: value
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }

    if !status.is_success() {
        return Err(WireError {
            code: "unknown error".to_string(),
            message: format!("HTTP {}", status),
        });
    }

    Ok(value)
}

fn parse_element_ref(value: &Value) -> Option<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .and_then(|v| v.as_str())
        .map(ElementRef::new)
}
