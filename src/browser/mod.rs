/*!
 * Browser automation seam.
 *
 * The translation page has no API, so translations are read back from a
 * live browser session. This module defines what the rest of the crate may
 * do with such a session:
 * - `SessionLauncher`: starts a fresh session
 * - `BrowserSession`: drives one session (navigate, find, type, read, close)
 * - `Locator`: a structural element locator
 *
 * The only production implementation is `webdriver`, which talks the W3C
 * WebDriver protocol to a running driver such as chromedriver.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::FetchError;

pub mod webdriver;

pub use webdriver::WebDriverLauncher;

/// Structural locator for a page element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "using", content = "value")]
pub enum Locator {
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
    /// CSS selector
    #[serde(rename = "css")]
    Css(String),
}

impl Locator {
    /// WebDriver location strategy name
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::XPath(_) => "xpath",
            Self::Css(_) => "css selector",
        }
    }

    /// The raw expression
    pub fn value(&self) -> &str {
        match self {
            Self::XPath(v) | Self::Css(v) => v,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value().trim().is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

/// Opaque reference to an element inside one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// One live automation session.
///
/// Sessions are not `Clone` and not `Sync`; only their owner may drive
/// them. Every method that can fail for "not there yet" reasons returns
/// `Ok(None)` instead of an error.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load a page
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    /// Resolve a locator, `None` when nothing matches right now
    async fn find_element(&mut self, locator: &Locator) -> Result<Option<ElementRef>, FetchError>;

    /// Type text into an element
    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), FetchError>;

    /// Read an attribute, or the element's text when `attribute` is `None`.
    /// `None` when the value is absent or the element went stale.
    async fn read(
        &mut self,
        element: &ElementRef,
        attribute: Option<&str>,
    ) -> Result<Option<String>, FetchError>;

    /// End the session and release the browser
    async fn close(&mut self) -> Result<(), FetchError>;
}

/// Starts automation sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Start a fresh session
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError>;
}
