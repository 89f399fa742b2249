/*!
 * Reads a translation off the remote translation page.
 *
 * The page renders its result asynchronously, so after typing the source
 * text the output element is polled until it holds text or the deadline
 * passes. A poll that finds nothing yet is a normal outcome, not an error.
 */

use anyhow::Result;
use log::{debug, trace};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::app_config::Config;
use crate::browser::{BrowserSession, Locator};
use crate::errors::FetchError;
use crate::translation::{truncate_text, FetchRequest, FetchResult};

/// What one look at the output element found
#[derive(Debug, Clone, PartialEq)]
enum Probe {
    /// Non-empty translated text
    Ready(String),
    /// Element present but still empty
    Pending,
    /// Locator matched nothing
    Missing,
}

/// Drives one session through a single translation
#[derive(Debug, Clone)]
pub struct Extractor {
    /// Translation page, language parameters included
    page_url: String,
    /// Source text input
    input_locator: Locator,
    /// Rendered translation
    output_locator: Locator,
    /// Attribute holding the translation, element text when `None`
    output_attribute: Option<String>,
    poll_interval: Duration,
    timeout: Duration,
}

impl Extractor {
    /// Create an extractor from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = &config.extractor;
        Ok(Self {
            page_url: config.translation_page_url()?.to_string(),
            input_locator: extractor.input_locator.clone(),
            output_locator: extractor.output_locator.clone(),
            output_attribute: extractor.output_attribute.clone(),
            poll_interval: extractor.poll_interval(),
            timeout: extractor.timeout(),
        })
    }

    /// Create an extractor with explicit locators
    pub fn new(page_url: impl Into<String>, input_locator: Locator, output_locator: Locator) -> Self {
        Self {
            page_url: page_url.into(),
            input_locator,
            output_locator,
            output_attribute: None,
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(5),
        }
    }

    /// Read the translation from an attribute instead of the element text
    pub fn with_output_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.output_attribute = Some(attribute.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit `request` on the page and wait for its translation
    pub async fn extract<S>(&self, session: &mut S, request: &FetchRequest) -> FetchResult
    where
        S: BrowserSession + ?Sized,
    {
        debug!("Navigating to {}", self.page_url);
        session.navigate(&self.page_url).await?;

        let input = session
            .find_element(&self.input_locator)
            .await?
            .ok_or_else(|| FetchError::ElementNotFound(self.input_locator.to_string()))?;
        session.send_keys(&input, &request.text).await?;

        let translated = self.poll_output(session).await?;
        debug!(
            "Extracted '{}' for '{}'",
            truncate_text(&translated, 30),
            truncate_text(&request.text, 30)
        );
        Ok(translated)
    }

    async fn poll_output<S>(&self, session: &mut S) -> FetchResult
    where
        S: BrowserSession + ?Sized,
    {
        let deadline = Instant::now() + self.timeout;
        let mut polls = 0u32;
        let mut output_seen = false;

        loop {
            polls += 1;
            match self.probe(session).await? {
                Probe::Ready(text) => return Ok(text),
                Probe::Pending => output_seen = true,
                Probe::Missing => {}
            }

            let now = Instant::now();
            if now >= deadline {
                if !output_seen {
                    debug!("Output element never appeared in {} polls", polls);
                    return Err(FetchError::ElementNotFound(self.output_locator.to_string()));
                }
                debug!("No translation after {} polls in {:?}", polls, self.timeout);
                return Err(FetchError::Timeout);
            }

            trace!("Translation not ready (poll {})", polls);
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn probe<S>(&self, session: &mut S) -> Result<Probe, FetchError>
    where
        S: BrowserSession + ?Sized,
    {
        let Some(element) = session.find_element(&self.output_locator).await? else {
            return Ok(Probe::Missing);
        };

        let value = session
            .read(&element, self.output_attribute.as_deref())
            .await?;

        Ok(match value {
            Some(text) if !text.trim().is_empty() => Probe::Ready(text.trim().to_string()),
            _ => Probe::Pending,
        })
    }
}
