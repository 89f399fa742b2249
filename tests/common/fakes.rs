/*!
 * Fake browser sessions and fetchers for testing
 *
 * `FakeLauncher` hands out scripted sessions that behave like the
 * translation page: the output element stays empty until a configurable
 * delay after the text was typed. Every call is recorded in a shared
 * `SessionTracker` so tests can assert on launches, closes and overlap.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use hola::browser::{BrowserSession, ElementRef, Locator, SessionLauncher};
use hola::errors::FetchError;
use hola::translation::{Extractor, FetchRequest, FetchResult, TranslationFetcher};

/// Locator values the fake page understands
pub const INPUT: &str = "//textarea[@aria-label='Source text']";
pub const OUTPUT: &str = "//textarea[@aria-label='Translated text']";

/// Extractor pointed at the fake page
pub fn fake_extractor(timeout: Duration) -> Extractor {
    Extractor::new(
        "https://translate.example/?sl=es&tl=en&op=translate",
        Locator::XPath(INPUT.to_string()),
        Locator::XPath(OUTPUT.to_string()),
    )
    .with_output_attribute("data-initial-value")
    .with_poll_interval(Duration::from_millis(100))
    .with_timeout(timeout)
}

/// What the fake sessions did
#[derive(Debug, Default)]
pub struct SessionTracker {
    pub launches: usize,
    pub closes: usize,
    /// Sessions launched and not yet closed
    pub active: usize,
    /// Highest `active` ever observed
    pub max_active: usize,
    pub navigations: Vec<String>,
    pub typed: Vec<String>,
}

/// Launcher of scripted sessions
pub struct FakeLauncher {
    tracker: Arc<Mutex<SessionTracker>>,
    translations: HashMap<String, String>,
    appear_after: Duration,
    page_latency: Duration,
    input_present: bool,
    output_present: bool,
    fail_launch: bool,
}

impl FakeLauncher {
    /// Launcher whose page shows translations immediately
    pub fn new() -> Self {
        Self {
            tracker: Arc::new(Mutex::new(SessionTracker::default())),
            translations: HashMap::new(),
            appear_after: Duration::ZERO,
            page_latency: Duration::ZERO,
            input_present: true,
            output_present: true,
            fail_launch: false,
        }
    }

    /// Known translation; unknown texts come back as `EN(<text>)`
    pub fn with_translation(mut self, source: &str, target: &str) -> Self {
        self.translations.insert(source.to_string(), target.to_string());
        self
    }

    /// Output stays empty for this long after typing
    pub fn with_appear_after(mut self, delay: Duration) -> Self {
        self.appear_after = delay;
        self
    }

    /// Navigation takes this long
    pub fn with_page_latency(mut self, latency: Duration) -> Self {
        self.page_latency = latency;
        self
    }

    /// The input element never resolves
    pub fn without_input(mut self) -> Self {
        self.input_present = false;
        self
    }

    /// The output element never resolves
    pub fn without_output(mut self) -> Self {
        self.output_present = false;
        self
    }

    /// Launching fails
    pub fn failing(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn tracker(&self) -> Arc<Mutex<SessionTracker>> {
        self.tracker.clone()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        if self.fail_launch {
            return Err(FetchError::Session("chrome not reachable".to_string()));
        }

        {
            let mut tracker = self.tracker.lock();
            tracker.launches += 1;
            tracker.active += 1;
            tracker.max_active = tracker.max_active.max(tracker.active);
        }

        Ok(Box::new(FakeSession {
            tracker: self.tracker.clone(),
            translations: self.translations.clone(),
            appear_after: self.appear_after,
            page_latency: self.page_latency,
            input_present: self.input_present,
            output_present: self.output_present,
            typed: None,
            closed: false,
        }))
    }
}

/// One scripted session
struct FakeSession {
    tracker: Arc<Mutex<SessionTracker>>,
    translations: HashMap<String, String>,
    appear_after: Duration,
    page_latency: Duration,
    input_present: bool,
    output_present: bool,
    /// Text typed and when
    typed: Option<(String, Instant)>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.tracker.lock().navigations.push(url.to_string());
        if !self.page_latency.is_zero() {
            sleep(self.page_latency).await;
        }
        Ok(())
    }

    async fn find_element(&mut self, locator: &Locator) -> Result<Option<ElementRef>, FetchError> {
        match locator.value() {
            INPUT if self.input_present => Ok(Some(ElementRef::new("input"))),
            OUTPUT if self.output_present => Ok(Some(ElementRef::new("output"))),
            _ => Ok(None),
        }
    }

    async fn send_keys(&mut self, _element: &ElementRef, text: &str) -> Result<(), FetchError> {
        self.tracker.lock().typed.push(text.to_string());
        self.typed = Some((text.to_string(), Instant::now()));
        Ok(())
    }

    async fn read(
        &mut self,
        element: &ElementRef,
        _attribute: Option<&str>,
    ) -> Result<Option<String>, FetchError> {
        if element.id() != "output" {
            return Ok(None);
        }
        let Some((text, typed_at)) = &self.typed else {
            return Ok(Some(String::new()));
        };
        if typed_at.elapsed() < self.appear_after {
            return Ok(Some(String::new()));
        }
        let translated = self
            .translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("EN({})", text));
        Ok(Some(translated))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if !self.closed {
            self.closed = true;
            let mut tracker = self.tracker.lock();
            tracker.closes += 1;
            tracker.active -= 1;
        }
        Ok(())
    }
}

/// Fetcher that answers from a table and counts its calls
pub struct CountingFetcher {
    calls: AtomicUsize,
    translations: HashMap<String, String>,
    delay: Duration,
    fail_on: Option<String>,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            translations: HashMap::new(),
            delay: Duration::ZERO,
            fail_on: None,
        }
    }

    pub fn with_translation(mut self, source: &str, target: &str) -> Self {
        self.translations.insert(source.to_string(), target.to_string());
        self
    }

    /// Each fetch takes this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetching this text times out
    pub fn failing_on(mut self, source: &str) -> Self {
        self.fail_on = Some(source.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationFetcher for CountingFetcher {
    async fn fetch_translation(&self, request: FetchRequest) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if self.fail_on.as_deref() == Some(request.text.as_str()) {
            return Err(FetchError::Timeout);
        }
        Ok(self
            .translations
            .get(&request.text)
            .cloned()
            .unwrap_or_else(|| format!("EN({})", request.text)))
    }
}
