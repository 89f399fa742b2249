use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::browser::{SessionLauncher, WebDriverLauncher};
use crate::database::models::StoreStats;
use crate::database::{DatabaseConnection, Repository};
use crate::errors::{StoreError, TranslationError};
use crate::file_utils::FileManager;
use crate::transcript;
use crate::translation::{
    truncate_text, Extractor, FetchRequest, MemoryStore, ServiceStats, SessionCoordinator,
    SessionState, TranslationEntry, TranslationFetcher, TranslationService, TranslationStore,
};

// @module: Application controller wiring store, session and service together

/// Where translations are kept
#[derive(Clone)]
pub enum StoreBackend {
    /// SQLite database on disk
    Sqlite(Repository),
    /// Process memory, lost on exit
    Memory(MemoryStore),
}

impl StoreBackend {
    fn as_store(&self) -> Arc<dyn TranslationStore> {
        match self {
            Self::Sqlite(repo) => Arc::new(repo.clone()),
            Self::Memory(store) => Arc::new(store.clone()),
        }
    }
}

/// Outcome of translating a paragraph file
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Paragraphs translated, in file order
    pub entries: Vec<TranslationEntry>,
    /// Paragraphs that could not be translated
    pub failed: usize,
    pub elapsed: Duration,
}

impl FileReport {
    pub fn translated(&self) -> usize {
        self.entries.len()
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation store
    backend: StoreBackend,
    // @field: Store-first lookup
    service: TranslationService,
    // @field: Session owner, absent when a custom fetcher is injected
    coordinator: Option<Arc<SessionCoordinator>>,
}

impl Controller {
    // @method: Create a controller backed by the configured SQLite store
    pub fn with_config(config: Config) -> Result<Self> {
        let repo = Repository::new(DatabaseConnection::from_config(&config.store)?);
        Self::with_backend(config, StoreBackend::Sqlite(repo))
    }

    // @method: Create a controller that keeps translations in memory only
    pub fn ephemeral(config: Config) -> Result<Self> {
        Self::with_backend(config, StoreBackend::Memory(MemoryStore::new()))
    }

    // @method: Create a controller fetching through a WebDriver session
    pub fn with_backend(config: Config, backend: StoreBackend) -> Result<Self> {
        let launcher: Arc<dyn SessionLauncher> = Arc::new(
            WebDriverLauncher::new(&config.browser).context("Failed to create WebDriver client")?,
        );
        let extractor = Extractor::from_config(&config)?;
        let coordinator = Arc::new(SessionCoordinator::new(launcher, extractor));
        let service = TranslationService::new(backend.as_store(), coordinator.clone());

        Ok(Self {
            config,
            backend,
            service,
            coordinator: Some(coordinator),
        })
    }

    // @method: Create a controller around any fetcher
    pub fn with_fetcher(
        config: Config,
        backend: StoreBackend,
        fetcher: Arc<dyn TranslationFetcher>,
    ) -> Self {
        let service = TranslationService::new(backend.as_store(), fetcher);
        Self {
            config,
            backend,
            service,
            coordinator: None,
        }
    }

    /// Translate one text, from the store when possible
    pub async fn translate(
        &self,
        text: &str,
        title: Option<&str>,
    ) -> Result<String, TranslationError> {
        let mut request = FetchRequest::new(text);
        if let Some(title) = title {
            request = request.with_title(title);
        }
        self.service.translate(request).await
    }

    /// Store-only lookup; never fetches
    pub async fn lookup(&self, text: &str) -> Result<Option<String>, StoreError> {
        self.backend.as_store().lookup(text).await
    }

    /// Translate every paragraph of a text file under a context title
    pub async fn translate_file(&self, path: &Path, title: &str) -> Result<FileReport> {
        let start_time = Instant::now();

        if !FileManager::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }
        let paragraphs = FileManager::read_paragraphs(path)?;
        if paragraphs.is_empty() {
            warn!("No paragraphs found in {:?}", path);
        }

        let progress_bar = ProgressBar::new(paragraphs.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(title.to_string());

        let mut entries = Vec::with_capacity(paragraphs.len());
        let mut failed = 0;

        for paragraph in paragraphs {
            match self.translate(&paragraph, Some(title)).await {
                Ok(target) => entries.push(TranslationEntry::new(paragraph, target)),
                Err(e) => {
                    failed += 1;
                    progress_bar.suspend(|| {
                        error!("Failed to translate '{}': {}", truncate_text(&paragraph, 40), e)
                    });
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        let report = FileReport {
            entries,
            failed,
            elapsed: start_time.elapsed(),
        };
        info!(
            "Translated {} paragraphs, {} failed, in {}",
            report.translated(),
            report.failed,
            Self::format_duration(report.elapsed)
        );
        Ok(report)
    }

    /// Write the bilingual transcript of a file run
    pub fn write_transcript(&self, report: &FileReport, output: &Path) -> Result<PathBuf> {
        let text = transcript::render_for_languages(
            &report.entries,
            &self.config.source_language,
            &self.config.target_language,
        )?;
        FileManager::write_to_file(output, &text)?;
        info!("Success: {}", output.display());
        Ok(output.to_path_buf())
    }

    /// Bilingual transcript of everything stored under `title`
    pub async fn transcript(&self, title: &str) -> Result<String> {
        let entries: Vec<TranslationEntry> = match &self.backend {
            StoreBackend::Sqlite(repo) => repo
                .entries_for_title(title)
                .await?
                .into_iter()
                .map(TranslationEntry::from)
                .collect(),
            StoreBackend::Memory(store) => store.entries_for_title(title),
        };
        if entries.is_empty() {
            return Err(anyhow!("No translations stored under '{}'", title));
        }
        transcript::render_for_languages(
            &entries,
            &self.config.source_language,
            &self.config.target_language,
        )
    }

    /// Store counts
    pub async fn store_stats(&self) -> Result<StoreStats> {
        match &self.backend {
            StoreBackend::Sqlite(repo) => repo.stats().await,
            StoreBackend::Memory(store) => Ok(store.stats()),
        }
    }

    /// Counters of this controller's service
    pub fn service_stats(&self) -> ServiceStats {
        self.service.stats()
    }

    /// State of the browser session slot, if this controller owns one
    pub fn session_state(&self) -> Option<SessionState> {
        self.coordinator.as_ref().map(|c| c.state())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
