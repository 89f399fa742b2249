/*!
 * Integration tests for the lookup, fetch and save workflow
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use hola::errors::{FetchError, TranslationError};
use hola::translation::{
    FetchRequest, FetchResult, MemoryStore, SessionCoordinator, SessionState, TranslationEntry,
    TranslationFetcher, TranslationService, TranslationStore,
};

use crate::common;
use crate::common::fakes::{fake_extractor, CountingFetcher, FakeLauncher, SessionTracker};

/// Service over a memory store and a coordinator driving fake sessions
fn browser_backed_service(
    launcher: FakeLauncher,
) -> (
    TranslationService,
    MemoryStore,
    Arc<SessionCoordinator>,
    Arc<parking_lot::Mutex<SessionTracker>>,
) {
    common::init_logging();
    let tracker = launcher.tracker();
    let store = MemoryStore::new();
    let coordinator = Arc::new(SessionCoordinator::new(
        Arc::new(launcher),
        fake_extractor(Duration::from_secs(5)),
    ));
    let service = TranslationService::new(Arc::new(store.clone()), coordinator.clone());
    (service, store, coordinator, tracker)
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_withEmptyStore_shouldFetchAndStore() {
    let launcher = FakeLauncher::new()
        .with_translation("Hola", "Hello")
        .with_appear_after(Duration::from_millis(800));
    let (service, store, coordinator, tracker) = browser_backed_service(launcher);

    let result = service.get_translation("Hola").await.unwrap();

    assert_eq!(result, "Hello");
    assert_eq!(store.lookup("Hola").await.unwrap(), Some("Hello".to_string()));
    assert_eq!(coordinator.state(), SessionState::Closed);
    assert_eq!(tracker.lock().launches, 1);
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_calledTwice_shouldFetchOnce() {
    let launcher = FakeLauncher::new().with_translation("Hola", "Hello");
    let (service, _store, _coordinator, tracker) = browser_backed_service(launcher);

    let first = service.get_translation("Hola").await.unwrap();
    let second = service.get_translation("Hola").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(tracker.lock().launches, 1);
    assert_eq!(service.stats().hits, 1);
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_withStoredEntry_shouldNeverTouchBrowser() {
    let launcher = FakeLauncher::new().failing();
    let tracker = launcher.tracker();
    let store = MemoryStore::with_entries(vec![TranslationEntry::new("Gato", "Cat")]);
    let coordinator = Arc::new(SessionCoordinator::new(
        Arc::new(launcher),
        fake_extractor(Duration::from_secs(5)),
    ));
    let service = TranslationService::new(Arc::new(store), coordinator.clone());

    assert_eq!(service.get_translation("Gato").await.unwrap(), "Cat");
    assert_eq!(coordinator.state(), SessionState::Idle);
    assert_eq!(tracker.lock().launches, 0);
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_withEmptyText_shouldFailWithoutFetchOrWrite() {
    let launcher = FakeLauncher::new();
    let (service, store, coordinator, tracker) = browser_backed_service(launcher);

    let err = service.get_translation("").await.unwrap_err();

    assert!(matches!(err, TranslationError::NoText));
    assert!(store.is_empty());
    assert_eq!(coordinator.state(), SessionState::Idle);
    assert_eq!(tracker.lock().launches, 0);
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_withTimeout_shouldReportUpstreamAndStoreNothing() {
    let launcher = FakeLauncher::new().with_appear_after(Duration::from_secs(30));
    let (service, store, coordinator, tracker) = browser_backed_service(launcher);

    let err = service.get_translation("Hola").await.unwrap_err();

    assert!(matches!(err, TranslationError::UpstreamUnavailable(FetchError::Timeout)));
    assert_eq!(err.status_code(), 503);
    assert!(store.is_empty());
    assert_eq!(coordinator.state(), SessionState::Closed);
    assert_eq!(tracker.lock().closes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_concurrentMissesForSameText_shouldFetchOnce() {
    let launcher = FakeLauncher::new()
        .with_translation("Hola", "Hello")
        .with_appear_after(Duration::from_secs(1));
    let (service, store, _coordinator, tracker) = browser_backed_service(launcher);
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.get_translation("Hola").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "Hello");
    }
    assert_eq!(tracker.lock().launches, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_concurrentDistinctTexts_shouldSerializeSessions() {
    let launcher = FakeLauncher::new().with_appear_after(Duration::from_millis(400));
    let (service, store, _coordinator, tracker) = browser_backed_service(launcher);
    let service = Arc::new(service);

    let handles: Vec<_> = ["Uno", "Dos", "Tres"]
        .into_iter()
        .map(|text| {
            let service = service.clone();
            tokio::spawn(async move { service.get_translation(text).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    let tracker = tracker.lock();
    assert_eq!(tracker.launches, 3);
    assert_eq!(tracker.max_active, 1);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_getTranslation_withPrewrittenRaceEntry_shouldReturnStoredValue() {
    // A store that gains the entry between the service's checks and its save
    let store = MemoryStore::new();
    let fetcher = Arc::new(RacingFetcher {
        store: store.clone(),
    });
    let service = TranslationService::new(Arc::new(store.clone()), fetcher);

    let result = service.get_translation("Hola").await.unwrap();

    assert_eq!(result, "Hello (first)");
    assert_eq!(store.lookup("Hola").await.unwrap(), Some("Hello (first)".to_string()));
}

#[tokio::test]
async fn test_getTranslation_withCountingFetcher_shouldNotFetchStoredTexts() {
    let fetcher = Arc::new(CountingFetcher::new().with_translation("Perro", "Dog"));
    let service = TranslationService::new(Arc::new(MemoryStore::new()), fetcher.clone());

    for _ in 0..5 {
        assert_eq!(service.get_translation("Perro").await.unwrap(), "Dog");
    }

    assert_eq!(fetcher.calls(), 1);
}

/// Fetcher that lets another writer win the race before returning
struct RacingFetcher {
    store: MemoryStore,
}

#[async_trait]
impl TranslationFetcher for RacingFetcher {
    async fn fetch_translation(&self, _request: FetchRequest) -> FetchResult {
        self.store
            .save("Hola", "Hello (first)", None)
            .await
            .map_err(|e| FetchError::Session(e.to_string()))?;
        Ok("Hello (second)".to_string())
    }
}

#[tokio::test(start_paused = true)]
async fn test_getTranslation_withSlowFetcher_shouldShareOneFetchAcrossWaiters() {
    let fetcher = Arc::new(CountingFetcher::new().with_delay(Duration::from_secs(2)));
    let service = Arc::new(TranslationService::new(Arc::new(MemoryStore::new()), fetcher.clone()));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.get_translation("Lento").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "EN(Lento)");
    }
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(service.stats().hits, 4);
}
