/*!
 * Tests for the session coordinator lifecycle
 */

use std::sync::Arc;
use std::time::Duration;

use hola::errors::FetchError;
use hola::translation::{FetchRequest, SessionCoordinator, SessionState, TranslationFetcher};

use crate::common::fakes::{fake_extractor, FakeLauncher};

fn coordinator(launcher: FakeLauncher, timeout: Duration) -> SessionCoordinator {
    SessionCoordinator::new(Arc::new(launcher), fake_extractor(timeout))
}

#[tokio::test(start_paused = true)]
async fn test_fetchTranslation_withSuccess_shouldEndClosed() {
    let launcher = FakeLauncher::new().with_translation("Hola", "Hello");
    let tracker = launcher.tracker();
    let coordinator = coordinator(launcher, Duration::from_secs(5));
    assert_eq!(coordinator.state(), SessionState::Idle);

    let result = coordinator.fetch_translation(FetchRequest::new("Hola")).await;

    assert_eq!(result, Ok("Hello".to_string()));
    assert_eq!(coordinator.state(), SessionState::Closed);
    let tracker = tracker.lock();
    assert_eq!(tracker.launches, 1);
    assert_eq!(tracker.closes, 1);
    assert_eq!(tracker.active, 0);
}

#[tokio::test(start_paused = true)]
async fn test_fetchTranslation_withTimeout_shouldEndClosed() {
    let launcher = FakeLauncher::new().with_appear_after(Duration::from_secs(10));
    let tracker = launcher.tracker();
    let coordinator = coordinator(launcher, Duration::from_secs(1));

    let result = coordinator.fetch_translation(FetchRequest::new("Hola")).await;

    assert_eq!(result, Err(FetchError::Timeout));
    assert_eq!(coordinator.state(), SessionState::Closed);
    assert_eq!(tracker.lock().closes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetchTranslation_withMissingInput_shouldEndClosed() {
    let launcher = FakeLauncher::new().without_input();
    let tracker = launcher.tracker();
    let coordinator = coordinator(launcher, Duration::from_secs(5));

    let result = coordinator.fetch_translation(FetchRequest::new("Hola")).await;

    assert!(matches!(result, Err(FetchError::ElementNotFound(_))));
    assert_eq!(coordinator.state(), SessionState::Closed);
    assert_eq!(tracker.lock().active, 0);
}

#[tokio::test(start_paused = true)]
async fn test_fetchTranslation_withMissingOutput_shouldEndClosed() {
    let launcher = FakeLauncher::new().without_output();
    let tracker = launcher.tracker();
    let coordinator = coordinator(launcher, Duration::from_secs(2));

    let result = coordinator.fetch_translation(FetchRequest::new("Hola")).await;

    assert!(matches!(result, Err(FetchError::ElementNotFound(_))));
    assert_eq!(coordinator.state(), SessionState::Closed);
    assert_eq!(tracker.lock().closes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetchTranslation_withLaunchFailure_shouldReportSessionError() {
    let coordinator = coordinator(FakeLauncher::new().failing(), Duration::from_secs(5));

    let result = coordinator.fetch_translation(FetchRequest::new("Hola")).await;

    assert!(matches!(result, Err(FetchError::Session(_))));
    assert_eq!(coordinator.state(), SessionState::Closed);
    assert_eq!(coordinator.sessions_started(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fetchTranslation_concurrentCalls_shouldNeverOverlapSessions() {
    let launcher = FakeLauncher::new()
        .with_page_latency(Duration::from_millis(300))
        .with_appear_after(Duration::from_millis(500));
    let tracker = launcher.tracker();
    let coordinator = Arc::new(coordinator(launcher, Duration::from_secs(5)));

    let handles: Vec<_> = ["Uno", "Dos", "Tres", "Cuatro"]
        .into_iter()
        .map(|text| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.fetch_translation(FetchRequest::new(text)).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let tracker = tracker.lock();
    assert_eq!(tracker.launches, 4);
    assert_eq!(tracker.closes, 4);
    assert_eq!(tracker.max_active, 1);
    assert_eq!(coordinator.sessions_started(), 4);
}
