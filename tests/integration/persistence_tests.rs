/*!
 * Integration tests for the SQLite store on disk
 */

use anyhow::Result;
use std::sync::Arc;

use hola::database::{DatabaseConnection, Repository};
use hola::translation::{SaveOutcome, TranslationService, TranslationStore};

use crate::common;
use crate::common::fakes::CountingFetcher;

fn open_repo(path: &std::path::Path) -> Result<Repository> {
    Ok(Repository::new(DatabaseConnection::new(path)?))
}

#[tokio::test]
async fn test_repository_afterReopen_shouldServeStoredTranslation() -> Result<()> {
    common::init_logging();
    let dir = common::create_temp_dir()?;
    let db_path = dir.path().join("hola.db");

    {
        let repo = open_repo(&db_path)?;
        let fetcher = Arc::new(CountingFetcher::new().with_translation("Hola", "Hello"));
        let service = TranslationService::new(Arc::new(repo), fetcher.clone());
        assert_eq!(service.get_translation("Hola").await?, "Hello");
        assert_eq!(fetcher.calls(), 1);
    }

    let repo = open_repo(&db_path)?;
    let fetcher = Arc::new(CountingFetcher::new());
    let service = TranslationService::new(Arc::new(repo), fetcher.clone());

    assert_eq!(service.get_translation("Hola").await?, "Hello");
    assert_eq!(fetcher.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_repository_withTwoConnections_shouldKeepFirstWriter() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let db_path = dir.path().join("hola.db");
    let first = open_repo(&db_path)?;
    let second = open_repo(&db_path)?;

    assert_eq!(first.save("Hola", "Hello", None).await?, SaveOutcome::Inserted);
    assert_eq!(second.save("Hola", "Hi", None).await?, SaveOutcome::DuplicateKey);

    assert_eq!(second.lookup("Hola").await?, Some("Hello".to_string()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repository_withConcurrentWritersOnOneFile_shouldInsertOnce() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let db_path = dir.path().join("hola.db");
    let writers: Vec<Repository> = (0..4).map(|_| open_repo(&db_path)).collect::<Result<_>>()?;

    let handles: Vec<_> = writers
        .into_iter()
        .enumerate()
        .map(|(i, repo)| {
            tokio::spawn(async move { repo.save("Hola", &format!("Hello {}", i), None).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        if handle.await?? == SaveOutcome::Inserted {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);
    let stats = open_repo(&db_path)?.stats().await?;
    assert_eq!(stats.total_entries, 1);
    Ok(())
}

#[tokio::test]
async fn test_repository_stats_withFileStore_shouldCountEntries() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let db_path = dir.path().join("hola.db");
    let repo = open_repo(&db_path)?;

    repo.save("Uno", "One", Some("numeros")).await?;
    let stats = repo.stats().await?;

    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.titles, 1);
    assert!(db_path.exists());
    assert!(repo.connection().is_file_backed());
    Ok(())
}
