// Session listing, deletion and retention

use richiesta_cleanup::store::{ConfigPatch, ConfigStore};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::{write_file, Fixture};

#[tokio::test]
async fn test_list_and_delete_sessions() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let backup = tmp.path().join("backup");
    write_file(&project, "a.log", 8);

    let mut fixture = Fixture::new(&project, &backup);
    fixture.patterns = &[("*.log", 1)];
    let (_store, service) = fixture.build().await;

    assert!(service.list_sessions().await.unwrap().is_empty());

    let executed = service.execute_cleanup("tester").await.unwrap();
    // Unrelated folders are ignored
    std::fs::create_dir_all(backup.join("other")).unwrap();

    let sessions = service.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].name, executed.cleanup_dir);
    assert_eq!(sessions[0].file_count, 1);
    assert_eq!(sessions[0].total_size, 8);

    let removed = service.delete_session(&executed.cleanup_dir).await.unwrap();
    assert!(!removed.exists());
    assert!(service.list_sessions().await.unwrap().is_empty());
    assert!(backup.join("other").exists());
}

#[tokio::test]
async fn test_prune_respects_retention() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (store, service) = fixture.build().await;
    service.execute_cleanup("tester").await.unwrap();

    // A fresh session is kept under the default retention
    assert!(service.prune_sessions().await.unwrap().is_empty());
    assert_eq!(service.list_sessions().await.unwrap().len(), 1);

    // Zero disables pruning
    store
        .update_config("default", ConfigPatch { retention_days: Some(0), ..Default::default() })
        .await
        .unwrap();
    assert!(service.prune_sessions().await.unwrap().is_empty());
    assert_eq!(service.list_sessions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_prune_removes_expired_sessions() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let backup = tmp.path().join("backup");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &backup);
    fixture.patterns = &[("*.log", 1)];
    fixture.config.retention_days = Some(7);
    let (_store, service) = fixture.build().await;

    let old = service.execute_cleanup("tester").await.unwrap();
    let month_ago = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
    std::fs::File::open(&old.cleanup_path)
        .unwrap()
        .set_modified(month_ago)
        .unwrap();

    // A second session with its own name that stays fresh
    let fresh = backup.join("CLEANUP-fresh");
    std::fs::create_dir_all(&fresh).unwrap();

    let removed = service.prune_sessions().await.unwrap();
    assert_eq!(removed, vec![old.cleanup_dir.clone()]);
    assert!(!old.cleanup_path.exists());
    assert!(fresh.exists());
}
