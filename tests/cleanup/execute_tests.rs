// Execute: copying into session folders, artifacts, safety and locking

use richiesta_cleanup::cleanup::{Manifest, MANIFEST_FILE, README_FILE};
use richiesta_cleanup::error::CleanupError;
use richiesta_cleanup::store::{ConfigPatch, ConfigStore, ExecutionFilter, ExecutionStatus, OperationKind};
use tempfile::TempDir;

use crate::{files_under, write_file, Fixture};

#[tokio::test]
async fn test_execute_copies_and_keeps_sources() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let backup = tmp.path().join("backup");
    write_file(&project, "a.log", 10);
    write_file(&project, "nested/b.log", 4);
    write_file(&project, "c.txt", 1);

    let mut fixture = Fixture::new(&project, &backup);
    fixture.patterns = &[("*.log", 1)];
    let (store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    assert!(result.success);
    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.copied_count, 2);
    assert_eq!(result.total_size, 14);
    assert!(result.cleanup_dir.starts_with("CLEANUP-"));
    assert!(result.cleanup_path.starts_with(&backup));

    // Sources stay in place
    assert!(project.join("a.log").exists());
    assert!(project.join("nested/b.log").exists());

    let copied = files_under(&result.cleanup_path);
    assert_eq!(copied, vec![README_FILE, "a.log", MANIFEST_FILE, "nested/b.log"]);

    let manifest = Manifest::read(&result.cleanup_path).await.unwrap();
    assert_eq!(manifest.files.len(), 2);
    assert_eq!(manifest.total_size(), 14);
    assert!(manifest.files.iter().all(|f| f.checksum.len() == 64));

    let logs = store.list_executions(ExecutionFilter::default()).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].operation, OperationKind::Cleanup);
    assert_eq!(logs[0].files_processed, 2);
    assert_eq!(logs[0].executed_by, "tester");
}

#[tokio::test]
async fn test_fixed_format_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let backup = tmp.path().join("backup");
    write_file(&project, "a.log", 3);
    write_file(&project, "x/b.log", 3);

    let mut fixture = Fixture::new(&project, &backup);
    fixture.patterns = &[("*.log", 1)];
    fixture.config.directory_format = Some("snapshot".into());
    let (_store, service) = fixture.build().await;

    let first = service.execute_cleanup("tester").await.unwrap();
    let after_first = files_under(&backup);
    let second = service.execute_cleanup("tester").await.unwrap();
    let after_second = files_under(&backup);

    assert_eq!(first.cleanup_path, backup.join("snapshot"));
    assert_eq!(first.cleanup_path, second.cleanup_path);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_readme_is_optional() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    fixture.config.create_readme = Some(false);
    let (_store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    assert!(!result.readme_written);
    assert!(!result.cleanup_path.join(README_FILE).exists());
    assert!(result.cleanup_path.join(MANIFEST_FILE).exists());
}

#[tokio::test]
async fn test_flat_layout_disambiguates_names() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "a/x.log", 1);
    write_file(&project, "b/x.log", 2);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    fixture.config.preserve_structure = Some(false);
    fixture.config.create_readme = Some(false);
    let (_store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    let copied = files_under(&result.cleanup_path);
    assert_eq!(copied, vec![MANIFEST_FILE, "x-1.log", "x.log"]);
}

#[tokio::test]
async fn test_destination_inside_project_blocks_execution() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("app");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &project.join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (store, service) = fixture.build().await;

    let err = service.execute_cleanup("tester").await.unwrap_err();
    assert!(matches!(err, CleanupError::DestinationInsideProject { .. }));
    assert!(!project.join("backup").exists());

    let logs = store.list_executions(ExecutionFilter::default()).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, ExecutionStatus::Failed);
    assert!(logs[0].error_message.is_some());
}

#[tokio::test]
async fn test_concurrent_execute_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (_store, service) = fixture.build().await;

    let guard = service.locks().acquire(OperationKind::Cleanup).unwrap();
    let err = service.execute_cleanup("tester").await.unwrap_err();
    assert!(matches!(err, CleanupError::AlreadyRunning { .. }));

    drop(guard);
    assert!(service.execute_cleanup("tester").await.is_ok());
}

#[tokio::test]
async fn test_relative_target_uses_base_path() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let base = tmp.path().join("srv");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, std::path::Path::new("archive"));
    fixture.patterns = &[("*.log", 1)];
    fixture.config.base_path = Some(Some(base.clone()));
    let (store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    assert!(result.cleanup_path.starts_with(base.join("archive")));

    // Without a base, a relative target lands inside the project and is refused
    store
        .update_config("default", ConfigPatch { base_path: Some(None), ..Default::default() })
        .await
        .unwrap();
    assert!(matches!(
        service.execute_cleanup("tester").await,
        Err(CleanupError::DestinationInsideProject { .. })
    ));
}

#[tokio::test]
async fn test_copy_failure_is_recorded_and_others_continue() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let backup = tmp.path().join("backup");
    write_file(&project, "a.log", 5);
    write_file(&project, "b.log", 7);
    // A directory where a.log should land makes that copy fail
    std::fs::create_dir_all(backup.join("snapshot/a.log")).unwrap();

    let mut fixture = Fixture::new(&project, &backup);
    fixture.patterns = &[("*.log", 1)];
    fixture.config.directory_format = Some("snapshot".into());
    let (store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    assert!(result.success);
    assert_eq!(result.status, ExecutionStatus::CompletedWithErrors);
    assert_eq!(result.copied_count, 1);
    assert_eq!(result.total_size, 7);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].operation, "copy");
    assert!(result.errors[0].path.ends_with("a.log"));
    assert_eq!(std::fs::read(result.cleanup_path.join("b.log")).unwrap(), vec![b'x'; 7]);

    let manifest = Manifest::read(&result.cleanup_path).await.unwrap();
    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.files[0].relative_path, "b.log");

    let logs = store.list_executions(ExecutionFilter::default()).await.unwrap();
    assert_eq!(logs[0].status, ExecutionStatus::CompletedWithErrors);
    assert_eq!(logs[0].problems.len(), 1);
}

#[tokio::test]
async fn test_backed_up_readme_is_not_overwritten() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join(README_FILE), b"USER CONTENT").unwrap();

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.md", 1)];
    let (_store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    assert_eq!(result.copied_count, 1);
    assert!(!result.readme_written);
    assert_eq!(result.status, ExecutionStatus::CompletedWithErrors);
    assert!(result.errors.iter().any(|p| p.operation == "write" && p.path.ends_with(README_FILE)));
    assert_eq!(
        std::fs::read(result.cleanup_path.join(README_FILE)).unwrap(),
        b"USER CONTENT"
    );

    std::fs::write(project.join(README_FILE), b"edited").unwrap();
    let restored = service.restore(&result.cleanup_dir, None, "tester").await.unwrap();
    assert_eq!(restored.restored_count, 1);
    assert!(restored.errors.is_empty());
    assert_eq!(std::fs::read(project.join(README_FILE)).unwrap(), b"USER CONTENT");
}

#[tokio::test]
async fn test_flat_layout_keeps_artifact_names_free() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    std::fs::create_dir_all(project.join("docs")).unwrap();
    std::fs::write(project.join("docs").join(README_FILE), b"docs readme").unwrap();

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.md", 1)];
    fixture.config.preserve_structure = Some(false);
    let (_store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
    assert!(result.readme_written);
    assert_eq!(
        std::fs::read(result.cleanup_path.join("README-1.md")).unwrap(),
        b"docs readme"
    );
    assert_eq!(files_under(&result.cleanup_path), vec!["README-1.md", README_FILE, MANIFEST_FILE]);
}

#[tokio::test]
async fn test_file_named_like_the_manifest_is_not_copied() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, MANIFEST_FILE, 3);
    write_file(&project, "data.json", 4);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.json", 1)];
    let (_store, service) = fixture.build().await;

    let result = service.execute_cleanup("tester").await.unwrap();
    assert_eq!(result.copied_count, 1);
    assert_eq!(result.status, ExecutionStatus::CompletedWithErrors);
    assert!(result.errors.iter().any(|p| p.operation == "copy" && p.path.ends_with(MANIFEST_FILE)));

    let manifest = Manifest::read(&result.cleanup_path).await.unwrap();
    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.files[0].relative_path, "data.json");
}
