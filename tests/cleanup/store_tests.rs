// Store persistence, validation and seeding through the public API

use richiesta_cleanup::error::CleanupError;
use richiesta_cleanup::store::{
    seed_defaults, ConfigPatch, ConfigStore, ExecutionFilter, ExecutionLog, ExecutionStatus, JsonStore,
    NewExcludeDirectory, NewPattern, NewSchedule, OperationKind, PatternPatch, SchedulePatch, DEFAULT_CONFIG_NAME,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_rows_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("state/store.json");

    {
        let store = JsonStore::open(&path).await.unwrap();
        store
            .update_config(
                DEFAULT_CONFIG_NAME,
                ConfigPatch {
                    project_path: Some("/proj".into()),
                    target_directory: Some("/backup".into()),
                    max_depth: Some(Some(4)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.create_pattern(NewPattern::new("*.log", 1)).await.unwrap();
        store.create_exclude_dir(NewExcludeDirectory::new("node_modules")).await.unwrap();
        store.create_schedule(NewSchedule::new("weekly", "0 2 * * 0")).await.unwrap();
    }

    let store = JsonStore::open(&path).await.unwrap();
    let config = store.get_config(DEFAULT_CONFIG_NAME).await.unwrap();
    assert_eq!(config.max_depth, Some(4));
    assert_eq!(store.list_patterns(false).await.unwrap()[0].pattern, "*.log");
    assert_eq!(store.list_exclude_dirs(false).await.unwrap().len(), 1);
    assert_eq!(store.list_schedules(false).await.unwrap()[0].cron_expression, "0 2 * * 0");
    assert!(!tmp.path().join("state/store.json.tmp").exists());
}

#[tokio::test]
async fn test_corrupt_document_is_reported() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let err = JsonStore::open(&path).await.err().unwrap();
    assert!(matches!(err, CleanupError::Persistence { .. }));
}

#[tokio::test]
async fn test_invalid_rows_are_rejected() {
    let store = JsonStore::in_memory();

    let err = store.create_pattern(NewPattern::new("[unclosed", 1)).await.unwrap_err();
    assert!(matches!(err, CleanupError::InvalidPattern { .. }));

    let err = store.create_schedule(NewSchedule::new("bad", "99 * * * *")).await.unwrap_err();
    assert!(matches!(err, CleanupError::InvalidSchedule { .. }));

    let row = store.create_schedule(NewSchedule::new("nightly", "0 1 * * *")).await.unwrap();
    let err = store
        .update_schedule(
            row.id,
            SchedulePatch {
                cron_expression: Some("* *".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CleanupError::InvalidSchedule { .. }));
    assert_eq!(store.list_schedules(true).await.unwrap()[0].cron_expression, "0 1 * * *");
}

#[tokio::test]
async fn test_duplicates_and_missing_ids() {
    let store = JsonStore::in_memory();
    store.create_pattern(NewPattern::new("*.tmp", 1)).await.unwrap();

    let err = store.create_pattern(NewPattern::new("*.tmp", 2)).await.unwrap_err();
    assert!(matches!(err, CleanupError::DuplicateRecord { .. }));

    let err = store.update_pattern(999, PatternPatch::default()).await.unwrap_err();
    assert!(matches!(err, CleanupError::RecordNotFound { .. }));
    assert!(store.delete_pattern(999).await.is_err());
}

#[tokio::test]
async fn test_inactive_rows_are_hidden_by_default() {
    let store = JsonStore::in_memory();
    let row = store.create_pattern(NewPattern::new("*.bak", 1)).await.unwrap();
    store
        .update_pattern(
            row.id,
            PatternPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(store.list_patterns(false).await.unwrap().is_empty());
    assert_eq!(store.list_patterns(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seed_defaults_once() {
    let store = JsonStore::in_memory();
    let first = seed_defaults(&store).await.unwrap();
    assert!(first.patterns > 0);
    assert!(first.excluded_files > 0);
    assert!(first.excluded_dirs > 0);

    let second = seed_defaults(&store).await.unwrap();
    assert_eq!(second.patterns, 0);
    assert_eq!(second.excluded_files, 0);
    assert_eq!(second.excluded_dirs, 0);
}

#[tokio::test]
async fn test_execution_log_filters_and_stats() {
    let store = JsonStore::in_memory();
    let now = chrono::Utc::now();
    for (i, status) in [ExecutionStatus::Completed, ExecutionStatus::Failed, ExecutionStatus::Completed]
        .into_iter()
        .enumerate()
    {
        store
            .record_execution(ExecutionLog {
                execution_id: format!("cleanup-{}", i),
                operation: OperationKind::Cleanup,
                status,
                target_path: None,
                files_processed: 2,
                total_size: 100,
                executed_by: "tester".into(),
                started_at: now + chrono::Duration::seconds(i as i64),
                completed_at: None,
                error_message: None,
                problems: Vec::new(),
            })
            .await
            .unwrap();
    }

    let newest = store
        .list_executions(ExecutionFilter {
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(newest[0].execution_id, "cleanup-2");

    let failed = store
        .list_executions(ExecutionFilter {
            status: Some(ExecutionStatus::Failed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);

    let stats = store.daily_stats(7).await.unwrap();
    let total: usize = stats.iter().map(|d| d.total_executions).sum();
    assert_eq!(total, 3);
    assert_eq!(stats.iter().map(|d| d.failed_runs).sum::<usize>(), 1);
}
