// Preview: classification, grouping and the destination safety flag

use richiesta_cleanup::cleanup::PREVIEW_FILE_LIMIT;
use richiesta_cleanup::store::{ConfigStore, ExecutionFilter, NewExcludeDirectory, NewExcludeFile, NewPattern};
use tempfile::TempDir;

use crate::{write_file, Fixture};

#[tokio::test]
async fn test_single_log_file_is_counted() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "a.log", 10);
    write_file(&project, "b.txt", 5);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (_store, service) = fixture.build().await;

    let result = service.preview_cleanup("tester").await.unwrap();
    assert!(result.success);
    assert_eq!(result.total_files, 1);
    assert_eq!(result.total_size, 10);
    assert_eq!(result.by_pattern.len(), 1);
    assert_eq!(result.by_pattern["*.log"], 1);
    assert_eq!(result.by_type["log"], 1);
    assert_eq!(result.files[0].relative_path, "a.log");
    assert!(!result.destination_inside_project);
}

#[tokio::test]
async fn test_excluded_directory_is_pruned() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "node_modules/x.log", 10);
    write_file(&project, "src/y.log", 3);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    fixture.exclude_dirs = &["node_modules"];
    let (_store, service) = fixture.build().await;

    let result = service.preview_cleanup("tester").await.unwrap();
    assert_eq!(result.total_files, 1);
    assert_eq!(result.files[0].relative_path, "src/y.log");
}

#[tokio::test]
async fn test_excluded_file_name_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "keep.log", 1);
    write_file(&project, "drop.log", 1);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    fixture.exclude_files = &["keep.log"];
    let (_store, service) = fixture.build().await;

    let result = service.preview_cleanup("tester").await.unwrap();
    let names: Vec<_> = result.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["drop.log"]);
}

#[tokio::test]
async fn test_destination_inside_project_is_flagged() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("app");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &project.join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (_store, service) = fixture.build().await;
    let result = service.preview_cleanup("tester").await.unwrap();
    assert!(result.success);
    assert!(result.destination_inside_project);

    // Sibling with a shared name prefix is outside
    let mut fixture = Fixture::new(&project, &tmp.path().join("application"));
    fixture.patterns = &[("*.log", 1)];
    let (_store, service) = fixture.build().await;
    let result = service.preview_cleanup("tester").await.unwrap();
    assert!(!result.destination_inside_project);
}

#[tokio::test]
async fn test_totals_match_group_sums() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "a.log", 1);
    write_file(&project, "b.log", 2);
    write_file(&project, "temp-x.ts", 3);
    write_file(&project, "nested/temp-y.js", 4);
    write_file(&project, "nested/other.txt", 5);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1), ("temp-*", 2)];
    let (_store, service) = fixture.build().await;

    let result = service.preview_cleanup("tester").await.unwrap();
    assert_eq!(result.total_files, 4);
    assert_eq!(result.total_size, 10);
    assert_eq!(result.by_pattern.values().sum::<usize>(), result.total_files);
    assert_eq!(result.by_type.values().sum::<usize>(), result.total_files);
    assert_eq!(result.files.iter().map(|f| f.size).sum::<u64>(), result.total_size);
}

#[tokio::test]
async fn test_lower_priority_value_wins() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "debug-trace.log", 1);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 5), ("debug-*", 1)];
    let (_store, service) = fixture.build().await;

    let result = service.preview_cleanup("tester").await.unwrap();
    assert_eq!(result.files[0].pattern, "debug-*");
}

#[tokio::test]
async fn test_equal_priority_first_created_wins() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "debug-trace.log", 1);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 3), ("debug-*", 3)];
    let (_store, service) = fixture.build().await;

    let result = service.preview_cleanup("tester").await.unwrap();
    assert_eq!(result.files[0].pattern, "*.log");
}

#[tokio::test]
async fn test_preview_lists_at_most_the_limit() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    for i in 0..PREVIEW_FILE_LIMIT + 5 {
        write_file(&project, &format!("f{:03}.log", i), 1);
    }

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (_store, service) = fixture.build().await;

    let result = service.preview_cleanup("tester").await.unwrap();
    assert_eq!(result.total_files, PREVIEW_FILE_LIMIT + 5);
    assert_eq!(result.files.len(), PREVIEW_FILE_LIMIT);
}

#[tokio::test]
async fn test_preview_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let backup = tmp.path().join("backup");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &backup);
    fixture.patterns = &[("*.log", 1)];
    let (store, service) = fixture.build().await;

    service.preview_cleanup("tester").await.unwrap();
    assert!(!backup.exists());
    assert!(store.list_executions(ExecutionFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_project_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let mut fixture = Fixture::new(&tmp.path().join("missing"), &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (_store, service) = fixture.build().await;

    assert!(service.preview_cleanup("tester").await.is_err());
}

#[tokio::test]
async fn test_rejected_rows_never_reach_the_walk() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    write_file(&project, "a.log", 2);

    let mut fixture = Fixture::new(&project, &tmp.path().join("backup"));
    fixture.patterns = &[("*.log", 1)];
    let (store, service) = fixture.build().await;

    assert!(store.create_pattern(NewPattern::new("/", 9)).await.is_err());
    assert!(store.create_exclude_dir(NewExcludeDirectory::new("/")).await.is_err());
    assert!(store.create_exclude_file(NewExcludeFile::new(" ")).await.is_err());

    let result = service.preview_cleanup("tester").await.unwrap();
    assert_eq!(result.total_files, 1);
}
