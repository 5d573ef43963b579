// Scheduled jobs: orphan cleanup, storage statistics and stored schedules

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use richiesta_cleanup::schedule::{
    register_jobs, run_job, CleanupExecutionJob, CronSchedule, Job, OrphanCleanup, OrphanCleanupJob, RunOutcome,
    Scheduler, StorageStatsJob, SCHEDULED_USER,
};
use richiesta_cleanup::settings::Settings;
use richiesta_cleanup::store::{ConfigStore, ExecutionFilter, NewSchedule, OperationKind, SchedulePatch};
use tempfile::TempDir;

use crate::{files_under, write_file, Fixture};

fn uploads_fixture(tmp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let uploads = tmp.path().join("uploads");
    write_file(&uploads, "attachments/kept.pdf", 10);
    write_file(&uploads, "attachments/orphan.pdf", 20);
    write_file(&uploads, "thumbs/orphan.jpg", 5);
    write_file(&uploads, ".gitkeep", 0);

    let references = tmp.path().join("references.txt");
    std::fs::write(&references, "# live uploads\nattachments/kept.pdf\n").unwrap();
    (uploads, references)
}

#[test]
fn test_nightly_cron_fires_next_day() {
    let cron = CronSchedule::parse("0 3 * * *").unwrap();
    let after = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
    assert_eq!(cron.next_after(&after), Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap()));
}

#[tokio::test]
async fn test_orphan_dry_run_deletes_nothing() {
    let tmp = TempDir::new().unwrap();
    let (uploads, references) = uploads_fixture(&tmp);

    let report = OrphanCleanup::new(&uploads, &references)
        .with_dry_run(true)
        .with_min_age(Duration::ZERO)
        .run()
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.scanned, 3);
    assert_eq!(report.referenced, 1);
    assert_eq!(report.orphans, vec!["attachments/orphan.pdf", "thumbs/orphan.jpg"]);
    assert!(report.deleted.is_empty());
    assert_eq!(files_under(&uploads).len(), 4);
}

#[tokio::test]
async fn test_orphan_cleanup_deletes_only_unreferenced() {
    let tmp = TempDir::new().unwrap();
    let (uploads, references) = uploads_fixture(&tmp);

    let report = OrphanCleanup::new(&uploads, &references)
        .with_min_age(Duration::ZERO)
        .run()
        .await
        .unwrap();

    assert_eq!(report.deleted.len(), 2);
    assert_eq!(report.reclaimed_bytes, 25);
    assert_eq!(files_under(&uploads), vec![".gitkeep", "attachments/kept.pdf"]);
}

#[tokio::test]
async fn test_recent_orphans_are_kept() {
    let tmp = TempDir::new().unwrap();
    let (uploads, references) = uploads_fixture(&tmp);

    let report = OrphanCleanup::new(&uploads, &references).run().await.unwrap();
    assert!(report.orphans.is_empty());
    assert_eq!(report.skipped_recent, 2);
    assert_eq!(files_under(&uploads).len(), 4);
}

#[tokio::test]
async fn test_missing_reference_index_fails_the_job() {
    let tmp = TempDir::new().unwrap();
    let (uploads, _) = uploads_fixture(&tmp);
    let project = tmp.path().join("proj");
    std::fs::create_dir_all(&project).unwrap();
    let (store, service) = Fixture::new(&project, &tmp.path().join("backup")).build().await;

    let task = OrphanCleanup::new(&uploads, tmp.path().join("missing.txt")).with_min_age(Duration::ZERO);
    let job: Arc<dyn Job> = Arc::new(
        OrphanCleanupJob::new(task, CronSchedule::parse("0 3 * * *").unwrap(), service.locks().clone())
            .with_store(store.clone()),
    );
    assert_eq!(run_job(&job).await, RunOutcome::Failed);
    assert_eq!(files_under(&uploads).len(), 4);

    let logs = store
        .list_executions(ExecutionFilter {
            operation: Some(OperationKind::OrphanCleanup),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].error_message.is_some());
}

#[tokio::test]
async fn test_storage_stats_job_records_totals() {
    let tmp = TempDir::new().unwrap();
    let (uploads, _) = uploads_fixture(&tmp);
    let project = tmp.path().join("proj");
    std::fs::create_dir_all(&project).unwrap();
    let (store, _service) = Fixture::new(&project, &tmp.path().join("backup")).build().await;

    let job: Arc<dyn Job> = Arc::new(
        StorageStatsJob::new(&uploads, CronSchedule::parse("0 9 * * *").unwrap()).with_store(store.clone()),
    );
    assert_eq!(run_job(&job).await, RunOutcome::Completed);

    let logs = store.list_executions(ExecutionFilter::default()).await.unwrap();
    assert_eq!(logs[0].operation, OperationKind::StorageStats);
    assert_eq!(logs[0].files_processed, 3);
    assert_eq!(logs[0].total_size, 35);
    assert_eq!(logs[0].executed_by, "system");
}

#[tokio::test]
async fn test_cleanup_job_runs_an_execution() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    let backup = tmp.path().join("backup");
    write_file(&project, "a.log", 1);

    let mut fixture = Fixture::new(&project, &backup);
    fixture.patterns = &[("*.log", 1)];
    let (store, service) = fixture.build().await;

    let job: Arc<dyn Job> = Arc::new(CleanupExecutionJob::new(
        "weekly",
        CronSchedule::parse("0 2 * * 0").unwrap(),
        Arc::new(service),
    ));
    assert_eq!(run_job(&job).await, RunOutcome::Completed);

    let logs = store.list_executions(ExecutionFilter::default()).await.unwrap();
    assert_eq!(logs[0].executed_by, SCHEDULED_USER);
    assert_eq!(std::fs::read_dir(&backup).unwrap().count(), 1);
}

#[tokio::test]
async fn test_register_jobs_includes_active_schedules() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    std::fs::create_dir_all(&project).unwrap();
    let (store, service) = Fixture::new(&project, &tmp.path().join("backup")).build().await;

    store.create_schedule(NewSchedule::new("weekly", "0 2 * * 0")).await.unwrap();
    let paused = store.create_schedule(NewSchedule::new("paused", "0 4 * * *")).await.unwrap();
    store
        .update_schedule(
            paused.id,
            SchedulePatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let settings = Settings {
        uploads_dir: tmp.path().join("uploads"),
        references_file: tmp.path().join("references.txt"),
        ..Default::default()
    };
    let mut scheduler = Scheduler::new();
    register_jobs(&mut scheduler, &settings, Arc::new(service)).await.unwrap();

    let names: Vec<&str> = scheduler.jobs().iter().map(|j| j.name()).collect();
    assert_eq!(names, vec!["orphan-cleanup", "storage-stats", "weekly"]);

    scheduler.start();
    scheduler.shutdown().await;
}
