use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use humansize::{format_size, BINARY};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use richiesta_cleanup::cleanup::{CleanupService, ExecutionResult, PreviewResult, SessionInfo};
use richiesta_cleanup::schedule::{collect_storage_stats, register_jobs, OrphanCleanup, Scheduler};
use richiesta_cleanup::settings::Settings;
use richiesta_cleanup::store::{
    seed_defaults, ConfigPatch, ConfigStore, Criticality, ExcludeDirectoryPatch, ExcludeFilePatch, ExecutionFilter,
    ExecutionStatus, JsonStore, NewExcludeDirectory, NewExcludeFile, NewPattern, NewSchedule, OperationKind,
    PatternPatch, SchedulePatch,
};

/// Cleanup preview, backup sessions and scheduled maintenance for the Richiesta Assistenza project
#[derive(Parser, Debug)]
#[command(name = "richiesta-cleanup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to <config dir>/richiesta-cleanup/settings.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Override the store location from the settings file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Configuration row to use
    #[arg(long = "config-name", global = true)]
    config_name: Option<String>,

    /// Recorded as the user running the operation
    #[arg(long, global = true, default_value = "cli")]
    user: String,

    /// Print machine-readable JSON
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what a cleanup would copy without touching the destination
    Preview,
    /// Copy matched files into a new session folder
    Execute,
    /// Copy files from a session back to the project
    Restore {
        /// Session folder name or path
        session: String,
        /// Restore only these relative paths
        #[arg(long = "only")]
        only: Vec<String>,
    },
    /// Manage session folders
    #[command(subcommand)]
    Sessions(SessionsCommand),
    /// Show or change the cleanup configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage cleanup patterns
    #[command(subcommand)]
    Patterns(PatternsCommand),
    /// Manage excluded file names
    #[command(subcommand)]
    ExcludeFiles(ExcludeFilesCommand),
    /// Manage excluded directories
    #[command(subcommand)]
    ExcludeDirs(ExcludeDirsCommand),
    /// Manage cron-triggered cleanup executions
    #[command(subcommand)]
    Schedules(SchedulesCommand),
    /// Show the execution log
    Logs {
        #[arg(long, default_value_t = ExecutionFilter::DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long, value_enum)]
        operation: Option<OperationArg>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Per-day execution statistics
    Stats {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Insert the default patterns and exclusions that are missing
    Seed,
    /// Find (and unless --dry-run, delete) unreferenced uploads
    Orphans {
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
        #[arg(long)]
        uploads: Option<PathBuf>,
        #[arg(long)]
        references: Option<PathBuf>,
        #[arg(long = "min-age-hours")]
        min_age_hours: Option<u64>,
    },
    /// Storage usage of the uploads directory
    StorageStats {
        #[arg(long)]
        uploads: Option<PathBuf>,
    },
    /// Run the scheduler until Ctrl-C
    Serve,
}

#[derive(Subcommand, Debug)]
enum SessionsCommand {
    List,
    Delete { session: String },
    /// Delete sessions older than the retention period
    Prune,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    Set(ConfigSetArgs),
}

#[derive(Args, Debug)]
struct ConfigSetArgs {
    #[arg(long)]
    project_path: Option<PathBuf>,
    #[arg(long)]
    target_directory: Option<PathBuf>,
    #[arg(long, conflicts_with = "clear_base_path")]
    base_path: Option<PathBuf>,
    #[arg(long, action = ArgAction::SetTrue)]
    clear_base_path: bool,
    /// Template with {YYYY} {MM} {DD} {HH} {mm} {ss}
    #[arg(long)]
    directory_format: Option<String>,
    #[arg(long, conflicts_with = "unlimited_depth")]
    max_depth: Option<usize>,
    #[arg(long, action = ArgAction::SetTrue)]
    unlimited_depth: bool,
    #[arg(long)]
    create_readme: Option<bool>,
    #[arg(long)]
    preserve_structure: Option<bool>,
    #[arg(long)]
    retention_days: Option<u32>,
    #[arg(long)]
    active: Option<bool>,
}

impl From<ConfigSetArgs> for ConfigPatch {
    fn from(args: ConfigSetArgs) -> Self {
        let base_path = if args.clear_base_path {
            Some(None)
        } else {
            args.base_path.map(Some)
        };
        let max_depth = if args.unlimited_depth {
            Some(None)
        } else {
            args.max_depth.map(Some)
        };
        ConfigPatch {
            project_path: args.project_path,
            target_directory: args.target_directory,
            base_path,
            directory_format: args.directory_format,
            max_depth,
            create_readme: args.create_readme,
            preserve_structure: args.preserve_structure,
            retention_days: args.retention_days,
            is_active: args.active,
        }
    }
}

#[derive(Subcommand, Debug)]
enum PatternsCommand {
    List {
        /// Include inactive rows
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    Add {
        pattern: String,
        #[arg(long, default_value_t = 100)]
        priority: i32,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: u64,
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Remove {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
enum ExcludeFilesCommand {
    List {
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    Add {
        file_name: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long, value_enum, default_value_t = CriticalityArg::Normal)]
        criticality: CriticalityArg,
    },
    Update {
        id: u64,
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long, value_enum)]
        criticality: Option<CriticalityArg>,
        #[arg(long)]
        active: Option<bool>,
    },
    Remove {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
enum ExcludeDirsCommand {
    List {
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    Add {
        directory: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Update {
        id: u64,
        #[arg(long)]
        directory: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Remove {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
enum SchedulesCommand {
    List {
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    Add {
        name: String,
        /// Five-field cron expression, e.g. "0 2 * * 0"
        cron: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cron: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Remove {
        id: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CriticalityArg {
    Normal,
    Important,
    Critical,
}

impl From<CriticalityArg> for Criticality {
    fn from(arg: CriticalityArg) -> Self {
        match arg {
            CriticalityArg::Normal => Criticality::Normal,
            CriticalityArg::Important => Criticality::Important,
            CriticalityArg::Critical => Criticality::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OperationArg {
    Cleanup,
    Restore,
    OrphanCleanup,
    StorageStats,
}

impl From<OperationArg> for OperationKind {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Cleanup => OperationKind::Cleanup,
            OperationArg::Restore => OperationKind::Restore,
            OperationArg::OrphanCleanup => OperationKind::OrphanCleanup,
            OperationArg::StorageStats => OperationKind::StorageStats,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Completed,
    CompletedWithErrors,
    Failed,
}

impl From<StatusArg> for ExecutionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Completed => ExecutionStatus::Completed,
            StatusArg::CompletedWithErrors => ExecutionStatus::CompletedWithErrors,
            StatusArg::Failed => ExecutionStatus::Failed,
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.settings.as_deref()).context("Failed to load settings")?;
    if let Some(store) = &cli.store {
        settings.store_path = store.clone();
    }
    if let Some(name) = &cli.config_name {
        settings.config_name = name.clone();
    }
    init_tracing(&settings.log_level);

    let store: Arc<dyn ConfigStore> = Arc::new(
        JsonStore::open(&settings.store_path)
            .await
            .with_context(|| format!("Failed to open store {}", settings.store_path.display()))?,
    );
    let service = Arc::new(
        CleanupService::new(Arc::clone(&store))
            .with_config_name(&settings.config_name)
            .with_fallback(settings.fallback_config()),
    );

    run(cli, settings, store, service).await
}

async fn run(cli: Cli, settings: Settings, store: Arc<dyn ConfigStore>, service: Arc<CleanupService>) -> Result<()> {
    let json = cli.json;
    let user = cli.user;

    match cli.command {
        Command::Preview => {
            let result = service.preview_cleanup(&user).await?;
            if json {
                print_json(&result)?;
            } else {
                print_preview(&result);
            }
        }
        Command::Execute => {
            let result = service.execute_cleanup(&user).await?;
            if json {
                print_json(&result)?;
            } else {
                print_execution(&result);
            }
        }
        Command::Restore { session, only } => {
            let only = (!only.is_empty()).then_some(only);
            let result = service.restore(&session, only.as_deref(), &user).await?;
            if json {
                print_json(&result)?;
            } else {
                println!(
                    "{} {} of {} files from {}",
                    "Restored".green().bold(),
                    result.restored_count,
                    result.total_files,
                    result.session.display()
                );
                for problem in &result.errors {
                    println!("  {} {}", "!".red(), problem);
                }
            }
        }
        Command::Sessions(cmd) => match cmd {
            SessionsCommand::List => {
                let sessions = service.list_sessions().await?;
                if json {
                    print_json(&sessions)?;
                } else {
                    print_sessions(&sessions);
                }
            }
            SessionsCommand::Delete { session } => {
                let path = service.delete_session(&session).await?;
                println!("{} {}", "Deleted".yellow().bold(), path.display());
            }
            SessionsCommand::Prune => {
                let removed = service.prune_sessions().await?;
                if json {
                    print_json(&removed)?;
                } else if removed.is_empty() {
                    println!("No expired sessions");
                } else {
                    for name in &removed {
                        println!("{} {}", "Removed".yellow(), name);
                    }
                }
            }
        },
        Command::Config(ConfigCommand::Show) => {
            let config = match store.get_config(&settings.config_name).await {
                Ok(config) => config,
                Err(e) if e.is_config_error() => settings.fallback_config(),
                Err(e) => return Err(e.into()),
            };
            print_json(&config)?;
        }
        Command::Config(ConfigCommand::Set(args)) => {
            let config = store.update_config(&settings.config_name, args.into()).await?;
            if json {
                print_json(&config)?;
            } else {
                println!("{} configuration '{}'", "Saved".green().bold(), config.name);
            }
        }
        Command::Patterns(cmd) => patterns(cmd, store.as_ref(), json).await?,
        Command::ExcludeFiles(cmd) => exclude_files(cmd, store.as_ref(), json).await?,
        Command::ExcludeDirs(cmd) => exclude_dirs(cmd, store.as_ref(), json).await?,
        Command::Schedules(cmd) => schedules(cmd, store.as_ref(), json).await?,
        Command::Logs { limit, operation, status } => {
            let filter = ExecutionFilter {
                operation: operation.map(Into::into),
                status: status.map(Into::into),
                limit: Some(limit),
                ..Default::default()
            };
            let logs = store.list_executions(filter).await?;
            if json {
                print_json(&logs)?;
            } else {
                for log in &logs {
                    let status = match log.status {
                        ExecutionStatus::Completed => "completed".green(),
                        ExecutionStatus::CompletedWithErrors => "completed with errors".yellow(),
                        ExecutionStatus::Failed => "failed".red(),
                    };
                    println!(
                        "{}  {:<15} {:<22} {:>6} files {:>10}  {}",
                        log.started_at.format("%Y-%m-%d %H:%M:%S"),
                        log.operation.as_str(),
                        status,
                        log.files_processed,
                        format_size(log.total_size, BINARY),
                        log.executed_by
                    );
                }
            }
        }
        Command::Stats { days } => {
            let stats = store.daily_stats(days).await?;
            if json {
                print_json(&stats)?;
            } else {
                for day in &stats {
                    println!(
                        "{}  runs {:>3}  ok {:>3}  failed {:>3}  files {:>6}  {}",
                        day.date,
                        day.total_executions,
                        day.successful_runs,
                        day.failed_runs,
                        day.total_files,
                        format_size(day.total_size, BINARY)
                    );
                }
            }
        }
        Command::Seed => {
            let report = seed_defaults(store.as_ref()).await?;
            if json {
                print_json(&report)?;
            } else {
                println!(
                    "{} {} patterns, {} excluded files, {} excluded directories",
                    "Seeded".green().bold(),
                    report.patterns,
                    report.excluded_files,
                    report.excluded_dirs
                );
            }
        }
        Command::Orphans {
            dry_run,
            uploads,
            references,
            min_age_hours,
        } => {
            let _guard = service.locks().acquire(OperationKind::OrphanCleanup)?;
            let task = OrphanCleanup::new(
                uploads.unwrap_or(settings.uploads_dir),
                references.unwrap_or(settings.references_file),
            )
            .with_dry_run(dry_run || settings.orphan_dry_run)
            .with_min_age(Duration::from_secs(
                min_age_hours.unwrap_or(settings.orphan_min_age_hours) * 60 * 60,
            ));
            let report = task.run().await?;
            if json {
                print_json(&report)?;
            } else {
                let verb = if report.dry_run { "Would delete" } else { "Deleted" };
                for path in &report.orphans {
                    println!("  {} {}", "-".red(), path);
                }
                println!(
                    "{} {} of {} scanned files ({} referenced, {} too recent)",
                    verb.yellow().bold(),
                    report.orphans.len(),
                    report.scanned,
                    report.referenced,
                    report.skipped_recent
                );
            }
        }
        Command::StorageStats { uploads } => {
            let root = uploads.unwrap_or(settings.uploads_dir);
            let stats = collect_storage_stats(&root).await?;
            if json {
                print_json(&stats)?;
            } else {
                println!(
                    "{} {} files, {}",
                    root.display().to_string().bold(),
                    stats.total_files,
                    format_size(stats.total_bytes, BINARY)
                );
                println!("{}", "By extension".cyan());
                for (ext, bucket) in &stats.by_extension {
                    println!("  {:<16} {:>6} {:>10}", ext, bucket.files, format_size(bucket.bytes, BINARY));
                }
                println!("{}", "By directory".cyan());
                for (dir, bucket) in &stats.by_directory {
                    println!("  {:<16} {:>6} {:>10}", dir, bucket.files, format_size(bucket.bytes, BINARY));
                }
            }
        }
        Command::Serve => {
            let mut scheduler = Scheduler::new();
            register_jobs(&mut scheduler, &settings, Arc::clone(&service)).await?;
            scheduler.start();
            info!("scheduler running, press Ctrl-C to stop");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            info!("shutdown requested");
            scheduler.shutdown().await;
        }
    }
    Ok(())
}

async fn patterns(cmd: PatternsCommand, store: &dyn ConfigStore, json: bool) -> Result<()> {
    match cmd {
        PatternsCommand::List { all } => {
            let rows = store.list_patterns(all).await?;
            if json {
                return print_json(&rows);
            }
            for row in &rows {
                let state = if row.is_active { "" } else { " (inactive)" };
                println!(
                    "{:>4}  {:>4}  {:<28} {}{}",
                    row.id,
                    row.priority,
                    row.pattern.bold(),
                    row.description.as_deref().unwrap_or(""),
                    state.dimmed()
                );
            }
        }
        PatternsCommand::Add {
            pattern,
            priority,
            description,
        } => {
            let mut data = NewPattern::new(pattern, priority);
            data.description = description;
            let row = store.create_pattern(data).await?;
            println!("{} pattern {} ({})", "Added".green(), row.pattern, row.id);
        }
        PatternsCommand::Update {
            id,
            pattern,
            priority,
            description,
            active,
        } => {
            let patch = PatternPatch {
                pattern,
                priority,
                description,
                is_active: active,
            };
            let row = store.update_pattern(id, patch).await?;
            println!("{} pattern {} ({})", "Updated".green(), row.pattern, row.id);
        }
        PatternsCommand::Remove { id } => {
            store.delete_pattern(id).await?;
            println!("{} pattern {}", "Removed".yellow(), id);
        }
    }
    Ok(())
}

async fn exclude_files(cmd: ExcludeFilesCommand, store: &dyn ConfigStore, json: bool) -> Result<()> {
    match cmd {
        ExcludeFilesCommand::List { all } => {
            let rows = store.list_exclude_files(all).await?;
            if json {
                return print_json(&rows);
            }
            for row in &rows {
                println!(
                    "{:>4}  {:<10} {:<28} {}",
                    row.id,
                    format!("{:?}", row.criticality).to_lowercase(),
                    row.file_name.bold(),
                    row.reason.as_deref().unwrap_or("")
                );
            }
        }
        ExcludeFilesCommand::Add {
            file_name,
            reason,
            criticality,
        } => {
            let mut data = NewExcludeFile::new(file_name).with_criticality(criticality.into());
            data.reason = reason;
            let row = store.create_exclude_file(data).await?;
            println!("{} excluded file {} ({})", "Added".green(), row.file_name, row.id);
        }
        ExcludeFilesCommand::Update {
            id,
            file_name,
            reason,
            criticality,
            active,
        } => {
            let patch = ExcludeFilePatch {
                file_name,
                reason,
                criticality: criticality.map(Into::into),
                is_active: active,
                ..Default::default()
            };
            let row = store.update_exclude_file(id, patch).await?;
            println!("{} excluded file {} ({})", "Updated".green(), row.file_name, row.id);
        }
        ExcludeFilesCommand::Remove { id } => {
            store.delete_exclude_file(id).await?;
            println!("{} excluded file {}", "Removed".yellow(), id);
        }
    }
    Ok(())
}

async fn exclude_dirs(cmd: ExcludeDirsCommand, store: &dyn ConfigStore, json: bool) -> Result<()> {
    match cmd {
        ExcludeDirsCommand::List { all } => {
            let rows = store.list_exclude_dirs(all).await?;
            if json {
                return print_json(&rows);
            }
            for row in &rows {
                println!(
                    "{:>4}  {:<28} {}",
                    row.id,
                    row.directory.bold(),
                    row.reason.as_deref().unwrap_or("")
                );
            }
        }
        ExcludeDirsCommand::Add { directory, reason } => {
            let mut data = NewExcludeDirectory::new(directory);
            data.reason = reason;
            let row = store.create_exclude_dir(data).await?;
            println!("{} excluded directory {} ({})", "Added".green(), row.directory, row.id);
        }
        ExcludeDirsCommand::Update {
            id,
            directory,
            reason,
            active,
        } => {
            let patch = ExcludeDirectoryPatch {
                directory,
                reason,
                is_active: active,
                ..Default::default()
            };
            let row = store.update_exclude_dir(id, patch).await?;
            println!("{} excluded directory {} ({})", "Updated".green(), row.directory, row.id);
        }
        ExcludeDirsCommand::Remove { id } => {
            store.delete_exclude_dir(id).await?;
            println!("{} excluded directory {}", "Removed".yellow(), id);
        }
    }
    Ok(())
}

async fn schedules(cmd: SchedulesCommand, store: &dyn ConfigStore, json: bool) -> Result<()> {
    match cmd {
        SchedulesCommand::List { all } => {
            let rows = store.list_schedules(all).await?;
            if json {
                return print_json(&rows);
            }
            for row in &rows {
                let state = if row.is_active { "" } else { " (inactive)" };
                println!(
                    "{:>4}  {:<20} {:<16} {}{}",
                    row.id,
                    row.name.bold(),
                    row.cron_expression,
                    row.description.as_deref().unwrap_or(""),
                    state.dimmed()
                );
            }
        }
        SchedulesCommand::Add {
            name,
            cron,
            description,
        } => {
            let mut data = NewSchedule::new(name, cron);
            data.description = description;
            let row = store.create_schedule(data).await?;
            println!("{} schedule {} ({})", "Added".green(), row.name, row.id);
        }
        SchedulesCommand::Update {
            id,
            name,
            cron,
            description,
            active,
        } => {
            let patch = SchedulePatch {
                name,
                cron_expression: cron,
                description,
                is_active: active,
            };
            let row = store.update_schedule(id, patch).await?;
            println!("{} schedule {} ({})", "Updated".green(), row.name, row.id);
        }
        SchedulesCommand::Remove { id } => {
            store.delete_schedule(id).await?;
            println!("{} schedule {}", "Removed".yellow(), id);
        }
    }
    Ok(())
}

fn print_preview(result: &PreviewResult) {
    println!("{}", "Cleanup preview".bold());
    println!("  Project:     {}", result.project_path.display());
    println!("  Destination: {}", result.full_destination_path.display());
    if result.destination_inside_project {
        println!(
            "  {} destination is inside the project; execute will refuse to run",
            "warning:".red().bold()
        );
    }
    println!(
        "  {} files, {}",
        result.total_files.to_string().bold(),
        result.total_size_human
    );

    if !result.by_pattern.is_empty() {
        println!("{}", "By pattern".cyan());
        for (pattern, count) in &result.by_pattern {
            println!("  {:<28} {:>6}", pattern, count);
        }
    }
    if !result.by_type.is_empty() {
        println!("{}", "By type".cyan());
        for (ty, count) in &result.by_type {
            println!("  {:<28} {:>6}", ty, count);
        }
    }
    if !result.files.is_empty() {
        println!("{}", "Files".cyan());
        for file in &result.files {
            println!("  {:<60} {:>10}  {}", file.relative_path, file.size_human, file.pattern.dimmed());
        }
        if result.total_files > result.files.len() {
            println!("  ... and {} more", result.total_files - result.files.len());
        }
    }
    for problem in &result.problems {
        println!("  {} {}", "!".red(), problem);
    }
}

fn print_execution(result: &ExecutionResult) {
    let status = match result.status {
        ExecutionStatus::Completed => "Cleanup completed".green().bold(),
        ExecutionStatus::CompletedWithErrors => "Cleanup completed with errors".yellow().bold(),
        ExecutionStatus::Failed => "Cleanup failed".red().bold(),
    };
    println!("{}", status);
    println!("  Session: {}", result.cleanup_path.display());
    println!(
        "  Copied {} files, {}",
        result.copied_count,
        format_size(result.total_size, BINARY)
    );
    if let Some(manifest) = &result.manifest_path {
        println!("  Manifest: {}", manifest.display());
    }
    for problem in &result.errors {
        println!("  {} {}", "!".red(), problem);
    }
}

fn print_sessions(sessions: &[SessionInfo]) {
    if sessions.is_empty() {
        println!("No cleanup sessions");
        return;
    }
    for session in sessions {
        let modified = session
            .modified
            .map(|m| m.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:>16} {:>6} files {:>10}",
            session.name.bold(),
            modified,
            session.file_count,
            format_size(session.total_size, BINARY)
        );
    }
}
