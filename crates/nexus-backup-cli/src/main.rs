//! # nexus-backup
//!
//! Captures the structure of a Nexus server (roles, categories, channels,
//! overwrites, emoji references) into a JSON document, and rebuilds a server
//! from one.
//!
//! ```text
//! nexus-backup backup --server <id>
//! nexus-backup restore <backup_id> --server <id> [--yes]
//! nexus-backup list [--server <id>]
//! nexus-backup show <backup_id>
//! ```

mod confirm;

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nexus_backup::{
    BackupId, BackupService, FileBackupStore, RestoreGate, RestoreOptions, RetryPolicy, WorkspaceAccessor,
};
use nexus_client::{RemoteWorkspace, RestClient};
use nexus_common::config::AppConfig;
use nexus_common::models::{ChannelSettings, Snapshot};
use uuid::Uuid;

use crate::confirm::Confirmation;

#[derive(Parser)]
#[command(name = "nexus-backup", version, about = "Back up and restore Nexus server structure")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "NEXUS_BACKUP_JSON_LOGS")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a server and store the snapshot
    Backup {
        #[arg(long)]
        server: Uuid,
    },
    /// Replace a server's structure with a stored snapshot
    Restore {
        backup_id: BackupId,
        #[arg(long)]
        server: Uuid,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Leave permission overwrites out of the restore
        #[arg(long)]
        no_overwrites: bool,
    },
    /// List stored backups, newest first
    List {
        #[arg(long)]
        server: Option<Uuid>,
    },
    /// Summarize a stored snapshot
    Show { backup_id: BackupId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = nexus_common::config::init()?;

    init_tracing(cli.json_logs);

    match cli.command {
        Command::Backup { server } => backup(config, server).await,
        Command::Restore {
            backup_id,
            server,
            yes,
            no_overwrites,
        } => restore(config, backup_id, server, yes, no_overwrites).await,
        Command::List { server } => list(config, server).await,
        Command::Show { backup_id } => show(config, backup_id).await,
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nexus_backup=info,nexus_client=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn service(config: &AppConfig, options: RestoreOptions) -> BackupService<FileBackupStore> {
    BackupService::new(
        FileBackupStore::new(&config.storage.backup_dir),
        RetryPolicy::from(&config.retry),
        options,
    )
}

async fn connect(config: &AppConfig, server: Uuid) -> anyhow::Result<RemoteWorkspace> {
    let rest = RestClient::new(&config.api)?;
    RemoteWorkspace::connect(rest, server)
        .await
        .with_context(|| format!("could not reach server {server} at {}", config.api.base_url))
}

async fn backup(config: &AppConfig, server: Uuid) -> anyhow::Result<()> {
    let service = service(config, RestoreOptions::from(&config.restore));
    let workspace = connect(config, server).await?;

    let (id, snapshot) = service.backup(&workspace).await?;
    println!("{id}");
    eprintln!("{}", summary(&snapshot));
    Ok(())
}

async fn restore(
    config: &AppConfig,
    id: BackupId,
    server: Uuid,
    yes: bool,
    no_overwrites: bool,
) -> anyhow::Result<()> {
    let mut options = RestoreOptions::from(&config.restore);
    if no_overwrites {
        options.apply_overwrites = false;
    }
    let service = service(config, options);

    // Fatal problems surface before the server is touched.
    let snapshot = service
        .load(&id)
        .await
        .with_context(|| format!("could not load backup {id}"))?;
    let workspace = connect(config, server).await?;

    // Held until the restore returns; other processes sharing the backup
    // directory get `Busy` for this server meanwhile.
    let _guard = RestoreGate::new(&config.storage.backup_dir).try_acquire(server)?;

    if !yes {
        eprintln!("{}", summary(&snapshot));
        eprintln!(
            "This deletes every role and channel on '{}' and rebuilds them from backup {id}.",
            workspace.workspace().name
        );
        eprint!("Type 'yes' to continue: ");
        let timeout = Duration::from_secs(config.restore.confirm_timeout_secs);
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        match confirm::ask(stdin, timeout).await {
            Confirmation::Confirmed => {}
            Confirmation::Declined => anyhow::bail!("restore cancelled"),
            Confirmation::TimedOut => anyhow::bail!("no confirmation within {timeout:?}, restore cancelled"),
        }
    }

    let report = service.restore_snapshot(&snapshot, &workspace).await;

    println!("{report}");
    if !report.is_clean() {
        anyhow::bail!("restore finished with {} failed objects", report.failures.len());
    }
    Ok(())
}

async fn list(config: &AppConfig, server: Option<Uuid>) -> anyhow::Result<()> {
    let service = service(config, RestoreOptions::default());
    let backups = service.list(server).await?;
    if backups.is_empty() {
        eprintln!("no backups in {}", service.store().dir().display());
        return Ok(());
    }
    for backup in backups {
        let when = backup
            .id
            .captured_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "?".into());
        println!("{}  {when}  {} bytes", backup.id, backup.size_bytes);
    }
    Ok(())
}

async fn show(config: &AppConfig, id: BackupId) -> anyhow::Result<()> {
    let service = service(config, RestoreOptions::default());
    let snapshot = service.load(&id).await?;
    println!("{}", summary(&snapshot));

    println!("Roles (highest first):");
    for role in &snapshot.roles {
        println!("  {:>3}  {}", role.position, role.name);
    }
    for category in &snapshot.categories {
        println!("[{}]", category.name);
        for channel in snapshot.channels.iter().filter(|c| c.category_id == Some(category.source_id)) {
            println!("  {}", channel_line(channel));
        }
    }
    let orphans: Vec<_> = snapshot
        .channels
        .iter()
        .filter(|c| {
            c.category_id
                .is_none_or(|id| !snapshot.categories.iter().any(|cat| cat.source_id == id))
        })
        .collect();
    if !orphans.is_empty() {
        println!("[no category]");
        for channel in orphans {
            println!("  {}", channel_line(channel));
        }
    }
    Ok(())
}

fn summary(snapshot: &Snapshot) -> String {
    format!(
        "{} ({}) captured {}: {} roles, {} categories, {} channels, {} overwrites, {} emojis",
        snapshot.workspace_name,
        snapshot.workspace_id,
        snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC"),
        snapshot.roles.len(),
        snapshot.categories.len(),
        snapshot.channels.len(),
        snapshot.overwrite_count(),
        snapshot.emojis.len(),
    )
}

fn channel_line(channel: &nexus_common::models::Channel) -> String {
    match &channel.settings {
        ChannelSettings::Text { .. } => format!("#{}", channel.name),
        ChannelSettings::Voice { .. } => format!("🔊 {}", channel.name),
    }
}
