mod input;

use std::sync::Arc;

use anyhow::bail;
use chrono::{Local, Timelike};
use clap::{Parser, Subcommand};
use recado_channels::{CommandNotifier, GatewaySender, MessageSender, NotificationSink};
use recado_core::types::{HistoryRecord, SendStatus};
use recado_core::RecadoConfig;
use recado_scheduler::{DaemonLock, DaemonSupervisor, SchedulerEngine, SchedulerError};
use recado_store::{HistoryLedger, ScheduleStore};

#[derive(Parser)]
#[command(
    name = "recado",
    version,
    about = "Schedule a one-shot message and deliver it from a detached daemon"
)]
struct Cli {
    /// Config file (default: ~/.recado/recado.toml)
    #[arg(short, long)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the schedule slot and make sure the daemon is running
    Schedule {
        /// Recipient, '+' followed by digits (default: [defaults].recipient)
        #[arg(long)]
        to: Option<String>,
        /// Message text (default: [defaults].message)
        #[arg(short, long)]
        message: Option<String>,
        /// Target date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Target time, HH:MM (default: [defaults] hour and minute)
        #[arg(long)]
        time: Option<String>,
    },
    /// Send immediately, without touching the schedule slot
    Send {
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Mark the pending schedule inactive
    Cancel,
    /// Show the schedule slot
    Status,
    /// Show the most recent send outcomes
    History {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Run the scheduler daemon in the foreground
    Daemon,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RecadoConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        RecadoConfig::default()
    });

    match cli.command {
        Commands::Schedule {
            to,
            message,
            date,
            time,
        } => schedule(&config, to, message, &date, time),
        Commands::Send { to, message } => send_now(&config, to, message).await,
        Commands::Cancel => cancel(&config),
        Commands::Status => status(&config),
        Commands::History { limit } => history(&config, limit),
        Commands::Daemon => daemon(config).await,
    }
}

fn schedule(
    config: &RecadoConfig,
    to: Option<String>,
    message: Option<String>,
    date: &str,
    time: Option<String>,
) -> anyhow::Result<()> {
    let now = Local::now().naive_local();
    let entry = input::build_entry(config, to, message, date, time, now)?;

    let store = ScheduleStore::new(config.storage.schedule_path());
    store.save(&entry)?;
    println!(
        "Message scheduled for {} to {}.",
        entry.target_display(),
        entry.recipient
    );

    // Always spawn here: if a daemon from an earlier session is alive, the
    // new process sees the host lock and exits on its own.
    let mut supervisor = DaemonSupervisor::for_current_exe(config.storage.daemon_log_path())?;
    match supervisor.ensure_running() {
        Ok(true) => println!(
            "Background scheduler running (log: {}).",
            supervisor.log_path().display()
        ),
        Ok(false) => {}
        Err(e) => {
            eprintln!("WARNING: could not start the background scheduler: {e}");
            eprintln!("No background delivery will occur. Run `recado daemon` manually.");
            return Err(e.into());
        }
    }
    Ok(())
}

async fn send_now(
    config: &RecadoConfig,
    to: Option<String>,
    message: Option<String>,
) -> anyhow::Result<()> {
    let recipient = input::resolve_recipient(to, &config.defaults)?;
    let body = input::resolve_message(message, &config.defaults)?;

    let sender = GatewaySender::from_config(&config.sender)?;
    let notifier = CommandNotifier::from_config(&config.notify);
    let ledger = HistoryLedger::new(config.storage.history_path());

    let now = Local::now();
    let outcome = sender
        .send(&recipient, &body, now.hour(), now.minute())
        .await;

    match &outcome {
        Ok(()) => {
            ledger.append(HistoryRecord::success(&recipient, &body))?;
            notifier.notify("Recado", &format!("Message sent to {recipient}"));
            println!("Message sent to {recipient}.");
        }
        Err(e) => {
            ledger.append(HistoryRecord::failure(&recipient, &body, e.to_string()))?;
            notifier.notify("Recado", &format!("Failed to send to {recipient}: {e}"));
        }
    }
    if let Err(e) = outcome {
        bail!("send failed: {e}");
    }
    Ok(())
}

fn cancel(config: &RecadoConfig) -> anyhow::Result<()> {
    let store = ScheduleStore::new(config.storage.schedule_path());
    match store.load() {
        None => println!("No schedule to cancel."),
        Some(entry) if !entry.active => println!("Schedule is already inactive."),
        Some(entry) => {
            store.deactivate()?;
            println!(
                "Cancelled send to {} at {}.",
                entry.recipient,
                entry.target_display()
            );
        }
    }
    Ok(())
}

fn status(config: &RecadoConfig) -> anyhow::Result<()> {
    let store = ScheduleStore::new(config.storage.schedule_path());
    match store.load() {
        None => println!("No schedule saved."),
        Some(entry) => {
            let state = if entry.active { "pending" } else { "inactive" };
            println!(
                "{state}: \"{}\" to {} at {}",
                entry.body,
                entry.recipient,
                entry.target_display()
            );
        }
    }
    Ok(())
}

fn history(config: &RecadoConfig, limit: usize) -> anyhow::Result<()> {
    let ledger = HistoryLedger::new(config.storage.history_path());
    let records = ledger.recent(limit);
    if records.is_empty() {
        println!("No send history.");
        return Ok(());
    }
    for record in records {
        match record.status {
            SendStatus::Success => println!(
                "{}  {}  {}  {}",
                record.timestamp, record.status, record.recipient, record.body
            ),
            SendStatus::Failed => println!(
                "{}  {}  {}  {}  ({})",
                record.timestamp, record.status, record.recipient, record.body, record.error
            ),
        }
    }
    Ok(())
}

async fn daemon(config: RecadoConfig) -> anyhow::Result<()> {
    let lock = match DaemonLock::acquire(config.storage.daemon_pid_path()) {
        Ok(lock) => lock,
        Err(SchedulerError::AlreadyRunning { pid }) => {
            tracing::info!(pid, "scheduler daemon already running, exiting");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(path = %lock.path().display(), "daemon lock acquired");

    let sender = GatewaySender::from_config(&config.sender)?;
    let notifier = CommandNotifier::from_config(&config.notify);
    let engine = SchedulerEngine::new(
        ScheduleStore::new(config.storage.schedule_path()),
        HistoryLedger::new(config.storage.history_path()),
        Arc::new(sender),
        notifier,
        config.scheduler.clone(),
    );

    // Runs until the process is killed; the lock lives for the duration.
    engine.run().await;
    drop(lock);
    Ok(())
}
