//! AnchorHub - spatial anchor provider coordinator
//!
//! CLI entry point for running anchor sessions and inspecting config and event logs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, info, warn};

use anchorhub::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use anchorhub::config::Config;
use anchorhub::coordinator::{Coordinator, CoordinatorConfig};
use anchorhub::domain::{
    AnchorArgs, AnchorHandle, AnchorId, AnchorPlacement, AnchorSearch, AutoStart, TrackingCapability, Vec3,
};
use anchorhub::events::{AnchorEvent, read_events, spawn_event_logger};
use anchorhub::provider::AnchorProvider;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging is not initialized yet, so problems go to stderr
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(providers = config.providers.len(), "AnchorHub loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Session { count, event_log }) => cmd_session(&config, count, event_log).await,
        Some(Command::Providers { capability, format }) => cmd_providers(&config, capability, format).await,
        Some(Command::Config) => cmd_config(&config),
        Some(Command::Events { path, format }) => cmd_events(&path, format),
        None => {
            Cli::command().after_help(generate_after_help()).print_help()?;
            Ok(())
        }
    }
}

/// Register every configured provider with `coordinator`
async fn register_configured(coordinator: &Coordinator, config: &Config) {
    for entry in config.providers.iter() {
        let provider: Arc<dyn AnchorProvider> = Arc::new(entry.build());
        if !coordinator.register(provider).await {
            warn!(name = %entry.name, "Skipping provider");
        }
    }
}

fn print_event(event: &AnchorEvent) {
    let label = format!("{:<22}", event.event_type());
    let detail = match event {
        AnchorEvent::CreateSucceeded { id, handle }
        | AnchorEvent::AnchorLocated { id, handle }
        | AnchorEvent::AnchorUpdated { id, handle } => format!("{} {}", id, handle),
        AnchorEvent::AnchorLocatedError { id, message } => format!("{} {}", id, message),
        AnchorEvent::AnchorDeleted { id } => id.to_string(),
        AnchorEvent::StatusMessage { message } | AnchorEvent::Error { message } => message.clone(),
        _ => String::new(),
    };

    if event.is_failure() {
        println!("  {} {}", label.red(), detail);
    } else if matches!(event, AnchorEvent::AnchorLocated { .. } | AnchorEvent::CreateSucceeded { .. }) {
        println!("  {} {}", label.green(), detail);
    } else {
        println!("  {} {}", label.cyan(), detail.dimmed());
    }
}

/// Print relayed events until the coordinator is gone
async fn print_events(mut rx: broadcast::Receiver<AnchorEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => print_event(&event),
            Err(RecvError::Lagged(n)) => println!("  {}", format!("... {} events dropped", n).yellow()),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Handles of the anchors created so far, keyed by id
///
/// Skips past events lost to a lagging receiver instead of stopping there.
fn created_handles(rx: &mut broadcast::Receiver<AnchorEvent>) -> HashMap<AnchorId, AnchorHandle> {
    let mut handles = HashMap::new();
    loop {
        match rx.try_recv() {
            Ok(AnchorEvent::CreateSucceeded { id, handle }) => {
                handles.insert(id, handle);
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(n)) => {
                warn!(missed = n, "created_handles: receiver lagged, some handles unknown");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    handles
}

/// Create `count` anchors, search for them, move one, then delete them all
///
/// Returns the ids of the anchors that were created.
async fn run_session(coordinator: &Coordinator, count: usize) -> Vec<AnchorId> {
    debug!(count, "run_session: called");
    let mut watcher = coordinator.subscribe();

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let placement = AnchorPlacement {
            position: Vec3::new(i as f32, 0.0, 0.0),
            ..AnchorPlacement::default()
        };
        let id = coordinator.create_anchor_async(&placement).await;
        if id.is_empty() {
            warn!(index = i, "Anchor creation failed");
        } else {
            ids.push(id);
        }
    }
    let handles = created_handles(&mut watcher);
    info!(created = ids.len(), requested = count, known_handles = handles.len(), "Anchors created");

    if !ids.is_empty() {
        coordinator.find_anchors(&AnchorSearch::ids(ids.iter().copied()));

        let args = ids
            .iter()
            .map(|id| AnchorArgs::new(*id).with_source_url(format!("builtin://anchor/{}", id)))
            .collect();
        coordinator.find_anchors(&AnchorSearch::Args(args));
    }
    coordinator.find_anchors_async(&AnchorSearch::nearby()).await;

    match ids.iter().find_map(|id| handles.get(id).map(|handle| (*id, *handle))) {
        Some((id, handle)) => {
            let placement = AnchorPlacement {
                position: Vec3::new(0.0, 1.0, 0.0),
                ..AnchorPlacement::default()
            };
            let moved = coordinator.move_anchor(&handle, &placement, id);
            debug!(moved, "run_session: move_anchor returned");
        }
        None => debug!("run_session: no handle known, skipping move"),
    }

    let cleared = coordinator.clear_cache();
    debug!(cleared, "run_session: clear_cache returned");
    coordinator.delete_anchors(&ids);
    ids
}

async fn cmd_session(config: &Config, count: usize, event_log: Option<PathBuf>) -> Result<()> {
    debug!(count, ?event_log, "cmd_session: called");
    let coordinator = Coordinator::new(config.coordinator.clone());

    let printer = tokio::spawn(print_events(coordinator.subscribe()));

    let log_path = event_log.or_else(|| config.event_log.path.clone());
    let logger = if config.event_log.enabled || log_path.is_some() {
        Some(spawn_event_logger(&coordinator, log_path)?)
    } else {
        None
    };

    println!("{}", "AnchorHub session".bright_cyan().bold());
    register_configured(&coordinator, config).await;
    coordinator.start().await;

    let ids = run_session(&coordinator, count).await;
    coordinator.shutdown();

    // Dropping the coordinator closes the event stream
    drop(coordinator);
    printer.await.context("Event printer task failed")?;
    if let Some(logger) = logger {
        logger.await.context("Event logger task failed")?;
    }

    println!(
        "{} {} of {} anchors created",
        "Done:".green().bold(),
        ids.len(),
        count
    );
    Ok(())
}

#[derive(Serialize)]
struct ProviderRow {
    name: String,
    capability: TrackingCapability,
}

async fn cmd_providers(config: &Config, capability: Option<TrackingCapability>, format: OutputFormat) -> Result<()> {
    debug!(?capability, ?format, "cmd_providers: called");
    let coordinator = Coordinator::new(CoordinatorConfig {
        auto_start: AutoStart::Manual,
        ..config.coordinator.clone()
    });
    register_configured(&coordinator, config).await;

    let providers = match capability {
        Some(capability) => coordinator.providers_by_capability(capability).unwrap_or_default(),
        None => coordinator.providers(),
    };
    let rows: Vec<ProviderRow> = providers
        .iter()
        .map(|p| ProviderRow {
            name: p.name().to_string(),
            capability: p.tracking_capability(),
        })
        .collect();
    coordinator.shutdown();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No matching providers");
            }
            for row in &rows {
                println!("  {:<16} {}", row.name.bold(), row.capability.to_string().yellow());
            }
        }
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

fn cmd_events(path: &Path, format: OutputFormat) -> Result<()> {
    debug!(?path, ?format, "cmd_events: called");
    let entries = read_events(path)?;
    for entry in &entries {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(entry)?),
            OutputFormat::Text => {
                print!("{} ", entry.timestamp.format("%H:%M:%S%.3f").to_string().dimmed());
                print_event(&entry.event);
            }
        }
    }
    if entries.is_empty() && format == OutputFormat::Text {
        println!("No events in {}", path.display());
    }
    Ok(())
}
