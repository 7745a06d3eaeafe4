use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use unbroken_lib::AppState;
use unbroken_lib::application::services::dashboard::{self, SearchField, ViewerRole};
use unbroken_lib::application::services::{SyncService, schedule_sync, spawn_reconnect_sync};
use unbroken_lib::domain::entities::Shipment;
use unbroken_lib::domain::value_objects::{
    HandlerRole, PackageCondition, ShipmentChanges, ShipmentStatus,
};
use unbroken_lib::shared::config::AppConfig;
use unbroken_lib::shared::error::AppError;
use unbroken_lib::shared::logging;

#[derive(Parser)]
#[command(name = "unbroken")]
#[command(about = "Offline-first shipment tracking client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Document store base URL (overrides UNBROKEN_REMOTE_URL)
    #[arg(long, global = true)]
    remote_url: Option<String>,

    /// SQLite database URL for the local cache and queue (overrides UNBROKEN_DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "LOG_LEVEL", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "JSON_LOGS", global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List shipments, live when reachable and cached otherwise
    Fetch {
        /// Only shipments handled by this role (driver, dock_worker, warehouse_manager)
        #[arg(long)]
        role: Option<ViewerRole>,
        /// Only shipments in this status
        #[arg(long)]
        status: Option<ShipmentStatus>,
        /// Field matched by --search
        #[arg(long, default_value = "shipment_id")]
        field: SearchField,
        /// Case-insensitive substring to look for
        #[arg(long)]
        search: Option<String>,
    },
    /// Edit one shipment; queued for later when the store is unreachable
    Update {
        /// Document id of the shipment
        id: String,
        #[arg(long)]
        status: Option<ShipmentStatus>,
        #[arg(long)]
        condition: Option<PackageCondition>,
        #[arg(long)]
        handoff_point: Option<String>,
        #[arg(long)]
        handler_role: Option<HandlerRole>,
    },
    /// Replay queued updates against the store
    Sync,
    /// Show queued updates
    Pending {
        /// Show entries that exhausted their retries instead
        #[arg(long)]
        dead_letters: bool,
    },
    /// Status counts for a role's shipments
    Stats {
        #[arg(long, default_value = "warehouse_manager")]
        role: ViewerRole,
    },
    /// Keep running and sync whenever connectivity comes back
    Watch {
        /// Seconds between reachability probes
        #[arg(long, default_value_t = 15)]
        probe_interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level, cli.json_logs);

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.remote_url {
        config.remote.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(url) = cli.database_url {
        config.storage.database_url = url;
    }

    let state = AppState::new(config)
        .await
        .context("failed to initialize application state")?;
    let service = state.sync_service.clone();

    let result = match cli.command {
        Commands::Fetch {
            role,
            status,
            field,
            search,
        } => run_fetch(&service, role, status, field, search).await,
        Commands::Update {
            id,
            status,
            condition,
            handoff_point,
            handler_role,
        } => {
            let changes = ShipmentChanges {
                status,
                package_condition: condition,
                handoff_point,
                handler_role,
                ..ShipmentChanges::default()
            };
            run_update(&service, &id, changes).await
        }
        Commands::Sync => print_json(&service.sync_pending_updates().await),
        Commands::Pending { dead_letters } => {
            if dead_letters {
                print_json(&service.dead_letters().await)
            } else {
                print_json(&service.pending_updates().await)
            }
        }
        Commands::Stats { role } => {
            let fetched = service.fetch_shipments().await;
            let visible = dashboard::shipments_for_role(&fetched.shipments, role);
            print_json(&dashboard::status_summary(&visible))
        }
        Commands::Watch { probe_interval } => {
            run_watch(&state, Duration::from_secs(probe_interval.max(1))).await
        }
    };

    state.shutdown().await;
    result
}

#[derive(Serialize)]
struct FetchOutput {
    is_online: bool,
    count: usize,
    shipments: Vec<Shipment>,
}

async fn run_fetch(
    service: &SyncService,
    role: Option<ViewerRole>,
    status: Option<ShipmentStatus>,
    field: SearchField,
    search: Option<String>,
) -> Result<()> {
    let fetched = service.fetch_shipments().await;
    if !fetched.is_online {
        warn!("store unreachable, showing cached shipments");
    }

    let mut shipments = fetched.shipments;
    if let Some(role) = role {
        shipments = dashboard::shipments_for_role(&shipments, role);
    }
    shipments = dashboard::filter_by_status(&shipments, status.as_ref());
    if let Some(term) = search {
        shipments = dashboard::search(&shipments, field, &term);
    }

    print_json(&FetchOutput {
        is_online: fetched.is_online,
        count: shipments.len(),
        shipments,
    })
}

async fn run_update(service: &SyncService, id: &str, changes: ShipmentChanges) -> Result<()> {
    if changes.is_empty() {
        return Err(AppError::InvalidInput(
            "nothing to update; pass at least one field".to_string(),
        )
        .into());
    }

    let fetched = service.fetch_shipments().await;
    let Some(shipment) = fetched
        .shipments
        .iter()
        .find(|shipment| shipment.id.as_str() == id)
    else {
        return Err(AppError::NotFound(format!("shipment {id}")).into());
    };

    let outcome = service.update_shipment(shipment, &changes).await;
    print_json(&outcome)?;
    if !outcome.success {
        bail!(outcome.message);
    }
    Ok(())
}

async fn run_watch(state: &AppState, probe_interval: Duration) -> Result<()> {
    let service = state.sync_service.clone();
    let initial = service.fetch_shipments().await.is_online;
    let (online_tx, online_rx) = watch::channel(initial);

    let reconnect = spawn_reconnect_sync(service.clone(), online_rx);
    let scheduled = state.config.sync.auto_sync.then(|| {
        schedule_sync(
            service.clone(),
            Duration::from_secs(state.config.sync.sync_interval),
        )
    });
    let probe = spawn_probe(service, online_tx, probe_interval);

    info!(online = initial, "watching connectivity. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    probe.abort();
    reconnect.abort();
    if let Some(handle) = scheduled {
        handle.abort();
    }
    Ok(())
}

/// Feeds store reachability into the connectivity channel.
fn spawn_probe(
    service: Arc<SyncService>,
    online_tx: watch::Sender<bool>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let online = service.fetch_shipments().await.is_online;
            online_tx.send_if_modified(|current| {
                if *current == online {
                    return false;
                }
                *current = online;
                true
            });
        }
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
