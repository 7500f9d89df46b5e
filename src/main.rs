// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::application::alert_service::{alerting_only, AlertService};
use crate::application::factory_api::FactoryApi;
use crate::application::history_service::HistoryService;
use crate::application::machine_service::MachineService;
use crate::application::poller::{replace, Poller, Snapshot};
use crate::application::session::{SessionFile, SessionStore};
use crate::domain::alert::MachineAlert;
use crate::domain::reading::{latest_per_machine, MachineReading};
use crate::domain::telemetry::RollingWindow;
use crate::infrastructure::config::{load_config, PollingSettings};
use crate::infrastructure::http_factory_api::HttpFactoryApi;
use crate::presentation::app_state::{AppState, Snapshots};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    let polling = &config.polling;

    // Create upstream client (infrastructure layer)
    let api: Arc<dyn FactoryApi> = Arc::new(HttpFactoryApi::new(
        config.api.base_url.clone(),
        config.api.timeout(),
    )?);
    tracing::info!(base_url = %config.api.base_url, "Using factory API");

    // One poller per resource, each the only writer of its snapshot
    let (machines, machines_rx) = Poller::new("machines", Vec::<MachineReading>::new());
    let client = api.clone();
    machines.spawn(
        PollingSettings::period(polling.machines_secs),
        move || {
            let client = client.clone();
            async move { client.fetch_machines().await }
        },
        |_current, rows| latest_per_machine(rows),
    );

    let (alerts, alerts_rx) = Poller::new("alerts", Vec::<MachineAlert>::new());
    let client = api.clone();
    alerts.spawn(
        PollingSettings::period(polling.alerts_secs),
        move || {
            let client = client.clone();
            async move { client.fetch_alerts().await }
        },
        |_current, records| alerting_only(records),
    );

    let (notifications, notifications_rx) =
        Poller::new("notifications", Vec::<MachineAlert>::new());
    let client = api.clone();
    notifications.spawn(
        PollingSettings::period(polling.notifications_secs),
        move || {
            let client = client.clone();
            async move { client.fetch_alerts().await }
        },
        |_current, records| alerting_only(records),
    );

    let (realtime, realtime_rx) = Poller::new("realtime", RollingWindow::default());
    let client = api.clone();
    realtime.spawn(
        PollingSettings::period(polling.realtime_secs),
        move || {
            let client = client.clone();
            async move { client.fetch_realtime().await }
        },
        |current: &RollingWindow, rows: Vec<MachineReading>| {
            let mut window = current.clone();
            let now = Utc::now();
            for reading in &rows {
                window.push(reading, now);
            }
            window
        },
    );

    let factory_kpis_rx = spawn_passthrough(&api, "/factory/kpis", polling.kpis_secs);
    let analytics_kpis_rx = spawn_passthrough(&api, "/analytics/kpis", polling.analytics_secs);
    let heatmap_rx = spawn_passthrough(&api, "/analytics/heatmap", polling.analytics_secs);

    // Demo session, persisted only when a file is configured
    let session = SessionStore::new(
        config.auth.credentials(),
        config.auth.session_file.as_deref().map(SessionFile::new),
    );

    // Create application state
    let state = Arc::new(AppState {
        snapshots: Snapshots {
            machines: machines_rx,
            alerts: alerts_rx,
            notifications: notifications_rx,
            realtime: realtime_rx,
            factory_kpis: factory_kpis_rx,
            analytics_kpis: analytics_kpis_rx,
            heatmap: heatmap_rx,
        },
        machine_service: MachineService::new(),
        alert_service: AlertService::new(config.server.notification_limit),
        history_service: HistoryService::new(api.clone()),
        session,
    });

    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting bmi-factory dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

fn spawn_passthrough(
    api: &Arc<dyn FactoryApi>,
    path: &'static str,
    secs: u64,
) -> tokio::sync::watch::Receiver<Snapshot<Value>> {
    let (poller, rx) = Poller::new(path, Value::Null);
    let client = api.clone();
    poller.spawn(
        PollingSettings::period(secs),
        move || {
            let client = client.clone();
            async move { client.fetch_json(path).await }
        },
        replace,
    );
    rx
}
