// Application state for HTTP handlers
use crate::application::alert_service::AlertService;
use crate::application::history_service::HistoryService;
use crate::application::machine_service::MachineService;
use crate::application::poller::Snapshot;
use crate::application::session::SessionStore;
use crate::domain::alert::MachineAlert;
use crate::domain::reading::MachineReading;
use crate::domain::telemetry::RollingWindow;
use serde_json::Value;
use tokio::sync::watch;

/// Receivers for every polled resource. Each view reads its own snapshot.
#[derive(Clone)]
pub struct Snapshots {
    pub machines: watch::Receiver<Snapshot<Vec<MachineReading>>>,
    pub alerts: watch::Receiver<Snapshot<Vec<MachineAlert>>>,
    pub notifications: watch::Receiver<Snapshot<Vec<MachineAlert>>>,
    pub realtime: watch::Receiver<Snapshot<RollingWindow>>,
    pub factory_kpis: watch::Receiver<Snapshot<Value>>,
    pub analytics_kpis: watch::Receiver<Snapshot<Value>>,
    pub heatmap: watch::Receiver<Snapshot<Value>>,
}

pub struct AppState {
    pub snapshots: Snapshots,
    pub machine_service: MachineService,
    pub alert_service: AlertService,
    pub history_service: HistoryService,
    pub session: SessionStore,
}
