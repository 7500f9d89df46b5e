// In-memory upstream for tests
use crate::application::factory_api::{FactoryApi, HistoryQuery};
use crate::domain::alert::MachineAlert;
use crate::domain::reading::MachineReading;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeFactoryApi {
    pub machines: Vec<MachineReading>,
    pub alerts: Vec<MachineAlert>,
    pub history: Value,
    pub fail: bool,
    pub history_queries: Mutex<Vec<HistoryQuery>>,
}

impl FakeFactoryApi {
    fn check(&self) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("upstream unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl FactoryApi for FakeFactoryApi {
    async fn fetch_machines(&self) -> anyhow::Result<Vec<MachineReading>> {
        self.check()?;
        Ok(self.machines.clone())
    }

    async fn fetch_alerts(&self) -> anyhow::Result<Vec<MachineAlert>> {
        self.check()?;
        Ok(self.alerts.clone())
    }

    async fn fetch_realtime(&self) -> anyhow::Result<Vec<MachineReading>> {
        self.check()?;
        Ok(self.machines.last().cloned().into_iter().collect())
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> anyhow::Result<Value> {
        self.check()?;
        if let Ok(mut seen) = self.history_queries.lock() {
            seen.push(query.clone());
        }
        Ok(self.history.clone())
    }

    async fn fetch_json(&self, path: &str) -> anyhow::Result<Value> {
        self.check()?;
        Ok(serde_json::json!({ "path": path }))
    }
}
