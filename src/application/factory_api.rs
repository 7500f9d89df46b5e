// Upstream trait for the BMI factory API
use crate::domain::alert::MachineAlert;
use crate::domain::reading::MachineReading;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Filters accepted by `/factory/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryQuery {
    pub date: Option<String>,
    pub machine_id: Option<String>,
}

impl HistoryQuery {
    /// Drop blank values so they are not forwarded upstream.
    pub fn normalized(&self) -> Self {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            date: clean(&self.date),
            machine_id: clean(&self.machine_id),
        }
    }
}

#[async_trait]
pub trait FactoryApi: Send + Sync {
    /// Recent telemetry rows, possibly several per machine
    async fn fetch_machines(&self) -> anyhow::Result<Vec<MachineReading>>;

    /// Machines whose latest reading triggered at least one alert
    async fn fetch_alerts(&self) -> anyhow::Result<Vec<MachineAlert>>;

    /// The single most recent reading, as a one-element list
    async fn fetch_realtime(&self) -> anyhow::Result<Vec<MachineReading>>;

    /// History rows, a prediction, or a notice, depending on the query
    async fn fetch_history(&self, query: &HistoryQuery) -> anyhow::Result<Value>;

    /// Any read-only aggregate endpoint (KPIs, heatmap)
    async fn fetch_json(&self, path: &str) -> anyhow::Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_query() {
        let q = HistoryQuery {
            date: Some("  ".to_string()),
            machine_id: Some(" KUKA_10 ".to_string()),
        };
        assert_eq!(
            q.normalized(),
            HistoryQuery {
                date: None,
                machine_id: Some("KUKA_10".to_string()),
            }
        );
    }
}
