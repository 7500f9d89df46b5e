// HTTP client for the BMI factory API
use crate::application::factory_api::{FactoryApi, HistoryQuery};
use crate::domain::alert::MachineAlert;
use crate::domain::reading::MachineReading;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpFactoryApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFactoryApi {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn history_url(&self, query: &HistoryQuery) -> String {
        let params: Vec<String> = [("date", &query.date), ("machine_id", &query.machine_id)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .map(|v| format!("{}={}", key, urlencoding::encode(v)))
            })
            .collect();

        let base = self.url("/factory/history");
        if params.is_empty() {
            base
        } else {
            format!("{}?{}", base, params.join("&"))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Factory API request {} failed with status {}: {}", url, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl FactoryApi for HttpFactoryApi {
    async fn fetch_machines(&self) -> Result<Vec<MachineReading>> {
        self.get_json(&self.url("/machines/")).await
    }

    async fn fetch_alerts(&self) -> Result<Vec<MachineAlert>> {
        self.get_json(&self.url("/alerts/")).await
    }

    async fn fetch_realtime(&self) -> Result<Vec<MachineReading>> {
        self.get_json(&self.url("/factory/realtime")).await
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Value> {
        // The backend reports "no data" as a 200 with a message object, so
        // only transport and status failures are errors here.
        self.get_json(&self.history_url(query)).await
    }

    async fn fetch_json(&self, path: &str) -> Result<Value> {
        self.get_json(&self.url(path)).await
    }
}
