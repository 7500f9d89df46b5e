// History service - On-demand archive and prediction lookups
use crate::application::factory_api::{FactoryApi, HistoryQuery};
use crate::domain::history::HistoryView;
use std::sync::Arc;

#[derive(Clone)]
pub struct HistoryService {
    api: Arc<dyn FactoryApi>,
}

impl HistoryService {
    pub fn new(api: Arc<dyn FactoryApi>) -> Self {
        Self { api }
    }

    pub async fn history(&self, query: &HistoryQuery) -> anyhow::Result<HistoryView> {
        let query = query.normalized();
        let payload = self.api.fetch_history(&query).await?;
        Ok(HistoryView::from_payload(
            payload,
            query.date.as_deref(),
            query.machine_id.as_deref(),
        ))
    }
}
