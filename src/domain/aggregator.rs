// Alert aggregation: flattening, summary counts, filtering
use super::alert::{AlertEvent, CauseMetric, MachineAlert, Severity};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTIFICATION_LIMIT: usize = 10;

/// One event per cause, in record order then cause order.
pub fn flatten(records: &[MachineAlert]) -> Vec<AlertEvent> {
    records
        .iter()
        .flat_map(|record| {
            record.alerts.iter().map(move |cause| {
                let metric = cause.metric();
                if metric == CauseMetric::Unknown {
                    tracing::warn!(
                        machine_id = %record.reading.machine_id,
                        cause = %cause.kind,
                        "Unrecognized alert cause, reporting zero value"
                    );
                }
                AlertEvent {
                    machine_id: record.reading.machine_id.clone(),
                    cause_kind: cause.kind.clone(),
                    severity: cause.severity,
                    value: metric.value_of(&record.reading),
                    unit: metric.unit(),
                    metric,
                    timestamp: record.reading.timestamp.clone(),
                }
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub high_count: usize,
    pub medium_count: usize,
    pub total: usize,
}

/// Count alerting records; each record counts once, by its overall severity.
pub fn summarize(records: &[MachineAlert]) -> AlertSummary {
    let total = records.iter().filter(|r| r.is_alerting()).count();
    let high_count = records
        .iter()
        .filter(|r| r.overall_severity() == Some(Severity::High))
        .count();

    AlertSummary {
        high_count,
        medium_count: total - high_count,
        total,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityFilter {
    #[default]
    #[serde(alias = "all", alias = "")]
    All,
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub severity: SeverityFilter,
    #[serde(default)]
    pub search: Option<String>,
}

impl AlertFilter {
    pub fn matches(&self, record: &MachineAlert) -> bool {
        self.matches_severity(record) && self.matches_search(record)
    }

    fn matches_severity(&self, record: &MachineAlert) -> bool {
        match self.severity {
            SeverityFilter::All => true,
            SeverityFilter::High => record.overall_severity() == Some(Severity::High),
            SeverityFilter::Medium => record.overall_severity() == Some(Severity::Medium),
        }
    }

    fn matches_search(&self, record: &MachineAlert) -> bool {
        let needle = match self.search.as_deref() {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        record.reading.machine_id.to_lowercase().contains(&needle)
            || record.reading.machine_type.to_lowercase().contains(&needle)
    }
}

pub fn filter(records: &[MachineAlert], criteria: &AlertFilter) -> Vec<MachineAlert> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

/// Stable HIGH-first ordering; records without causes go last.
pub fn sort_by_severity(records: &mut [MachineAlert]) {
    records.sort_by_key(|r| r.overall_severity().map_or(u8::MAX, Severity::rank));
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    pub events: Vec<AlertEvent>,
    pub has_high: bool,
    pub urgent_count: usize,
}

/// The first `limit` flattened events, as shown in the header dropdown.
///
/// `has_high` looks at every event, `urgent_count` only at the kept ones.
pub fn notification_feed(records: &[MachineAlert], limit: usize) -> NotificationFeed {
    let mut events = flatten(records);
    let has_high = events.iter().any(|e| e.severity == Severity::High);
    events.truncate(limit);
    let urgent_count = events
        .iter()
        .filter(|e| e.severity == Severity::High)
        .count();

    NotificationFeed {
        events,
        has_high,
        urgent_count,
    }
}
