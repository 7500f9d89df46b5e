// Alert service - Views over the latest alert snapshot
use crate::domain::aggregator::{
    self, AlertFilter, AlertSummary, NotificationFeed, DEFAULT_NOTIFICATION_LIMIT,
};
use crate::domain::alert::{AlertEvent, MachineAlert};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFeed {
    /// Counts over the whole snapshot, independent of the filter.
    pub summary: AlertSummary,
    pub alerts: Vec<MachineAlert>,
}

#[derive(Debug, Clone)]
pub struct AlertService {
    notification_limit: usize,
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_LIMIT)
    }
}

impl AlertService {
    pub fn new(notification_limit: usize) -> Self {
        Self { notification_limit }
    }

    /// Filtered records, most severe first, with snapshot-wide counts.
    pub fn feed(&self, records: &[MachineAlert], criteria: &AlertFilter) -> AlertFeed {
        let mut alerts = aggregator::filter(records, criteria);
        aggregator::sort_by_severity(&mut alerts);
        AlertFeed {
            summary: aggregator::summarize(records),
            alerts,
        }
    }

    pub fn events(&self, records: &[MachineAlert]) -> Vec<AlertEvent> {
        aggregator::flatten(records)
    }

    pub fn notifications(&self, records: &[MachineAlert]) -> NotificationFeed {
        aggregator::notification_feed(records, self.notification_limit)
    }
}

/// Drop records that carry no cause before they reach any view.
pub fn alerting_only(records: Vec<MachineAlert>) -> Vec<MachineAlert> {
    records.into_iter().filter(MachineAlert::is_alerting).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregator::SeverityFilter;
    use crate::domain::alert::{AlertCause, Severity};
    use crate::domain::reading::MachineReading;

    fn record(id: &str, severities: &[Severity]) -> MachineAlert {
        MachineAlert::new(
            MachineReading {
                machine_id: id.to_string(),
                machine_type: "Pompe".to_string(),
                temperature: 70.0,
                ..Default::default()
            },
            severities
                .iter()
                .map(|s| AlertCause::new("TEMPÉRATURE ÉLEVÉE", *s))
                .collect(),
        )
    }

    #[test]
    fn test_feed_sorts_high_first_and_keeps_full_summary() {
        let records = vec![
            record("M1", &[Severity::Medium]),
            record("M2", &[Severity::Medium, Severity::High]),
            record("M3", &[Severity::Medium]),
        ];
        let service = AlertService::default();

        let feed = service.feed(&records, &AlertFilter::default());
        let ids: Vec<&str> = feed.alerts.iter().map(|r| r.reading.machine_id.as_str()).collect();
        assert_eq!(ids, vec!["M2", "M1", "M3"]);
        assert_eq!(feed.summary.total, 3);

        let medium = service.feed(
            &records,
            &AlertFilter {
                severity: SeverityFilter::Medium,
                search: None,
            },
        );
        assert_eq!(medium.alerts.len(), 2);
        assert_eq!(medium.summary.high_count, 1);
    }

    #[test]
    fn test_notifications_respect_limit() {
        let records: Vec<MachineAlert> = (0..4)
            .map(|i| record(&format!("M{i}"), &[Severity::High]))
            .collect();
        let feed = AlertService::new(2).notifications(&records);
        assert_eq!(feed.events.len(), 2);
        assert_eq!(feed.urgent_count, 2);
    }

    #[test]
    fn test_alerting_only() {
        let records = vec![record("M1", &[]), record("M2", &[Severity::Medium])];
        let kept = alerting_only(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].reading.machine_id, "M2");
    }
}
