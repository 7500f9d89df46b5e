// Machine telemetry reading domain model
use super::status::{MetricBand, OperationalStatus, StatusBadge};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One telemetry sample for one machine at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MachineReading {
    #[serde(default)]
    pub machine_id: String,
    #[serde(default)]
    pub machine_type: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub temperature: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub vibration: f64,
    #[serde(default)]
    pub oil_particles: Option<f64>,
    #[serde(default, alias = "current_mean")]
    pub current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_next_24h: Option<i64>,
    #[serde(default)]
    pub timestamp: String,
}

impl MachineReading {
    pub fn status(&self) -> OperationalStatus {
        OperationalStatus::classify(self.temperature)
    }

    /// Oil particle count, zero when the backend did not report one.
    pub fn oil_particles_or_zero(&self) -> f64 {
        self.oil_particles.unwrap_or_default()
    }
}

/// Null or missing numbers degrade to zero instead of failing the payload.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep the last reading seen for each machine id.
///
/// "Last" means last by array position, not by timestamp. Output order is the
/// order in which each id first appeared.
pub fn latest_per_machine(readings: Vec<MachineReading>) -> Vec<MachineReading> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut latest: Vec<MachineReading> = Vec::new();

    for reading in readings {
        match index.get(&reading.machine_id) {
            Some(&slot) => latest[slot] = reading,
            None => {
                index.insert(reading.machine_id.clone(), latest.len());
                latest.push(reading);
            }
        }
    }

    latest
}

/// A reading ready for the machine table: status badge plus metric bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineStatusRow {
    #[serde(flatten)]
    pub reading: MachineReading,
    pub badge: StatusBadge,
    pub vibration_band: MetricBand,
    pub oil_band: Option<MetricBand>,
}

impl From<MachineReading> for MachineStatusRow {
    fn from(reading: MachineReading) -> Self {
        let badge = StatusBadge::for_temperature(reading.temperature);
        let vibration_band = MetricBand::vibration(reading.vibration);
        let oil_band = reading.oil_particles.map(MetricBand::oil);
        Self {
            reading,
            badge,
            vibration_band,
            oil_band,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: &str, temperature: f64) -> MachineReading {
        MachineReading {
            machine_id: id.to_string(),
            machine_type: "Pompe".to_string(),
            temperature,
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_backend_row() {
        let json = r#"{
            "machine_id": "KUKA_10",
            "machine_type": "Robot",
            "timestamp": "2024-03-01T10:00:00",
            "temperature": 71.2,
            "vibration": 5.9,
            "current_mean": 12.4,
            "oil_particles": null,
            "failure_next_24h": 0
        }"#;
        let r: MachineReading = serde_json::from_str(json).unwrap();
        assert_eq!(r.machine_id, "KUKA_10");
        assert_eq!(r.current, Some(12.4));
        assert_eq!(r.oil_particles, None);
        assert_eq!(r.failure_next_24h, Some(0));
        assert_eq!(r.status(), OperationalStatus::Maintenance);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let r: MachineReading =
            serde_json::from_str(r#"{"machine_id": "M1", "temperature": null}"#).unwrap();
        assert_eq!(r.temperature, 0.0);
        assert_eq!(r.vibration, 0.0);
        assert_eq!(r.oil_particles_or_zero(), 0.0);
        assert_eq!(r.machine_type, "");
    }

    #[test]
    fn test_latest_per_machine_is_last_by_position() {
        let readings = vec![
            reading("M1", 50.0),
            reading("M2", 60.0),
            reading("M1", 80.0),
            reading("M3", 40.0),
            reading("M2", 66.0),
        ];
        let latest = latest_per_machine(readings);
        let ids: Vec<&str> = latest.iter().map(|r| r.machine_id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2", "M3"]);
        assert_eq!(latest[0].temperature, 80.0);
        assert_eq!(latest[1].temperature, 66.0);
    }

    #[test]
    fn test_latest_ignores_timestamps() {
        let mut newer = reading("M1", 50.0);
        newer.timestamp = "2024-03-02T00:00:00".to_string();
        let mut older = reading("M1", 90.0);
        older.timestamp = "2024-03-01T00:00:00".to_string();

        let latest = latest_per_machine(vec![newer, older]);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].temperature, 90.0);
    }

    #[test]
    fn test_status_row() {
        let mut r = reading("M1", 76.0);
        r.vibration = 6.0;
        let row = MachineStatusRow::from(r);
        assert_eq!(row.badge.status, OperationalStatus::Failure);
        assert_eq!(row.vibration_band, MetricBand::Warning);
        assert_eq!(row.oil_band, None);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["machine_id"], "M1");
        assert_eq!(json["badge"]["label"], "En Panne");
    }
}
