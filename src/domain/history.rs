// History and prediction rows
use super::reading::MachineReading;
use super::status::StatusBadge;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    #[serde(flatten)]
    pub reading: MachineReading,
    pub badge: StatusBadge,
    pub is_prediction: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

impl HistoryRow {
    pub fn recorded(reading: MachineReading) -> Self {
        Self {
            badge: StatusBadge::for_temperature(reading.temperature),
            reading,
            is_prediction: false,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryView {
    pub rows: Vec<HistoryRow>,
    pub message: Option<String>,
    pub is_prediction: bool,
}

impl HistoryView {
    /// Interpret a `/factory/history` payload.
    ///
    /// The backend answers with an array of rows, a prediction object for a
    /// future date, or a bare `{ "message": ... }` notice.
    pub fn from_payload(payload: Value, date: Option<&str>, machine_id: Option<&str>) -> Self {
        match payload {
            Value::Array(items) => {
                let rows = items
                    .into_iter()
                    .filter_map(|item| match serde_json::from_value::<MachineReading>(item) {
                        Ok(reading) => Some(HistoryRow::recorded(reading)),
                        Err(e) => {
                            tracing::warn!("Skipping malformed history row: {}", e);
                            None
                        }
                    })
                    .collect();
                Self {
                    rows,
                    message: None,
                    is_prediction: false,
                }
            }
            Value::Object(ref obj) => {
                let message = obj.get("message").and_then(Value::as_str).map(str::to_string);
                let is_prediction = obj
                    .get("type_donnees")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.contains("Prédiction"));

                if is_prediction {
                    let row = prediction_row(&payload, date.unwrap_or_default(), machine_id.unwrap_or_default());
                    Self {
                        rows: vec![row],
                        message,
                        is_prediction: true,
                    }
                } else {
                    Self {
                        rows: Vec::new(),
                        message,
                        is_prediction: false,
                    }
                }
            }
            _ => Self::default(),
        }
    }
}

fn prediction_row(payload: &Value, date: &str, machine_id: &str) -> HistoryRow {
    let text = |key: &str| payload.get(key).and_then(Value::as_str);
    let number = |key: &str| payload.get(key).map(leading_number).unwrap_or_default();

    let equipment = text("equipement").unwrap_or_default();
    let predicted_id = equipment
        .split_once("ID: ")
        .map(|(_, id)| id.trim())
        .filter(|id| !id.is_empty())
        .unwrap_or(machine_id);
    let machine_type = equipment
        .split(' ')
        .next()
        .filter(|t| !t.is_empty())
        .unwrap_or("—");
    let status_label = text("statut_estime");

    let reading = MachineReading {
        machine_id: predicted_id.to_string(),
        machine_type: machine_type.to_string(),
        temperature: number("temperature_estimee"),
        vibration: number("vibration_estimee"),
        oil_particles: None,
        current: Some(number("courant_estime")),
        failure_next_24h: Some(i64::from(status_label == Some("Risque élevé"))),
        timestamp: format!("{}T00:00:00", date),
    };

    let mut badge = StatusBadge::for_temperature(reading.temperature);
    if let Some(label) = status_label.filter(|l| !l.is_empty()) {
        badge = badge.with_label(label);
    }

    HistoryRow {
        reading,
        badge,
        is_prediction: true,
        confidence: payload
            .get("niveau_confiance")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
    }
}

/// Read a number, or the leading numeric prefix of a string such as "72.4 °C".
fn leading_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => {
            let s = s.trim_start();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
                .map_or(s.len(), |(i, _)| i);
            s[..end].parse().unwrap_or_default()
        }
        _ => 0.0,
    }
}
