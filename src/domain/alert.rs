// Alert domain models
use super::reading::MachineReading;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    #[default]
    Medium,
}

impl Severity {
    /// Sort rank, most severe first.
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
        }
    }
}

// The backend only emits HIGH and MEDIUM; anything else is read as MEDIUM so a
// malformed cause still shows up as alerting.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.eq_ignore_ascii_case("HIGH") {
            Ok(Severity::High)
        } else {
            Ok(Severity::Medium)
        }
    }
}

/// One detected abnormal condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCause {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub severity: Severity,
}

impl AlertCause {
    pub fn new(kind: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: kind.into(),
            severity,
        }
    }

    pub fn metric(&self) -> CauseMetric {
        CauseMetric::from_kind(&self.kind)
    }
}

/// Which reading a cause refers to, resolved from its category name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseMetric {
    Temperature,
    Vibration,
    Oil,
    Unknown,
}

impl CauseMetric {
    pub fn from_kind(kind: &str) -> Self {
        let kind = kind.to_uppercase();
        if kind.contains("TEMPÉRATURE") || kind.contains("TEMPERATURE") {
            CauseMetric::Temperature
        } else if kind.contains("VIBRATION") {
            CauseMetric::Vibration
        } else if kind.contains("HUILE")
            || kind.split(|c: char| !c.is_alphanumeric()).any(|word| word == "OIL")
        {
            CauseMetric::Oil
        } else {
            CauseMetric::Unknown
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            CauseMetric::Temperature => "°C",
            CauseMetric::Vibration => "Hz",
            CauseMetric::Oil => "pts",
            CauseMetric::Unknown => "",
        }
    }

    /// Current value of this metric on the reading; zero when unknown.
    pub fn value_of(self, reading: &MachineReading) -> f64 {
        match self {
            CauseMetric::Temperature => reading.temperature,
            CauseMetric::Vibration => reading.vibration,
            CauseMetric::Oil => reading.oil_particles_or_zero(),
            CauseMetric::Unknown => 0.0,
        }
    }
}

/// A machine reading bundled with the causes it triggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineAlert {
    #[serde(flatten)]
    pub reading: MachineReading,
    #[serde(default)]
    pub alerts: Vec<AlertCause>,
}

impl MachineAlert {
    pub fn new(reading: MachineReading, alerts: Vec<AlertCause>) -> Self {
        Self { reading, alerts }
    }

    /// HIGH if any cause is HIGH, MEDIUM if there is any cause, otherwise none.
    pub fn overall_severity(&self) -> Option<Severity> {
        if self.alerts.is_empty() {
            None
        } else if self.alerts.iter().any(|a| a.severity == Severity::High) {
            Some(Severity::High)
        } else {
            Some(Severity::Medium)
        }
    }

    pub fn is_alerting(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// One cause of one machine alert, flattened for notification feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub machine_id: String,
    pub cause_kind: String,
    pub severity: Severity,
    pub value: f64,
    pub unit: &'static str,
    pub metric: CauseMetric,
    pub timestamp: String,
}

impl AlertEvent {
    pub fn is_unrecognized(&self) -> bool {
        self.metric == CauseMetric::Unknown
    }
}
