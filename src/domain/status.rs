// Operational status classification shared by every machine view
use serde::Serialize;

/// Above this temperature (°C) a machine needs maintenance.
pub const TEMP_WARNING: f64 = 65.0;
/// Above this temperature (°C) a machine is considered failed.
pub const TEMP_CRITICAL: f64 = 75.0;

pub const VIBRATION_WARNING: f64 = 5.5;
pub const VIBRATION_CRITICAL: f64 = 6.5;

pub const OIL_WARNING: f64 = 60.0;
pub const OIL_CRITICAL: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalStatus {
    Active,
    Maintenance,
    Failure,
}

/// Semantic color token understood by the dashboard badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Success,
    Warning,
    Error,
}

impl OperationalStatus {
    /// Classify a temperature reading, most severe band first.
    ///
    /// Thresholds are strict: exactly 75 °C is `Maintenance` and exactly
    /// 65 °C is `Active`. NaN fails every comparison and lands on `Active`.
    pub fn classify(temperature: f64) -> Self {
        if temperature > TEMP_CRITICAL {
            OperationalStatus::Failure
        } else if temperature > TEMP_WARNING {
            OperationalStatus::Maintenance
        } else {
            OperationalStatus::Active
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationalStatus::Active => "Actif",
            OperationalStatus::Maintenance => "Maintenance",
            OperationalStatus::Failure => "En Panne",
        }
    }

    pub fn color(self) -> ColorToken {
        match self {
            OperationalStatus::Active => ColorToken::Success,
            OperationalStatus::Maintenance => ColorToken::Warning,
            OperationalStatus::Failure => ColorToken::Error,
        }
    }

    /// Accent color used by the digital twin scene.
    pub fn color_hex(self) -> &'static str {
        match self {
            OperationalStatus::Active => "#22c55e",
            OperationalStatus::Maintenance => "#f59e0b",
            OperationalStatus::Failure => "#ef4444",
        }
    }
}

/// Everything a renderer needs to draw a status badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBadge {
    pub status: OperationalStatus,
    pub label: String,
    pub color: ColorToken,
    pub color_hex: &'static str,
}

impl From<OperationalStatus> for StatusBadge {
    fn from(status: OperationalStatus) -> Self {
        Self {
            status,
            label: status.label().to_string(),
            color: status.color(),
            color_hex: status.color_hex(),
        }
    }
}

impl StatusBadge {
    pub fn for_temperature(temperature: f64) -> Self {
        OperationalStatus::classify(temperature).into()
    }

    /// Keep the temperature-derived color but display a caller supplied label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Machine counts per status band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub maintenance: usize,
    pub failure: usize,
}

impl StatusCounts {
    pub fn tally<I>(temperatures: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        temperatures
            .into_iter()
            .fold(Self::default(), |mut counts, temperature| {
                counts.total += 1;
                match OperationalStatus::classify(temperature) {
                    OperationalStatus::Active => counts.active += 1,
                    OperationalStatus::Maintenance => counts.maintenance += 1,
                    OperationalStatus::Failure => counts.failure += 1,
                }
                counts
            })
    }
}

/// Display band for the secondary metrics (vibration, oil particles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricBand {
    Normal,
    Warning,
    Critical,
}

impl MetricBand {
    fn from_thresholds(value: f64, warning: f64, critical: f64) -> Self {
        if value > critical {
            MetricBand::Critical
        } else if value > warning {
            MetricBand::Warning
        } else {
            MetricBand::Normal
        }
    }

    pub fn temperature(value: f64) -> Self {
        Self::from_thresholds(value, TEMP_WARNING, TEMP_CRITICAL)
    }

    pub fn vibration(value: f64) -> Self {
        Self::from_thresholds(value, VIBRATION_WARNING, VIBRATION_CRITICAL)
    }

    pub fn oil(value: f64) -> Self {
        Self::from_thresholds(value, OIL_WARNING, OIL_CRITICAL)
    }
}
