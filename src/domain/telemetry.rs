// Realtime telemetry chart models
use super::reading::MachineReading;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

pub const REALTIME_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            id,
            name,
            color,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Sample {
    time_ms: i64,
    temperature: f64,
    vibration: f64,
}

/// Fixed-capacity window over the most recent realtime samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(REALTIME_WINDOW)
    }
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a reading, evicting the oldest sample once full.
    ///
    /// Readings without a parseable timestamp are stamped with `now`.
    pub fn push(&mut self, reading: &MachineReading, now: DateTime<Utc>) {
        if self.capacity == 0 {
            return;
        }
        let time_ms = parse_timestamp_ms(&reading.timestamp).unwrap_or(now.timestamp_millis());
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample {
            time_ms,
            temperature: reading.temperature,
            vibration: reading.vibration,
        });
    }

    pub fn series(&self) -> Vec<SeriesData> {
        let temperature = self
            .samples
            .iter()
            .map(|s| TimeSeriesPoint::new(s.time_ms, s.temperature))
            .collect();
        let vibration = self
            .samples
            .iter()
            .map(|s| TimeSeriesPoint::new(s.time_ms, s.vibration))
            .collect();

        vec![
            SeriesData::new(
                "temperature".to_string(),
                "Température (°C)".to_string(),
                Some("#EF4444".to_string()),
                temperature,
            ),
            SeriesData::new(
                "vibration".to_string(),
                "Vibrations (Hz)".to_string(),
                Some("#3B82F6".to_string()),
                vibration,
            ),
        ]
    }
}

/// Parse the timestamp formats the backend emits; naive times are read as UTC.
pub fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}
