// Domain layer - Pure models and rules, no I/O
pub mod aggregator;
pub mod alert;
pub mod history;
pub mod reading;
pub mod status;
pub mod telemetry;
