// Machine service - Status table over the latest machine snapshot
use crate::domain::reading::{MachineReading, MachineStatusRow};
use crate::domain::status::StatusCounts;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineTable {
    pub counts: StatusCounts,
    pub machines: Vec<MachineStatusRow>,
}

#[derive(Debug, Clone, Default)]
pub struct MachineService;

impl MachineService {
    pub fn new() -> Self {
        Self
    }

    /// Build the table from readings already reduced to one per machine.
    pub fn table(&self, latest: &[MachineReading]) -> MachineTable {
        MachineTable {
            counts: StatusCounts::tally(latest.iter().map(|r| r.temperature)),
            machines: latest.iter().cloned().map(MachineStatusRow::from).collect(),
        }
    }

    pub fn find(&self, latest: &[MachineReading], machine_id: &str) -> Option<MachineStatusRow> {
        latest
            .iter()
            .find(|r| r.machine_id == machine_id)
            .cloned()
            .map(MachineStatusRow::from)
    }
}
