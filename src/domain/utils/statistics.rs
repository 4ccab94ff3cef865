use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::domain::garage::coordinator::ParkingCoordinator;
use crate::domain::garage::outcome::{ArrivalFailure, ArrivalOutcome, DepartureOutcome};
use crate::domain::garage::vehicle::VehicleCategory;
use crate::error::Result;

/// Each event consists of a set of key-value-pairs with the measured data or some meta data of the event.
/// This enum specifies all allowed key values and thus the column in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatParameter {
    /// Event time in seconds as passed to the coordinator.
    Time,

    /// "ARRIVAL" or "DEPARTURE".
    Command,

    /// Parked, Diverted, a failure reason, Departed, LeftWaitingLane or NotFound.
    Outcome,

    LicensePlate,

    VehicleCategory,

    SlotCategory,

    /// Seconds between entry and exit.
    ParkingDuration,

    Fee,

    /// Number of vehicles that had to make way during the operation.
    Reshuffled,

    /// Plate of the vehicle promoted from the waiting lane, if any.
    Promoted,

    // Garage state after the event
    Occupied,

    Capacity,

    WaitingLaneLength,
}

impl StatParameter {
    /// Column order of the CSV output.
    pub const COLUMNS: [StatParameter; 13] = [
        StatParameter::Time,
        StatParameter::Command,
        StatParameter::Outcome,
        StatParameter::LicensePlate,
        StatParameter::VehicleCategory,
        StatParameter::SlotCategory,
        StatParameter::ParkingDuration,
        StatParameter::Fee,
        StatParameter::Reshuffled,
        StatParameter::Promoted,
        StatParameter::Occupied,
        StatParameter::Capacity,
        StatParameter::WaitingLaneLength,
    ];

    pub fn header(self) -> &'static str {
        match self {
            StatParameter::Time => "Time",
            StatParameter::Command => "Command",
            StatParameter::Outcome => "Outcome",
            StatParameter::LicensePlate => "LicensePlate",
            StatParameter::VehicleCategory => "VehicleCategory",
            StatParameter::SlotCategory => "SlotCategory",
            StatParameter::ParkingDuration => "ParkingDuration",
            StatParameter::Fee => "Fee",
            StatParameter::Reshuffled => "Reshuffled",
            StatParameter::Promoted => "Promoted",
            StatParameter::Occupied => "Occupied",
            StatParameter::Capacity => "Capacity",
            StatParameter::WaitingLaneLength => "WaitingLaneLength",
        }
    }

    pub fn headers() -> Vec<&'static str> {
        Self::COLUMNS.iter().map(|param| param.header()).collect()
    }
}

/// store values in their native format, only format them when writing to the CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl StatValue {
    fn to_field(&self) -> String {
        match self {
            StatValue::Text(t) => t.clone(),
            StatValue::Integer(i) => i.to_string(),
            StatValue::Float(f) => format!("{:.2}", f),
        }
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<usize> for StatValue {
    fn from(v: usize) -> Self {
        StatValue::Integer(v as i64)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticEvent {
    data: HashMap<StatParameter, StatValue>,
}

impl StatisticEvent {
    pub fn new() -> Self {
        Self { data: HashMap::new() }
    }

    pub fn set<V: Into<StatValue>>(&mut self, param: StatParameter, value: V) -> &mut Self {
        self.data.insert(param, value.into());
        self
    }

    pub fn get(&self, param: StatParameter) -> Option<&StatValue> {
        self.data.get(&param)
    }

    /// Describes an arrival together with the garage state right after it.
    pub fn for_arrival(time: i64, plate: &str, category: VehicleCategory, outcome: &ArrivalOutcome, coordinator: &ParkingCoordinator) -> Self {
        let mut event = StatisticEvent::new();
        event
            .set(StatParameter::Time, time)
            .set(StatParameter::Command, "ARRIVAL")
            .set(StatParameter::LicensePlate, plate)
            .set(StatParameter::VehicleCategory, category.to_string());

        match outcome {
            ArrivalOutcome::Parked { slot, churned } => {
                event.set(StatParameter::Outcome, "Parked").set(StatParameter::SlotCategory, slot.to_string()).set(StatParameter::Reshuffled, churned.len());
            }
            ArrivalOutcome::Diverted { .. } => {
                event.set(StatParameter::Outcome, "Diverted");
            }
            ArrivalOutcome::Failure(ArrivalFailure::DuplicateVehicle) => {
                event.set(StatParameter::Outcome, "DuplicateVehicle");
            }
            ArrivalOutcome::Failure(ArrivalFailure::InvalidPlate) => {
                event.set(StatParameter::Outcome, "InvalidPlate");
            }
            ArrivalOutcome::Failure(ArrivalFailure::SlotAllocationInconsistency(slot)) => {
                event.set(StatParameter::Outcome, "SlotAllocationInconsistency").set(StatParameter::SlotCategory, slot.to_string());
            }
        }

        event.with_garage_state(coordinator)
    }

    /// Describes a departure together with the garage state right after it.
    pub fn for_departure(time: i64, plate: &str, outcome: &DepartureOutcome, coordinator: &ParkingCoordinator) -> Self {
        let mut event = StatisticEvent::new();
        event.set(StatParameter::Time, time).set(StatParameter::Command, "DEPARTURE").set(StatParameter::LicensePlate, plate);

        match outcome {
            DepartureOutcome::Departed(receipt) => {
                event
                    .set(StatParameter::Outcome, "Departed")
                    .set(StatParameter::VehicleCategory, receipt.category.to_string())
                    .set(StatParameter::SlotCategory, receipt.slot.to_string())
                    .set(StatParameter::ParkingDuration, receipt.duration_s)
                    .set(StatParameter::Fee, receipt.fee)
                    .set(StatParameter::Reshuffled, receipt.evicted.len());
                if let Some(promoted) = &receipt.promoted {
                    event.set(StatParameter::Promoted, promoted.as_str());
                }
            }
            DepartureOutcome::LeftWaitingLane { .. } => {
                event.set(StatParameter::Outcome, "LeftWaitingLane").set(StatParameter::Fee, 0.0);
            }
            DepartureOutcome::NotFound => {
                event.set(StatParameter::Outcome, "NotFound");
            }
        }

        event.with_garage_state(coordinator)
    }

    fn with_garage_state(mut self, coordinator: &ParkingCoordinator) -> Self {
        self.set(StatParameter::Occupied, coordinator.occupied())
            .set(StatParameter::Capacity, coordinator.total_capacity())
            .set(StatParameter::WaitingLaneLength, coordinator.waiting_lane_length());
        self
    }

    /// Row in column order, `NA` for unset values.
    pub fn to_row(&self) -> Vec<String> {
        StatParameter::COLUMNS.iter().map(|param| self.data.get(param).map(StatValue::to_field).unwrap_or_else(|| "NA".to_string())).collect()
    }
}

/// Writes statistic events as semicolon separated CSV rows.
pub struct StatsCollector {
    writer: csv::Writer<Box<dyn Write>>,
    events_written: usize,
}

impl StatsCollector {
    /// Opens the output (a file, or stdout if `filename` is `None`) and writes the header.
    pub fn init<P: AsRef<Path>>(filename: Option<P>) -> Result<Self> {
        let writer: Box<dyn Write> = match filename {
            Some(f) => Box::new(File::create(f)?),
            None => Box::new(io::stdout()),
        };

        Self::from_writer(writer)
    }

    pub fn from_writer(writer: Box<dyn Write>) -> Result<Self> {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
        csv_wtr.write_record(StatParameter::headers())?;
        Ok(StatsCollector { writer: csv_wtr, events_written: 0 })
    }

    pub fn add_event(&mut self, event: &StatisticEvent) -> Result<()> {
        self.writer.write_record(event.to_row())?;
        self.events_written += 1;
        Ok(())
    }

    pub fn events_written(&self) -> usize {
        self.events_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
