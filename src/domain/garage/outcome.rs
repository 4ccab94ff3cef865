use std::fmt;

use serde::Serialize;

use crate::domain::garage::vehicle::{SlotCategory, VehicleCategory};
use crate::domain::utils::id::LicensePlate;

/// Why an arrival could not be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrivalFailure {
    /// The plate is already parked or waiting.
    DuplicateVehicle,

    /// The plate is empty or contains whitespace.
    InvalidPlate,

    /// The ledger handed out a slot but the garage stack refused the vehicle. The slot has been
    /// given back.
    SlotAllocationInconsistency(SlotCategory),
}

/// Result of [`ParkingCoordinator::arrival`](crate::domain::garage::coordinator::ParkingCoordinator::arrival).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ArrivalOutcome {
    /// The vehicle stands on top of the garage stack. `churned` lists the vehicles that were cycled
    /// out and back in before it, in eviction order.
    Parked { slot: SlotCategory, churned: Vec<LicensePlate> },

    /// No slot of the vehicle's category was free. `position` is its place in the waiting lane.
    Diverted { position: usize },

    Failure(ArrivalFailure),
}

impl ArrivalOutcome {
    pub fn is_parked(&self) -> bool {
        matches!(self, ArrivalOutcome::Parked { .. })
    }

    pub fn is_diverted(&self) -> bool {
        matches!(self, ArrivalOutcome::Diverted { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ArrivalOutcome::Failure(_))
    }
}

impl fmt::Display for ArrivalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrivalOutcome::Parked { slot, churned } if churned.is_empty() => write!(f, "parked in a {}", slot),
            ArrivalOutcome::Parked { slot, churned } => write!(f, "parked in a {} after cycling {} vehicle(s)", slot, churned.len()),
            ArrivalOutcome::Diverted { position } => write!(f, "diverted to the waiting lane at position {}", position),
            ArrivalOutcome::Failure(ArrivalFailure::DuplicateVehicle) => write!(f, "rejected, plate is already tracked"),
            ArrivalOutcome::Failure(ArrivalFailure::InvalidPlate) => write!(f, "rejected, plate must be non-empty without whitespace"),
            ArrivalOutcome::Failure(ArrivalFailure::SlotAllocationInconsistency(slot)) => {
                write!(f, "failed, a {} was granted but the garage is physically full", slot)
            }
        }
    }
}

/// Billing and reshuffle details of a vehicle that left the garage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureReceipt {
    pub plate: LicensePlate,
    pub category: VehicleCategory,
    pub slot: SlotCategory,
    pub entry_time: i64,
    pub exit_time: i64,
    pub duration_s: i64,
    pub fee: f64,

    /// Vehicles that had to make way, in the order they were moved to the holding area.
    pub evicted: Vec<LicensePlate>,

    /// Front waiting vehicle that took over the freed slot, if any.
    pub promoted: Option<LicensePlate>,
}

/// Result of [`ParkingCoordinator::departure`](crate::domain::garage::coordinator::ParkingCoordinator::departure).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DepartureOutcome {
    Departed(DepartureReceipt),

    /// The vehicle left from the waiting lane. Waiting is free of charge.
    LeftWaitingLane { plate: LicensePlate, position: usize },

    NotFound,
}

impl DepartureOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, DepartureOutcome::NotFound)
    }

    pub fn fee(&self) -> Option<f64> {
        match self {
            DepartureOutcome::Departed(receipt) => Some(receipt.fee),
            _ => None,
        }
    }

    pub fn receipt(&self) -> Option<&DepartureReceipt> {
        match self {
            DepartureOutcome::Departed(receipt) => Some(receipt),
            _ => None,
        }
    }
}

impl fmt::Display for DepartureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartureOutcome::Departed(receipt) => {
                write!(
                    f,
                    "{} ({}, {}) left after {}h{:02}m, fee {:.2}",
                    receipt.plate,
                    receipt.category,
                    receipt.slot,
                    receipt.duration_s / 3600,
                    (receipt.duration_s % 3600) / 60,
                    receipt.fee
                )?;
                if !receipt.evicted.is_empty() {
                    let evicted: Vec<&str> = receipt.evicted.iter().map(|p| p.as_str()).collect();
                    write!(f, ", made way: {}", evicted.join(" -> "))?;
                }
                if let Some(promoted) = &receipt.promoted {
                    write!(f, ", {} moved in from the waiting lane", promoted)?;
                }
                Ok(())
            }
            DepartureOutcome::LeftWaitingLane { plate, position } => {
                write!(f, "{} left the waiting lane from position {}, no fee", plate, position)
            }
            DepartureOutcome::NotFound => write!(f, "vehicle not found"),
        }
    }
}

/// Where a plate is currently tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VehicleLocation {
    /// Top-relative position in the garage (`1` = next to the gate).
    Garage(usize),

    /// Front-relative position in the waiting lane.
    WaitingLane(usize),

    NotTracked,
}
