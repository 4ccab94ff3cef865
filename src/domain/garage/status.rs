use std::fmt;

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::domain::garage::coordinator::ParkingCoordinator;
use crate::domain::garage::slot_ledger::SlotUsage;
use crate::domain::garage::vehicle::{SlotCategory, Vehicle, VehicleCategory};
use crate::domain::utils::id::LicensePlate;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats epoch seconds as local time. Falls back to the raw number for out-of-range values.
pub fn format_timestamp(seconds: i64) -> String {
    match Local.timestamp_opt(seconds, 0).single() {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => seconds.to_string(),
    }
}

/// Counters describing the garage at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GarageStatus {
    pub total_capacity: usize,
    pub occupied: usize,
    pub available: usize,
    pub hourly_rate: f64,
    pub small: SlotUsage,
    pub medium: SlotUsage,
    pub large: SlotUsage,
    pub waiting: usize,
}

/// One line of a container listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRow {
    pub position: usize,
    pub plate: LicensePlate,
    pub category: VehicleCategory,
    pub slot: Option<SlotCategory>,
    pub entry_time: i64,
}

impl VehicleRow {
    fn from_vehicle(position: usize, vehicle: &Vehicle) -> Self {
        VehicleRow {
            position,
            plate: vehicle.plate().clone(),
            category: vehicle.category(),
            slot: vehicle.assigned_slot(),
            entry_time: vehicle.entry_time(),
        }
    }
}

impl fmt::Display for VehicleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}. {} ({}", self.position, self.plate, self.category)?;
        if let Some(slot) = self.slot {
            write!(f, ", {}", slot)?;
        }
        write!(f, ") since {}", format_timestamp(self.entry_time))
    }
}

/// Full read-only view of the coordinator used for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GarageReport {
    pub status: GarageStatus,
    pub garage: Vec<VehicleRow>,
    pub waiting_lane: Vec<VehicleRow>,
}

impl ParkingCoordinator {
    pub fn status(&self) -> GarageStatus {
        let ledger = self.ledger();
        GarageStatus {
            total_capacity: self.total_capacity(),
            occupied: self.occupied(),
            available: self.available_spaces(),
            hourly_rate: self.hourly_rate(),
            small: ledger.small,
            medium: ledger.medium,
            large: ledger.large,
            waiting: self.waiting_lane_length(),
        }
    }

    /// Parked vehicles, gate side first.
    pub fn garage_rows(&self) -> Vec<VehicleRow> {
        self.garage().iter_from_top().enumerate().map(|(index, vehicle)| VehicleRow::from_vehicle(index + 1, vehicle)).collect()
    }

    /// Waiting vehicles, front first.
    pub fn waiting_rows(&self) -> Vec<VehicleRow> {
        self.waiting_lane().iter().enumerate().map(|(index, vehicle)| VehicleRow::from_vehicle(index + 1, vehicle)).collect()
    }

    pub fn report(&self) -> GarageReport {
        GarageReport { status: self.status(), garage: self.garage_rows(), waiting_lane: self.waiting_rows() }
    }

    /// Human-readable dump of both containers.
    pub fn to_string_report(&self) -> String {
        self.report().to_string()
    }
}

impl fmt::Display for GarageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Capacity:      {} vehicles", self.total_capacity)?;
        writeln!(f, "Parked:        {} vehicles", self.occupied)?;
        writeln!(f, "Free:          {} spaces", self.available)?;
        writeln!(f, "Hourly rate:   {:.2}", self.hourly_rate)?;
        writeln!(f, "Small slots:   {}/{}", self.small.used, self.small.total)?;
        writeln!(f, "Medium slots:  {}/{}", self.medium.used, self.medium.total)?;
        writeln!(f, "Large slots:   {}/{}", self.large.used, self.large.total)?;
        write!(f, "Waiting lane:  {} vehicles", self.waiting)
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[VehicleRow]) -> fmt::Result {
    writeln!(f, "{:<10}{:<15}{:<10}{:<15}{:<20}", "Position", "Plate", "Category", "Slot", "Entry time")?;
    for row in rows {
        let slot = row.slot.map(|slot| slot.to_string()).unwrap_or_else(|| "-".to_string());
        writeln!(f, "{:<10}{:<15}{:<10}{:<15}{:<20}", row.position, row.plate.as_str(), row.category.to_string(), slot, format_timestamp(row.entry_time))?;
    }
    Ok(())
}

impl fmt::Display for GarageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Garage ===")?;
        writeln!(f, "{}", self.status)?;

        if self.garage.is_empty() {
            writeln!(f, "The garage is empty.")?;
        } else {
            writeln!(f, "Parked vehicles (gate side first):")?;
            write_rows(f, &self.garage)?;
        }

        writeln!(f, "=== Waiting lane ===")?;
        if self.waiting_lane.is_empty() {
            writeln!(f, "The waiting lane is empty.")
        } else {
            writeln!(f, "Waiting vehicles (front first):")?;
            write_rows(f, &self.waiting_lane)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::garage::config::GarageConfig;

    #[test]
    fn test_status_queries_do_not_mutate() {
        let mut coordinator = ParkingCoordinator::new(GarageConfig::new(3, 5.0).with_slots(1, 1, 1));
        coordinator.arrival("A", VehicleCategory::Small, 0);
        coordinator.arrival("B", VehicleCategory::Small, 10);

        let before = coordinator.report();
        let _ = coordinator.status();
        let _ = coordinator.to_string_report();
        let _ = coordinator.find("A");
        assert_eq!(coordinator.report(), before);
    }

    #[test]
    fn test_rows_are_ordered_gate_side_first() {
        let mut coordinator = ParkingCoordinator::new(GarageConfig::new(3, 5.0).with_slots(3, 0, 0));
        for (plate, time) in [("A", 0), ("B", 1), ("C", 2)] {
            coordinator.arrival(plate, VehicleCategory::Small, time);
        }

        let rows = coordinator.garage_rows();
        let plates: Vec<&str> = rows.iter().map(|row| row.plate.as_str()).collect();
        assert_eq!(plates, vec!["C", "B", "A"]);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[2].slot, Some(SlotCategory::SmallSlot));
    }

    #[test]
    fn test_report_mentions_every_vehicle() {
        let mut coordinator = ParkingCoordinator::new(GarageConfig::new(1, 5.0).with_slots(1, 0, 0));
        coordinator.arrival("IN-1", VehicleCategory::Small, 0);
        coordinator.arrival("OUT-1", VehicleCategory::Small, 0);

        let rendered = coordinator.to_string_report();
        assert!(rendered.contains("IN-1"));
        assert!(rendered.contains("OUT-1"));
        assert!(rendered.contains("Waiting lane:  1 vehicles"));
    }
}
