use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::utils::id::LicensePlate;
use crate::error::Error;

/// Any partial hour, including a zero-length stay, is billed as one full hour.
pub const MIN_BILLED_HOURS: f64 = 1.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Size class of a vehicle.
///
/// The order is significant: `Small < Medium < Large`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Small,
    Medium,
    Large,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 3] = [VehicleCategory::Small, VehicleCategory::Medium, VehicleCategory::Large];

    /// Fee multiplier for the vehicle itself.
    pub fn fee_coefficient(self) -> f64 {
        match self {
            VehicleCategory::Small => 1.0,
            VehicleCategory::Medium => 1.5,
            VehicleCategory::Large => 2.0,
        }
    }

    /// The slot category with the same rank. Allocation only ever hands out this one.
    pub fn matching_slot(self) -> SlotCategory {
        match self {
            VehicleCategory::Small => SlotCategory::SmallSlot,
            VehicleCategory::Medium => SlotCategory::MediumSlot,
            VehicleCategory::Large => SlotCategory::LargeSlot,
        }
    }

    /// Numeric code used by the snapshot format and the original menu (0 small, 1 medium, 2 large).
    pub fn code(self) -> u8 {
        match self {
            VehicleCategory::Small => 0,
            VehicleCategory::Medium => 1,
            VehicleCategory::Large => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(VehicleCategory::Small),
            1 => Some(VehicleCategory::Medium),
            2 => Some(VehicleCategory::Large),
            _ => None,
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleCategory::Small => "small",
            VehicleCategory::Medium => "medium",
            VehicleCategory::Large => "large",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for VehicleCategory {
    type Err = Error;

    /// Accepts the category name (case-insensitive), its first letter or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "s" | "0" => Ok(VehicleCategory::Small),
            "medium" | "m" | "1" => Ok(VehicleCategory::Medium),
            "large" | "l" | "2" => Ok(VehicleCategory::Large),
            other => Err(Error::CommandParse(format!("unknown vehicle category '{}'", other))),
        }
    }
}

/// Physical classification of a garage space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotCategory {
    SmallSlot,
    MediumSlot,
    LargeSlot,
}

impl SlotCategory {
    pub const ALL: [SlotCategory; 3] = [SlotCategory::SmallSlot, SlotCategory::MediumSlot, SlotCategory::LargeSlot];

    /// Fee multiplier for the space the vehicle occupied.
    pub fn fee_coefficient(self) -> f64 {
        match self {
            SlotCategory::SmallSlot => 1.0,
            SlotCategory::MediumSlot => 1.2,
            SlotCategory::LargeSlot => 1.5,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            SlotCategory::SmallSlot => 0,
            SlotCategory::MediumSlot => 1,
            SlotCategory::LargeSlot => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SlotCategory::SmallSlot),
            1 => Some(SlotCategory::MediumSlot),
            2 => Some(SlotCategory::LargeSlot),
            _ => None,
        }
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotCategory::SmallSlot => "small slot",
            SlotCategory::MediumSlot => "medium slot",
            SlotCategory::LargeSlot => "large slot",
        };
        write!(f, "{}", name)
    }
}

/// A vehicle tracked by the garage or by the waiting lane.
///
/// Plate and category never change. `assigned_slot` is `Some` exactly while the vehicle stands in
/// the garage, `exit_time` is filled in when its departure is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    plate: LicensePlate,
    category: VehicleCategory,
    entry_time: i64,
    exit_time: Option<i64>,
    assigned_slot: Option<SlotCategory>,
}

impl Vehicle {
    pub fn new(plate: impl Into<String>, category: VehicleCategory, entry_time: i64) -> Self {
        Vehicle { plate: LicensePlate::new(plate), category, entry_time, exit_time: None, assigned_slot: None }
    }

    pub fn plate(&self) -> &LicensePlate {
        &self.plate
    }

    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    pub fn entry_time(&self) -> i64 {
        self.entry_time
    }

    pub fn exit_time(&self) -> Option<i64> {
        self.exit_time
    }

    pub fn assigned_slot(&self) -> Option<SlotCategory> {
        self.assigned_slot
    }

    pub fn set_exit_time(&mut self, time: i64) {
        self.exit_time = Some(time);
    }

    pub(crate) fn assign_slot(&mut self, slot: SlotCategory) {
        self.assigned_slot = Some(slot);
    }

    pub(crate) fn clear_slot(&mut self) {
        self.assigned_slot = None;
    }

    /// Returns `true` if this vehicle may legally stand in a space of the given category.
    ///
    /// A small vehicle only fits small slots, a medium vehicle small or medium ones and a large
    /// vehicle any slot. The coordinator's allocation never consults this rule.
    pub fn can_park_in(&self, slot: SlotCategory) -> bool {
        match self.category {
            VehicleCategory::Small => slot == SlotCategory::SmallSlot,
            VehicleCategory::Medium => slot == SlotCategory::SmallSlot || slot == SlotCategory::MediumSlot,
            VehicleCategory::Large => true,
        }
    }

    /// Seconds between entry and exit. `None` until an exit time has been recorded.
    pub fn parking_duration(&self) -> Option<i64> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }

    /// Computes the fee for this stay.
    ///
    /// Returns `None` if the vehicle has no exit time yet or was never assigned a slot.
    pub fn calculate_fee(&self, hourly_rate: f64) -> Option<f64> {
        let duration = self.parking_duration()?;
        let slot = self.assigned_slot?;

        let hours = (duration as f64 / SECONDS_PER_HOUR).max(MIN_BILLED_HOURS);

        Some(hours * hourly_rate * self.category.fee_coefficient() * slot.fee_coefficient())
    }
}
