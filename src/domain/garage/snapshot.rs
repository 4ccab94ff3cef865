//! Plain-text persistence of the coordinator.
//!
//! The format is whitespace-delimited with one record per line:
//!
//! ```text
//! <maxCapacity> <hourlyRate>
//! <smallSpaces> <mediumSpaces> <largeSpaces>
//! <usedSmall> <usedMedium> <usedLarge>
//! <garageCount>
//! <plate> <category> <entryTime> <slot>      (garageCount lines, bottom to top)
//! <laneCount>
//! <plate> <category> <entryTime>             (laneCount lines, front to rear)
//! ```
//!
//! Categories and slots are stored as their numeric codes (0 small, 1 medium, 2 large). Files that
//! stop after the third line, or that carry counts without vehicle records, only restore the
//! configuration.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::SplitWhitespace;

use crate::domain::garage::config::GarageConfig;
use crate::domain::garage::coordinator::ParkingCoordinator;
use crate::domain::garage::queue::WaitingLane;
use crate::domain::garage::stack::ParkingStack;
use crate::domain::garage::vehicle::{SlotCategory, Vehicle, VehicleCategory};
use crate::error::{Error, Result};

impl ParkingCoordinator {
    pub fn to_snapshot_string(&self) -> String {
        let config = self.config();
        let ledger = self.ledger();
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {}", config.max_capacity, config.hourly_rate);
        let _ = writeln!(out, "{} {} {}", ledger.small.total, ledger.medium.total, ledger.large.total);
        let _ = writeln!(out, "{} {} {}", ledger.small.used, ledger.medium.used, ledger.large.used);

        let _ = writeln!(out, "{}", self.garage().size());
        for vehicle in self.garage().iter_from_bottom() {
            let slot = vehicle.assigned_slot().unwrap_or_else(|| vehicle.category().matching_slot());
            let _ = writeln!(out, "{} {} {} {}", vehicle.plate(), vehicle.category().code(), vehicle.entry_time(), slot.code());
        }

        let _ = writeln!(out, "{}", self.waiting_lane().size());
        for vehicle in self.waiting_lane().iter() {
            let _ = writeln!(out, "{} {} {}", vehicle.plate(), vehicle.category().code(), vehicle.entry_time());
        }

        out
    }

    /// Parses a snapshot produced by [`ParkingCoordinator::to_snapshot_string`].
    ///
    /// The used counters are recomputed from the restored garage. A disagreement with the stored
    /// counters is logged and the recomputed values win.
    pub fn from_snapshot_str(input: &str) -> Result<Self> {
        let mut reader = SnapshotReader::new(input);

        let (max_capacity, hourly_rate) = {
            let (line, mut fields) = reader.required_line("capacity and hourly rate")?;
            let capacity: usize = parse_field(&mut fields, line, "maxCapacity")?;
            let rate: f64 = parse_field(&mut fields, line, "hourlyRate")?;
            (capacity, rate)
        };

        if !hourly_rate.is_finite() || hourly_rate < 0.0 {
            return Err(Error::SnapshotFormat { line: 1, reason: format!("hourly rate {} is not a non-negative number", hourly_rate) });
        }

        let (small, medium, large) = {
            let (line, mut fields) = reader.required_line("slot totals")?;
            (parse_field(&mut fields, line, "smallSpaces")?, parse_field(&mut fields, line, "mediumSpaces")?, parse_field(&mut fields, line, "largeSpaces")?)
        };

        let stored_used: [usize; 3] = {
            let (line, mut fields) = reader.required_line("used slot counts")?;
            [parse_field(&mut fields, line, "usedSmall")?, parse_field(&mut fields, line, "usedMedium")?, parse_field(&mut fields, line, "usedLarge")?]
        };

        let config = GarageConfig::new(max_capacity, hourly_rate).with_slots(small, medium, large);
        let mut ledger = config.ledger();
        let mut garage = ParkingStack::new(max_capacity);
        let mut waiting_lane = WaitingLane::new();

        let garage_records = reader.optional_count("garage vehicle count")?;
        if let Some(count) = garage_records {
            for _ in 0..count {
                if !reader.next_is_record() {
                    log::warn!("Snapshot announces {} parked vehicles but carries no records. Restoring configuration only.", count);
                    break;
                }
                let Some((line, mut fields)) = reader.next_line() else {
                    break;
                };

                let plate: String = parse_field(&mut fields, line, "plate")?;
                let category = parse_category(&mut fields, line)?;
                let entry_time: i64 = parse_field(&mut fields, line, "entryTime")?;
                let slot_code: u8 = parse_field(&mut fields, line, "slot")?;
                let slot = SlotCategory::from_code(slot_code)
                    .ok_or_else(|| Error::SnapshotFormat { line, reason: format!("unknown slot code {}", slot_code) })?;

                if garage.find_by_plate(&plate).is_some() {
                    return Err(Error::SnapshotFormat { line, reason: format!("plate {} appears twice", plate) });
                }

                let usage = *ledger.usage(slot);
                if usage.used >= usage.total {
                    return Err(Error::SnapshotFormat { line, reason: format!("more vehicles in {}s than configured", slot) });
                }
                ledger.set_used(slot, usage.used + 1);

                let mut vehicle = Vehicle::new(plate, category, entry_time);
                vehicle.assign_slot(slot);
                garage
                    .push(vehicle)
                    .map_err(|_| Error::SnapshotFormat { line, reason: format!("more parked vehicles than the capacity of {}", max_capacity) })?;
            }
        }

        if let Some(count) = reader.optional_count("waiting lane count")? {
            for _ in 0..count {
                if !reader.next_is_record() {
                    log::warn!("Snapshot announces {} waiting vehicles but carries no records.", count);
                    break;
                }
                let Some((line, mut fields)) = reader.next_line() else {
                    break;
                };

                let plate: String = parse_field(&mut fields, line, "plate")?;
                let category = parse_category(&mut fields, line)?;
                let entry_time: i64 = parse_field(&mut fields, line, "entryTime")?;

                if garage.find_by_plate(&plate).is_some() || waiting_lane.find_by_plate(&plate).is_some() {
                    return Err(Error::SnapshotFormat { line, reason: format!("plate {} appears twice", plate) });
                }

                waiting_lane.enqueue(Vehicle::new(plate, category, entry_time));
            }
        }

        let recomputed = [ledger.small.used, ledger.medium.used, ledger.large.used];
        if recomputed != stored_used {
            log::warn!("Stored used counts {:?} do not match the restored garage {:?}. Using the restored counts.", stored_used, recomputed);
        }

        config.warn_on_slot_mismatch();
        log::info!("Snapshot restored: {} parked, {} waiting.", garage.size(), waiting_lane.size());

        Ok(ParkingCoordinator::from_parts(config, ledger, garage, waiting_lane))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_snapshot_string())?;
        log::info!("Garage saved to '{}'.", path.as_ref().display());
        Ok(())
    }

    /// Replaces the current state with the snapshot stored at `path`.
    ///
    /// On error the coordinator is left untouched. The entry reshuffle policy is not part of the
    /// snapshot and carries over from the current configuration.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let data = fs::read_to_string(path.as_ref())?;
        let mut restored = ParkingCoordinator::from_snapshot_str(&data)?;
        restored.set_entry_reshuffle(self.config().entry_reshuffle);
        *self = restored;
        log::info!("Garage loaded from '{}'.", path.as_ref().display());
        Ok(())
    }
}

struct SnapshotReader<'a> {
    /// Non-blank lines with their 1-based line numbers.
    lines: Vec<(usize, &'a str)>,
    cursor: usize,
}

impl<'a> SnapshotReader<'a> {
    fn new(input: &'a str) -> Self {
        let lines = input.lines().enumerate().filter(|(_, line)| !line.trim().is_empty()).map(|(index, line)| (index + 1, line)).collect();
        SnapshotReader { lines, cursor: 0 }
    }

    fn next_line(&mut self) -> Option<(usize, SplitWhitespace<'a>)> {
        let (number, line) = *self.lines.get(self.cursor)?;
        self.cursor += 1;
        Some((number, line.split_whitespace()))
    }

    /// Vehicle records have several fields, counts have exactly one.
    fn next_is_record(&self) -> bool {
        self.lines.get(self.cursor).is_some_and(|(_, line)| line.split_whitespace().count() > 1)
    }

    fn required_line(&mut self, what: &str) -> Result<(usize, SplitWhitespace<'a>)> {
        let expected_line = self.lines.get(self.cursor.wrapping_sub(1)).map(|(number, _)| number + 1).unwrap_or(1);
        self.next_line().ok_or_else(|| Error::SnapshotFormat { line: expected_line, reason: format!("missing {}", what) })
    }

    fn optional_count(&mut self, what: &str) -> Result<Option<usize>> {
        match self.next_line() {
            Some((line, mut fields)) => Ok(Some(parse_field(&mut fields, line, what)?)),
            None => Ok(None),
        }
    }
}

fn parse_field<T: std::str::FromStr>(fields: &mut SplitWhitespace<'_>, line: usize, name: &str) -> Result<T> {
    let raw = fields.next().ok_or_else(|| Error::SnapshotFormat { line, reason: format!("missing field '{}'", name) })?;
    raw.parse::<T>().map_err(|_| Error::SnapshotFormat { line, reason: format!("invalid value '{}' for '{}'", raw, name) })
}

fn parse_category(fields: &mut SplitWhitespace<'_>, line: usize) -> Result<VehicleCategory> {
    let code: u8 = parse_field(fields, line, "category")?;
    VehicleCategory::from_code(code).ok_or_else(|| Error::SnapshotFormat { line, reason: format!("unknown category code {}", code) })
}
