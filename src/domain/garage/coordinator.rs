use crate::domain::garage::config::{EntryReshuffle, GarageConfig};
use crate::domain::garage::outcome::{ArrivalFailure, ArrivalOutcome, DepartureOutcome, DepartureReceipt, VehicleLocation};
use crate::domain::garage::queue::WaitingLane;
use crate::domain::garage::slot_ledger::SlotLedger;
use crate::domain::garage::stack::ParkingStack;
use crate::domain::garage::vehicle::{Vehicle, VehicleCategory};
use crate::domain::utils::id::LicensePlate;
use crate::error::{Error, Result};

/// Single-gate garage with an overflow lane.
///
/// The garage is a stack: the most recent arrival stands next to the gate and only the top
/// vehicle can drive out directly. A vehicle further inside leaves by first moving every vehicle
/// above it into a holding area (the scratch stack), driving out, and letting the others back in
/// in their original order. Vehicles for which no slot of their category is free wait in a FIFO
/// lane and are promoted, front first, whenever a departure frees a matching slot.
///
/// All containers are owned here and only mutated through the operations below. The scratch
/// stack is empty whenever control returns to the caller.
#[derive(Debug, Clone)]
pub struct ParkingCoordinator {
    config: GarageConfig,
    garage: ParkingStack,
    waiting_lane: WaitingLane,
    scratch: ParkingStack,
    ledger: SlotLedger,
}

impl ParkingCoordinator {
    pub fn new(config: GarageConfig) -> Self {
        log::debug!(
            "Creating garage: capacity {}, rate {:.2}/h, slots {}/{}/{}",
            config.max_capacity,
            config.hourly_rate,
            config.small_spaces,
            config.medium_spaces,
            config.large_spaces
        );

        ParkingCoordinator {
            garage: ParkingStack::new(config.max_capacity),
            waiting_lane: WaitingLane::new(),
            scratch: ParkingStack::new(config.max_capacity),
            ledger: config.ledger(),
            config,
        }
    }

    /// Rebuilds a coordinator from restored parts. Used by the snapshot loader.
    pub(crate) fn from_parts(config: GarageConfig, ledger: SlotLedger, garage: ParkingStack, waiting_lane: WaitingLane) -> Self {
        ParkingCoordinator { scratch: ParkingStack::new(config.max_capacity), config, garage, waiting_lane, ledger }
    }

    /// Drops every tracked vehicle and starts over with a new configuration.
    pub fn reset(&mut self, config: GarageConfig) {
        log::info!(
            "Resetting garage ({} parked, {} waiting dropped). New capacity: {}",
            self.garage.size(),
            self.waiting_lane.size(),
            config.max_capacity
        );
        *self = ParkingCoordinator::new(config);
    }

    /// Changes the per-category slot totals.
    ///
    /// # Errors
    /// `Error::InvalidConfiguration` while any vehicle is parked, since the used counters would no
    /// longer describe the vehicles in the garage.
    pub fn set_slot_totals(&mut self, small: usize, medium: usize, large: usize) -> Result<()> {
        if !self.garage.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "cannot change slot totals while {} vehicle(s) are parked",
                self.garage.size()
            )));
        }

        self.config = self.config.clone().with_slots(small, medium, large);
        self.ledger = self.config.ledger();
        self.config.warn_on_slot_mismatch();
        Ok(())
    }

    pub fn set_entry_reshuffle(&mut self, entry_reshuffle: EntryReshuffle) {
        self.config.entry_reshuffle = entry_reshuffle;
    }

    //-----------------
    // --- Arrival ---
    //-----------------

    /// Handles a vehicle arriving at the gate at `arrival_time` (seconds).
    ///
    /// The vehicle parks if a slot of exactly its category is free, otherwise it joins the back
    /// of the waiting lane. A plate that is already tracked is rejected.
    pub fn arrival(&mut self, plate: &str, category: VehicleCategory, arrival_time: i64) -> ArrivalOutcome {
        if !is_valid_plate(plate) {
            log::warn!("Arrival of {:?} rejected: plate is empty or contains whitespace.", plate);
            return ArrivalOutcome::Failure(ArrivalFailure::InvalidPlate);
        }

        if self.find(plate) != VehicleLocation::NotTracked {
            log::warn!("Arrival of {} rejected: plate is already tracked.", plate);
            return ArrivalOutcome::Failure(ArrivalFailure::DuplicateVehicle);
        }

        let mut vehicle = Vehicle::new(plate, category, arrival_time);

        if !self.ledger.has_suitable_slot(category) {
            self.waiting_lane.enqueue(vehicle);
            let position = self.waiting_lane.size();
            log::info!("No free {} for {} ({}). Diverted to waiting lane position {}.", category.matching_slot(), plate, category, position);
            return ArrivalOutcome::Diverted { position };
        }

        let Some(slot) = self.ledger.allocate(category) else {
            log::error!("Ledger reported a free {} for {} but refused to allocate it.", category.matching_slot(), plate);
            return ArrivalOutcome::Failure(ArrivalFailure::SlotAllocationInconsistency(category.matching_slot()));
        };
        vehicle.assign_slot(slot);

        let churned = if self.garage.is_empty() { Vec::new() } else { self.entry_reshuffle() };

        match self.garage.push(vehicle) {
            Ok(()) => {
                log::info!("{} ({}) parked in a {} next to the gate. Occupancy {}/{}.", plate, category, slot, self.garage.size(), self.config.max_capacity);
                ArrivalOutcome::Parked { slot, churned }
            }
            Err(_) => {
                self.ledger.release(slot);
                log::error!("{}", Error::SlotAllocationInconsistency { plate: plate.to_string(), slot: slot.to_string() });
                ArrivalOutcome::Failure(ArrivalFailure::SlotAllocationInconsistency(slot))
            }
        }
    }

    /// Makes room at the gate for an arriving vehicle.
    ///
    /// New vehicles always go on top, so with `Minimal` nobody has to move. `FullChurn` sends every
    /// parked vehicle through the holding area and back, which leaves their order unchanged.
    fn entry_reshuffle(&mut self) -> Vec<LicensePlate> {
        match self.config.entry_reshuffle {
            EntryReshuffle::Minimal => {
                log::debug!("Gate position is free, no vehicle has to make way.");
                Vec::new()
            }
            EntryReshuffle::FullChurn => {
                let evicted = self.evict_to_scratch(self.garage.size());
                self.restore_from_scratch();
                evicted
            }
        }
    }

    //-------------------
    // --- Departure ---
    //-------------------

    /// Handles a vehicle leaving at `departure_time` (seconds).
    ///
    /// A parked vehicle pays for its stay and may force the vehicles between it and the gate to
    /// make way. A waiting vehicle just leaves the lane without paying.
    pub fn departure(&mut self, plate: &str, departure_time: i64) -> DepartureOutcome {
        if let Some(position) = self.garage.find_by_plate(plate) {
            return self.depart_from_garage(plate, position, departure_time);
        }

        if let Some(position) = self.waiting_lane.find_by_plate(plate) {
            return match self.waiting_lane.remove_by_plate(plate) {
                Some(vehicle) => {
                    log::info!("{} left the waiting lane from position {}. No fee charged.", plate, position);
                    DepartureOutcome::LeftWaitingLane { plate: vehicle.plate().clone(), position }
                }
                None => DepartureOutcome::NotFound,
            };
        }

        log::warn!("Departure of {} failed: vehicle is neither parked nor waiting.", plate);
        DepartureOutcome::NotFound
    }

    fn depart_from_garage(&mut self, plate: &str, position: usize, departure_time: i64) -> DepartureOutcome {
        log::info!("{} departs from position {}. {} vehicle(s) have to make way.", plate, position, position - 1);

        let evicted = self.evict_to_scratch(position - 1);

        let departing = match self.garage.pop() {
            Some(vehicle) if vehicle.plate() == plate => vehicle,
            other => {
                log::error!("Expected {} on top after clearing the gate, found {:?}. Undoing the reshuffle.", plate, other.as_ref().map(|v| v.plate()));
                if let Some(vehicle) = other {
                    if let Err(vehicle) = self.garage.push(vehicle) {
                        log::error!("Garage rejected {} while undoing the reshuffle. Vehicle dropped from tracking.", vehicle.plate());
                    }
                }
                self.restore_from_scratch();
                return DepartureOutcome::NotFound;
            }
        };

        let receipt = self.settle(departing, departure_time, evicted);

        self.restore_from_scratch();
        debug_assert!(self.scratch.is_empty(), "holding area must be empty after a departure");

        let promoted = self.promote_from_waiting_lane();

        DepartureOutcome::Departed(DepartureReceipt { promoted, ..receipt })
    }

    /// Records the exit, computes the fee and gives the slot back.
    fn settle(&mut self, mut vehicle: Vehicle, departure_time: i64, evicted: Vec<LicensePlate>) -> DepartureReceipt {
        vehicle.set_exit_time(departure_time);

        if departure_time < vehicle.entry_time() {
            log::warn!("{} departs at {} before its entry at {}. Billing the minimum.", vehicle.plate(), departure_time, vehicle.entry_time());
        }

        let slot = vehicle.assigned_slot().unwrap_or_else(|| {
            log::error!("Parked vehicle {} carries no slot. Assuming its matching slot.", vehicle.plate());
            vehicle.category().matching_slot()
        });
        vehicle.assign_slot(slot);

        let fee = vehicle.calculate_fee(self.config.hourly_rate).unwrap_or(0.0);
        let duration_s = vehicle.parking_duration().unwrap_or(0);

        self.ledger.release(slot);

        log::info!("{} drove out through the gate. Stay: {}s, fee: {:.2}", vehicle.plate(), duration_s, fee);

        DepartureReceipt {
            plate: vehicle.plate().clone(),
            category: vehicle.category(),
            slot,
            entry_time: vehicle.entry_time(),
            exit_time: departure_time,
            duration_s,
            fee,
            evicted,
            promoted: None,
        }
    }

    //------------------
    // --- Reshuffle ---
    //------------------

    /// Moves `count` vehicles from the top of the garage into the holding area.
    ///
    /// # Returns
    /// The plates in eviction order (gate side first).
    fn evict_to_scratch(&mut self, count: usize) -> Vec<LicensePlate> {
        let mut evicted = Vec::with_capacity(count);

        for _ in 0..count {
            let Some(vehicle) = self.garage.pop() else {
                log::error!("Garage ran empty after evicting {} of {} vehicles.", evicted.len(), count);
                break;
            };

            let plate = vehicle.plate().clone();
            if let Err(vehicle) = self.scratch.push(vehicle) {
                log::error!("Holding area is full, {} stays in the garage.", plate);
                if let Err(vehicle) = self.garage.push(vehicle) {
                    log::error!("Garage rejected {} on its way back from a full holding area. Vehicle dropped from tracking.", vehicle.plate());
                }
                break;
            }

            log::info!("  {} makes way and waits in the holding area.", plate);
            evicted.push(plate);
        }

        if !evicted.is_empty() {
            let order: Vec<&str> = evicted.iter().map(|p| p.as_str()).collect();
            log::info!("Holding area entry order: {}", order.join(" -> "));
        }

        evicted
    }

    /// Drains the holding area back into the garage.
    ///
    /// The last vehicle moved out comes back first, so the vehicles regain their original order.
    fn restore_from_scratch(&mut self) -> Vec<LicensePlate> {
        let mut restored = Vec::with_capacity(self.scratch.size());

        while let Some(vehicle) = self.scratch.pop() {
            let plate = vehicle.plate().clone();

            if let Err(mut vehicle) = self.garage.push(vehicle) {
                log::error!("Garage rejected returning vehicle {}. Sending it to the front of the waiting lane.", plate);
                if let Some(slot) = vehicle.assigned_slot() {
                    self.ledger.release(slot);
                }
                vehicle.clear_slot();
                self.waiting_lane.requeue_front(vehicle);
                continue;
            }

            log::info!("  {} returns to the garage.", plate);
            restored.push(plate);
        }

        if !restored.is_empty() {
            let order: Vec<&str> = restored.iter().map(|p| p.as_str()).collect();
            log::info!("Garage re-entry order: {}", order.join(" -> "));
        }

        restored
    }

    //------------------
    // --- Promotion ---
    //------------------

    /// Moves the front waiting vehicle into the garage if a slot of its category is free.
    ///
    /// Only the front vehicle is considered. If it cannot park, nobody behind it may skip ahead.
    ///
    /// # Returns
    /// The plate of the promoted vehicle.
    pub fn promote_from_waiting_lane(&mut self) -> Option<LicensePlate> {
        if self.waiting_lane.is_empty() || self.is_full() {
            return None;
        }

        let category = self.waiting_lane.peek_front()?.category();

        if !self.ledger.has_suitable_slot(category) {
            log::debug!("Front waiting vehicle needs a {}, none is free.", category.matching_slot());
            return None;
        }

        let slot = self.ledger.allocate(category)?;
        let mut vehicle = self.waiting_lane.dequeue()?;
        vehicle.assign_slot(slot);
        let plate = vehicle.plate().clone();

        match self.garage.push(vehicle) {
            Ok(()) => {
                log::info!("{} moved from the waiting lane into a {}.", plate, slot);
                Some(plate)
            }
            Err(mut vehicle) => {
                self.ledger.release(slot);
                vehicle.clear_slot();
                self.waiting_lane.requeue_front(vehicle);
                log::error!("{}", Error::SlotAllocationInconsistency { plate: plate.to_string(), slot: slot.to_string() });
                None
            }
        }
    }

    //----------------
    // --- Queries ---
    //----------------

    pub fn find(&self, plate: &str) -> VehicleLocation {
        if let Some(position) = self.garage.find_by_plate(plate) {
            VehicleLocation::Garage(position)
        } else if let Some(position) = self.waiting_lane.find_by_plate(plate) {
            VehicleLocation::WaitingLane(position)
        } else {
            VehicleLocation::NotTracked
        }
    }

    pub fn config(&self) -> &GarageConfig {
        &self.config
    }

    pub fn hourly_rate(&self) -> f64 {
        self.config.hourly_rate
    }

    pub fn total_capacity(&self) -> usize {
        self.config.max_capacity
    }

    pub fn occupied(&self) -> usize {
        self.garage.size()
    }

    pub fn available_spaces(&self) -> usize {
        self.config.max_capacity.saturating_sub(self.garage.size())
    }

    pub fn has_available_space(&self) -> bool {
        self.garage.size() < self.config.max_capacity
    }

    pub fn is_full(&self) -> bool {
        !self.has_available_space()
    }

    pub fn waiting_lane_length(&self) -> usize {
        self.waiting_lane.size()
    }

    pub fn ledger(&self) -> &SlotLedger {
        &self.ledger
    }

    pub fn garage(&self) -> &ParkingStack {
        &self.garage
    }

    pub fn waiting_lane(&self) -> &WaitingLane {
        &self.waiting_lane
    }

    pub fn scratch_is_empty(&self) -> bool {
        self.scratch.is_empty()
    }
}

/// Plates are stored in whitespace-delimited snapshots, so they must be a single token.
fn is_valid_plate(plate: &str) -> bool {
    !plate.is_empty() && !plate.chars().any(char::is_whitespace)
}

impl Default for ParkingCoordinator {
    fn default() -> Self {
        ParkingCoordinator::new(GarageConfig::default())
    }
}
