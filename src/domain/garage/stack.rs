use crate::domain::garage::vehicle::Vehicle;

/// Capacity-bounded LIFO container of vehicles.
///
/// Index `0` of the backing vector is the bottom (earliest arrival, farthest from the gate), the
/// last element is the top (nearest the gate). Positions handed out by this type are 1-based and
/// counted from the top: position `1` is the top, position `size()` the bottom.
#[derive(Debug, Clone)]
pub struct ParkingStack {
    vehicles: Vec<Vehicle>,
    capacity: usize,
}

impl ParkingStack {
    pub fn new(capacity: usize) -> Self {
        ParkingStack { vehicles: Vec::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.vehicles.len() >= self.capacity
    }

    /// Places a vehicle on top.
    ///
    /// # Returns
    /// `Err(vehicle)` without touching the stack if it is already at capacity.
    pub fn push(&mut self, vehicle: Vehicle) -> Result<(), Vehicle> {
        if self.is_full() {
            return Err(vehicle);
        }

        self.vehicles.push(vehicle);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Vehicle> {
        self.vehicles.pop()
    }

    pub fn peek(&self) -> Option<&Vehicle> {
        self.vehicles.last()
    }

    /// Scans from the top towards the bottom.
    ///
    /// # Returns
    /// The 1-based distance from the top, or `None` if no vehicle carries this plate.
    pub fn find_by_plate(&self, plate: &str) -> Option<usize> {
        self.vehicles.iter().rev().position(|vehicle| vehicle.plate() == plate).map(|index| index + 1)
    }

    /// Vehicle at a top-relative position (`1` = top).
    pub fn read_at(&self, position: usize) -> Option<&Vehicle> {
        let index = self.index_of(position)?;
        self.vehicles.get(index)
    }

    /// Removes the vehicle at a top-relative position, shifting everyone above it down by one
    /// slot. The relative order of the remaining vehicles is unchanged.
    pub fn remove_at(&mut self, position: usize) -> Option<Vehicle> {
        let index = self.index_of(position)?;
        Some(self.vehicles.remove(index))
    }

    /// Iterates from the top (gate side) to the bottom.
    pub fn iter_from_top(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter().rev()
    }

    /// Iterates from the bottom (earliest arrival) to the top.
    pub fn iter_from_bottom(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    fn index_of(&self, position: usize) -> Option<usize> {
        if position < 1 || position > self.vehicles.len() {
            return None;
        }

        Some(self.vehicles.len() - position)
    }
}
