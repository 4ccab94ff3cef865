use std::collections::VecDeque;

use crate::domain::garage::vehicle::Vehicle;

/// Unbounded FIFO lane for vehicles that could not park on arrival.
///
/// Positions are 1-based and counted from the front.
#[derive(Debug, Clone, Default)]
pub struct WaitingLane {
    vehicles: VecDeque<Vehicle>,
}

impl WaitingLane {
    pub fn new() -> Self {
        WaitingLane { vehicles: VecDeque::new() }
    }

    pub fn size(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn enqueue(&mut self, vehicle: Vehicle) {
        self.vehicles.push_back(vehicle);
    }

    /// Puts a vehicle back at the front, e.g. after a promotion that could not complete.
    pub(crate) fn requeue_front(&mut self, vehicle: Vehicle) {
        self.vehicles.push_front(vehicle);
    }

    pub fn dequeue(&mut self) -> Option<Vehicle> {
        self.vehicles.pop_front()
    }

    pub fn peek_front(&self) -> Option<&Vehicle> {
        self.vehicles.front()
    }

    /// # Returns
    /// The 1-based distance from the front, or `None` if the plate is not waiting.
    pub fn find_by_plate(&self, plate: &str) -> Option<usize> {
        self.vehicles.iter().position(|vehicle| vehicle.plate() == plate).map(|index| index + 1)
    }

    /// Vehicle at a front-relative position (`1` = front).
    pub fn read_at(&self, position: usize) -> Option<&Vehicle> {
        if position < 1 {
            return None;
        }
        self.vehicles.get(position - 1)
    }

    /// Removes a waiting vehicle from anywhere in the lane.
    ///
    /// The lane is drained into a fresh one, skipping the matching plate, and then replaced. Every
    /// other vehicle keeps its relative order.
    pub fn remove_by_plate(&mut self, plate: &str) -> Option<Vehicle> {
        let mut rebuilt = WaitingLane::new();
        let mut removed = None;

        while let Some(vehicle) = self.dequeue() {
            if removed.is_none() && vehicle.plate() == plate {
                removed = Some(vehicle);
            } else {
                rebuilt.enqueue(vehicle);
            }
        }

        *self = rebuilt;
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::garage::vehicle::VehicleCategory;

    fn car(plate: &str) -> Vehicle {
        Vehicle::new(plate, VehicleCategory::Medium, 10)
    }

    #[test]
    fn test_fifo_order() {
        let mut lane = WaitingLane::new();
        lane.enqueue(car("A"));
        lane.enqueue(car("B"));

        assert_eq!(lane.peek_front().unwrap().plate(), "A");
        assert_eq!(lane.dequeue().unwrap().plate(), "A");
        assert_eq!(lane.dequeue().unwrap().plate(), "B");
        assert!(lane.dequeue().is_none());
        assert!(lane.peek_front().is_none());
    }

    #[test]
    fn test_positions_count_from_front() {
        let mut lane = WaitingLane::new();
        for plate in ["A", "B", "C"] {
            lane.enqueue(car(plate));
        }

        assert_eq!(lane.find_by_plate("A"), Some(1));
        assert_eq!(lane.find_by_plate("C"), Some(3));
        assert_eq!(lane.find_by_plate("Q"), None);

        assert_eq!(lane.read_at(2).unwrap().plate(), "B");
        assert!(lane.read_at(0).is_none());
        assert!(lane.read_at(4).is_none());
    }

    #[test]
    fn test_remove_interior_vehicle_keeps_order() {
        let mut lane = WaitingLane::new();
        for plate in ["A", "B", "C", "D"] {
            lane.enqueue(car(plate));
        }

        let removed = lane.remove_by_plate("B").unwrap();
        assert_eq!(removed.plate(), "B");
        assert_eq!(lane.size(), 3);

        let remaining: Vec<String> = lane.iter().map(|v| v.plate().to_string()).collect();
        assert_eq!(remaining, vec!["A", "C", "D"]);

        assert!(lane.remove_by_plate("B").is_none());
        assert_eq!(lane.size(), 3);
    }
}
