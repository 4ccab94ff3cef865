use parking_garage::domain::garage::config::{EntryReshuffle, GarageConfig};
use parking_garage::domain::garage::coordinator::ParkingCoordinator;
use parking_garage::domain::garage::outcome::{ArrivalFailure, ArrivalOutcome, DepartureOutcome, VehicleLocation};
use parking_garage::domain::garage::vehicle::{SlotCategory, VehicleCategory};

const EPSILON: f64 = 1e-9;

fn small_garage(capacity: usize) -> ParkingCoordinator {
    ParkingCoordinator::new(GarageConfig::new(capacity, 5.0).with_slots(capacity, 0, 0))
}

fn plates_from_top(coordinator: &ParkingCoordinator) -> Vec<String> {
    coordinator.garage().iter_from_top().map(|vehicle| vehicle.plate().to_string()).collect()
}

fn assert_accounting(coordinator: &ParkingCoordinator) {
    assert_eq!(coordinator.ledger().used_total(), coordinator.occupied(), "Used slots must equal parked vehicles");
    assert!(coordinator.occupied() <= coordinator.total_capacity());
    assert!(coordinator.scratch_is_empty(), "Holding area must be empty between operations");
}

#[test]
fn test_departure_from_the_bottom_evicts_everyone_above() {
    let mut coordinator = small_garage(4);
    for (plate, time) in [("A", 0), ("B", 100), ("C", 200), ("D", 300)] {
        assert!(coordinator.arrival(plate, VehicleCategory::Small, time).is_parked());
    }
    assert_eq!(coordinator.find("A"), VehicleLocation::Garage(4));

    let outcome = coordinator.departure("A", 7200);
    let receipt = outcome.receipt().expect("A was parked");

    let evicted: Vec<&str> = receipt.evicted.iter().map(|plate| plate.as_str()).collect();
    assert_eq!(evicted, vec!["D", "C", "B"], "p - 1 vehicles leave, gate side first");
    assert_eq!(plates_from_top(&coordinator), vec!["D", "C", "B"], "Relative order is restored");
    assert_accounting(&coordinator);
}

#[test]
fn test_departure_from_the_top_moves_nobody() {
    let mut coordinator = small_garage(3);
    coordinator.arrival("A", VehicleCategory::Small, 0);
    coordinator.arrival("B", VehicleCategory::Small, 0);

    let outcome = coordinator.departure("B", 60);
    assert!(outcome.receipt().is_some_and(|receipt| receipt.evicted.is_empty()));
    assert_eq!(plates_from_top(&coordinator), vec!["A"]);
    assert_accounting(&coordinator);
}

#[test]
fn test_middle_departure_keeps_order_and_bills() {
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(3, 4.0).with_slots(1, 1, 1));
    coordinator.arrival("S", VehicleCategory::Small, 0);
    coordinator.arrival("M", VehicleCategory::Medium, 0);
    coordinator.arrival("L", VehicleCategory::Large, 0);

    let outcome = coordinator.departure("M", 3 * 3600);
    let receipt = outcome.receipt().expect("M was parked");

    // 3 h * 4.0 * 1.5 (medium) * 1.2 (medium slot)
    assert!((receipt.fee - 21.6).abs() < EPSILON, "fee was {}", receipt.fee);
    assert_eq!(receipt.slot, SlotCategory::MediumSlot);
    assert_eq!(receipt.duration_s, 3 * 3600);
    assert_eq!(plates_from_top(&coordinator), vec!["L", "S"]);
    assert_eq!(coordinator.ledger().medium.used, 0);
    assert_accounting(&coordinator);
}

#[test]
fn test_short_stay_is_billed_one_hour() {
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(1, 5.0).with_slots(0, 0, 1));
    coordinator.arrival("L", VehicleCategory::Large, 1_000);

    // 1 h minimum * 5.0 * 2.0 * 1.5
    let fee = coordinator.departure("L", 1_000).fee().expect("L was parked");
    assert!((fee - 15.0).abs() < EPSILON);
}

#[test]
fn test_full_churn_cycles_everyone_without_changing_order() {
    let config = GarageConfig::new(3, 5.0).with_slots(3, 0, 0).with_entry_reshuffle(EntryReshuffle::FullChurn);
    let mut coordinator = ParkingCoordinator::new(config);
    coordinator.arrival("A", VehicleCategory::Small, 0);
    coordinator.arrival("B", VehicleCategory::Small, 1);

    match coordinator.arrival("C", VehicleCategory::Small, 2) {
        ArrivalOutcome::Parked { churned, .. } => {
            let churned: Vec<&str> = churned.iter().map(|plate| plate.as_str()).collect();
            assert_eq!(churned, vec!["B", "A"]);
        }
        other => panic!("C should park, got {:?}", other),
    }

    assert_eq!(plates_from_top(&coordinator), vec!["C", "B", "A"]);
    assert_accounting(&coordinator);
}

#[test]
fn test_minimal_entry_moves_nobody() {
    let mut coordinator = small_garage(3);
    coordinator.arrival("A", VehicleCategory::Small, 0);

    assert_eq!(coordinator.arrival("B", VehicleCategory::Small, 1), ArrivalOutcome::Parked { slot: SlotCategory::SmallSlot, churned: Vec::new() });
}

#[test]
fn test_duplicate_plate_is_rejected_without_state_change() {
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(1, 5.0).with_slots(1, 0, 0));
    coordinator.arrival("A", VehicleCategory::Small, 0);
    coordinator.arrival("W", VehicleCategory::Small, 0);

    assert_eq!(coordinator.arrival("A", VehicleCategory::Small, 5), ArrivalOutcome::Failure(ArrivalFailure::DuplicateVehicle));
    assert_eq!(coordinator.arrival("W", VehicleCategory::Large, 5), ArrivalOutcome::Failure(ArrivalFailure::DuplicateVehicle));
    assert_eq!(coordinator.occupied(), 1);
    assert_eq!(coordinator.waiting_lane_length(), 1);
}

#[test]
fn test_slot_totals_above_capacity_surface_as_failure() {
    // Two small slots but only one physical space.
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(1, 5.0).with_slots(2, 0, 0));
    coordinator.arrival("A", VehicleCategory::Small, 0);

    let outcome = coordinator.arrival("B", VehicleCategory::Small, 1);
    assert_eq!(outcome, ArrivalOutcome::Failure(ArrivalFailure::SlotAllocationInconsistency(SlotCategory::SmallSlot)));
    assert_eq!(coordinator.ledger().small.used, 1, "The granted slot is given back");
    assert_eq!(coordinator.find("B"), VehicleLocation::NotTracked);
    assert_accounting(&coordinator);
}

#[test]
fn test_unknown_plate_changes_nothing() {
    let mut coordinator = small_garage(2);
    coordinator.arrival("A", VehicleCategory::Small, 0);
    let before = coordinator.report();

    assert_eq!(coordinator.departure("ZZZ", 10), DepartureOutcome::NotFound);
    assert_eq!(coordinator.report(), before);
}

#[test]
fn test_exact_match_only() {
    // A free large slot is never handed to a small car.
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(2, 5.0).with_slots(0, 0, 2));
    assert!(coordinator.arrival("S", VehicleCategory::Small, 0).is_diverted());
    assert_eq!(coordinator.occupied(), 0);
    assert_eq!(coordinator.available_spaces(), 2);
}
