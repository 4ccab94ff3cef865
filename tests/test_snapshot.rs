use std::fs;
use std::path::PathBuf;

use parking_garage::domain::garage::config::{EntryReshuffle, GarageConfig};
use parking_garage::domain::garage::coordinator::ParkingCoordinator;
use parking_garage::domain::garage::outcome::{ArrivalFailure, ArrivalOutcome, VehicleLocation};
use parking_garage::domain::garage::vehicle::{SlotCategory, VehicleCategory};
use parking_garage::domain::traffic::GarageEvent;
use parking_garage::error::Error;
use parking_garage::loader::parser::parse_events;

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("parking_garage_{}_{}.txt", name, std::process::id()))
}

fn busy_garage() -> ParkingCoordinator {
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(3, 2.5).with_slots(1, 1, 1));
    coordinator.arrival("S-1", VehicleCategory::Small, 100);
    coordinator.arrival("L-1", VehicleCategory::Large, 200);
    coordinator.arrival("S-2", VehicleCategory::Small, 300);
    coordinator.arrival("M-1", VehicleCategory::Medium, 400);
    coordinator
}

#[test]
fn test_save_and_load_restores_vehicles_and_order() {
    let original = busy_garage();
    let path = temp_file("round_trip");
    original.save_to_file(&path).unwrap();

    let mut restored = ParkingCoordinator::default();
    restored.load_from_file(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(restored.report(), original.report());
    assert_eq!(restored.find("S-1"), VehicleLocation::Garage(3));
    assert_eq!(restored.find("S-2"), VehicleLocation::WaitingLane(1));
    assert_eq!(restored.ledger().used_total(), 3);

    // The restored garage keeps working: S-1 leaves from the bottom.
    let outcome = restored.departure("S-1", 3700);
    let receipt = outcome.receipt().expect("S-1 was parked");
    assert_eq!(receipt.evicted.len(), 2);
    assert_eq!(receipt.slot, SlotCategory::SmallSlot);
    assert_eq!(receipt.promoted.as_ref().map(|plate| plate.as_str()), Some("S-2"));
}

#[test]
fn test_snapshot_text_layout() {
    let text = busy_garage().to_snapshot_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "3 2.5");
    assert_eq!(lines[1], "1 1 1");
    assert_eq!(lines[2], "1 1 1");
    assert_eq!(lines[3], "3");
    assert_eq!(lines[4], "S-1 0 100 0", "Garage records start at the bottom");
    assert_eq!(lines[7], "1");
    assert_eq!(lines[8], "S-2 0 300");
}

#[test]
fn test_stale_used_counts_are_recomputed() {
    let input = "2 5\n1 0 1\n0 0 0\n1\nX 0 10 0\n0\n";
    let coordinator = ParkingCoordinator::from_snapshot_str(input).unwrap();

    assert_eq!(coordinator.ledger().small.used, 1);
    assert_eq!(coordinator.occupied(), 1);
}

#[test]
fn test_failed_load_keeps_current_state() {
    let path = temp_file("broken");
    fs::write(&path, "not a snapshot\n").unwrap();

    let mut coordinator = busy_garage();
    let before = coordinator.report();
    let result = coordinator.load_from_file(&path);
    let _ = fs::remove_file(&path);

    assert!(matches!(result, Err(Error::SnapshotFormat { line: 1, .. })));
    assert_eq!(coordinator.report(), before);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let mut coordinator = ParkingCoordinator::default();
    let result = coordinator.load_from_file(temp_file("does_not_exist"));
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_load_keeps_entry_policy() {
    let path = temp_file("policy");
    busy_garage().save_to_file(&path).unwrap();

    let mut coordinator = ParkingCoordinator::new(GarageConfig::default().with_entry_reshuffle(EntryReshuffle::FullChurn));
    coordinator.load_from_file(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(coordinator.config().entry_reshuffle, EntryReshuffle::FullChurn);
}

#[test]
fn test_plates_that_cannot_be_stored_are_rejected() {
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(3, 5.0).with_slots(3, 0, 0));
    coordinator.arrival("OK-1", VehicleCategory::Small, 0);

    // Field trimming only strips the ends, the inner space survives.
    let events = parse_events("action,plate,category,time\nA, AB 12 ,small,5\n").unwrap();
    let event = GarageEvent::try_from(events[0].clone()).unwrap();
    assert_eq!(event.plate().as_str(), "AB 12");

    let rejected = ArrivalOutcome::Failure(ArrivalFailure::InvalidPlate);
    assert_eq!(coordinator.arrival("AB 12", VehicleCategory::Small, 5), rejected);
    assert_eq!(coordinator.arrival("", VehicleCategory::Small, 5), rejected);
    assert_eq!(coordinator.arrival("TAB\t1", VehicleCategory::Small, 5), rejected);
    assert_eq!(coordinator.occupied(), 1);
    assert_eq!(coordinator.waiting_lane_length(), 0);

    let restored = ParkingCoordinator::from_snapshot_str(&coordinator.to_snapshot_string()).unwrap();
    assert_eq!(restored.report(), coordinator.report());
}

#[test]
fn test_every_tracked_plate_survives_a_file_round_trip() {
    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(1, 5.0).with_slots(1, 0, 0));
    for (plate, time) in [("A", 0), ("B-2", 10), ("", 20), ("C 3", 30)] {
        coordinator.arrival(plate, VehicleCategory::Small, time);
    }

    let path = temp_file("plates");
    coordinator.save_to_file(&path).unwrap();
    let mut restored = ParkingCoordinator::default();
    let result = restored.load_from_file(&path);
    let _ = fs::remove_file(&path);

    assert!(result.is_ok(), "{:?}", result);
    assert_eq!(restored.find("A"), VehicleLocation::Garage(1));
    assert_eq!(restored.find("B-2"), VehicleLocation::WaitingLane(1));
    assert_eq!(restored.waiting_lane_length(), 1);
}
