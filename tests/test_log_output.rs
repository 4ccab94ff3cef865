use logtest::Logger;

use parking_garage::domain::garage::config::GarageConfig;
use parking_garage::domain::garage::coordinator::ParkingCoordinator;
use parking_garage::domain::garage::vehicle::VehicleCategory;

// The logger is process-global, so this file holds a single test.
#[test]
fn test_reshuffle_is_traced() {
    let mut logger = Logger::start();

    let mut coordinator = ParkingCoordinator::new(GarageConfig::new(3, 5.0).with_slots(3, 0, 0));
    coordinator.arrival("A", VehicleCategory::Small, 0);
    coordinator.arrival("B", VehicleCategory::Small, 10);
    coordinator.arrival("C", VehicleCategory::Small, 20);
    coordinator.departure("A", 3600);
    coordinator.departure("GHOST", 3600);

    let mut messages = Vec::new();
    while let Some(record) = logger.pop() {
        messages.push((record.level(), record.args().to_string()));
    }

    let has = |needle: &str| messages.iter().any(|(_, message)| message.contains(needle));
    assert!(has("Holding area entry order: C -> B"), "messages: {:?}", messages);
    assert!(has("Garage re-entry order: B -> C"), "messages: {:?}", messages);
    assert!(messages.iter().any(|(level, message)| *level == log::Level::Warn && message.contains("GHOST")));
}
