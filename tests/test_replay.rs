use std::fs;
use std::path::PathBuf;

use parking_garage::domain::garage::coordinator::ParkingCoordinator;
use parking_garage::domain::traffic::{EventOutcome, GarageEvent, TrafficGenerator};
use parking_garage::domain::utils::statistics::StatsCollector;
use parking_garage::error::Error;
use parking_garage::{load_config, load_events, run_events};

fn temp_file(name: &str, extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("parking_garage_{}_{}.{}", name, std::process::id(), extension))
}

const CONFIG: &str = r#"{ "maxCapacity": 2, "hourlyRate": 5.0, "smallSpaces": 1, "mediumSpaces": 0, "largeSpaces": 1 }"#;

const EVENTS: &str = "\
action,plate,category,time
A,A,small,5
A,B,small,10
D,A,,15
A,C,small,20
A,D,large,25
D,B,,35
";

#[test]
fn test_replay_from_files() {
    let config_path = temp_file("config", "json");
    let events_path = temp_file("events", "csv");
    let stats_path = temp_file("stats", "csv");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&events_path, EVENTS).unwrap();

    let config = load_config(Some(&config_path)).unwrap();
    let events = load_events(&events_path).unwrap();
    assert_eq!(events.len(), 6);
    assert_eq!(events[2], GarageEvent::departure("A", 15));

    let mut coordinator = ParkingCoordinator::new(config);
    let mut collector = StatsCollector::init(Some(&stats_path)).unwrap();
    let outcomes = run_events(&mut coordinator, &events, Some(&mut collector)).unwrap();
    assert_eq!(collector.events_written(), 6);
    drop(collector);

    assert!(matches!(&outcomes[1], EventOutcome::Arrival(outcome) if outcome.is_diverted()));
    assert!(matches!(&outcomes[5], EventOutcome::Departure(outcome) if outcome.is_success()));
    assert_eq!(coordinator.occupied(), 2);

    let stats = fs::read_to_string(&stats_path).unwrap();
    let rows: Vec<&str> = stats.lines().collect();
    assert_eq!(rows.len(), 7, "Header plus one row per event");
    assert!(rows[0].starts_with("Time;Command;Outcome;LicensePlate"));
    assert!(rows[3].starts_with("15;DEPARTURE;Departed;A;small;small slot;10;5.00;0;B;"));

    for path in [config_path, events_path, stats_path] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn test_unknown_category_in_script() {
    let events_path = temp_file("bad_events", "csv");
    fs::write(&events_path, "action,plate,category,time\nA,X,truck,1\n").unwrap();

    let result = load_events(&events_path);
    let _ = fs::remove_file(&events_path);
    assert!(matches!(result, Err(Error::CommandParse(_))));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let config_path = temp_file("zero_capacity", "json");
    fs::write(&config_path, r#"{ "maxCapacity": 0, "hourlyRate": 5.0 }"#).unwrap();

    let result = load_config(Some(&config_path));
    let _ = fs::remove_file(&config_path);
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_random_traffic_keeps_accounting_consistent() {
    let mut coordinator = ParkingCoordinator::new(load_config(None::<&str>).unwrap());
    let events = TrafficGenerator::new(Some(2024), 0).generate(500);

    for event in &events {
        event.apply(&mut coordinator);
        assert_eq!(coordinator.ledger().used_total(), coordinator.occupied());
        assert!(coordinator.occupied() <= coordinator.total_capacity());
        assert!(coordinator.scratch_is_empty());
    }
}
