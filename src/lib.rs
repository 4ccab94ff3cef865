use std::path::Path;

use crate::domain::garage::config::GarageConfig;
use crate::domain::garage::coordinator::ParkingCoordinator;
use crate::domain::traffic::{EventOutcome, GarageEvent};
use crate::domain::utils::statistics::StatsCollector;
use crate::error::Result;
use crate::loader::parser::{parse_event_file, parse_garage_config};

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;
pub mod shell;

/// Garage configuration from `file_path`, or the default ten space garage.
pub fn load_config<P: AsRef<Path>>(file_path: Option<P>) -> Result<GarageConfig> {
    match file_path {
        Some(path) => parse_garage_config(path),
        None => {
            log::info!("No configuration file given. Using the default garage.");
            Ok(GarageConfig::default())
        }
    }
}

/// Reads an event script and converts every row into a [`GarageEvent`].
pub fn load_events<P: AsRef<Path>>(file_path: P) -> Result<Vec<GarageEvent>> {
    parse_event_file(file_path)?.into_iter().map(GarageEvent::try_from).collect()
}

/// Applies `events` in order. With a collector, one statistics row is written per event.
pub fn run_events(coordinator: &mut ParkingCoordinator, events: &[GarageEvent], mut stats: Option<&mut StatsCollector>) -> Result<Vec<EventOutcome>> {
    let mut outcomes = Vec::with_capacity(events.len());

    for event in events {
        let outcome = event.apply(coordinator);
        log::debug!("{} -> {}", event, outcome);

        if let Some(collector) = stats.as_deref_mut() {
            collector.add_event(&event.statistic(&outcome, coordinator))?;
        }
        outcomes.push(outcome);
    }

    if let Some(collector) = stats {
        collector.flush()?;
    }

    log::info!("Processed {} events: {} parked, {} waiting.", events.len(), coordinator.occupied(), coordinator.waiting_lane_length());
    Ok(outcomes)
}
