use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api::garage_dto::{EventActionDto, EventDto};
use crate::domain::garage::config::GarageConfig;
use crate::domain::garage::coordinator::ParkingCoordinator;
use crate::domain::garage::outcome::{ArrivalOutcome, DepartureOutcome};
use crate::domain::garage::vehicle::VehicleCategory;
use crate::domain::utils::id::LicensePlate;
use crate::domain::utils::statistics::StatisticEvent;
use crate::error::{Error, Result};

/// A single thing happening at the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GarageEvent {
    Arrival { plate: LicensePlate, category: VehicleCategory, time: i64 },
    Departure { plate: LicensePlate, time: i64 },
}

/// What the coordinator made of a [`GarageEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Arrival(ArrivalOutcome),
    Departure(DepartureOutcome),
}

impl GarageEvent {
    pub fn arrival(plate: &str, category: VehicleCategory, time: i64) -> Self {
        GarageEvent::Arrival { plate: LicensePlate::new(plate), category, time }
    }

    pub fn departure(plate: &str, time: i64) -> Self {
        GarageEvent::Departure { plate: LicensePlate::new(plate), time }
    }

    pub fn plate(&self) -> &LicensePlate {
        match self {
            GarageEvent::Arrival { plate, .. } | GarageEvent::Departure { plate, .. } => plate,
        }
    }

    pub fn time(&self) -> i64 {
        match self {
            GarageEvent::Arrival { time, .. } | GarageEvent::Departure { time, .. } => *time,
        }
    }

    /// Runs the event against `coordinator`.
    pub fn apply(&self, coordinator: &mut ParkingCoordinator) -> EventOutcome {
        match self {
            GarageEvent::Arrival { plate, category, time } => EventOutcome::Arrival(coordinator.arrival(plate.as_str(), *category, *time)),
            GarageEvent::Departure { plate, time } => EventOutcome::Departure(coordinator.departure(plate.as_str(), *time)),
        }
    }

    /// Statistics row for this event, taken after [`GarageEvent::apply`].
    pub fn statistic(&self, outcome: &EventOutcome, coordinator: &ParkingCoordinator) -> StatisticEvent {
        match (self, outcome) {
            (GarageEvent::Arrival { plate, category, time }, EventOutcome::Arrival(arrival)) => {
                StatisticEvent::for_arrival(*time, plate.as_str(), *category, arrival, coordinator)
            }
            (GarageEvent::Departure { plate, time }, EventOutcome::Departure(departure)) => {
                StatisticEvent::for_departure(*time, plate.as_str(), departure, coordinator)
            }
            _ => {
                log::error!("Outcome {:?} does not belong to event {}.", outcome, self);
                StatisticEvent::new()
            }
        }
    }
}

impl fmt::Display for GarageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GarageEvent::Arrival { plate, category, time } => write!(f, "A {} ({}) at {}", plate, category, time),
            GarageEvent::Departure { plate, time } => write!(f, "D {} at {}", plate, time),
        }
    }
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOutcome::Arrival(outcome) => write!(f, "{}", outcome),
            EventOutcome::Departure(outcome) => write!(f, "{}", outcome),
        }
    }
}

impl TryFrom<EventDto> for GarageEvent {
    type Error = Error;

    fn try_from(dto: EventDto) -> Result<Self> {
        match dto.action {
            EventActionDto::Arrive => {
                let raw = dto.category.ok_or_else(|| Error::InvalidConfiguration(format!("arrival of {} has no vehicle category", dto.plate)))?;
                let category: VehicleCategory = raw.parse()?;
                Ok(GarageEvent::Arrival { plate: LicensePlate::new(dto.plate), category, time: dto.time })
            }
            EventActionDto::Depart => Ok(GarageEvent::Departure { plate: LicensePlate::new(dto.plate), time: dto.time }),
        }
    }
}

/// Configuration of the course data set: two spaces at 5.0 per hour.
pub fn course_config() -> GarageConfig {
    GarageConfig::new(2, 5.0)
}

/// The course data set `('A',1,5),('A',2,10),('D',1,15),('A',3,20),('A',4,25),('A',5,30),('D',2,35),('D',4,40)`.
///
/// Every vehicle is a small car. With the default split of a two space garage (no small slots)
/// all of them end up in the waiting lane.
pub fn course_events() -> Vec<GarageEvent> {
    let script: [(char, &str, i64); 8] = [('A', "1", 5), ('A', "2", 10), ('D', "1", 15), ('A', "3", 20), ('A', "4", 25), ('A', "5", 30), ('D', "2", 35), ('D', "4", 40)];

    script
        .iter()
        .map(|(action, plate, time)| match action {
            'A' => GarageEvent::arrival(plate, VehicleCategory::Small, *time),
            _ => GarageEvent::departure(plate, *time),
        })
        .collect()
}

/// Produces random but reproducible arrivals and departures.
///
/// Departures only ever name vehicles that arrived earlier and have not left yet, so every
/// generated script is consistent.
#[derive(Debug)]
pub struct TrafficGenerator {
    rng: StdRng,
    seed: u64,
    clock: i64,
    next_plate: usize,
    present: Vec<LicensePlate>,
    departure_probability: f64,
    max_gap_s: i64,
}

impl TrafficGenerator {
    pub const DEFAULT_DEPARTURE_PROBABILITY: f64 = 0.4;
    pub const DEFAULT_MAX_GAP_S: i64 = 2 * 3600;

    /// Generator starting at `start_time`. Without a seed a random one is drawn and logged.
    pub fn new(seed: Option<u64>, start_time: i64) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        log::info!("Traffic generator seeded with {}.", seed);

        TrafficGenerator {
            rng: StdRng::seed_from_u64(seed),
            seed,
            clock: start_time,
            next_plate: 1,
            present: Vec::new(),
            departure_probability: Self::DEFAULT_DEPARTURE_PROBABILITY,
            max_gap_s: Self::DEFAULT_MAX_GAP_S,
        }
    }

    pub fn with_departure_probability(mut self, probability: f64) -> Self {
        self.departure_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_gap(mut self, max_gap_s: i64) -> Self {
        self.max_gap_s = max_gap_s.max(1);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_event(&mut self) -> GarageEvent {
        self.clock += self.rng.random_range(1..=self.max_gap_s);

        if !self.present.is_empty() && self.rng.random_bool(self.departure_probability) {
            let index = self.rng.random_range(0..self.present.len());
            let plate = self.present.swap_remove(index);
            return GarageEvent::Departure { plate, time: self.clock };
        }

        let plate = LicensePlate::new(format!("SIM-{:04}", self.next_plate));
        self.next_plate += 1;
        let category = VehicleCategory::ALL[self.rng.random_range(0..VehicleCategory::ALL.len())];
        self.present.push(plate.clone());

        GarageEvent::Arrival { plate, category, time: self.clock }
    }

    pub fn generate(&mut self, count: usize) -> Vec<GarageEvent> {
        (0..count).map(|_| self.next_event()).collect()
    }
}
