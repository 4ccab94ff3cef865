use serde::Deserialize;

/// How arrivals into a non-empty garage are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryReshuffleDto {
    #[default]
    Minimal,
    FullChurn,
}

/// Garage configuration as read from a JSON file.
///
/// ```json
/// { "maxCapacity": 10, "hourlyRate": 5.0, "smallSpaces": 3, "mediumSpaces": 3, "largeSpaces": 4 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarageDto {
    pub max_capacity: usize,
    pub hourly_rate: f64,
    pub small_spaces: Option<usize>,
    pub medium_spaces: Option<usize>,
    pub large_spaces: Option<usize>,
    #[serde(default)]
    pub entry_reshuffle: EntryReshuffleDto,
}

/// Action column of an event script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventActionDto {
    #[serde(rename = "A", alias = "a", alias = "arrive")]
    Arrive,
    #[serde(rename = "D", alias = "d", alias = "depart")]
    Depart,
}

/// One row of a CSV event script: `action,plate,category,time`.
///
/// The category column may be empty for departures.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDto {
    pub action: EventActionDto,
    pub plate: String,
    pub category: Option<String>,
    pub time: i64,
}
