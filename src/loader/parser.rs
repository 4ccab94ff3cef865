use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::api::garage_dto::{EventActionDto, EventDto, GarageDto};
use crate::domain::garage::config::GarageConfig;
use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are automatically converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned, P: AsRef<Path>>(file_path: P) -> Result<T> {
    let data = fs::read_to_string(file_path)?;
    let parsed_data: T = serde_json::from_str(&data)?;
    Ok(parsed_data)
}

/// Reads and validates a garage configuration file.
pub fn parse_garage_config<P: AsRef<Path>>(file_path: P) -> Result<GarageConfig> {
    let dto: GarageDto = parse_json_file(file_path.as_ref())?;
    let config = GarageConfig::try_from(dto)?;
    log::info!("Loaded garage configuration from '{}'.", file_path.as_ref().display());
    Ok(config)
}

/// Parses an event script from a file. See [`parse_events`].
pub fn parse_event_file<P: AsRef<Path>>(file_path: P) -> Result<Vec<EventDto>> {
    let data = fs::read_to_string(file_path.as_ref())?;
    let events = parse_events(&data)?;
    log::info!("Read {} events from '{}'.", events.len(), file_path.as_ref().display());
    Ok(events)
}

/// Parses a comma separated event script with the header `action,plate,category,time`.
///
/// Arrivals must name a category, departures may leave it empty.
pub fn parse_events(data: &str) -> Result<Vec<EventDto>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).comment(Some(b'#')).from_reader(data.as_bytes());

    let mut events = Vec::new();
    for (index, record) in reader.deserialize::<EventDto>().enumerate() {
        let mut event = record?;
        if event.category.as_deref().is_some_and(str::is_empty) {
            event.category = None;
        }

        if event.action == EventActionDto::Arrive && event.category.is_none() {
            // +2: header line and 1-based numbering
            return Err(Error::InvalidConfiguration(format!("event on line {} arrives without a vehicle category", index + 2)));
        }
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_with_empty_departure_category() {
        let data = "action,plate,category,time\nA, AB-123, small, 5\nD,AB-123,,20\n";
        let events = parse_events(data).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventActionDto::Arrive);
        assert_eq!(events[0].plate, "AB-123");
        assert_eq!(events[0].category.as_deref(), Some("small"));
        assert_eq!(events[1].action, EventActionDto::Depart);
        assert_eq!(events[1].category, None);
        assert_eq!(events[1].time, 20);
    }

    #[test]
    fn test_arrival_without_category_is_rejected() {
        let data = "action,plate,category,time\nA,X,,5\n";
        assert!(matches!(parse_events(data), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_unknown_action_is_a_csv_error() {
        let data = "action,plate,category,time\nX,X,small,5\n";
        assert!(matches!(parse_events(data), Err(Error::CsvError(_))));
    }
}
