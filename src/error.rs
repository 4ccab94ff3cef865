use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse garage configuration JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to read or write CSV data: {0}")]
    CsvError(#[from] csv::Error),

    /// Capacity accounting granted a slot but the garage refused the vehicle.
    #[error("Slot accounting granted a {slot} to {plate}, but the garage rejected the vehicle")]
    SlotAllocationInconsistency { plate: String, slot: String },

    #[error("Malformed snapshot at line {line}: {reason}")]
    SnapshotFormat { line: usize, reason: String },

    #[error("Invalid garage configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Could not parse command: {0}")]
    CommandParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
