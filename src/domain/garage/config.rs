use crate::api::garage_dto::{EntryReshuffleDto, GarageDto};
use crate::domain::garage::slot_ledger::SlotLedger;
use crate::error::Error;

pub const DEFAULT_CAPACITY: usize = 10;
pub const DEFAULT_HOURLY_RATE: f64 = 5.0;

/// What happens to already parked vehicles when a new one drives in.
///
/// New arrivals always end up on top of the stack, so nothing physically blocks them.
/// `FullChurn` reproduces the older behavior of cycling every parked vehicle out and back in
/// before the arrival is placed. The resulting order is the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryReshuffle {
    #[default]
    Minimal,
    FullChurn,
}

impl From<EntryReshuffleDto> for EntryReshuffle {
    fn from(dto: EntryReshuffleDto) -> Self {
        match dto {
            EntryReshuffleDto::Minimal => EntryReshuffle::Minimal,
            EntryReshuffleDto::FullChurn => EntryReshuffle::FullChurn,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GarageConfig {
    pub max_capacity: usize,
    pub hourly_rate: f64,
    pub small_spaces: usize,
    pub medium_spaces: usize,
    pub large_spaces: usize,
    pub entry_reshuffle: EntryReshuffle,
}

impl GarageConfig {
    /// Capacity and rate with the default slot split (a third small, a third medium, rest large).
    pub fn new(max_capacity: usize, hourly_rate: f64) -> Self {
        let split = SlotLedger::default_split(max_capacity);
        GarageConfig {
            max_capacity,
            hourly_rate,
            small_spaces: split.small.total,
            medium_spaces: split.medium.total,
            large_spaces: split.large.total,
            entry_reshuffle: EntryReshuffle::default(),
        }
    }

    pub fn with_slots(mut self, small: usize, medium: usize, large: usize) -> Self {
        self.small_spaces = small;
        self.medium_spaces = medium;
        self.large_spaces = large;
        self
    }

    pub fn with_entry_reshuffle(mut self, entry_reshuffle: EntryReshuffle) -> Self {
        self.entry_reshuffle = entry_reshuffle;
        self
    }

    pub fn slot_total(&self) -> usize {
        self.small_spaces + self.medium_spaces + self.large_spaces
    }

    pub fn ledger(&self) -> SlotLedger {
        SlotLedger::new(self.small_spaces, self.medium_spaces, self.large_spaces)
    }

    /// The slot totals and the physical capacity are two separate limits. Keeping them equal is
    /// up to whoever configures the garage, a mismatch is only reported.
    pub fn warn_on_slot_mismatch(&self) {
        if self.slot_total() != self.max_capacity {
            log::warn!(
                "Slot totals ({} small + {} medium + {} large = {}) differ from the garage capacity {}.",
                self.small_spaces,
                self.medium_spaces,
                self.large_spaces,
                self.slot_total(),
                self.max_capacity
            );
        }
    }
}

impl Default for GarageConfig {
    fn default() -> Self {
        GarageConfig::new(DEFAULT_CAPACITY, DEFAULT_HOURLY_RATE)
    }
}

impl TryFrom<GarageDto> for GarageConfig {
    type Error = Error;

    fn try_from(dto: GarageDto) -> Result<Self, Self::Error> {
        if dto.max_capacity == 0 {
            return Err(Error::InvalidConfiguration("maxCapacity must be greater than zero".to_string()));
        }

        if !dto.hourly_rate.is_finite() || dto.hourly_rate < 0.0 {
            return Err(Error::InvalidConfiguration(format!("hourlyRate must be a non-negative number, got {}", dto.hourly_rate)));
        }

        let mut config = GarageConfig::new(dto.max_capacity, dto.hourly_rate).with_entry_reshuffle(dto.entry_reshuffle.into());

        match (dto.small_spaces, dto.medium_spaces, dto.large_spaces) {
            (None, None, None) => {}
            (small, medium, large) => {
                config = config.with_slots(small.unwrap_or(0), medium.unwrap_or(0), large.unwrap_or(0));
            }
        }

        config.warn_on_slot_mismatch();
        Ok(config)
    }
}
