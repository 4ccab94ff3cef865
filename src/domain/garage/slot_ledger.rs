use serde::Serialize;

use crate::domain::garage::vehicle::{SlotCategory, VehicleCategory};

/// Total and used count for one slot category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SlotUsage {
    pub total: usize,
    pub used: usize,
}

impl SlotUsage {
    pub fn new(total: usize) -> Self {
        SlotUsage { total, used: 0 }
    }

    pub fn free(&self) -> usize {
        self.total.saturating_sub(self.used)
    }

    pub fn has_free(&self) -> bool {
        self.used < self.total
    }
}

/// Per-category slot bookkeeping.
///
/// The counters are kept apart from the physical garage stack. The coordinator is responsible
/// for keeping `used_total()` equal to the number of parked vehicles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotLedger {
    pub small: SlotUsage,
    pub medium: SlotUsage,
    pub large: SlotUsage,
}

impl SlotLedger {
    pub fn new(small: usize, medium: usize, large: usize) -> Self {
        SlotLedger { small: SlotUsage::new(small), medium: SlotUsage::new(medium), large: SlotUsage::new(large) }
    }

    /// Splits a capacity into three categories: a third small, a third medium, the rest large.
    pub fn default_split(capacity: usize) -> Self {
        let each = capacity / 3;
        SlotLedger::new(each, each, capacity - 2 * each)
    }

    pub fn usage(&self, slot: SlotCategory) -> &SlotUsage {
        match slot {
            SlotCategory::SmallSlot => &self.small,
            SlotCategory::MediumSlot => &self.medium,
            SlotCategory::LargeSlot => &self.large,
        }
    }

    fn usage_mut(&mut self, slot: SlotCategory) -> &mut SlotUsage {
        match slot {
            SlotCategory::SmallSlot => &mut self.small,
            SlotCategory::MediumSlot => &mut self.medium,
            SlotCategory::LargeSlot => &mut self.large,
        }
    }

    /// Checks the slot category that exactly matches the vehicle category.
    ///
    /// A medium vehicle only looks at medium slots, even though it would fit a small one.
    pub fn has_suitable_slot(&self, category: VehicleCategory) -> bool {
        self.usage(category.matching_slot()).has_free()
    }

    /// Takes one slot of the exactly matching category.
    ///
    /// # Returns
    /// The allocated slot category, or `None` if that category is exhausted.
    pub fn allocate(&mut self, category: VehicleCategory) -> Option<SlotCategory> {
        let slot = category.matching_slot();
        let usage = self.usage_mut(slot);

        if !usage.has_free() {
            return None;
        }

        usage.used += 1;
        Some(slot)
    }

    /// Gives a slot back. The used count never drops below zero.
    pub fn release(&mut self, slot: SlotCategory) {
        let usage = self.usage_mut(slot);

        if usage.used == 0 {
            log::error!("Releasing a {} although none is in use --> Signals an error in the slot accounting.", slot);
            return;
        }

        usage.used -= 1;
    }

    pub fn total_slots(&self) -> usize {
        self.small.total + self.medium.total + self.large.total
    }

    pub fn used_total(&self) -> usize {
        self.small.used + self.medium.used + self.large.used
    }

    /// Overwrites the used count of one category. Only meant for restoring snapshots.
    pub(crate) fn set_used(&mut self, slot: SlotCategory, used: usize) {
        self.usage_mut(slot).used = used;
    }
}
