//! Slot availability types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use time::Date;

/// Availability of a single appointment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    Unavailable,
    /// Any status this client does not know about; never offered.
    #[serde(other)]
    Unknown,
}

/// A fixed appointment time offered for a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot label as shown to the user, e.g. `09:30`.
    pub time: CompactString,
    pub status: SlotStatus,
}

impl TimeSlot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

/// A date with no availability at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledDate {
    #[serde(with = "super::calendar_date")]
    pub date: Date,
}

/// Keep only the labels of slots the user may book.
pub fn available_labels(slots: &[TimeSlot]) -> Vec<CompactString> {
    slots
        .iter()
        .filter(|slot| slot.is_available())
        .map(|slot| slot.time.clone())
        .collect()
}
