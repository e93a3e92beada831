//! Weekly time grid.
//!
//! The week is a fixed 5 × 4 grid: five teaching days, four periods per
//! day. Each cell is one [`TimeSlot`] lasting [`HOURS_PER_SLOT`] hours.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TimetableError};

/// Teaching days per week (Monday..Friday).
pub const DAYS_PER_WEEK: u8 = 5;
/// Periods per teaching day.
pub const PERIODS_PER_DAY: u8 = 4;
/// Number of cells in the weekly grid.
pub const SLOTS_PER_WEEK: usize = DAYS_PER_WEEK as usize * PERIODS_PER_DAY as usize;
/// Length of one period in hours.
pub const HOURS_PER_SLOT: f64 = 1.5;

const DAY_NAMES: [&str; DAYS_PER_WEEK as usize] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// One (day, period) cell of the weekly grid.
///
/// Ordered day-major, so iterating a `BTreeMap<TimeSlot, _>` walks the
/// week chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSlot")]
pub struct TimeSlot {
    day: u8,
    period: u8,
}

/// Unchecked wire form; deserialization goes through [`TimeSlot::new`].
#[derive(Deserialize)]
struct RawTimeSlot {
    day: u8,
    period: u8,
}

impl TryFrom<RawTimeSlot> for TimeSlot {
    type Error = TimetableError;

    fn try_from(raw: RawTimeSlot) -> Result<Self> {
        Self::new(raw.day, raw.period)
    }
}

impl TimeSlot {
    /// Creates a slot, rejecting coordinates outside the grid.
    pub fn new(day: u8, period: u8) -> Result<Self> {
        if day >= DAYS_PER_WEEK || period >= PERIODS_PER_DAY {
            return Err(TimetableError::SlotOutOfRange { day, period });
        }
        Ok(Self { day, period })
    }

    /// In-range constructor for coordinates already bounded by the grid.
    pub(crate) const fn at(day: u8, period: u8) -> Self {
        Self { day, period }
    }

    /// Day index (0 = Monday).
    #[inline]
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Period index within the day (0 = first).
    #[inline]
    pub fn period(&self) -> u8 {
        self.period
    }

    /// English weekday name.
    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[self.day as usize]
    }

    /// All 20 slots, day-major.
    pub fn all() -> impl Iterator<Item = TimeSlot> {
        (0..DAYS_PER_WEEK)
            .flat_map(|day| (0..PERIODS_PER_DAY).map(move |period| TimeSlot::at(day, period)))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, period {}", self.day_name(), self.period + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_in_range() {
        let s = TimeSlot::new(4, 3).unwrap();
        assert_eq!(s.day(), 4);
        assert_eq!(s.period(), 3);
    }

    #[test]
    fn test_new_out_of_range() {
        assert_eq!(
            TimeSlot::new(5, 0),
            Err(TimetableError::SlotOutOfRange { day: 5, period: 0 })
        );
        assert!(TimeSlot::new(0, 4).is_err());
    }

    #[test]
    fn test_all_covers_grid_in_order() {
        let slots: Vec<_> = TimeSlot::all().collect();
        assert_eq!(slots.len(), SLOTS_PER_WEEK);
        assert_eq!(slots[0], TimeSlot::at(0, 0));
        assert_eq!(slots[4], TimeSlot::at(1, 0));
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_deserialize_checks_range() {
        let slot: TimeSlot = serde_json::from_str(r#"{"day":4,"period":3}"#).unwrap();
        assert_eq!(slot, TimeSlot::at(4, 3));
        assert_eq!(serde_json::to_string(&slot).unwrap(), r#"{"day":4,"period":3}"#);

        assert!(serde_json::from_str::<TimeSlot>(r#"{"day":9,"period":7}"#).is_err());
        assert!(serde_json::from_str::<TimeSlot>(r#"{"day":0,"period":4}"#).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeSlot::at(2, 0).to_string(), "Wednesday, period 1");
    }
}
