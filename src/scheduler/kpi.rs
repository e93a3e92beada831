//! Timetable load indicators (KPIs).
//!
//! Summarizes how a schedule uses the weekly grid and how load spreads
//! over lecturers and groups.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Slot utilization | occupied slots / 20, in percent |
//! | Entry mix | lecture vs practical entry counts |
//! | Daily spread | entries per weekday |
//! | Weekly hours | distinct occupied slots × 1.5 h, per lecturer and per group |

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{Schedule, TimeSlot, DAYS_PER_WEEK, HOURS_PER_SLOT, SLOTS_PER_WEEK};

/// Schedule load indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Slots in the weekly grid.
    pub total_slots: usize,
    /// Slots holding at least one entry.
    pub used_slots: usize,
    /// `used_slots / total_slots` in percent (0.0..=100.0).
    pub utilization_pct: f64,
    /// Scheduled entries.
    pub entry_count: usize,
    /// Lecture entries.
    pub lecture_count: usize,
    /// Practical entries.
    pub practical_count: usize,
    /// Entries per weekday, Monday first.
    pub entries_per_day: Vec<usize>,
    /// Weekly teaching hours per lecturer id.
    pub lecturer_hours: BTreeMap<String, f64>,
    /// Weekly class hours per group id.
    pub group_hours: BTreeMap<String, f64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    pub fn calculate(schedule: &Schedule) -> Self {
        let mut entries_per_day = vec![0; DAYS_PER_WEEK as usize];
        let mut lecture_count = 0;
        let mut lecturer_slots: BTreeMap<&str, BTreeSet<TimeSlot>> = BTreeMap::new();
        let mut group_slots: BTreeMap<&str, BTreeSet<TimeSlot>> = BTreeMap::new();

        for (slot, entry) in schedule.entries() {
            entries_per_day[slot.day() as usize] += 1;
            if entry.is_lecture {
                lecture_count += 1;
            }
            lecturer_slots
                .entry(&entry.lecturer.id)
                .or_default()
                .insert(slot);
            for group in &entry.groups {
                group_slots.entry(&group.id).or_default().insert(slot);
            }
        }

        let entry_count = schedule.entry_count();
        let used_slots = schedule.occupied_slot_count();
        Self {
            total_slots: SLOTS_PER_WEEK,
            used_slots,
            utilization_pct: used_slots as f64 / SLOTS_PER_WEEK as f64 * 100.0,
            entry_count,
            lecture_count,
            practical_count: entry_count - lecture_count,
            entries_per_day,
            lecturer_hours: weekly_hours(lecturer_slots),
            group_hours: weekly_hours(group_slots),
        }
    }

    /// Heaviest lecturer load, in hours.
    pub fn max_lecturer_hours(&self) -> f64 {
        self.lecturer_hours.values().copied().fold(0.0, f64::max)
    }

    /// Whether slot utilization reaches `min_pct`.
    pub fn meets_utilization(&self, min_pct: f64) -> bool {
        self.utilization_pct >= min_pct
    }
}

fn weekly_hours(slots: BTreeMap<&str, BTreeSet<TimeSlot>>) -> BTreeMap<String, f64> {
    slots
        .into_iter()
        .map(|(id, s)| (id.to_string(), s.len() as f64 * HOURS_PER_SLOT))
        .collect()
}
