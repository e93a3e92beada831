//! Schedule (solution) model.
//!
//! A schedule maps time slots to the classes held in them. All
//! occupancy queries are scans over the current entries, so they can
//! never go stale after an insertion or removal.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Classroom, Group, Lecturer, Subgroup, Subject, TimeSlot};

/// One scheduled class occurrence.
///
/// Entries own their entity values, so cloning an entry never aliases
/// the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Subject taught.
    pub subject: Subject,
    /// Teaching lecturer.
    pub lecturer: Lecturer,
    /// Room used.
    pub classroom: Classroom,
    /// Attending groups; at least one, checked by [`crate::validation::check`].
    pub groups: Vec<Group>,
    /// Attending subgroups, for split practicals.
    pub subgroups: Option<Vec<Subgroup>>,
    /// Lecture (`true`) or practical (`false`).
    pub is_lecture: bool,
}

impl ScheduleEntry {
    /// Creates an entry for a single group.
    pub fn new(
        subject: Subject,
        lecturer: Lecturer,
        classroom: Classroom,
        group: Group,
        is_lecture: bool,
    ) -> Self {
        Self {
            subject,
            lecturer,
            classroom,
            groups: vec![group],
            subgroups: None,
            is_lecture,
        }
    }

    /// Adds another attending group.
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Records the attending subgroups.
    pub fn with_subgroups(mut self, subgroups: Vec<Subgroup>) -> Self {
        self.subgroups = Some(subgroups);
        self
    }

    /// Total students across attending groups.
    pub fn student_count(&self) -> u32 {
        self.groups.iter().map(|g| g.student_count).sum()
    }

    /// Whether the given group attends.
    pub fn has_group(&self, group_id: &str) -> bool {
        self.groups.iter().any(|g| g.id == group_id)
    }

    /// `"lecture"` or `"practical"`.
    pub fn mode(&self) -> &'static str {
        if self.is_lecture {
            "lecture"
        } else {
            "practical"
        }
    }
}

/// A weekly timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Entries per occupied slot. Slots with no entries are absent.
    #[serde(with = "slot_map")]
    entries: BTreeMap<TimeSlot, Vec<ScheduleEntry>>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to a slot.
    pub fn add_entry(&mut self, slot: TimeSlot, entry: ScheduleEntry) {
        self.entries.entry(slot).or_default().push(entry);
    }

    /// Removes the `index`-th entry of a slot. Drops the slot when it empties.
    pub fn remove_entry(&mut self, slot: TimeSlot, index: usize) -> Option<ScheduleEntry> {
        let list = self.entries.get_mut(&slot)?;
        if index >= list.len() {
            return None;
        }
        let entry = list.remove(index);
        if list.is_empty() {
            self.entries.remove(&slot);
        }
        Some(entry)
    }

    /// Replaces the whole entry list of a slot (empty lists clear it).
    pub fn set_slot(&mut self, slot: TimeSlot, entries: Vec<ScheduleEntry>) {
        if entries.is_empty() {
            self.entries.remove(&slot);
        } else {
            self.entries.insert(slot, entries);
        }
    }

    /// Entries held in a slot (empty if unoccupied).
    pub fn entries_at(&self, slot: TimeSlot) -> &[ScheduleEntry] {
        self.entries.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Occupied slots with their entries, chronologically.
    pub fn slots(&self) -> impl Iterator<Item = (TimeSlot, &[ScheduleEntry])> {
        self.entries.iter().map(|(slot, list)| (*slot, list.as_slice()))
    }

    /// Every (slot, entry) pair, chronologically.
    pub fn entries(&self) -> impl Iterator<Item = (TimeSlot, &ScheduleEntry)> {
        self.entries
            .iter()
            .flat_map(|(slot, list)| list.iter().map(move |e| (*slot, e)))
    }

    /// Occupied slots.
    pub fn occupied_slots(&self) -> BTreeSet<TimeSlot> {
        self.entries.keys().copied().collect()
    }

    /// Slots where the lecturer teaches.
    pub fn lecturer_slots(&self, lecturer_id: &str) -> BTreeSet<TimeSlot> {
        self.slots_where(|e| e.lecturer.id == lecturer_id)
    }

    /// Slots where the group has a class.
    pub fn group_slots(&self, group_id: &str) -> BTreeSet<TimeSlot> {
        self.slots_where(|e| e.has_group(group_id))
    }

    /// Slots where the classroom is in use.
    pub fn classroom_slots(&self, classroom_id: &str) -> BTreeSet<TimeSlot> {
        self.slots_where(|e| e.classroom.id == classroom_id)
    }

    /// Whether the lecturer has no class in the slot.
    pub fn is_lecturer_free(&self, slot: TimeSlot, lecturer_id: &str) -> bool {
        !self
            .entries_at(slot)
            .iter()
            .any(|e| e.lecturer.id == lecturer_id)
    }

    /// Whether the group has no class in the slot.
    pub fn is_group_free(&self, slot: TimeSlot, group_id: &str) -> bool {
        !self.entries_at(slot).iter().any(|e| e.has_group(group_id))
    }

    /// Entries a group attends.
    pub fn entries_for_group(&self, group_id: &str) -> Vec<(TimeSlot, &ScheduleEntry)> {
        self.entries().filter(|(_, e)| e.has_group(group_id)).collect()
    }

    /// Entries a lecturer teaches.
    pub fn entries_for_lecturer(&self, lecturer_id: &str) -> Vec<(TimeSlot, &ScheduleEntry)> {
        self.entries()
            .filter(|(_, e)| e.lecturer.id == lecturer_id)
            .collect()
    }

    /// Entries held in a classroom.
    pub fn entries_for_classroom(&self, classroom_id: &str) -> Vec<(TimeSlot, &ScheduleEntry)> {
        self.entries()
            .filter(|(_, e)| e.classroom.id == classroom_id)
            .collect()
    }

    /// Total number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Number of slots holding at least one entry.
    pub fn occupied_slot_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slots_where<F>(&self, pred: F) -> BTreeSet<TimeSlot>
    where
        F: Fn(&ScheduleEntry) -> bool,
    {
        self.entries
            .iter()
            .filter(|(_, list)| list.iter().any(&pred))
            .map(|(slot, _)| *slot)
            .collect()
    }
}

/// Serializes the slot map as a list of `{slot, entries}` records, since
/// JSON object keys must be strings.
mod slot_map {
    use super::{ScheduleEntry, TimeSlot};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct SlotRef<'a> {
        slot: TimeSlot,
        entries: &'a [ScheduleEntry],
    }

    #[derive(Deserialize)]
    struct SlotOwned {
        slot: TimeSlot,
        entries: Vec<ScheduleEntry>,
    }

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<TimeSlot, Vec<ScheduleEntry>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter().map(|(slot, entries)| SlotRef {
            slot: *slot,
            entries,
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<TimeSlot, Vec<ScheduleEntry>>, D::Error> {
        let records = Vec::<SlotOwned>::deserialize(deserializer)?;
        Ok(records
            .into_iter()
            .filter(|r| !r.entries.is_empty())
            .map(|r| (r.slot, r.entries))
            .collect())
    }
}
