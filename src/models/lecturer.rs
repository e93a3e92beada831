//! Lecturer model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

/// Per-subject teaching capability of a lecturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LecturerConstraints {
    /// May teach lecture classes of the subject.
    pub can_lecture: bool,
    /// May teach practical classes of the subject.
    pub can_practice: bool,
    /// Weekly teaching cap in hours.
    pub max_hours_per_week: u32,
}

impl Default for LecturerConstraints {
    fn default() -> Self {
        Self {
            can_lecture: true,
            can_practice: true,
            max_hours_per_week: 20,
        }
    }
}

impl LecturerConstraints {
    /// Creates a capability record.
    pub fn new(can_lecture: bool, can_practice: bool, max_hours_per_week: u32) -> Self {
        Self {
            can_lecture,
            can_practice,
            max_hours_per_week,
        }
    }
}

/// A lecturer.
///
/// Capabilities are added incrementally; identity is the `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecturer {
    /// Unique lecturer identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Capabilities keyed by subject id.
    pub subject_constraints: BTreeMap<String, LecturerConstraints>,
}

impl Lecturer {
    /// Creates a lecturer with no capabilities.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subject_constraints: BTreeMap::new(),
        }
    }

    /// Adds or replaces the capability for a subject.
    pub fn add_subject_constraint(
        &mut self,
        subject_id: impl Into<String>,
        constraints: LecturerConstraints,
    ) {
        self.subject_constraints.insert(subject_id.into(), constraints);
    }

    /// Builder form of [`add_subject_constraint`](Self::add_subject_constraint).
    pub fn with_subject_constraint(
        mut self,
        subject_id: impl Into<String>,
        constraints: LecturerConstraints,
    ) -> Self {
        self.add_subject_constraint(subject_id, constraints);
        self
    }

    /// Whether the lecturer may teach the subject in the given mode.
    pub fn can_teach_subject(&self, subject_id: &str, is_lecture: bool) -> bool {
        match self.subject_constraints.get(subject_id) {
            Some(c) if is_lecture => c.can_lecture,
            Some(c) => c.can_practice,
            None => false,
        }
    }

    /// Ids of all subjects the lecturer holds a capability for.
    pub fn teachable_subjects(&self) -> BTreeSet<&str> {
        self.subject_constraints.keys().map(String::as_str).collect()
    }
}

impl PartialEq for Lecturer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Lecturer {}

impl Hash for Lecturer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
