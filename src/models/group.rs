//! Student group model.
//!
//! A group follows a curriculum (a set of subjects) and may be split
//! into subgroups for practical classes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use super::Subject;
use crate::error::{Result, TimetableError};

/// A slice of a group's students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subgroup {
    /// Unique subgroup identifier (`"<group>/sg<n>"`).
    pub id: String,
    /// Students in this subgroup.
    pub student_count: u32,
    /// Id of the owning group.
    pub parent_group_id: String,
}

impl PartialEq for Subgroup {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Subgroup {}

impl Hash for Subgroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A student group.
///
/// Identity is the `id`. The curriculum and subgroups are mutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawGroup")]
pub struct Group {
    /// Unique group identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Number of students (> 0).
    pub student_count: u32,
    /// Curriculum keyed by subject id.
    pub subjects: BTreeMap<String, Subject>,
    /// Subgroups, if the group has been split.
    pub subgroups: Vec<Subgroup>,
}

/// Unchecked wire form; deserialization goes through [`Group::new`] and
/// [`Group::set_subgroups`].
#[derive(Deserialize)]
struct RawGroup {
    id: String,
    name: String,
    student_count: u32,
    #[serde(default)]
    subjects: BTreeMap<String, Subject>,
    #[serde(default)]
    subgroups: Vec<Subgroup>,
}

impl TryFrom<RawGroup> for Group {
    type Error = TimetableError;

    fn try_from(raw: RawGroup) -> Result<Self> {
        let mut group = Self::new(raw.id, raw.name, raw.student_count)?;
        for subject in raw.subjects.into_values() {
            group.add_subject(subject);
        }
        group.set_subgroups(raw.subgroups)?;
        Ok(group)
    }
}

impl Group {
    /// Creates a group. Rejects an empty headcount.
    pub fn new(id: impl Into<String>, name: impl Into<String>, student_count: u32) -> Result<Self> {
        let id = id.into();
        if student_count == 0 {
            return Err(TimetableError::InvalidGroup {
                id,
                reason: "student count must be positive".into(),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            student_count,
            subjects: BTreeMap::new(),
            subgroups: Vec::new(),
        })
    }

    /// Adds a subject to the curriculum, replacing one with the same id.
    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.insert(subject.id.clone(), subject);
    }

    /// Builder form of [`add_subject`](Self::add_subject).
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.add_subject(subject);
        self
    }

    /// Splits the group into `count` near-equal subgroups.
    ///
    /// The remainder of `student_count / count` goes one student each to
    /// the first subgroups, so sizes differ by at most one. With more
    /// subgroups than students the trailing subgroups are empty.
    pub fn create_subgroups(&mut self, count: u32) -> Result<()> {
        if count == 0 {
            return Err(TimetableError::InvalidSubgroups {
                group_id: self.id.clone(),
                reason: format!(
                    "cannot split {} students into {count} subgroups",
                    self.student_count
                ),
            });
        }

        let base = self.student_count / count;
        let remainder = self.student_count % count;
        self.subgroups = (0..count)
            .map(|i| Subgroup {
                id: format!("{}/sg{}", self.id, i + 1),
                student_count: base + u32::from(i < remainder),
                parent_group_id: self.id.clone(),
            })
            .collect();
        Ok(())
    }

    /// Replaces the subgroups with an explicit partition.
    ///
    /// The partition must belong to this group and sum to `student_count`.
    pub fn set_subgroups(&mut self, subgroups: Vec<Subgroup>) -> Result<()> {
        if let Some(foreign) = subgroups.iter().find(|s| s.parent_group_id != self.id) {
            return Err(TimetableError::InvalidSubgroups {
                group_id: self.id.clone(),
                reason: format!("subgroup '{}' belongs to '{}'", foreign.id, foreign.parent_group_id),
            });
        }
        let total: u32 = subgroups.iter().map(|s| s.student_count).sum();
        if !subgroups.is_empty() && total != self.student_count {
            return Err(TimetableError::InvalidSubgroups {
                group_id: self.id.clone(),
                reason: format!("subgroups hold {total} students, group has {}", self.student_count),
            });
        }
        self.subgroups = subgroups;
        Ok(())
    }

    /// (lecture, practical) hours of a curriculum subject; (0, 0) if absent.
    pub fn subject_hours(&self, subject_id: &str) -> (u32, u32) {
        self.subjects
            .get(subject_id)
            .map(|s| (s.lecture_hours, s.practical_hours))
            .unwrap_or((0, 0))
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
