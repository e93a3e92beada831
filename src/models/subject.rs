//! Subject model.
//!
//! A subject is a curriculum unit taught as weekly lecture hours and
//! practical hours. Each hour becomes one class to place in the grid.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::error::{Result, TimetableError};

/// A subject in the curriculum.
///
/// Identity is the `id`; two subjects with the same id compare equal
/// regardless of their other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSubject")]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Weekly lecture hours.
    pub lecture_hours: u32,
    /// Weekly practical hours.
    pub practical_hours: u32,
    /// Practicals are taught to subgroups and need a lab room.
    pub requires_subgroups: bool,
}

/// Unchecked wire form; deserialization goes through [`Subject::new`].
#[derive(Deserialize)]
struct RawSubject {
    id: String,
    name: String,
    lecture_hours: u32,
    practical_hours: u32,
    #[serde(default)]
    requires_subgroups: bool,
}

impl TryFrom<RawSubject> for Subject {
    type Error = TimetableError;

    fn try_from(raw: RawSubject) -> Result<Self> {
        Ok(Self::new(raw.id, raw.name, raw.lecture_hours, raw.practical_hours)?
            .with_subgroups(raw.requires_subgroups))
    }
}

impl Subject {
    /// Creates a subject. Rejects subjects with zero total hours or a
    /// total that does not fit in `u32`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lecture_hours: u32,
        practical_hours: u32,
    ) -> Result<Self> {
        let id = id.into();
        match lecture_hours.checked_add(practical_hours) {
            Some(0) => {
                return Err(TimetableError::InvalidSubject {
                    id,
                    reason: "total hours must be positive".into(),
                })
            }
            None => {
                return Err(TimetableError::InvalidSubject {
                    id,
                    reason: format!("{lecture_hours} + {practical_hours} hours overflows"),
                })
            }
            Some(_) => {}
        }
        Ok(Self {
            id,
            name: name.into(),
            lecture_hours,
            practical_hours,
            requires_subgroups: false,
        })
    }

    /// Marks practicals of this subject as subgroup (lab) classes.
    pub fn with_subgroups(mut self, requires_subgroups: bool) -> Self {
        self.requires_subgroups = requires_subgroups;
        self
    }

    /// Lecture plus practical hours.
    #[inline]
    pub fn total_hours(&self) -> u32 {
        self.lecture_hours.saturating_add(self.practical_hours)
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Subject {}

impl Hash for Subject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
