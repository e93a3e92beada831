//! Classroom model.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::error::{Result, TimetableError};

/// A room classes can be held in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawClassroom")]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Seats (> 0).
    pub capacity: u32,
    /// Equipped as a laboratory.
    pub is_lab: bool,
    /// Building label, if known.
    pub building: Option<String>,
    /// Floor number (≥ 0), if known.
    pub floor: Option<i32>,
}

/// Unchecked wire form; deserialization goes through [`Classroom::new`].
#[derive(Deserialize)]
struct RawClassroom {
    id: String,
    name: String,
    capacity: u32,
    #[serde(default)]
    is_lab: bool,
    #[serde(default)]
    building: Option<String>,
    #[serde(default)]
    floor: Option<i32>,
}

impl TryFrom<RawClassroom> for Classroom {
    type Error = TimetableError;

    fn try_from(raw: RawClassroom) -> Result<Self> {
        let mut room = Self::new(raw.id, raw.name, raw.capacity)?;
        if let Some(floor) = raw.floor {
            check_floor(&room.id, floor)?;
        }
        room.is_lab = raw.is_lab;
        room.building = raw.building;
        room.floor = raw.floor;
        Ok(room)
    }
}

impl Classroom {
    /// Creates a lecture room. Rejects zero capacity.
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Result<Self> {
        let id = id.into();
        if capacity == 0 {
            return Err(TimetableError::InvalidClassroom {
                id,
                reason: "capacity must be positive".into(),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            capacity,
            is_lab: false,
            building: None,
            floor: None,
        })
    }

    /// Marks the room as a laboratory.
    pub fn as_lab(mut self) -> Self {
        self.is_lab = true;
        self
    }

    /// Sets building and floor. Rejects negative floors.
    pub fn with_location(mut self, building: impl Into<String>, floor: i32) -> Result<Self> {
        check_floor(&self.id, floor)?;
        self.building = Some(building.into());
        self.floor = Some(floor);
        Ok(self)
    }

    /// Whether `student_count` students fit.
    #[inline]
    pub fn can_accommodate(&self, student_count: u32) -> bool {
        self.capacity >= student_count
    }
}

fn check_floor(id: &str, floor: i32) -> Result<()> {
    if floor < 0 {
        return Err(TimetableError::InvalidClassroom {
            id: id.to_string(),
            reason: format!("floor {floor} is negative"),
        });
    }
    Ok(())
}

impl PartialEq for Classroom {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Classroom {}

impl Hash for Classroom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
