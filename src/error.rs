//! Crate-wide error type.
//!
//! Only genuine failures surface here: malformed entity data rejected at
//! construction, an invalid optimizer configuration, or a run that cannot
//! start because no feasible schedule could be built. Ordinary placement
//! failures during construction are absorbed and reported as data instead.

use thiserror::Error;

/// Errors raised by the timetabling core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimetableError {
    /// Subject hours are inconsistent (e.g. zero total hours).
    #[error("invalid subject '{id}': {reason}")]
    InvalidSubject { id: String, reason: String },

    /// Classroom capacity or location is out of range.
    #[error("invalid classroom '{id}': {reason}")]
    InvalidClassroom { id: String, reason: String },

    /// Group headcount is out of range.
    #[error("invalid group '{id}': {reason}")]
    InvalidGroup { id: String, reason: String },

    /// Subgroup partition does not match the parent group.
    #[error("invalid subgroups for group '{group_id}': {reason}")]
    InvalidSubgroups { group_id: String, reason: String },

    /// (day, period) outside the 5 × 4 weekly grid.
    #[error("time slot (day {day}, period {period}) is outside the weekly grid")]
    SlotOutOfRange { day: u8, period: u8 },

    /// No lecturer is able to teach the subject in the requested mode.
    #[error("no lecturer can teach subject '{subject_id}' as {mode}")]
    NoQualifiedLecturer {
        subject_id: String,
        mode: &'static str,
    },

    /// Construction produced no feasible schedule within its attempt budget.
    #[error("initial population is empty after {attempts} construction attempts")]
    EmptyPopulation { attempts: usize },

    /// Optimizer parameters are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for fallible timetabling operations.
pub type Result<T> = std::result::Result<T, TimetableError>;
