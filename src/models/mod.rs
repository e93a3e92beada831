//! Timetabling domain models.
//!
//! Entity records (subjects, lecturers, groups, classrooms), the fixed
//! weekly time grid, and the schedule that ties them together.
//!
//! # Identity
//!
//! `Subject`, `Lecturer`, `Group`, `Subgroup` and `Classroom` compare and
//! hash by `id` only. Lecturers and groups are built up incrementally, so
//! content equality would be meaningless.
//!
//! # Validation
//!
//! Constructors reject malformed data (zero hours, zero capacity, empty
//! groups, inconsistent subgroup partitions). Schedule-level feasibility
//! is checked separately by [`crate::validation`].

mod classroom;
mod group;
mod lecturer;
mod schedule;
mod subject;
mod time_slot;

pub use classroom::Classroom;
pub use group::{Group, Subgroup};
pub use lecturer::{Lecturer, LecturerConstraints};
pub use schedule::{Schedule, ScheduleEntry};
pub use subject::Subject;
pub use time_slot::{
    TimeSlot, DAYS_PER_WEEK, HOURS_PER_SLOT, PERIODS_PER_DAY, SLOTS_PER_WEEK,
};
