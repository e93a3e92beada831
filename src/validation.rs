//! Feasibility and input validation.
//!
//! Two layers:
//! - [`validate`] / [`check`]: hard constraints of a schedule. A schedule
//!   failing these is unusable and scores zero.
//! - [`validate_input`]: structural integrity of the entity collections
//!   before scheduling (duplicate ids, dangling subject references).
//!
//! # Hard constraints (per slot)
//! 0. Every entry has at least one attending group.
//! 1. No lecturer teaches two entries.
//! 2. No group attends two entries.
//! 3. A classroom hosts several entries only if every entry using it is a
//!    lecture of the same subject by the same lecturer.
//! 4. Room capacity covers the attending groups' headcount.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Classroom, Group, Lecturer, Schedule, ScheduleEntry, Subject, TimeSlot};

/// The first hard constraint found broken in a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardViolation {
    /// An entry has no attending group.
    #[error("class of subject '{subject_id}' at {slot} has no group")]
    NoGroups { slot: TimeSlot, subject_id: String },
    /// A lecturer teaches two entries in one slot.
    #[error("lecturer '{lecturer_id}' is double-booked at {slot}")]
    LecturerClash { slot: TimeSlot, lecturer_id: String },
    /// A group attends two entries in one slot.
    #[error("group '{group_id}' is double-booked at {slot}")]
    GroupClash { slot: TimeSlot, group_id: String },
    /// A classroom is shared by entries that may not share it.
    #[error("classroom '{classroom_id}' is double-booked at {slot}")]
    ClassroomClash { slot: TimeSlot, classroom_id: String },
    /// Attending students exceed room capacity.
    #[error("classroom '{classroom_id}' seats {capacity} but {students} students attend at {slot}")]
    OverCapacity {
        slot: TimeSlot,
        classroom_id: String,
        students: u32,
        capacity: u32,
    },
}

/// Checks all hard constraints, returning the first violation.
///
/// Single pass per slot, rebuilding the in-use sets of lecturers, groups
/// and classrooms.
pub fn check(schedule: &Schedule) -> Result<(), HardViolation> {
    for (slot, entries) in schedule.slots() {
        let mut lecturers: HashSet<&str> = HashSet::new();
        let mut groups: HashSet<&str> = HashSet::new();
        let mut classrooms: HashSet<&str> = HashSet::new();

        for entry in entries {
            if entry.groups.is_empty() {
                return Err(HardViolation::NoGroups {
                    slot,
                    subject_id: entry.subject.id.clone(),
                });
            }

            if !lecturers.insert(&entry.lecturer.id) {
                return Err(HardViolation::LecturerClash {
                    slot,
                    lecturer_id: entry.lecturer.id.clone(),
                });
            }

            for group in &entry.groups {
                if !groups.insert(&group.id) {
                    return Err(HardViolation::GroupClash {
                        slot,
                        group_id: group.id.clone(),
                    });
                }
            }

            if !classrooms.insert(&entry.classroom.id) && !room_sharing_allowed(entries, entry) {
                return Err(HardViolation::ClassroomClash {
                    slot,
                    classroom_id: entry.classroom.id.clone(),
                });
            }

            let students = entry.student_count();
            if !entry.classroom.can_accommodate(students) {
                return Err(HardViolation::OverCapacity {
                    slot,
                    classroom_id: entry.classroom.id.clone(),
                    students,
                    capacity: entry.classroom.capacity,
                });
            }
        }
    }
    Ok(())
}

/// Whether the schedule satisfies every hard constraint.
#[inline]
pub fn validate(schedule: &Schedule) -> bool {
    check(schedule).is_ok()
}

fn room_sharing_allowed(entries: &[ScheduleEntry], entry: &ScheduleEntry) -> bool {
    entries
        .iter()
        .filter(|e| e.classroom.id == entry.classroom.id)
        .all(|e| e.is_lecture && e.lecturer.id == entry.lecturer.id && e.subject.id == entry.subject.id)
}

/// Input validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// An input integrity error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of input errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an id.
    DuplicateId,
    /// A lecturer or group references a subject that doesn't exist.
    UnknownSubject,
    /// A group's subgroups don't partition its students.
    SubgroupMismatch,
    /// A curriculum needs a lecture/practical nobody can teach.
    UnteachableSubject,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates entity collections before scheduling.
///
/// Checks:
/// 1. No duplicate subject, lecturer, group or classroom ids
/// 2. Lecturer capabilities and group curricula reference known subjects
/// 3. Subgroups sum to their group's headcount
/// 4. Every curriculum lecture/practical has at least one capable lecturer
///
/// Check 4 is advisory: the constructive heuristic tolerates it by
/// dropping the affected classes.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    subjects: &[Subject],
    lecturers: &[Lecturer],
    groups: &[Group],
    classrooms: &[Classroom],
) -> ValidationResult {
    let mut errors = Vec::new();

    check_unique(subjects.iter().map(|s| s.id.as_str()), "subject", &mut errors);
    check_unique(lecturers.iter().map(|l| l.id.as_str()), "lecturer", &mut errors);
    check_unique(groups.iter().map(|g| g.id.as_str()), "group", &mut errors);
    check_unique(classrooms.iter().map(|c| c.id.as_str()), "classroom", &mut errors);

    let subject_ids: HashSet<&str> = subjects.iter().map(|s| s.id.as_str()).collect();

    for lecturer in lecturers {
        for subject_id in lecturer.subject_constraints.keys() {
            if !subject_ids.contains(subject_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Lecturer '{}' references unknown subject '{subject_id}'", lecturer.id),
                ));
            }
        }
    }

    for group in groups {
        for subject_id in group.subjects.keys() {
            if !subject_ids.contains(subject_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Group '{}' references unknown subject '{subject_id}'", group.id),
                ));
            }
        }

        if !group.subgroups.is_empty() {
            let total: u32 = group.subgroups.iter().map(|s| s.student_count).sum();
            if total != group.student_count {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SubgroupMismatch,
                    format!(
                        "Group '{}' has {} students but its subgroups hold {total}",
                        group.id, group.student_count
                    ),
                ));
            }
        }

        for subject in group.subjects.values() {
            for (is_lecture, hours) in [(true, subject.lecture_hours), (false, subject.practical_hours)] {
                if hours > 0 && !lecturers.iter().any(|l| l.can_teach_subject(&subject.id, is_lecture)) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnteachableSubject,
                        format!(
                            "No lecturer can teach {} of '{}' for group '{}'",
                            if is_lecture { "lectures" } else { "practicals" },
                            subject.id,
                            group.id
                        ),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unique<'a>(
    ids: impl Iterator<Item = &'a str>,
    what: &str,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {what} ID: {id}"),
            ));
        }
    }
}
