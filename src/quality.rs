//! Soft constraints and the schedule quality score.
//!
//! Soft constraints lower a schedule's score without making it unusable.
//!
//! | Kind | Scope | Trigger | Severity |
//! |------|-------|---------|----------|
//! | `lecturer_hours` | lecturer × constrained subject | occupied slots × 1.5h > subject cap | 0.5 |
//! | `daily_load` | group × day | slots × 1.5h > 6h | 0.3 |
//! | `schedule_gaps` | group × day | idle periods between first and last class | 0.2 per gap |
//! | `subject_distribution` | group × subject | ≥2 classes, all on one day | 0.3 |
//! | `room_suitability` | entry | subgroup practical outside a lab | 0.4 |
//!
//! # Score
//!
//! `100 − Σ severity`, floored at 0, and forced to 0 when a hard
//! constraint fails. The aggregate re-runs the lecturer and group checks
//! for every (slot, entry) visited, so an entity's violations are counted
//! once per entry it appears in. Busier lecturers and groups therefore
//! weigh more; [`entity_violations`] gives the deduplicated view.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::models::{Group, Lecturer, Schedule, TimeSlot, HOURS_PER_SLOT};
use crate::validation::validate;

/// Score of a schedule with no soft violations.
pub const MAX_SCORE: f64 = 100.0;
/// Daily hours a group may attend before `daily_load` triggers.
pub const MAX_DAILY_HOURS: f64 = 6.0;

const LECTURER_HOURS_SEVERITY: f64 = 0.5;
const DAILY_LOAD_SEVERITY: f64 = 0.3;
const GAP_SEVERITY: f64 = 0.2;
const DISTRIBUTION_SEVERITY: f64 = 0.3;
const ROOM_SEVERITY: f64 = 0.4;

/// Soft constraint categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Lecturer's weekly load exceeds a subject cap.
    LecturerHours,
    /// Group attends too many hours in one day.
    DailyLoad,
    /// Group has idle periods inside its day.
    ScheduleGaps,
    /// All classes of a subject fall on one day.
    SubjectDistribution,
    /// Subgroup practical held outside a lab.
    RoomSuitability,
}

impl ViolationKind {
    /// Snake-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LecturerHours => "lecturer_hours",
            Self::DailyLoad => "daily_load",
            Self::ScheduleGaps => "schedule_gaps",
            Self::SubjectDistribution => "subject_distribution",
            Self::RoomSuitability => "room_suitability",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A soft constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Violated constraint.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
    /// Score penalty.
    pub severity: f64,
}

impl ConstraintViolation {
    fn new(kind: ViolationKind, message: String, severity: f64) -> Self {
        Self {
            kind,
            message,
            severity,
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (severity {:.1})", self.kind, self.message, self.severity)
    }
}

/// Weekly load check.
///
/// The load is the lecturer's total occupied-slot count across all
/// subjects, compared against each constrained subject's own cap. One
/// violation per subject whose cap is exceeded.
pub fn check_lecturer_hours(schedule: &Schedule, lecturer: &Lecturer) -> Vec<ConstraintViolation> {
    let weekly_hours = schedule.lecturer_slots(&lecturer.id).len() as f64 * HOURS_PER_SLOT;

    lecturer
        .subject_constraints
        .values()
        .filter(|c| weekly_hours > f64::from(c.max_hours_per_week))
        .map(|c| {
            ConstraintViolation::new(
                ViolationKind::LecturerHours,
                format!(
                    "Lecturer {} exceeds maximum weekly hours ({weekly_hours} > {})",
                    lecturer.name, c.max_hours_per_week
                ),
                LECTURER_HOURS_SEVERITY,
            )
        })
        .collect()
}

/// Per-day load check for a group.
pub fn check_daily_load(schedule: &Schedule, group: &Group) -> Vec<ConstraintViolation> {
    periods_by_day(schedule, group)
        .into_iter()
        .filter_map(|(day, periods)| {
            let hours = periods.len() as f64 * HOURS_PER_SLOT;
            (hours > MAX_DAILY_HOURS).then(|| {
                ConstraintViolation::new(
                    ViolationKind::DailyLoad,
                    format!("Group {} has too many classes on day {day} ({hours} hours)", group.name),
                    DAILY_LOAD_SEVERITY,
                )
            })
        })
        .collect()
}

/// Idle-period check for a group.
///
/// On each day with classes, gaps = span of used periods − periods used.
pub fn check_schedule_gaps(schedule: &Schedule, group: &Group) -> Vec<ConstraintViolation> {
    periods_by_day(schedule, group)
        .into_iter()
        .filter_map(|(day, periods)| {
            let first = *periods.first()?;
            let last = *periods.last()?;
            let gaps = usize::from(last - first) + 1 - periods.len();
            (gaps > 0).then(|| {
                ConstraintViolation::new(
                    ViolationKind::ScheduleGaps,
                    format!("Group {} has {gaps} gap(s) on day {day}", group.name),
                    GAP_SEVERITY * gaps as f64,
                )
            })
        })
        .collect()
}

/// Spread check: a subject taught in several slots should not sit on one day.
pub fn check_subject_distribution(schedule: &Schedule, group: &Group) -> Vec<ConstraintViolation> {
    let mut subject_slots: BTreeMap<&str, Vec<TimeSlot>> = BTreeMap::new();
    for (slot, entry) in schedule.entries() {
        if entry.has_group(&group.id) {
            subject_slots.entry(&entry.subject.id).or_default().push(slot);
        }
    }

    subject_slots
        .into_iter()
        .filter(|(_, slots)| slots.len() > 1)
        .filter(|(_, slots)| slots.iter().all(|s| s.day() == slots[0].day()))
        .map(|(subject_id, _)| {
            ConstraintViolation::new(
                ViolationKind::SubjectDistribution,
                format!(
                    "All classes of subject {subject_id} for group {} are on the same day",
                    group.name
                ),
                DISTRIBUTION_SEVERITY,
            )
        })
        .collect()
}

/// Lab check: practicals of subgroup subjects belong in lab rooms.
pub fn check_room_suitability(schedule: &Schedule) -> Vec<ConstraintViolation> {
    schedule
        .entries()
        .filter(|(_, e)| !e.is_lecture && e.subject.requires_subgroups && !e.classroom.is_lab)
        .map(|(_, e)| {
            ConstraintViolation::new(
                ViolationKind::RoomSuitability,
                format!(
                    "Practical class for {} scheduled in non-lab room {}",
                    e.subject.name, e.classroom.name
                ),
                ROOM_SEVERITY,
            )
        })
        .collect()
}

/// All soft violations, counted the way the score counts them.
///
/// For every (slot, entry): the entry's lecturer is checked, then every
/// attending group (daily load, gaps, distribution). One room pass follows.
pub fn violations(schedule: &Schedule) -> Vec<ConstraintViolation> {
    let mut out = Vec::new();
    for (_, entry) in schedule.entries() {
        out.extend(check_lecturer_hours(schedule, &entry.lecturer));
        for group in &entry.groups {
            out.extend(check_group(schedule, group));
        }
    }
    out.extend(check_room_suitability(schedule));
    out
}

/// Soft violations with each lecturer and group checked exactly once.
pub fn entity_violations(
    schedule: &Schedule,
    lecturers: &[Lecturer],
    groups: &[Group],
) -> Vec<ConstraintViolation> {
    let mut out: Vec<ConstraintViolation> = lecturers
        .iter()
        .flat_map(|l| check_lecturer_hours(schedule, l))
        .collect();
    for group in groups {
        out.extend(check_group(schedule, group));
    }
    out.extend(check_room_suitability(schedule));
    out
}

/// Quality score in `[0, 100]`; 0 for infeasible schedules.
pub fn quality_score(schedule: &Schedule) -> f64 {
    if !validate(schedule) {
        return 0.0;
    }
    score_from(&violations(schedule))
}

fn score_from(violations: &[ConstraintViolation]) -> f64 {
    let penalty: f64 = violations.iter().map(|v| v.severity).sum();
    (MAX_SCORE - penalty).max(0.0)
}

fn check_group(schedule: &Schedule, group: &Group) -> Vec<ConstraintViolation> {
    let mut out = check_daily_load(schedule, group);
    out.extend(check_schedule_gaps(schedule, group));
    out.extend(check_subject_distribution(schedule, group));
    out
}

fn periods_by_day(schedule: &Schedule, group: &Group) -> BTreeMap<u8, BTreeSet<u8>> {
    let mut by_day: BTreeMap<u8, BTreeSet<u8>> = BTreeMap::new();
    for slot in schedule.group_slots(&group.id) {
        by_day.entry(slot.day()).or_default().insert(slot.period());
    }
    by_day
}

/// Score and violations of one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Quality score in `[0, 100]`.
    pub score: f64,
    /// Whether all hard constraints hold.
    pub feasible: bool,
    /// Aggregate soft violations (per-visit counting).
    pub violations: Vec<ConstraintViolation>,
}

impl QualityReport {
    /// Evaluates a schedule.
    pub fn calculate(schedule: &Schedule) -> Self {
        let feasible = validate(schedule);
        let violations = violations(schedule);
        let score = if feasible { score_from(&violations) } else { 0.0 };
        Self {
            score,
            feasible,
            violations,
        }
    }

    /// Total severity of the recorded violations.
    pub fn total_penalty(&self) -> f64 {
        self.violations.iter().map(|v| v.severity).sum()
    }

    /// Number of violations of one kind.
    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, LecturerConstraints, ScheduleEntry, Subject};

    fn subject(id: &str) -> Subject {
        Subject::new(id, id, 2, 2).unwrap()
    }

    fn lecturer(id: &str, cap: u32) -> Lecturer {
        Lecturer::new(id, id).with_subject_constraint("MATH", LecturerConstraints::new(true, true, cap))
    }

    fn room() -> Classroom {
        Classroom::new("R1", "Room 1", 40).unwrap()
    }

    fn group(id: &str) -> Group {
        Group::new(id, id, 20).unwrap()
    }

    fn place(s: &mut Schedule, day: u8, period: u8, subj: &str, l: &Lecturer, g: &Group) {
        s.add_entry(
            TimeSlot::at(day, period),
            ScheduleEntry::new(subject(subj), l.clone(), room(), g.clone(), true),
        );
    }

    #[test]
    fn test_empty_schedule_scores_max() {
        let s = Schedule::new();
        assert!(violations(&s).is_empty());
        assert!((quality_score(&s) - MAX_SCORE).abs() < 1e-10);
    }

    #[test]
    fn test_lecturer_hours_over_cap() {
        // 5 slots × 1.5h = 7.5h > 6h
        let l = lecturer("L1", 6);
        let g = group("G1");
        let mut s = Schedule::new();
        for day in 0..5 {
            place(&mut s, day, 0, "MATH", &l, &g);
        }
        let v = check_lecturer_hours(&s, &l);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::LecturerHours);
        assert!((v[0].severity - 0.5).abs() < 1e-10);
        assert!(v[0].message.contains("7.5 > 6"));
    }

    #[test]
    fn test_lecturer_hours_counts_all_subjects_against_each_cap() {
        let l = Lecturer::new("L1", "L1")
            .with_subject_constraint("A", LecturerConstraints::new(true, true, 3))
            .with_subject_constraint("B", LecturerConstraints::new(true, true, 30));
        let g = group("G1");
        let mut s = Schedule::new();
        place(&mut s, 0, 0, "A", &l, &g);
        place(&mut s, 1, 0, "B", &l, &g);
        place(&mut s, 2, 0, "B", &l, &g);
        // 4.5h total exceeds A's cap although only one slot is A
        let v = check_lecturer_hours(&s, &l);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_daily_load_never_triggers_on_four_periods() {
        let l = lecturer("L1", 40);
        let g = group("G1");
        let mut s = Schedule::new();
        for p in 0..4 {
            place(&mut s, 0, p, "MATH", &l, &g);
        }
        // 4 × 1.5 = 6.0, not > 6.0
        assert!(check_daily_load(&s, &g).is_empty());
    }

    #[test]
    fn test_schedule_gaps() {
        let l = lecturer("L1", 40);
        let g = group("G1");
        let mut s = Schedule::new();
        place(&mut s, 1, 0, "MATH", &l, &g);
        place(&mut s, 1, 3, "MATH", &l, &g);
        let v = check_schedule_gaps(&s, &g);
        assert_eq!(v.len(), 1);
        assert!((v[0].severity - 0.4).abs() < 1e-10);
        assert!(v[0].message.contains("2 gap(s) on day 1"));
    }

    #[test]
    fn test_no_gaps_for_contiguous_day() {
        let l = lecturer("L1", 40);
        let g = group("G1");
        let mut s = Schedule::new();
        place(&mut s, 1, 1, "MATH", &l, &g);
        place(&mut s, 1, 2, "MATH", &l, &g);
        assert!(check_schedule_gaps(&s, &g).is_empty());
    }

    #[test]
    fn test_subject_distribution() {
        let l = lecturer("L1", 40);
        let g = group("G1");
        let mut s = Schedule::new();
        place(&mut s, 2, 0, "MATH", &l, &g);
        place(&mut s, 2, 1, "MATH", &l, &g);
        place(&mut s, 3, 0, "PHY", &l, &g);
        let v = check_subject_distribution(&s, &g);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("MATH"));

        place(&mut s, 4, 0, "MATH", &l, &g);
        assert!(check_subject_distribution(&s, &g).is_empty());
    }

    #[test]
    fn test_room_suitability() {
        let lab_subject = Subject::new("CHEM", "Chemistry", 0, 2).unwrap().with_subgroups(true);
        let l = lecturer("L1", 40);
        let mut s = Schedule::new();
        s.add_entry(
            TimeSlot::at(0, 0),
            ScheduleEntry::new(lab_subject.clone(), l.clone(), room(), group("G1"), false),
        );
        s.add_entry(
            TimeSlot::at(0, 1),
            ScheduleEntry::new(
                lab_subject,
                l,
                Classroom::new("LAB", "Lab", 30).unwrap().as_lab(),
                group("G1"),
                false,
            ),
        );
        let v = check_room_suitability(&s);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::RoomSuitability);
    }

    #[test]
    fn test_aggregate_counts_per_visit() {
        // Lecturer over cap across 5 entries: the lecturer check runs 5 times.
        let l = lecturer("L1", 6);
        let g = group("G1");
        let mut s = Schedule::new();
        for day in 0..5 {
            place(&mut s, day, 0, "MATH", &l, &g);
        }
        let all = violations(&s);
        let hours = all
            .iter()
            .filter(|v| v.kind == ViolationKind::LecturerHours)
            .count();
        assert_eq!(hours, 5);
        assert!((quality_score(&s) - 97.5).abs() < 1e-10);

        let unique = entity_violations(&s, &[l], &[g]);
        assert_eq!(unique.len(), 1);
    }

    #[test]
    fn test_infeasible_scores_zero() {
        let l = lecturer("L1", 40);
        let mut s = Schedule::new();
        place(&mut s, 0, 0, "MATH", &l, &group("G1"));
        place(&mut s, 0, 0, "MATH", &l, &group("G2"));
        assert!(!validate(&s));
        assert_eq!(quality_score(&s), 0.0);

        let report = QualityReport::calculate(&s);
        assert!(!report.feasible);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_gap_violations_scale_with_visits() {
        let g = group("G1");
        let mut s = Schedule::new();
        for day in 0..5 {
            let early = Lecturer::new(format!("A{day}"), "A");
            let late = Lecturer::new(format!("B{day}"), "B");
            place(&mut s, day, 0, "MATH", &early, &g);
            place(&mut s, day, 3, "MATH", &late, &g);
        }
        // 10 entries, each re-checking 5 gapped days
        let report = QualityReport::calculate(&s);
        assert_eq!(report.count(ViolationKind::ScheduleGaps), 50);
        assert!((report.total_penalty() - 20.0).abs() < 1e-9);
        assert!((report.score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_floored_at_zero() {
        let mut l = Lecturer::new("L1", "Busy");
        for i in 0..11 {
            l.add_subject_constraint(format!("S{i}"), LecturerConstraints::new(true, true, 0));
        }
        let g = group("G1");
        let mut s = Schedule::new();
        for slot in TimeSlot::all() {
            place(&mut s, slot.day(), slot.period(), "MATH", &l, &g);
        }
        // 20 visits × 11 capped subjects × 0.5
        assert!(validate(&s));
        assert_eq!(quality_score(&s), 0.0);
        assert!(QualityReport::calculate(&s).total_penalty() > MAX_SCORE);
    }

    #[test]
    fn test_violation_kind_serde() {
        let v = ConstraintViolation::new(ViolationKind::DailyLoad, "x".into(), 0.3);
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"daily_load\""));
        assert_eq!(v.kind.to_string(), "daily_load");
    }
}
