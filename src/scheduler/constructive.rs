//! Randomized greedy construction of feasible timetables.
//!
//! # Algorithm
//!
//! 1. Expand every group's curriculum into one class request per lecture
//!    hour and per practical hour, then shuffle.
//! 2. For each request, up to `max_attempts` times:
//!    - pick a capable lecturer uniformly at random;
//!    - pick a slot free for both group and lecturer, preferring slots
//!      that do not open gaps in the group's day;
//!    - pick the free room whose capacity best fits the group.
//! 3. Requests that never fit are dropped; the schedule stays partial.
//!
//! Rooms already used in the chosen slot are never shared here, even
//! when the validator would allow it.
//!
//! # Complexity
//! O(r · a · (S + C)) for r requests, a attempts, S = 20 slots, C rooms.

use std::collections::{BTreeMap, HashSet};

use log::{debug, trace, warn};
use rand::prelude::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::error::{Result, TimetableError};
use crate::models::{Classroom, Group, Lecturer, Schedule, ScheduleEntry, Subject, TimeSlot};
use crate::validation;

/// Placement attempts per class request.
pub const DEFAULT_MAX_ATTEMPTS: usize = 20;
/// Construction attempts per requested population member.
pub const DEFAULT_POPULATION_ATTEMPT_FACTOR: usize = 10;

/// One class that has to be placed: a curriculum hour of a group.
#[derive(Debug, Clone, Copy)]
pub struct ClassRequest<'a> {
    /// Attending group.
    pub group: &'a Group,
    /// Subject taught.
    pub subject: &'a Subject,
    /// Lecture (`true`) or practical (`false`).
    pub is_lecture: bool,
}

impl ClassRequest<'_> {
    /// Practicals of subgroup subjects need a lab.
    pub fn requires_lab(&self) -> bool {
        !self.is_lecture && self.subject.requires_subgroups
    }

    fn mode(&self) -> &'static str {
        if self.is_lecture {
            "lecture"
        } else {
            "practical"
        }
    }
}

/// Why a class request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnplacedReason {
    /// Nobody can teach the subject in this mode.
    NoQualifiedLecturer,
    /// No free (lecturer, slot, room) combination within the attempt budget.
    AttemptsExhausted,
}

/// A dropped class request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnplacedClass {
    /// Group id.
    pub group_id: String,
    /// Subject id.
    pub subject_id: String,
    /// Lecture (`true`) or practical (`false`).
    pub is_lecture: bool,
    /// Failure reason.
    pub reason: UnplacedReason,
}

/// Outcome of one full construction.
#[derive(Debug, Clone)]
pub struct Construction {
    /// The (possibly partial) schedule.
    pub schedule: Schedule,
    /// Requests placed.
    pub placed: usize,
    /// Requests dropped.
    pub unplaced: Vec<UnplacedClass>,
}

impl Construction {
    /// Whether every request was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Randomized greedy timetable builder.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use timetable_ga::models::{Classroom, Group, Lecturer, LecturerConstraints, Subject};
/// use timetable_ga::scheduler::ConstructiveScheduler;
///
/// let math = Subject::new("MATH", "Mathematics", 2, 0).unwrap();
/// let groups = vec![Group::new("G1", "Group 1", 20).unwrap().with_subject(math)];
/// let lecturers = vec![Lecturer::new("L1", "Dr. Smith")
///     .with_subject_constraint("MATH", LecturerConstraints::default())];
/// let rooms = vec![Classroom::new("R1", "Room 1", 30).unwrap()];
///
/// let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);
/// let mut rng = SmallRng::seed_from_u64(7);
/// let construction = builder.construct(&mut rng);
/// assert_eq!(construction.schedule.entry_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ConstructiveScheduler<'a> {
    lecturers: &'a [Lecturer],
    groups: &'a [Group],
    classrooms: &'a [Classroom],
    max_attempts: usize,
    population_attempt_factor: usize,
}

impl<'a> ConstructiveScheduler<'a> {
    /// Creates a builder over the given entities.
    pub fn new(lecturers: &'a [Lecturer], groups: &'a [Group], classrooms: &'a [Classroom]) -> Self {
        Self {
            lecturers,
            groups,
            classrooms,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            population_attempt_factor: DEFAULT_POPULATION_ATTEMPT_FACTOR,
        }
    }

    /// Sets the placement attempts per class request.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets construction attempts per requested population member.
    pub fn with_population_attempt_factor(mut self, factor: usize) -> Self {
        self.population_attempt_factor = factor;
        self
    }

    /// Lecturers available to the builder.
    pub fn lecturers(&self) -> &'a [Lecturer] {
        self.lecturers
    }

    /// Groups being scheduled.
    pub fn groups(&self) -> &'a [Group] {
        self.groups
    }

    /// One request per lecture hour and per practical hour of every
    /// curriculum subject, in group/curriculum order.
    pub fn required_classes(&self) -> Vec<ClassRequest<'a>> {
        let mut requests = Vec::new();
        for group in self.groups {
            for subject in group.subjects.values() {
                for _ in 0..subject.lecture_hours {
                    requests.push(ClassRequest {
                        group,
                        subject,
                        is_lecture: true,
                    });
                }
                for _ in 0..subject.practical_hours {
                    requests.push(ClassRequest {
                        group,
                        subject,
                        is_lecture: false,
                    });
                }
            }
        }
        requests
    }

    /// Builds one schedule from scratch.
    pub fn construct<R: Rng>(&self, rng: &mut R) -> Construction {
        let mut requests = self.required_classes();
        requests.shuffle(rng);

        let mut schedule = Schedule::new();
        let mut placed = 0;
        let mut unplaced = Vec::new();

        for request in &requests {
            let reason = match self.place_class(&mut schedule, request, rng) {
                Ok(true) => {
                    placed += 1;
                    continue;
                }
                Ok(false) => UnplacedReason::AttemptsExhausted,
                Err(e) => {
                    trace!("{e}");
                    UnplacedReason::NoQualifiedLecturer
                }
            };
            trace!(
                "dropped {} of '{}' for group '{}': {reason:?}",
                request.mode(),
                request.subject.id,
                request.group.id
            );
            unplaced.push(UnplacedClass {
                group_id: request.group.id.clone(),
                subject_id: request.subject.id.clone(),
                is_lecture: request.is_lecture,
                reason,
            });
        }

        Construction {
            schedule,
            placed,
            unplaced,
        }
    }

    /// Tries to place one class.
    ///
    /// Returns `Ok(true)` when placed, `Ok(false)` when the attempt budget
    /// ran out, and `Err` when no lecturer can teach the class at all.
    pub fn place_class<R: Rng>(
        &self,
        schedule: &mut Schedule,
        request: &ClassRequest<'_>,
        rng: &mut R,
    ) -> Result<bool> {
        let capable: Vec<&Lecturer> = self
            .lecturers
            .iter()
            .filter(|l| l.can_teach_subject(&request.subject.id, request.is_lecture))
            .collect();
        if capable.is_empty() {
            return Err(TimetableError::NoQualifiedLecturer {
                subject_id: request.subject.id.clone(),
                mode: request.mode(),
            });
        }

        let group = request.group;
        for _ in 0..self.max_attempts {
            let Some(&lecturer) = capable.choose(rng) else {
                break;
            };
            let Some(slot) = self.find_available_slot(schedule, group, lecturer, rng) else {
                continue;
            };
            let Some(room) =
                self.find_suitable_classroom(schedule, slot, group.student_count, request.requires_lab())
            else {
                continue;
            };

            let mut entry = ScheduleEntry::new(
                request.subject.clone(),
                lecturer.clone(),
                room.clone(),
                group.clone(),
                request.is_lecture,
            );
            if request.requires_lab() && !group.subgroups.is_empty() {
                entry = entry.with_subgroups(group.subgroups.clone());
            }
            schedule.add_entry(slot, entry);
            return Ok(true);
        }

        Ok(false)
    }

    /// Picks a slot free for both group and lecturer.
    ///
    /// Slots are ranked by [`gap_penalty`] against the group's existing
    /// classes that day; ties among the best are broken uniformly.
    pub fn find_available_slot<R: Rng>(
        &self,
        schedule: &Schedule,
        group: &Group,
        lecturer: &Lecturer,
        rng: &mut R,
    ) -> Option<TimeSlot> {
        let group_slots = schedule.group_slots(&group.id);
        let lecturer_slots = schedule.lecturer_slots(&lecturer.id);

        let mut span_by_day: BTreeMap<u8, (u8, u8)> = BTreeMap::new();
        for slot in &group_slots {
            span_by_day
                .entry(slot.day())
                .and_modify(|(lo, hi)| {
                    *lo = (*lo).min(slot.period());
                    *hi = (*hi).max(slot.period());
                })
                .or_insert((slot.period(), slot.period()));
        }

        let mut best: Vec<TimeSlot> = Vec::new();
        let mut best_penalty = u8::MAX;
        for slot in TimeSlot::all() {
            if group_slots.contains(&slot) || lecturer_slots.contains(&slot) {
                continue;
            }
            let penalty = gap_penalty(span_by_day.get(&slot.day()).copied(), slot.period());
            if penalty < best_penalty {
                best_penalty = penalty;
                best.clear();
            }
            if penalty == best_penalty {
                best.push(slot);
            }
        }

        best.choose(rng).copied()
    }

    /// Picks an unused room in `slot` that seats `student_count` (and is a
    /// lab when required), closest in capacity to the headcount.
    pub fn find_suitable_classroom(
        &self,
        schedule: &Schedule,
        slot: TimeSlot,
        student_count: u32,
        requires_lab: bool,
    ) -> Option<&'a Classroom> {
        let occupied: HashSet<&str> = schedule
            .entries_at(slot)
            .iter()
            .map(|e| e.classroom.id.as_str())
            .collect();

        self.classrooms
            .iter()
            .filter(|c| !occupied.contains(c.id.as_str()))
            .filter(|c| c.can_accommodate(student_count))
            .filter(|c| !requires_lab || c.is_lab)
            .min_by_key(|c| c.capacity.abs_diff(student_count))
    }

    /// Builds up to `size` feasible schedules.
    ///
    /// Runs at most `size × population_attempt_factor` constructions and
    /// keeps only those passing [`validation::validate`]. An under-filled
    /// population is logged and returned; an empty one is an error.
    pub fn initial_population<R: Rng>(&self, size: usize, rng: &mut R) -> Result<Vec<Schedule>> {
        let max_attempts = size * self.population_attempt_factor;
        let mut population = Vec::with_capacity(size);
        let mut attempts = 0;

        while population.len() < size && attempts < max_attempts {
            attempts += 1;
            let construction = self.construct(rng);
            match validation::check(&construction.schedule) {
                Ok(()) => population.push(construction.schedule),
                Err(violation) => debug!("discarding infeasible construction: {violation}"),
            }
        }

        if population.is_empty() {
            return Err(TimetableError::EmptyPopulation { attempts });
        }
        if population.len() < size {
            warn!(
                "could only generate {} of {size} valid schedules in {attempts} attempts",
                population.len()
            );
        }
        Ok(population)
    }
}

/// Gap cost of placing a class at `period` given the group's existing
/// (first, last) period that day.
///
/// 0 on an empty day, the distance outside the span otherwise, and 1
/// for a period inside the span.
pub fn gap_penalty(span: Option<(u8, u8)>, period: u8) -> u8 {
    match span {
        None => 0,
        Some((first, _)) if period < first => first - period,
        Some((_, last)) if period > last => period - last,
        Some(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LecturerConstraints;
    use crate::quality::{self, ViolationKind};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn lecturer(id: &str, subject: &str, lecture: bool, practice: bool) -> Lecturer {
        Lecturer::new(id, id)
            .with_subject_constraint(subject, LecturerConstraints::new(lecture, practice, 10))
    }

    #[test]
    fn test_gap_penalty() {
        assert_eq!(gap_penalty(None, 2), 0);
        assert_eq!(gap_penalty(Some((2, 3)), 0), 2);
        assert_eq!(gap_penalty(Some((1, 1)), 3), 2);
        assert_eq!(gap_penalty(Some((1, 1)), 2), 1);
        assert_eq!(gap_penalty(Some((0, 3)), 2), 1);
    }

    #[test]
    fn test_required_classes() {
        let groups = vec![Group::new("G1", "G1", 20)
            .unwrap()
            .with_subject(Subject::new("A", "A", 2, 1).unwrap())
            .with_subject(Subject::new("B", "B", 0, 3).unwrap())];
        let builder = ConstructiveScheduler::new(&[], &groups, &[]);
        let requests = builder.required_classes();
        assert_eq!(requests.len(), 6);
        assert_eq!(requests.iter().filter(|r| r.is_lecture).count(), 2);
    }

    // Scenario A
    #[test]
    fn test_single_group_two_lectures() {
        let x = Subject::new("X", "Subject X", 2, 0).unwrap();
        let groups = vec![Group::new("G", "Group G", 20).unwrap().with_subject(x)];
        let lecturers = vec![lecturer("L1", "X", true, false)];
        let rooms = vec![Classroom::new("R1", "Room 1", 30).unwrap()];
        let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);

        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let c = builder.construct(&mut rng);
            assert_eq!(c.placed, 2);
            assert!(c.is_complete());
            assert_eq!(c.schedule.entry_count(), 2);

            let slots: Vec<_> = c.schedule.occupied_slots().into_iter().collect();
            assert_eq!(slots.len(), 2);
            // the zero-penalty preference puts the second class on a fresh day
            assert_ne!(slots[0].day(), slots[1].day());
            assert!(validation::validate(&c.schedule));
            assert!(quality::check_schedule_gaps(&c.schedule, &groups[0]).is_empty());
        }
    }

    // Scenario B
    #[test]
    fn test_contended_lecturer_drops_classes() {
        let s = Subject::new("S", "Shared", 12, 0).unwrap();
        let groups = vec![
            Group::new("G1", "G1", 20).unwrap().with_subject(s.clone()),
            Group::new("G2", "G2", 20).unwrap().with_subject(s),
        ];
        let lecturers = vec![lecturer("L1", "S", true, true)];
        let rooms = vec![Classroom::new("R1", "Room 1", 30).unwrap()];
        let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);

        let mut rng = SmallRng::seed_from_u64(42);
        let c = builder.construct(&mut rng);
        assert_eq!(c.placed + c.unplaced.len(), 24);
        assert!(c.placed <= 20);
        assert!(!c.unplaced.is_empty());
        assert!(c
            .unplaced
            .iter()
            .all(|u| u.reason == UnplacedReason::AttemptsExhausted));
        assert_eq!(c.schedule.entry_count(), c.placed);
        assert!(validation::validate(&c.schedule));
    }

    #[test]
    fn test_no_qualified_lecturer() {
        let s = Subject::new("S", "S", 1, 1).unwrap();
        let groups = vec![Group::new("G1", "G1", 20).unwrap().with_subject(s)];
        let lecturers = vec![lecturer("L1", "S", true, false)];
        let rooms = vec![Classroom::new("R1", "Room 1", 30).unwrap()];
        let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);

        let requests = builder.required_classes();
        let practical = requests.iter().find(|r| !r.is_lecture).unwrap();
        let mut schedule = Schedule::new();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            builder.place_class(&mut schedule, practical, &mut rng),
            Err(TimetableError::NoQualifiedLecturer { .. })
        ));

        let c = builder.construct(&mut rng);
        assert_eq!(c.placed, 1);
        assert_eq!(c.unplaced.len(), 1);
        assert_eq!(c.unplaced[0].reason, UnplacedReason::NoQualifiedLecturer);
        assert!(!c.unplaced[0].is_lecture);
    }

    #[test]
    fn test_classroom_best_fit_and_exclusion() {
        let rooms = vec![
            Classroom::new("BIG", "Big", 100).unwrap(),
            Classroom::new("FIT", "Fit", 25).unwrap(),
            Classroom::new("SMALL", "Small", 10).unwrap(),
            Classroom::new("LAB", "Lab", 40).unwrap().as_lab(),
        ];
        let builder = ConstructiveScheduler::new(&[], &[], &rooms);
        let slot = TimeSlot::at(0, 0);
        let mut schedule = Schedule::new();

        let pick = builder.find_suitable_classroom(&schedule, slot, 20, false).unwrap();
        assert_eq!(pick.id, "FIT");
        let lab = builder.find_suitable_classroom(&schedule, slot, 20, true).unwrap();
        assert_eq!(lab.id, "LAB");

        let s = Subject::new("S", "S", 1, 0).unwrap();
        let l = lecturer("L1", "S", true, true);
        let g = Group::new("G1", "G1", 20).unwrap();
        schedule.add_entry(slot, ScheduleEntry::new(s, l, rooms[1].clone(), g, true));
        let next = builder.find_suitable_classroom(&schedule, slot, 20, false).unwrap();
        assert_eq!(next.id, "LAB");
        assert!(builder.find_suitable_classroom(&schedule, slot, 200, false).is_none());
    }

    #[test]
    fn test_slot_search_respects_occupancy() {
        let s = Subject::new("S", "S", 1, 0).unwrap();
        let l = lecturer("L1", "S", true, true);
        let g = Group::new("G1", "G1", 20).unwrap();
        let room = Classroom::new("R1", "R1", 30).unwrap();
        let builder = ConstructiveScheduler::new(&[], &[], &[]);

        let mut schedule = Schedule::new();
        for slot in TimeSlot::all().filter(|s| *s != TimeSlot::at(3, 2)) {
            let other = Group::new(format!("X{}{}", slot.day(), slot.period()), "X", 5).unwrap();
            schedule.add_entry(slot, ScheduleEntry::new(s.clone(), l.clone(), room.clone(), other, true));
        }
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(
            builder.find_available_slot(&schedule, &g, &l, &mut rng),
            Some(TimeSlot::at(3, 2))
        );

        schedule.add_entry(TimeSlot::at(3, 2), ScheduleEntry::new(s, l.clone(), room, g.clone(), true));
        assert_eq!(builder.find_available_slot(&schedule, &g, &l, &mut rng), None);
    }

    #[test]
    fn test_slot_search_prefers_adjacent_periods() {
        let s = Subject::new("S", "S", 1, 0).unwrap();
        let l = lecturer("L1", "S", true, true);
        let other = lecturer("L2", "S", true, true);
        let g = Group::new("G1", "G1", 20).unwrap();
        let room = Classroom::new("R1", "R1", 30).unwrap();
        let builder = ConstructiveScheduler::new(&[], &[], &[]);

        // group busy on day 0 period 1; lecturer L1 busy everywhere on days 1..5
        let mut schedule = Schedule::new();
        schedule.add_entry(TimeSlot::at(0, 1), ScheduleEntry::new(s.clone(), other, room.clone(), g.clone(), true));
        for slot in TimeSlot::all().filter(|s| s.day() > 0) {
            let filler = Group::new(format!("F{}{}", slot.day(), slot.period()), "F", 5).unwrap();
            schedule.add_entry(slot, ScheduleEntry::new(s.clone(), l.clone(), room.clone(), filler, true));
        }

        for seed in 0..10 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let slot = builder.find_available_slot(&schedule, &g, &l, &mut rng).unwrap();
            assert_eq!(slot.day(), 0);
            assert!(slot.period() == 0 || slot.period() == 2);
        }
    }

    // Scenario C
    #[test]
    fn test_subgroup_practicals_need_labs() {
        let chem = Subject::new("CHEM", "Chemistry", 0, 2).unwrap().with_subgroups(true);
        let mut g = Group::new("G1", "G1", 20).unwrap().with_subject(chem.clone());
        g.create_subgroups(2).unwrap();
        let groups = vec![g];
        let lecturers = vec![lecturer("L1", "CHEM", false, true)];
        let rooms = vec![Classroom::new("R1", "Room 1", 30).unwrap()];
        let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);

        // the builder never places them in a non-lab room
        let mut rng = SmallRng::seed_from_u64(5);
        let c = builder.construct(&mut rng);
        assert_eq!(c.placed, 0);
        assert_eq!(c.unplaced.len(), 2);

        // placed by hand, each one costs a room_suitability violation
        let mut schedule = Schedule::new();
        for day in 0..2 {
            schedule.add_entry(
                TimeSlot::at(day, 0),
                ScheduleEntry::new(chem.clone(), lecturers[0].clone(), rooms[0].clone(), groups[0].clone(), false),
            );
        }
        assert!(validation::validate(&schedule));
        let room_violations: Vec<_> = quality::violations(&schedule)
            .into_iter()
            .filter(|v| v.kind == ViolationKind::RoomSuitability)
            .collect();
        assert_eq!(room_violations.len(), 2);
        assert!(room_violations.iter().all(|v| (v.severity - 0.4).abs() < 1e-10));

        // with a lab available the builder attaches the subgroups
        let rooms = vec![Classroom::new("LAB", "Lab", 30).unwrap().as_lab()];
        let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);
        let c = builder.construct(&mut rng);
        assert_eq!(c.placed, 2);
        assert!(c
            .schedule
            .entries()
            .all(|(_, e)| e.subgroups.as_ref().map(Vec::len) == Some(2)));
    }

    #[test]
    fn test_initial_population() {
        let s = Subject::new("S", "S", 3, 1).unwrap();
        let groups = vec![
            Group::new("G1", "G1", 20).unwrap().with_subject(s.clone()),
            Group::new("G2", "G2", 25).unwrap().with_subject(s),
        ];
        let lecturers = vec![lecturer("L1", "S", true, true), lecturer("L2", "S", true, true)];
        let rooms = vec![Classroom::new("R1", "R1", 30).unwrap(), Classroom::new("R2", "R2", 30).unwrap()];
        let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);

        let mut rng = SmallRng::seed_from_u64(11);
        let population = builder.initial_population(8, &mut rng).unwrap();
        assert_eq!(population.len(), 8);
        assert!(population.iter().all(validation::validate));
    }

    #[test]
    fn test_initial_population_empty_is_error() {
        let builder = ConstructiveScheduler::new(&[], &[], &[]);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            builder.initial_population(0, &mut rng).unwrap_err(),
            TimetableError::EmptyPopulation { attempts: 0 }
        );
    }

    #[test]
    fn test_construction_is_reproducible() {
        let s = Subject::new("S", "S", 3, 2).unwrap();
        let groups = vec![Group::new("G1", "G1", 20).unwrap().with_subject(s)];
        let lecturers = vec![lecturer("L1", "S", true, true), lecturer("L2", "S", true, true)];
        let rooms = vec![Classroom::new("R1", "R1", 30).unwrap()];
        let builder = ConstructiveScheduler::new(&lecturers, &groups, &rooms);

        let a = builder.construct(&mut SmallRng::seed_from_u64(99)).schedule;
        let b = builder.construct(&mut SmallRng::seed_from_u64(99)).schedule;
        assert_eq!(a, b);
    }
}
