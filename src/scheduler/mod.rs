//! Constructive timetabling and KPI evaluation.
//!
//! # Algorithm
//!
//! `ConstructiveScheduler` is a randomized greedy builder: it places every
//! curriculum hour in turn, choosing a capable lecturer, a gap-minimizing
//! free slot and a best-fit free room. It does not guarantee completeness;
//! classes that never fit are dropped and reported. Its schedules seed the
//! genetic optimizer in [`crate::ga`].
//!
//! # KPI
//!
//! `ScheduleKpi` computes grid utilization, the lecture/practical mix, the
//! daily spread and weekly hours per lecturer and group.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod constructive;
mod kpi;

pub use constructive::{
    gap_penalty, ClassRequest, Construction, ConstructiveScheduler, UnplacedClass,
    UnplacedReason, DEFAULT_MAX_ATTEMPTS, DEFAULT_POPULATION_ATTEMPT_FACTOR,
};
pub use kpi::ScheduleKpi;
