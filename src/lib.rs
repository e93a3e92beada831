//! Weekly class timetabling with a genetic optimizer.
//!
//! Assigns every curriculum hour of every student group to a slot of a fixed
//! 5-day × 4-period week, a capable lecturer and a fitting classroom, then
//! improves the result with a genetic algorithm.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Subject`, `Lecturer`, `Group`, `Classroom`,
//!   `TimeSlot`, `ScheduleEntry`, `Schedule`
//! - **`validation`**: Hard-constraint feasibility and input integrity checks
//! - **`quality`**: Soft-constraint violations and the 0–100 quality score
//! - **`scheduler`**: Randomized constructive heuristic and schedule KPIs
//! - **`ga`**: Genetic optimizer (selection, crossover, mutation, elitism)
//! - **`error`**: Crate error type
//!
//! # Pipeline
//!
//! entities → `ConstructiveScheduler` → population → `GeneticScheduler`
//! (validator as gate, quality score as fitness) → best schedule,
//! violations, score.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod error;
pub mod ga;
pub mod models;
pub mod quality;
pub mod scheduler;
pub mod validation;

pub use error::{Result, TimetableError};
