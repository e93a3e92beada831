//! Genetic optimization of weekly timetables.
//!
//! Individuals are whole [`Schedule`](crate::models::Schedule)s seeded by
//! the constructive heuristic. Fitness is the soft-constraint quality
//! score; the hard-constraint validator gates every offspring so the
//! population stays feasible.
//!
//! # Submodules
//!
//! - [`operators`]: tournament selection, slot-level crossover, relocation mutation
//!
//! # Reference
//! - Colorni, Dorigo & Maniezzo (1998), "Metaheuristics for High School Timetabling"
//! - Burke, Elliman & Weare (1995), "Specialised recombinative operators
//!   for timetabling problems"

mod config;
pub mod operators;
mod runner;

pub use config::GaConfig;
pub use operators::{crossover, mutate, tournament_select, MutationOutcome, MUTATION_ATTEMPTS};
pub use runner::{rank_population, GaResult, GeneticScheduler, Progress};
