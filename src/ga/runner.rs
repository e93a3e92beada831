//! Generational loop of the timetable GA.
//!
//! # Algorithm
//!
//! Each generation:
//! 1. Score every individual with [`quality_score`] and rank descending.
//! 2. Record the leader; keep an independent copy if it beats the best so far.
//! 3. Carry the top `elite_size` individuals over unchanged.
//! 4. Fill the rest with offspring: crossover of two tournament winners
//!    (or a clone of one), optionally mutated, accepted only when
//!    [`validation::validate`] passes. After `max_offspring_attempts`
//!    rejections an elite clone takes the position.
//!
//! The loop runs a fixed number of generations; there is no convergence test.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::config::GaConfig;
use super::operators::{crossover, mutate, tournament_select};
use crate::error::{Result, TimetableError};
use crate::models::{Classroom, Group, Lecturer, Schedule};
use crate::quality::{self, quality_score, ConstraintViolation};
use crate::scheduler::ConstructiveScheduler;
use crate::validation;

/// Per-generation progress hook: `(generation index, best score)`.
pub type Progress<'p> = Option<&'p mut dyn FnMut(usize, f64)>;

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Best schedule found.
    pub schedule: Schedule,
    /// Its quality score.
    pub score: f64,
    /// Its soft-constraint violations.
    pub violations: Vec<ConstraintViolation>,
    /// Best score of each generation, in order.
    pub fitness_history: Vec<f64>,
    /// Generations evolved.
    pub generations: usize,
}

/// Scores a population and sorts it best first.
///
/// The sort is stable, so equal scores keep their population order.
pub fn rank_population(population: Vec<Schedule>) -> Vec<(Schedule, f64)> {
    let mut ranked: Vec<(Schedule, f64)> = population
        .into_iter()
        .map(|s| {
            let score = quality_score(&s);
            (s, score)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Genetic optimizer for weekly timetables.
///
/// # Example
///
/// ```
/// use timetable_ga::ga::{GaConfig, GeneticScheduler};
/// use timetable_ga::models::{Classroom, Group, Lecturer, LecturerConstraints, Subject};
///
/// let math = Subject::new("MATH", "Mathematics", 2, 1).unwrap();
/// let groups = vec![Group::new("G1", "Group 1", 20).unwrap().with_subject(math)];
/// let lecturers = vec![Lecturer::new("L1", "Dr. Smith")
///     .with_subject_constraint("MATH", LecturerConstraints::default())];
/// let rooms = vec![Classroom::new("R1", "Room 1", 30).unwrap()];
///
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_elite_size(2)
///     .with_seed(42);
/// let ga = GeneticScheduler::new(&lecturers, &groups, &rooms, config);
/// let result = ga.solve(5, None).unwrap();
/// assert_eq!(result.fitness_history.len(), 5);
/// assert!(result.score > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct GeneticScheduler<'a> {
    builder: ConstructiveScheduler<'a>,
    config: GaConfig,
}

impl<'a> GeneticScheduler<'a> {
    /// Creates an optimizer over the given entities.
    pub fn new(
        lecturers: &'a [Lecturer],
        groups: &'a [Group],
        classrooms: &'a [Classroom],
        config: GaConfig,
    ) -> Self {
        Self {
            builder: ConstructiveScheduler::new(lecturers, groups, classrooms),
            config,
        }
    }

    /// Replaces the constructive builder (e.g. to change its attempt budgets).
    pub fn with_builder(mut self, builder: ConstructiveScheduler<'a>) -> Self {
        self.builder = builder;
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Builds the initial population with the constructive heuristic.
    pub fn initial_population<R: Rng>(&self, rng: &mut R) -> Result<Vec<Schedule>> {
        self.builder
            .initial_population(self.config.population_size, rng)
    }

    /// Seeds an RNG from the config, builds a population and evolves it.
    pub fn solve(&self, generations: usize, progress: Progress<'_>) -> Result<GaResult> {
        self.config.validate()?;
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let population = self.initial_population(&mut rng)?;
        self.run(population, generations, progress, &mut rng)
    }

    /// Evolves `population` for `generations` generations.
    ///
    /// Returns the best schedule ever seen if it scored above zero,
    /// otherwise the leading member of the final population.
    pub fn run<R: Rng>(
        &self,
        population: Vec<Schedule>,
        generations: usize,
        mut progress: Progress<'_>,
        rng: &mut R,
    ) -> Result<GaResult> {
        self.config.validate()?;
        if population.is_empty() {
            return Err(TimetableError::EmptyPopulation { attempts: 0 });
        }
        info!(
            "evolving {} schedules for {generations} generations",
            population.len()
        );

        let mut population = population;
        let mut best: Option<Schedule> = None;
        let mut best_score = 0.0;
        let mut fitness_history = Vec::with_capacity(generations);

        for generation in 0..generations {
            let ranked = rank_population(population);
            let leader_score = ranked[0].1;
            if leader_score > best_score {
                best_score = leader_score;
                best = Some(ranked[0].0.clone());
            }
            fitness_history.push(leader_score);

            let mean = ranked.iter().map(|(_, s)| s).sum::<f64>() / ranked.len() as f64;
            debug!("generation {generation}: best {leader_score:.2}, mean {mean:.2}");
            if let Some(callback) = progress.as_deref_mut() {
                callback(generation, leader_score);
            }

            population = self.next_generation(&ranked, rng);
        }

        let schedule = match best {
            Some(schedule) => schedule,
            None => population
                .into_iter()
                .next()
                .ok_or(TimetableError::EmptyPopulation { attempts: 0 })?,
        };
        let score = quality_score(&schedule);
        info!("evolution finished: best score {score:.2}");

        Ok(GaResult {
            violations: quality::violations(&schedule),
            schedule,
            score,
            fitness_history,
            generations,
        })
    }

    /// Produces the next generation from a ranked (best first) population.
    ///
    /// Fails on an invalid configuration; an empty input yields an empty
    /// generation.
    pub fn step<R: Rng>(&self, ranked: &[(Schedule, f64)], rng: &mut R) -> Result<Vec<Schedule>> {
        self.config.validate()?;
        Ok(self.next_generation(ranked, rng))
    }

    fn next_generation<R: Rng>(&self, ranked: &[(Schedule, f64)], rng: &mut R) -> Vec<Schedule> {
        if ranked.is_empty() {
            return Vec::new();
        }

        let size = self.config.population_size;
        let elite_count = self.config.elite_size.min(ranked.len()).min(size);
        let mut next: Vec<Schedule> = ranked[..elite_count]
            .iter()
            .map(|(s, _)| s.clone())
            .collect();

        let scores: Vec<f64> = ranked.iter().map(|(_, s)| *s).collect();
        let mut fallbacks = 0;
        while next.len() < size {
            let accepted = (0..self.config.max_offspring_attempts)
                .map(|_| self.breed(ranked, &scores, rng))
                .find(validation::validate);
            match accepted {
                Some(child) => next.push(child),
                None => {
                    let index = if elite_count == 0 { 0 } else { fallbacks % elite_count };
                    fallbacks += 1;
                    next.push(ranked[index].0.clone());
                }
            }
        }

        if fallbacks > 0 {
            warn!(
                "{fallbacks} offspring positions fell back to elite clones after {} rejections each",
                self.config.max_offspring_attempts
            );
        }
        next
    }

    fn breed<R: Rng>(&self, ranked: &[(Schedule, f64)], scores: &[f64], rng: &mut R) -> Schedule {
        let k = self.config.tournament_size;
        let first = tournament_select(scores, k, rng).unwrap_or(0);
        let mut child = if rng.random_bool(self.config.crossover_rate) {
            let second = tournament_select(scores, k, rng).unwrap_or(0);
            crossover(&ranked[first].0, &ranked[second].0, rng)
        } else {
            ranked[first].0.clone()
        };
        if rng.random_bool(self.config.mutation_rate) {
            mutate(&mut child, rng);
        }
        child
    }
}
