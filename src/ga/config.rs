//! GA configuration.
//!
//! [`GaConfig`] holds every parameter that controls the evolutionary loop
//! except the generation count, which is passed per run.

use crate::error::{Result, TimetableError};

/// Configuration for the timetable genetic algorithm.
///
/// # Defaults
///
/// ```
/// use timetable_ga::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.elite_size, 10);
/// assert_eq!(config.tournament_size, 3);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use timetable_ga::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_elite_size(5)
///     .with_mutation_rate(0.2)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    /// Target number of individuals per generation.
    pub population_size: usize,

    /// Individuals carried unchanged into the next generation.
    pub elite_size: usize,

    /// Probability of mutating an offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Probability of recombining two parents instead of cloning one (0.0–1.0).
    pub crossover_rate: f64,

    /// Individuals sampled per tournament.
    pub tournament_size: usize,

    /// Infeasible offspring tolerated per fill position before an elite
    /// clone is used instead.
    pub max_offspring_attempts: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_size: 10,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            tournament_size: 3,
            max_offspring_attempts: 100,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_size(mut self, n: usize) -> Self {
        self.elite_size = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the per-position offspring retry cap.
    pub fn with_max_offspring_attempts(mut self, n: usize) -> Self {
        self.max_offspring_attempts = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(TimetableError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        if self.elite_size > self.population_size {
            return Err(TimetableError::InvalidConfig(
                "elite_size cannot exceed population_size".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(TimetableError::InvalidConfig(
                "tournament_size must be at least 1".into(),
            ));
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(TimetableError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.max_offspring_attempts == 0 {
            return Err(TimetableError::InvalidConfig(
                "max_offspring_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
