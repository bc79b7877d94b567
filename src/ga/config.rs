//! Search configuration.
//!
//! [`GaConfig`] holds every parameter the engines read. It is handed to the
//! [`SearchContext`](super::SearchContext) at construction and never changes
//! afterwards.

use super::selection::Selection;
use crate::error::{EvolutionError, Result};

/// Configuration shared by all evolution engines.
///
/// # Defaults
///
/// ```
/// use u_evosearch::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.parents_number, 2);
/// assert!(!config.headless_chicken);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evosearch::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(80)
///     .with_selection(Selection::Tournament(4))
///     .with_crossover_rate(0.8)
///     .with_max_length(120)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Number of best individuals copied unchanged into each new generation
    /// by the generational engine.
    pub elite_count: usize,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Probability of applying crossover to an offspring set (0.0–1.0).
    pub crossover_rate: f64,

    /// Probability of mutating an offspring set in NSGA-II (0.0–1.0).
    ///
    /// The generational and steady-state engines always mutate.
    pub mutation_rate: f64,

    /// Number of parents combined per crossover (2 or 3).
    pub parents_number: usize,

    /// Maximum chromosome size; larger offspring are rejected.
    ///
    /// `None` disables the ceiling.
    pub max_length: Option<usize>,

    /// Steady-state only: ask the replacement function before replacing
    /// parents. When `false` offspring always replace their parents.
    pub parent_check: bool,

    /// Generational only: cross the first parent with a fresh random
    /// individual instead of a selected one.
    pub headless_chicken: bool,

    /// Maximum number of iterations.
    pub max_generations: usize,

    /// Optional wall-clock limit in milliseconds.
    ///
    /// Checked once per generation (and between offspring sets in the
    /// generational engine), so a run can overshoot by one step.
    pub time_limit_ms: Option<u64>,

    /// Optional limit on the number of chromosome evaluations.
    pub max_evaluations: Option<u64>,

    /// Generations without best-fitness change before stopping early.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// Starvation count at which the first secondary objective is
    /// re-enabled (requires `enable_secondary_objective_starvation`).
    pub starvation_after_generation: usize,

    /// Budget percentage (0–100) after which the first secondary objective
    /// is re-enabled. 0 disables this trigger.
    pub enable_secondary_objective_after: u32,

    /// Re-enable the first secondary objective once the starvation counter
    /// reaches `starvation_after_generation`.
    pub enable_secondary_objective_starvation: bool,

    /// Apply local search every this many generations. 0 disables it.
    pub local_search_rate: usize,

    /// Deadline in milliseconds for the end-of-search archive refresh.
    pub archive_timeout_ms: u64,

    /// Random seed for reproducibility. `None` draws a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            elite_count: 1,
            selection: Selection::default(),
            crossover_rate: 0.75,
            mutation_rate: 0.75,
            parents_number: 2,
            max_length: None,
            parent_check: true,
            headless_chicken: false,
            max_generations: 1000,
            time_limit_ms: None,
            max_evaluations: None,
            stagnation_limit: 0,
            starvation_after_generation: 500,
            enable_secondary_objective_after: 0,
            enable_secondary_objective_starvation: false,
            local_search_rate: 0,
            archive_timeout_ms: 5_000,
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

    /// Sets the number of elites.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover arity.
    pub fn with_parents_number(mut self, n: usize) -> Self {
        self.parents_number = n;
        self
    }

    /// Sets the maximum chromosome size.
    pub fn with_max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Enables or disables the steady-state parent check.
    pub fn with_parent_check(mut self, enabled: bool) -> Self {
        self.parent_check = enabled;
        self
    }

    /// Enables or disables headless-chicken crossover.
    pub fn with_headless_chicken(mut self, enabled: bool) -> Self {
        self.headless_chicken = enabled;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the evaluation budget.
    pub fn with_max_evaluations(mut self, n: u64) -> Self {
        self.max_evaluations = Some(n);
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Re-enables the first secondary objective after `generations` of
    /// starvation.
    pub fn with_secondary_objective_starvation(mut self, generations: usize) -> Self {
        self.enable_secondary_objective_starvation = true;
        self.starvation_after_generation = generations;
        self
    }

    /// Re-enables the first secondary objective once `percent` of the
    /// budget has been used.
    pub fn with_secondary_objective_after(mut self, percent: u32) -> Self {
        self.enable_secondary_objective_after = percent.min(100);
        self
    }

    /// Sets how often local search runs (0 to disable).
    pub fn with_local_search_rate(mut self, every: usize) -> Self {
        self.local_search_rate = every;
        self
    }

    /// Sets the archive refresh deadline.
    pub fn with_archive_timeout_ms(mut self, ms: u64) -> Self {
        self.archive_timeout_ms = ms;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for NSGA-II: crowded binary tournament, frequent crossover,
    /// occasional mutation.
    pub fn nsga2() -> Self {
        Self {
            selection: Selection::CrowdedTournament,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            ..Self::default()
        }
    }

    /// Whether the first secondary objective starts disabled.
    pub fn delays_first_secondary_objective(&self) -> bool {
        self.enable_secondary_objective_after > 0 || self.enable_secondary_objective_starvation
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(invalid("population_size must be at least 1"));
        }
        if self.max_generations == 0 {
            return Err(invalid("max_generations must be at least 1"));
        }
        if self.elite_count >= self.population_size {
            return Err(invalid("elite_count must be smaller than population_size"));
        }
        if !(2..=3).contains(&self.parents_number) {
            return Err(invalid("parents_number must be 2 or 3"));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) || !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(invalid("rates must lie in [0, 1]"));
        }
        if self.max_length == Some(0) {
            return Err(invalid("max_length must be positive or None"));
        }
        if self.time_limit_ms == Some(0) {
            return Err(invalid("time_limit_ms must be positive or None"));
        }
        if self.max_evaluations == Some(0) {
            return Err(invalid("max_evaluations must be positive or None"));
        }
        if self.enable_secondary_objective_after > 100 {
            return Err(invalid("enable_secondary_objective_after is a percentage"));
        }
        if let Selection::Tournament(0) = self.selection {
            return Err(invalid("tournament size must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> EvolutionError {
    EvolutionError::InvalidConfig(reason.into())
}
