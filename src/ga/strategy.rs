//! The contract every evolution engine implements, and the result it returns.

use super::context::SearchContext;
use super::types::Chromosome;
use crate::error::Result;

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchResult<C> {
    /// Best individual of the final population.
    pub best: C,

    /// Total fitness of `best`.
    pub best_fitness: f64,

    /// Final population, best first (front order for NSGA-II).
    pub population: Vec<C>,

    /// Non-dominated individuals of the final population. Single-objective
    /// engines report just `best`.
    pub pareto_front: Vec<C>,

    /// Generations executed.
    pub generations: usize,

    /// Chromosome evaluations performed, initial population included.
    pub evaluations: u64,

    /// Best total fitness after initialisation and after each generation.
    /// Empty for NSGA-II.
    pub fitness_history: Vec<f64>,

    /// Whether the run stopped on `stagnation_limit`.
    pub stagnated: bool,

    /// Whether the run stopped on the cancellation flag.
    pub cancelled: bool,

    /// Generations in which the best fitness got worse. Always zero unless
    /// an operator, replacement policy or local search misbehaves.
    pub monotonicity_violations: usize,
}

/// An evolution engine.
///
/// Engines own a [`SearchContext`] and differ only in how one generation is
/// produced. [`generate_solution`](EvolutionStrategy::generate_solution) runs
/// the whole search until the budget is exhausted.
pub trait EvolutionStrategy<C: Chromosome> {
    fn context(&self) -> &SearchContext<C>;

    fn context_mut(&mut self) -> &mut SearchContext<C>;

    /// Starts a search and returns a fresh, evaluated population of `size`
    /// individuals in the engine's ordering.
    fn initialize_population(&mut self, size: usize) -> Result<Vec<C>>;

    /// Produces the next generation from `population`.
    ///
    /// Given a population of the configured size, returns one of the same
    /// size. The iteration counter advances exactly once per call.
    fn evolve_one_step(&mut self, population: Vec<C>) -> Result<Vec<C>>;

    /// Runs a complete search.
    fn generate_solution(&mut self) -> Result<SearchResult<C>>;
}
