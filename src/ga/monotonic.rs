//! Generational, elitist engine.
//!
//! Every generation starts from copies of the current elites and is filled
//! with offspring that passed the replacement policy, or with their parents
//! when they did not. Combined with elitism this makes the best fitness
//! non-worsening from one generation to the next.

use super::context::SearchContext;
use super::search::{initial_population, run_single_objective};
use super::strategy::{EvolutionStrategy, SearchResult};
use super::types::Chromosome;
use crate::error::Result;

/// Consecutive failed offspring constructions tolerated before a generation
/// is completed from the previous population.
const MAX_CONSECUTIVE_FAILURES: usize = 1000;

/// Generational GA with elitism.
///
/// # Usage
///
/// ```ignore
/// let ctx = SearchContext::new(config, factory, fitness_functions)?;
/// let mut ga = MonotonicGa::new(ctx);
/// let result = ga.generate_solution()?;
/// println!("best: {}", result.best_fitness);
/// ```
#[derive(Debug)]
pub struct MonotonicGa<C: Chromosome> {
    ctx: SearchContext<C>,
}

impl<C: Chromosome> MonotonicGa<C> {
    pub fn new(ctx: SearchContext<C>) -> Self {
        Self { ctx }
    }

    /// Gives the context back, e.g. to inspect counters after a run.
    pub fn into_context(self) -> SearchContext<C> {
        self.ctx
    }

    /// Builds one offspring set and decides what enters the next generation.
    ///
    /// Returns the individuals to append: the offspring (with oversized or
    /// empty ones swapped for parents) or the parents themselves.
    fn breed(&mut self, population: &[C]) -> Result<Vec<C>> {
        let parents_number = self.ctx.config().parents_number;
        let headless = self.ctx.config().headless_chicken;

        let mut parents = Vec::with_capacity(parents_number);
        let first = self.ctx.select(population);
        parents.push(population[first].clone());
        for _ in 1..parents_number {
            if headless {
                parents.push(self.ctx.new_random_individual());
            } else {
                let idx = self.ctx.select(population);
                parents.push(population[idx].clone());
            }
        }

        let mut offspring = parents.clone();
        self.ctx.maybe_cross_over(&mut offspring)?;

        let iteration = self.ctx.iteration();
        for child in &mut offspring {
            self.ctx.mutate(child)?;
            if child.is_changed() {
                child.meta_mut().update_age(iteration);
            }
        }
        for child in &mut offspring {
            self.ctx.evaluate(child);
        }

        if !self.ctx.keep_offspring(&parents, &offspring) {
            tracing::trace!("keeping parents");
            return Ok(parents);
        }
        tracing::trace!("keeping offspring");

        let mut accepted = Vec::with_capacity(offspring.len());
        let mut rejected = 0usize;
        for child in offspring {
            if child.size() == 0 || self.ctx.is_too_long(&child) {
                rejected += 1;
            } else {
                accepted.push(child);
            }
        }
        for _ in 0..rejected {
            let k = self.ctx.next_index(parents.len());
            accepted.push(parents.swap_remove(k));
        }
        if rejected > 0 {
            tracing::trace!(rejected, "offspring replaced by parents");
        }
        Ok(accepted)
    }
}

impl<C: Chromosome> EvolutionStrategy<C> for MonotonicGa<C> {
    fn context(&self) -> &SearchContext<C> {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut SearchContext<C> {
        &mut self.ctx
    }

    fn initialize_population(&mut self, size: usize) -> Result<Vec<C>> {
        initial_population(self, size)
    }

    fn evolve_one_step(&mut self, mut population: Vec<C>) -> Result<Vec<C>> {
        let target = population.len();
        if target == 0 {
            return Ok(population);
        }
        self.ctx.sort_population(&mut population);

        let mut next = self.ctx.elitism(&population);
        let elites = next.len();
        tracing::trace!(elites, "elitism");
        let mut failures = 0usize;

        while next.len() < target && !self.ctx.is_finished() {
            match self.breed(&population) {
                Ok(individuals) => {
                    failures = 0;
                    next.extend(individuals);
                }
                Err(err) if err.is_recoverable() => {
                    failures += 1;
                    tracing::debug!(error = %err, "offspring construction failed, retrying");
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        tracing::warn!(
                            failures,
                            "giving up on offspring construction for this generation"
                        );
                        break;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        next.truncate(target);
        if next.len() < target {
            let missing = target - next.len();
            tracing::debug!(missing, "filling generation from previous population");
            next.extend(population.into_iter().skip(elites).take(missing));
        }

        self.ctx.advance_iteration();
        Ok(next)
    }

    fn generate_solution(&mut self) -> Result<SearchResult<C>> {
        run_single_objective(self)
    }
}
