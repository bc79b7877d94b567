//! Steady-state engine: a few individuals are replaced per step.

use super::context::SearchContext;
use super::search::{initial_population, run_single_objective};
use super::strategy::{EvolutionStrategy, SearchResult};
use super::types::{is_better, Chromosome};
use crate::error::Result;

/// Steady-state GA.
///
/// Each step selects `parents_number` parents, breeds them and writes the
/// offspring back over the parents' slots in the live population. With
/// `parent_check` enabled the replacement policy must approve first.
///
/// The iteration counter advances at the start of every step, even when the
/// step ends up changing nothing.
#[derive(Debug)]
pub struct SteadyStateGa<C: Chromosome> {
    ctx: SearchContext<C>,
}

impl<C: Chromosome> SteadyStateGa<C> {
    pub fn new(ctx: SearchContext<C>) -> Self {
        Self { ctx }
    }

    pub fn into_context(self) -> SearchContext<C> {
        self.ctx
    }

    fn breed(&mut self, offspring: &mut [C]) -> Result<()> {
        self.ctx.maybe_cross_over(offspring)?;
        let iteration = self.ctx.iteration();
        for child in offspring.iter_mut() {
            self.ctx.mutate(child)?;
            if child.is_changed() {
                child.meta_mut().update_age(iteration);
            }
        }
        Ok(())
    }
}

impl<C: Chromosome> EvolutionStrategy<C> for SteadyStateGa<C> {
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
        self.ctx.advance_iteration();
        if population.is_empty() {
            return Ok(population);
        }

        let parents_number = self.ctx.config().parents_number;
        let slots: Vec<usize> = (0..parents_number)
            .map(|_| self.ctx.select(&population))
            .collect();
        let parents: Vec<C> = slots.iter().map(|&i| population[i].clone()).collect();

        let mut offspring = parents.clone();
        match self.breed(&mut offspring) {
            Ok(()) => {}
            Err(err) if err.is_recoverable() => {
                tracing::debug!(error = %err, "offspring construction failed, step skipped");
                return Ok(population);
            }
            Err(err) => return Err(err),
        }
        for child in &mut offspring {
            self.ctx.evaluate(child);
        }

        if self.ctx.config().parent_check && !self.ctx.keep_offspring(&parents, &offspring) {
            return Ok(population);
        }

        let maximize = self.ctx.maximize();
        let mut replaced = Vec::with_capacity(parents_number);
        for (slot, child) in slots.into_iter().zip(offspring) {
            if self.ctx.is_too_long(&child) {
                continue;
            }
            // a parent selected twice keeps one slot, taken by the better child
            if replaced.contains(&slot)
                && !is_better(
                    child.total_fitness(),
                    population[slot].total_fitness(),
                    maximize,
                )
            {
                continue;
            }
            population[slot] = child;
            replaced.push(slot);
        }
        Ok(population)
    }

    fn generate_solution(&mut self) -> Result<SearchResult<C>> {
        run_single_objective(self)
    }
}
