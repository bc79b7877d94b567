//! Generation loop shared by the single-objective engines.

use super::starvation::{is_non_regressing, StarvationTracker};
use super::strategy::{EvolutionStrategy, SearchResult};
use super::types::Chromosome;
use crate::error::{EvolutionError, Result};

/// Starts a search and returns the initial population, evaluated and sorted.
pub(crate) fn initial_population<C, S>(engine: &mut S, size: usize) -> Result<Vec<C>>
where
    C: Chromosome,
    S: EvolutionStrategy<C> + ?Sized,
{
    if size == 0 {
        return Err(EvolutionError::InvalidConfig(
            "population size must be positive".into(),
        ));
    }

    let ctx = engine.context_mut();
    ctx.start_search();
    let mut population = ctx.random_population(size);
    ctx.sort_population(&mut population);
    ctx.update_archive(&population);
    ctx.notify_iteration(&population);
    Ok(population)
}

/// Runs `engine` until the budget is exhausted or the search stagnates.
///
/// After each generation the population is sorted and the best fitness is
/// checked against the previous generation. A regression is logged and
/// counted; it never aborts the run.
pub(crate) fn run_single_objective<C, S>(engine: &mut S) -> Result<SearchResult<C>>
where
    C: Chromosome,
    S: EvolutionStrategy<C> + ?Sized,
{
    engine.context_mut().disable_first_secondary_criterion();

    let size = engine.context().config().population_size;
    let mut population = engine.initialize_population(size)?;
    let maximize = engine.context().maximize();
    let stagnation_limit = engine.context().config().stagnation_limit;

    let mut best = head_fitness(&population);
    let mut tracker = StarvationTracker::new();
    tracker.record(best);

    // max_generations may be effectively unbounded under a time or evaluation budget
    let history_hint = engine.context().config().max_generations.saturating_add(1).min(1024);
    let mut fitness_history = Vec::with_capacity(history_hint);
    fitness_history.push(best);
    let mut violations = 0usize;
    let mut stagnated = false;

    while !engine.context().is_finished() {
        tracing::trace!(population = population.len(), "population size before step");
        population = engine.evolve_one_step(population)?;

        let ctx = engine.context_mut();
        ctx.sort_population(&mut population);
        let after_step = head_fitness(&population);
        if !is_non_regressing(best, after_step, maximize) {
            violations += 1;
            tracing::error!(
                iteration = ctx.iteration(),
                before = best,
                after = after_step,
                "best fitness regressed during evolution step"
            );
        }

        if ctx.apply_local_search(&mut population) {
            ctx.sort_population(&mut population);
            let after_search = head_fitness(&population);
            if !is_non_regressing(after_step, after_search, maximize) {
                violations += 1;
                tracing::error!(
                    iteration = ctx.iteration(),
                    before = after_step,
                    after = after_search,
                    "best fitness regressed during local search"
                );
            }
        }

        ctx.update_archive(&population);
        best = head_fitness(&population);
        let starvation = tracker.record(best);
        ctx.update_secondary_criterion(starvation);
        fitness_history.push(best);

        tracing::info!(
            iteration = ctx.iteration(),
            population = population.len(),
            best,
            worst = population.last().map(|c| c.total_fitness()),
            evaluations = ctx.evaluations(),
            "generation complete"
        );
        ctx.notify_iteration(&population);

        if stagnation_limit > 0 && starvation >= stagnation_limit {
            tracing::info!(starvation, "search stagnated");
            stagnated = true;
            break;
        }
    }

    let ctx = engine.context_mut();
    ctx.refresh_from_archive(&mut population);
    ctx.notify_finished(&population);

    let best = population
        .first()
        .cloned()
        .ok_or_else(|| EvolutionError::InvalidConfig("population became empty".into()))?;
    Ok(SearchResult {
        best_fitness: best.total_fitness(),
        pareto_front: vec![best.clone()],
        best,
        population,
        generations: ctx.iteration(),
        evaluations: ctx.evaluations(),
        fitness_history,
        stagnated,
        cancelled: ctx.budget().is_cancelled(),
        monotonicity_violations: violations,
    })
}

fn head_fitness<C: Chromosome>(population: &[C]) -> f64 {
    population.first().map_or(f64::NAN, |c| c.total_fitness())
}
