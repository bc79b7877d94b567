//! Shared state and helpers for the evolution engines.
//!
//! [`SearchContext`] owns everything an engine needs besides the population
//! itself: configuration, collaborators, listeners, the random generator,
//! counters and the budget. Engines delegate evaluation, sorting, elitism and
//! notifications to it.

use super::budget::SearchBudget;
use super::config::GaConfig;
use super::crossover::{CrossoverFunction, SinglePointCrossover, ThreeParentsCrossover};
use super::hooks::{Archive, LocalSearch};
use super::listener::SearchListener;
use super::replacement::{FitnessReplacement, ReplacementFunction};
use super::secondary::{SecondaryObjective, SecondaryObjectives};
use super::selection::SelectionFunction;
use super::types::{
    compare_fitness, evaluate_chromosome, is_better, Chromosome, ChromosomeFactory,
    FitnessFunction,
};
use crate::error::{EvolutionError, Result};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Collaborators, configuration and counters shared by an engine's steps.
///
/// # Usage
///
/// ```ignore
/// let ctx = SearchContext::new(config, MyFactory, vec![Box::new(Coverage)])?
///     .with_listener(LoggingListener)
///     .with_secondary_objective(MinimizeSize);
/// let mut ga = MonotonicGa::new(ctx);
/// let result = ga.generate_solution()?;
/// ```
pub struct SearchContext<C: Chromosome> {
    config: GaConfig,
    factory: Box<dyn ChromosomeFactory<C>>,
    fitness_functions: Vec<Box<dyn FitnessFunction<C>>>,
    selection: Box<dyn SelectionFunction<C>>,
    crossover: Box<dyn CrossoverFunction<C>>,
    replacement: Box<dyn ReplacementFunction<C>>,
    listeners: Vec<Box<dyn SearchListener<C>>>,
    archive: Option<Box<dyn Archive<C>>>,
    local_search: Option<Box<dyn LocalSearch<C>>>,
    secondary: SecondaryObjectives<C>,
    rng: Box<dyn RngCore>,
    budget: SearchBudget,
    iteration: usize,
    evaluations: u64,
}

impl<C: Chromosome + 'static> SearchContext<C> {
    /// Builds a context with the default operators: the selection named in
    /// `config`, [`ThreeParentsCrossover`] over [`SinglePointCrossover`]
    /// (serves both arities) and [`FitnessReplacement`].
    ///
    /// The random generator is a `StdRng` seeded from `config.seed`.
    ///
    /// # Errors
    /// [`EvolutionError::InvalidConfig`] if the configuration does not
    /// validate, [`EvolutionError::NoFitnessFunctions`] if
    /// `fitness_functions` is empty.
    pub fn new(
        config: GaConfig,
        factory: impl ChromosomeFactory<C> + 'static,
        fitness_functions: Vec<Box<dyn FitnessFunction<C>>>,
    ) -> Result<Self> {
        config.validate()?;
        if fitness_functions.is_empty() {
            return Err(EvolutionError::NoFitnessFunctions);
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            selection: Box::new(config.selection),
            crossover: Box::new(ThreeParentsCrossover::new(SinglePointCrossover)),
            replacement: Box::new(FitnessReplacement),
            budget: SearchBudget::from_config(&config),
            factory: Box::new(factory),
            fitness_functions,
            listeners: Vec::new(),
            archive: None,
            local_search: None,
            secondary: SecondaryObjectives::new(),
            rng: Box::new(StdRng::seed_from_u64(seed)),
            iteration: 0,
            evaluations: 0,
            config,
        })
    }

    /// Replaces the selection strategy.
    pub fn with_selection(mut self, selection: impl SelectionFunction<C> + 'static) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Replaces the crossover strategy.
    pub fn with_crossover(mut self, crossover: impl CrossoverFunction<C> + 'static) -> Self {
        self.crossover = Box::new(crossover);
        self
    }

    /// Replaces the replacement policy.
    pub fn with_replacement(mut self, replacement: impl ReplacementFunction<C> + 'static) -> Self {
        self.replacement = Box::new(replacement);
        self
    }

    /// Registers a listener.
    pub fn with_listener(mut self, listener: impl SearchListener<C> + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Attaches an archive.
    pub fn with_archive(mut self, archive: impl Archive<C> + 'static) -> Self {
        self.archive = Some(Box::new(archive));
        self
    }

    /// Attaches a local search, run every `config.local_search_rate`
    /// generations.
    pub fn with_local_search(mut self, local_search: impl LocalSearch<C> + 'static) -> Self {
        self.local_search = Some(Box::new(local_search));
        self
    }

    /// Appends a secondary objective used to break fitness ties.
    pub fn with_secondary_objective(
        mut self,
        objective: impl SecondaryObjective<C> + 'static,
    ) -> Self {
        self.secondary.push(Box::new(objective));
        self
    }

    /// Injects the uniform random generator.
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Adds an external cancellation flag to the budget.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.budget = self.budget.with_cancel(cancel);
        self
    }
}

impl<C: Chromosome> SearchContext<C> {
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Current iteration counter.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Number of chromosome evaluations so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn fitness_functions(&self) -> &[Box<dyn FitnessFunction<C>>] {
        &self.fitness_functions
    }

    pub fn secondary_objectives(&self) -> &SecondaryObjectives<C> {
        &self.secondary
    }

    pub fn budget(&self) -> &SearchBudget {
        &self.budget
    }

    /// Direction of the primary (first) fitness function.
    pub fn maximize(&self) -> bool {
        self.fitness_functions[0].is_maximization()
    }

    /// Direction of every objective, in fitness function order.
    pub fn directions(&self) -> Vec<bool> {
        self.fitness_functions
            .iter()
            .map(|ff| ff.is_maximization())
            .collect()
    }

    /// Whether the budget is exhausted.
    pub fn is_finished(&self) -> bool {
        self.budget.is_exhausted(self.iteration, self.evaluations)
    }

    /// Consumed share of the budget, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.budget.progress(self.iteration, self.evaluations)
    }

    pub(crate) fn advance_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Draws a uniform number in `[0, 1)`.
    pub(crate) fn next_f64(&mut self) -> f64 {
        self.rng.random()
    }

    /// Draws a uniform index in `0..n`.
    pub(crate) fn next_index(&mut self, n: usize) -> usize {
        self.rng.random_range(0..n)
    }

    /// Resets counters, starts the clock and notifies listeners.
    pub(crate) fn start_search(&mut self) {
        self.iteration = 0;
        self.evaluations = 0;
        self.budget.start();
        for listener in &mut self.listeners {
            listener.search_started();
        }
    }

    /// Creates and evaluates `size` random chromosomes.
    pub(crate) fn random_population(&mut self, size: usize) -> Vec<C> {
        (0..size).map(|_| self.new_random_individual()).collect()
    }

    /// Creates and evaluates one random chromosome.
    pub(crate) fn new_random_individual(&mut self) -> C {
        let mut chromosome = self.factory.create(self.rng.as_mut());
        self.evaluate(&mut chromosome);
        chromosome
    }

    /// Scores `chromosome` against every fitness function.
    pub(crate) fn evaluate(&mut self, chromosome: &mut C) {
        evaluate_chromosome(chromosome, &self.fitness_functions);
        self.evaluations += 1;
        for listener in &mut self.listeners {
            listener.evaluation(chromosome);
        }
    }

    /// Selects one parent index from `population`.
    pub(crate) fn select(&mut self, population: &[C]) -> usize {
        let maximize = self.maximize();
        self.selection
            .select(population, maximize, self.rng.as_mut())
    }

    /// Applies crossover to `offspring` with probability `crossover_rate`.
    ///
    /// Returns `Ok(true)` if crossover ran.
    pub(crate) fn maybe_cross_over(&mut self, offspring: &mut [C]) -> Result<bool> {
        if self.next_f64() > self.config.crossover_rate {
            return Ok(false);
        }
        self.crossover.cross_over_all(offspring, self.rng.as_mut())?;
        Ok(true)
    }

    /// Mutates `chromosome`, raising its change flag if the genome changed.
    pub(crate) fn mutate(&mut self, chromosome: &mut C) -> Result<()> {
        for listener in &mut self.listeners {
            listener.mutation(chromosome);
        }
        if chromosome.mutate(self.rng.as_mut())? {
            chromosome.meta_mut().set_changed(true);
        }
        Ok(())
    }

    pub(crate) fn keep_offspring(&self, parents: &[C], offspring: &[C]) -> bool {
        self.replacement
            .keep_offspring(parents, offspring, self.maximize())
    }

    /// Whether `chromosome` exceeds the configured size ceiling.
    pub(crate) fn is_too_long(&self, chromosome: &C) -> bool {
        self.config
            .max_length
            .is_some_and(|max| chromosome.size() > max)
    }

    /// Sorts best-first by total fitness, breaking ties with the active
    /// secondary objectives. The sort is stable.
    pub fn sort_population(&self, population: &mut [C]) {
        let maximize = self.maximize();
        population.sort_by(|a, b| {
            compare_fitness(a.total_fitness(), b.total_fitness(), maximize)
                .then_with(|| self.secondary.compare(a, b))
        });
    }

    /// Copies of the `elite_count` leading individuals of a sorted population.
    pub(crate) fn elitism(&self, population: &[C]) -> Vec<C> {
        let count = self.config.elite_count.min(population.len());
        population[..count].to_vec()
    }

    pub(crate) fn update_archive(&mut self, population: &[C]) {
        let maximize = self.maximize();
        if let Some(archive) = self.archive.as_mut() {
            archive.update(population, maximize);
        }
    }

    /// Runs local search if it is due this generation.
    ///
    /// Returns `true` if it ran.
    pub(crate) fn apply_local_search(&mut self, population: &mut [C]) -> bool {
        let rate = self.config.local_search_rate;
        if rate == 0 || self.iteration % rate != 0 {
            return false;
        }
        let Some(local_search) = self.local_search.as_mut() else {
            return false;
        };
        local_search.apply(population, &self.fitness_functions, self.rng.as_mut());
        true
    }

    /// Reconciles a sorted population with the archive.
    ///
    /// If the archive knows a better individual it becomes the new head and
    /// the worst individual is dropped.
    pub(crate) fn refresh_from_archive(&mut self, population: &mut Vec<C>) {
        let maximize = self.maximize();
        let timeout = Duration::from_millis(self.config.archive_timeout_ms);
        let (Some(archive), Some(current)) = (self.archive.as_mut(), population.first()) else {
            return;
        };

        let started = Instant::now();
        let candidate = archive.best(current, started + timeout);
        if started.elapsed() > timeout {
            tracing::warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "archive refresh exceeded its deadline"
            );
        }

        if let Some(best) = candidate {
            if is_better(best.total_fitness(), current.total_fitness(), maximize) {
                tracing::debug!(fitness = best.total_fitness(), "best individual taken from archive");
                population.insert(0, best);
                population.pop();
            }
        }
    }

    /// Holds back the first secondary objective when the configuration asks
    /// for delayed activation.
    pub(crate) fn disable_first_secondary_criterion(&mut self) {
        if self.config.delays_first_secondary_objective() && self.secondary.disable_first() {
            tracing::debug!("first secondary objective disabled");
        }
    }

    /// Re-enables the first secondary objective once the budget share or the
    /// starvation threshold is reached.
    pub(crate) fn update_secondary_criterion(&mut self, starvation: usize) {
        if !self.secondary.is_first_disabled() {
            return;
        }

        let after = self.config.enable_secondary_objective_after;
        if after > 0 && self.progress() >= f64::from(after) / 100.0 {
            self.secondary.enable_first();
            tracing::info!(progress = self.progress(), "first secondary objective enabled");
            return;
        }

        if self.config.enable_secondary_objective_starvation
            && starvation >= self.config.starvation_after_generation
        {
            self.secondary.enable_first();
            tracing::info!(starvation, "first secondary objective enabled after starvation");
        }
    }

    pub(crate) fn notify_iteration(&mut self, population: &[C]) {
        let iteration = self.iteration;
        for listener in &mut self.listeners {
            listener.iteration(iteration, population);
        }
    }

    pub(crate) fn notify_finished(&mut self, population: &[C]) {
        for listener in &mut self.listeners {
            listener.search_finished(population);
        }
    }
}

impl<C: Chromosome> std::fmt::Debug for SearchContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("config", &self.config)
            .field("fitness_functions", &self.fitness_functions.len())
            .field("listeners", &self.listeners.len())
            .field("secondary", &self.secondary)
            .field("iteration", &self.iteration)
            .field("evaluations", &self.evaluations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::secondary::MinimizeSize;
    use crate::ga::testing::{distance_to_nines, maximize, minimize, scored, sum_of_genes, IntVec, IntVecFactory};
    use crate::ga::BestArchive;

    fn context(config: GaConfig) -> SearchContext<IntVec> {
        SearchContext::new(config, IntVecFactory { len: 6 }, vec![minimize(distance_to_nines)])
            .expect("valid context")
    }

    #[test]
    fn test_rejects_empty_fitness_functions() {
        let err = SearchContext::<IntVec>::new(GaConfig::default(), IntVecFactory { len: 3 }, vec![])
            .unwrap_err();
        assert_eq!(err, EvolutionError::NoFitnessFunctions);
    }

    #[test]
    fn test_crossover_gated_by_rate() {
        let mut always = context(GaConfig::default().with_crossover_rate(1.0).with_seed(4));
        let mut never = context(GaConfig::default().with_crossover_rate(0.0).with_seed(4));
        for _ in 0..50 {
            let mut pair = always.random_population(2);
            assert!(always.maybe_cross_over(&mut pair).unwrap());
            let mut pair = never.random_population(2);
            assert!(!never.maybe_cross_over(&mut pair).unwrap());
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = SearchContext::new(
            GaConfig::default().with_population_size(0),
            IntVecFactory { len: 3 },
            vec![minimize(distance_to_nines)],
        )
        .unwrap_err();
        assert!(matches!(err, EvolutionError::InvalidConfig(_)));
    }

    #[test]
    fn test_random_population_is_evaluated() {
        let mut ctx = context(GaConfig::default().with_seed(1));
        ctx.start_search();
        let pop = ctx.random_population(5);
        assert_eq!(pop.len(), 5);
        assert_eq!(ctx.evaluations(), 5);
        for c in &pop {
            assert_eq!(c.fitness(0), Some(distance_to_nines(c)));
            assert!(!c.is_changed());
        }
    }

    #[test]
    fn test_sort_population_by_direction() {
        let ctx = context(GaConfig::default());
        let mut pop = vec![scored(&[3.0]), scored(&[1.0]), scored(&[2.0])];
        ctx.sort_population(&mut pop);
        let order: Vec<f64> = pop.iter().map(|c| c.total_fitness()).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);

        let ctx = SearchContext::new(
            GaConfig::default(),
            IntVecFactory { len: 3 },
            vec![maximize(sum_of_genes)],
        )
        .unwrap();
        ctx.sort_population(&mut pop);
        let order: Vec<f64> = pop.iter().map(|c| c.total_fitness()).collect();
        assert_eq!(order, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sort_breaks_ties_with_secondary_objective() {
        let ctx = context(GaConfig::default()).with_secondary_objective(MinimizeSize);
        let mut long = IntVec::from_values(vec![0; 5]);
        long.meta.set_fitness(0, 1.0);
        let mut short = IntVec::from_values(vec![0; 2]);
        short.meta.set_fitness(0, 1.0);
        let mut pop = vec![long, short];
        ctx.sort_population(&mut pop);
        assert_eq!(pop[0].size(), 2);
    }

    #[test]
    fn test_secondary_criterion_enabled_by_starvation() {
        let config = GaConfig::default().with_secondary_objective_starvation(3);
        let mut ctx = context(config)
            .with_secondary_objective(MinimizeSize)
            .with_secondary_objective(MinimizeSize);
        ctx.disable_first_secondary_criterion();
        assert!(ctx.secondary_objectives().is_first_disabled());

        ctx.update_secondary_criterion(2);
        assert!(ctx.secondary_objectives().is_first_disabled());
        ctx.update_secondary_criterion(3);
        assert!(!ctx.secondary_objectives().is_first_disabled());
    }

    #[test]
    fn test_secondary_criterion_enabled_by_progress() {
        let config = GaConfig::default()
            .with_max_generations(10)
            .with_secondary_objective_after(50);
        let mut ctx = context(config)
            .with_secondary_objective(MinimizeSize)
            .with_secondary_objective(MinimizeSize);
        ctx.disable_first_secondary_criterion();
        for _ in 0..4 {
            ctx.advance_iteration();
        }
        ctx.update_secondary_criterion(0);
        assert!(ctx.secondary_objectives().is_first_disabled());
        ctx.advance_iteration();
        ctx.update_secondary_criterion(0);
        assert!(!ctx.secondary_objectives().is_first_disabled());
    }

    #[test]
    fn test_too_long() {
        let ctx = context(GaConfig::default().with_max_length(3));
        assert!(!ctx.is_too_long(&IntVec::from_values(vec![1, 2, 3])));
        assert!(ctx.is_too_long(&IntVec::from_values(vec![1, 2, 3, 4])));
        let unlimited = context(GaConfig::default());
        assert!(!unlimited.is_too_long(&IntVec::from_values(vec![0; 1000])));
    }

    #[test]
    fn test_elitism_copies_head() {
        let ctx = context(GaConfig::default().with_elite_count(2));
        let pop = vec![scored(&[1.0]), scored(&[2.0]), scored(&[3.0])];
        let elites = ctx.elitism(&pop);
        assert_eq!(elites.len(), 2);
        assert_eq!(elites[1].total_fitness(), 2.0);
    }

    #[test]
    fn test_refresh_from_archive_replaces_head() {
        let mut archive = BestArchive::new();
        archive.update(&[scored(&[0.5])], false);
        let mut ctx = context(GaConfig::default()).with_archive(archive);

        let mut pop = vec![scored(&[1.0]), scored(&[2.0]), scored(&[3.0])];
        ctx.refresh_from_archive(&mut pop);
        let order: Vec<f64> = pop.iter().map(|c| c.total_fitness()).collect();
        assert_eq!(order, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_mutation_raises_change_flag() {
        let mut ctx = context(GaConfig::default().with_seed(5));
        let mut changed = 0;
        for _ in 0..20 {
            let mut c = IntVec::from_values(vec![0; 4]);
            ctx.mutate(&mut c).unwrap();
            if c.values.iter().any(|&v| v != 0) {
                assert!(c.is_changed());
                changed += 1;
            } else {
                assert!(!c.is_changed());
            }
        }
        assert!(changed > 0);
    }
}
