//! NSGA-II multi-objective engine.
//!
//! Offspring are bred from the current population, merged with it, and the
//! union is cut back to the configured size front by front. The last front
//! that does not fit whole is truncated by crowding distance, keeping the
//! most isolated individuals.
//!
//! # References
//!
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

use super::context::SearchContext;
use super::multi_objective::{assign_crowding_distance, rank_and_crowding_cmp, rank_population};
use super::strategy::{EvolutionStrategy, SearchResult};
use super::types::Chromosome;
use crate::error::{EvolutionError, Result};

/// NSGA-II engine.
///
/// Every fitness function is a separate objective. Use
/// [`GaConfig::nsga2`](super::GaConfig::nsga2) for a configuration with
/// crowded tournament selection.
///
/// # Usage
///
/// ```ignore
/// let ctx = SearchContext::new(GaConfig::nsga2(), factory, vec![
///     Box::new(Coverage),
///     Box::new(Length),
/// ])?;
/// let result = Nsga2::new(ctx).generate_solution()?;
/// for individual in &result.pareto_front {
///     println!("{:?}", individual.meta());
/// }
/// ```
#[derive(Debug)]
pub struct Nsga2<C: Chromosome> {
    ctx: SearchContext<C>,
}

impl<C: Chromosome> Nsga2<C> {
    pub fn new(ctx: SearchContext<C>) -> Self {
        Self { ctx }
    }

    pub fn into_context(self) -> SearchContext<C> {
        self.ctx
    }

    /// Breeds `population.len() / 2` offspring sets.
    fn breed(&mut self, population: &[C]) -> Result<Vec<C>> {
        let parents_number = self.ctx.config().parents_number;
        let mutation_rate = self.ctx.config().mutation_rate;
        let sets = population.len() / 2;
        let mut offspring_population = Vec::with_capacity(sets * parents_number);

        for _ in 0..sets {
            let parents: Vec<C> = (0..parents_number)
                .map(|_| {
                    let idx = self.ctx.select(population);
                    population[idx].clone()
                })
                .collect();

            let mut offspring = parents.clone();
            match self.ctx.maybe_cross_over(&mut offspring) {
                Ok(_) => {}
                Err(err) if err.is_recoverable() => {
                    tracing::debug!(error = %err, "crossover failed, offspring kept as parents");
                    offspring.clone_from(&parents);
                }
                Err(err) => return Err(err),
            }

            if self.ctx.next_f64() < mutation_rate {
                for child in &mut offspring {
                    let backup = child.clone();
                    match self.ctx.mutate(child) {
                        Ok(()) => {}
                        Err(err) if err.is_recoverable() => {
                            tracing::debug!(error = %err, "mutation failed, offspring restored");
                            *child = backup;
                        }
                        Err(err) => return Err(err),
                    }
                }
            }

            for child in &mut offspring {
                self.ctx.evaluate(child);
            }
            offspring_population.extend(offspring);
        }
        Ok(offspring_population)
    }
}

/// Moves the members of each front out of `population`, in front order.
fn into_fronts<C>(population: Vec<C>, fronts: &[Vec<usize>]) -> Vec<Vec<C>> {
    let mut slots: Vec<Option<C>> = population.into_iter().map(Some).collect();
    fronts
        .iter()
        .map(|front| front.iter().filter_map(|&i| slots[i].take()).collect())
        .collect()
}

/// Ranks `population`, assigns crowding distances per front and returns it
/// in crowded-comparison order.
fn rank_and_order<C: Chromosome>(mut population: Vec<C>, directions: &[bool]) -> Vec<C> {
    let ranking = rank_population(&mut population, directions);
    let mut ordered = Vec::with_capacity(population.len());
    for mut front in into_fronts(population, &ranking.fronts) {
        assign_crowding_distance(&mut front, directions);
        front.sort_by(rank_and_crowding_cmp);
        ordered.extend(front);
    }
    ordered
}

impl<C: Chromosome> EvolutionStrategy<C> for Nsga2<C> {
    fn context(&self) -> &SearchContext<C> {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut SearchContext<C> {
        &mut self.ctx
    }

    fn initialize_population(&mut self, size: usize) -> Result<Vec<C>> {
        if size == 0 {
            return Err(EvolutionError::InvalidConfig(
                "population size must be positive".into(),
            ));
        }
        self.ctx.start_search();
        let population = self.ctx.random_population(size);
        let population = rank_and_order(population, &self.ctx.directions());
        self.ctx.notify_iteration(&population);
        Ok(population)
    }

    fn evolve_one_step(&mut self, population: Vec<C>) -> Result<Vec<C>> {
        let offspring = self.breed(&population)?;
        let directions = self.ctx.directions();

        let population_size = self.ctx.config().population_size;
        let mut union = Vec::with_capacity(population_size.max(population.len() + offspring.len()));
        union.extend(population);
        union.extend(offspring);

        let target = population_size.min(union.len());
        let ranking = rank_population(&mut union, &directions);
        tracing::trace!(
            union = union.len(),
            fronts = ranking.front_count(),
            "union ranked"
        );

        let mut next = Vec::with_capacity(target);
        for mut front in into_fronts(union, &ranking.fronts) {
            let remaining = target - next.len();
            if remaining == 0 {
                break;
            }
            assign_crowding_distance(&mut front, &directions);
            if front.len() > remaining {
                front.sort_by(rank_and_crowding_cmp);
                front.truncate(remaining);
            }
            next.extend(front);
        }

        self.ctx.advance_iteration();
        Ok(next)
    }

    fn generate_solution(&mut self) -> Result<SearchResult<C>> {
        let size = self.ctx.config().population_size;
        let mut population = self.initialize_population(size)?;

        while !self.ctx.is_finished() {
            population = self.evolve_one_step(population)?;
            tracing::info!(
                iteration = self.ctx.iteration(),
                population = population.len(),
                first_front = population.iter().filter(|c| c.meta().rank() == 0).count(),
                evaluations = self.ctx.evaluations(),
                "generation complete"
            );
            self.ctx.notify_iteration(&population);
        }

        let population = rank_and_order(population, &self.ctx.directions());
        self.ctx.notify_finished(&population);

        let pareto_front: Vec<C> = population
            .iter()
            .filter(|c| c.meta().rank() == 0)
            .cloned()
            .collect();
        let best = population
            .first()
            .cloned()
            .ok_or_else(|| EvolutionError::InvalidConfig("population became empty".into()))?;

        Ok(SearchResult {
            best_fitness: best.total_fitness(),
            best,
            pareto_front,
            population,
            generations: self.ctx.iteration(),
            evaluations: self.ctx.evaluations(),
            fitness_history: Vec::new(),
            stagnated: false,
            cancelled: self.ctx.budget().is_cancelled(),
            monotonicity_violations: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::crossover::{CrossoverFunction, SinglePointCrossover};
    use crate::ga::multi_objective::{dominates, objective_vectors};
    use crate::ga::testing::{
        distance_to_nines, maximize, minimize, sum_of_genes, sum_of_squares, IntVec, IntVecFactory,
    };
    use crate::ga::listener::SearchEvent;
    use crate::ga::GaConfig;
    use proptest::prelude::*;
    use rand::RngCore;
    use std::sync::mpsc::channel;

    fn config() -> GaConfig {
        GaConfig::nsga2()
            .with_population_size(20)
            .with_max_generations(30)
            .with_seed(11)
    }

    fn engine(config: GaConfig) -> Nsga2<IntVec> {
        let ctx = SearchContext::new(
            config,
            IntVecFactory { len: 6 },
            vec![minimize(distance_to_nines), minimize(sum_of_squares)],
        )
        .expect("valid context");
        Nsga2::new(ctx)
    }

    fn assert_front_properties(population: &[IntVec], directions: &[bool]) {
        let objectives = objective_vectors(population, directions);
        let front: Vec<usize> = (0..population.len())
            .filter(|&i| population[i].meta().rank() == 0)
            .collect();
        assert!(!front.is_empty());

        for &i in &front {
            for j in 0..population.len() {
                assert!(
                    !dominates(&objectives[j], &objectives[i]),
                    "front member {i} dominated by {j}"
                );
            }
        }

        if front.len() >= 2 {
            let infinite = front
                .iter()
                .filter(|&&i| population[i].meta().crowding_distance().is_infinite())
                .count();
            assert!(infinite >= 2);
            for &i in &front {
                let d = population[i].meta().crowding_distance();
                assert!(d.is_infinite() || (d.is_finite() && d >= 0.0));
            }
        }
    }

    #[test]
    fn test_population_size_is_constant() {
        let mut ga = engine(config());
        let mut pop = ga.initialize_population(20).unwrap();
        for _ in 0..10 {
            pop = ga.evolve_one_step(pop).unwrap();
            assert_eq!(pop.len(), 20);
        }
        assert_eq!(ga.context().iteration(), 10);
    }

    #[test]
    fn test_offspring_count_per_generation() {
        let mut ga = engine(config());
        let pop = ga.initialize_population(20).unwrap();
        assert_eq!(ga.context().evaluations(), 20);
        ga.evolve_one_step(pop).unwrap();
        // ten offspring sets of two
        assert_eq!(ga.context().evaluations(), 40);
    }

    #[test]
    fn test_final_front_is_non_dominated() {
        let result = engine(config()).generate_solution().unwrap();
        assert_eq!(result.population.len(), 20);
        assert!(result.fitness_history.is_empty());
        assert_front_properties(&result.population, &[false, false]);
        assert!(result.pareto_front.iter().all(|c| c.meta().rank() == 0));
        assert!(result.pareto_front.len() > 1, "conflicting objectives should spread the front");
    }

    #[test]
    fn test_population_is_in_front_order() {
        let result = engine(config()).generate_solution().unwrap();
        for w in result.population.windows(2) {
            assert!(rank_and_crowding_cmp(&w[0], &w[1]) != std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn test_mixed_directions() {
        let ctx = SearchContext::new(
            config(),
            IntVecFactory { len: 6 },
            vec![maximize(sum_of_genes), minimize(sum_of_squares)],
        )
        .unwrap();
        let result = Nsga2::new(ctx).generate_solution().unwrap();
        assert_front_properties(&result.population, &[true, false]);
    }

    #[test]
    fn test_single_objective_never_worsens() {
        let ctx = SearchContext::new(
            config(),
            IntVecFactory { len: 6 },
            vec![minimize(distance_to_nines)],
        )
        .unwrap();
        let mut ga = Nsga2::new(ctx);
        let best = |pop: &[IntVec]| {
            pop.iter()
                .map(|c| c.total_fitness())
                .fold(f64::INFINITY, f64::min)
        };

        let mut pop = ga.initialize_population(20).unwrap();
        let initial = best(&pop);
        let mut previous = initial;
        for _ in 0..40 {
            pop = ga.evolve_one_step(pop).unwrap();
            let current = best(&pop);
            assert!(current <= previous);
            previous = current;
        }
        assert!(previous < initial);
    }

    #[test]
    fn test_construction_failures_are_swallowed() {
        struct Broken;
        impl CrossoverFunction<IntVec> for Broken {
            fn name(&self) -> &'static str {
                "Broken"
            }
            fn cross_over(&self, a: &mut IntVec, _b: &mut IntVec, _rng: &mut dyn RngCore) -> Result<()> {
                a.values.clear();
                Err(EvolutionError::construction("broken"))
            }
        }

        let ctx = SearchContext::new(
            config().with_crossover_rate(1.0).with_mutation_rate(0.0),
            IntVecFactory { len: 6 },
            vec![minimize(distance_to_nines), minimize(sum_of_squares)],
        )
        .unwrap()
        .with_crossover(Broken);
        let result = Nsga2::new(ctx).generate_solution().unwrap();
        assert_eq!(result.population.len(), 20);
        assert!(result.population.iter().all(|c| c.size() == 6));
    }

    #[test]
    fn test_unsupported_arity_is_propagated() {
        let ctx = SearchContext::new(
            config().with_parents_number(3).with_crossover_rate(1.0),
            IntVecFactory { len: 6 },
            vec![minimize(distance_to_nines), minimize(sum_of_squares)],
        )
        .unwrap()
        .with_crossover(SinglePointCrossover);
        let err = Nsga2::new(ctx).generate_solution().unwrap_err();
        assert!(matches!(err, EvolutionError::UnsupportedArity { arity: 3, .. }));
    }

    #[test]
    fn test_seed_determinism() {
        let a = engine(config()).generate_solution().unwrap();
        let b = engine(config()).generate_solution().unwrap();
        assert_eq!(a.population, b.population);
    }

    #[test]
    fn test_into_fronts_partitions() {
        let pop: Vec<u32> = (0..6).collect();
        let fronts = into_fronts(pop, &[vec![4, 1], vec![0, 5, 2], vec![3]]);
        assert_eq!(fronts, vec![vec![4, 1], vec![0, 5, 2], vec![3]]);
    }

    #[test]
    fn test_zero_mutation_rate_never_mutates() {
        let (tx, rx) = channel();
        let ctx = SearchContext::new(
            config().with_mutation_rate(0.0).with_crossover_rate(0.0),
            IntVecFactory { len: 6 },
            vec![minimize(distance_to_nines), minimize(sum_of_squares)],
        )
        .unwrap()
        .with_listener(tx);
        let mut ga = Nsga2::new(ctx);
        let pop = ga.initialize_population(20).unwrap();
        let genomes: Vec<Vec<i32>> = pop.iter().map(|c| c.values.clone()).collect();

        let offspring = ga.breed(&pop).unwrap();
        assert_eq!(offspring.len(), 20);
        assert!(offspring.iter().all(|c| genomes.contains(&c.values)));
        ga.evolve_one_step(pop).unwrap();

        let events: Vec<SearchEvent> = rx.try_iter().collect();
        assert!(!events.contains(&SearchEvent::Mutation));
        assert!(events.iter().any(|e| matches!(e, SearchEvent::Evaluation { .. })));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_size_and_fronts(seed in any::<u64>(), size in 2usize..24, parents in 2usize..=3) {
            let config = GaConfig::nsga2()
                .with_population_size(size)
                .with_parents_number(parents)
                .with_max_generations(8)
                .with_seed(seed);
            let result = engine(config).generate_solution().unwrap();
            prop_assert_eq!(result.population.len(), size);

            let objectives = objective_vectors(&result.population, &[false, false]);
            for (i, c) in result.population.iter().enumerate() {
                if c.meta().rank() == 0 {
                    for other in &objectives {
                        prop_assert!(!dominates(other, &objectives[i]));
                    }
                }
            }
        }
    }
}
