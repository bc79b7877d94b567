//! Parent selection strategies.
//!
//! Selection determines which individuals are chosen as parents for
//! crossover. Different strategies provide different selection pressure.
//! Every strategy here samples with replacement: the same individual may be
//! returned for consecutive calls.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"
//! - Deb et al. (2002), crowded-comparison operator of NSGA-II

use super::multi_objective::rank_and_crowding_cmp;
use super::types::{compare_fitness, is_better, Chromosome};
use rand::{Rng, RngCore};
use std::cmp::Ordering;

/// Picks one parent from a population.
///
/// Implementations return an index into `population` and must not mutate
/// anything besides the random generator.
pub trait SelectionFunction<C: Chromosome> {
    /// Selects a parent index.
    ///
    /// `maximize` tells the strategy which direction of
    /// [`total_fitness`](Chromosome::total_fitness) is better.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    fn select(&self, population: &[C], maximize: bool, rng: &mut dyn RngCore) -> usize;
}

/// Built-in selection strategies.
///
/// # Examples
///
/// ```
/// use u_evosearch::ga::Selection;
///
/// // Binary tournament (the default)
/// let sel = Selection::default();
/// assert_eq!(sel, Selection::Tournament(2));
///
/// // Roulette wheel (fitness-proportionate)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, select the best.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// For minimisation weights are inverted so the best individual gets
    /// the largest slice.
    ///
    /// # Complexity
    /// O(n) per selection
    Roulette,

    /// Linear rank-based selection: weight `n - rank`, best rank 0.
    ///
    /// # Complexity
    /// O(n log n) per selection
    Rank,

    /// Binary tournament on Pareto rank, ties broken by larger crowding
    /// distance, remaining ties at random. Used by NSGA-II.
    CrowdedTournament,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(2)
    }
}

impl<C: Chromosome> SelectionFunction<C> for Selection {
    fn select(&self, population: &[C], maximize: bool, rng: &mut dyn RngCore) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match self {
            Selection::Tournament(k) => tournament(population, *k, maximize, rng),
            Selection::Roulette => roulette(population, maximize, rng),
            Selection::Rank => rank(population, maximize, rng),
            Selection::CrowdedTournament => crowded_tournament(population, rng),
        }
    }
}

/// Tournament selection: pick k random individuals, return best.
fn tournament<C: Chromosome>(
    population: &[C],
    k: usize,
    maximize: bool,
    rng: &mut dyn RngCore,
) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if is_better(
            population[idx].total_fitness(),
            population[best_idx].total_fitness(),
            maximize,
        ) {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette wheel selection.
///
/// Minimisation: weight_i = max - f_i + epsilon.
/// Maximisation: weight_i = f_i - min + epsilon.
fn roulette<C: Chromosome>(population: &[C], maximize: bool, rng: &mut dyn RngCore) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let fitnesses: Vec<f64> = population.iter().map(|c| c.total_fitness()).collect();
    let epsilon = 1e-10;

    let weights: Vec<f64> = if maximize {
        let min_fitness = fitnesses.iter().cloned().fold(f64::INFINITY, f64::min);
        fitnesses.iter().map(|&f| (f - min_fitness + epsilon).max(epsilon)).collect()
    } else {
        let max_fitness = fitnesses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        fitnesses.iter().map(|&f| (max_fitness - f + epsilon).max(epsilon)).collect()
    };

    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

/// Rank-based selection using linear ranking.
fn rank<C: Chromosome>(population: &[C], maximize: bool, rng: &mut dyn RngCore) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let mut indexed: Vec<(usize, f64)> = population
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.total_fitness()))
        .collect();
    indexed.sort_by(|a, b| compare_fitness(a.1, b.1, maximize));

    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &(original_idx, _)) in indexed.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return original_idx;
        }
    }

    indexed[n - 1].0
}

/// Binary tournament with the crowded-comparison operator.
fn crowded_tournament<C: Chromosome>(population: &[C], rng: &mut dyn RngCore) -> usize {
    let n = population.len();
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);

    match rank_and_crowding_cmp(&population[a], &population[b]) {
        Ordering::Less => a,
        Ordering::Greater => b,
        Ordering::Equal => {
            if rng.random_bool(0.5) {
                a
            } else {
                b
            }
        }
    }
}
