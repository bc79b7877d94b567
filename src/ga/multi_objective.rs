//! Pareto ranking and crowding distance.
//!
//! The two building blocks of NSGA-II: fast non-dominated sorting partitions
//! a population into fronts, and crowding distance measures how isolated an
//! individual is inside its front.
//!
//! # Algorithms
//!
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: Crowding distance assignment for diversity preservation
//! - [`rank_population`] / [`assign_crowding_distance`]: the same algorithms
//!   applied to chromosomes, writing the results into their metadata
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use super::types::Chromosome;
use std::cmp::Ordering;

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 0 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

impl NondominatedSortResult {
    /// Indices of the front at `index`, or an empty slice past the last one.
    pub fn subfront(&self, index: usize) -> &[usize] {
        self.fronts.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of fronts.
    pub fn front_count(&self) -> usize {
        self.fronts.len()
    }
}

/// Fast non-dominated sorting.
///
/// All objectives are **minimized**: lower values are better. Use
/// [`objective_vectors`] to convert chromosomes with mixed directions.
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of solutions.
/// With the `parallel` feature the dominance table is built with rayon.
///
/// # Example
///
/// ```
/// use u_evosearch::ga::multi_objective::non_dominated_sort;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
///     vec![4.0, 4.0], // dominated by (3, 3)
/// ];
///
/// let result = non_dominated_sort(&objectives);
/// assert_eq!(result.ranks, vec![0, 0, 0, 1]);
/// assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3]]);
/// ```
pub fn non_dominated_sort(objectives: &[Vec<f64>]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult::default();
    }

    debug_assert!(
        objectives.iter().all(|o| o.len() == objectives[0].len()),
        "all objective vectors must have the same length"
    );

    let (dominates_list, mut domination_count) = dominance_table(objectives);
    let mut ranks = vec![0usize; n];

    let front_0: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    let mut fronts = vec![front_0];
    loop {
        let current = &fronts[fronts.len() - 1];
        let mut next_front = Vec::new();

        for &i in current {
            for &j in &dominates_list[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len();
                    next_front.push(j);
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        fronts.push(next_front);
    }

    NondominatedSortResult { ranks, fronts }
}

/// For every solution: the ascending list of solutions it dominates, and the
/// number of solutions dominating it.
#[cfg(not(feature = "parallel"))]
fn dominance_table(objectives: &[Vec<f64>]) -> (Vec<Vec<usize>>, Vec<usize>) {
    let n = objectives.len();
    let mut dominates_list: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(&objectives[i], &objectives[j]) {
                Dominance::Left => {
                    dominates_list[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominates_list[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    (dominates_list, domination_count)
}

#[cfg(feature = "parallel")]
fn dominance_table(objectives: &[Vec<f64>]) -> (Vec<Vec<usize>>, Vec<usize>) {
    use rayon::prelude::*;

    let n = objectives.len();
    let dominates_list: Vec<Vec<usize>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .filter(|&j| dominance_cmp(&objectives[i], &objectives[j]) == Dominance::Left)
                .collect()
        })
        .collect();

    let mut domination_count = vec![0usize; n];
    for list in &dominates_list {
        for &j in list {
            domination_count[j] += 1;
        }
    }

    (dominates_list, domination_count)
}

/// Dominance comparison result.
#[derive(Debug, PartialEq)]
enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compare two solutions for Pareto dominance (minimization).
fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Returns `true` if `a` Pareto-dominates `b` (minimization).
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

/// Crowding distance assignment for diversity preservation.
///
/// Boundary solutions (min/max for any objective) receive `f64::INFINITY`;
/// interior solutions accumulate `(next - prev) / (max - min)` per objective.
/// Fronts with one or two members are all boundary.
///
/// # Complexity
///
/// O(m * n * log n) where m = number of objectives, n = number of solutions
///
/// # Example
///
/// ```
/// use u_evosearch::ga::multi_objective::crowding_distance;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
/// ];
///
/// let distances = crowding_distance(&objectives);
/// assert!(distances[0].is_infinite());
/// assert!(distances[2].is_infinite());
/// assert!(distances[1].is_finite());
/// ```
pub fn crowding_distance(objectives: &[Vec<f64>]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].len();
    let mut distances = vec![0.0f64; n];

    #[allow(clippy::needless_range_loop)] // obj_idx is a column index into 2D data
    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            objectives[a][obj_idx]
                .partial_cmp(&objectives[b][obj_idx])
                .unwrap_or(Ordering::Equal)
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let min_val = objectives[indices[0]][obj_idx];
        let max_val = objectives[indices[n - 1]][obj_idx];
        let range = max_val - min_val;

        if range > 0.0 && range.is_finite() {
            for i in 1..(n - 1) {
                let prev = objectives[indices[i - 1]][obj_idx];
                let next = objectives[indices[i + 1]][obj_idx];
                distances[indices[i]] += (next - prev) / range;
            }
        }
    }

    distances
}

/// Objective vectors of a population, converted to minimization.
///
/// `maximize[k]` is the direction of objective `k`; maximized objectives are
/// negated. Unevaluated objectives count as the worst possible value.
pub fn objective_vectors<C: Chromosome>(population: &[C], maximize: &[bool]) -> Vec<Vec<f64>> {
    population
        .iter()
        .map(|c| {
            maximize
                .iter()
                .enumerate()
                .map(|(k, &max)| match c.fitness(k) {
                    Some(v) if max => -v,
                    Some(v) => v,
                    None => f64::INFINITY,
                })
                .collect()
        })
        .collect()
}

/// Ranks a population and stores each chromosome's Pareto rank.
///
/// Returns the fronts as index lists into `population`; together they cover
/// every index exactly once.
pub fn rank_population<C: Chromosome>(
    population: &mut [C],
    maximize: &[bool],
) -> NondominatedSortResult {
    let objectives = objective_vectors(population, maximize);
    let result = non_dominated_sort(&objectives);
    for (c, &rank) in population.iter_mut().zip(result.ranks.iter()) {
        c.meta_mut().set_rank(rank);
    }
    result
}

/// Computes and stores the crowding distance of every member of `front`.
pub fn assign_crowding_distance<C: Chromosome>(front: &mut [C], maximize: &[bool]) {
    let objectives = objective_vectors(front, maximize);
    let distances = crowding_distance(&objectives);
    for (c, d) in front.iter_mut().zip(distances) {
        c.meta_mut().set_crowding_distance(d);
    }
}

/// Crowded-comparison order: lower rank first, then larger crowding distance.
pub fn rank_and_crowding_cmp<C: Chromosome>(a: &C, b: &C) -> Ordering {
    a.meta()
        .rank()
        .cmp(&b.meta().rank())
        .then_with(|| {
            b.meta()
                .crowding_distance()
                .partial_cmp(&a.meta().crowding_distance())
                .unwrap_or(Ordering::Equal)
        })
}

// ============================================================================
// Tests
// ============================================================================
