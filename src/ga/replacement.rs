//! Replacement policies.
//!
//! After offspring are evaluated, a [`ReplacementFunction`] decides whether
//! they enter the next population or their parents stay instead.

use super::types::{is_better, Chromosome};

/// Decides whether offspring replace their parents.
///
/// Implementations must be pure: the same fitness inputs always produce the
/// same answer, and nothing is modified.
pub trait ReplacementFunction<C: Chromosome> {
    /// Returns `true` to keep `offspring`, `false` to keep `parents`.
    fn keep_offspring(&self, parents: &[C], offspring: &[C], maximize: bool) -> bool;
}

/// Keeps the offspring if the best of them is not worse than the best
/// parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessReplacement;

impl<C: Chromosome> ReplacementFunction<C> for FitnessReplacement {
    fn keep_offspring(&self, parents: &[C], offspring: &[C], maximize: bool) -> bool {
        let (Some(best_parent), Some(best_offspring)) =
            (best_of(parents, maximize), best_of(offspring, maximize))
        else {
            return !offspring.is_empty();
        };
        !is_better(best_parent, best_offspring, maximize)
    }
}

fn best_of<C: Chromosome>(group: &[C], maximize: bool) -> Option<f64> {
    group
        .iter()
        .map(|c| c.total_fitness())
        .reduce(|best, f| if is_better(f, best, maximize) { f } else { best })
}
