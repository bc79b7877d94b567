//! Crossover strategies.
//!
//! A [`CrossoverFunction`] recombines offspring **in place**: the engine
//! clones the selected parents and hands the clones over, so the originals in
//! the population are never touched. Genome-level splicing is delegated to
//! [`Chromosome::cross_over`] and [`Chromosome::cross_over_segments`]; the
//! strategies here only decide where to cut.
//!
//! # Strategies
//!
//! - [`SinglePointCrossover`]: one relative split point shared by both parents
//! - [`ThreeParentsCrossover`]: thirds-based recombination of three parents,
//!   delegating the two-parent case to an inner strategy

use super::types::Chromosome;
use crate::error::{EvolutionError, Result};
use rand::{Rng, RngCore};

/// Recombines two or three offspring in place.
pub trait CrossoverFunction<C: Chromosome> {
    /// Name used in errors and log output.
    fn name(&self) -> &'static str;

    /// Recombines two offspring.
    fn cross_over(&self, parent1: &mut C, parent2: &mut C, rng: &mut dyn RngCore) -> Result<()>;

    /// Recombines three offspring.
    ///
    /// The default reports [`EvolutionError::UnsupportedArity`].
    fn cross_over_three(
        &self,
        _parent1: &mut C,
        _parent2: &mut C,
        _parent3: &mut C,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        Err(EvolutionError::UnsupportedArity {
            operator: self.name(),
            arity: 3,
        })
    }

    /// Routes to the two- or three-parent form by slice length.
    ///
    /// Any other arity is a construction failure.
    fn cross_over_all(&self, parents: &mut [C], rng: &mut dyn RngCore) -> Result<()> {
        match parents {
            [a, b] => self.cross_over(a, b, rng),
            [a, b, c] => self.cross_over_three(a, b, c, rng),
            _ => Err(EvolutionError::construction(format!(
                "either two or three parents expected, got {}",
                parents.len()
            ))),
        }
    }
}

/// Single-point relative crossover.
///
/// Draws one split ratio `r` and cuts each parent at
/// `floor((size - 1) * r) + 1`, so children always keep at least one unit
/// of their own head. Parents shorter than 2 are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePointCrossover;

impl<C: Chromosome> CrossoverFunction<C> for SinglePointCrossover {
    fn name(&self) -> &'static str {
        "SinglePointCrossover"
    }

    fn cross_over(&self, parent1: &mut C, parent2: &mut C, rng: &mut dyn RngCore) -> Result<()> {
        if parent1.size() < 2 || parent2.size() < 2 {
            return Ok(());
        }

        let ratio: f64 = rng.random();
        let pos1 = ((parent1.size() - 1) as f64 * ratio).floor() as usize + 1;
        let pos2 = ((parent2.size() - 1) as f64 * ratio).floor() as usize + 1;

        let original1 = parent1.clone();
        parent1.cross_over(parent2, pos1, pos2)?;
        parent2.cross_over(&original1, pos2, pos1)?;

        parent1.meta_mut().set_changed(true);
        parent2.meta_mut().set_changed(true);
        Ok(())
    }
}

/// Three-parent crossover on thirds.
///
/// Each parent is split at `round(size / 3)` and `round(2 * size / 3)`.
/// Parent 1 keeps its head and takes the middle of parent 2 and the tail of
/// parent 3; parents 2 and 3 do the same cyclically. All segments come from
/// copies taken before any parent is modified. If any parent is shorter than
/// three units the call is a no-op.
///
/// Two-parent requests are delegated to `P`.
///
/// # Example
///
/// ```ignore
/// let crossover = ThreeParentsCrossover::new(SinglePointCrossover);
/// crossover.cross_over_all(&mut offspring, &mut rng)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThreeParentsCrossover<P = SinglePointCrossover> {
    pairwise: P,
}

impl<P> ThreeParentsCrossover<P> {
    /// Wraps a pairwise strategy.
    pub fn new(pairwise: P) -> Self {
        Self { pairwise }
    }
}

/// `round(size / 3)` and `round(2 * size / 3)`, rounding halves up.
pub(crate) fn thirds(size: usize) -> (usize, usize) {
    let third = size as f64 / 3.0;
    (
        (third + 0.5).floor() as usize,
        (third * 2.0 + 0.5).floor() as usize,
    )
}

impl<C, P> CrossoverFunction<C> for ThreeParentsCrossover<P>
where
    C: Chromosome,
    P: CrossoverFunction<C>,
{
    fn name(&self) -> &'static str {
        "ThreeParentsCrossover"
    }

    fn cross_over(&self, parent1: &mut C, parent2: &mut C, rng: &mut dyn RngCore) -> Result<()> {
        self.pairwise.cross_over(parent1, parent2, rng)
    }

    fn cross_over_three(
        &self,
        parent1: &mut C,
        parent2: &mut C,
        parent3: &mut C,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        if parent1.size() < 3 || parent2.size() < 3 || parent3.size() < 3 {
            return Ok(());
        }

        let t1 = parent1.clone();
        let t2 = parent2.clone();
        let t3 = parent3.clone();

        let (one1, two1) = thirds(t1.size());
        let (one2, two2) = thirds(t2.size());
        let (one3, two3) = thirds(t3.size());

        parent1.cross_over_segments(&t2, &t3, one1, one2, two2, two3)?;
        parent2.cross_over_segments(&t3, &t1, one2, one3, two3, two1)?;
        parent3.cross_over_segments(&t1, &t2, one3, one1, two1, two2)?;

        for p in [parent1, parent2, parent3] {
            p.meta_mut().set_changed(true);
        }
        Ok(())
    }
}
