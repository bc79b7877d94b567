//! Extension points around the evolution loop: archive and local search.

use super::types::{is_better, Chromosome, FitnessFunction};
use rand::RngCore;
use std::time::Instant;

/// Keeps the best individuals seen across a run.
///
/// The single-objective engines call [`update`](Archive::update) after every
/// generation and [`best`](Archive::best) once when the search ends.
pub trait Archive<C: Chromosome> {
    /// Offers the current population to the archive.
    fn update(&mut self, population: &[C], maximize: bool);

    /// Best individual known to the archive, reconciled with `current_best`.
    ///
    /// Implementations must return by `deadline`; the engine blocks until
    /// they do and cannot interrupt a slow archive. Whatever is returned is
    /// used as-is, even if the search behind it is incomplete. `None` keeps
    /// `current_best`.
    fn best(&mut self, current_best: &C, deadline: Instant) -> Option<C>;
}

/// Archive holding the single best evaluated individual.
#[derive(Debug, Clone)]
pub struct BestArchive<C> {
    best: Option<C>,
    maximize: bool,
}

impl<C> Default for BestArchive<C> {
    fn default() -> Self {
        Self {
            best: None,
            maximize: false,
        }
    }
}

impl<C: Chromosome> BestArchive<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best individual seen so far.
    pub fn get(&self) -> Option<&C> {
        self.best.as_ref()
    }
}

impl<C: Chromosome> Archive<C> for BestArchive<C> {
    fn update(&mut self, population: &[C], maximize: bool) {
        self.maximize = maximize;
        for candidate in population {
            let replace = match &self.best {
                Some(best) => is_better(candidate.total_fitness(), best.total_fitness(), maximize),
                None => true,
            };
            if replace {
                self.best = Some(candidate.clone());
            }
        }
    }

    fn best(&mut self, current_best: &C, _deadline: Instant) -> Option<C> {
        self.best
            .as_ref()
            .filter(|b| is_better(b.total_fitness(), current_best.total_fitness(), self.maximize))
            .cloned()
    }
}

/// Refines individuals between generations.
///
/// Implementations must re-evaluate what they change (see
/// [`evaluate_chromosome`](super::types::evaluate_chromosome)) and must never
/// make the best individual worse.
pub trait LocalSearch<C: Chromosome> {
    fn apply(
        &mut self,
        population: &mut [C],
        fitness_functions: &[Box<dyn FitnessFunction<C>>],
        rng: &mut dyn RngCore,
    );
}
