//! Core trait definitions for the evolutionary search engine.
//!
//! [`Chromosome`], [`ChromosomeFactory`] and [`FitnessFunction`] define the
//! contract between the generic engines and the domain that owns the genome.
//! The engines never look inside a genome: they clone it, ask it to mutate or
//! recombine itself, measure its size, and store evaluation results in its
//! [`ChromosomeMeta`].

use crate::error::{EvolutionError, Result};
use rand::RngCore;

/// Engine-owned bookkeeping carried by every chromosome.
///
/// Holds one fitness slot per objective (indexed like the engine's fitness
/// function list), the age, the Pareto rank and crowding distance assigned by
/// NSGA-II, and the change flag raised by crossover or mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChromosomeMeta {
    fitness: Vec<Option<f64>>,
    age: usize,
    rank: usize,
    crowding_distance: f64,
    changed: bool,
}

impl ChromosomeMeta {
    /// Creates empty metadata: not evaluated, age 0, unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitness for `objective`, or `None` if it has not been evaluated.
    pub fn fitness(&self, objective: usize) -> Option<f64> {
        self.fitness.get(objective).copied().flatten()
    }

    /// Stores the fitness for `objective`.
    pub fn set_fitness(&mut self, objective: usize, value: f64) {
        if self.fitness.len() <= objective {
            self.fitness.resize(objective + 1, None);
        }
        self.fitness[objective] = Some(value);
    }

    /// Number of objectives that currently hold a value.
    pub fn evaluated_objectives(&self) -> usize {
        self.fitness.iter().filter(|f| f.is_some()).count()
    }

    /// Sum of all evaluated objective values.
    ///
    /// This is the scalar the single-objective engines sort and compare on.
    pub fn total_fitness(&self) -> f64 {
        self.fitness.iter().flatten().sum()
    }

    /// Generation in which the genome last changed.
    pub fn age(&self) -> usize {
        self.age
    }

    /// Records the generation in which the genome changed.
    pub fn update_age(&mut self, generation: usize) {
        self.age = generation;
    }

    /// Pareto rank (0 = non-dominated front).
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    /// Crowding distance within the chromosome's front.
    pub fn crowding_distance(&self) -> f64 {
        self.crowding_distance
    }

    pub fn set_crowding_distance(&mut self, distance: f64) {
        self.crowding_distance = distance;
    }

    /// Whether the genome changed since the last evaluation.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }
}

/// A candidate solution handled by the engines.
///
/// `Clone` must produce a fully independent copy: the engines mutate clones
/// in place and rely on the original being untouched. Genomes backed by
/// shared storage (`Rc`, `Arc<Mutex<_>>`) must deep-copy in their `Clone`.
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone, Debug)]
/// struct Genes {
///     values: Vec<i32>,
///     meta: ChromosomeMeta,
/// }
///
/// impl Chromosome for Genes {
///     fn size(&self) -> usize { self.values.len() }
///     fn mutate(&mut self, rng: &mut dyn RngCore) -> Result<bool> { /* ... */ }
///     fn cross_over(&mut self, other: &Self, own: usize, theirs: usize) -> Result<()> {
///         self.values.truncate(own);
///         self.values.extend_from_slice(&other.values[theirs..]);
///         Ok(())
///     }
///     fn meta(&self) -> &ChromosomeMeta { &self.meta }
///     fn meta_mut(&mut self) -> &mut ChromosomeMeta { &mut self.meta }
/// }
/// ```
pub trait Chromosome: Clone + std::fmt::Debug {
    /// Genome length in domain units (statements, genes, ...).
    fn size(&self) -> usize;

    /// Mutates the genome in place.
    ///
    /// Returns `Ok(true)` if the genome actually changed. Returning
    /// [`EvolutionError::ConstructionFailed`] makes the engine discard the
    /// offspring set this chromosome belongs to.
    fn mutate(&mut self, rng: &mut dyn RngCore) -> Result<bool>;

    /// Single-point recombination: keep `self[..own_point]` and append
    /// `other[other_point..]`.
    fn cross_over(&mut self, other: &Self, own_point: usize, other_point: usize) -> Result<()>;

    /// Three-way recombination: keep `self[..own_end]`, append
    /// `other1[other1_start..other1_end]`, then `other2[other2_start..]`.
    ///
    /// The default signals that the genome cannot do this.
    fn cross_over_segments(
        &mut self,
        _other1: &Self,
        _other2: &Self,
        _own_end: usize,
        _other1_start: usize,
        _other1_end: usize,
        _other2_start: usize,
    ) -> Result<()> {
        Err(EvolutionError::UnsupportedOperation(
            "chromosome does not support three-way recombination".into(),
        ))
    }

    /// Engine bookkeeping.
    fn meta(&self) -> &ChromosomeMeta;

    /// Mutable engine bookkeeping.
    fn meta_mut(&mut self) -> &mut ChromosomeMeta;

    /// Fitness for `objective`; `None` before evaluation.
    fn fitness(&self, objective: usize) -> Option<f64> {
        self.meta().fitness(objective)
    }

    /// Sum of all objective values.
    fn total_fitness(&self) -> f64 {
        self.meta().total_fitness()
    }

    fn age(&self) -> usize {
        self.meta().age()
    }

    fn is_changed(&self) -> bool {
        self.meta().is_changed()
    }
}

/// Produces freshly initialised random chromosomes.
pub trait ChromosomeFactory<C: Chromosome> {
    /// Creates one random chromosome. It is not evaluated yet.
    fn create(&self, rng: &mut dyn RngCore) -> C;
}

impl<C, F> ChromosomeFactory<C> for F
where
    C: Chromosome,
    F: Fn(&mut dyn RngCore) -> C,
{
    fn create(&self, rng: &mut dyn RngCore) -> C {
        self(rng)
    }
}

/// Scores a chromosome against one objective.
///
/// The engine stores the returned value in the chromosome's metadata at the
/// index this function occupies in the engine's fitness function list.
pub trait FitnessFunction<C: Chromosome> {
    /// Computes the score. Must not depend on state left over by other runs.
    fn fitness(&self, chromosome: &C) -> f64;

    /// `true` if larger scores are better. Defaults to minimisation.
    fn is_maximization(&self) -> bool {
        false
    }

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Scores `chromosome` against every fitness function and stores the results.
///
/// Clears the change flag afterwards. Local search implementations use this
/// to re-score the individuals they modify.
pub fn evaluate_chromosome<C: Chromosome>(
    chromosome: &mut C,
    fitness_functions: &[Box<dyn FitnessFunction<C>>],
) {
    for (objective, ff) in fitness_functions.iter().enumerate() {
        let value = ff.fitness(chromosome);
        chromosome.meta_mut().set_fitness(objective, value);
    }
    chromosome.meta_mut().set_changed(false);
}

/// Returns `true` if `candidate` is strictly better than `incumbent`.
pub(crate) fn is_better(candidate: f64, incumbent: f64, maximize: bool) -> bool {
    if maximize {
        candidate > incumbent
    } else {
        candidate < incumbent
    }
}

/// Orders two scalar fitness values best-first.
pub(crate) fn compare_fitness(a: f64, b: f64, maximize: bool) -> std::cmp::Ordering {
    let ord = a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal);
    if maximize {
        ord.reverse()
    } else {
        ord
    }
}
