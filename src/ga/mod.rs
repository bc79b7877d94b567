//! Evolutionary search engines.
//!
//! The engines are generic over a domain-owned [`Chromosome`]. The domain
//! supplies a [`ChromosomeFactory`] and one or more [`FitnessFunction`]s;
//! everything else (selection, crossover, replacement, archive, local
//! search, listeners) has a default that can be swapped on the
//! [`SearchContext`].
//!
//! # Engines
//!
//! - [`MonotonicGa`]: generational GA with elitism; best fitness never worsens
//! - [`SteadyStateGa`]: replaces the selected parents in place, a few at a time
//! - [`Nsga2`]: multi-objective, Pareto ranking with crowding distance
//!
//! All three implement [`EvolutionStrategy`].
//!
//! # Key Types
//!
//! - [`GaConfig`]: search parameters and budget
//! - [`SearchContext`]: collaborators, counters and the random generator
//! - [`SearchResult`]: final population, best individual and run statistics
//!
//! # Submodules
//!
//! - [`multi_objective`]: non-dominated sorting and crowding distance
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

mod budget;
mod config;
mod context;
mod crossover;
mod hooks;
mod listener;
mod monotonic;
pub mod multi_objective;
mod nsga2;
mod replacement;
mod search;
mod secondary;
mod selection;
mod starvation;
mod steady_state;
mod strategy;
mod types;

#[cfg(test)]
mod testing;

pub use budget::SearchBudget;
pub use config::GaConfig;
pub use context::SearchContext;
pub use crossover::{CrossoverFunction, SinglePointCrossover, ThreeParentsCrossover};
pub use hooks::{Archive, BestArchive, LocalSearch};
pub use listener::{LoggingListener, SearchEvent, SearchListener};
pub use monotonic::MonotonicGa;
pub use nsga2::Nsga2;
pub use replacement::{FitnessReplacement, ReplacementFunction};
pub use secondary::{MinimizeSize, SecondaryObjective, SecondaryObjectives};
pub use selection::{Selection, SelectionFunction};
pub use starvation::{is_non_regressing, StarvationTracker, FITNESS_TOLERANCE};
pub use steady_state::SteadyStateGa;
pub use strategy::{EvolutionStrategy, SearchResult};
pub use types::{evaluate_chromosome, Chromosome, ChromosomeFactory, ChromosomeMeta, FitnessFunction};
