//! Generic evolutionary search.
//!
//! Provides three evolution engines over a user-defined chromosome:
//!
//! - **MonotonicGA**: generational, elitist GA whose best fitness never
//!   worsens between generations.
//! - **SteadyStateGA**: incremental replacement of the selected parents in
//!   the live population.
//! - **NSGA-II**: multi-objective search by non-dominated sorting and
//!   crowding distance.
//!
//! The engines share one search driver: budget polling (generations,
//! wall-clock time, evaluations, cancellation), starvation tracking,
//! secondary-objective activation, optional local search and archive
//! reconciliation, and listener notifications.
//!
//! # Architecture
//!
//! The crate knows nothing about what a genome contains. Domains implement
//! [`ga::Chromosome`], [`ga::ChromosomeFactory`] and [`ga::FitnessFunction`];
//! operators only decide where genomes are cut and which individuals
//! survive.

pub mod error;
pub mod ga;
