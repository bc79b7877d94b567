//! Error types for the evolutionary search engine.

use thiserror::Error;

/// Errors raised by the engines and their operator contracts.
///
/// Only [`ConstructionFailed`](EvolutionError::ConstructionFailed) is
/// recoverable: the engines abandon the current offspring set and carry on.
/// Every other variant indicates a configuration or programming error and is
/// returned to the caller as soon as it is observed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
    /// A crossover or mutation could not build a valid offspring.
    #[error("construction failed: {0}")]
    ConstructionFailed(String),

    /// An operator was asked to combine a number of parents it cannot handle.
    #[error("{operator} does not support {arity} parents")]
    UnsupportedArity {
        /// Name of the operator.
        operator: &'static str,
        /// Number of parents that was requested.
        arity: usize,
    },

    /// A chromosome does not implement an optional capability.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The engine was built without any fitness function.
    #[error("at least one fitness function is required")]
    NoFitnessFunctions,
}

impl EvolutionError {
    /// Builds a [`ConstructionFailed`](EvolutionError::ConstructionFailed) error.
    pub fn construction(reason: impl Into<String>) -> Self {
        EvolutionError::ConstructionFailed(reason.into())
    }

    /// Returns `true` if the engine may discard the offspring and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EvolutionError::ConstructionFailed(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvolutionError>;
