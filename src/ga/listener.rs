//! Search observers.
//!
//! The engines publish lifecycle notifications to every registered
//! [`SearchListener`]. Listeners observe; they cannot alter the population.

use super::types::Chromosome;
use std::sync::mpsc::Sender;

/// Receives notifications from an engine. Every hook defaults to a no-op.
pub trait SearchListener<C: Chromosome> {
    /// A search is starting; the initial population is about to be built.
    fn search_started(&mut self) {}

    /// A generation completed. `population` is sorted for single-objective
    /// engines and front-ordered for NSGA-II.
    fn iteration(&mut self, _iteration: usize, _population: &[C]) {}

    /// `chromosome` is about to be mutated.
    fn mutation(&mut self, _chromosome: &C) {}

    /// `chromosome` has just been evaluated.
    fn evaluation(&mut self, _chromosome: &C) {}

    /// The search ended; `population` is the final population.
    fn search_finished(&mut self, _population: &[C]) {}
}

/// Logs lifecycle notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl<C: Chromosome> SearchListener<C> for LoggingListener {
    fn search_started(&mut self) {
        tracing::info!("search started");
    }

    fn iteration(&mut self, iteration: usize, population: &[C]) {
        tracing::debug!(
            iteration,
            population = population.len(),
            best = population.first().map(|c| c.total_fitness()),
            "iteration advanced"
        );
    }

    fn search_finished(&mut self, population: &[C]) {
        tracing::info!(
            population = population.len(),
            best = population.first().map(|c| c.total_fitness()),
            "search finished"
        );
    }
}

/// Compact, owned form of a notification for channel subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Started,
    Iteration {
        iteration: usize,
        population_size: usize,
        best_fitness: Option<f64>,
    },
    Mutation,
    Evaluation {
        fitness: f64,
    },
    Finished {
        population_size: usize,
        best_fitness: Option<f64>,
    },
}

/// Forwards notifications over a channel. A disconnected receiver is ignored.
impl<C: Chromosome> SearchListener<C> for Sender<SearchEvent> {
    fn search_started(&mut self) {
        let _ = self.send(SearchEvent::Started);
    }

    fn iteration(&mut self, iteration: usize, population: &[C]) {
        let _ = self.send(SearchEvent::Iteration {
            iteration,
            population_size: population.len(),
            best_fitness: population.first().map(|c| c.total_fitness()),
        });
    }

    fn mutation(&mut self, _chromosome: &C) {
        let _ = self.send(SearchEvent::Mutation);
    }

    fn evaluation(&mut self, chromosome: &C) {
        let _ = self.send(SearchEvent::Evaluation {
            fitness: chromosome.total_fitness(),
        });
    }

    fn search_finished(&mut self, population: &[C]) {
        let _ = self.send(SearchEvent::Finished {
            population_size: population.len(),
            best_fitness: population.first().map(|c| c.total_fitness()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::testing::{scored, IntVec};
    use std::sync::mpsc::channel;

    #[test]
    fn test_channel_listener_forwards_events() {
        let (tx, rx) = channel();
        let mut listener: Box<dyn SearchListener<IntVec>> = Box::new(tx);
        let pop = vec![scored(&[2.0]), scored(&[3.0])];

        listener.search_started();
        listener.mutation(&pop[0]);
        listener.evaluation(&pop[1]);
        listener.iteration(4, &pop);
        listener.search_finished(&pop);

        let events: Vec<SearchEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                SearchEvent::Started,
                SearchEvent::Mutation,
                SearchEvent::Evaluation { fitness: 3.0 },
                SearchEvent::Iteration {
                    iteration: 4,
                    population_size: 2,
                    best_fitness: Some(2.0)
                },
                SearchEvent::Finished {
                    population_size: 2,
                    best_fitness: Some(2.0)
                },
            ]
        );
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = channel();
        drop(rx);
        let mut listener: Box<dyn SearchListener<IntVec>> = Box::new(tx);
        listener.search_started();
        listener.search_finished(&[]);
    }
}
