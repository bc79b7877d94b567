//! Search budget: generations, wall-clock time, evaluations, cancellation.

use super::config::GaConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tracks how much of the search budget has been consumed.
///
/// The engines poll [`is_exhausted`](SearchBudget::is_exhausted) between
/// steps; nothing is ever interrupted mid-step.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    max_generations: usize,
    time_limit: Option<Duration>,
    max_evaluations: Option<u64>,
    started: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl SearchBudget {
    /// Budget described by `config`. The clock starts at [`start`](Self::start).
    pub fn from_config(config: &GaConfig) -> Self {
        Self {
            max_generations: config.max_generations,
            time_limit: config.time_limit_ms.map(Duration::from_millis),
            max_evaluations: config.max_evaluations,
            started: None,
            cancel: None,
        }
    }

    /// Adds an external cancellation flag.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Starts (or restarts) the wall clock.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Time since [`start`](Self::start).
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// Whether the cancellation flag is raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Whether any limit has been reached.
    pub fn is_exhausted(&self, iteration: usize, evaluations: u64) -> bool {
        if self.is_cancelled() || iteration >= self.max_generations {
            return true;
        }
        if self.max_evaluations.is_some_and(|max| evaluations >= max) {
            return true;
        }
        self.time_limit.is_some_and(|limit| self.elapsed() >= limit)
    }

    /// Fraction of the budget consumed, in `[0, 1]`.
    ///
    /// The most advanced of the configured limits wins.
    pub fn progress(&self, iteration: usize, evaluations: u64) -> f64 {
        let mut progress = iteration as f64 / self.max_generations.max(1) as f64;
        if let Some(max) = self.max_evaluations {
            progress = progress.max(evaluations as f64 / max.max(1) as f64);
        }
        if let Some(limit) = self.time_limit {
            let ratio = self.elapsed().as_secs_f64() / limit.as_secs_f64().max(f64::EPSILON);
            progress = progress.max(ratio);
        }
        progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_limit() {
        let budget = SearchBudget::from_config(&GaConfig::default().with_max_generations(10));
        assert!(!budget.is_exhausted(9, 0));
        assert!(budget.is_exhausted(10, 0));
        assert!((budget.progress(5, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluation_limit() {
        let config = GaConfig::default()
            .with_max_generations(1000)
            .with_max_evaluations(200);
        let budget = SearchBudget::from_config(&config);
        assert!(!budget.is_exhausted(1, 199));
        assert!(budget.is_exhausted(1, 200));
        assert!((budget.progress(10, 100) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_time_limit() {
        let config = GaConfig::default().with_time_limit_ms(1);
        let mut budget = SearchBudget::from_config(&config);
        budget.start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(budget.is_exhausted(0, 0));
        assert!((budget.progress(0, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cancellation() {
        let flag = Arc::new(AtomicBool::new(false));
        let budget = SearchBudget::from_config(&GaConfig::default()).with_cancel(flag.clone());
        assert!(!budget.is_exhausted(0, 0));
        flag.store(true, Ordering::Relaxed);
        assert!(budget.is_cancelled());
        assert!(budget.is_exhausted(0, 0));
    }
}
