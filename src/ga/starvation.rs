//! Best-fitness plateau tracking.

/// Differences below this are floating-point noise, not progress.
pub const FITNESS_TOLERANCE: f64 = 1e-9;

/// Counts consecutive generations whose best fitness did not change.
///
/// ```
/// use u_evosearch::ga::StarvationTracker;
///
/// let mut tracker = StarvationTracker::new();
/// assert_eq!(tracker.record(10.0), 0); // first observation is a change
/// assert_eq!(tracker.record(10.0), 1);
/// assert_eq!(tracker.record(10.0), 2);
/// assert_eq!(tracker.record(8.0), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarvationTracker {
    counter: usize,
    last_best: Option<f64>,
}

impl StarvationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the best fitness of the latest generation and returns the
    /// updated starvation count.
    pub fn record(&mut self, best_fitness: f64) -> usize {
        match self.last_best {
            Some(last) if (best_fitness - last).abs() <= FITNESS_TOLERANCE => {
                self.counter += 1;
            }
            _ => {
                if self.counter > 0 {
                    tracing::info!(
                        generations = self.counter,
                        "reset starvation counter"
                    );
                }
                self.counter = 0;
                self.last_best = Some(best_fitness);
            }
        }
        self.counter
    }

    /// Current number of consecutive unchanged generations.
    pub fn count(&self) -> usize {
        self.counter
    }

    /// Best fitness at the last change.
    pub fn last_best(&self) -> Option<f64> {
        self.last_best
    }
}

/// Returns `true` if `after` is no worse than `before` within
/// [`FITNESS_TOLERANCE`].
pub fn is_non_regressing(before: f64, after: f64, maximize: bool) -> bool {
    if maximize {
        after >= before - FITNESS_TOLERANCE
    } else {
        after <= before + FITNESS_TOLERANCE
    }
}
