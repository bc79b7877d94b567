//! Secondary objectives.
//!
//! Secondary objectives break ties between chromosomes with equal fitness
//! when a population is sorted (e.g. prefer shorter genomes). The first one
//! can be held back at the start of a search and switched on later, either
//! after a share of the budget is spent or once the search starves.

use super::types::Chromosome;
use std::cmp::Ordering;

/// A tie-breaker applied when primary fitness is equal.
pub trait SecondaryObjective<C: Chromosome> {
    /// `Less` means `a` is preferable to `b`.
    fn compare(&self, a: &C, b: &C) -> Ordering;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Prefers smaller chromosomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimizeSize;

impl<C: Chromosome> SecondaryObjective<C> for MinimizeSize {
    fn compare(&self, a: &C, b: &C) -> Ordering {
        a.size().cmp(&b.size())
    }

    fn name(&self) -> &str {
        "MinimizeSize"
    }
}

/// Ordered list of secondary objectives.
pub struct SecondaryObjectives<C: Chromosome> {
    objectives: Vec<Box<dyn SecondaryObjective<C>>>,
    first_disabled: bool,
}

impl<C: Chromosome> Default for SecondaryObjectives<C> {
    fn default() -> Self {
        Self {
            objectives: Vec::new(),
            first_disabled: false,
        }
    }
}

impl<C: Chromosome> SecondaryObjectives<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tie-breaker; earlier ones take precedence.
    pub fn push(&mut self, objective: Box<dyn SecondaryObjective<C>>) {
        self.objectives.push(objective);
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// Whether the first objective is currently held back.
    pub fn is_first_disabled(&self) -> bool {
        self.first_disabled
    }

    /// Holds back the first objective.
    ///
    /// Only takes effect when more than one objective is registered, so at
    /// least one tie-breaker always stays active.
    pub fn disable_first(&mut self) -> bool {
        if self.objectives.len() > 1 {
            self.first_disabled = true;
        }
        self.first_disabled
    }

    /// Re-activates the first objective. Returns `true` if it was disabled.
    pub fn enable_first(&mut self) -> bool {
        std::mem::replace(&mut self.first_disabled, false)
    }

    /// Compares two chromosomes with the active objectives in order.
    pub fn compare(&self, a: &C, b: &C) -> Ordering {
        let skip = usize::from(self.first_disabled);
        self.objectives
            .iter()
            .skip(skip)
            .map(|o| o.compare(a, b))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl<C: Chromosome> std::fmt::Debug for SecondaryObjectives<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecondaryObjectives")
            .field(
                "objectives",
                &self.objectives.iter().map(|o| o.name()).collect::<Vec<_>>(),
            )
            .field("first_disabled", &self.first_disabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::testing::IntVec;

    /// Prefers chromosomes whose first gene is larger.
    struct LargerHead;

    impl SecondaryObjective<IntVec> for LargerHead {
        fn compare(&self, a: &IntVec, b: &IntVec) -> Ordering {
            b.values[0].cmp(&a.values[0])
        }
    }

    #[test]
    fn test_compare_in_order() {
        let mut objectives = SecondaryObjectives::<IntVec>::new();
        objectives.push(Box::new(MinimizeSize));
        objectives.push(Box::new(LargerHead));

        let short = IntVec::from_values(vec![1, 1]);
        let long = IntVec::from_values(vec![5, 1, 1]);
        assert_eq!(objectives.compare(&short, &long), Ordering::Less);

        let a = IntVec::from_values(vec![5, 1]);
        assert_eq!(objectives.compare(&a, &short), Ordering::Less);
    }

    #[test]
    fn test_disable_first_skips_it() {
        let mut objectives = SecondaryObjectives::<IntVec>::new();
        objectives.push(Box::new(MinimizeSize));
        objectives.push(Box::new(LargerHead));
        assert!(objectives.disable_first());

        let short = IntVec::from_values(vec![1, 1]);
        let long = IntVec::from_values(vec![5, 1, 1]);
        assert_eq!(objectives.compare(&short, &long), Ordering::Greater);

        assert!(objectives.enable_first());
        assert!(!objectives.enable_first());
        assert_eq!(objectives.compare(&short, &long), Ordering::Less);
    }

    #[test]
    fn test_disable_needs_two_objectives() {
        let mut objectives = SecondaryObjectives::<IntVec>::new();
        objectives.push(Box::new(MinimizeSize));
        assert!(!objectives.disable_first());
        assert!(!objectives.is_first_disabled());
    }

    #[test]
    fn test_empty_is_equal() {
        let objectives = SecondaryObjectives::<IntVec>::new();
        let a = IntVec::from_values(vec![1]);
        let b = IntVec::from_values(vec![1, 2]);
        assert_eq!(objectives.compare(&a, &b), Ordering::Equal);
    }
}
