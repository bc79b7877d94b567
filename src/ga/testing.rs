//! Toy chromosome, factory and fitness functions shared by the unit tests.

use super::types::{Chromosome, ChromosomeFactory, ChromosomeMeta, FitnessFunction};
use crate::error::{EvolutionError, Result};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

pub(crate) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Integer genome with values in `0..10`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct IntVec {
    pub values: Vec<i32>,
    pub meta: ChromosomeMeta,
}

impl IntVec {
    pub fn from_values(values: Vec<i32>) -> Self {
        Self {
            values,
            meta: ChromosomeMeta::new(),
        }
    }
}

impl Chromosome for IntVec {
    fn size(&self) -> usize {
        self.values.len()
    }

    fn mutate(&mut self, rng: &mut dyn RngCore) -> Result<bool> {
        if self.values.is_empty() {
            return Ok(false);
        }
        let idx = rng.random_range(0..self.values.len());
        let value = rng.random_range(0..10);
        let changed = self.values[idx] != value;
        self.values[idx] = value;
        Ok(changed)
    }

    fn cross_over(&mut self, other: &Self, own_point: usize, other_point: usize) -> Result<()> {
        if own_point > self.values.len() || other_point > other.values.len() {
            return Err(EvolutionError::construction("split point out of range"));
        }
        self.values.truncate(own_point);
        self.values.extend_from_slice(&other.values[other_point..]);
        Ok(())
    }

    fn cross_over_segments(
        &mut self,
        other1: &Self,
        other2: &Self,
        own_end: usize,
        other1_start: usize,
        other1_end: usize,
        other2_start: usize,
    ) -> Result<()> {
        self.values.truncate(own_end);
        self.values
            .extend_from_slice(&other1.values[other1_start..other1_end]);
        self.values.extend_from_slice(&other2.values[other2_start..]);
        Ok(())
    }

    fn meta(&self) -> &ChromosomeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ChromosomeMeta {
        &mut self.meta
    }
}

/// Random genomes of a fixed length.
pub(crate) struct IntVecFactory {
    pub len: usize,
}

impl ChromosomeFactory<IntVec> for IntVecFactory {
    fn create(&self, rng: &mut dyn RngCore) -> IntVec {
        IntVec::from_values((0..self.len).map(|_| rng.random_range(0..10)).collect())
    }
}

/// Fitness backed by a plain function.
pub(crate) struct FnFitness {
    pub f: fn(&IntVec) -> f64,
    pub maximize: bool,
}

impl FitnessFunction<IntVec> for FnFitness {
    fn fitness(&self, chromosome: &IntVec) -> f64 {
        (self.f)(chromosome)
    }

    fn is_maximization(&self) -> bool {
        self.maximize
    }
}

/// Sum of genes; maximised it drives every gene to 9.
pub(crate) fn sum_of_genes(c: &IntVec) -> f64 {
    c.values.iter().map(|&v| v as f64).sum()
}

/// Distance of every gene from 9; minimised it drives every gene to 9.
pub(crate) fn distance_to_nines(c: &IntVec) -> f64 {
    c.values.iter().map(|&v| (9 - v).abs() as f64).sum()
}

/// Sum of squared genes; conflicts with [`distance_to_nines`].
pub(crate) fn sum_of_squares(c: &IntVec) -> f64 {
    c.values.iter().map(|&v| (v * v) as f64).sum()
}

pub(crate) fn minimize(f: fn(&IntVec) -> f64) -> Box<dyn FitnessFunction<IntVec>> {
    Box::new(FnFitness { f, maximize: false })
}

pub(crate) fn maximize(f: fn(&IntVec) -> f64) -> Box<dyn FitnessFunction<IntVec>> {
    Box::new(FnFitness { f, maximize: true })
}

/// Evaluated chromosome with explicit per-objective values.
pub(crate) fn scored(values: &[f64]) -> IntVec {
    let mut c = IntVec::from_values(vec![0; 3]);
    for (i, &v) in values.iter().enumerate() {
        c.meta.set_fitness(i, v);
    }
    c
}
