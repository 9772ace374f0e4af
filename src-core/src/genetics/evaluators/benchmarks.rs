use crate::genetics::genomes::{BinaryGene, IntegerGene, RealGene};
use crate::genetics::traits::{Evaluator, Gene};
use crate::genetics::types::Chromosome;
use std::f64::consts::PI;

/// Nombre de bits à 1. Optimum = longueur du génome.
#[derive(Clone, Copy, Debug, Default)]
pub struct OneMax;

impl OneMax {
    pub fn prototype(length: usize) -> Vec<BinaryGene> {
        vec![BinaryGene::empty(); length]
    }
}

impl Evaluator<BinaryGene> for OneMax {
    fn evaluate(&self, chromosome: &Chromosome<BinaryGene>) -> f64 {
        chromosome
            .genes()
            .iter()
            .filter(|g| g.is_set())
            .count() as f64
    }

    fn name(&self) -> String {
        "OneMax".to_string()
    }
}

/// Sphère, signe inversé (on maximise) : optimum 0 en l'origine.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub bound: f64,
}

impl Default for Sphere {
    fn default() -> Self {
        Self { bound: 5.12 }
    }
}

impl Sphere {
    pub fn prototype(&self, length: usize) -> Vec<RealGene> {
        vec![RealGene::empty(-self.bound, self.bound); length]
    }
}

impl Evaluator<RealGene> for Sphere {
    fn evaluate(&self, chromosome: &Chromosome<RealGene>) -> f64 {
        -chromosome
            .genes()
            .iter()
            .filter_map(|g| g.value())
            .map(|x| x * x)
            .sum::<f64>()
    }

    fn name(&self) -> String {
        "Sphere".to_string()
    }
}

/// Rastrigin, signe inversé : fortement multimodale, optimum 0 en l'origine.
#[derive(Clone, Copy, Debug)]
pub struct Rastrigin {
    pub amplitude: f64,
}

impl Default for Rastrigin {
    fn default() -> Self {
        Self { amplitude: 10.0 }
    }
}

impl Rastrigin {
    pub fn prototype(length: usize) -> Vec<RealGene> {
        vec![RealGene::empty(-5.12, 5.12); length]
    }
}

impl Evaluator<RealGene> for Rastrigin {
    fn evaluate(&self, chromosome: &Chromosome<RealGene>) -> f64 {
        let a = self.amplitude;
        let values: Vec<f64> = chromosome
            .genes()
            .iter()
            .filter_map(|g| g.value().copied())
            .collect();
        let sum: f64 = values
            .iter()
            .map(|x| x * x - a * (2.0 * PI * x).cos())
            .sum();
        -(a * values.len() as f64 + sum)
    }

    fn name(&self) -> String {
        "Rastrigin".to_string()
    }
}

/// Permutation de `0..n` : un point par gène à sa place (`genome[i] == i`).
#[derive(Clone, Copy, Debug, Default)]
pub struct PermutationOrder;

impl Evaluator<IntegerGene> for PermutationOrder {
    fn evaluate(&self, chromosome: &Chromosome<IntegerGene>) -> f64 {
        chromosome
            .genes()
            .iter()
            .enumerate()
            .filter(|(idx, g)| g.value() == Some(&(*idx as i64)))
            .count() as f64
    }

    fn name(&self) -> String {
        "PermutationOrder".to_string()
    }
}
