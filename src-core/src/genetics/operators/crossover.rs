use super::{Composite, CrossoverOperator, GeneticOperator, OperatorCore};
use crate::genetics::traits::Gene;
use crate::genetics::types::Chromosome;
use crate::utils::HashMap;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

pub type MetaCrossover<G> = Composite<dyn CrossoverOperator<G>>;

// =========================================================================
// NOYAUX SUR TRANCHES
// =========================================================================

pub fn single_point_crossover<T: Clone>(
    parent1: &[T],
    parent2: &[T],
    rng: &mut dyn RngCore,
) -> (Vec<T>, Vec<T>) {
    assert_eq!(parent1.len(), parent2.len(), "Parent size mismatch");
    let len = parent1.len();
    if len < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let split_idx = rng.random_range(1..len);

    let mut child1 = Vec::with_capacity(len);
    child1.extend_from_slice(&parent1[..split_idx]);
    child1.extend_from_slice(&parent2[split_idx..]);

    let mut child2 = Vec::with_capacity(len);
    child2.extend_from_slice(&parent2[..split_idx]);
    child2.extend_from_slice(&parent1[split_idx..]);

    (child1, child2)
}

pub fn uniform_crossover<T: Clone>(
    parent1: &[T],
    parent2: &[T],
    rng: &mut dyn RngCore,
) -> (Vec<T>, Vec<T>) {
    assert_eq!(parent1.len(), parent2.len(), "Parent size mismatch");

    parent1
        .iter()
        .zip(parent2.iter())
        .map(|(g1, g2)| {
            if rng.random_bool(0.5) {
                (g1.clone(), g2.clone())
            } else {
                (g2.clone(), g1.clone())
            }
        })
        .unzip()
}

/// Croisement ordonné (OX1) : préserve un segment du premier parent et complète
/// dans l'ordre relatif du second. Conserve les permutations.
///
/// Si les parents ne contiennent pas le même multiensemble de gènes, le
/// complément est impossible : les enfants sont alors des copies des parents.
pub fn order_crossover<T: Clone + Eq + Hash>(
    parent1: &[T],
    parent2: &[T],
    rng: &mut dyn RngCore,
) -> (Vec<T>, Vec<T>) {
    assert_eq!(parent1.len(), parent2.len(), "Parent size mismatch");
    let len = parent1.len();
    if len < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let a = rng.random_range(0..len);
    let b = rng.random_range(0..len);
    let (start, end) = if a <= b { (a, b + 1) } else { (b, a + 1) };

    match (
        order_child(parent1, parent2, start, end),
        order_child(parent2, parent1, start, end),
    ) {
        (Some(c1), Some(c2)) => (c1, c2),
        _ => (parent1.to_vec(), parent2.to_vec()),
    }
}

fn order_child<T: Clone + Eq + Hash>(
    donor: &[T],
    filler: &[T],
    start: usize,
    end: usize,
) -> Option<Vec<T>> {
    let len = donor.len();

    // Multiensemble des gènes du segment (les doublons sont comptés)
    let mut segment: HashMap<&T, usize> = HashMap::new();
    for gene in &donor[start..end] {
        *segment.entry(gene).or_insert(0) += 1;
    }

    let mut remaining = Vec::with_capacity(len - (end - start));
    for offset in 0..len {
        let gene = &filler[(end + offset) % len];
        match segment.get_mut(gene) {
            Some(count) if *count > 0 => *count -= 1,
            _ => remaining.push(gene.clone()),
        }
    }
    if remaining.len() != len - (end - start) {
        return None;
    }

    let mut child: Vec<Option<T>> = vec![None; len];
    for idx in start..end {
        child[idx] = Some(donor[idx].clone());
    }
    for (offset, gene) in remaining.into_iter().enumerate() {
        child[(end + offset) % len] = Some(gene);
    }
    child.into_iter().collect()
}

// =========================================================================
// OPÉRATEURS
// =========================================================================

macro_rules! crossover_operator {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $kernel:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Serialize, Deserialize)]
        pub struct $ty {
            core: OperatorCore,
        }

        impl $ty {
            pub fn new(probability: f64) -> Self {
                Self {
                    core: OperatorCore::new(probability),
                }
            }
        }

        impl GeneticOperator for $ty {
            fn name(&self) -> &str {
                $name
            }
            fn core(&self) -> &OperatorCore {
                &self.core
            }
            fn core_mut(&mut self) -> &mut OperatorCore {
                &mut self.core
            }
        }

        impl<G: Gene> CrossoverOperator<G> for $ty {
            fn recombine(
                &self,
                parent1: &Chromosome<G>,
                parent2: &Chromosome<G>,
                rng: &mut dyn RngCore,
            ) -> (Chromosome<G>, Chromosome<G>) {
                let (genes1, genes2) = $kernel(parent1.genes(), parent2.genes(), rng);
                (Chromosome::new(genes1), Chromosome::new(genes2))
            }
        }
    };
}

crossover_operator!(
    /// Un point de coupure, échange des queues.
    SinglePointCrossover,
    "single_point",
    single_point_crossover
);

crossover_operator!(
    /// Chaque locus est échangé avec une probabilité 1/2.
    UniformCrossover,
    "uniform",
    uniform_crossover
);

crossover_operator!(
    /// Croisement ordonné OX1 (génomes de type permutation).
    OrderCrossover,
    "order",
    order_crossover
);
