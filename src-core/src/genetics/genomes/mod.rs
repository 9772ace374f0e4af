pub mod binary;
pub mod integer;
pub mod real;

pub use binary::BinaryGene;
pub use integer::IntegerGene;
pub use real::RealGene;

use super::traits::Gene;
use super::types::Chromosome;
use rand::RngCore;

/// Construit un individu en tirant chaque gène d'un prototype via sa propre règle.
pub fn random_chromosome<G: Gene>(prototype: &[G], rng: &mut dyn RngCore) -> Chromosome<G> {
    let genome = prototype
        .iter()
        .map(|template| {
            let mut gene = template.clone();
            gene.reset(rng);
            gene
        })
        .collect();
    Chromosome::new(genome)
}

/// Population initiale de `size` individus aléatoires partageant le même prototype.
pub fn random_population<G: Gene>(
    prototype: &[G],
    size: usize,
    rng: &mut dyn RngCore,
) -> Vec<Chromosome<G>> {
    (0..size).map(|_| random_chromosome(prototype, rng)).collect()
}

/// Permutation aléatoire de `0..n` encodée en gènes entiers (pour le croisement OX).
pub fn random_permutation(n: usize, rng: &mut dyn RngCore) -> Chromosome<IntegerGene> {
    use rand::seq::SliceRandom;

    let upper = n.saturating_sub(1) as i64;
    let mut order: Vec<i64> = (0..n as i64).collect();
    order.shuffle(rng);
    Chromosome::new(
        order
            .into_iter()
            .map(|v| IntegerGene::new(v, 0, upper))
            .collect(),
    )
}
