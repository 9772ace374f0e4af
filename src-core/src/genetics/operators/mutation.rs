use super::{Composite, GeneticOperator, MutationOperator, OperatorCore};
use crate::genetics::traits::{Gene, NumericGene};
use crate::genetics::types::Chromosome;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

pub type MetaMutation<G> = Composite<dyn MutationOperator<G>>;

/// Quels loci une mutation appliquée touche.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LocusPolicy {
    /// Un seul locus tiré uniformément.
    Single,
    /// Chaque locus indépendamment avec ce taux.
    Rate(f64),
}

impl LocusPolicy {
    fn for_each<T>(
        self,
        genes: &mut [T],
        rng: &mut dyn RngCore,
        mut f: impl FnMut(&mut T, &mut dyn RngCore),
    ) {
        if genes.is_empty() {
            return;
        }
        match self {
            LocusPolicy::Single => {
                let idx = rng.random_range(0..genes.len());
                f(&mut genes[idx], &mut *rng);
            }
            LocusPolicy::Rate(rate) => {
                for gene in genes.iter_mut() {
                    if rng.random::<f64>() < rate {
                        f(gene, &mut *rng);
                    }
                }
            }
        }
    }
}

// =========================================================================
// NOYAUX SUR TRANCHES
// =========================================================================

/// Échange deux loci distincts.
pub fn swap_mutation<T>(genes: &mut [T], rng: &mut dyn RngCore) {
    if genes.len() < 2 {
        return;
    }
    let idx1 = rng.random_range(0..genes.len());
    let mut idx2 = rng.random_range(0..genes.len() - 1);
    if idx2 >= idx1 {
        idx2 += 1;
    }
    genes.swap(idx1, idx2);
}

pub fn gaussian_mutation<G: NumericGene>(gene: &mut G, sigma: f64, rng: &mut dyn RngCore) {
    let Some(x) = gene.as_f64() else {
        return;
    };
    let (lower, upper) = gene.bounds();
    // sigma est relatif à l'amplitude du domaine
    let scale = sigma * (upper - lower);
    if let Ok(normal) = Normal::new(0.0, scale) {
        gene.set_f64(x + normal.sample(rng));
    }
}

/// Mutation polynomiale bornée (Deb & Goyal).
pub fn polynomial_mutation<G: NumericGene>(gene: &mut G, eta: f64, rng: &mut dyn RngCore) {
    let Some(x) = gene.as_f64() else {
        return;
    };
    let (lower, upper) = gene.bounds();
    let span = upper - lower;
    if span <= 0.0 {
        return;
    }

    let delta1 = (x - lower) / span;
    let delta2 = (upper - x) / span;
    let mut_pow = 1.0 / (eta + 1.0);
    let u: f64 = rng.random();

    let delta_q = if u < 0.5 {
        let xy = 1.0 - delta1;
        let val = 2.0 * u + (1.0 - 2.0 * u) * xy.powf(eta + 1.0);
        val.powf(mut_pow) - 1.0
    } else {
        let xy = 1.0 - delta2;
        let val = 2.0 * (1.0 - u) + 2.0 * (u - 0.5) * xy.powf(eta + 1.0);
        1.0 - val.powf(mut_pow)
    };

    gene.set_f64(x + delta_q * span);
}

// =========================================================================
// OPÉRATEURS
// =========================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwapMutation {
    core: OperatorCore,
}

impl SwapMutation {
    pub fn new(probability: f64) -> Self {
        Self {
            core: OperatorCore::new(probability),
        }
    }
}

impl GeneticOperator for SwapMutation {
    fn name(&self) -> &str {
        "swap"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: Gene> MutationOperator<G> for SwapMutation {
    fn perturb(&self, individual: &mut Chromosome<G>, rng: &mut dyn RngCore) {
        swap_mutation(individual.genes_mut(), rng);
    }
}

/// Retire des loci avec la règle de tirage propre à chaque gène.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomResetMutation {
    core: OperatorCore,
    policy: LocusPolicy,
}

impl RandomResetMutation {
    pub fn new(probability: f64) -> Self {
        Self {
            core: OperatorCore::new(probability),
            policy: LocusPolicy::Single,
        }
    }

    pub fn with_policy(mut self, policy: LocusPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl GeneticOperator for RandomResetMutation {
    fn name(&self) -> &str {
        "random_reset"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: Gene> MutationOperator<G> for RandomResetMutation {
    fn perturb(&self, individual: &mut Chromosome<G>, rng: &mut dyn RngCore) {
        self.policy
            .for_each(individual.genes_mut(), rng, |gene, rng| gene.reset(rng));
    }
}

/// Bruit gaussien (sigma relatif au domaine du gène).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GaussianMutation {
    core: OperatorCore,
    pub sigma: f64,
    policy: LocusPolicy,
}

impl GaussianMutation {
    pub fn new(probability: f64, sigma: f64) -> Self {
        Self {
            core: OperatorCore::new(probability),
            sigma: sigma.abs(),
            policy: LocusPolicy::Single,
        }
    }

    pub fn with_policy(mut self, policy: LocusPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl GeneticOperator for GaussianMutation {
    fn name(&self) -> &str {
        "gaussian"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: NumericGene> MutationOperator<G> for GaussianMutation {
    fn perturb(&self, individual: &mut Chromosome<G>, rng: &mut dyn RngCore) {
        let sigma = self.sigma;
        self.policy.for_each(individual.genes_mut(), rng, |gene, rng| {
            gaussian_mutation(gene, sigma, rng)
        });
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolynomialMutation {
    core: OperatorCore,
    pub eta: f64,
    policy: LocusPolicy,
}

impl PolynomialMutation {
    pub fn new(probability: f64, eta: f64) -> Self {
        Self {
            core: OperatorCore::new(probability),
            eta: eta.max(0.0),
            policy: LocusPolicy::Single,
        }
    }

    pub fn with_policy(mut self, policy: LocusPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl GeneticOperator for PolynomialMutation {
    fn name(&self) -> &str {
        "polynomial"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: NumericGene> MutationOperator<G> for PolynomialMutation {
    fn perturb(&self, individual: &mut Chromosome<G>, rng: &mut dyn RngCore) {
        let eta = self.eta;
        self.policy.for_each(individual.genes_mut(), rng, |gene, rng| {
            polynomial_mutation(gene, eta, rng)
        });
    }
}
