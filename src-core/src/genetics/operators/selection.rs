use super::{Composite, GeneticOperator, OperatorCore, SelectionOperator};
use crate::genetics::traits::Gene;
use crate::genetics::types::Chromosome;
use crate::utils::{AppError, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

pub type MetaSelection<G> = Composite<dyn SelectionOperator<G>>;

/// Tire un indice proportionnellement aux poids (tous >= 0, somme > 0).
fn sample_weighted(cumulative: &[f64], rng: &mut dyn RngCore) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let target = rng.random::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= target)
        .min(cumulative.len().saturating_sub(1))
}

fn cumulative(weights: impl Iterator<Item = f64>) -> Vec<f64> {
    weights
        .scan(0.0, |acc, w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

// =========================================================================
// TOURNOI
// =========================================================================

/// Tournoi sans remise : `k` candidats distincts, le plus adapté gagne.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentSelection {
    pub tournament_size: usize,
    core: OperatorCore,
}

impl TournamentSelection {
    pub fn new(size: usize) -> Self {
        Self {
            tournament_size: size,
            core: OperatorCore::new(1.0),
        }
    }
}

impl GeneticOperator for TournamentSelection {
    fn name(&self) -> &str {
        "tournament"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: Gene> SelectionOperator<G> for TournamentSelection {
    fn validate(&self, population_size: usize) -> Result<()> {
        if self.tournament_size == 0 {
            return Err(AppError::config("La taille du tournoi doit être >= 1"));
        }
        if self.tournament_size > population_size {
            return Err(AppError::config(format!(
                "Taille de tournoi ({}) supérieure à la population ({})",
                self.tournament_size, population_size
            )));
        }
        Ok(())
    }

    fn pick(
        &self,
        population: &[Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>> {
        let pop_len = population.len();
        let mut selected = Vec::with_capacity(pop_len);

        for _ in 0..pop_len {
            let contenders = rand::seq::index::sample(rng, pop_len, self.tournament_size);
            let winner = contenders
                .iter()
                .map(|idx| &population[idx])
                .max_by(|a, b| a.cmp_fitness(b))
                .ok_or_else(|| AppError::config("Tournoi sans participant"))?;
            selected.push(winner.clone());
        }
        Ok(selected)
    }
}

// =========================================================================
// ROULETTE
// =========================================================================

/// Sélection proportionnelle à la fitness.
///
/// Les fitness sont décalées pour être positives ; si tous les poids sont nuls
/// (population uniforme), le tirage devient uniforme.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouletteSelection {
    core: OperatorCore,
}

impl RouletteSelection {
    pub fn new() -> Self {
        Self {
            core: OperatorCore::new(1.0),
        }
    }
}

impl Default for RouletteSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneticOperator for RouletteSelection {
    fn name(&self) -> &str {
        "roulette"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: Gene> SelectionOperator<G> for RouletteSelection {
    fn pick(
        &self,
        population: &[Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>> {
        let min = population
            .iter()
            .map(Chromosome::fitness)
            .filter(|f| f.is_finite())
            .fold(f64::INFINITY, f64::min);
        let shift = if min.is_finite() && min < 0.0 { -min } else { 0.0 };

        let weights = population.iter().map(|c| {
            let f = c.fitness();
            if f.is_finite() {
                f + shift
            } else {
                0.0
            }
        });
        let cumulative = cumulative(weights);
        let total = cumulative.last().copied().unwrap_or(0.0);

        let selected = (0..population.len())
            .map(|_| {
                let idx = if total > 0.0 && total.is_finite() {
                    sample_weighted(&cumulative, rng)
                } else {
                    rng.random_range(0..population.len())
                };
                population[idx].clone()
            })
            .collect();
        Ok(selected)
    }
}

// =========================================================================
// RANG
// =========================================================================

/// Classement linéaire : le pire a le poids 1, le meilleur le poids N.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankSelection {
    core: OperatorCore,
}

impl RankSelection {
    pub fn new() -> Self {
        Self {
            core: OperatorCore::new(1.0),
        }
    }
}

impl Default for RankSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneticOperator for RankSelection {
    fn name(&self) -> &str {
        "rank"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: Gene> SelectionOperator<G> for RankSelection {
    fn pick(
        &self,
        population: &[Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>> {
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| population[a].cmp_fitness(&population[b]));

        let cumulative = cumulative((1..=order.len()).map(|rank| rank as f64));
        let selected = (0..population.len())
            .map(|_| population[order[sample_weighted(&cumulative, rng)]].clone())
            .collect();
        Ok(selected)
    }
}
