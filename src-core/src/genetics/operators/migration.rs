use super::{Composite, GeneticOperator, MigrationOperator, OperatorCore};
use crate::genetics::traits::Gene;
use crate::genetics::types::{Chromosome, SubPopulation};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

pub type MetaMigration<G> = Composite<dyn MigrationOperator<G>>;

/// Meilleur de chaque île, dans l'ordre des îles (`None` si aucun membre évalué).
fn island_champions<G: Gene>(islands: &[SubPopulation<G>]) -> Vec<Option<Chromosome<G>>> {
    islands.iter().map(|island| island.best().cloned()).collect()
}

/// Écrase un membre tiré uniformément par le migrant.
fn settle<G: Gene>(island: &mut SubPopulation<G>, migrant: Chromosome<G>, rng: &mut dyn RngCore) {
    if island.members.is_empty() {
        return;
    }
    let slot = rng.random_range(0..island.members.len());
    island.members[slot] = migrant;
}

/// Topologie en anneau : l'île `i` reçoit une copie du meilleur de l'île `i - 1`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClockwiseMigration {
    core: OperatorCore,
}

impl ClockwiseMigration {
    pub fn new(probability: f64) -> Self {
        Self {
            core: OperatorCore::new(probability),
        }
    }
}

impl GeneticOperator for ClockwiseMigration {
    fn name(&self) -> &str {
        "clockwise"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: Gene> MigrationOperator<G> for ClockwiseMigration {
    fn exchange(&self, islands: &mut [SubPopulation<G>], rng: &mut dyn RngCore) {
        let n = islands.len();
        // Les champions sont figés avant tout remplacement
        let champions = island_champions(islands);

        for (idx, island) in islands.iter_mut().enumerate() {
            if let Some(migrant) = &champions[(idx + n - 1) % n] {
                settle(island, migrant.clone(), rng);
            }
        }
    }
}

/// Les champions sont mélangés puis distribués, un par île.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomMigration {
    core: OperatorCore,
}

impl RandomMigration {
    pub fn new(probability: f64) -> Self {
        Self {
            core: OperatorCore::new(probability),
        }
    }
}

impl GeneticOperator for RandomMigration {
    fn name(&self) -> &str {
        "random"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl<G: Gene> MigrationOperator<G> for RandomMigration {
    fn exchange(&self, islands: &mut [SubPopulation<G>], rng: &mut dyn RngCore) {
        let mut champions = island_champions(islands);
        champions.shuffle(rng);

        for (island, migrant) in islands.iter_mut().zip(champions) {
            if let Some(migrant) = migrant {
                settle(island, migrant, rng);
            }
        }
    }
}
