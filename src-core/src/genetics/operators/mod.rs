//! Contrat commun des opérateurs génétiques.
//!
//! Chaque opérateur est conditionné par une probabilité (un tirage uniforme par
//! application) et compte ses applications réussies. Le compteur est atomique :
//! les îles évoluant en parallèle partagent les opérateurs par référence.
//!
//! Sérialisation : seule la valeur du compteur traverse la frontière, la primitive
//! atomique est reconstruite à l'arrivée. Une copie désérialisée (ou clonée)
//! compte donc de son côté ; l'appelant fusionne via [`ApplicationCounter::merge`].

pub mod crossover;
pub mod migration;
pub mod mutation;
pub mod registry;
pub mod selection;

pub use crossover::{MetaCrossover, OrderCrossover, SinglePointCrossover, UniformCrossover};
pub use migration::{ClockwiseMigration, MetaMigration, RandomMigration};
pub use mutation::{
    GaussianMutation, LocusPolicy, MetaMutation, PolynomialMutation, RandomResetMutation,
    SwapMutation,
};
pub use selection::{MetaSelection, RankSelection, RouletteSelection, TournamentSelection};

use super::traits::Gene;
use super::types::{Chromosome, SubPopulation};
use crate::utils::{AppError, Result};
use rand::{Rng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

// =========================================================================
// COMPTEUR D'APPLICATIONS
// =========================================================================

#[derive(Default)]
pub struct ApplicationCounter(AtomicU64);

impl ApplicationCounter {
    pub fn new(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    pub fn get(&self) -> u64 {
        self.0.load(AtomicOrdering::Relaxed)
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Ajoute les applications comptées ailleurs (copie distante, worker).
    pub fn merge(&self, count: u64) {
        self.0.fetch_add(count, AtomicOrdering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(0, AtomicOrdering::Relaxed);
    }
}

// Un clone est un instantané : il ne partage pas l'atomique de l'original.
impl Clone for ApplicationCounter {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl fmt::Debug for ApplicationCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApplicationCounter({})", self.get())
    }
}

impl Serialize for ApplicationCounter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.get())
    }
}

impl<'de> Deserialize<'de> for ApplicationCounter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::new(u64::deserialize(deserializer)?))
    }
}

// =========================================================================
// ÉTAT COMMUN : PROBABILITÉ + COMPTEUR
// =========================================================================

/// Probabilité bornée dans [0, 1] et compteur d'applications.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperatorCore {
    #[serde(deserialize_with = "deserialize_probability")]
    probability: f64,
    #[serde(default)]
    applications: ApplicationCounter,
}

impl OperatorCore {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: clamp_probability(probability),
            applications: ApplicationCounter::default(),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn set_probability(&mut self, probability: f64) {
        self.probability = clamp_probability(probability);
    }

    /// Un tirage uniforme dans [0, 1) : l'opérateur s'applique si la probabilité le dépasse.
    pub fn gate(&self, rng: &mut dyn RngCore) -> bool {
        let draw: f64 = rng.random();
        draw < self.probability
    }

    pub fn record(&self) {
        self.applications.increment();
    }

    pub fn count(&self) -> u64 {
        self.applications.get()
    }

    pub fn counter(&self) -> &ApplicationCounter {
        &self.applications
    }
}

/// NaN est ramené à 0 (opérateur désactivé).
pub fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        tracing::warn!("Probabilité NaN ramenée à 0.0");
        return 0.0;
    }
    probability.clamp(0.0, 1.0)
}

fn deserialize_probability<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<f64, D::Error> {
    Ok(clamp_probability(f64::deserialize(deserializer)?))
}

// =========================================================================
// TRAITS DE RÔLE
// =========================================================================

/// Partie commune à tous les rôles.
pub trait GeneticOperator: Send + Sync {
    fn name(&self) -> &str;

    fn core(&self) -> &OperatorCore;

    fn core_mut(&mut self) -> &mut OperatorCore;

    fn probability(&self) -> f64 {
        self.core().probability()
    }

    fn set_probability(&mut self, probability: f64) {
        self.core_mut().set_probability(probability);
    }

    fn applications(&self) -> u64 {
        self.core().count()
    }

    /// Compteurs élémentaires. Un méta-opérateur renvoie ceux de ses stratégies,
    /// dont la somme égale son propre compteur.
    fn all_counters(&self) -> Vec<(String, u64)> {
        vec![(self.name().to_string(), self.applications())]
    }
}

/// Sélection : toujours exécutée, produit une population candidate de même taille.
pub trait SelectionOperator<G: Gene>: GeneticOperator {
    /// Vérifie la compatibilité avec une taille de population (erreur de configuration sinon).
    fn validate(&self, _population_size: usize) -> Result<()> {
        Ok(())
    }

    /// Transformation brute : `population.len()` copies indépendantes.
    fn pick(
        &self,
        population: &[Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>>;

    fn select(
        &self,
        population: &[Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>> {
        if population.is_empty() {
            return Err(AppError::config("Sélection sur une population vide"));
        }
        self.validate(population.len())?;
        let selected = self.pick(population, rng)?;
        self.core().record();
        Ok(selected)
    }
}

/// Croisement : ne modifie jamais les parents.
pub trait CrossoverOperator<G: Gene>: GeneticOperator {
    fn recombine(
        &self,
        parent1: &Chromosome<G>,
        parent2: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> (Chromosome<G>, Chromosome<G>);

    /// Sans application : copies des parents (fitness et validité conservées).
    fn crossover(
        &self,
        parent1: &Chromosome<G>,
        parent2: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> (Chromosome<G>, Chromosome<G>) {
        if !self.core().gate(rng) {
            return (parent1.clone(), parent2.clone());
        }
        self.core().record();
        let (mut child1, mut child2) = self.recombine(parent1, parent2, rng);
        child1.invalidate_fitness();
        child2.invalidate_fitness();
        (child1, child2)
    }
}

/// Mutation en place. Post-condition : une mutation appliquée invalide la fitness.
pub trait MutationOperator<G: Gene>: GeneticOperator {
    fn perturb(&self, individual: &mut Chromosome<G>, rng: &mut dyn RngCore);

    fn mutate(&self, individual: &mut Chromosome<G>, rng: &mut dyn RngCore) -> bool {
        if !self.core().gate(rng) {
            return false;
        }
        self.core().record();
        self.perturb(individual, rng);
        individual.invalidate_fitness();
        true
    }
}

/// Migration en place entre îles actives. Sans effet sur moins de deux îles.
pub trait MigrationOperator<G: Gene>: GeneticOperator {
    fn exchange(&self, islands: &mut [SubPopulation<G>], rng: &mut dyn RngCore);

    fn migrate(&self, islands: &mut [SubPopulation<G>], rng: &mut dyn RngCore) -> bool {
        if islands.len() < 2 {
            return false;
        }
        if !self.core().gate(rng) {
            return false;
        }
        self.core().record();
        self.exchange(islands, rng);
        true
    }
}

// =========================================================================
// MÉTA-OPÉRATEURS
// =========================================================================

/// Délègue chaque application à une stratégie tirée uniformément.
pub struct Composite<Op: ?Sized> {
    name: String,
    core: OperatorCore,
    strategies: Vec<Box<Op>>,
}

impl<Op: GeneticOperator + ?Sized> Composite<Op> {
    pub fn new(name: &str, strategies: Vec<Box<Op>>, probability: f64) -> Result<Self> {
        if strategies.is_empty() {
            return Err(AppError::config(format!(
                "Le méta-opérateur '{}' n'a aucune stratégie",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            core: OperatorCore::new(probability),
            strategies,
        })
    }

    /// Tire une stratégie et lui impute l'application.
    fn delegate(&self, rng: &mut dyn RngCore) -> &Op {
        let idx = rng.random_range(0..self.strategies.len());
        let chosen = &self.strategies[idx];
        chosen.core().record();
        chosen
    }
}

impl<Op: GeneticOperator + ?Sized> GeneticOperator for Composite<Op> {
    fn name(&self) -> &str {
        &self.name
    }

    fn core(&self) -> &OperatorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }

    fn all_counters(&self) -> Vec<(String, u64)> {
        self.strategies
            .iter()
            .flat_map(|s| s.all_counters())
            .collect()
    }
}

impl<G: Gene> SelectionOperator<G> for Composite<dyn SelectionOperator<G>> {
    fn validate(&self, population_size: usize) -> Result<()> {
        self.strategies
            .iter()
            .try_for_each(|s| s.validate(population_size))
    }

    fn pick(
        &self,
        population: &[Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>> {
        self.delegate(rng).pick(population, rng)
    }
}

impl<G: Gene> CrossoverOperator<G> for Composite<dyn CrossoverOperator<G>> {
    fn recombine(
        &self,
        parent1: &Chromosome<G>,
        parent2: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> (Chromosome<G>, Chromosome<G>) {
        self.delegate(rng).recombine(parent1, parent2, rng)
    }
}

impl<G: Gene> MutationOperator<G> for Composite<dyn MutationOperator<G>> {
    fn perturb(&self, individual: &mut Chromosome<G>, rng: &mut dyn RngCore) {
        self.delegate(rng).perturb(individual, rng);
    }
}

impl<G: Gene> MigrationOperator<G> for Composite<dyn MigrationOperator<G>> {
    fn exchange(&self, islands: &mut [SubPopulation<G>], rng: &mut dyn RngCore) {
        self.delegate(rng).exchange(islands, rng);
    }
}

/// Somme des compteurs élémentaires.
pub fn total_applications(op: &dyn GeneticOperator) -> u64 {
    op.all_counters().iter().map(|(_, n)| n).sum()
}
