//! Modèle en îles : sous-populations indépendantes, barrières de migration.
//!
//! Le budget d'époques est découpé en périodes. Pendant une période, chaque île
//! active évolue seule (fan-out rayon, aucun état mutable partagé hors des
//! compteurs atomiques des opérateurs). À la barrière, les îles convergées sont
//! retirées puis la migration s'applique aux îles restantes.

use super::engine::{
    collect_counters, require, validate_population, EngineSettings, EvolutionEngine,
    EvolutionOutcome, GenerationLoop, Operators, RunParams, RunSummary,
};
use super::operators::{
    registry, CrossoverOperator, GeneticOperator, MigrationOperator, MutationOperator,
    SelectionOperator,
};
use super::stats::fitness_moments;
use super::traits::{Evaluator, Gene};
use super::types::{Chromosome, Statistics, StatsKey, SubPopulation};
use crate::utils::config::OperatorConfig;
use crate::utils::{AppError, BTreeMap, Instant, Result};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Répartition aléatoire mais de taille déterministe : mélange puis round-robin.
pub fn partition<G: Gene>(
    population: Vec<Chromosome<G>>,
    num_islands: usize,
    rng: &mut dyn RngCore,
) -> Vec<SubPopulation<G>> {
    let mut pool = population;
    pool.shuffle(rng);

    let capacity = pool.len() / num_islands.max(1) + 1;
    let mut islands: Vec<SubPopulation<G>> = (0..num_islands)
        .map(|id| SubPopulation::new(id, Vec::with_capacity(capacity)))
        .collect();
    if islands.is_empty() {
        return islands;
    }
    for (idx, chromosome) in pool.into_iter().enumerate() {
        islands[idx % num_islands].members.push(chromosome);
    }
    islands
}

/// Époques de chaque période ; la dernière absorbe le reste de la division.
pub fn period_shares(epochs: usize, periods: usize) -> Vec<usize> {
    let periods = periods.max(1);
    let base = epochs / periods;
    let mut shares = vec![base; periods];
    if let Some(last) = shares.last_mut() {
        *last += epochs % periods;
    }
    shares
}

pub struct IslandEngine<G: Gene> {
    population: Vec<Chromosome<G>>,
    num_islands: usize,
    evaluator: Box<dyn Evaluator<G>>,
    operators: Operators<G>,
    migration: Option<Box<dyn MigrationOperator<G>>>,
    settings: EngineSettings,
    rng: StdRng,
    stats: Statistics,
    summary: RunSummary,
}

impl<G: Gene> IslandEngine<G> {
    pub fn builder() -> IslandEngineBuilder<G> {
        IslandEngineBuilder::new()
    }

    pub fn num_islands(&self) -> usize {
        self.num_islands
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn operators(&self) -> &Operators<G> {
        &self.operators
    }

    pub fn migration(&self) -> Option<&dyn MigrationOperator<G>> {
        self.migration.as_deref()
    }
}

impl<G: Gene> EvolutionEngine<G> for IslandEngine<G> {
    fn run(&mut self, params: &RunParams) -> Result<()> {
        let started = Instant::now();
        self.stats.clear();
        self.summary = RunSummary::default();

        let looper = GenerationLoop::new(
            &self.operators,
            self.evaluator.as_ref(),
            &self.settings,
            params,
        );

        // La population du moteur n'est remplacée qu'en fin de run
        let mut active = partition(self.population.clone(), self.num_islands, &mut self.rng);
        for island in active.iter_mut() {
            let key = StatsKey::Island(island.id);
            let initial = looper
                .evaluate(&mut island.members, key, 0)
                .map_err(|e| e.in_island(island.id))?;
            self.stats.record(key, initial.mean, initial.std);
            self.summary.evaluations += initial.evaluations;
        }

        let migration = if params.allow_migration {
            self.migration.as_deref()
        } else {
            None
        };
        let periods = if migration.is_some() {
            params.n_periods.max(1)
        } else {
            1
        };
        let shares = period_shares(params.epochs, periods);
        let mut final_population = Vec::with_capacity(self.population.len());

        for (period, &share) in shares.iter().enumerate() {
            // Une graine par île active, tirée du RNG du moteur : runs reproductibles
            let seeds: Vec<u64> = (0..active.len()).map(|_| self.rng.random()).collect();

            let run_island = |(island, seed): (&mut SubPopulation<G>, u64)| {
                let mut rng = StdRng::seed_from_u64(seed);
                looper
                    .evolve(&mut island.members, share, StatsKey::Island(island.id), &mut rng)
                    .map_err(|e| e.in_island(island.id))
            };
            let outcomes: Vec<Result<EvolutionOutcome>> = if self.settings.parallel {
                active
                    .par_iter_mut()
                    .zip(seeds.into_par_iter())
                    .map(&run_island)
                    .collect()
            } else {
                active.iter_mut().zip(seeds).map(&run_island).collect()
            };
            let outcomes = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

            // Barrière : retrait des îles convergées
            let mut survivors = Vec::with_capacity(active.len());
            for (island, outcome) in active.into_iter().zip(outcomes) {
                let key = StatsKey::Island(island.id);
                self.stats.append(key, &outcome.history);
                self.summary.generations += outcome.generations;
                self.summary.evaluations += outcome.evaluations;
                self.summary.corrections += outcome.corrections;

                if outcome.converged {
                    tracing::info!(island = island.id, period = period + 1, "Île retirée");
                    self.summary.converged_at.insert(key.to_string(), period + 1);
                    final_population.extend(island.members);
                } else {
                    survivors.push(island);
                }
            }
            active = survivors;

            if active.is_empty() {
                tracing::debug!(period = period + 1, "Toutes les îles ont convergé");
                break;
            }

            if period + 1 < shares.len() {
                if let Some(op) = migration {
                    if op.migrate(&mut active, &mut self.rng) {
                        tracing::debug!(
                            period = period + 1,
                            islands = active.len(),
                            policy = op.name(),
                            "Migration effectuée"
                        );
                    }
                }
            }
        }

        final_population.extend(active.into_iter().flat_map(|island| island.members));

        let (mean, std) = fitness_moments(&final_population);
        if !mean.is_finite() || !std.is_finite() {
            tracing::error!(mean, std, "Statistiques globales non finies");
            return Err(AppError::NonFiniteFitness {
                generation: self.summary.generations,
                mean,
                std,
            });
        }
        self.stats.record(StatsKey::Global, mean, std);
        self.population = final_population;

        self.summary.final_mean = mean;
        self.summary.final_std = std;
        self.summary.duration_ms = started.elapsed().as_millis();

        tracing::info!(
            islands = self.num_islands,
            converged = self.summary.converged_at.len(),
            generations = self.summary.generations,
            mean,
            "Run en îles terminé"
        );
        Ok(())
    }

    fn population(&self) -> &[Chromosome<G>] {
        &self.population
    }

    fn stats(&self) -> &Statistics {
        &self.stats
    }

    fn summary(&self) -> &RunSummary {
        &self.summary
    }

    fn operator_counters(&self) -> BTreeMap<String, u64> {
        let mut counters = self.operators.counters();
        if let Some(op) = self.migration.as_deref() {
            collect_counters(&mut counters, "migration", op);
        }
        counters
    }
}

// =========================================================================
// BUILDER
// =========================================================================

pub struct IslandEngineBuilder<G: Gene> {
    population: Option<Vec<Chromosome<G>>>,
    num_islands: usize,
    evaluator: Option<Box<dyn Evaluator<G>>>,
    selection: Option<Box<dyn SelectionOperator<G>>>,
    crossover: Option<Box<dyn CrossoverOperator<G>>>,
    mutation: Option<Box<dyn MutationOperator<G>>>,
    migration: Option<Box<dyn MigrationOperator<G>>>,
    settings: EngineSettings,
}

impl<G: Gene> Default for IslandEngineBuilder<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Gene> IslandEngineBuilder<G> {
    pub fn new() -> Self {
        Self {
            population: None,
            num_islands: 1,
            evaluator: None,
            selection: None,
            crossover: None,
            mutation: None,
            migration: None,
            settings: EngineSettings::default(),
        }
    }

    pub fn population(mut self, population: Vec<Chromosome<G>>) -> Self {
        self.population = Some(population);
        self
    }

    pub fn num_islands(mut self, num_islands: usize) -> Self {
        self.num_islands = num_islands;
        self
    }

    pub fn evaluator<E: Evaluator<G> + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    pub fn selection(mut self, selection: Box<dyn SelectionOperator<G>>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn crossover(mut self, crossover: Box<dyn CrossoverOperator<G>>) -> Self {
        self.crossover = Some(crossover);
        self
    }

    pub fn mutation(mut self, mutation: Box<dyn MutationOperator<G>>) -> Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn operators(mut self, operators: Operators<G>) -> Self {
        self.selection = Some(operators.selection);
        self.crossover = Some(operators.crossover);
        self.mutation = Some(operators.mutation);
        self
    }

    /// Sans opérateur de migration, le run se fait en une seule période.
    pub fn migration(mut self, migration: Option<Box<dyn MigrationOperator<G>>>) -> Self {
        self.migration = migration;
        self
    }

    pub fn migration_from_config(mut self, config: &OperatorConfig) -> Result<Self> {
        self.migration = registry::migration_from_config(config)?;
        Ok(self)
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<IslandEngine<G>> {
        let population = require(self.population, "Population initiale")?;
        let genome_length = validate_population(&population)?;

        if self.num_islands == 0 {
            return Err(AppError::config("Il faut au moins une île"));
        }
        if self.num_islands >= population.len() {
            return Err(AppError::config(format!(
                "Nombre d'îles ({}) supérieur ou égal à la population ({})",
                self.num_islands,
                population.len()
            )));
        }

        let evaluator = require(self.evaluator, "Fonction de fitness")?;
        let operators = Operators::new(
            require(self.selection, "Opérateur de sélection")?,
            require(self.crossover, "Opérateur de croisement")?,
            require(self.mutation, "Opérateur de mutation")?,
        );
        // La plus petite île reçoit floor(N / k) individus
        operators
            .selection
            .validate(population.len() / self.num_islands)?;

        tracing::info!(
            population = population.len(),
            genome_length,
            islands = self.num_islands,
            migration = self.migration.as_deref().map(|m| m.name()).unwrap_or("none"),
            "Moteur en îles construit"
        );

        Ok(IslandEngine {
            population,
            num_islands: self.num_islands,
            evaluator,
            operators,
            migration: self.migration,
            rng: self.settings.make_rng(),
            settings: self.settings,
            stats: Statistics::default(),
            summary: RunSummary::default(),
        })
    }
}
