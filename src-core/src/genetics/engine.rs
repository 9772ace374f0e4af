//! Moteur mono-population et boucle générationnelle partagée avec le modèle en îles.
//!
//! Une génération : sélection → croisement/mutation → [correction] → [élitisme]
//! → évaluation → test de convergence. Les candidats sont construits à part et
//! ne remplacent la population qu'une fois évalués : une erreur fatale laisse
//! la population dans son dernier état évalué.

use super::operators::{
    registry, CrossoverOperator, GeneticOperator, MutationOperator, SelectionOperator,
};
use super::stats::{fitness_moments, genetic_diversity};
use super::traits::{Evaluator, Gene, NumericGene};
use super::types::{best_of, Chromosome, FitnessHistory, Statistics, StatsKey};
use crate::utils::config::{EngineConfig, OperatorConfig, RunConfig};
use crate::utils::{AppError, BTreeMap, Instant, Result};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// =========================================================================
// PARAMÈTRES
// =========================================================================

/// Paramètres d'un appel à `run()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub epochs: usize,
    pub correction: bool,
    pub elitism: bool,
    pub f_tol: f64,
    pub allow_migration: bool,
    pub n_periods: usize,
    pub verbose: bool,
}

impl From<&RunConfig> for RunParams {
    fn from(config: &RunConfig) -> Self {
        Self {
            epochs: config.epochs,
            correction: config.correction,
            elitism: config.elitism,
            f_tol: config.f_tol,
            allow_migration: config.allow_migration,
            n_periods: config.n_periods,
            verbose: config.verbose,
        }
    }
}

impl Default for RunParams {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

/// Réglages fixés à la construction du moteur.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub seed: Option<u64>,
    /// Seuil de diversité (Hamming normalisée) sous lequel une population peut converger.
    pub diversity_threshold: f64,
    /// Évalue les candidats périmés dès l'étape de correction (sinon : à l'étape d'évaluation).
    ///
    /// L'évaluation est paresseuse : ce réglage déplace le moment de l'évaluation
    /// sans ajouter d'appel à la fitness. Seule exception, avec l'élitisme, le
    /// candidat écrasé par l'élite a pu être évalué pour rien.
    pub reevaluate_after_correction: bool,
    pub parallel: bool,
}

impl From<&EngineConfig> for EngineSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            seed: config.seed,
            diversity_threshold: config.diversity_threshold,
            reevaluate_after_correction: config.reevaluate_after_correction,
            parallel: config.parallel,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl EngineSettings {
    pub(crate) fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

// =========================================================================
// OPÉRATEURS DU MOTEUR
// =========================================================================

/// Les trois opérateurs obligatoires d'une génération.
pub struct Operators<G: Gene> {
    pub selection: Box<dyn SelectionOperator<G>>,
    pub crossover: Box<dyn CrossoverOperator<G>>,
    pub mutation: Box<dyn MutationOperator<G>>,
}

impl<G: Gene> Operators<G> {
    pub fn new(
        selection: Box<dyn SelectionOperator<G>>,
        crossover: Box<dyn CrossoverOperator<G>>,
        mutation: Box<dyn MutationOperator<G>>,
    ) -> Self {
        Self {
            selection,
            crossover,
            mutation,
        }
    }

    pub fn from_config(config: &OperatorConfig) -> Result<Self> {
        Ok(Self::new(
            registry::selection_from_config(config)?,
            registry::crossover_from_config(config)?,
            registry::mutation_from_config(config)?,
        ))
    }

    /// Compteurs élémentaires, préfixés par le rôle (`selection:tournament`...).
    pub fn counters(&self) -> BTreeMap<String, u64> {
        let mut counters = BTreeMap::new();
        collect_counters(&mut counters, "selection", self.selection.as_ref());
        collect_counters(&mut counters, "crossover", self.crossover.as_ref());
        collect_counters(&mut counters, "mutation", self.mutation.as_ref());
        counters
    }
}

impl<G: NumericGene> Operators<G> {
    /// Variante acceptant les mutations numériques (gaussienne, polynomiale).
    pub fn from_numeric_config(config: &OperatorConfig) -> Result<Self> {
        Ok(Self::new(
            registry::selection_from_config(config)?,
            registry::crossover_from_config(config)?,
            registry::numeric_mutation_from_config(config)?,
        ))
    }
}

pub(crate) fn collect_counters<Op: GeneticOperator + ?Sized>(
    counters: &mut BTreeMap<String, u64>,
    role: &str,
    op: &Op,
) {
    for (name, count) in op.all_counters() {
        *counters.entry(format!("{}:{}", role, name)).or_insert(0) += count;
    }
}

// =========================================================================
// BILAN D'UN RUN
// =========================================================================

/// Résultat d'une séquence de générations sur une population.
#[derive(Clone, Debug, Default)]
pub struct EvolutionOutcome {
    pub history: FitnessHistory,
    pub generations: usize,
    pub evaluations: usize,
    pub corrections: usize,
    pub converged: bool,
}

/// Comptabilité du dernier `run()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generations: usize,
    pub evaluations: usize,
    pub corrections: usize,
    /// Clé de statistiques → génération (mono-population) ou période (îles) de convergence.
    pub converged_at: BTreeMap<String, usize>,
    pub final_mean: f64,
    pub final_std: f64,
    pub duration_ms: u128,
}

/// Moyenne/écart-type d'une population évaluée.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Moments {
    pub mean: f64,
    pub std: f64,
    pub evaluations: usize,
}

// =========================================================================
// CORRECTION
// =========================================================================

/// Remplace chaque gène invalide (ou vide) via sa règle de tirage.
///
/// La fitness des individus corrigés est invalidée. Renvoie le nombre de gènes corrigés.
pub fn apply_corrections<G: Gene>(
    population: &mut [Chromosome<G>],
    rng: &mut dyn RngCore,
) -> usize {
    let mut total = 0;
    for chromosome in population.iter_mut() {
        let mut fixed = 0;
        for gene in chromosome.genes_mut() {
            if !gene.is_valid() {
                gene.reset(&mut *rng);
                fixed += 1;
            }
        }
        if fixed > 0 {
            chromosome.invalidate_fitness();
        }
        total += fixed;
    }
    total
}

// =========================================================================
// BOUCLE GÉNÉRATIONNELLE
// =========================================================================

/// État en lecture seule d'une boucle : partagé par référence entre les îles.
pub(crate) struct GenerationLoop<'a, G: Gene> {
    operators: &'a Operators<G>,
    evaluator: &'a dyn Evaluator<G>,
    settings: &'a EngineSettings,
    params: &'a RunParams,
}

impl<'a, G: Gene> GenerationLoop<'a, G> {
    pub fn new(
        operators: &'a Operators<G>,
        evaluator: &'a dyn Evaluator<G>,
        settings: &'a EngineSettings,
        params: &'a RunParams,
    ) -> Self {
        Self {
            operators,
            evaluator,
            settings,
            params,
        }
    }

    /// Évalue les individus périmés puis calcule les moments.
    ///
    /// Des moments non finis sont fatals : fonction de fitness défaillante.
    pub fn evaluate(
        &self,
        population: &mut [Chromosome<G>],
        key: StatsKey,
        generation: usize,
    ) -> Result<Moments> {
        let evaluator = self.evaluator;
        let evaluations: usize = if self.settings.parallel {
            population
                .par_iter_mut()
                .map(|c| c.evaluate_with(evaluator) as usize)
                .sum()
        } else {
            population
                .iter_mut()
                .map(|c| c.evaluate_with(evaluator) as usize)
                .sum()
        };

        let (mean, std) = fitness_moments(population);
        if !mean.is_finite() || !std.is_finite() {
            tracing::error!(
                %key,
                generation,
                mean,
                std,
                "Statistiques de fitness non finies"
            );
            return Err(AppError::NonFiniteFitness {
                generation,
                mean,
                std,
            });
        }

        Ok(Moments {
            mean,
            std,
            evaluations,
        })
    }

    /// Fait évoluer `population` pendant au plus `epochs` générations.
    ///
    /// La population est supposée évaluée ; seuls les individus périmés le seront.
    pub fn evolve(
        &self,
        population: &mut Vec<Chromosome<G>>,
        epochs: usize,
        key: StatsKey,
        rng: &mut dyn RngCore,
    ) -> Result<EvolutionOutcome> {
        let mut outcome = EvolutionOutcome::default();
        let start = self.evaluate(population, key, 0)?;
        outcome.evaluations += start.evaluations;
        let mut previous_mean = start.mean;

        for generation in 1..=epochs {
            // 1. Sélection : pool indépendant de la génération précédente
            let mut candidates = self
                .operators
                .selection
                .select(population.as_slice(), &mut *rng)?;

            // 2. Croisement par paires puis mutation
            self.recombine(&mut candidates, &mut *rng);

            // 3. Correction
            if self.params.correction {
                let fixed = apply_corrections(&mut candidates, &mut *rng);
                if fixed > 0 {
                    tracing::debug!(%key, generation, fixed, "Gènes corrigés");
                    if self.settings.reevaluate_after_correction {
                        let moments = self.evaluate(&mut candidates, key, generation)?;
                        outcome.evaluations += moments.evaluations;
                    }
                }
                outcome.corrections += fixed;
            }

            // 4. Élitisme : le meilleur de la génération précédente écrase un locus
            if self.params.elitism && !candidates.is_empty() {
                if let Some(elite) = best_of(population.as_slice()) {
                    let slot = rng.random_range(0..candidates.len());
                    candidates[slot] = elite.clone();
                }
            }

            // 5. Évaluation
            let moments = self.evaluate(&mut candidates, key, generation)?;
            outcome.evaluations += moments.evaluations;
            let diversity = genetic_diversity(&candidates);

            // 6. Remplacement
            *population = candidates;
            outcome.history.push(moments.mean, moments.std);
            outcome.generations = generation;
            self.report(key, generation, moments, diversity);

            // 7. Convergence : plateau de fitness ET homogénéité génétique
            let plateau = (moments.mean - previous_mean).abs() < self.params.f_tol;
            previous_mean = moments.mean;
            if plateau && diversity < self.settings.diversity_threshold {
                tracing::info!(%key, generation, diversity, "Population convergée");
                outcome.converged = true;
                break;
            }
        }

        Ok(outcome)
    }

    /// Paires disjointes (2j, 2j+1) ; un survivant impair n'est pas croisé mais reste muté.
    fn recombine(&self, candidates: &mut Vec<Chromosome<G>>, rng: &mut dyn RngCore) {
        let mut offspring = Vec::with_capacity(candidates.len());
        let mut pairs = candidates.chunks_exact(2);
        for pair in &mut pairs {
            let (child1, child2) = self
                .operators
                .crossover
                .crossover(&pair[0], &pair[1], &mut *rng);
            offspring.push(child1);
            offspring.push(child2);
        }
        offspring.extend(pairs.remainder().iter().cloned());

        for child in offspring.iter_mut() {
            self.operators.mutation.mutate(child, &mut *rng);
        }
        *candidates = offspring;
    }

    fn report(&self, key: StatsKey, generation: usize, moments: Moments, diversity: f64) {
        if self.params.verbose {
            tracing::info!(
                %key,
                generation,
                mean = moments.mean,
                std = moments.std,
                diversity,
                "Génération terminée"
            );
        } else {
            tracing::debug!(
                %key,
                generation,
                mean = moments.mean,
                std = moments.std,
                diversity,
                "Génération terminée"
            );
        }
    }
}

// =========================================================================
// INTERFACE COMMUNE DES MOTEURS
// =========================================================================

pub trait EvolutionEngine<G: Gene> {
    fn run(&mut self, params: &RunParams) -> Result<()>;

    fn population(&self) -> &[Chromosome<G>];

    fn best_chromosome(&self) -> Option<&Chromosome<G>> {
        best_of(self.population())
    }

    /// Historique `avg`/`std` par île ou global, vidé à chaque `run()`.
    fn stats(&self) -> &Statistics;

    fn summary(&self) -> &RunSummary;

    fn operator_counters(&self) -> BTreeMap<String, u64>;
}

// =========================================================================
// MOTEUR MONO-POPULATION
// =========================================================================

pub struct GeneticEngine<G: Gene> {
    population: Vec<Chromosome<G>>,
    evaluator: Box<dyn Evaluator<G>>,
    operators: Operators<G>,
    settings: EngineSettings,
    rng: StdRng,
    stats: Statistics,
    summary: RunSummary,
}

impl<G: Gene> GeneticEngine<G> {
    pub fn builder() -> GeneticEngineBuilder<G> {
        GeneticEngineBuilder::new()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn operators(&self) -> &Operators<G> {
        &self.operators
    }
}

impl<G: Gene> EvolutionEngine<G> for GeneticEngine<G> {
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

        let initial = looper.evaluate(&mut self.population, StatsKey::Global, 0)?;
        self.stats.record(StatsKey::Global, initial.mean, initial.std);

        let outcome = looper.evolve(
            &mut self.population,
            params.epochs,
            StatsKey::Global,
            &mut self.rng,
        )?;
        self.stats.append(StatsKey::Global, &outcome.history);

        let (final_mean, final_std) = fitness_moments(&self.population);
        let summary = &mut self.summary;
        summary.generations = outcome.generations;
        summary.evaluations = initial.evaluations + outcome.evaluations;
        summary.corrections = outcome.corrections;
        if outcome.converged {
            summary
                .converged_at
                .insert(StatsKey::Global.to_string(), outcome.generations);
        }
        summary.final_mean = final_mean;
        summary.final_std = final_std;
        summary.duration_ms = started.elapsed().as_millis();

        tracing::info!(
            generations = summary.generations,
            evaluations = summary.evaluations,
            converged = outcome.converged,
            mean = final_mean,
            "Run mono-population terminé"
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
        self.operators.counters()
    }
}

// =========================================================================
// BUILDER
// =========================================================================

pub(crate) fn require<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| AppError::config(format!("{} manquant(e)", what)))
}

/// Population non vide, génomes de longueur homogène. Renvoie la longueur.
pub(crate) fn validate_population<G: Gene>(population: &[Chromosome<G>]) -> Result<usize> {
    let first = population
        .first()
        .ok_or_else(|| AppError::config("La population initiale est vide"))?;
    let length = first.len();
    if let Some(bad) = population.iter().position(|c| c.len() != length) {
        return Err(AppError::config(format!(
            "Longueur de génome incohérente : individu {} ({} gènes, attendu {})",
            bad,
            population[bad].len(),
            length
        )));
    }
    Ok(length)
}

pub struct GeneticEngineBuilder<G: Gene> {
    population: Option<Vec<Chromosome<G>>>,
    evaluator: Option<Box<dyn Evaluator<G>>>,
    selection: Option<Box<dyn SelectionOperator<G>>>,
    crossover: Option<Box<dyn CrossoverOperator<G>>>,
    mutation: Option<Box<dyn MutationOperator<G>>>,
    settings: EngineSettings,
}

impl<G: Gene> Default for GeneticEngineBuilder<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Gene> GeneticEngineBuilder<G> {
    pub fn new() -> Self {
        Self {
            population: None,
            evaluator: None,
            selection: None,
            crossover: None,
            mutation: None,
            settings: EngineSettings::default(),
        }
    }

    pub fn population(mut self, population: Vec<Chromosome<G>>) -> Self {
        self.population = Some(population);
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

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<GeneticEngine<G>> {
        let population = require(self.population, "Population initiale")?;
        let genome_length = validate_population(&population)?;
        let evaluator = require(self.evaluator, "Fonction de fitness")?;
        let operators = Operators::new(
            require(self.selection, "Opérateur de sélection")?,
            require(self.crossover, "Opérateur de croisement")?,
            require(self.mutation, "Opérateur de mutation")?,
        );
        operators.selection.validate(population.len())?;

        tracing::info!(
            population = population.len(),
            genome_length,
            selection = operators.selection.name(),
            crossover = operators.crossover.name(),
            mutation = operators.mutation.name(),
            "Moteur mono-population construit"
        );

        Ok(GeneticEngine {
            population,
            evaluator,
            operators,
            rng: self.settings.make_rng(),
            settings: self.settings,
            stats: Statistics::default(),
            summary: RunSummary::default(),
        })
    }
}
