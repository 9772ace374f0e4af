//! Point d'entrée applicatif : une requête → un moteur → un rapport.

use super::dto::{OptimizationReport, OptimizationRequest};
use super::engine::{EngineSettings, EvolutionEngine, GeneticEngine, Operators, RunParams};
use super::evaluators::{OneMax, PermutationOrder, Problem, Rastrigin, Sphere};
use super::genomes::{random_permutation, random_population, IntegerGene};
use super::island::IslandEngine;
use super::traits::{Evaluator, Gene};
use super::types::Chromosome;
use crate::utils::config::OperatorConfig;
use crate::utils::core::DateTime;
use crate::utils::prelude::*;

/// Exécute la requête avec le moteur adapté (îles si `num_islands > 1`).
pub fn run_optimization(request: &OptimizationRequest) -> Result<OptimizationReport> {
    let started_at = Utc::now();
    let settings = EngineSettings::from(&request.engine);
    let size = request.engine.population_size;
    let length = request.engine.genome_length;
    // Population initiale tirée de la même graine que le moteur
    let mut rng = settings.make_rng();

    info!(
        problem = %request.problem,
        population = size,
        genome_length = length,
        islands = request.engine.num_islands,
        "Lancement de l'optimisation"
    );

    match request.problem {
        Problem::OneMax => {
            let population = random_population(&OneMax::prototype(length), size, &mut rng);
            let operators = Operators::from_config(&request.operators)?;
            solve(request, population, OneMax, operators, settings, started_at)
        }
        Problem::Sphere => {
            let sphere = Sphere::default();
            let population = random_population(&sphere.prototype(length), size, &mut rng);
            let operators = Operators::from_numeric_config(&request.operators)?;
            solve(request, population, sphere, operators, settings, started_at)
        }
        Problem::Rastrigin => {
            let population = random_population(&Rastrigin::prototype(length), size, &mut rng);
            let operators = Operators::from_numeric_config(&request.operators)?;
            let evaluator = Rastrigin::default();
            solve(request, population, evaluator, operators, settings, started_at)
        }
        Problem::Permutation => {
            let population: Vec<Chromosome<IntegerGene>> = (0..size)
                .map(|_| random_permutation(length, &mut rng))
                .collect();
            let operators = Operators::from_config(&permutation_operators(&request.operators))?;
            solve(request, population, PermutationOrder, operators, settings, started_at)
        }
    }
}

/// Seuls OX et l'échange conservent une permutation.
fn permutation_operators(config: &OperatorConfig) -> OperatorConfig {
    let mut config = config.clone();
    if config.crossover != "order" || config.mutation != "swap" {
        warn!(
            crossover = %config.crossover,
            mutation = %config.mutation,
            "Permutation : croisement 'order' et mutation 'swap' imposés"
        );
        config.crossover = "order".to_string();
        config.mutation = "swap".to_string();
    }
    config
}

fn solve<G, E>(
    request: &OptimizationRequest,
    population: Vec<Chromosome<G>>,
    evaluator: E,
    operators: Operators<G>,
    settings: EngineSettings,
    started_at: DateTime<Utc>,
) -> Result<OptimizationReport>
where
    G: Gene,
    E: Evaluator<G> + 'static,
{
    let params = RunParams::from(&request.run);

    if request.uses_islands() {
        let mut engine = IslandEngine::builder()
            .population(population)
            .num_islands(request.engine.num_islands)
            .evaluator(evaluator)
            .operators(operators)
            .migration_from_config(&request.operators)?
            .settings(settings)
            .build()?;
        engine.run(&params)?;
        Ok(OptimizationReport::from_engine::<G, _>(
            &engine,
            request.problem,
            "island",
            started_at,
        ))
    } else {
        let mut engine = GeneticEngine::builder()
            .population(population)
            .evaluator(evaluator)
            .operators(operators)
            .settings(settings)
            .build()?;
        engine.run(&params)?;
        Ok(OptimizationReport::from_engine::<G, _>(
            &engine,
            request.problem,
            "single",
            started_at,
        ))
    }
}
