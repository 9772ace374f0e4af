use super::engine::{EvolutionEngine, RunSummary};
use super::evaluators::Problem;
use super::traits::Gene;
use super::types::FitnessHistory;
use crate::utils::config::{EngineConfig, OperatorConfig, RunConfig};
use crate::utils::core::DateTime;
use crate::utils::prelude::*;
use crate::utils::BTreeMap;

// --- Configuration & Entrées ---

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OptimizationRequest {
    pub problem: Problem,

    // Structure du moteur (taille, génome, îles, graine...)
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub operators: OperatorConfig,

    // Paramètres du run
    #[serde(default)]
    pub run: RunConfig,
}

impl OptimizationRequest {
    /// Requête dérivée de la configuration applicative.
    pub fn from_config(problem: Problem, config: &AppConfig) -> Self {
        Self {
            problem,
            engine: config.engine.clone(),
            operators: config.operators.clone(),
            run: config.run.clone(),
        }
    }

    /// Une seule île : moteur mono-population.
    pub fn uses_islands(&self) -> bool {
        self.engine.num_islands > 1
    }
}

// --- Sorties ---

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OptimizationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub problem: Problem,
    pub engine: String,
    pub population_size: usize,
    pub best_fitness: Option<f64>,
    pub best_genome: Vec<String>,
    pub statistics: BTreeMap<String, FitnessHistory>,
    pub operator_counters: BTreeMap<String, u64>,
    pub summary: RunSummary,
}

impl OptimizationReport {
    /// Instantané d'un moteur après `run()`.
    pub fn from_engine<G, E>(
        engine: &E,
        problem: Problem,
        kind: &str,
        started_at: DateTime<Utc>,
    ) -> Self
    where
        G: Gene,
        E: EvolutionEngine<G> + ?Sized,
    {
        let best = engine.best_chromosome();
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            duration_ms: engine.summary().duration_ms,
            problem,
            engine: kind.to_string(),
            population_size: engine.population().len(),
            best_fitness: best.map(|c| c.fitness()),
            best_genome: best.map(|c| c.render_genome()).unwrap_or_default(),
            statistics: engine.stats().to_named(),
            operator_counters: engine.operator_counters(),
            summary: engine.summary().clone(),
        }
    }
}
