pub mod dto;
pub mod engine;
pub mod evaluators;
pub mod genomes;
pub mod island;
pub mod operators;
pub mod runner;
pub mod stats;
pub mod traits;
pub mod types;

pub use dto::{OptimizationReport, OptimizationRequest};
pub use engine::{
    apply_corrections, EngineSettings, EvolutionEngine, GeneticEngine, GeneticEngineBuilder,
    Operators, RunParams, RunSummary,
};
pub use evaluators::Problem;
pub use island::{IslandEngine, IslandEngineBuilder};
pub use runner::run_optimization;
pub use traits::{Evaluator, Gene, NumericGene};
pub use types::{Chromosome, FitnessHistory, Statistics, StatsKey, SubPopulation};
