// FICHIER : src-core/tests/genetics_suite/island_flow_test.rs

use crate::common::{bit_operators, bit_population, count_ones, sequential_settings, setup_test_env};
use archipel::genetics::genomes::BinaryGene;
use archipel::genetics::operators::{registry, ClockwiseMigration, RandomMigration};
use archipel::genetics::{
    Chromosome, EngineSettings, EvolutionEngine, Gene, IslandEngine, IslandEngineBuilder,
    RunParams,
};
use archipel::utils::config::OperatorConfig;
use archipel::utils::AppError;

fn archipelago(size: usize, islands: usize, seed: u64) -> IslandEngineBuilder<BinaryGene> {
    IslandEngine::builder()
        .population(bit_population(size, 2, seed))
        .num_islands(islands)
        .evaluator(count_ones)
        .operators(bit_operators(2, 0.2))
        .settings(sequential_settings(seed))
}

fn four_periods() -> RunParams {
    RunParams {
        epochs: 40,
        allow_migration: true,
        n_periods: 4,
        f_tol: -1.0,
        ..Default::default()
    }
}

#[test]
fn test_archipelago_sequential() {
    setup_test_env();
    let mut engine = archipelago(12, 3, 1)
        .migration(Some(Box::new(ClockwiseMigration::new(1.0))))
        .build()
        .unwrap();

    engine.run(&four_periods()).unwrap();

    assert_eq!(engine.population().len(), 12);
    assert!(engine.population().iter().all(|c| c.len() == 2));
    for id in 0..3 {
        // Entrée initiale + 4 périodes de 10 générations
        assert_eq!(engine.stats().island(id).unwrap().len(), 41);
    }
    assert_eq!(engine.stats().global().unwrap().len(), 1);
    assert_eq!(engine.operator_counters()["migration:clockwise"], 3);
    assert_eq!(engine.summary().generations, 120);
}

#[test]
fn test_archipelago_parallel() {
    setup_test_env();
    let mut engine = archipelago(12, 3, 2)
        .migration(Some(Box::new(RandomMigration::new(1.0))))
        .settings(EngineSettings {
            seed: Some(2),
            parallel: true,
            ..Default::default()
        })
        .build()
        .unwrap();

    engine.run(&four_periods()).unwrap();

    assert_eq!(engine.population().len(), 12);
    assert_eq!(engine.stats().len(), 4);
    assert!(engine.best_chromosome().is_some());
}

#[test]
fn test_population_size_preserved_for_any_seed() {
    setup_test_env();
    for seed in 0..6 {
        let mut engine = archipelago(17, 4, seed)
            .migration(Some(Box::new(RandomMigration::new(0.5))))
            .build()
            .unwrap();
        let params = RunParams {
            epochs: 9,
            allow_migration: true,
            n_periods: 3,
            ..Default::default()
        };

        engine.run(&params).unwrap();
        assert_eq!(engine.population().len(), 17, "graine {}", seed);
    }
}

#[test]
fn test_parallel_matches_sequential_for_same_seed() {
    setup_test_env();
    let run = |parallel: bool| {
        let mut engine = archipelago(12, 3, 3)
            .migration(Some(Box::new(ClockwiseMigration::new(1.0))))
            .settings(EngineSettings {
                seed: Some(3),
                parallel,
                ..Default::default()
            })
            .build()
            .unwrap();
        engine.run(&four_periods()).unwrap();
        engine.population().to_vec()
    };

    // Chaque île tire son propre RNG depuis le moteur : l'ordonnancement n'influe pas
    assert_eq!(run(false), run(true));
}

#[test]
fn test_converged_islands_are_retired() {
    setup_test_env();
    let clones: Vec<Chromosome<BinaryGene>> =
        vec![Chromosome::new(vec![BinaryGene::new(true); 4]); 9];
    let mut engine = IslandEngine::builder()
        .population(clones)
        .num_islands(3)
        .evaluator(|_: &Chromosome<BinaryGene>| 1.0)
        .operators(bit_operators(2, 0.0))
        .migration(Some(Box::new(ClockwiseMigration::new(1.0))))
        .settings(sequential_settings(4))
        .build()
        .unwrap();
    let params = RunParams {
        epochs: 20,
        allow_migration: true,
        n_periods: 4,
        ..Default::default()
    };

    engine.run(&params).unwrap();

    let summary = engine.summary();
    assert_eq!(summary.converged_at.len(), 3);
    assert!(summary.converged_at.values().all(|&period| period == 1));
    // Retirées avant la première barrière : aucune migration
    assert_eq!(engine.operator_counters()["migration:clockwise"], 0);
    assert_eq!(engine.population().len(), 9);
}

#[test]
fn test_non_finite_island_is_fatal() {
    setup_test_env();
    let population = bit_population(9, 3, 5);
    let mut engine = IslandEngine::builder()
        .population(population.clone())
        .num_islands(3)
        .evaluator(|_: &Chromosome<BinaryGene>| f64::NAN)
        .operators(bit_operators(2, 0.1))
        .settings(sequential_settings(5))
        .build()
        .unwrap();

    let err = engine.run(&four_periods()).unwrap_err();

    assert!(matches!(err, AppError::Island { .. }));
    assert!(err.is_non_finite());
    assert_eq!(engine.population(), population.as_slice());
}

#[test]
fn test_single_island_ignores_migration() {
    setup_test_env();
    let config = OperatorConfig {
        migration: "random".to_string(),
        migration_probability: 1.0,
        ..Default::default()
    };
    let mut engine = archipelago(8, 1, 6)
        .migration_from_config(&config)
        .unwrap()
        .build()
        .unwrap();

    engine.run(&four_periods()).unwrap();

    assert_eq!(engine.operator_counters()["migration:random"], 0);
    assert_eq!(engine.population().len(), 8);
}

#[test]
fn test_no_migration_policy_from_config() {
    let config = OperatorConfig {
        migration: "none".to_string(),
        ..Default::default()
    };
    let migration = registry::migration_from_config::<BinaryGene>(&config).unwrap();
    assert!(migration.is_none());

    let engine = archipelago(8, 2, 7)
        .migration_from_config(&config)
        .unwrap()
        .build()
        .unwrap();
    assert!(engine.migration().is_none());
    assert!(engine
        .population()
        .iter()
        .all(|c| c.genes().iter().all(Gene::is_valid)));
}
