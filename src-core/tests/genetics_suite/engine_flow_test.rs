// FICHIER : src-core/tests/genetics_suite/engine_flow_test.rs

use crate::common::{
    bit_operators, bit_population, count_ones, sequential_settings, setup_test_env, FailingAfter,
};
use archipel::genetics::genomes::{BinaryGene, RealGene};
use archipel::genetics::operators::{
    registry, GeneticOperator, MutationOperator, OperatorCore, SinglePointCrossover,
    TournamentSelection,
};
use archipel::genetics::types::best_of;
use archipel::genetics::{
    apply_corrections, Chromosome, EngineSettings, EvolutionEngine, Gene, GeneticEngine,
    Operators, RunParams,
};
use archipel::utils::config::OperatorConfig;
use archipel::utils::AppConfig;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn onemax_engine(size: usize, length: usize, seed: u64) -> GeneticEngine<BinaryGene> {
    GeneticEngine::builder()
        .population(bit_population(size, length, seed))
        .evaluator(count_ones)
        .operators(bit_operators(3, 0.3))
        .settings(sequential_settings(seed))
        .build()
        .expect("Construction du moteur")
}

#[test]
fn test_genome_length_is_constant_across_generations() {
    setup_test_env();
    let mut engine = onemax_engine(15, 10, 1);
    let params = RunParams {
        epochs: 1,
        f_tol: -1.0,
        correction: true,
        ..Default::default()
    };

    for _ in 0..25 {
        engine.run(&params).unwrap();
        assert_eq!(engine.population().len(), 15);
        assert!(engine.population().iter().all(|c| c.len() == 10));
    }
}

#[test]
fn test_elitism_never_loses_the_best() {
    setup_test_env();
    let mut engine = onemax_engine(12, 16, 2);
    let params = RunParams {
        epochs: 1,
        elitism: true,
        f_tol: -1.0,
        ..Default::default()
    };

    let mut previous_best = f64::NEG_INFINITY;
    for _ in 0..40 {
        engine.run(&params).unwrap();
        let best = engine.best_chromosome().unwrap().fitness();
        assert!(best >= previous_best, "{} < {}", best, previous_best);
        previous_best = best;
    }
}

#[test]
fn test_onemax_improves() {
    setup_test_env();
    let mut engine = onemax_engine(30, 20, 3);
    let params = RunParams {
        epochs: 60,
        ..Default::default()
    };

    engine.run(&params).unwrap();

    let global = engine.stats().global().unwrap();
    let first = global.avg[0];
    let last = *global.avg.last().unwrap();
    assert!(last > first, "moyenne {} -> {}", first, last);
    assert!(engine.summary().evaluations >= 30);
}

#[test]
fn test_correction_fills_every_empty_gene() {
    let mut population: Vec<Chromosome<RealGene>> =
        vec![Chromosome::new(vec![RealGene::empty(-1.0, 1.0); 7]); 9];
    let mut rng = StdRng::seed_from_u64(4);

    let fixed = apply_corrections(&mut population, &mut rng);

    assert_eq!(fixed, 63);
    assert_eq!(
        population
            .iter()
            .map(Chromosome::invalid_gene_count)
            .sum::<usize>(),
        0
    );
}

#[test]
fn test_clone_is_an_independent_copy() {
    let original = bit_population(1, 5, 5).remove(0);
    let mut copy = original.clone();

    assert_eq!(copy, original);

    let flipped = !copy.genes()[0].value().copied().unwrap_or(false);
    copy.genes_mut()[0].set_value(flipped);
    assert_ne!(copy, original);
}

#[test]
fn test_non_finite_fitness_is_fatal() {
    setup_test_env();
    let population = bit_population(8, 6, 6);
    let mut engine = GeneticEngine::builder()
        .population(population.clone())
        .evaluator(FailingAfter::new(8))
        .operators(bit_operators(2, 1.0))
        .settings(sequential_settings(6))
        .build()
        .unwrap();

    let err = engine.run(&RunParams::default()).unwrap_err();

    assert!(err.is_non_finite());
    // Dernier état évalué : la population initiale, fitness en cache
    assert_eq!(engine.population(), population.as_slice());
    assert!(engine.population().iter().all(Chromosome::is_evaluated));
}

#[test]
fn test_oversized_tournament_is_rejected() {
    let err = GeneticEngine::builder()
        .population(bit_population(4, 3, 7))
        .evaluator(count_ones)
        .operators(bit_operators(5, 0.1))
        .build()
        .err()
        .unwrap();
    assert!(err.is_config());
}

#[test]
fn test_operators_from_app_config() {
    setup_test_env();
    let config = AppConfig::get();
    let operators: Operators<BinaryGene> = Operators::from_config(&config.operators).unwrap();

    let mut engine = GeneticEngine::builder()
        .population(bit_population(config.engine.population_size, 8, 8))
        .evaluator(count_ones)
        .operators(operators)
        .settings((&config.engine).into())
        .build()
        .unwrap();
    engine.run(&RunParams::from(&config.run)).unwrap();

    assert_eq!(engine.population().len(), config.engine.population_size);
}

#[test]
fn test_meta_operators_bookkeeping_in_a_run() {
    setup_test_env();
    let config = OperatorConfig {
        selection: "meta".to_string(),
        tournament_size: 2,
        crossover: "meta".to_string(),
        crossover_probability: 0.7,
        mutation: "meta".to_string(),
        mutation_probability: 0.5,
        ..Default::default()
    };
    let operators = Operators::new(
        registry::selection_from_config(&config).unwrap(),
        registry::crossover_from_config(&config).unwrap(),
        registry::mutation_from_config(&config).unwrap(),
    );
    let mut engine = GeneticEngine::builder()
        .population(bit_population(10, 6, 9))
        .evaluator(count_ones)
        .operators(operators)
        .settings(sequential_settings(9))
        .build()
        .unwrap();

    let params = RunParams {
        epochs: 12,
        f_tol: -1.0,
        ..Default::default()
    };
    engine.run(&params).unwrap();

    let ops = engine.operators();
    let sum = |counters: Vec<(String, u64)>| counters.iter().map(|(_, n)| n).sum::<u64>();
    assert_eq!(sum(ops.selection.all_counters()), ops.selection.applications());
    assert_eq!(sum(ops.crossover.all_counters()), ops.crossover.applications());
    assert_eq!(sum(ops.mutation.all_counters()), ops.mutation.applications());
    assert_eq!(ops.selection.applications(), 12);
}

#[test]
fn test_best_of_ignores_unevaluated() {
    let mut population = bit_population(3, 4, 10);
    population[1].set_fitness(2.0);
    assert_eq!(best_of(&population).unwrap().fitness(), 2.0);
}

/// Vide le premier locus : chaque mutation appliquée laisse un gène invalide.
struct ClearFirstLocus {
    core: OperatorCore,
}

impl GeneticOperator for ClearFirstLocus {
    fn name(&self) -> &str {
        "clear_first"
    }
    fn core(&self) -> &OperatorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut OperatorCore {
        &mut self.core
    }
}

impl MutationOperator<BinaryGene> for ClearFirstLocus {
    fn perturb(&self, individual: &mut Chromosome<BinaryGene>, _rng: &mut dyn RngCore) {
        if let Some(gene) = individual.genes_mut().first_mut() {
            gene.clear();
        }
    }
}

#[test]
fn test_correction_inside_the_generation_loop() {
    setup_test_env();
    let params = RunParams {
        epochs: 3,
        correction: true,
        elitism: false,
        f_tol: -1.0,
        ..Default::default()
    };

    for reevaluate in [true, false] {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut engine = GeneticEngine::builder()
            .population(bit_population(6, 5, 11))
            .evaluator(move |c: &Chromosome<BinaryGene>| {
                counter.fetch_add(1, Ordering::SeqCst);
                count_ones(c)
            })
            .operators(Operators::new(
                Box::new(TournamentSelection::new(2)),
                Box::new(SinglePointCrossover::new(0.9)),
                Box::new(ClearFirstLocus {
                    core: OperatorCore::new(1.0),
                }),
            ))
            .settings(EngineSettings {
                reevaluate_after_correction: reevaluate,
                ..sequential_settings(11)
            })
            .build()
            .unwrap();

        engine.run(&params).unwrap();

        let summary = engine.summary();
        // Un gène vidé par individu et par génération
        assert_eq!(summary.corrections, 6 * 3, "reevaluate = {}", reevaluate);
        assert_eq!(summary.generations, 3);
        // Population initiale puis chaque génération entièrement périmée
        assert_eq!(summary.evaluations, 6 * 4, "reevaluate = {}", reevaluate);
        assert_eq!(calls.load(Ordering::SeqCst), 6 * 4);
        assert!(engine.population().iter().all(Chromosome::is_valid));
        assert!(engine.population().iter().all(Chromosome::is_evaluated));
    }
}

#[test]
fn test_fitness_plateau_with_diverse_population_keeps_running() {
    setup_test_env();
    let mut engine = GeneticEngine::builder()
        .population(bit_population(20, 16, 12))
        .evaluator(|_: &Chromosome<BinaryGene>| 1.0)
        .operators(bit_operators(3, 0.3))
        .settings(sequential_settings(12))
        .build()
        .unwrap();

    // Moyenne constante : plateau à chaque génération, mais la diversité reste haute
    let params = RunParams {
        epochs: 3,
        f_tol: 1e-6,
        ..Default::default()
    };
    engine.run(&params).unwrap();

    assert_eq!(engine.summary().generations, 3);
    assert!(engine.summary().converged_at.is_empty());
}

#[test]
fn test_homogeneous_plateau_converges() {
    setup_test_env();
    let clone = Chromosome::new(vec![BinaryGene::new(true); 8]);
    let mut engine = GeneticEngine::builder()
        .population(vec![clone; 10])
        .evaluator(count_ones)
        .operators(bit_operators(2, 0.0))
        .settings(sequential_settings(13))
        .build()
        .unwrap();

    let params = RunParams {
        epochs: 30,
        f_tol: 1e-6,
        ..Default::default()
    };
    engine.run(&params).unwrap();

    let summary = engine.summary();
    assert_eq!(summary.generations, 1);
    assert_eq!(summary.converged_at.get("global"), Some(&1));
    assert_eq!(engine.stats().global().unwrap().avg.len(), 2);
}
