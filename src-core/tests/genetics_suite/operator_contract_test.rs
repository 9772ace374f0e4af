// FICHIER : src-core/tests/genetics_suite/operator_contract_test.rs

use crate::common::{bit_population, count_ones, setup_test_env};
use archipel::genetics::genomes::{random_permutation, BinaryGene, IntegerGene, RealGene};
use archipel::genetics::operators::{
    registry, total_applications, ApplicationCounter, CrossoverOperator, GeneticOperator,
    MutationOperator, OrderCrossover, RandomResetMutation, RankSelection, RouletteSelection,
    SelectionOperator, SinglePointCrossover, SwapMutation, TournamentSelection, UniformCrossover,
};
use archipel::genetics::{Chromosome, Gene};
use archipel::utils::config::OperatorConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

fn evaluated(seed: u64) -> Vec<Chromosome<BinaryGene>> {
    let mut population = bit_population(10, 8, seed);
    for c in population.iter_mut() {
        let fitness = count_ones(c);
        c.set_fitness(fitness);
    }
    population
}

#[test]
fn test_crossover_of_identical_parents_is_neutral() {
    setup_test_env();
    let mut rng = StdRng::seed_from_u64(1);
    let parent = random_permutation(7, &mut rng);
    let crossovers: Vec<Box<dyn CrossoverOperator<IntegerGene>>> = vec![
        Box::new(SinglePointCrossover::new(1.0)),
        Box::new(UniformCrossover::new(1.0)),
        Box::new(OrderCrossover::new(1.0)),
    ];

    for op in &crossovers {
        for _ in 0..20 {
            let (c1, c2) = op.crossover(&parent, &parent, &mut rng);
            assert_eq!(c1, parent, "{}", op.name());
            assert_eq!(c2, parent, "{}", op.name());
            // Appliqué : fitness à recalculer
            assert!(!c1.is_evaluated());
        }
        assert_eq!(op.applications(), 20);
    }
}

#[test]
fn test_crossover_never_touches_parents() {
    let mut rng = StdRng::seed_from_u64(2);
    let population = evaluated(2);
    let (p1, p2) = (population[0].clone(), population[1].clone());
    let op = UniformCrossover::new(1.0);

    let _ = CrossoverOperator::<BinaryGene>::crossover(&op, &p1, &p2, &mut rng);

    assert_eq!(p1, population[0]);
    assert_eq!(p1.fitness(), population[0].fitness());
    assert_eq!(p2, population[1]);
}

#[test]
fn test_selection_always_runs_and_keeps_size() {
    setup_test_env();
    let mut rng = StdRng::seed_from_u64(3);
    let population = evaluated(3);
    let selections: Vec<Box<dyn SelectionOperator<BinaryGene>>> = vec![
        Box::new(TournamentSelection::new(3)),
        Box::new(RouletteSelection::new()),
        Box::new(RankSelection::new()),
    ];

    for mut op in selections {
        // La probabilité ne s'applique pas à la sélection
        op.set_probability(0.0);
        let selected = op.select(&population, &mut rng).unwrap();
        assert_eq!(selected.len(), population.len(), "{}", op.name());
        assert!(selected.iter().all(|c| population.contains(c)));
        assert_eq!(op.applications(), 1);
    }
}

#[test]
fn test_selection_on_empty_population_is_rejected() {
    let mut rng = StdRng::seed_from_u64(4);
    let empty: Vec<Chromosome<BinaryGene>> = Vec::new();
    let op = TournamentSelection::new(2);

    let err = SelectionOperator::<BinaryGene>::select(&op, &empty, &mut rng).unwrap_err();
    assert!(err.is_config());
    assert_eq!(GeneticOperator::applications(&op), 0);
}

#[test]
fn test_mutation_probability_bounds() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut population = evaluated(5);

    let never = RandomResetMutation::new(0.0);
    for c in population.iter_mut() {
        assert!(!MutationOperator::<BinaryGene>::mutate(&never, c, &mut rng));
        assert!(c.is_evaluated());
    }

    let always = RandomResetMutation::new(1.0);
    for c in population.iter_mut() {
        assert!(MutationOperator::<BinaryGene>::mutate(&always, c, &mut rng));
        assert!(!c.is_evaluated());
    }
    assert_eq!(GeneticOperator::applications(&never), 0);
    assert_eq!(GeneticOperator::applications(&always), 10);
}

#[test]
fn test_swap_keeps_the_gene_multiset() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut c = Chromosome::new(
        (0..6)
            .map(|v| RealGene::new(v as f64, 0.0, 10.0))
            .collect::<Vec<_>>(),
    );
    let op = SwapMutation::new(1.0);

    for _ in 0..10 {
        MutationOperator::<RealGene>::mutate(&op, &mut c, &mut rng);
    }

    let mut values: Vec<f64> = c.genes().iter().filter_map(|g| g.value().copied()).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_probability_is_clamped() {
    let mut op = SinglePointCrossover::new(1.7);
    assert_eq!(op.probability(), 1.0);

    op.set_probability(-0.3);
    assert_eq!(op.probability(), 0.0);

    op.set_probability(f64::NAN);
    assert_eq!(op.probability(), 0.0);

    let restored: SinglePointCrossover =
        serde_json::from_value(json!({ "core": { "probability": 4.0 } })).unwrap();
    assert_eq!(restored.probability(), 1.0);
    assert_eq!(restored.applications(), 0);
}

#[test]
fn test_counter_survives_serialization() {
    let mut rng = StdRng::seed_from_u64(7);
    let population = evaluated(7);
    let op = SinglePointCrossover::new(1.0);
    for _ in 0..4 {
        let _ = CrossoverOperator::<BinaryGene>::crossover(
            &op,
            &population[0],
            &population[1],
            &mut rng,
        );
    }

    let payload = serde_json::to_string(&op).unwrap();
    let remote: SinglePointCrossover = serde_json::from_str(&payload).unwrap();
    assert_eq!(remote.applications(), 4);
    assert_eq!(remote.probability(), 1.0);

    // Un worker renvoie son compte : fusion dans l'original
    op.core().counter().merge(remote.applications());
    assert_eq!(op.applications(), 8);
}

#[test]
fn test_counter_clone_is_a_snapshot() {
    let counter = ApplicationCounter::new(3);
    let snapshot = counter.clone();
    counter.increment();

    assert_eq!(counter.get(), 4);
    assert_eq!(snapshot.get(), 3);
    assert_eq!(serde_json::to_value(&counter).unwrap(), json!(4));

    counter.reset();
    assert_eq!(counter.get(), 0);
}

#[test]
fn test_meta_operator_delegates_every_application() {
    setup_test_env();
    let mut rng = StdRng::seed_from_u64(8);
    let config = OperatorConfig {
        mutation: "meta".to_string(),
        mutation_probability: 1.0,
        ..Default::default()
    };
    let op = registry::mutation_from_config::<BinaryGene>(&config).unwrap();
    let mut population = evaluated(8);

    for c in population.iter_mut() {
        op.mutate(c, &mut rng);
    }

    let counters = op.all_counters();
    assert!(counters.len() >= 2);
    let sum: u64 = counters.iter().map(|(_, n)| n).sum();
    assert_eq!(sum, 10);
    assert_eq!(op.applications(), 10);
}

#[test]
fn test_total_applications_of_plain_operator() {
    let op = OrderCrossover::new(0.5);
    op.core().record();
    op.core().record();
    assert_eq!(total_applications(&op), 2);
}

#[test]
fn test_unknown_operator_names_are_listed() {
    let config = OperatorConfig {
        crossover: "two_point".to_string(),
        ..Default::default()
    };
    let err = registry::crossover_from_config::<BinaryGene>(&config)
        .err()
        .unwrap();
    assert!(err.is_config());
    assert!(err.to_string().contains("single_point"));
}
