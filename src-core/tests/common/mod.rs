// FICHIER : src-core/tests/common/mod.rs

use archipel::genetics::genomes::{random_population, BinaryGene};
use archipel::genetics::operators::{
    RandomResetMutation, SinglePointCrossover, TournamentSelection,
};
use archipel::genetics::{Chromosome, EngineSettings, Evaluator, Gene, Operators};
use archipel::utils::config::ENV_MODE;
use archipel::utils::AppConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();

/// Logs de test + configuration en mode sandbox, une seule fois par binaire.
pub fn setup_test_env() {
    INIT.call_once(|| {
        std::env::set_var(ENV_MODE, "test");
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        AppConfig::init().expect("Initialisation de la configuration de test");
    });
}

pub fn count_ones(c: &Chromosome<BinaryGene>) -> f64 {
    c.genes()
        .iter()
        .filter(|g| g.value() == Some(&true))
        .count() as f64
}

pub fn bit_population(size: usize, length: usize, seed: u64) -> Vec<Chromosome<BinaryGene>> {
    let mut rng = StdRng::seed_from_u64(seed);
    random_population(&vec![BinaryGene::empty(); length], size, &mut rng)
}

pub fn sequential_settings(seed: u64) -> EngineSettings {
    EngineSettings {
        seed: Some(seed),
        parallel: false,
        ..Default::default()
    }
}

pub fn bit_operators(tournament: usize, mutation: f64) -> Operators<BinaryGene> {
    Operators::new(
        Box::new(TournamentSelection::new(tournament)),
        Box::new(SinglePointCrossover::new(0.9)),
        Box::new(RandomResetMutation::new(mutation)),
    )
}

/// Fitness correcte pendant `budget` appels, puis NaN.
pub struct FailingAfter {
    calls: AtomicUsize,
    budget: usize,
}

impl FailingAfter {
    pub fn new(budget: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            budget,
        }
    }
}

impl Evaluator<BinaryGene> for FailingAfter {
    fn evaluate(&self, chromosome: &Chromosome<BinaryGene>) -> f64 {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.budget {
            count_ones(chromosome)
        } else {
            f64::NAN
        }
    }
}
