//! Construction des opérateurs par nom, à partir de [`OperatorConfig`].
//!
//! Un nom inconnu est une erreur de configuration, levée avant tout run.

use super::{
    ClockwiseMigration, Composite, CrossoverOperator, GaussianMutation, GeneticOperator,
    MigrationOperator, MutationOperator, OrderCrossover, PolynomialMutation, RandomMigration,
    RandomResetMutation, RankSelection, RouletteSelection, SelectionOperator,
    SinglePointCrossover, SwapMutation, TournamentSelection, UniformCrossover,
};
use crate::genetics::traits::{Gene, NumericGene};
use crate::utils::config::OperatorConfig;
use crate::utils::{AppError, Result};

pub const SELECTIONS: &[&str] = &["tournament", "roulette", "rank", "meta"];
pub const CROSSOVERS: &[&str] = &["single_point", "uniform", "order", "meta"];
pub const MUTATIONS: &[&str] = &["swap", "random_reset", "gaussian", "polynomial", "meta"];
pub const MIGRATIONS: &[&str] = &["clockwise", "random", "meta", "none"];

fn unknown(role: &str, name: &str, known: &[&str]) -> AppError {
    AppError::config(format!(
        "Opérateur de {} inconnu : '{}' (attendu : {})",
        role,
        name,
        known.join(", ")
    ))
}

pub fn selection_from_config<G: Gene>(
    config: &OperatorConfig,
) -> Result<Box<dyn SelectionOperator<G>>> {
    let mut op: Box<dyn SelectionOperator<G>> = match config.selection.as_str() {
        "tournament" => Box::new(TournamentSelection::new(config.tournament_size)),
        "roulette" => Box::new(RouletteSelection::new()),
        "rank" => Box::new(RankSelection::new()),
        "meta" => Box::new(Composite::<dyn SelectionOperator<G>>::new(
            "meta_selection",
            vec![
                Box::new(TournamentSelection::new(config.tournament_size)),
                Box::new(RouletteSelection::new()),
                Box::new(RankSelection::new()),
            ],
            1.0,
        )?),
        other => return Err(unknown("sélection", other, SELECTIONS)),
    };
    op.set_probability(config.selection_probability);
    Ok(op)
}

pub fn crossover_from_config<G: Gene>(
    config: &OperatorConfig,
) -> Result<Box<dyn CrossoverOperator<G>>> {
    let p = config.crossover_probability;
    let op: Box<dyn CrossoverOperator<G>> = match config.crossover.as_str() {
        "single_point" => Box::new(SinglePointCrossover::new(p)),
        "uniform" => Box::new(UniformCrossover::new(p)),
        "order" => Box::new(OrderCrossover::new(p)),
        "meta" => Box::new(Composite::<dyn CrossoverOperator<G>>::new(
            "meta_crossover",
            vec![
                Box::new(SinglePointCrossover::new(1.0)),
                Box::new(UniformCrossover::new(1.0)),
            ],
            p,
        )?),
        other => return Err(unknown("croisement", other, CROSSOVERS)),
    };
    Ok(op)
}

/// Mutations applicables à tout encodage. Les mutations numériques passent
/// par [`numeric_mutation_from_config`].
pub fn mutation_from_config<G: Gene>(
    config: &OperatorConfig,
) -> Result<Box<dyn MutationOperator<G>>> {
    let p = config.mutation_probability;
    let op: Box<dyn MutationOperator<G>> = match config.mutation.as_str() {
        "swap" => Box::new(SwapMutation::new(p)),
        "random_reset" => Box::new(RandomResetMutation::new(p)),
        "meta" => Box::new(Composite::<dyn MutationOperator<G>>::new(
            "meta_mutation",
            vec![
                Box::new(SwapMutation::new(1.0)),
                Box::new(RandomResetMutation::new(1.0)),
            ],
            p,
        )?),
        "gaussian" | "polynomial" => {
            return Err(AppError::config(format!(
                "La mutation '{}' exige un encodage numérique",
                config.mutation
            )))
        }
        other => return Err(unknown("mutation", other, MUTATIONS)),
    };
    Ok(op)
}

pub fn numeric_mutation_from_config<G: NumericGene>(
    config: &OperatorConfig,
) -> Result<Box<dyn MutationOperator<G>>> {
    let p = config.mutation_probability;
    let op: Box<dyn MutationOperator<G>> = match config.mutation.as_str() {
        "gaussian" => Box::new(GaussianMutation::new(p, config.mutation_sigma)),
        "polynomial" => Box::new(PolynomialMutation::new(p, config.polynomial_eta)),
        "meta" => Box::new(Composite::<dyn MutationOperator<G>>::new(
            "meta_mutation",
            vec![
                Box::new(RandomResetMutation::new(1.0)),
                Box::new(GaussianMutation::new(1.0, config.mutation_sigma)),
                Box::new(PolynomialMutation::new(1.0, config.polynomial_eta)),
            ],
            p,
        )?),
        _ => return mutation_from_config(config),
    };
    Ok(op)
}

/// `"none"` désactive la migration (mode sans barrière).
pub fn migration_from_config<G: Gene>(
    config: &OperatorConfig,
) -> Result<Option<Box<dyn MigrationOperator<G>>>> {
    let p = config.migration_probability;
    let op: Box<dyn MigrationOperator<G>> = match config.migration.as_str() {
        "none" => return Ok(None),
        "clockwise" => Box::new(ClockwiseMigration::new(p)),
        "random" => Box::new(RandomMigration::new(p)),
        "meta" => Box::new(Composite::<dyn MigrationOperator<G>>::new(
            "meta_migration",
            vec![
                Box::new(ClockwiseMigration::new(1.0)),
                Box::new(RandomMigration::new(1.0)),
            ],
            p,
        )?),
        other => return Err(unknown("migration", other, MIGRATIONS)),
    };
    Ok(Some(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::genomes::{BinaryGene, RealGene};

    #[test]
    fn test_default_config_resolves() {
        let config = OperatorConfig::default();
        assert_eq!(
            selection_from_config::<BinaryGene>(&config).unwrap().name(),
            "tournament"
        );
        assert_eq!(
            crossover_from_config::<BinaryGene>(&config).unwrap().name(),
            "single_point"
        );
        let mutation = mutation_from_config::<BinaryGene>(&config).unwrap();
        assert_eq!(mutation.name(), "random_reset");
        assert_eq!(mutation.probability(), config.mutation_probability);
        assert!(migration_from_config::<BinaryGene>(&config).unwrap().is_some());
    }

    #[test]
    fn test_unknown_name_is_config_error() {
        let config = OperatorConfig {
            crossover: "three_point".to_string(),
            ..Default::default()
        };
        let err = crossover_from_config::<BinaryGene>(&config).err().unwrap();
        assert!(err.is_config());
        assert!(err.to_string().contains("three_point"));
    }

    #[test]
    fn test_numeric_mutation_requires_numeric_gene() {
        let config = OperatorConfig {
            mutation: "gaussian".to_string(),
            ..Default::default()
        };
        assert!(mutation_from_config::<BinaryGene>(&config).is_err());
        let op = numeric_mutation_from_config::<RealGene>(&config).unwrap();
        assert_eq!(op.name(), "gaussian");

        // Les noms génériques restent accessibles côté numérique
        let swap = OperatorConfig {
            mutation: "swap".to_string(),
            ..Default::default()
        };
        assert_eq!(
            numeric_mutation_from_config::<RealGene>(&swap).unwrap().name(),
            "swap"
        );
    }

    #[test]
    fn test_meta_and_none() {
        let config = OperatorConfig {
            selection: "meta".to_string(),
            migration: "none".to_string(),
            ..Default::default()
        };
        let selection = selection_from_config::<BinaryGene>(&config).unwrap();
        assert_eq!(selection.all_counters().len(), 3);
        assert!(migration_from_config::<BinaryGene>(&config).unwrap().is_none());
    }

    #[test]
    fn test_probability_is_clamped_from_config() {
        let config = OperatorConfig {
            crossover_probability: 4.0,
            ..Default::default()
        };
        let op = crossover_from_config::<BinaryGene>(&config).unwrap();
        assert_eq!(op.probability(), 1.0);
    }
}
