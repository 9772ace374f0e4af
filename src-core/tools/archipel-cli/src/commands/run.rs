// FICHIER : src-core/tools/archipel-cli/src/commands/run.rs

use clap::Args;
use std::fs;
use std::path::PathBuf;

use archipel::{
    genetics::{evaluators::Problem, run_optimization, OptimizationReport, OptimizationRequest},
    user_info, user_success,
    utils::prelude::*,
};

/// Lance une optimisation (mono-population ou îles selon `--islands`)
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Problème : one_max, sphere, rastrigin, permutation
    #[arg(short, long)]
    pub problem: Option<String>,

    /// Requête JSON complète ; les options explicites la surchargent
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Taille de la population
    #[arg(long)]
    pub population: Option<usize>,

    /// Longueur du génome
    #[arg(short, long)]
    pub genes: Option<usize>,

    /// Nombre d'îles (1 = moteur mono-population)
    #[arg(short, long)]
    pub islands: Option<usize>,

    /// Nombre total de générations
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Nombre de périodes de migration
    #[arg(long)]
    pub periods: Option<usize>,

    /// Politique de migration : clockwise, random, meta, none
    #[arg(short, long)]
    pub migration: Option<String>,

    /// Désactive l'élitisme
    #[arg(long)]
    pub no_elitism: bool,

    /// Active la correction des gènes invalides
    #[arg(long)]
    pub correction: bool,

    /// Tolérance de plateau pour la convergence (négatif : jamais)
    #[arg(long, allow_hyphen_values = true)]
    pub f_tol: Option<f64>,

    /// Graine du générateur aléatoire
    #[arg(short, long, env = "ARCHIPEL_SEED")]
    pub seed: Option<u64>,

    /// Îles exécutées l'une après l'autre
    #[arg(long)]
    pub sequential: bool,

    /// Journal détaillé de chaque génération
    #[arg(short, long)]
    pub verbose: bool,

    /// Rapport complet en JSON sur la sortie standard
    #[arg(long)]
    pub json: bool,
}

pub fn handle(args: RunArgs) -> Result<()> {
    let request = build_request(&args, AppConfig::get())?;

    if !args.json {
        user_info!(
            "RUN_START",
            "{} | pop: {} | génome: {} | îles: {} | générations: {}",
            request.problem,
            request.engine.population_size,
            request.engine.genome_length,
            request.engine.num_islands,
            request.run.epochs
        );
    }

    let report = run_optimization(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

/// Requête finale : fichier (ou configuration active) puis options explicites.
pub fn build_request(args: &RunArgs, config: &AppConfig) -> Result<OptimizationRequest> {
    let mut request = match &args.request {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                AppError::config(format!("Lecture impossible de {} : {}", path.display(), e))
            })?;
            serde_json::from_str::<OptimizationRequest>(&content)?
        }
        None => OptimizationRequest::from_config(Problem::OneMax, config),
    };

    if let Some(problem) = &args.problem {
        request.problem = problem.parse()?;
    }
    if let Some(size) = args.population {
        request.engine.population_size = size;
    }
    if let Some(length) = args.genes {
        request.engine.genome_length = length;
    }
    if let Some(islands) = args.islands {
        request.engine.num_islands = islands;
    }
    if let Some(seed) = args.seed {
        request.engine.seed = Some(seed);
    }
    if args.sequential {
        request.engine.parallel = false;
    }
    if let Some(epochs) = args.epochs {
        request.run.epochs = epochs;
    }
    if let Some(periods) = args.periods {
        request.run.n_periods = periods;
    }
    if let Some(f_tol) = args.f_tol {
        request.run.f_tol = f_tol;
    }
    if let Some(policy) = &args.migration {
        request.run.allow_migration = policy != "none";
        request.operators.migration = policy.clone();
    }
    request.run.elitism &= !args.no_elitism;
    request.run.correction |= args.correction;
    request.run.verbose |= args.verbose;

    debug!(?request, "Requête d'optimisation construite");
    Ok(request)
}

fn print_summary(report: &OptimizationReport) {
    let summary = &report.summary;
    user_success!(
        "RUN_DONE",
        "{} ({}) en {} ms",
        report.problem,
        report.engine,
        report.duration_ms
    );

    match report.best_fitness {
        Some(fitness) => user_info!("BEST", "fitness = {:.6}", fitness),
        None => user_info!("BEST", "aucun individu évalué"),
    }
    user_info!("GENOME", "[{}]", report.best_genome.join(", "));
    user_info!(
        "STATS",
        "générations: {} | évaluations: {} | corrections: {} | moyenne finale: {:.6} (σ {:.6})",
        summary.generations,
        summary.evaluations,
        summary.corrections,
        summary.final_mean,
        summary.final_std
    );
    for (key, at) in &summary.converged_at {
        user_info!("CONVERGED", "{} à {}", key, at);
    }
    for (name, count) in &report.operator_counters {
        user_info!("OPERATOR", "{} : {}", name, count);
    }
}
