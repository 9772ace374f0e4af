use clap::{Parser, Subcommand};

// On garde le module local des commandes
mod commands;

use archipel::{
    user_error,
    utils::{context, prelude::*},
};

#[derive(Parser)]
#[command(name = "archipel-cli")]
#[command(about = "CLI du moteur évolutionnaire Archipel (populations et îles)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Lance une optimisation sur un problème de référence
    Run(commands::run::RunArgs),

    /// Inspection de la configuration active
    Config(commands::config::ConfigArgs),
}

fn main() {
    // 1. Initialisation de la Configuration (CRITIQUE)
    if let Err(e) = AppConfig::init() {
        eprintln!("❌ CRITICAL ERROR: Impossible d'initialiser la configuration.");
        eprintln!("   Détails : {}", e);
        std::process::exit(1);
    }

    // 2. Initialisation du Logger
    context::init_logging();

    // 3. Parsing & Dispatch
    let cli = Cli::parse();
    if let Err(e) = execute_command(cli.command) {
        user_error!("CMD_FAIL", "{}", e);
        std::process::exit(1);
    }

    tracing::debug!("Fin de l'exécution du CLI");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Run(args) => commands::run::handle(args),
        Commands::Config(args) => commands::config::handle(args),
    }
}
