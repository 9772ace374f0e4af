// FICHIER : src-core/tools/archipel-cli/src/commands/config.rs

use clap::Args;
use std::path::PathBuf;

use archipel::{
    genetics::operators::registry,
    user_info, user_success,
    utils::{config::ENV_MODE, prelude::*},
};

/// Affiche la configuration active (ou valide un fichier)
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Fichier de configuration à valider au lieu de la configuration active
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Liste les opérateurs disponibles par rôle
    #[arg(long)]
    pub operators: bool,
}

pub fn handle(args: ConfigArgs) -> Result<()> {
    if args.operators {
        user_info!("SELECTION", "{}", registry::SELECTIONS.join(", "));
        user_info!("CROSSOVER", "{}", registry::CROSSOVERS.join(", "));
        user_info!("MUTATION", "{}", registry::MUTATIONS.join(", "));
        user_info!("MIGRATION", "{}", registry::MIGRATIONS.join(", "));
        return Ok(());
    }

    match args.file {
        Some(path) => {
            let config = AppConfig::from_file(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            user_success!("CONFIG_VALID", "{}", path.display());
        }
        None => {
            let config = AppConfig::get();
            user_info!("ENV", "{} ({})", config.core.env_mode, ENV_MODE);
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}

// --- TESTS UNITAIRES ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_list_operators() {
        let args = ConfigArgs {
            file: None,
            operators: true,
        };
        assert!(handle(args).is_ok());
    }

    #[test]
    fn test_validate_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json!({ "engine": { "num_islands": 2 } })).unwrap();

        let args = ConfigArgs {
            file: Some(file.path().to_path_buf()),
            operators: false,
        };
        assert!(handle(args).is_ok());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ pas du json").unwrap();

        let args = ConfigArgs {
            file: Some(file.path().to_path_buf()),
            operators: false,
        };
        assert!(handle(args).is_err());
    }
}
