// FICHIER : src-core/src/utils/config.rs

use crate::utils::env as app_env;
use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Singleton global pour la configuration
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Variables d'environnement reconnues
pub const ENV_MODE: &str = "ARCHIPEL_ENV_MODE";
pub const ENV_CONFIG_PATH: &str = "ARCHIPEL_CONFIG";
pub const ENV_SEED: &str = "ARCHIPEL_SEED";
pub const ENV_LOG_LEVEL: &str = "ARCHIPEL_LOG_LEVEL";
pub const ENV_SEQUENTIAL: &str = "ARCHIPEL_SEQUENTIAL";

/// Configuration globale structurée par niveaux de responsabilité
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub operators: OperatorConfig,
}

// --- SOUS-STRUCTURES DE CONFIGURATION ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    pub env_mode: String,
    pub log_level: String,
    /// Si présent, les logs JSON sont aussi écrits dans ce dossier.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// Paramètres structurels du moteur (fixés à la construction).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub population_size: usize,
    pub genome_length: usize,
    pub num_islands: usize,
    pub seed: Option<u64>,
    pub diversity_threshold: f64,
    pub reevaluate_after_correction: bool,
    pub parallel: bool,
}

/// Paramètres d'un appel à `run()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub epochs: usize,
    pub correction: bool,
    pub elitism: bool,
    pub f_tol: f64,
    pub allow_migration: bool,
    pub n_periods: usize,
    pub verbose: bool,
}

/// Choix des stratégies par nom (voir `genetics::operators::registry`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OperatorConfig {
    pub selection: String,
    pub selection_probability: f64,
    pub tournament_size: usize,
    pub crossover: String,
    pub crossover_probability: f64,
    pub mutation: String,
    pub mutation_probability: f64,
    pub mutation_sigma: f64,
    pub polynomial_eta: f64,
    pub migration: String,
    pub migration_probability: f64,
}

// --- IMPLÉMENTATIONS PAR DÉFAUT ---

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            env_mode: "production".to_string(),
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            genome_length: 32,
            num_islands: 4,
            seed: None,
            diversity_threshold: 0.05,
            reevaluate_after_correction: true,
            parallel: true,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            correction: false,
            elitism: true,
            f_tol: 1e-6,
            allow_migration: true,
            n_periods: 5,
            verbose: false,
        }
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            selection: "tournament".to_string(),
            selection_probability: 1.0,
            tournament_size: 3,
            crossover: "single_point".to_string(),
            crossover_probability: 0.9,
            mutation: "random_reset".to_string(),
            mutation_probability: 0.1,
            mutation_sigma: 0.1,
            polynomial_eta: 20.0,
            migration: "clockwise".to_string(),
            migration_probability: 1.0,
        }
    }
}

// --- IMPLÉMENTATION PRINCIPALE ---

impl AppConfig {
    pub fn init() -> Result<()> {
        if CONFIG.get().is_some() {
            return Ok(());
        }

        let test_mode = cfg!(test) || app_env::get_optional(ENV_MODE).as_deref() == Some("test");

        let mut config = if test_mode {
            Self::create_default_test_config()
        } else {
            Self::load_production_config()?
        };
        config.apply_env_overrides()?;

        // Une initialisation concurrente a pu gagner la course : on garde la première.
        let _ = CONFIG.set(config);
        Ok(())
    }

    /// Installe une configuration explicite (CLI `--request`, tests).
    pub fn init_with(config: AppConfig) -> Result<()> {
        CONFIG
            .set(config)
            .map_err(|_| AppError::config("La configuration est déjà initialisée"))
    }

    pub fn get() -> &'static AppConfig {
        CONFIG.get_or_init(|| {
            tracing::warn!("AppConfig::get() avant init() : valeurs par défaut utilisées");
            AppConfig::default()
        })
    }

    /// Charge un fichier JSON de configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Lecture impossible de {} : {}", path.display(), e))
        })?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn load_production_config() -> Result<Self> {
        if let Some(explicit) = app_env::get_optional(ENV_CONFIG_PATH) {
            // Chemin explicite : son absence est une erreur
            return Self::from_file(Path::new(&explicit));
        }

        match Self::user_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    fn user_config_path() -> Option<PathBuf> {
        Some(dirs::home_dir()?.join(".archipel").join("config.json"))
    }

    fn create_default_test_config() -> Self {
        AppConfig {
            core: CoreConfig {
                env_mode: "test".to_string(),
                log_level: "debug".to_string(),
                log_dir: None,
            },
            engine: EngineConfig {
                population_size: 12,
                genome_length: 8,
                num_islands: 3,
                seed: Some(42),
                parallel: false,
                ..Default::default()
            },
            run: RunConfig {
                epochs: 20,
                n_periods: 4,
                ..Default::default()
            },
            operators: OperatorConfig::default(),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if app_env::get_optional(ENV_SEED).is_some() {
            self.engine.seed = Some(app_env::get_parsed::<u64>(ENV_SEED)?);
        }
        self.core.log_level = app_env::get_or(ENV_LOG_LEVEL, &self.core.log_level);
        if app_env::is_enabled(ENV_SEQUENTIAL) {
            self.engine.parallel = false;
        }
        Ok(())
    }
}

// --- TESTS UNITAIRES ---
