// FICHIER : src-core/src/utils/error.rs

use serde::Serialize;
use std::io;

// --- RE-EXPORTS ANYHOW (Pour la flexibilité du CLI) ---
pub use anyhow::{anyhow, Context};
// On renomme le Result de anyhow pour ne pas qu'il écrase le nôtre
pub use anyhow::Result as AnyResult;

// --- GESTION D'ERREUR STRICTE ---

/// Type de résultat standard pour le moteur évolutionnaire.
pub type Result<T> = std::result::Result<T, AppError>;

/// Enumération centrale des erreurs.
///
/// Trois familles :
/// - `Config` : erreur de construction (opérateur manquant, îles trop nombreuses...),
///   levée immédiatement et jamais retentée.
/// - `NonFiniteFitness` / `Island` : erreurs fatales d'exécution, `run()` s'arrête.
/// - le reste : plomberie (I/O, JSON, erreurs système).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Erreur de configuration : {0}")]
    Config(String),

    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] io::Error),

    #[error("Erreur Système : {0}")]
    System(#[from] anyhow::Error),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(
        "Fitness non finie à la génération {generation} (moyenne = {mean}, écart-type = {std})"
    )]
    NonFiniteFitness {
        generation: usize,
        mean: f64,
        std: f64,
    },

    #[error("Île {island} : {source}")]
    Island {
        island: usize,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Raccourci pour les erreurs de configuration.
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    /// Rattache une erreur survenue dans un worker à l'île qui l'a produite.
    pub fn in_island(self, island: usize) -> Self {
        AppError::Island {
            island,
            source: Box::new(self),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_))
    }

    /// Vrai si l'erreur (éventuellement enveloppée par une île) est une fitness non finie.
    pub fn is_non_finite(&self) -> bool {
        match self {
            AppError::NonFiniteFitness { .. } => true,
            AppError::Island { source, .. } => source.is_non_finite(),
            _ => false,
        }
    }
}

// Les rapports (CLI --json) exposent l'erreur sous forme de simple chaîne.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

// Permet de faire : return Err("Mon erreur".into());
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::System(anyhow::anyhow!(s))
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::System(anyhow::anyhow!(s.to_string()))
    }
}
