pub mod benchmarks;

pub use benchmarks::{OneMax, PermutationOrder, Rastrigin, Sphere};

use crate::utils::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Problèmes de référence disponibles depuis la CLI et les requêtes JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    OneMax,
    Sphere,
    Rastrigin,
    Permutation,
}

impl Problem {
    pub const ALL: [Problem; 4] = [
        Problem::OneMax,
        Problem::Sphere,
        Problem::Rastrigin,
        Problem::Permutation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Problem::OneMax => "one_max",
            Problem::Sphere => "sphere",
            Problem::Rastrigin => "rastrigin",
            Problem::Permutation => "permutation",
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Problem {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "onemax" | "one_max" => Ok(Problem::OneMax),
            "sphere" => Ok(Problem::Sphere),
            "rastrigin" => Ok(Problem::Rastrigin),
            "permutation" => Ok(Problem::Permutation),
            other => Err(AppError::config(format!("Problème inconnu : '{}'", other))),
        }
    }
}
