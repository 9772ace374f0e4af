use crate::utils::{AppError, Result};
use std::env;
use std::str::FromStr;

/// Récupère une variable d'environnement (Requis).
/// Renvoie une erreur explicite si la clé est manquante.
pub fn get(key: &str) -> Result<String> {
    env::var(key)
        .map_err(|_| AppError::Config(format!("Variable d'environnement manquante : {}", key)))
}

/// Récupère une variable d'environnement (Optionnel).
pub fn get_optional(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Récupère une variable d'environnement avec valeur par défaut.
pub fn get_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Récupère et parse une variable (ex: ARCHIPEL_SEED=42).
pub fn get_parsed<T: FromStr>(key: &str) -> Result<T> {
    let val = get(key)?;
    val.trim()
        .parse::<T>()
        .map_err(|_| AppError::Config(format!("Impossible de parser la variable : {}", key)))
}

/// Indique si une feature flag est active (ex: "true", "1", "yes").
pub fn is_enabled(key: &str) -> bool {
    matches!(
        get_optional(key).as_deref(),
        Some("true") | Some("1") | Some("yes") | Some("on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_parsed_and_flags() {
        env::set_var("ARCHIPEL_TEST_SEED", " 42 ");
        env::set_var("ARCHIPEL_TEST_FLAG", "yes");

        assert_eq!(get_parsed::<u64>("ARCHIPEL_TEST_SEED").unwrap(), 42);
        assert!(is_enabled("ARCHIPEL_TEST_FLAG"));

        env::set_var("ARCHIPEL_TEST_SEED", "abc");
        assert!(get_parsed::<u64>("ARCHIPEL_TEST_SEED").unwrap_err().is_config());

        env::remove_var("ARCHIPEL_TEST_SEED");
        env::remove_var("ARCHIPEL_TEST_FLAG");
        assert!(!is_enabled("ARCHIPEL_TEST_FLAG"));
        assert_eq!(get_or("ARCHIPEL_TEST_SEED", "7"), "7");
    }
}
