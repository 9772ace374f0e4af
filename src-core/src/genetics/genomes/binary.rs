use crate::genetics::traits::Gene;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Gène binaire (tirage uniforme sur {0, 1}).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BinaryGene {
    value: Option<bool>,
    valid: bool,
}

impl BinaryGene {
    pub fn new(value: bool) -> Self {
        Self {
            value: Some(value),
            valid: true,
        }
    }

    pub fn empty() -> Self {
        Self {
            value: None,
            valid: false,
        }
    }

    pub fn is_set(&self) -> bool {
        self.value == Some(true)
    }
}

impl PartialEq for BinaryGene {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for BinaryGene {}

impl Hash for BinaryGene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Gene for BinaryGene {
    type Value = bool;

    fn value(&self) -> Option<&bool> {
        self.value.as_ref()
    }

    fn set_value(&mut self, value: bool) {
        self.value = Some(value);
    }

    fn clear(&mut self) {
        self.value = None;
    }

    fn randomize(&self, rng: &mut dyn RngCore) -> bool {
        rng.random_bool(0.5)
    }

    fn is_flagged_valid(&self) -> bool {
        self.valid
    }

    fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    fn render(&self) -> String {
        match self.value {
            Some(true) => "1".to_string(),
            Some(false) => "0".to_string(),
            None => "∅".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_render_and_equality() {
        assert_eq!(BinaryGene::new(true).render(), "1");
        assert_eq!(BinaryGene::empty().render(), "∅");

        let mut flagged = BinaryGene::new(true);
        flagged.set_valid(false);
        // L'égalité ne regarde que la valeur
        assert_eq!(flagged, BinaryGene::new(true));
        assert!(!flagged.is_valid());
    }
}
