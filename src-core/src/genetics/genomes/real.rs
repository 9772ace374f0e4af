use crate::genetics::traits::{Gene, NumericGene};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Gène réel borné : tirage uniforme dans `[lower, upper]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RealGene {
    value: Option<f64>,
    lower: f64,
    upper: f64,
    valid: bool,
}

impl RealGene {
    pub fn new(value: f64, lower: f64, upper: f64) -> Self {
        let (lower, upper) = ordered(lower, upper);
        let mut gene = Self {
            value: None,
            lower,
            upper,
            valid: true,
        };
        gene.set_value(value);
        gene
    }

    /// Gène vide (sentinelle) portant uniquement son domaine : sert de prototype.
    pub fn empty(lower: f64, upper: f64) -> Self {
        let (lower, upper) = ordered(lower, upper);
        Self {
            value: None,
            lower,
            upper,
            valid: false,
        }
    }
}

/// Bornes finies et ordonnées : un domaine non fini rendrait le tirage impossible.
fn ordered(a: f64, b: f64) -> (f64, f64) {
    let (a, b) = (finite_bound(a), finite_bound(b));
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// NaN devient 0, l'infini est ramené à ±`MAX_BOUND`.
fn finite_bound(bound: f64) -> f64 {
    if bound.is_finite() {
        return bound.clamp(-MAX_BOUND, MAX_BOUND);
    }
    tracing::warn!(bound, "Borne non finie pour un gène réel, valeur ramenée");
    if bound.is_nan() {
        0.0
    } else {
        bound.signum() * MAX_BOUND
    }
}

// L'échelle du tirage uniforme, légèrement supérieure à `upper - lower`, doit rester finie.
const MAX_BOUND: f64 = f64::MAX / 4.0;

impl PartialEq for RealGene {
    fn eq(&self, other: &Self) -> bool {
        self.value.map(f64::to_bits) == other.value.map(f64::to_bits)
    }
}

impl Eq for RealGene {}

impl Hash for RealGene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.map(f64::to_bits).hash(state);
    }
}

impl Gene for RealGene {
    type Value = f64;

    fn value(&self) -> Option<&f64> {
        self.value.as_ref()
    }

    /// Une valeur non finie remet le gène à la sentinelle vide.
    fn set_value(&mut self, value: f64) {
        self.value = if value.is_finite() {
            Some(value.clamp(self.lower, self.upper))
        } else {
            None
        };
    }

    fn clear(&mut self) {
        self.value = None;
    }

    fn randomize(&self, rng: &mut dyn RngCore) -> f64 {
        if self.lower == self.upper {
            return self.lower;
        }
        rng.random_range(self.lower..=self.upper)
    }

    fn is_flagged_valid(&self) -> bool {
        self.valid
    }

    fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    fn render(&self) -> String {
        match self.value {
            Some(v) => format!("{:.4}", v),
            None => "∅".to_string(),
        }
    }
}

impl NumericGene for RealGene {
    fn as_f64(&self) -> Option<f64> {
        self.value
    }

    fn set_f64(&mut self, value: f64) {
        self.set_value(value);
    }

    fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }
}
