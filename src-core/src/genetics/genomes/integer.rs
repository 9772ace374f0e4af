use crate::genetics::traits::{Gene, NumericGene};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Gène entier borné (bornes incluses).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntegerGene {
    value: Option<i64>,
    lower: i64,
    upper: i64,
    valid: bool,
}

impl IntegerGene {
    pub fn new(value: i64, lower: i64, upper: i64) -> Self {
        let (lower, upper) = (lower.min(upper), lower.max(upper));
        Self {
            value: Some(value.clamp(lower, upper)),
            lower,
            upper,
            valid: true,
        }
    }

    pub fn empty(lower: i64, upper: i64) -> Self {
        Self {
            value: None,
            lower: lower.min(upper),
            upper: lower.max(upper),
            valid: false,
        }
    }
}

impl PartialEq for IntegerGene {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for IntegerGene {}

impl Hash for IntegerGene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Gene for IntegerGene {
    type Value = i64;

    fn value(&self) -> Option<&i64> {
        self.value.as_ref()
    }

    fn set_value(&mut self, value: i64) {
        self.value = Some(value.clamp(self.lower, self.upper));
    }

    fn clear(&mut self) {
        self.value = None;
    }

    fn randomize(&self, rng: &mut dyn RngCore) -> i64 {
        rng.random_range(self.lower..=self.upper)
    }

    fn is_flagged_valid(&self) -> bool {
        self.valid
    }

    fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
}

impl NumericGene for IntegerGene {
    fn as_f64(&self) -> Option<f64> {
        self.value.map(|v| v as f64)
    }

    fn set_f64(&mut self, value: f64) {
        if value.is_finite() {
            self.set_value(value.round() as i64);
        } else {
            self.value = None;
        }
    }

    fn bounds(&self) -> (f64, f64) {
        (self.lower as f64, self.upper as f64)
    }
}
