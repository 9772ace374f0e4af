// src-core/src/genetics/traits.rs

use super::types::Chromosome;
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Le trait Gene définit la plus petite unité manipulable par l'AG.
///
/// Un gène porte une valeur (ou la sentinelle « vide », représentée par `None`),
/// sa propre règle de tirage aléatoire et un drapeau de validité.
/// L'égalité et le hachage ne portent que sur la valeur.
pub trait Gene:
    Clone + Debug + PartialEq + Eq + Hash + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Value: Clone + Debug + Display + PartialEq + Send + Sync;

    /// Valeur courante, `None` pour la sentinelle vide.
    fn value(&self) -> Option<&Self::Value>;

    /// Remplace la valeur (les encodages bornés la ramènent dans leur domaine).
    fn set_value(&mut self, value: Self::Value);

    /// Remet le gène à la sentinelle vide.
    fn clear(&mut self);

    /// Tire une nouvelle valeur valide, sans modifier le gène.
    fn randomize(&self, rng: &mut dyn RngCore) -> Self::Value;

    fn is_flagged_valid(&self) -> bool;

    fn set_valid(&mut self, valid: bool);

    /// Un gène vide n'est jamais valide, quel que soit son drapeau.
    fn is_valid(&self) -> bool {
        self.is_flagged_valid() && self.value().is_some()
    }

    /// Rend le gène valide en lui assignant une valeur tirée par `randomize`.
    fn reset(&mut self, rng: &mut dyn RngCore) {
        let value = self.randomize(rng);
        self.set_value(value);
        self.set_valid(true);
    }

    /// Représentation textuelle (rapports, logs).
    fn render(&self) -> String {
        match self.value() {
            Some(v) => v.to_string(),
            None => "∅".to_string(),
        }
    }
}

/// Gènes à valeur numérique bornée, requis par les mutations gaussienne et polynomiale.
pub trait NumericGene: Gene {
    fn as_f64(&self) -> Option<f64>;

    /// Affecte une valeur réelle, ramenée dans les bornes (et arrondie si entière).
    fn set_f64(&mut self, value: f64);

    fn bounds(&self) -> (f64, f64);
}

/// Le trait Evaluator fait le lien avec le métier : c'est la fonction de fitness.
///
/// Elle doit être référentiellement transparente, car les îles l'appellent
/// en parallèle depuis plusieurs threads. Convention : on MAXIMISE.
pub trait Evaluator<G: Gene>: Send + Sync {
    fn evaluate(&self, chromosome: &Chromosome<G>) -> f64;

    /// Nom de l'objectif (pour l'affichage/debug)
    fn name(&self) -> String {
        "fitness".to_string()
    }
}

// Toute closure `Fn(&Chromosome<G>) -> f64` est un évaluateur.
impl<G, F> Evaluator<G> for F
where
    G: Gene,
    F: Fn(&Chromosome<G>) -> f64 + Send + Sync,
{
    fn evaluate(&self, chromosome: &Chromosome<G>) -> f64 {
        self(chromosome)
    }
}
