use super::traits::{Evaluator, Gene};
use crate::utils::prelude::*;
use crate::utils::{BTreeMap, Ordering};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Un individu : une séquence ordonnée de gènes + sa fitness en cache.
///
/// La fitness vaut `NaN` tant que l'individu n'a pas été évalué (ou après
/// toute modification structurelle). L'égalité et le hachage ne portent que
/// sur le génome. `clone()` copie intégralement les gènes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chromosome<G> {
    genome: Vec<G>,
    #[serde(with = "nan_as_null")]
    fitness: f64,
    valid: bool,
}

impl<G: Gene> Chromosome<G> {
    pub fn new(genome: Vec<G>) -> Self {
        Self {
            genome,
            fitness: f64::NAN,
            valid: true,
        }
    }

    pub fn len(&self) -> usize {
        self.genome.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genome.is_empty()
    }

    pub fn genes(&self) -> &[G] {
        &self.genome
    }

    /// Accès mutable au génome. L'appelant est responsable d'invalider la fitness.
    pub fn genes_mut(&mut self) -> &mut [G] {
        &mut self.genome
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub fn invalidate_fitness(&mut self) {
        self.fitness = f64::NAN;
    }

    pub fn is_evaluated(&self) -> bool {
        !self.fitness.is_nan()
    }

    /// Évalue l'individu si sa fitness est périmée. Renvoie true si l'évaluateur a été appelé.
    pub fn evaluate_with(&mut self, evaluator: &dyn Evaluator<G>) -> bool {
        if self.is_evaluated() {
            return false;
        }
        self.fitness = evaluator.evaluate(self);
        true
    }

    pub fn is_flagged_valid(&self) -> bool {
        self.valid
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Valide si le drapeau est levé et que tous les gènes sont valides.
    pub fn is_valid(&self) -> bool {
        self.valid && self.genome.iter().all(Gene::is_valid)
    }

    pub fn invalid_gene_count(&self) -> usize {
        self.genome.iter().filter(|g| !g.is_valid()).count()
    }

    /// Nombre de loci dont les gènes diffèrent.
    pub fn hamming_distance(&self, other: &Self) -> usize {
        let mismatched = self
            .genome
            .iter()
            .zip(other.genome.iter())
            .filter(|(a, b)| a != b)
            .count();
        mismatched + self.genome.len().abs_diff(other.genome.len())
    }

    /// Compare deux individus par fitness, `NaN` étant considéré comme le pire.
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        match (self.fitness.is_nan(), other.fitness.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .fitness
                .partial_cmp(&other.fitness)
                .unwrap_or(Ordering::Equal),
        }
    }

    pub fn render_genome(&self) -> Vec<String> {
        self.genome.iter().map(Gene::render).collect()
    }
}

impl<G: PartialEq> PartialEq for Chromosome<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome
    }
}

impl<G: Eq> Eq for Chromosome<G> {}

impl<G: Hash> Hash for Chromosome<G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.genome.hash(state);
    }
}

impl<G: Gene> fmt::Display for Chromosome<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] (f = {:.6})", self.render_genome().join(", "), self.fitness)
    }
}

/// Indice du meilleur individu (fitness maximale, les non-évalués sont ignorés).
pub fn best_index<G: Gene>(population: &[Chromosome<G>]) -> Option<usize> {
    population
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_evaluated())
        .max_by(|(_, a), (_, b)| a.cmp_fitness(b))
        .map(|(idx, _)| idx)
}

pub fn best_of<G: Gene>(population: &[Chromosome<G>]) -> Option<&Chromosome<G>> {
    best_index(population).map(|idx| &population[idx])
}

/// Une île : sous-population identifiée, possédée par le moteur entre deux périodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubPopulation<G> {
    pub id: usize,
    pub members: Vec<Chromosome<G>>,
}

impl<G: Gene> SubPopulation<G> {
    pub fn new(id: usize, members: Vec<Chromosome<G>>) -> Self {
        Self { id, members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn best(&self) -> Option<&Chromosome<G>> {
        best_of(&self.members)
    }
}

/// Clé des statistiques : globale ou par île.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatsKey {
    Global,
    Island(usize),
}

impl fmt::Display for StatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsKey::Global => write!(f, "global"),
            StatsKey::Island(id) => write!(f, "island-{}", id),
        }
    }
}

/// Historique (append-only pendant un run) des moyennes / écarts-types de fitness.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessHistory {
    pub avg: Vec<f64>,
    pub std: Vec<f64>,
}

impl FitnessHistory {
    pub fn push(&mut self, mean: f64, std: f64) {
        self.avg.push(mean);
        self.std.push(std);
    }

    pub fn len(&self) -> usize {
        self.avg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avg.is_empty()
    }

    pub fn extend(&mut self, other: &FitnessHistory) {
        self.avg.extend_from_slice(&other.avg);
        self.std.extend_from_slice(&other.std);
    }
}

/// Statistiques d'un run, vidées au début de chaque `run()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    entries: BTreeMap<StatsKey, FitnessHistory>,
}

impl Statistics {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn record(&mut self, key: StatsKey, mean: f64, std: f64) {
        self.entries.entry(key).or_default().push(mean, std);
    }

    pub fn append(&mut self, key: StatsKey, history: &FitnessHistory) {
        self.entries.entry(key).or_default().extend(history);
    }

    pub fn get(&self, key: StatsKey) -> Option<&FitnessHistory> {
        self.entries.get(&key)
    }

    pub fn global(&self) -> Option<&FitnessHistory> {
        self.get(StatsKey::Global)
    }

    pub fn island(&self, id: usize) -> Option<&FitnessHistory> {
        self.get(StatsKey::Island(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatsKey, &FitnessHistory)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vue sérialisable (clés textuelles).
    pub fn to_named(&self) -> BTreeMap<String, FitnessHistory> {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

// JSON ne connaît pas NaN : une fitness non évaluée est sérialisée en `null`.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
