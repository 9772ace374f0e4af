use super::traits::Gene;
use super::types::Chromosome;

/// Moyenne et écart-type (population) des fitness.
///
/// Une fitness non évaluée (`NaN`) se propage : c'est à l'appelant de
/// rejeter les statistiques non finies.
pub fn fitness_moments<G: Gene>(population: &[Chromosome<G>]) -> (f64, f64) {
    if population.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = population.len() as f64;
    let mean = population.iter().map(Chromosome::fitness).sum::<f64>() / n;
    let variance = population
        .iter()
        .map(|c| (c.fitness() - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

/// Distance de Hamming moyenne entre toutes les paires, normalisée par la longueur du génome.
///
/// 0.0 = population homogène, 1.0 = tous les loci diffèrent pour toutes les paires.
pub fn genetic_diversity<G: Gene>(population: &[Chromosome<G>]) -> f64 {
    let n = population.len();
    let genome_len = population.first().map(Chromosome::len).unwrap_or(0);
    if n < 2 || genome_len == 0 {
        return 0.0;
    }

    let mut total = 0usize;
    for (i, a) in population.iter().enumerate() {
        for b in &population[i + 1..] {
            total += a.hamming_distance(b);
        }
    }
    let pairs = (n * (n - 1) / 2) as f64;
    total as f64 / pairs / genome_len as f64
}
