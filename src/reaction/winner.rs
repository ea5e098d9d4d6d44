use serde::{Deserialize, Serialize};

use crate::score::McsSolution;

/// Educt × product similarity, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.cols + col] = value;
    }
}

/// Tanimoto similarity of two graphs sharing `mapped` atoms.
pub fn tanimoto(source_atoms: usize, target_atoms: usize, mapped: usize) -> f64 {
    let union = (source_atoms + target_atoms).saturating_sub(mapped);
    if union == 0 {
        0.0
    } else {
        mapped as f64 / union as f64
    }
}

/// Greedy one-to-one assignment of educts to products.
///
/// `best` holds the top-ranked solution of every cell, row-major. Each round
/// takes the free cells of highest similarity and breaks ties by stereo
/// score, energy and carbon matches; the winner's row and column are then
/// closed. Stops when no free cell has a positive similarity.
pub fn choose_winners(similarity: &SimilarityMatrix, best: &[McsSolution]) -> Vec<McsSolution> {
    assert_eq!(
        best.len(),
        similarity.rows() * similarity.cols(),
        "one solution per matrix cell"
    );
    let mut row_used = vec![false; similarity.rows()];
    let mut col_used = vec![false; similarity.cols()];
    let mut winners = Vec::new();

    loop {
        let free: Vec<(usize, usize)> = (0..similarity.rows())
            .filter(|&i| !row_used[i])
            .flat_map(|i| (0..similarity.cols()).map(move |j| (i, j)))
            .filter(|&(_, j)| !col_used[j])
            .collect();
        let top = free
            .iter()
            .map(|&(i, j)| similarity.get(i, j))
            .fold(0.0_f64, f64::max);
        if top <= 0.0 {
            break;
        }
        let candidates: Vec<&McsSolution> = free
            .iter()
            .filter(|&&(i, j)| similarity.get(i, j) == top)
            .map(|&(i, j)| &best[i * similarity.cols() + j])
            .collect();
        let Some(winner) = break_tie(&candidates) else {
            break;
        };
        row_used[winner.query_position] = true;
        col_used[winner.target_position] = true;
        winners.push(winner.clone());
    }
    winners
}

fn break_tie<'a>(candidates: &[&'a McsSolution]) -> Option<&'a McsSolution> {
    let max_stereo = candidates
        .iter()
        .map(|s| s.stereo_score)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_energy = candidates
        .iter()
        .map(|s| s.energy)
        .fold(f64::INFINITY, f64::min);
    let max_carbons = candidates.iter().map(|s| s.carbon_matches).max()?;

    let first = |keep: &dyn Fn(&McsSolution) -> bool| candidates.iter().copied().find(|s| keep(s));
    first(&|s| s.stereo_score == max_stereo && s.energy == min_energy && s.carbon_matches == max_carbons)
        .or_else(|| first(&|s| s.stereo_score == max_stereo && s.energy == min_energy))
        .or_else(|| first(&|s| s.energy == min_energy))
        .or_else(|| candidates.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: usize, col: usize, stereo: f64, energy: f64, carbons: usize) -> McsSolution {
        McsSolution {
            stereo_score: stereo,
            energy,
            carbon_matches: carbons,
            ..McsSolution::empty(row, col)
        }
    }

    fn matrix(rows: usize, cols: usize, values: &[f64]) -> SimilarityMatrix {
        let mut m = SimilarityMatrix::new(rows, cols);
        for (k, &v) in values.iter().enumerate() {
            m.set(k / cols, k % cols, v);
        }
        m
    }

    fn positions(winners: &[McsSolution]) -> Vec<(usize, usize)> {
        winners
            .iter()
            .map(|w| (w.query_position, w.target_position))
            .collect()
    }

    fn grid(rows: usize, cols: usize) -> Vec<McsSolution> {
        (0..rows * cols)
            .map(|k| cell(k / cols, k % cols, 0.0, 0.0, 0))
            .collect()
    }

    #[test]
    fn tanimoto_values() {
        assert_eq!(tanimoto(6, 7, 6), 6.0 / 7.0);
        assert_eq!(tanimoto(3, 3, 3), 1.0);
        assert_eq!(tanimoto(0, 0, 0), 0.0);
    }

    #[test]
    fn highest_similarity_wins_and_closes_row_and_column() {
        let similarity = matrix(2, 2, &[0.9, 0.5, 0.8, 0.4]);
        let winners = choose_winners(&similarity, &grid(2, 2));
        assert_eq!(positions(&winners), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn zero_similarity_never_wins() {
        let similarity = matrix(2, 1, &[0.5, 0.0]);
        let winners = choose_winners(&similarity, &grid(2, 1));
        assert_eq!(positions(&winners), vec![(0, 0)]);
    }

    #[test]
    fn tie_prefers_stereo_energy_and_carbons_together() {
        let similarity = matrix(1, 3, &[0.5, 0.5, 0.5]);
        let best = vec![
            cell(0, 0, 2.0, 10.0, 1),
            cell(0, 1, 2.0, 10.0, 3),
            cell(0, 2, 1.0, 5.0, 3),
        ];
        // no cell has max stereo and min energy at once; min energy decides
        assert_eq!(positions(&choose_winners(&similarity, &best)), vec![(0, 2)]);

        let best = vec![
            cell(0, 0, 2.0, 5.0, 1),
            cell(0, 1, 2.0, 5.0, 3),
            cell(0, 2, 1.0, 5.0, 4),
        ];
        // stereo and energy agree on two cells, but none also has max carbons
        assert_eq!(positions(&choose_winners(&similarity, &best)), vec![(0, 0)]);

        let best = vec![
            cell(0, 0, 2.0, 5.0, 1),
            cell(0, 1, 2.0, 5.0, 3),
            cell(0, 2, 1.0, 6.0, 2),
        ];
        assert_eq!(positions(&choose_winners(&similarity, &best)), vec![(0, 1)]);
    }

    #[test]
    fn full_tie_takes_row_major_first() {
        let similarity = matrix(2, 2, &[0.5, 0.5, 0.5, 0.5]);
        let winners = choose_winners(&similarity, &grid(2, 2));
        assert_eq!(positions(&winners), vec![(0, 0), (1, 1)]);
    }
}
