use rand::seq::SliceRandom;
use rand::{rng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::game::choice::ChosenSet;
use crate::{AppError, AppResult};

/// The shared grid. Holds each of `1..=rows*cols` exactly once, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

/// The first line of the card a chosen set covers, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinPattern {
    Row(usize),
    Column(usize),
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl fmt::Display for WinPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinPattern::Row(row) => write!(f, "Row #{}", row + 1),
            WinPattern::Column(col) => write!(f, "Column #{}", col + 1),
            WinPattern::Diagonal => write!(f, "Diagonal from top left to bottom right"),
            WinPattern::AntiDiagonal => write!(f, "Diagonal from top right to bottom left"),
        }
    }
}

impl Card {
    pub fn generate(rows: usize, cols: usize) -> AppResult<Self> {
        Self::generate_with(rows, cols, &mut rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> AppResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(AppError::InvalidCard {
                reason: "card is empty".to_string(),
            });
        }
        let mut cells: Vec<u32> = (1..=(rows * cols) as u32).collect();
        cells.shuffle(rng);
        Ok(Self { rows, cols, cells })
    }

    /// Builds a card from explicit rows, checking it is a permutation of `1..=R*C`.
    pub fn from_rows(grid: Vec<Vec<u32>>) -> AppResult<Self> {
        let rows = grid.len();
        let cols = grid.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(AppError::InvalidCard {
                reason: "card is empty".to_string(),
            });
        }
        if grid.iter().any(|row| row.len() != cols) {
            return Err(AppError::InvalidCard {
                reason: "all rows must be the same length".to_string(),
            });
        }

        let cells: Vec<u32> = grid.into_iter().flatten().collect();
        let max = (rows * cols) as u32;
        let mut seen = HashSet::with_capacity(cells.len());
        for &value in &cells {
            if value < 1 || value > max || !seen.insert(value) {
                return Err(AppError::InvalidCard {
                    reason: format!("{} breaks the permutation of 1..={}", value, max),
                });
            }
        }

        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.cols + col]
    }

    pub fn values(&self) -> &[u32] {
        &self.cells
    }

    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells.chunks(self.cols).map(<[u32]>::to_vec).collect()
    }

    /// Checks rows top to bottom, then columns left to right, then the two
    /// diagonals (square cards only). Stops at the first covered line.
    pub fn evaluate(&self, chosen: &ChosenSet) -> Option<WinPattern> {
        if chosen.is_empty() {
            return None;
        }

        let row_cells = |r: usize| (0..self.cols).map(move |c| self.get(r, c));
        let col_cells = |c: usize| (0..self.rows).map(move |r| self.get(r, c));

        if let Some(row) = (0..self.rows).find(|&r| covers(chosen, row_cells(r))) {
            return Some(WinPattern::Row(row));
        }
        if let Some(col) = (0..self.cols).find(|&c| covers(chosen, col_cells(c))) {
            return Some(WinPattern::Column(col));
        }
        if !self.is_square() {
            return None;
        }

        let n = self.rows;
        if covers(chosen, (0..n).map(|i| self.get(i, i))) {
            return Some(WinPattern::Diagonal);
        }
        if covers(chosen, (0..n).map(|i| self.get(i, n - 1 - i))) {
            return Some(WinPattern::AntiDiagonal);
        }
        None
    }

    pub fn is_win(&self, chosen: &ChosenSet) -> bool {
        self.evaluate(chosen).is_some()
    }
}

fn covers(chosen: &ChosenSet, mut cells: impl Iterator<Item = u32>) -> bool {
    cells.all(|n| chosen.contains(n))
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "-".repeat(self.cols * 5 + 1);
        writeln!(f, "{}", border)?;
        for row in self.cells.chunks(self.cols) {
            write!(f, "|")?;
            for value in row {
                write!(f, " {:02} |", value)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", border)
    }
}

// Travels as a list of rows; incoming grids are re-validated.
impl Serialize for Card {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let grid = Vec::<Vec<u32>>::deserialize(deserializer)?;
        Card::from_rows(grid).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_card() -> Card {
        Card::from_rows(vec![
            vec![7, 12, 3, 25, 18],
            vec![1, 9, 22, 14, 5],
            vec![20, 16, 11, 2, 23],
            vec![8, 24, 6, 19, 13],
            vec![15, 4, 21, 10, 17],
        ])
        .unwrap()
    }

    fn chosen(values: &[u32]) -> ChosenSet {
        ChosenSet::from_values(values.to_vec())
    }

    #[test]
    fn test_generate_is_a_permutation() {
        for (rows, cols) in [(5, 5), (3, 4), (1, 1), (6, 2)] {
            let card = Card::generate(rows, cols).unwrap();
            let mut values = card.values().to_vec();
            values.sort_unstable();

            let expected: Vec<u32> = (1..=(rows * cols) as u32).collect();
            assert_eq!(values, expected);
            assert_eq!(card.rows(), rows);
            assert_eq!(card.cols(), cols);
        }
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let first = Card::generate_with(5, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        let second = Card::generate_with(5, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_rejects_empty_dimensions() {
        for (rows, cols) in [(5, 0), (0, 5), (0, 0)] {
            assert!(matches!(
                Card::generate(rows, cols),
                Err(AppError::InvalidCard { .. })
            ));
        }
    }

    #[test]
    fn test_from_rows_rejects_non_permutations() {
        assert!(Card::from_rows(vec![vec![1, 2], vec![2, 3]]).is_err());
        assert!(Card::from_rows(vec![vec![1, 2], vec![3]]).is_err());
        assert!(Card::from_rows(vec![vec![1, 2], vec![3, 5]]).is_err());
        assert!(Card::from_rows(vec![]).is_err());
    }

    #[test]
    fn test_row_win_reports_first_row() {
        let card = sample_card();
        let pattern = card.evaluate(&chosen(&[7, 12, 3, 25, 18]));

        assert_eq!(pattern, Some(WinPattern::Row(0)));
        assert_eq!(pattern.unwrap().to_string(), "Row #1");
    }

    #[test]
    fn test_rows_are_checked_before_columns() {
        let card = sample_card();
        // Covers row 1 and column 0 at once.
        let values = [1, 9, 22, 14, 5, 7, 20, 8, 15];
        assert_eq!(card.evaluate(&chosen(&values)), Some(WinPattern::Row(1)));
    }

    #[test]
    fn test_column_win() {
        let card = sample_card();
        let pattern = card.evaluate(&chosen(&[25, 14, 2, 19, 10, 1]));
        assert_eq!(pattern, Some(WinPattern::Column(3)));
        assert_eq!(pattern.unwrap().to_string(), "Column #4");
    }

    #[test]
    fn test_diagonal_wins() {
        let card = sample_card();
        assert_eq!(
            card.evaluate(&chosen(&[7, 9, 11, 19, 17])),
            Some(WinPattern::Diagonal)
        );
        assert_eq!(
            card.evaluate(&chosen(&[18, 14, 11, 24, 15])),
            Some(WinPattern::AntiDiagonal)
        );
    }

    #[test]
    fn test_near_miss_is_not_a_win() {
        let card = sample_card();
        assert!(!card.is_win(&chosen(&[7, 12, 3, 25, 1, 9, 22, 14, 20, 16])));
    }

    #[test]
    fn test_empty_choice_never_wins() {
        let card = sample_card();
        assert_eq!(card.evaluate(&ChosenSet::default()), None);

        let single = Card::from_rows(vec![vec![1]]).unwrap();
        assert_eq!(single.evaluate(&ChosenSet::default()), None);
        assert_eq!(single.evaluate(&chosen(&[1])), Some(WinPattern::Row(0)));
    }

    #[test]
    fn test_rectangular_card_skips_diagonals() {
        let card = Card::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        // 1 and 5 would be the "diagonal" of the leading square.
        assert_eq!(card.evaluate(&chosen(&[1, 5])), None);
        assert_eq!(card.evaluate(&chosen(&[3, 6])), Some(WinPattern::Column(2)));
    }

    #[test]
    fn test_display_pads_numbers() {
        let card = Card::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let rendered = card.to_string();
        assert!(rendered.contains("| 01 | 02 |"));
        assert!(rendered.contains("| 03 | 04 |"));
    }

    #[test]
    fn test_serializes_as_rows() {
        let card = Card::from_rows(vec![vec![2, 1], vec![4, 3]]).unwrap();
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "[[2,1],[4,3]]");

        let parsed: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, card);
        assert!(serde_json::from_str::<Card>("[[1,1],[2,3]]").is_err());
    }
}
