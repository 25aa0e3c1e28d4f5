use super::types::{Cell, Mark};
use crate::error::{GameError, Result};
use std::fmt;

pub const BOARD_SIZE: usize = 3;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

// 3 rows, 3 columns, 2 diagonals.
const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 3x3 grid plus the moves that produced it, in play order. Cells are
/// addressed by (row, col); cell index = row * 3 + col. Cloning yields an
/// independent snapshot, which is how the search explores hypothetical
/// futures without touching the live board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
    moves: Vec<(usize, usize)>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
            moves: Vec::with_capacity(CELL_COUNT),
        }
    }

    pub fn cells(&self) -> [Cell; CELL_COUNT] {
        self.cells
    }

    pub fn moves(&self) -> &[(usize, usize)] {
        &self.moves
    }

    /// Empty cells in ascending index order. The fixed order keeps the
    /// search deterministic.
    pub fn legal_moves(&self) -> Vec<(usize, usize)> {
        let mut moves = Vec::new();
        for (index, cell) in self.cells.iter().enumerate() {
            if cell.is_empty() {
                moves.push((index / BOARD_SIZE, index % BOARD_SIZE));
            }
        }
        moves
    }

    pub fn apply_move(&mut self, row: usize, col: usize, mark: Mark) -> Result<()> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(GameError::IllegalMove { row, col });
        }

        let index = row * BOARD_SIZE + col;
        if !self.cells[index].is_empty() {
            return Err(GameError::IllegalMove { row, col });
        }

        self.cells[index] = Cell::from(mark);
        self.moves.push((row, col));
        Ok(())
    }

    pub fn winner(&self) -> Option<Mark> {
        for [a, b, c] in WIN_LINES {
            let cell = self.cells[a];
            if !cell.is_empty() && cell == self.cells[b] && cell == self.cells[c] {
                return cell.mark();
            }
        }
        None
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.moves.last().copied()
    }

    #[cfg(test)]
    pub(crate) fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        let moves = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(index, _)| (index / BOARD_SIZE, index % BOARD_SIZE))
            .collect();
        Self { cells, moves }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.cells[row * BOARD_SIZE + col])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
