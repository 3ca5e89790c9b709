//! Tic-tac-toe board.
//!
//! Nine cells, two players taking strict turns. There is no win or draw
//! detection: the game continues until the board is reset.

use std::fmt;
use strum::Display;

pub const BOARD_SIZE: usize = 3;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Player {
    #[strum(serialize = "X")]
    X,
    #[strum(serialize = "O")]
    O,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Marked(Player),
}

/// Result of a tap. Rejected taps leave the board untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Marked(Player),
    Occupied,
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameBoard {
    cells: [Cell; CELL_COUNT],
    current_player: Player,
}

impl GameBoard {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
            current_player: Player::X,
        }
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Mark the cell for the current player and pass the turn.
    pub fn tap(&mut self, index: usize) -> TapOutcome {
        let Some(cell) = self.cells.get_mut(index) else {
            return TapOutcome::OutOfRange;
        };
        if *cell != Cell::Empty {
            return TapOutcome::Occupied;
        }

        let player = self.current_player;
        *cell = Cell::Marked(player);
        self.current_player = player.other();
        TapOutcome::Marked(player)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(BOARD_SIZE) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => ".".to_string(),
                    Cell::Marked(player) => player.to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
