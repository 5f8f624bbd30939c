use std::str::FromStr;

use rand::Rng;

use crate::board::{Board, Point, neighbors};
use crate::error::{Error, Result};

/// What the minefield answers when a cell is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Clue(u8),
    Mine,
}

/// The ground-truth board an agent plays against. Agents only ever see what `reveal` returns.
pub trait Field {
    /// `(width, height)`.
    fn dimensions(&self) -> (usize, usize);
    /// Reveals exactly one cell. Revealing a cell twice is a caller error.
    fn reveal(&mut self, at: Point) -> Result<Reveal>;
    /// Whether every non-mine cell has been revealed.
    fn is_solved(&self) -> bool;
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// A minefield with a fixed mine layout.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Minefield {
    pub width: usize,
    pub height: usize,
    mines: Vec<bool>,
    revealed: Vec<bool>,
    pub game_state: GameState,
}

impl Minefield {
    pub fn from_mines(width: usize, height: usize, mines: &[Point]) -> Result<Self> {
        let mut layout = vec![false; width * height];
        for &mine in mines {
            if mine.x >= width || mine.y >= height {
                return Err(Error::OutOfBounds(mine));
            }
            layout[mine.y * width + mine.x] = true;
        }
        Ok(Self::from_layout(width, height, layout))
    }

    fn from_layout(width: usize, height: usize, mines: Vec<bool>) -> Self {
        let mut field = Minefield {
            width,
            height,
            revealed: vec![false; mines.len()],
            mines,
            game_state: GameState::Playing,
        };
        if field.remaining_safe() == 0 {
            field.game_state = GameState::Won;
        }
        field
    }

    /// Scatters `mines` mines uniformly. The optional `safe` cell never holds one, so a first move
    /// there cannot explode.
    pub fn random(
        width: usize,
        height: usize,
        mines: usize,
        safe: Option<Point>,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let cells = width * height;
        let safe = safe.map(|p| p.y * width + p.x).filter(|&i| i < cells);
        let candidates: Vec<usize> = (0..cells).filter(|&i| Some(i) != safe).collect();
        if mines >= cells || mines > candidates.len() {
            return Err(Error::InvalidLayout(format!(
                "{mines} mines do not fit a {width}x{height} board"
            )));
        }

        let mut layout = vec![false; cells];
        for picked in rand::seq::index::sample(rng, candidates.len(), mines) {
            layout[candidates[picked]] = true;
        }
        Ok(Self::from_layout(width, height, layout))
    }

    /// Deserializes a game state from bytes, rejecting states whose grids do not match their
    /// dimensions.
    pub fn from_bytes(bts: &[u8]) -> Result<Self> {
        let field: Minefield =
            bcs::from_bytes(bts).map_err(|e| Error::Serialization(e.to_string()))?;
        let cells = field.width.checked_mul(field.height);
        if cells != Some(field.mines.len()) || cells != Some(field.revealed.len()) {
            return Err(Error::InvalidLayout(format!(
                "{}x{} field with {} mine flags and {} reveal flags",
                field.width,
                field.height,
                field.mines.len(),
                field.revealed.len()
            )));
        }
        Ok(field)
    }

    /// Serializes the game state to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bcs::to_bytes(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn is_mine(&self, at: Point) -> bool {
        self.mines[at.y * self.width + at.x]
    }

    pub fn is_revealed(&self, at: Point) -> bool {
        self.revealed[at.y * self.width + at.x]
    }

    pub fn mine_count(&self) -> usize {
        self.mines.iter().filter(|&&m| m).count()
    }

    fn remaining_safe(&self) -> usize {
        self.mines
            .iter()
            .zip(&self.revealed)
            .filter(|&(&mine, &revealed)| !mine && !revealed)
            .count()
    }

    fn adjacent_mines(&self, at: Point) -> u8 {
        neighbors(self.width, self.height, at)
            .filter(|&p| self.is_mine(p))
            .count() as u8
    }

    /// What revealing `at` showed, `None` while it is still covered.
    pub fn revealed_at(&self, at: Point) -> Option<Reveal> {
        if !self.is_revealed(at) {
            return None;
        }
        Some(if self.is_mine(at) {
            Reveal::Mine
        } else {
            Reveal::Clue(self.adjacent_mines(at))
        })
    }

    /// The board exactly as a player sees it: revealed clues, everything else hidden. A lost game
    /// has no such view, since a player board cannot hold an exploded cell.
    pub fn knowledge(&self) -> Result<Board> {
        let mut board = Board::new(self.width, self.height);
        for index in (0..self.revealed.len()).filter(|&i| self.revealed[i]) {
            if self.mines[index] {
                return Err(Error::GameOver);
            }
            let point = board.point(index);
            board.uncover(point, self.adjacent_mines(point))?;
        }
        Ok(board)
    }
}

impl Field for Minefield {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn reveal(&mut self, at: Point) -> Result<Reveal> {
        if at.x >= self.width || at.y >= self.height {
            return Err(Error::OutOfBounds(at));
        }
        if self.game_state != GameState::Playing {
            return Err(Error::GameOver);
        }
        let index = at.y * self.width + at.x;
        if self.revealed[index] {
            return Err(Error::AlreadyRevealed(at));
        }

        self.revealed[index] = true;
        if self.mines[index] {
            self.game_state = GameState::Lost;
            return Ok(Reveal::Mine);
        }
        if self.remaining_safe() == 0 {
            self.game_state = GameState::Won;
        }
        Ok(Reveal::Clue(self.adjacent_mines(at)))
    }

    fn is_solved(&self) -> bool {
        self.game_state == GameState::Won
    }
}

/// Parses a text layout: one line per row, `*` for a mine and `.` for a safe cell.
impl FromStr for Minefield {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(Error::InvalidLayout("empty layout".to_string()));
        }

        let mut layout = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(Error::InvalidLayout(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            for c in row.chars() {
                match c {
                    '*' => layout.push(true),
                    '.' => layout.push(false),
                    other => {
                        return Err(Error::InvalidLayout(format!(
                            "unexpected character {other:?} in row {y}"
                        )));
                    }
                }
            }
        }
        Ok(Self::from_layout(width, rows.len(), layout))
    }
}
