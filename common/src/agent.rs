use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::board::{Board, Point};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::field::{Field, Reveal};

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continuing,
    Solved,
    Exploded,
}

/// A Minesweeper player. It only learns about the field through the clues it is shown.
pub trait Agent {
    /// Picks the next cell to reveal.
    fn decide_next_move(&mut self) -> Result<Point>;

    /// Feeds back what revealing `at` produced. `solved` is the field's own verdict after the
    /// reveal.
    fn observe(&mut self, at: Point, reveal: Reveal, solved: bool) -> Result<Outcome>;

    /// The agent's current view of the board.
    fn board(&self) -> &Board;

    /// Decides, reveals and observes once.
    fn step(&mut self, field: &mut dyn Field) -> Result<Outcome> {
        let at = self.decide_next_move()?;
        let reveal = field.reveal(at)?;
        self.observe(at, reveal, field.is_solved())
    }

    /// Steps until the game is won or lost.
    fn play(&mut self, field: &mut dyn Field) -> Result<Outcome> {
        if field.is_solved() {
            return Ok(Outcome::Solved);
        }
        loop {
            match self.step(field)? {
                Outcome::Continuing => continue,
                outcome => return Ok(outcome),
            }
        }
    }
}

/// Records a reveal on `board` and maps it to an outcome.
pub(crate) fn record_reveal(
    board: &mut Board,
    at: Point,
    reveal: Reveal,
    solved: bool,
) -> Result<Outcome> {
    match reveal {
        Reveal::Mine => Ok(Outcome::Exploded),
        Reveal::Clue(clue) => {
            board.uncover(at, clue)?;
            Ok(if solved {
                Outcome::Solved
            } else {
                Outcome::Continuing
            })
        }
    }
}

/// Baseline player: the configured first move, then uniformly random hidden cells.
pub struct RandomAgent {
    board: Board,
    config: Config,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(width: usize, height: usize, config: Config) -> Self {
        RandomAgent {
            board: Board::new(width, height),
            rng: config.rng(),
            config,
        }
    }
}

impl Agent for RandomAgent {
    fn decide_next_move(&mut self) -> Result<Point> {
        let at = if !self.board.has_revealed() && self.board.contains(self.config.first_move) {
            self.config.first_move
        } else {
            let index = *self
                .board
                .hidden_cells()
                .choose(&mut self.rng)
                .ok_or(Error::NoCandidate)?;
            self.board.point(index)
        };
        if self.config.verbose {
            info!(x = at.x, y = at.y, "random agent reveals");
        }
        Ok(at)
    }

    fn observe(&mut self, at: Point, reveal: Reveal, solved: bool) -> Result<Outcome> {
        record_reveal(&mut self.board, at, reveal, solved)
    }

    fn board(&self) -> &Board {
        &self.board
    }
}
