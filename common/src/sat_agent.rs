use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::agent::{Agent, Outcome, record_reveal};
use crate::board::{Board, Point};
use crate::config::Config;
use crate::deduce::deduce;
use crate::encoder::encode;
use crate::error::{Error, Result};
use crate::estimate::{pick, sample};
use crate::field::Reveal;

/// Where the decision policy currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing revealed yet; the configured first move is played blind.
    FirstMove,
    /// Encode the clues and try to prove cells safe or mined.
    Deduce,
    /// Reveal cells proven safe by an earlier deduction, without re-solving.
    ConsumeSafeQueue,
    /// Nothing provable; reveal the cell safe in most sampled models.
    Estimate,
    /// Reveal a uniformly random hidden cell. Reached when no clue touches any hidden cell, or
    /// when the sampling budget ran out before a single model was drawn.
    RandomFallback,
    Solved,
    Exploded,
}

/// Counters over one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Stats {
    pub steps: usize,
    pub deduction_passes: usize,
    pub proven_safe: usize,
    pub proven_mines: usize,
    pub estimates: usize,
    pub random_guesses: usize,
    /// Model samplings that ran out of time, including those that drew no model at all.
    pub interrupted_samplings: usize,
}

/// The SAT-backed player.
///
/// Each decision either pops a cell proven safe earlier, or runs a fresh deduction pass over the
/// current clues. Cells proven to be mines are flagged on the board for the rest of the game and
/// drop out of every later formula. Only when a pass proves nothing safe does the agent fall back
/// to sampled probabilities, and only when no clue constrains anything to a random guess.
pub struct SatAgent {
    board: Board,
    config: Config,
    rng: StdRng,
    phase: Phase,
    safe_queue: VecDeque<usize>,
    stats: Stats,
}

impl SatAgent {
    pub fn new(width: usize, height: usize, config: Config) -> Self {
        Self::resume(Board::new(width, height), config)
    }

    /// Continues from an existing view of the board. The first move is skipped if anything has
    /// already been revealed.
    pub fn resume(board: Board, config: Config) -> Self {
        let phase = if board.has_revealed() {
            Phase::Deduce
        } else {
            Phase::FirstMove
        };
        SatAgent {
            board,
            rng: config.rng(),
            config,
            phase,
            safe_queue: VecDeque::new(),
            stats: Stats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn pop_safe(&mut self) -> Option<Point> {
        while let Some(index) = self.safe_queue.pop_front() {
            if self.board.is_hidden(index) {
                return Some(self.board.point(index));
            }
        }
        None
    }

    /// Runs one deduction pass: flags every proven mine and queues every proven safe cell.
    fn deduce_step(&mut self) -> Result<()> {
        let relevant = self.board.relevant_cells();
        if relevant.is_empty() {
            return Ok(());
        }
        let deductions = deduce(&encode(&self.board), &relevant)?;
        self.stats.deduction_passes += 1;

        for mine in deductions.mines() {
            self.board.flag(mine)?;
            self.stats.proven_mines += 1;
        }
        for safe in deductions.safe() {
            self.safe_queue.push_back(safe);
            self.stats.proven_safe += 1;
        }
        Ok(())
    }

    /// Samples the formula of the current board, so mines flagged by this step's deduction are
    /// already excluded. A sample cut short by the time cap still counts as evidence.
    fn estimate_step(&mut self) -> Result<Option<Point>> {
        let relevant = self.board.relevant_cells();
        if relevant.is_empty() {
            return Ok(None);
        }
        let sample = sample(&encode(&self.board), &relevant, &self.config)?;
        if sample.timed_out {
            self.stats.interrupted_samplings += 1;
        }
        let Some(estimate) = pick(&sample, &relevant, &mut self.rng) else {
            return Ok(None);
        };

        self.stats.estimates += 1;
        if self.config.verbose {
            info!(
                false_rate = estimate.false_rate,
                models = estimate.models,
                exhaustive = estimate.exhaustive,
                "no provably safe cell, taking the least risky one"
            );
        }
        Ok(Some(self.board.point(estimate.cell)))
    }

    fn random_step(&mut self) -> Result<Point> {
        let index = *self
            .board
            .hidden_cells()
            .choose(&mut self.rng)
            .ok_or(Error::NoCandidate)?;
        self.stats.random_guesses += 1;
        if self.config.verbose {
            info!("no clue constrains any hidden cell, guessing at random");
        }
        Ok(self.board.point(index))
    }

    fn choose(&mut self) -> Result<Point> {
        match self.phase {
            Phase::Solved | Phase::Exploded => return Err(Error::GameOver),
            Phase::FirstMove => {
                if self.board.contains(self.config.first_move) {
                    return Ok(self.config.first_move);
                }
                self.phase = Phase::RandomFallback;
                return self.random_step();
            }
            _ => {}
        }

        if let Some(at) = self.pop_safe() {
            self.phase = Phase::ConsumeSafeQueue;
            return Ok(at);
        }

        self.phase = Phase::Deduce;
        self.deduce_step()?;
        if let Some(at) = self.pop_safe() {
            self.phase = Phase::ConsumeSafeQueue;
            return Ok(at);
        }

        self.phase = Phase::Estimate;
        if let Some(at) = self.estimate_step()? {
            return Ok(at);
        }

        self.phase = Phase::RandomFallback;
        self.random_step()
    }
}

impl Agent for SatAgent {
    fn decide_next_move(&mut self) -> Result<Point> {
        let at = self.choose()?;
        self.stats.steps += 1;
        if self.config.verbose {
            info!(
                phase = ?self.phase,
                x = at.x,
                y = at.y,
                "revealing\n{}",
                self.board
            );
        }
        Ok(at)
    }

    fn observe(&mut self, at: Point, reveal: Reveal, solved: bool) -> Result<Outcome> {
        let outcome = record_reveal(&mut self.board, at, reveal, solved)?;
        self.phase = match outcome {
            Outcome::Exploded => Phase::Exploded,
            Outcome::Solved => Phase::Solved,
            Outcome::Continuing if self.safe_queue.is_empty() => Phase::Deduce,
            Outcome::Continuing => Phase::ConsumeSafeQueue,
        };
        debug!(x = at.x, y = at.y, ?reveal, phase = ?self.phase, "observed reveal");
        Ok(outcome)
    }

    fn board(&self) -> &Board {
        &self.board
    }
}
