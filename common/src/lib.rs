//! A Minesweeper player that only moves on what the revealed clues prove.
//!
//! Each step the clues are encoded as a CNF formula ([`encoder`]), every cell next to a clue is
//! tested by refutation against a SAT solver ([`deduce`]), and cells proven safe are revealed.
//! When nothing can be proven, sampled models of the formula rank the remaining cells by how
//! often they come out safe ([`estimate`]). [`SatAgent`] sequences these into single moves.

pub mod agent;
pub mod board;
pub mod config;
pub mod deduce;
pub mod encoder;
pub mod error;
pub mod estimate;
pub mod field;
pub mod oracle;
pub mod sat_agent;

pub use agent::{Agent, Outcome, RandomAgent};
pub use board::{Board, Cell, ClueConstraint, Point};
pub use config::Config;
pub use deduce::{DeducedState, Deductions};
pub use error::{Error, Result};
pub use field::{Field, GameState, Minefield, Reveal};
pub use sat_agent::{Phase, SatAgent, Stats};
