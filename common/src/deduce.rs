use std::collections::BTreeMap;

use tracing::debug;
use varisat::{CnfFormula, Lit};

use crate::board::Board;
use crate::error::{Error, Result};
use crate::oracle::Oracle;

/// The possible outcomes of the refutation tests for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeducedState {
    ForcedMine,   // Assuming the cell is safe contradicts the clues.
    ForcedSafe,   // Assuming the cell is a mine contradicts the clues.
    Undetermined, // The clues allow both.
}

/// Deduced state of every relevant cell, keyed by cell index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deductions(pub BTreeMap<usize, DeducedState>);

impl Deductions {
    pub fn safe(&self) -> impl Iterator<Item = usize> + '_ {
        self.with_state(DeducedState::ForcedSafe)
    }

    pub fn mines(&self) -> impl Iterator<Item = usize> + '_ {
        self.with_state(DeducedState::ForcedMine)
    }

    fn with_state(&self, wanted: DeducedState) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .filter(move |&(_, &state)| state == wanted)
            .map(|(&index, _)| index)
    }

    pub fn get(&self, index: usize) -> Option<DeducedState> {
        self.0.get(&index).copied()
    }
}

/// Runs two refutation tests per relevant cell against `formula`.
///
/// A cell is a forced mine when "cell is safe" makes the formula unsatisfiable, and forced safe
/// when "cell is a mine" does. Failing both tests means the formula itself has no model, which
/// cannot happen on a legally played board and is reported as [`Error::InconsistentBoard`].
pub fn deduce(formula: &CnfFormula, relevant: &[usize]) -> Result<Deductions> {
    let mut oracle = Oracle::new(formula);
    let mut deductions = BTreeMap::new();

    for &cell in relevant {
        let var = Board::var(cell);
        let is_mine = oracle.refutes(Lit::from_var(var, false))?;
        let is_safe = oracle.refutes(Lit::from_var(var, true))?;

        let state = match (is_mine, is_safe) {
            (false, false) => DeducedState::Undetermined,
            (true, false) => DeducedState::ForcedMine,
            (false, true) => DeducedState::ForcedSafe,
            (true, true) => return Err(Error::InconsistentBoard),
        };
        deductions.insert(cell, state);
    }

    let deductions = Deductions(deductions);
    debug!(
        relevant = relevant.len(),
        safe = deductions.safe().count(),
        mines = deductions.mines().count(),
        "deduction pass finished"
    );
    Ok(deductions)
}
