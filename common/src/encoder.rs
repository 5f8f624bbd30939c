//! Turns the clues on a [`Board`] into a CNF formula over "cell is a mine" variables.

use itertools::Itertools;
use varisat::{CnfFormula, ExtendFormula, Lit};

use crate::board::{Board, ClueConstraint};

/// Builds the formula whose models are exactly the mine assignments consistent with every clue.
///
/// Each clue constraint is encoded on its own; agreement between clues that share cells is left
/// to the solver.
pub fn encode(board: &Board) -> CnfFormula {
    let mut formula = CnfFormula::new();
    for constraint in board.constraints() {
        encode_constraint(&mut formula, &constraint);
    }
    formula
}

/// Encodes "exactly `target` of `cells` are mines" by forbidding every other assignment.
///
/// All `2^n` assignments of the `n` cells are enumerated, one clause per wrong mine count. The
/// clause is the negation of the forbidden assignment: a cell the assignment calls a mine appears
/// negated, a cell it calls safe appears positive. The cost is exponential in `n`; a clue cell has
/// at most 8 neighbors, which keeps it at 256 assignments.
pub fn encode_constraint(formula: &mut CnfFormula, constraint: &ClueConstraint) {
    let ClueConstraint { cells, target, .. } = constraint;

    for mines in cells.iter().copied().powerset() {
        if Some(mines.len()) == *target {
            continue;
        }
        let clause: Vec<Lit> = cells
            .iter()
            .map(|&cell| Lit::from_var(Board::var(cell), !mines.contains(&cell)))
            .collect();
        formula.add_clause(&clause);
    }
}
