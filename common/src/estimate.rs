use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;
use varisat::{CnfFormula, Var};

use crate::board::Board;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::oracle::{ModelSample, Oracle};

/// The least risky cell according to sampled models.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub cell: usize,
    /// Fraction of sampled models in which `cell` is not a mine.
    pub false_rate: f64,
    pub models: usize,
    /// Every model was sampled, so `false_rate` is exact rather than an estimate.
    pub exhaustive: bool,
    pub timed_out: bool,
}

/// Samples models of `formula` over the `relevant` cells.
///
/// Sampling stops at `config.max_samples` models or after `config.sample_time_cap`; a partial
/// sample is still evidence and is returned. A formula without any model means the clues
/// contradict each other and is reported as [`Error::InconsistentBoard`].
pub fn sample(formula: &CnfFormula, relevant: &[usize], config: &Config) -> Result<ModelSample> {
    let vars: Vec<Var> = relevant.iter().map(|&cell| Board::var(cell)).collect();
    let sample = Oracle::new(formula).sample(&vars, config.max_samples, config.sample_time_cap)?;
    if sample.models == 0 && sample.exhaustive {
        return Err(Error::InconsistentBoard);
    }
    Ok(sample)
}

/// Picks the relevant cell that is safe in the largest share of sampled models, breaking ties
/// uniformly at random. Returns `None` when the sample holds no model.
pub fn pick(sample: &ModelSample, relevant: &[usize], rng: &mut impl Rng) -> Option<Estimate> {
    if sample.models == 0 {
        debug!(timed_out = sample.timed_out, "no model to estimate from");
        return None;
    }

    // Compare integer counts so ties are exact.
    let best = sample.false_counts.iter().copied().max().unwrap_or(0);
    let tied: Vec<usize> = (0..relevant.len())
        .filter(|&i| sample.false_counts[i] == best)
        .collect();
    let &choice = tied.choose(rng)?;

    let estimate = Estimate {
        cell: relevant[choice],
        false_rate: sample.false_rate(choice).unwrap_or(0.0),
        models: sample.models,
        exhaustive: sample.exhaustive,
        timed_out: sample.timed_out,
    };
    debug!(
        cell = estimate.cell,
        false_rate = estimate.false_rate,
        tied = tied.len(),
        "estimated least risky cell"
    );
    Some(estimate)
}

/// Samples and picks in one go. Returns `None` when there are no relevant cells, or when the time
/// cap ran out before a single model was drawn.
pub fn estimate(
    formula: &CnfFormula,
    relevant: &[usize],
    config: &Config,
    rng: &mut impl Rng,
) -> Result<Option<Estimate>> {
    if relevant.is_empty() {
        return Ok(None);
    }
    let sample = sample(formula, relevant, config)?;
    Ok(pick(&sample, relevant, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;
    use crate::encoder::encode;
    use itertools::Itertools;
    use std::collections::HashSet;
    use std::time::Duration;

    fn config(seed: u64) -> Config {
        Config {
            sample_time_cap: Duration::from_secs(10),
            ..Config::seeded(seed)
        }
    }

    fn estimate_board(board: &Board, config: &Config) -> Result<Option<Estimate>> {
        let mut rng = config.rng();
        estimate(&encode(board), &board.relevant_cells(), config, &mut rng)
    }

    #[test]
    fn test_symmetric_pair_has_even_odds() {
        let mut board = Board::new(3, 1);
        board.uncover(Point::new(1, 0), 1).unwrap();
        let config = config(1);

        let sample = sample(&encode(&board), &board.relevant_cells(), &config).unwrap();
        assert_eq!(sample.models, 2);
        assert_eq!(sample.false_rate(0), Some(0.5));
        assert_eq!(sample.false_rate(1), Some(0.5));

        let estimate = estimate_board(&board, &config).unwrap().unwrap();
        assert!(estimate.cell == 0 || estimate.cell == 2);
        assert_eq!(estimate.false_rate, 0.5);
        assert!(estimate.exhaustive);
    }

    #[test]
    fn test_ties_are_broken_both_ways() {
        let mut board = Board::new(3, 1);
        board.uncover(Point::new(1, 0), 1).unwrap();

        let picks: HashSet<usize> = (0..64)
            .map(|seed| {
                estimate_board(&board, &config(seed))
                    .unwrap()
                    .unwrap()
                    .cell
            })
            .collect();
        assert_eq!(picks, HashSet::from([0, 2]));
    }

    #[test]
    fn test_prefers_the_least_constrained_cell() {
        // ■ ■ ■
        // 1 ■ 2
        let mut board = Board::new(3, 2);
        board.uncover(Point::new(0, 1), 1).unwrap();
        board.uncover(Point::new(2, 1), 2).unwrap();

        let estimate = estimate_board(&board, &config(5)).unwrap().unwrap();
        let exact = exact_false_rates(&board);
        let best = exact.values().copied().fold(0.0, f64::max);
        assert!((estimate.false_rate - best).abs() < 1e-9);
        assert!((exact[&estimate.cell] - best).abs() < 1e-9);
    }

    #[test]
    fn test_exhaustive_sampling_matches_exact_rates() {
        let mut board = Board::new(4, 3);
        board.uncover(Point::new(0, 0), 1).unwrap();
        board.uncover(Point::new(1, 1), 2).unwrap();
        board.uncover(Point::new(3, 2), 1).unwrap();

        let relevant = board.relevant_cells();
        let sample = sample(&encode(&board), &relevant, &config(0)).unwrap();
        assert!(sample.exhaustive);

        let exact = exact_false_rates(&board);
        for (i, cell) in relevant.iter().enumerate() {
            let rate = sample.false_rate(i).unwrap();
            assert!((rate - exact[cell]).abs() < 1e-9, "cell {cell}: {rate}");
        }
    }

    #[test]
    fn test_partial_sample_still_picks() {
        let sample = ModelSample {
            vars: [4, 7, 9].into_iter().map(Board::var).collect(),
            false_counts: vec![1, 3, 2],
            models: 3,
            exhaustive: false,
            timed_out: true,
        };
        let mut rng = config(0).rng();

        let estimate = pick(&sample, &[4, 7, 9], &mut rng).unwrap();
        assert_eq!(estimate.cell, 7);
        assert_eq!(estimate.false_rate, 1.0);
        assert!(estimate.timed_out);

        let empty = ModelSample {
            false_counts: vec![0, 0, 0],
            models: 0,
            ..sample
        };
        assert_eq!(pick(&empty, &[4, 7, 9], &mut rng), None);
    }

    #[test]
    fn test_no_relevant_cells_yields_nothing() {
        let board = Board::new(2, 2);
        assert_eq!(estimate_board(&board, &config(0)).unwrap(), None);
    }

    #[test]
    fn test_contradictory_clues_are_an_error() {
        let mut board = Board::new(3, 1);
        board.uncover(Point::new(0, 0), 1).unwrap();
        board.uncover(Point::new(2, 0), 0).unwrap();
        assert!(matches!(
            estimate_board(&board, &config(0)),
            Err(Error::InconsistentBoard)
        ));
    }

    /// Brute-force share of consistent assignments in which each relevant cell is safe.
    fn exact_false_rates(board: &Board) -> std::collections::HashMap<usize, f64> {
        let relevant = board.relevant_cells();
        let constraints = board.constraints();
        let consistent: Vec<HashSet<usize>> = relevant
            .iter()
            .copied()
            .powerset()
            .map(|mines| mines.into_iter().collect::<HashSet<usize>>())
            .filter(|mines| {
                constraints.iter().all(|c| {
                    Some(c.cells.iter().filter(|cell| mines.contains(cell)).count()) == c.target
                })
            })
            .collect();

        relevant
            .iter()
            .map(|&cell| {
                let safe = consistent.iter().filter(|mines| !mines.contains(&cell)).count();
                (cell, safe as f64 / consistent.len() as f64)
            })
            .collect()
    }
}
