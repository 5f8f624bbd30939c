//! Property-based tests over random consistent boards.

use std::collections::BTreeSet;
use std::time::Duration;

use proptest::prelude::*;
use satsweeper::deduce::deduce;
use satsweeper::encoder::encode;
use satsweeper::*;

fn config(seed: u64) -> Config {
    Config {
        sample_time_cap: Duration::from_secs(5),
        max_samples: 200,
        ..Config::seeded(seed)
    }
}

fn random_field(width: usize, height: usize, density: f64, seed: u64) -> Minefield {
    let mines = ((width * height) as f64 * density) as usize;
    let mut rng = Config::seeded(seed).rng();
    Minefield::random(width, height, mines, Some(Point::new(0, 0)), &mut rng).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn deductions_agree_with_the_hidden_layout(
        width in 3usize..7,
        height in 3usize..7,
        density in 0.05f64..0.3,
        seed in any::<u64>(),
        mask in prop::collection::vec(any::<bool>(), 36),
    ) {
        let mut field = random_field(width, height, density, seed);
        for index in 0..width * height {
            let point = Point::new(index % width, index / width);
            if mask[index] && !field.is_mine(point) && field.game_state == GameState::Playing {
                field.reveal(point).unwrap();
            }
        }

        let board = field.knowledge().unwrap();
        let deductions = deduce(&encode(&board), &board.relevant_cells()).unwrap();
        for safe in deductions.safe() {
            prop_assert!(!field.is_mine(board.point(safe)));
        }
        for mine in deductions.mines() {
            prop_assert!(field.is_mine(board.point(mine)));
        }
    }

    #[test]
    fn true_layout_satisfies_the_formula(
        width in 3usize..7,
        height in 3usize..7,
        density in 0.05f64..0.3,
        seed in any::<u64>(),
        mask in prop::collection::vec(any::<bool>(), 36),
    ) {
        let mut field = random_field(width, height, density, seed);
        for index in 0..width * height {
            let point = Point::new(index % width, index / width);
            if mask[index] && !field.is_mine(point) && field.game_state == GameState::Playing {
                field.reveal(point).unwrap();
            }
        }

        let board = field.knowledge().unwrap();
        let formula = encode(&board);
        for clause in formula.iter() {
            let satisfied = clause.iter().any(|lit| {
                lit.is_positive() == field.is_mine(board.point(lit.var().index()))
            });
            prop_assert!(satisfied);
        }
    }

    #[test]
    fn flags_only_grow_and_are_always_mines(
        width in 4usize..8,
        height in 4usize..8,
        density in 0.05f64..0.25,
        seed in any::<u64>(),
    ) {
        let mut field = random_field(width, height, density, seed);
        let mut agent = SatAgent::new(width, height, config(seed));
        let mut flagged = BTreeSet::new();

        loop {
            let guesses = agent.stats().estimates + agent.stats().random_guesses;
            let outcome = agent.step(&mut field).unwrap();

            let now: BTreeSet<usize> = agent.board().flagged_cells().into_iter().collect();
            prop_assert!(flagged.is_subset(&now));
            for &index in &now {
                prop_assert!(field.is_mine(agent.board().point(index)));
            }
            flagged = now;

            if outcome == Outcome::Exploded {
                // Only a guess can explode; proven-safe cells and the first move never do.
                prop_assert!(agent.stats().estimates + agent.stats().random_guesses > guesses);
            }
            if outcome != Outcome::Continuing {
                break;
            }
        }
    }
}
