use rand::SeedableRng;
use rand::rngs::StdRng;
use satsweeper as ms;
use satsweeper::{Agent, Field};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(width: u8, height: u8, mines: u8, seed: u64) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut rng = StdRng::seed_from_u64(seed);
    let first_move = ms::Config::default().first_move;
    let game = ms::Minefield::random(
        width as usize,
        height as usize,
        mines as usize,
        Some(first_move),
        &mut rng,
    )
    .map_err(|e| e.to_string())?;
    game.to_bytes().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn validate(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let game = ms::Minefield::from_bytes(&bts).map_err(|e| e.to_string())?;
    Ok(game.is_solved())
}

/// Reveals one cell. The returned bytes are the new game state followed by one byte: 0 if the
/// cell was safe, 1 if it was a mine.
#[wasm_bindgen]
pub fn choose_cell(bts: Vec<u8>, x: usize, y: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Minefield::from_bytes(&bts).map_err(|e| e.to_string())?;
    let res = game
        .reveal(ms::Point { x, y })
        .map_err(|e| e.to_string())?;
    let mut xs = game.to_bytes().map_err(|e| e.to_string())?;
    xs.push(if res == ms::Reveal::Mine { 1 } else { 0 });
    Ok(xs)
}

/// The cell the SAT agent would reveal next, as `[x, y]`.
#[wasm_bindgen]
pub fn hint(bts: Vec<u8>, seed: u64) -> Result<Vec<usize>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Minefield::from_bytes(&bts).map_err(|e| e.to_string())?;
    if game.game_state != ms::GameState::Playing {
        return Err(ms::Error::GameOver.to_string());
    }
    let board = game.knowledge().map_err(|e| e.to_string())?;
    let mut agent = ms::SatAgent::resume(board, ms::Config::seeded(seed));
    let at = agent.decide_next_move().map_err(|e| e.to_string())?;
    Ok(vec![at.x, at.y])
}

/// One entry per cell in row-major order: the clue if revealed, -1 if covered, -2 for an exploded
/// mine.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Minefield::from_bytes(&bts).map_err(|e| e.to_string())?;
    Ok((0..game.height)
        .flat_map(|y| (0..game.width).map(move |x| ms::Point { x, y }))
        .map(|at| match game.revealed_at(at) {
            None => -1,
            Some(ms::Reveal::Mine) => -2,
            Some(ms::Reveal::Clue(n)) => n as i8,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_refuses_finished_games() {
        let mut game: ms::Minefield = "*.\n..".parse().unwrap();
        game.reveal(ms::Point::new(1, 1)).unwrap();
        let playing = game.to_bytes().unwrap();
        assert!(hint(playing, 0).is_ok());

        game.reveal(ms::Point::new(0, 0)).unwrap();
        let lost = game.to_bytes().unwrap();
        assert!(hint(lost.clone(), 0).is_err());
        assert_eq!(get_cells(lost).unwrap(), vec![-2, -1, -1, 1]);
    }

    #[test]
    fn test_truncated_state_is_rejected() {
        let bytes = create_game(3, 3, 2, 7).unwrap();
        assert!(validate(bytes[..bytes.len() - 1].to_vec()).is_err());
        assert!(choose_cell(vec![3, 3], 0, 0).is_err());
    }
}
