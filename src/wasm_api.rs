use crate::game::{Game, GameStatus};
use crate::piece::Side;
use crate::square::{Square, COLS, ROWS};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    kind: &'static str,
    side: &'static str,
}

#[derive(Serialize)]
struct BoardState {
    /// Rows 1-10 top to bottom, columns a-i left to right.
    squares: Vec<Vec<Option<SquarePiece>>>,
    turn: &'static str,
    status: &'static str,
    blue_in_check: bool,
    red_in_check: bool,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn status_to_string(status: GameStatus) -> &'static str {
    match status {
        GameStatus::InProgress => "UNFINISHED",
        GameStatus::BlueWon => "BLUE_WON",
        GameStatus::RedWon => "RED_WON",
    }
}

fn build_board_state(game: &Game) -> BoardState {
    let squares = (1..=ROWS as u8)
        .map(|row| {
            (0..COLS as u8)
                .map(|col| {
                    Square::new(col, row)
                        .and_then(|sq| game.square(sq))
                        .map(|p| SquarePiece {
                            kind: p.kind.name(),
                            side: p.side.name(),
                        })
                })
                .collect()
        })
        .collect();

    BoardState {
        squares,
        turn: game.turn().name(),
        status: status_to_string(game.status()),
        blue_in_check: game.is_in_check(Side::Blue),
        red_in_check: game.is_in_check(Side::Red),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen(js_name = Game)]
pub struct JsGame {
    game: Game,
}

#[wasm_bindgen(js_class = Game)]
impl JsGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsGame {
        JsGame { game: Game::new() }
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.game))
    }

    pub fn make_move(&mut self, from: &str, to: &str) -> JsValue {
        match self.game.try_move_named(from, to) {
            Ok(()) => to_js(&MoveResult {
                board_state: Some(build_board_state(&self.game)),
                error: None,
            }),
            Err(err) => to_js(&MoveResult {
                board_state: None,
                error: Some(err.to_string()),
            }),
        }
    }

    pub fn is_in_check(&self, side: &str) -> bool {
        Side::from_name(side).is_some_and(|s| self.game.is_in_check(s))
    }

    pub fn get_legal_moves_for_square(&self, square: &str) -> JsValue {
        let moves: Vec<String> = square
            .parse::<Square>()
            .map(|sq| self.game.legal_moves_from(sq))
            .unwrap_or_default()
            .iter()
            .map(Square::to_string)
            .collect();
        to_js(&moves)
    }
}
