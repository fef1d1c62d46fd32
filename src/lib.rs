pub mod board;
pub mod error;
pub mod fortress;
pub mod game;
pub mod moves;
pub mod piece;
pub mod square;

#[cfg(not(target_arch = "wasm32"))]
pub mod playout;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::Board;
pub use error::{MoveError, ParseSquareError};
pub use game::{Game, GameStatus};
pub use moves::Move;
pub use piece::{Piece, PieceKind, Side};
pub use square::Square;
