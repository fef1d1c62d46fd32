use thiserror::Error;

use crate::piece::Side;
use crate::square::Square;

/// Why a move attempt was refused. Every rejection leaves the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game already over")]
    GameOver,
    #[error("no piece on {0}")]
    EmptyOrigin(String),
    #[error("not {0}'s turn")]
    WrongTurn(Side),
    #[error("destination {0} is off the board")]
    OffBoard(String),
    #[error("{0} is occupied by a friendly piece")]
    OwnPieceAtDestination(Square),
    #[error("piece on {from} cannot reach {to}")]
    NotReachable { from: Square, to: Square },
    #[error("move {from}-{to} leaves {side} in check")]
    SelfCheck { from: Square, to: Square, side: Side },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSquareError {
    #[error("empty square name")]
    Empty,
    #[error("invalid column in {0:?}, expected a-i")]
    Column(String),
    #[error("invalid row in {0:?}, expected 1-10")]
    Row(String),
}
