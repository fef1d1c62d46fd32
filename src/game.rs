// =============================================================================
// Game controller
//
// Owns the board, the side to move, the game status and a cached square for
// each General. Legality is decided in two stages: the movement rule of the
// piece (Board::candidate_moves) and a trial application of the move that is
// rolled back if it leaves the mover's General attacked.
//
// Trial moves are Trial guards: the board and the General cache are restored
// in Drop unless the guard is explicitly committed.
// =============================================================================

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::error::MoveError;
use crate::moves::Move;
use crate::piece::{Piece, Side};
use crate::square::Square;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    BlueWon,
    RedWon,
}

impl GameStatus {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::Blue => GameStatus::BlueWon,
            Side::Red => GameStatus::RedWon,
        }
    }

    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::BlueWon => Some(Side::Blue),
            GameStatus::RedWon => Some(Side::Red),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    board: Board,
    turn: Side,
    status: GameStatus,
    blue_general: Option<Square>,
    red_general: Option<Square>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A new game from the starting layout, blue to move.
    pub fn new() -> Self {
        Self::from_board(Board::new(), Side::Blue)
    }

    /// Start from an arbitrary position. The General squares are read off the board.
    pub fn from_board(board: Board, turn: Side) -> Self {
        let mut game = Game {
            board,
            turn,
            status: GameStatus::InProgress,
            blue_general: None,
            red_general: None,
        };
        game.refresh_generals();
        game
    }

    fn refresh_generals(&mut self) {
        self.blue_general = self.board.find_general(Side::Blue);
        self.red_general = self.board.find_general(Side::Red);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn set_turn(&mut self, side: Side) {
        self.turn = side;
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Record a result. A finished game stays finished.
    pub fn set_status(&mut self, status: GameStatus) {
        if !self.status.is_over() {
            self.status = status;
        }
    }

    pub fn square(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    /// Overwrite a square during setup. Keeps the General squares in sync.
    pub fn set_square(&mut self, sq: Square, piece: Option<Piece>) {
        self.board.set(sq, piece);
        self.refresh_generals();
    }

    pub fn general_square(&self, side: Side) -> Option<Square> {
        match side {
            Side::Blue => self.blue_general,
            Side::Red => self.red_general,
        }
    }

    fn general_slot(&mut self, side: Side) -> &mut Option<Square> {
        match side {
            Side::Blue => &mut self.blue_general,
            Side::Red => &mut self.red_general,
        }
    }

    /// True if any piece of the other side could move onto `side`'s General.
    pub fn is_in_check(&self, side: Side) -> bool {
        let Some(general) = self.general_square(side) else {
            return false;
        };
        self.board
            .pieces()
            .filter(|(_, p)| p.side != side)
            .any(|(sq, _)| self.board.candidate_moves(sq).contains(&general))
    }

    /// True if `side` is in check and no single move of its own gets it out.
    pub fn is_checkmate(&self, side: Side) -> bool {
        if !self.is_in_check(side) {
            return false;
        }
        let mut scratch = self.clone();
        !scratch.has_escape(side)
    }

    fn has_escape(&mut self, side: Side) -> bool {
        let own: Vec<(Square, Piece)> = self.board.pieces().filter(|(_, p)| p.side == side).collect();
        for (from, piece) in own {
            for to in self.board.candidate_moves(from) {
                if to == from || self.board.get(to).is_some_and(|p| p.side == side) {
                    continue;
                }
                let trial = Trial::apply(self, from, to, piece);
                if !trial.is_in_check(side) {
                    return true;
                }
            }
        }
        false
    }

    /// Attempt a move, reporting only whether it was played.
    pub fn make_move(&mut self, from: Square, to: Square) -> bool {
        self.try_move(from, to).is_ok()
    }

    /// Attempt a move given square names such as `"e7"`.
    pub fn make_move_named(&mut self, from: &str, to: &str) -> bool {
        self.try_move_named(from, to).is_ok()
    }

    pub fn try_move_named(&mut self, from: &str, to: &str) -> Result<(), MoveError> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let from_sq: Square = from
            .parse()
            .map_err(|_| MoveError::EmptyOrigin(from.to_string()))?;
        let piece = self
            .board
            .get(from_sq)
            .ok_or_else(|| MoveError::EmptyOrigin(from.to_string()))?;
        if piece.side != self.turn {
            return Err(MoveError::WrongTurn(piece.side));
        }
        let to_sq: Square = to.parse().map_err(|_| MoveError::OffBoard(to.to_string()))?;
        self.try_move(from_sq, to_sq)
    }

    /// Validate and play a move. On error nothing changes.
    pub fn try_move(&mut self, from: Square, to: Square) -> Result<(), MoveError> {
        let result = self.play(from, to);
        match &result {
            Ok(()) => debug!(%from, %to, turn = %self.turn, "move played"),
            Err(err) => debug!(%from, %to, %err, "move rejected"),
        }
        result
    }

    /// Movement-rule checks, without trying the move on the board.
    fn validate(&self, from: Square, to: Square) -> Result<Piece, MoveError> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let piece = self
            .board
            .get(from)
            .ok_or_else(|| MoveError::EmptyOrigin(from.to_string()))?;
        if piece.side != self.turn {
            return Err(MoveError::WrongTurn(piece.side));
        }
        if from != to && self.board.get(to).is_some_and(|p| p.side == piece.side) {
            return Err(MoveError::OwnPieceAtDestination(to));
        }
        if !self.board.candidate_moves(from).contains(&to) {
            return Err(MoveError::NotReachable { from, to });
        }
        Ok(piece)
    }

    fn play(&mut self, from: Square, to: Square) -> Result<(), MoveError> {
        let piece = self.validate(from, to)?;
        let side = piece.side;

        let trial = Trial::apply(self, from, to, piece);
        if trial.is_in_check(side) {
            return Err(MoveError::SelfCheck { from, to, side });
        }
        trial.commit();

        let opponent = side.opposite();
        self.turn = opponent;
        if self.is_in_check(opponent) && self.is_checkmate(opponent) {
            self.status = GameStatus::won_by(side);
            info!(winner = %side, last_move = %Move::new(from, to), "checkmate");
        }
        Ok(())
    }

    /// Destinations the piece on `origin` could legally move to right now,
    /// including the pass when it is allowed.
    pub fn legal_moves_from(&self, origin: Square) -> Vec<Square> {
        // The pass is always a candidate, so this only checks status and turn.
        let Ok(piece) = self.validate(origin, origin) else {
            return Vec::new();
        };
        let mut scratch = self.clone();
        self.board
            .candidate_moves(origin)
            .into_iter()
            .filter(|&to| {
                scratch.validate(origin, to).is_ok() && {
                    let trial = Trial::apply(&mut scratch, origin, to, piece);
                    !trial.is_in_check(piece.side)
                }
            })
            .collect()
    }

    /// Every legal move for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.board
            .pieces()
            .filter(|(_, p)| p.side == self.turn)
            .flat_map(|(from, _)| {
                self.legal_moves_from(from)
                    .into_iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }
}

/// A move applied to a game for inspection. Dropping the guard puts the
/// board and General cache back exactly as they were.
struct Trial<'a> {
    game: &'a mut Game,
    from: Square,
    to: Square,
    moved: Piece,
    captured: Option<Piece>,
    general: Option<Square>,
    committed: bool,
}

impl<'a> Trial<'a> {
    fn apply(game: &'a mut Game, from: Square, to: Square, moved: Piece) -> Self {
        let captured = game.board.get(to);
        let general = game.general_square(moved.side);
        if from != to {
            game.board.set(to, Some(moved));
            game.board.set(from, None);
        }
        if moved.is_general() {
            *game.general_slot(moved.side) = Some(to);
        }
        Trial {
            game,
            from,
            to,
            moved,
            captured,
            general,
            committed: false,
        }
    }

    /// Keep the move on the board.
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Deref for Trial<'_> {
    type Target = Game;

    fn deref(&self) -> &Game {
        &*self.game
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        self.game.board.set(self.to, self.captured);
        self.game.board.set(self.from, Some(self.moved));
        *self.game.general_slot(self.moved.side) = self.general;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn position(turn: Side, pieces: &[(&str, PieceKind, Side)]) -> Game {
        let mut board = Board::empty();
        for &(at, kind, side) in pieces {
            board.set(sq(at), Some(Piece::new(kind, side)));
        }
        Game::from_board(board, turn)
    }

    #[test]
    fn new_game_state() {
        let game = Game::new();
        assert_eq!(game.turn(), Side::Blue);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.general_square(Side::Blue), Some(sq("e9")));
        assert_eq!(game.general_square(Side::Red), Some(sq("e2")));
        assert!(!game.is_in_check(Side::Blue));
        assert!(!game.is_in_check(Side::Red));
    }

    #[test]
    fn soldier_opening_flips_turn() {
        let mut game = Game::new();
        assert!(game.make_move_named("e7", "e6"));
        assert_eq!(game.turn(), Side::Red);
        assert_eq!(game.square(sq("e6")), Some(Piece::new(PieceKind::Soldier, Side::Blue)));
        assert_eq!(game.square(sq("e7")), None);
    }

    #[test]
    fn red_cannot_move_first() {
        let mut game = Game::new();
        let before = game.clone();
        assert_eq!(game.try_move_named("a1", "a1"), Err(MoveError::WrongTurn(Side::Red)));
        assert_eq!(game, before);
    }

    #[test]
    fn pass_only_flips_turn() {
        let mut game = Game::new();
        let board = game.board().clone();
        assert!(game.make_move(sq("a10"), sq("a10")));
        assert_eq!(game.turn(), Side::Red);
        assert_eq!(game.board(), &board);
        assert!(game.make_move(sq("e2"), sq("e2")));
        assert_eq!(game.turn(), Side::Blue);
    }

    #[test]
    fn rejections_leave_game_untouched() {
        let mut game = Game::new();
        let before = game.clone();
        let cases: [(&str, &str, MoveError); 6] = [
            ("e5", "e6", MoveError::EmptyOrigin("e5".into())),
            ("z9", "e6", MoveError::EmptyOrigin("z9".into())),
            ("e7", "e11", MoveError::OffBoard("e11".into())),
            ("e7", "j7", MoveError::OffBoard("j7".into())),
            ("a10", "a7", MoveError::OwnPieceAtDestination(sq("a7"))),
            ("e7", "e5", MoveError::NotReachable { from: sq("e7"), to: sq("e5") }),
        ];
        for (from, to, err) in cases {
            assert_eq!(game.try_move_named(from, to), Err(err), "{from}-{to}");
            assert_eq!(game, before, "{from}-{to} changed the game");
        }
    }

    #[test]
    fn capture_removes_the_target() {
        let mut game = position(
            Side::Blue,
            &[
                ("e9", PieceKind::General, Side::Blue),
                ("e2", PieceKind::General, Side::Red),
                ("a9", PieceKind::Chariot, Side::Blue),
                ("a3", PieceKind::Horse, Side::Red),
            ],
        );
        assert!(game.make_move(sq("a9"), sq("a3")));
        assert_eq!(game.square(sq("a3")), Some(Piece::new(PieceKind::Chariot, Side::Blue)));
        assert_eq!(game.board().pieces().count(), 3);
    }

    #[test]
    fn general_cache_follows_general() {
        let mut game = position(
            Side::Blue,
            &[("e9", PieceKind::General, Side::Blue), ("e2", PieceKind::General, Side::Red)],
        );
        assert!(game.make_move(sq("e9"), sq("f10")));
        assert_eq!(game.general_square(Side::Blue), Some(sq("f10")));
        assert_eq!(game.board().find_general(Side::Blue), Some(sq("f10")));
    }

    #[test]
    fn interposing_blocks_check() {
        let mut game = position(
            Side::Blue,
            &[
                ("e9", PieceKind::General, Side::Blue),
                ("d8", PieceKind::Guard, Side::Blue),
                ("e5", PieceKind::Chariot, Side::Red),
                ("d2", PieceKind::General, Side::Red),
            ],
        );
        assert!(game.is_in_check(Side::Blue));
        assert!(!game.is_checkmate(Side::Blue));

        let before = game.clone();
        assert_eq!(
            game.try_move(sq("d8"), sq("d9")),
            Err(MoveError::SelfCheck { from: sq("d8"), to: sq("d9"), side: Side::Blue })
        );
        assert_eq!(game, before);

        // A pass does not resolve check either.
        assert!(!game.make_move(sq("d8"), sq("d8")));

        assert!(game.make_move(sq("d8"), sq("e8")));
        assert!(!game.is_in_check(Side::Blue));
    }

    #[test]
    fn setting_a_blocker_clears_check() {
        let mut game = position(
            Side::Red,
            &[
                ("e2", PieceKind::General, Side::Red),
                ("e7", PieceKind::Chariot, Side::Blue),
                ("e9", PieceKind::General, Side::Blue),
            ],
        );
        assert!(game.is_in_check(Side::Red));
        game.set_square(sq("e4"), Some(Piece::new(PieceKind::Horse, Side::Red)));
        assert!(!game.is_in_check(Side::Red));
    }

    #[test]
    fn cannot_expose_own_general() {
        let mut game = position(
            Side::Red,
            &[
                ("e2", PieceKind::General, Side::Red),
                ("e4", PieceKind::Chariot, Side::Red),
                ("e7", PieceKind::Chariot, Side::Blue),
                ("d9", PieceKind::General, Side::Blue),
            ],
        );
        assert!(!game.make_move(sq("e4"), sq("a4")));
        assert!(game.make_move(sq("e4"), sq("e7")));
    }

    fn corner_mate() -> Game {
        position(
            Side::Red,
            &[
                ("d10", PieceKind::General, Side::Blue),
                ("e2", PieceKind::General, Side::Red),
                ("a1", PieceKind::Chariot, Side::Red),
                ("c9", PieceKind::Chariot, Side::Red),
            ],
        )
    }

    #[test]
    fn checkmate_ends_the_game() {
        let mut game = corner_mate();
        assert!(!game.is_checkmate(Side::Blue));
        assert!(game.make_move(sq("a1"), sq("a10")));
        assert!(game.is_in_check(Side::Blue));
        assert!(game.is_checkmate(Side::Blue));
        assert_eq!(game.status(), GameStatus::RedWon);
        assert_eq!(game.status().winner(), Some(Side::Red));

        let before = game.clone();
        assert_eq!(game.try_move(sq("d10"), sq("d10")), Err(MoveError::GameOver));
        assert_eq!(game.try_move_named("x", "y"), Err(MoveError::GameOver));
        assert_eq!(game, before);
    }

    #[test]
    fn check_with_an_escape_is_not_mate() {
        let mut game = corner_mate();
        game.set_square(sq("c9"), None);
        assert!(game.make_move(sq("a1"), sq("a10")));
        assert!(game.is_in_check(Side::Blue));
        assert!(!game.is_checkmate(Side::Blue));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.legal_moves_from(sq("d10")), vec![sq("d9"), sq("e9")]);
    }

    #[test]
    fn interposing_piece_escapes_mate() {
        let mut game = corner_mate();
        game.set_square(sq("b9"), Some(Piece::new(PieceKind::Chariot, Side::Blue)));
        assert!(game.make_move(sq("a1"), sq("a10")));
        assert!(game.is_in_check(Side::Blue));
        assert!(!game.is_checkmate(Side::Blue));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(game.make_move(sq("b9"), sq("b10")));
        assert!(!game.is_in_check(Side::Blue));
    }

    #[test]
    fn capturing_the_attacker_escapes_mate() {
        let mut game = position(
            Side::Blue,
            &[
                ("d10", PieceKind::General, Side::Blue),
                ("c7", PieceKind::Elephant, Side::Blue),
                ("e2", PieceKind::General, Side::Red),
                ("a10", PieceKind::Chariot, Side::Red),
                ("c9", PieceKind::Chariot, Side::Red),
            ],
        );
        assert!(game.is_in_check(Side::Blue));
        assert!(!game.is_checkmate(Side::Blue));
        assert_eq!(game.legal_moves(), vec![Move::new(sq("c7"), sq("a10"))]);

        let mut without_elephant = game.clone();
        without_elephant.set_square(sq("c7"), None);
        assert!(without_elephant.is_checkmate(Side::Blue));

        assert!(game.make_move(sq("c7"), sq("a10")));
        assert!(!game.is_in_check(Side::Blue));
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn set_turn_hands_over_the_move() {
        let mut game = Game::new();
        game.set_turn(Side::Red);
        assert_eq!(game.turn(), Side::Red);
        assert!(game.legal_moves_from(sq("e7")).is_empty());
        assert!(game.make_move_named("e4", "e5"));
        assert_eq!(game.turn(), Side::Blue);
    }

    #[test]
    fn checkmate_query_does_not_disturb_the_game() {
        let mut game = corner_mate();
        assert!(game.make_move(sq("a1"), sq("a10")));
        let before = game.clone();
        assert!(game.is_checkmate(Side::Blue));
        assert_eq!(game, before);
    }

    #[test]
    fn cannon_cannot_take_cannon() {
        let mut game = position(
            Side::Red,
            &[
                ("e2", PieceKind::General, Side::Red),
                ("e9", PieceKind::General, Side::Blue),
                ("b3", PieceKind::Cannon, Side::Red),
                ("b5", PieceKind::Soldier, Side::Blue),
                ("b8", PieceKind::Cannon, Side::Blue),
            ],
        );
        assert_eq!(
            game.try_move(sq("b3"), sq("b8")),
            Err(MoveError::NotReachable { from: sq("b3"), to: sq("b8") })
        );
        assert!(game.make_move(sq("b3"), sq("b7")));
    }

    #[test]
    fn finished_games_stay_finished() {
        let mut game = Game::new();
        game.set_status(GameStatus::BlueWon);
        game.set_status(GameStatus::InProgress);
        assert_eq!(game.status(), GameStatus::BlueWon);
        assert!(!game.make_move_named("e7", "e6"));
    }

    #[test]
    fn legal_moves_respect_turn() {
        let game = Game::new();
        assert!(game.legal_moves_from(sq("e4")).is_empty());
        let soldier = game.legal_moves_from(sq("e7"));
        assert_eq!(soldier, vec![sq("d7"), sq("e6"), sq("e7"), sq("f7")]);
        let all = game.legal_moves();
        assert!(all.iter().all(|m| game.square(m.from).is_some_and(|p| p.side == Side::Blue)));
        assert!(all.iter().any(|m| m.is_pass()));
    }
}
