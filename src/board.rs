use serde::{Deserialize, Serialize};

use crate::fortress;
use crate::piece::{Piece, PieceKind, Side};
use crate::square::{Square, COLS, ROWS};

const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; COLS]; ROWS],
        }
    }

    /// The standard starting layout: red on rows 1-4, blue on rows 7-10.
    pub fn new() -> Self {
        let mut board = Board::empty();
        // e1/e10 stay empty; the General starts one row in.
        let back_rank = [
            Some(PieceKind::Chariot),
            Some(PieceKind::Elephant),
            Some(PieceKind::Horse),
            Some(PieceKind::Guard),
            None,
            Some(PieceKind::Guard),
            Some(PieceKind::Elephant),
            Some(PieceKind::Horse),
            Some(PieceKind::Chariot),
        ];

        for (side, back, general, cannons, soldiers) in [(Side::Red, 1, 2, 3, 4), (Side::Blue, 10, 9, 8, 7)] {
            for (col, kind) in back_rank.iter().enumerate() {
                if let Some(kind) = *kind {
                    board.put(col as u8, back, kind, side);
                }
            }
            board.put(4, general, PieceKind::General, side);
            board.put(1, cannons, PieceKind::Cannon, side);
            board.put(7, cannons, PieceKind::Cannon, side);
            for col in (0..COLS as u8).step_by(2) {
                board.put(col, soldiers, PieceKind::Soldier, side);
            }
        }
        board
    }

    fn put(&mut self, col: u8, row: u8, kind: PieceKind, side: Side) {
        self.set(Square::at(col, row), Some(Piece::new(kind, side)));
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        let (r, c) = sq.index();
        self.squares[r][c]
    }

    /// Overwrite a square unconditionally.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        let (r, c) = sq.index();
        self.squares[r][c] = piece;
    }

    /// Every occupied square with its piece.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn find_general(&self, side: Side) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.is_general() && p.side == side)
            .map(|(sq, _)| sq)
    }

    fn is_own(&self, sq: Square, side: Side) -> bool {
        self.get(sq).is_some_and(|p| p.side == side)
    }

    /// Destinations the piece on `origin` may move to by its movement rule,
    /// always including `origin` itself (a pass). Whether the move exposes the
    /// mover's own General is not considered here.
    pub fn candidate_moves(&self, origin: Square) -> Vec<Square> {
        let Some(piece) = self.get(origin) else {
            return Vec::new();
        };
        let mut moves = Vec::new();
        match piece.kind {
            PieceKind::General | PieceKind::Guard => self.generate_palace_moves(origin, piece.side, &mut moves),
            PieceKind::Horse => self.generate_horse_moves(origin, &mut moves),
            PieceKind::Elephant => self.generate_elephant_moves(origin, &mut moves),
            PieceKind::Chariot => self.generate_chariot_moves(origin, piece.side, &mut moves),
            PieceKind::Cannon => self.generate_cannon_moves(origin, piece.side, &mut moves),
            PieceKind::Soldier => self.generate_soldier_moves(origin, piece.side, &mut moves),
        }
        moves.push(origin);
        moves.sort();
        moves.dedup();
        moves
    }

    fn generate_palace_moves(&self, origin: Square, side: Side, moves: &mut Vec<Square>) {
        if !fortress::contains(side, origin) {
            return;
        }
        moves.extend(
            fortress::adjacent(origin)
                .into_iter()
                .filter(|&sq| !self.is_own(sq, side)),
        );
    }

    fn generate_horse_moves(&self, origin: Square, moves: &mut Vec<Square>) {
        for (dc, dr) in ORTHOGONAL {
            let Some(step) = origin.offset(dc, dr) else {
                continue;
            };
            if self.get(step).is_some() {
                continue;
            }
            for (pc, pr) in perpendicular(dc, dr) {
                if let Some(dest) = step.offset(dc + pc, dr + pr) {
                    moves.push(dest);
                }
            }
        }
    }

    fn generate_elephant_moves(&self, origin: Square, moves: &mut Vec<Square>) {
        for (dc, dr) in ORTHOGONAL {
            let Some(first) = origin.offset(dc, dr) else {
                continue;
            };
            if self.get(first).is_some() {
                continue;
            }
            for (pc, pr) in perpendicular(dc, dr) {
                let (ddc, ddr) = (dc + pc, dr + pr);
                let Some(second) = first.offset(ddc, ddr) else {
                    continue;
                };
                if self.get(second).is_some() {
                    continue;
                }
                if let Some(dest) = second.offset(ddc, ddr) {
                    moves.push(dest);
                }
            }
        }
    }

    fn generate_chariot_moves(&self, origin: Square, side: Side, moves: &mut Vec<Square>) {
        for ray in rays(origin) {
            self.slide(ray, side, moves);
        }
    }

    fn generate_cannon_moves(&self, origin: Square, side: Side, moves: &mut Vec<Square>) {
        for ray in rays(origin) {
            self.jump(ray, side, moves);
        }
    }

    /// Walk a ray: empty squares are reachable, the first occupied square is
    /// reachable only if it holds an enemy.
    fn slide(&self, ray: Vec<Square>, side: Side, moves: &mut Vec<Square>) {
        for sq in ray {
            match self.get(sq) {
                None => moves.push(sq),
                Some(p) => {
                    if p.side != side {
                        moves.push(sq);
                    }
                    break;
                }
            }
        }
    }

    /// Walk a ray as a cannon: exactly one non-cannon screen must be jumped,
    /// then empty squares are reachable up to and including an enemy
    /// non-cannon.
    fn jump(&self, ray: Vec<Square>, side: Side, moves: &mut Vec<Square>) {
        let mut squares = ray.into_iter();
        let screened = squares
            .by_ref()
            .find_map(|sq| self.get(sq))
            .is_some_and(|screen| !screen.is_cannon());
        if !screened {
            return;
        }
        for sq in squares {
            match self.get(sq) {
                None => moves.push(sq),
                Some(p) => {
                    if p.side != side && !p.is_cannon() {
                        moves.push(sq);
                    }
                    break;
                }
            }
        }
    }

    fn generate_soldier_moves(&self, origin: Square, side: Side, moves: &mut Vec<Square>) {
        let forward = side.forward();
        let steps = [(-1, 0), (1, 0), (0, forward)]
            .into_iter()
            .chain(
                fortress::diagonal_directions(origin)
                    .into_iter()
                    .filter(|&(_, dr)| dr == forward),
            );
        for (dc, dr) in steps {
            if let Some(dest) = origin.offset(dc, dr) {
                if !self.is_own(dest, side) {
                    moves.push(dest);
                }
            }
        }
    }
}

/// The two unit vectors perpendicular to an orthogonal direction.
fn perpendicular(dc: i32, dr: i32) -> [(i32, i32); 2] {
    if dc == 0 {
        [(-1, 0), (1, 0)]
    } else {
        [(0, -1), (0, 1)]
    }
}

/// Lines a chariot or cannon travels from `origin`: the four orthogonal rays
/// to the board edge, plus any marked fortress diagonals through `origin`.
fn rays(origin: Square) -> Vec<Vec<Square>> {
    let mut out: Vec<Vec<Square>> = ORTHOGONAL
        .iter()
        .map(|&(dc, dr)| {
            std::iter::successors(origin.offset(dc, dr), |sq| sq.offset(dc, dr)).collect()
        })
        .collect();

    let home = fortress::owner(origin);
    for (dc, dr) in fortress::diagonal_directions(origin) {
        out.push(
            std::iter::successors(origin.offset(dc, dr), |sq| sq.offset(dc, dr))
                .take_while(|&sq| fortress::owner(sq) == home && fortress::on_diagonal(sq))
                .collect(),
        );
    }
    out
}
