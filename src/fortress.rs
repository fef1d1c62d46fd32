// Fortress (palace) geometry. Each side owns a 3x3 block in columns d-f:
// blue on rows 8-10, red on rows 1-3. The two diagonals through the center
// are marked lines that some pieces may travel along.

use crate::piece::Side;
use crate::square::Square;

const ORTHOGONAL: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub fn center(side: Side) -> Square {
    match side {
        Side::Blue => Square::at(4, 9),
        Side::Red => Square::at(4, 2),
    }
}

pub fn contains(side: Side, sq: Square) -> bool {
    let c = center(side);
    (sq.col() as i32 - c.col() as i32).abs() <= 1 && (sq.row() as i32 - c.row() as i32).abs() <= 1
}

/// The side whose fortress holds `sq`, if any.
pub fn owner(sq: Square) -> Option<Side> {
    [Side::Blue, Side::Red].into_iter().find(|&side| contains(side, sq))
}

/// True for the center and the four corners: the points the marked diagonals pass through.
pub fn on_diagonal(sq: Square) -> bool {
    owner(sq).is_some_and(|side| {
        let c = center(side);
        (sq.col() as i32 - c.col() as i32).abs() == (sq.row() as i32 - c.row() as i32).abs()
    })
}

/// Directions of the marked diagonals leaving `sq`: all four from a center,
/// the single inward one from a corner, none elsewhere.
pub fn diagonal_directions(sq: Square) -> Vec<(i32, i32)> {
    let Some(side) = owner(sq) else {
        return Vec::new();
    };
    if !on_diagonal(sq) {
        return Vec::new();
    }
    let c = center(side);
    if sq == c {
        return DIAGONAL.to_vec();
    }
    vec![(
        (c.col() as i32 - sq.col() as i32).signum(),
        (c.row() as i32 - sq.row() as i32).signum(),
    )]
}

/// One-step destinations within the fortress containing `sq`: orthogonal
/// neighbours plus the marked diagonal neighbours.
pub fn adjacent(sq: Square) -> Vec<Square> {
    let Some(side) = owner(sq) else {
        return Vec::new();
    };
    let mut out: Vec<Square> = ORTHOGONAL
        .iter()
        .filter_map(|&(dc, dr)| sq.offset(dc, dr))
        .filter(|&s| contains(side, s))
        .collect();
    out.extend(
        diagonal_directions(sq)
            .into_iter()
            .filter_map(|(dc, dr)| sq.offset(dc, dr)),
    );
    out
}
