use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseSquareError;

pub const COLS: usize = 9;
pub const ROWS: usize = 10;

/// An intersection on the board: column `a..i`, row `1..10`.
///
/// Internally the column is 0-based and the row 1-based, so `Square::new(4, 7)`
/// is `e7`. Every constructed value is on the board.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    col: u8,
    row: u8,
}

impl Square {
    pub fn new(col: u8, row: u8) -> Option<Square> {
        if (col as usize) < COLS && (1..=ROWS as u8).contains(&row) {
            Some(Square { col, row })
        } else {
            None
        }
    }

    /// Build from a square known to be valid at compile time, e.g. fortress tables.
    pub(crate) const fn at(col: u8, row: u8) -> Square {
        Square { col, row }
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn row(self) -> u8 {
        self.row
    }

    /// The square `dc` columns and `dr` rows away, if it exists.
    pub fn offset(self, dc: i32, dr: i32) -> Option<Square> {
        let c = self.col as i32 + dc;
        let r = self.row as i32 + dr;
        if (0..COLS as i32).contains(&c) && (1..=ROWS as i32).contains(&r) {
            Some(Square { col: c as u8, row: r as u8 })
        } else {
            None
        }
    }

    pub(crate) fn index(self) -> (usize, usize) {
        (self.row as usize - 1, self.col as usize)
    }

    /// All 90 squares, column-major from `a1`.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..COLS as u8).flat_map(|col| (1..=ROWS as u8).map(move |row| Square { col, row }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row)
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file = chars.next().ok_or(ParseSquareError::Empty)?;
        if !('a'..='i').contains(&file) {
            return Err(ParseSquareError::Column(s.to_string()));
        }
        let digits = chars.as_str();
        if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseSquareError::Row(s.to_string()));
        }
        let row: u8 = digits.parse().map_err(|_| ParseSquareError::Row(s.to_string()))?;
        Square::new(file as u8 - b'a', row).ok_or_else(|| ParseSquareError::Row(s.to_string()))
    }
}
