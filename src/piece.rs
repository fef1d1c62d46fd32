use std::fmt;

use serde::{Deserialize, Serialize};

/// The two players. Blue moves first and advances toward row 1; red advances
/// toward row 10.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }

    /// Row delta of a forward soldier step.
    pub fn forward(self) -> i32 {
        match self {
            Side::Blue => -1,
            Side::Red => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Blue => "blue",
            Side::Red => "red",
        }
    }

    pub fn from_name(s: &str) -> Option<Side> {
        match s {
            "blue" | "Blue" => Some(Side::Blue),
            "red" | "Red" => Some(Side::Red),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    General,
    Guard,
    Horse,
    Elephant,
    Chariot,
    Cannon,
    Soldier,
}

impl PieceKind {
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::General => "General",
            PieceKind::Guard => "Guard",
            PieceKind::Horse => "Horse",
            PieceKind::Elephant => "Elephant",
            PieceKind::Chariot => "Chariot",
            PieceKind::Cannon => "Cannon",
            PieceKind::Soldier => "Soldier",
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Piece { kind, side }
    }

    pub fn is_general(&self) -> bool {
        self.kind == PieceKind::General
    }

    pub fn is_cannon(&self) -> bool {
        self.kind == PieceKind::Cannon
    }
}
