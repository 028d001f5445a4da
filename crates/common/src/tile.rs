// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use serde::{Deserialize, Serialize};
use std::fmt;

/// A two-character glyph occupying a map cell. Only printable, non-control,
/// non-emoji characters are admissible on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    left: char,
    right: char,
}

/// The glyph the map loader stamps on any cell whose source pixel is dark
/// enough to be lethal.
pub const TRAP_GLYPH: &str = "##";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TileError {
    #[error("tile text must be exactly two characters, got {0:?}")]
    WrongLength(String),
    #[error("tile text contains a non-printable or control character: {0:?}")]
    NotPrintable(String),
}

impl Tile {
    pub fn new(text: &str) -> Result<Self, TileError> {
        let mut chars = text.chars();
        let (Some(left), Some(right), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(TileError::WrongLength(text.to_string()));
        };
        if !is_admissible_glyph_char(left) || !is_admissible_glyph_char(right) {
            return Err(TileError::NotPrintable(text.to_string()));
        }
        Ok(Self { left, right })
    }

    pub fn trap() -> Self {
        Self::new(TRAP_GLYPH).expect("trap glyph is always admissible")
    }

    pub fn as_str(&self) -> String {
        format!("{}{}", self.left, self.right)
    }
}

/// Printable, non-control, non-emoji: excludes control characters and the
/// Unicode ranges used for emoji and other pictographic symbols.
fn is_admissible_glyph_char(c: char) -> bool {
    if c.is_control() {
        return false;
    }
    let cp = c as u32;
    let in_emoji_range = matches!(cp,
        0x1F000..=0x1FFFF | 0x2600..=0x27BF | 0x2190..=0x21FF | 0xFE00..=0xFE0F
    );
    !in_emoji_range
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.left, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileWire {
    #[serde(rename = "str")]
    pub str: String,
}

impl From<Tile> for TileWire {
    fn from(tile: Tile) -> Self {
        TileWire { str: tile.as_str() }
    }
}

impl TryFrom<TileWire> for Tile {
    type Error = TileError;
    fn try_from(wire: TileWire) -> Result<Self, Self::Error> {
        Tile::new(&wire.str)
    }
}
