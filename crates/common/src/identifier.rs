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

use crate::Color;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier text must be 1 or 2 characters")]
    WrongLength,
    #[error("identifier is reserved")]
    Reserved,
}

/// A presentation identifier: up to two display characters plus a color from
/// the fixed palette. Uniqueness of `(text, color)` pairs within a world is
/// enforced by the session registry, not here; this type only validates shape
/// and the static reservation table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualIdentifier {
    #[serde(rename = "identifierStr")]
    pub text: String,
    pub color: Color,
}

static SESSION_COUNTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+|Hi)$").expect("static pattern is valid"));

impl VisualIdentifier {
    pub fn new(text: impl Into<String>, color: Color) -> Result<Self, IdentifierError> {
        let text = text.into();
        let len = text.chars().count();
        if len == 0 || len > 2 {
            return Err(IdentifierError::WrongLength);
        }
        let identifier = Self { text, color };
        if is_reserved(&identifier.text, identifier.color) {
            return Err(IdentifierError::Reserved);
        }
        Ok(identifier)
    }

    pub fn key(&self) -> (String, Color) {
        (self.text.clone(), self.color)
    }
}

/// `("EE", Red)` and `(\d+|Hi, Yellow)` are reserved across every world: the
/// error marker and the session-counter glyphs the visualizer draws itself.
fn is_reserved(text: &str, color: Color) -> bool {
    if text == "EE" && color == Color::Red {
        return true;
    }
    if color == Color::Yellow && SESSION_COUNTER_PATTERN.is_match(text) {
        return true;
    }
    false
}

/// Additional reservations that depend on the map a world is hosting: when the
/// world's sink paints `White` as the background, a `(text, White)` VSID is
/// reserved if `text` collides with an existing tile glyph on the map, or with
/// the all-spaces text used to draw an empty cell.
pub fn is_reserved_for_map(text: &str, color: Color, map_glyphs: &[String]) -> bool {
    if color != Color::White {
        return false;
    }
    let all_spaces = text.chars().all(|c| c == ' ');
    all_spaces || map_glyphs.iter().any(|g| g == text)
}
