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

//! The immutable tile map a world's sessions walk on. Built once at startup
//! from a raster map and never mutated afterwards, so it is freely `Arc`-shared
//! across every session's `ActionQueue` actor without further synchronization.

use gridrunner_common::{Tile, TRAP_GLYPH};
use std::path::Path;

/// Luminance (0-255 scale, ITU-R BT.601 coefficients) above which a pixel
/// becomes a trap cell, per the map file format.
const TRAP_LUMINANCE_THRESHOLD: f32 = 127.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Trap(Tile),
}

impl Cell {
    pub fn tile(&self) -> Option<Tile> {
        match self {
            Cell::Empty => None,
            Cell::Trap(tile) => Some(*tile),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("failed to load map image at {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("map image has zero width or height")]
    EmptyMap,
}

/// A fixed W x H array of cells. Spawn is always `(0,0)`; there is no
/// relocation of the spawn point after load.
#[derive(Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid directly from a dense row-major `Cell` buffer. Exposed for
    /// tests and for callers that already have cells in hand (e.g. a manifest
    /// that inlines a small map).
    pub fn from_cells(width: i32, height: i32, cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), (width * height) as usize);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Load a grid from a raster image, per the wire-documented map format:
    /// each pixel maps to one cell, X indexing image columns and Y indexing
    /// image rows (the `image` crate's native `get_pixel(col, row)` order
    /// already reads this way, so no transpose is needed here), and a cell is
    /// a trap whenever its pixel luminance exceeds
    /// [`TRAP_LUMINANCE_THRESHOLD`].
    pub fn load_from_image(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref)
            .map_err(|source| GridError::Image {
                path: path_ref.display().to_string(),
                source,
            })?
            .into_rgb8();
        let (width, height) = (img.width() as i32, img.height() as i32);
        if width == 0 || height == 0 {
            return Err(GridError::EmptyMap);
        }
        let trap_tile = Tile::new(TRAP_GLYPH).expect("trap glyph is always admissible");
        let mut cells = vec![Cell::Empty; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x as u32, y as u32);
                let luminance = 0.299 * pixel[0] as f32
                    + 0.587 * pixel[1] as f32
                    + 0.114 * pixel[2] as f32;
                let cell = if luminance > TRAP_LUMINANCE_THRESHOLD {
                    Cell::Trap(trap_tile)
                } else {
                    Cell::Empty
                };
                cells[(y * width + x) as usize] = cell;
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Returns `None` for out-of-bounds coordinates; callers are expected to
    /// check `in_bounds` first (reads are undefined otherwise per the spec),
    /// but returning `Option` here keeps this safe regardless.
    pub fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[(y * self.width + x) as usize])
    }

    /// Every distinct glyph a trap tile on this map uses, for the
    /// map-derived VSID reservation rule (`is_reserved_for_map`).
    pub fn trap_glyphs(&self) -> Vec<String> {
        let mut glyphs: Vec<String> = self
            .cells
            .iter()
            .filter_map(|c| c.tile())
            .map(|t| t.as_str())
            .collect();
        glyphs.sort();
        glyphs.dedup();
        glyphs
    }
}
