//! 2D rotation utilities.
//!
//! A planar tile has four quarter-turn orientations. Symmetric tiles repeat
//! some of them, so only the distinct ones are kept, each remembering the
//! quarter-turn index that produced it.

use rustc_hash::FxHashSet;

use crate::tiles::Coord;

/// Number of quarter-turn rotations of a planar tile.
pub const NUM_ROTATIONS: usize = 4;

/// Quarter-turn rotation functions, indexed by number of turns.
///
/// With `y` growing downwards, each step turns the tile 90 degrees clockwise.
pub const ROTATIONS: [fn(Coord) -> Coord; NUM_ROTATIONS] = [
    |(x, y)| (x, y),   // 0 degrees
    |(x, y)| (-y, x),  // 90 degrees
    |(x, y)| (-x, -y), // 180 degrees
    |(x, y)| (y, -x),  // 270 degrees
];

/// One distinct orientation of a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    /// Quarter turns applied to the canonical mask (0-3).
    pub index: usize,
    /// Occupied offsets, normalized to the origin and sorted.
    pub offsets: Vec<Coord>,
    /// Bounding box width.
    pub width: usize,
    /// Bounding box height.
    pub height: usize,
}

impl Rotation {
    fn new(index: usize, offsets: Vec<Coord>) -> Self {
        let width = offsets.iter().map(|&(x, _)| x).max().map_or(0, |x| x + 1) as usize;
        let height = offsets.iter().map(|&(_, y)| y).max().map_or(0, |y| y + 1) as usize;
        Self {
            index,
            offsets,
            width,
            height,
        }
    }
}

/// Rotates `cells` by `quarter_turns` and normalizes the result.
pub fn rotate(cells: &[Coord], quarter_turns: usize) -> Vec<Coord> {
    let rotate = ROTATIONS[quarter_turns % NUM_ROTATIONS];
    normalize_to_origin(cells.iter().map(|&cell| rotate(cell)).collect())
}

/// Generates the distinct orientations of a tile in quarter-turn order.
///
/// A tile yields 1, 2 or 4 rotations depending on its rotational symmetry.
pub fn distinct_rotations(cells: &[Coord]) -> Vec<Rotation> {
    let mut seen: FxHashSet<Vec<Coord>> = FxHashSet::default();
    let mut rotations = Vec::with_capacity(NUM_ROTATIONS);

    for index in 0..NUM_ROTATIONS {
        let offsets = rotate(cells, index);
        // symmetric tiles reproduce an earlier orientation
        if seen.insert(offsets.clone()) {
            rotations.push(Rotation::new(index, offsets));
        }
    }

    rotations
}

/// Translates coordinates so the minimum x and y are zero, then sorts them.
///
/// Sorting makes two orientations that cover the same cells compare equal.
fn normalize_to_origin(mut coords: Vec<Coord>) -> Vec<Coord> {
    let min_x = coords.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = coords.iter().map(|&(_, y)| y).min().unwrap_or(0);

    for (x, y) in &mut coords {
        *x -= min_x;
        *y -= min_y;
    }

    coords.sort_unstable();
    coords
}
