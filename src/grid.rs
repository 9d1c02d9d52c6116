//! Grid representation and cell indexing.
//!
//! Cells are packed into a dense id `x * height + y` so placements can store
//! covered and border cells as sorted integer lists and compare them cheaply.

use crate::error::{PlanError, Result};
use crate::plan::{PlacedTile, Plan};
use crate::tiles::TileClass;

/// Packed cell index, see [`Grid::cell_id`].
pub type CellId = u32;

/// A bounded `width x height` board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    /// Every cell must be addressable by a [`CellId`].
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PlanError::InvalidGrid { width, height });
        }
        match width.checked_mul(height) {
            Some(cells) if cells - 1 <= CellId::MAX as usize => Ok(Self { width, height }),
            _ => Err(PlanError::GridTooLarge { width, height }),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Converts (x, y) to a packed cell id. Index order is x-major.
    ///
    /// Cannot truncate for in-bounds cells, see [`Grid::new`].
    #[inline(always)]
    pub fn cell_id(&self, x: usize, y: usize) -> CellId {
        (x * self.height + y) as CellId
    }

    /// Converts a packed cell id back to (x, y).
    #[inline(always)]
    pub fn coord(&self, cell: CellId) -> (usize, usize) {
        let cell = cell as usize;
        (cell / self.height, cell % self.height)
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (0..self.width as i64).contains(&x) && (0..self.height as i64).contains(&y)
    }

    /// In-bounds 4-neighbors of a cell.
    pub fn neighbors(&self, cell: CellId) -> impl Iterator<Item = CellId> {
        let grid = *self;
        let (x, y) = grid.coord(cell);
        let (x, y) = (x as i64, y as i64);
        [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .filter(move |&(nx, ny)| grid.contains(nx, ny))
            .map(move |(nx, ny)| grid.cell_id(nx as usize, ny as usize))
    }
}

/// Display label for the `index`-th tile of a class in plan order.
///
/// Primaries use `A`-`Z`, secondaries `a`-`z`, cycling after 26.
pub fn label(class: TileClass, index: usize) -> char {
    let base = match class {
        TileClass::Primary => b'A',
        TileClass::Secondary => b'a',
    };
    char::from(base + (index % 26) as u8)
}

/// Every tile of the plan with its display label, primaries first.
pub fn labelled_tiles(plan: &Plan) -> impl Iterator<Item = (char, &PlacedTile)> {
    let primary = plan
        .primary
        .iter()
        .enumerate()
        .map(|(i, tile)| (label(TileClass::Primary, i), tile));
    let secondary = plan
        .secondary
        .iter()
        .enumerate()
        .map(|(i, tile)| (label(TileClass::Secondary, i), tile));
    primary.chain(secondary)
}

/// Formats a plan as a human-readable character grid.
///
/// Primary tiles show as `A`, `B`, ... and secondary tiles as `a`, `b`, ...
/// in plan order. Empty cells show as '.'. Rows run from y=0 downwards.
pub fn format_plan(grid: &Grid, plan: &Plan) -> String {
    let mut canvas = vec!['.'; grid.cell_count()];

    for (display_char, tile) in labelled_tiles(plan) {
        for &(x, y) in &tile.cells {
            canvas[y * grid.width + x] = display_char;
        }
    }

    let mut output = String::with_capacity(grid.cell_count() + grid.height);
    for row in canvas.chunks(grid.width) {
        output.extend(row);
        output.push('\n');
    }
    output
}
