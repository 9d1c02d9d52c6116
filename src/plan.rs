//! Resolved plans and their serialized layout form.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::distinct_rotations;
use crate::grid::Grid;
use crate::placement::{Placement, PlacementKey, Placements};
use crate::score;
use crate::search::WorkingPlan;
use crate::tiles::{Catalog, TileClass};

/// One placed tile, with enough detail for a caller to realize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedTile {
    pub tile_id: String,
    pub class: TileClass,
    pub rotation: usize,
    pub anchor: (usize, usize),
    /// Covered cells as (x, y), sorted.
    pub cells: Vec<(usize, usize)>,
}

impl PlacedTile {
    fn from_placement(placement: &Placement, catalog: &Catalog, grid: &Grid) -> Self {
        let mut cells: Vec<_> = placement.covered.iter().map(|&cell| grid.coord(cell)).collect();
        cells.sort_unstable();
        Self {
            tile_id: catalog[placement.shape].id.clone(),
            class: placement.class,
            rotation: placement.rotation,
            anchor: placement.anchor,
            cells,
        }
    }

    pub fn layout_entry(&self) -> LayoutEntry {
        LayoutEntry {
            id: self.tile_id.clone(),
            x: self.anchor.0,
            y: self.anchor.1,
            rotation: self.rotation,
        }
    }
}

/// Chosen primary and secondary tiles, in the order the search chose them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub primary: Vec<PlacedTile>,
    pub secondary: Vec<PlacedTile>,
}

impl Plan {
    /// Resolves placement keys to tiles.
    pub fn resolve(
        working: &WorkingPlan,
        placements: &Placements,
        catalog: &Catalog,
        grid: &Grid,
    ) -> Self {
        let resolve = |keys: &[PlacementKey]| -> Vec<PlacedTile> {
            keys.iter()
                .map(|&key| PlacedTile::from_placement(placements.get(key), catalog, grid))
                .collect()
        };
        Self {
            primary: resolve(&working.primary),
            secondary: resolve(&working.secondary),
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> {
        self.primary.iter().chain(&self.secondary)
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }

    /// Scores the plan from its cells alone.
    ///
    /// Two tiles touch when a cell of one is 4-adjacent to a cell of the
    /// other; the plan is assumed to be non-overlapping.
    pub fn score(&self) -> f64 {
        let pairs = self
            .primary
            .iter()
            .map(|primary| {
                self.secondary
                    .iter()
                    .filter(|secondary| touches(primary, secondary))
                    .count()
            })
            .sum();
        score::formula(self.primary.len(), pairs)
    }

    /// Layout descriptors for every tile, primaries first.
    pub fn layout(&self) -> Vec<LayoutEntry> {
        self.tiles().map(PlacedTile::layout_entry).collect()
    }
}

fn touches(a: &PlacedTile, b: &PlacedTile) -> bool {
    a.cells
        .iter()
        .any(|&(ax, ay)| b.cells.iter().any(|&(bx, by)| ax.abs_diff(bx) + ay.abs_diff(by) == 1))
}

/// Serialized placement: tile id, anchor and rotation index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: String,
    pub x: usize,
    pub y: usize,
    pub rotation: usize,
}

/// A saved layout with the score it was produced with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    /// `None` when no plan was found.
    pub score: Option<f64>,
    pub placements: Vec<LayoutEntry>,
}

/// Re-realizes layout entries against a catalog and grid.
///
/// Fails when an entry names an unknown tile, a rotation the tile does not
/// have, leaves the grid, or covers a cell another entry already covers.
pub fn check_layout(
    catalog: &Catalog,
    grid: &Grid,
    entries: &[LayoutEntry],
) -> Result<Plan, LayoutError> {
    let mut owners: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut plan = Plan::default();

    for (entry_index, entry) in entries.iter().enumerate() {
        let shape_index = catalog
            .index_of(&entry.id)
            .ok_or_else(|| LayoutError::UnknownTile {
                entry: entry_index,
                id: entry.id.clone(),
            })?;
        let shape = &catalog[shape_index];
        let rotations = distinct_rotations(&shape.cells());
        let rotation = rotations
            .iter()
            .find(|rotation| rotation.index == entry.rotation)
            .ok_or_else(|| LayoutError::UnknownRotation {
                entry: entry_index,
                id: entry.id.clone(),
                rotation: entry.rotation,
            })?;

        let mut cells = Vec::with_capacity(rotation.offsets.len());
        for &(dx, dy) in &rotation.offsets {
            let x = entry.x as i64 + dx as i64;
            let y = entry.y as i64 + dy as i64;
            if !grid.contains(x, y) {
                return Err(LayoutError::OutOfBounds {
                    entry: entry_index,
                    id: entry.id.clone(),
                    x,
                    y,
                });
            }
            let cell = (x as usize, y as usize);
            if let Some(&first) = owners.get(&cell) {
                return Err(LayoutError::Overlap {
                    first,
                    second: entry_index,
                    x: cell.0,
                    y: cell.1,
                });
            }
            owners.insert(cell, entry_index);
            cells.push(cell);
        }
        cells.sort_unstable();

        let tile = PlacedTile {
            tile_id: shape.id.clone(),
            class: shape.class,
            rotation: rotation.index,
            anchor: (entry.x, entry.y),
            cells,
        };
        match shape.class {
            TileClass::Primary => plan.primary.push(tile),
            TileClass::Secondary => plan.secondary.push(tile),
        }
    }

    Ok(plan)
}
