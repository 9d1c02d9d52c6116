//! Enumeration of every way each tile fits on the grid.
//!
//! Placements are numbered densely from zero in (shape, rotation, anchor)
//! order so that search state can live in flat arrays indexed by key.

use tracing::debug;

use crate::error::{PlanError, Result};
use crate::geometry::{distinct_rotations, Rotation};
use crate::grid::{CellId, Grid};
use crate::tiles::{Catalog, TileClass};

/// Dense placement index.
pub type PlacementKey = u32;

/// One concrete (shape, rotation, anchor) on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub key: PlacementKey,
    /// Catalog index of the tile shape.
    pub shape: usize,
    pub class: TileClass,
    /// Quarter-turn index of the rotation used.
    pub rotation: usize,
    /// Grid position of the rotation's (0, 0) offset.
    pub anchor: (usize, usize),
    /// Occupied cells, sorted.
    pub covered: Vec<CellId>,
    /// In-bounds 4-neighbors of the covered cells that are not covered, sorted.
    pub border: Vec<CellId>,
}

impl Placement {
    #[inline]
    pub fn covers(&self, cell: CellId) -> bool {
        self.covered.binary_search(&cell).is_ok()
    }
}

/// All placements for one grid and catalog.
#[derive(Debug, Clone)]
pub struct Placements {
    items: Vec<Placement>,
    /// Keys of each shape's placements, indexed by catalog index.
    by_shape: Vec<Vec<PlacementKey>>,
    /// Keys of every secondary placement, ascending.
    secondary: Vec<PlacementKey>,
}

impl Placements {
    /// Generates every placement that lies fully inside `grid`.
    ///
    /// Fails only when the placements outnumber [`PlacementKey`].
    pub fn enumerate(catalog: &Catalog, grid: &Grid) -> Result<Self> {
        let mut items = Vec::new();
        let mut by_shape = Vec::with_capacity(catalog.len());
        let mut secondary = Vec::new();

        for (shape_index, shape) in catalog.shapes().iter().enumerate() {
            let shape_rotations = distinct_rotations(&shape.cells());
            let mut keys = Vec::new();

            for rotation in &shape_rotations {
                // a rotation wider or taller than the grid fits nowhere
                if rotation.width > grid.width() || rotation.height > grid.height() {
                    continue;
                }
                for x in 0..=grid.width() - rotation.width {
                    for y in 0..=grid.height() - rotation.height {
                        let key = PlacementKey::try_from(items.len()).map_err(|_| {
                            PlanError::TooManyPlacements {
                                limit: PlacementKey::MAX,
                            }
                        })?;
                        items.push(place(grid, key, shape_index, shape.class, rotation, (x, y)));
                        keys.push(key);
                        if shape.class == TileClass::Secondary {
                            secondary.push(key);
                        }
                    }
                }
            }

            debug!(
                tile = %shape.id,
                rotations = shape_rotations.len(),
                placements = keys.len(),
                "enumerated placements"
            );
            by_shape.push(keys);
        }

        Ok(Self {
            items,
            by_shape,
            secondary,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, key: PlacementKey) -> &Placement {
        &self.items[key as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.items.iter()
    }

    /// Keys of every placement of the shape at `shape` in the catalog.
    pub fn of_shape(&self, shape: usize) -> &[PlacementKey] {
        &self.by_shape[shape]
    }

    pub fn secondary_keys(&self) -> &[PlacementKey] {
        &self.secondary
    }
}

/// Builds one placement with its covered and border cells.
fn place(
    grid: &Grid,
    key: PlacementKey,
    shape: usize,
    class: TileClass,
    rotation: &Rotation,
    anchor: (usize, usize),
) -> Placement {
    let mut covered: Vec<CellId> = rotation
        .offsets
        .iter()
        .map(|&(dx, dy)| grid.cell_id(anchor.0 + dx as usize, anchor.1 + dy as usize))
        .collect();
    covered.sort_unstable();

    let mut border: Vec<CellId> = covered
        .iter()
        .flat_map(|&cell| grid.neighbors(cell))
        .filter(|cell| covered.binary_search(cell).is_err())
        .collect();
    border.sort_unstable();
    border.dedup();

    Placement {
        key,
        shape,
        class,
        rotation: rotation.index,
        anchor,
        covered,
        border,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileShape;

    fn catalog(shapes: &[(&str, TileClass, &[&str])]) -> Catalog {
        Catalog::new(
            shapes
                .iter()
                .map(|&(id, class, rows)| TileShape::from_rows(id, class, rows).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_keys_are_dense_and_ordered() {
        let catalog = catalog(&[
            ("domino", TileClass::Primary, &["##"]),
            ("dot", TileClass::Secondary, &["#"]),
        ]);
        let grid = Grid::new(3, 2).unwrap();
        let placements = Placements::enumerate(&catalog, &grid).unwrap();

        // horizontal: 2 x 2 anchors, vertical: 3 x 1 anchors, dots: 6
        assert_eq!(placements.of_shape(0).len(), 7);
        assert_eq!(placements.of_shape(1).len(), 6);
        assert_eq!(placements.len(), 13);
        for (index, placement) in placements.iter().enumerate() {
            assert_eq!(placement.key as usize, index);
        }
        assert_eq!(placements.secondary_keys(), &[7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_placements_stay_inside_grid() {
        let catalog = catalog(&[("L", TileClass::Primary, &["#.", "#.", "##"])]);
        let grid = Grid::new(4, 3).unwrap();
        let placements = Placements::enumerate(&catalog, &grid).unwrap();

        // upright rotations: 3 x 1 anchors each, lying rotations: 2 x 2 anchors each
        assert_eq!(placements.len(), 2 * 3 + 2 * 4);
        for placement in placements.iter() {
            assert_eq!(placement.covered.len(), 4);
            for &cell in &placement.covered {
                assert!((cell as usize) < grid.cell_count());
            }
        }
    }

    #[test]
    fn test_border_excludes_covered_cells() {
        let catalog = catalog(&[("domino", TileClass::Primary, &["##"])]);
        let grid = Grid::new(3, 3).unwrap();
        let placements = Placements::enumerate(&catalog, &grid).unwrap();

        let first = placements.get(placements.of_shape(0)[0]);
        assert_eq!((first.anchor, first.rotation), ((0, 0), 0));
        assert_eq!(first.covered, vec![grid.cell_id(0, 0), grid.cell_id(1, 0)]);
        let mut expected = vec![grid.cell_id(0, 1), grid.cell_id(1, 1), grid.cell_id(2, 0)];
        expected.sort_unstable();
        assert_eq!(first.border, expected);

        for placement in placements.iter() {
            assert!(placement.border.iter().all(|&cell| !placement.covers(cell)));
        }
    }

    #[test]
    fn test_oversized_tile_has_no_placements() {
        let catalog = catalog(&[("domino", TileClass::Primary, &["##"])]);
        let grid = Grid::new(1, 1).unwrap();
        let placements = Placements::enumerate(&catalog, &grid).unwrap();
        assert!(placements.is_empty());
        assert!(placements.of_shape(0).is_empty());
    }
}
