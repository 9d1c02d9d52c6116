//! Tile catalog definitions and coordinate types.
//!
//! Each tile is a rectangular boolean mask in its canonical orientation,
//! tagged as either primary (must be placed) or secondary (placed when it
//! touches a primary).

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, InvalidGeometry};

/// A 2D offset or position: `x` is the mask column, `y` the mask row.
pub type Coord = (i32, i32);

/// Which search phase a tile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileClass {
    Primary,
    Secondary,
}

/// A polyomino in its canonical orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileShape {
    pub id: String,
    pub class: TileClass,
    /// `mask[row][col]`, true where the tile occupies a cell.
    pub mask: Vec<Vec<bool>>,
}

impl TileShape {
    pub fn new(id: impl Into<String>, class: TileClass, mask: Vec<Vec<bool>>) -> Self {
        Self {
            id: id.into(),
            class,
            mask,
        }
    }

    /// Builds a shape from text rows where `#` is occupied and `.` is empty.
    pub fn from_rows(
        id: impl Into<String>,
        class: TileClass,
        rows: &[&str],
    ) -> Result<Self, InvalidGeometry> {
        let id = id.into();
        let mask = rows
            .iter()
            .map(|row| parse_mask_row(&id, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { id, class, mask })
    }

    /// Occupied cells as `(x, y)` offsets, in row-major order.
    pub fn cells(&self) -> Vec<Coord> {
        self.mask
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, occupied)| **occupied)
                    .map(move |(x, _)| (x as i32, y as i32))
            })
            .collect()
    }

    pub fn cell_count(&self) -> usize {
        self.mask.iter().flatten().filter(|&&occupied| occupied).count()
    }

    /// Rejects jagged masks and masks without any occupied cell.
    pub fn validate(&self) -> Result<(), InvalidGeometry> {
        let Some(first) = self.mask.first() else {
            return Err(InvalidGeometry::Empty(self.id.clone()));
        };
        let expected = first.len();
        for (row, cells) in self.mask.iter().enumerate() {
            if cells.len() != expected {
                return Err(InvalidGeometry::Jagged {
                    id: self.id.clone(),
                    row,
                    expected,
                    actual: cells.len(),
                });
            }
        }
        if self.cell_count() == 0 {
            return Err(InvalidGeometry::Empty(self.id.clone()));
        }
        Ok(())
    }

    /// Text rows of the mask, the inverse of [`TileShape::from_rows`].
    pub fn rows(&self) -> Vec<String> {
        self.mask
            .iter()
            .map(|row| row.iter().map(|&cell| if cell { '#' } else { '.' }).collect())
            .collect()
    }
}

/// Parses one `#`/`.` mask row.
pub(crate) fn parse_mask_row(id: &str, row: &str) -> Result<Vec<bool>, InvalidGeometry> {
    row.chars()
        .map(|c| match c {
            '#' => Ok(true),
            '.' => Ok(false),
            found => Err(InvalidGeometry::UnexpectedCharacter {
                id: id.to_string(),
                found,
            }),
        })
        .collect()
}

/// A validated set of tile shapes with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    shapes: Vec<TileShape>,
}

impl Catalog {
    pub fn new(shapes: Vec<TileShape>) -> Result<Self, CatalogError> {
        for (index, shape) in shapes.iter().enumerate() {
            shape.validate()?;
            if shapes[..index].iter().any(|other| other.id == shape.id) {
                return Err(CatalogError::DuplicateTile(shape.id.clone()));
            }
        }
        Ok(Self { shapes })
    }

    pub fn shapes(&self) -> &[TileShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.shapes.iter().position(|shape| shape.id == id)
    }

    /// Maps the ordered required-primary list to catalog indices.
    ///
    /// Repeats are kept: each entry is one tile instance to place.
    pub fn resolve_required<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<usize>, CatalogError> {
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                let index = self
                    .index_of(id)
                    .ok_or_else(|| CatalogError::UnknownTile(id.to_string()))?;
                match self.shapes[index].class {
                    TileClass::Primary => Ok(index),
                    TileClass::Secondary => Err(CatalogError::NotPrimary(id.to_string())),
                }
            })
            .collect()
    }
}

impl std::ops::Index<usize> for Catalog {
    type Output = TileShape;

    fn index(&self, index: usize) -> &TileShape {
        &self.shapes[index]
    }
}

/// Demo board width.
pub const DEMO_WIDTH: usize = 5;
/// Demo board height.
pub const DEMO_HEIGHT: usize = 3;

/// The built-in demo catalog: three primaries and a monomino filler.
pub const DEMO_TILES: &[(&str, TileClass, &[&str])] = &[
    // L tetromino
    ("L", TileClass::Primary, &["#.", "#.", "##"]),
    // T tetromino
    ("T", TileClass::Primary, &["###", ".#."]),
    // straight tromino
    ("I", TileClass::Primary, &["###"]),
    // single cell filler
    ("dot", TileClass::Secondary, &["#"]),
];

/// Primary instances the demo requires, largest first.
pub const DEMO_REQUIRED: &[&str] = &["L", "T", "I"];

/// Builds the demo catalog from [`DEMO_TILES`].
pub fn demo_catalog() -> Result<Catalog, CatalogError> {
    let shapes = DEMO_TILES
        .iter()
        .map(|&(id, class, rows)| TileShape::from_rows(id, class, rows))
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(shapes)
}
