//! Error types for catalog loading, grid setup and layout checking.
//!
//! Infeasible inputs (a required tile that fits nowhere) are deliberately not
//! errors: the search just finds no plan for them.

use thiserror::Error;

/// A tile mask that cannot describe a polyomino.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGeometry {
    #[error("tile '{0}' has no occupied cells")]
    Empty(String),
    #[error("tile '{id}' row {row} has {actual} cells, expected {expected}")]
    Jagged {
        id: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("tile '{id}' mask contains unexpected character '{found}'")]
    UnexpectedCharacter { id: String, found: char },
}

/// Problems with the tile catalog or the required-primary list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("invalid tile geometry")]
    Geometry(#[from] InvalidGeometry),
    #[error("tile id '{0}' appears more than once in the catalog")]
    DuplicateTile(String),
    #[error("required tile '{0}' is not in the catalog")]
    UnknownTile(String),
    #[error("required tile '{0}' is a secondary tile")]
    NotPrimary(String),
}

/// A serialized layout that does not fit its catalog or grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout entry {entry} names unknown tile '{id}'")]
    UnknownTile { entry: usize, id: String },
    #[error("layout entry {entry}: tile '{id}' has no distinct rotation {rotation}")]
    UnknownRotation {
        entry: usize,
        id: String,
        rotation: usize,
    },
    #[error("layout entry {entry}: tile '{id}' leaves the grid at ({x}, {y})")]
    OutOfBounds {
        entry: usize,
        id: String,
        x: i64,
        y: i64,
    },
    #[error("layout entries {first} and {second} both cover ({x}, {y})")]
    Overlap {
        first: usize,
        second: usize,
        x: usize,
        y: usize,
    },
}

/// Top-level error for building and running an optimization.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("grid must have positive dimensions, got {width}x{height}")]
    InvalidGrid { width: usize, height: usize },
    #[error("grid {width}x{height} has more cells than a 32-bit cell id can address")]
    GridTooLarge { width: usize, height: usize },
    #[error("more than {limit} placements do not fit a 32-bit placement key")]
    TooManyPlacements { limit: u32 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("failed to {operation} '{}'", path.display())]
    Io {
        operation: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{origin}'")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize {what}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<InvalidGeometry> for PlanError {
    fn from(error: InvalidGeometry) -> Self {
        PlanError::Catalog(CatalogError::Geometry(error))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlanError>;
