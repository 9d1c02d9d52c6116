//! File I/O for problem definitions and saved layouts.
//!
//! Problem file format (JSON):
//! - `width`, `height`: grid dimensions
//! - `tiles`: list of `{ "id", "class": "primary" | "secondary", "mask" }`,
//!   where each mask row is either a `"#."` string or an array of booleans
//! - `required`: ordered list of primary tile ids, repeats allowed
//!
//! Layouts are written as [`Layout`] JSON: grid size, score and one
//! `{ "id", "x", "y", "rotation" }` descriptor per placed tile.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidGeometry, PlanError, Result};
use crate::plan::Layout;
use crate::tiles::{parse_mask_row, TileClass, TileShape};
use crate::Problem;

/// One mask row as written in a problem file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskRow {
    Text(String),
    Cells(Vec<bool>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub id: String,
    pub class: TileClass,
    pub mask: Vec<MaskRow>,
}

impl TileSpec {
    fn into_shape(self) -> std::result::Result<TileShape, InvalidGeometry> {
        let mask = self
            .mask
            .iter()
            .map(|row| match row {
                MaskRow::Text(text) => parse_mask_row(&self.id, text),
                MaskRow::Cells(cells) => Ok(cells.clone()),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(TileShape::new(self.id, self.class, mask))
    }

    fn from_shape(shape: &TileShape) -> Self {
        Self {
            id: shape.id.clone(),
            class: shape.class,
            mask: shape.rows().into_iter().map(MaskRow::Text).collect(),
        }
    }
}

/// The on-disk form of a [`Problem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFile {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileSpec>,
    pub required: Vec<String>,
}

impl ProblemFile {
    pub fn into_problem(self) -> Result<Problem> {
        let shapes = self
            .tiles
            .into_iter()
            .map(TileSpec::into_shape)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Problem::new(self.width, self.height, shapes, self.required)
    }

    pub fn from_problem(problem: &Problem) -> Self {
        Self {
            width: problem.grid.width(),
            height: problem.grid.height(),
            tiles: problem
                .catalog
                .shapes()
                .iter()
                .map(TileSpec::from_shape)
                .collect(),
            required: problem.required.clone(),
        }
    }
}

/// Parses and validates a problem from JSON text.
///
/// `origin` names the source in error messages.
pub fn parse_problem(text: &str, origin: &str) -> Result<Problem> {
    let file: ProblemFile = serde_json::from_str(text).map_err(|source| PlanError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    file.into_problem()
}

/// Loads and validates a problem file.
pub fn load_problem(path: &Path) -> Result<Problem> {
    let text = read(path)?;
    parse_problem(&text, &path.display().to_string())
}

/// Renders a problem as pretty-printed JSON.
pub fn problem_to_json(problem: &Problem) -> Result<String> {
    serde_json::to_string_pretty(&ProblemFile::from_problem(problem)).map_err(|source| {
        PlanError::Serialize {
            what: "problem".to_string(),
            source,
        }
    })
}

/// Writes a layout as pretty-printed JSON.
pub fn save_layout(path: &Path, layout: &Layout) -> Result<()> {
    let json = serde_json::to_string_pretty(layout).map_err(|source| PlanError::Serialize {
        what: format!("layout '{}'", path.display()),
        source,
    })?;
    fs::write(path, json).map_err(|source| PlanError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a layout written by [`save_layout`].
pub fn load_layout(path: &Path) -> Result<Layout> {
    let text = read(path)?;
    serde_json::from_str(&text).map_err(|source| PlanError::Parse {
        origin: path.display().to_string(),
        source,
    })
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| PlanError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::plan::LayoutEntry;

    const PROBLEM: &str = r###"{
        "width": 4,
        "height": 1,
        "tiles": [
            { "id": "domino", "class": "primary", "mask": ["##"] },
            { "id": "dot", "class": "secondary", "mask": [[true]] }
        ],
        "required": ["domino", "domino"]
    }"###;

    #[test]
    fn test_parse_problem_accepts_both_mask_forms() {
        let problem = parse_problem(PROBLEM, "inline").unwrap();
        assert_eq!(problem.grid.width(), 4);
        assert_eq!(problem.catalog.len(), 2);
        assert_eq!(problem.catalog[0].mask, vec![vec![true, true]]);
        assert_eq!(problem.catalog[1].mask, vec![vec![true]]);
        assert_eq!(problem.required, vec!["domino", "domino"]);
    }

    #[test]
    fn test_parse_problem_reports_invalid_geometry() {
        let text = PROBLEM.replace(r###"["##"]"###, r###"["##", "#"]"###);
        assert!(matches!(
            parse_problem(&text, "inline"),
            Err(PlanError::Catalog(CatalogError::Geometry(
                InvalidGeometry::Jagged { row: 1, .. }
            )))
        ));
    }

    #[test]
    fn test_parse_problem_reports_malformed_json() {
        let error = parse_problem("{ \"width\": ", "broken.json").unwrap_err();
        assert!(matches!(error, PlanError::Parse { .. }));
        assert_eq!(error.to_string(), "failed to parse 'broken.json'");
    }

    #[test]
    fn test_demo_problem_roundtrips_through_json() {
        let problem = Problem::demo().unwrap();
        let json = problem_to_json(&problem).unwrap();
        assert_eq!(parse_problem(&json, "demo").unwrap(), problem);
    }

    #[test]
    fn test_layout_file_roundtrip() {
        let layout = Layout {
            width: 4,
            height: 1,
            score: Some(2.0),
            placements: vec![
                LayoutEntry {
                    id: "domino".to_string(),
                    x: 0,
                    y: 0,
                    rotation: 0,
                },
                LayoutEntry {
                    id: "domino".to_string(),
                    x: 2,
                    y: 0,
                    rotation: 0,
                },
            ],
        };
        let path = std::env::temp_dir().join(format!("tileplan-layout-{}.json", std::process::id()));

        save_layout(&path, &layout).unwrap();
        let loaded = load_layout(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded, layout);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let error = load_layout(Path::new("/nonexistent/tileplan/layout.json")).unwrap_err();
        assert!(matches!(error, PlanError::Io { operation: "read", .. }));
    }
}
