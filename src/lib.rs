//! Grid tile-placement optimizer.
//!
//! Places one tile per entry of a required list of primary tiles on a bounded
//! grid, then packs secondary tiles around them, maximizing
//! `primaries * (1 + 0.1 * touching primary/secondary pairs)`.
//!
//! The pipeline runs strictly downwards: geometry, placement enumeration,
//! relation compilation, primary search, secondary search.

pub mod error;
pub mod geometry;
pub mod grid;
pub mod persistence;
pub mod placement;
pub mod plan;
pub mod relations;
pub mod score;
pub mod search;
pub mod tiles;

use tracing::info;

use error::Result;
use grid::Grid;
use placement::Placements;
use plan::{Layout, Plan};
use relations::Relations;
use search::{SearchLimits, SearchStats, SearchStatus};
use tiles::{demo_catalog, Catalog, TileShape, DEMO_HEIGHT, DEMO_REQUIRED, DEMO_WIDTH};

/// A validated optimization input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub grid: Grid,
    pub catalog: Catalog,
    /// Primary tile ids to place, in search order; repeats allowed.
    pub required: Vec<String>,
}

impl Problem {
    /// Validates the grid, every tile mask and the required list.
    pub fn new(
        width: usize,
        height: usize,
        shapes: Vec<TileShape>,
        required: Vec<String>,
    ) -> Result<Self> {
        let grid = Grid::new(width, height)?;
        let catalog = Catalog::new(shapes)?;
        catalog.resolve_required(&required)?;
        Ok(Self {
            grid,
            catalog,
            required,
        })
    }

    /// The built-in demo problem.
    pub fn demo() -> Result<Self> {
        Ok(Self {
            grid: Grid::new(DEMO_WIDTH, DEMO_HEIGHT)?,
            catalog: demo_catalog()?,
            required: DEMO_REQUIRED.iter().map(|id| id.to_string()).collect(),
        })
    }
}

/// Result of one optimization run.
#[derive(Debug, Clone)]
pub struct Optimized {
    /// Negative infinity when no plan places every required tile.
    pub score: f64,
    pub plan: Plan,
    pub status: SearchStatus,
    pub stats: SearchStats,
}

impl Optimized {
    /// The winning score, or `None` if no valid plan was found.
    pub fn score(&self) -> Option<f64> {
        self.score.is_finite().then_some(self.score)
    }

    pub fn is_complete(&self) -> bool {
        self.status == SearchStatus::Complete
    }

    pub fn layout(&self, grid: &Grid) -> Layout {
        Layout {
            width: grid.width(),
            height: grid.height(),
            score: self.score(),
            placements: self.plan.layout(),
        }
    }
}

/// Runs the full pipeline on `problem`.
pub fn optimize(problem: &Problem, limits: SearchLimits) -> Result<Optimized> {
    let required = problem.catalog.resolve_required(&problem.required)?;
    let placements = Placements::enumerate(&problem.catalog, &problem.grid)?;
    let relations = Relations::compile(&problem.grid, &placements);

    let outcome = search::search(&placements, &relations, &required, limits);
    let plan = Plan::resolve(
        &outcome.best.plan,
        &placements,
        &problem.catalog,
        &problem.grid,
    );

    info!(
        placements = placements.len(),
        score = outcome.best.score,
        primaries = plan.primary.len(),
        secondaries = plan.secondary.len(),
        status = ?outcome.status,
        "optimization finished"
    );

    Ok(Optimized {
        score: outcome.best.score,
        plan,
        status: outcome.status,
        stats: outcome.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogError, PlanError};
    use crate::plan::check_layout;
    use crate::tiles::TileClass;
    use std::sync::{Arc, Mutex};

    fn shape(id: &str, class: TileClass, rows: &[&str]) -> TileShape {
        TileShape::from_rows(id, class, rows).unwrap()
    }

    #[test]
    fn test_problem_rejects_secondary_in_required_list() {
        let result = Problem::new(
            2,
            2,
            vec![shape("dot", TileClass::Secondary, &["#"])],
            vec!["dot".to_string()],
        );
        assert!(matches!(
            result,
            Err(PlanError::Catalog(CatalogError::NotPrimary(_)))
        ));
    }

    #[test]
    fn test_problem_rejects_empty_grid() {
        let result = Problem::new(0, 2, vec![], vec![]);
        assert!(matches!(result, Err(PlanError::InvalidGrid { .. })));
    }

    #[test]
    fn test_infeasible_problem_has_no_score() {
        let problem = Problem::new(
            1,
            1,
            vec![shape("domino", TileClass::Primary, &["##"])],
            vec!["domino".to_string()],
        )
        .unwrap();
        let optimized = optimize(&problem, SearchLimits::default()).unwrap();

        assert_eq!(optimized.score(), None);
        assert!(optimized.plan.is_empty());
        assert!(optimized.is_complete());
        assert_eq!(optimized.layout(&problem.grid).score, None);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unplaceable_required_tile_warns_once() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let problem = Problem::new(
            1,
            1,
            vec![shape("domino", TileClass::Primary, &["##"])],
            vec!["domino".to_string()],
        )
        .unwrap();

        tracing::subscriber::with_default(subscriber, || {
            optimize(&problem, SearchLimits::default()).unwrap()
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("WARN").count(), 1, "{output}");
        assert!(output.contains("required tile has no placement"), "{output}");
    }

    #[test]
    fn test_demo_layout_passes_check() {
        let problem = Problem::demo().unwrap();
        let optimized = optimize(&problem, SearchLimits::default()).unwrap();

        assert!(optimized.is_complete());
        assert_eq!(optimized.plan.primary.len(), problem.required.len());
        let score = optimized.score().unwrap();
        assert!(score >= 3.0);
        assert_eq!(optimized.plan.score(), score);

        let layout = optimized.layout(&problem.grid);
        let rechecked = check_layout(&problem.catalog, &problem.grid, &layout.placements).unwrap();
        assert_eq!(rechecked, optimized.plan);
    }
}
