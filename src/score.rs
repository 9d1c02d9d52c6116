//! Plan scoring.
//!
//! `score = primaries * (1 + 0.1 * adjacency_pairs)`, where an adjacency pair
//! is a (primary, secondary) pair of placements in the plan that touch.

use crate::relations::Relations;
use crate::search::WorkingPlan;

/// Weight of each primary/secondary adjacency pair.
pub const ADJACENCY_WEIGHT: f64 = 0.1;

#[inline]
pub fn formula(primary_count: usize, adjacency_pairs: usize) -> f64 {
    primary_count as f64 * (1.0 + ADJACENCY_WEIGHT * adjacency_pairs as f64)
}

/// Counts touching (primary, secondary) pairs from scratch.
pub fn adjacency_pairs(plan: &WorkingPlan, relations: &Relations) -> usize {
    plan.primary
        .iter()
        .map(|&primary| {
            plan.secondary
                .iter()
                .filter(|&&secondary| relations.is_adjacent(primary, secondary))
                .count()
        })
        .sum()
}

/// Recomputes a plan's score without any search state.
pub fn evaluate(plan: &WorkingPlan, relations: &Relations) -> f64 {
    formula(plan.primary.len(), adjacency_pairs(plan, relations))
}
