//! Two-phase exhaustive backtracking search.
//!
//! Phase one picks exactly one placement per required primary tile; phase two
//! packs secondary placements that touch the chosen primaries. Feasibility is
//! tracked with per-placement blocked counters that are incremented on commit
//! and decremented on undo, so testing a candidate is a single array read.
//!
//! Key properties:
//! - Commits return a guard that undoes them on drop, so the counters are
//!   restored on every exit path
//! - The best plan is cloned only when a strictly better score is found
//! - The adjacency-pair count for the score is maintained incrementally

use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::placement::{PlacementKey, Placements};
use crate::relations::Relations;
use crate::score;

/// Nodes visited between two clock reads when a time limit is set.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Optional bounds on how long the search may run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub time_limit: Option<Duration>,
    pub node_limit: Option<u64>,
}

/// Whether the search tree was fully explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Every branch was explored; the best plan is optimal.
    Complete,
    /// A limit stopped the search; the best plan is the best seen so far.
    Exhausted,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub primary_nodes: u64,
    pub secondary_nodes: u64,
    /// Maximal packings that were scored.
    pub leaves: u64,
    /// Every score that replaced the best, in order.
    pub improvements: Vec<f64>,
}

impl SearchStats {
    pub fn nodes(&self) -> u64 {
        self.primary_nodes + self.secondary_nodes
    }
}

/// Placement keys chosen along the current search path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingPlan {
    pub primary: Vec<PlacementKey>,
    pub secondary: Vec<PlacementKey>,
}

/// Best (score, plan) found so far, threaded by value through the recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct Best {
    pub score: f64,
    pub plan: WorkingPlan,
}

impl Best {
    /// Starts at negative infinity so the first scored leaf always wins.
    pub fn empty() -> Self {
        Self {
            score: f64::NEG_INFINITY,
            plan: WorkingPlan::default(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.score.is_finite()
    }
}

impl Default for Best {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Best,
    pub status: SearchStatus,
    pub stats: SearchStats,
}

/// Finds the best plan placing one tile per entry of `required`.
///
/// `required` holds catalog shape indices in the order they are placed.
/// A branch in which some required tile has no feasible placement scores
/// nothing; when every branch strands a tile the result has no plan.
pub fn search(
    placements: &Placements,
    relations: &Relations,
    required: &[usize],
    limits: SearchLimits,
) -> SearchOutcome {
    for (position, &shape) in required.iter().enumerate() {
        if placements.of_shape(shape).is_empty() {
            warn!(position, shape, "required tile has no placement on this grid");
        }
    }

    let mut search = Search::new(placements, relations, required, limits);
    let best = search.place_primary(0, Best::empty());
    let status = if search.exhausted {
        SearchStatus::Exhausted
    } else {
        SearchStatus::Complete
    };

    debug!(
        primary_nodes = search.stats.primary_nodes,
        secondary_nodes = search.stats.secondary_nodes,
        leaves = search.stats.leaves,
        improvements = search.stats.improvements.len(),
        ?status,
        "search finished"
    );

    SearchOutcome {
        best,
        status,
        stats: search.stats,
    }
}

/// Mutable search state, restored exactly on every backtrack.
struct Search<'a> {
    relations: &'a Relations,
    /// Candidate placements for each required tile, in placement order.
    candidates: Vec<&'a [PlacementKey]>,
    secondary: &'a [PlacementKey],
    /// Committed placements that make each placement infeasible.
    blocked: Vec<u32>,
    /// Committed primaries adjacent to each secondary placement.
    adjacency: Vec<u32>,
    /// Secondary placements with a zero blocked counter.
    available: usize,
    /// Touching (primary, secondary) pairs in `plan`.
    adjacency_pairs: usize,
    plan: WorkingPlan,
    /// Secondaries blocked for the current packing phase only.
    ineligible: Vec<PlacementKey>,
    stats: SearchStats,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    exhausted: bool,
}

impl<'a> Search<'a> {
    fn new(
        placements: &'a Placements,
        relations: &'a Relations,
        required: &[usize],
        limits: SearchLimits,
    ) -> Self {
        let count = placements.len();
        Self {
            relations,
            candidates: required
                .iter()
                .map(|&shape| placements.of_shape(shape))
                .collect(),
            secondary: placements.secondary_keys(),
            blocked: vec![0; count],
            adjacency: vec![0; count],
            available: 0,
            adjacency_pairs: 0,
            plan: WorkingPlan {
                primary: Vec::with_capacity(required.len()),
                secondary: Vec::new(),
            },
            ineligible: Vec::with_capacity(placements.secondary_keys().len()),
            stats: SearchStats::default(),
            deadline: limits
                .time_limit
                .and_then(|limit| Instant::now().checked_add(limit)),
            node_limit: limits.node_limit,
            exhausted: false,
        }
    }

    fn out_of_budget(&mut self) -> bool {
        if self.exhausted {
            return true;
        }
        let nodes = self.stats.nodes();
        let over_nodes = self.node_limit.is_some_and(|limit| nodes > limit);
        let over_time = nodes % DEADLINE_CHECK_INTERVAL == 1
            && self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if over_nodes || over_time {
            debug!(nodes, "search budget exhausted");
            self.exhausted = true;
        }
        self.exhausted
    }

    /// Chooses a placement for the required tile at `depth`, then recurses.
    fn place_primary(&mut self, depth: usize, mut best: Best) -> Best {
        self.stats.primary_nodes += 1;
        if self.out_of_budget() {
            return best;
        }

        let Some(&candidates) = self.candidates.get(depth) else {
            return self.pack_secondaries(best);
        };

        // no feasible candidate strands this tile and the branch scores nothing
        for &key in candidates {
            if self.blocked[key as usize] != 0 {
                continue;
            }
            let mut commit = self.commit_primary(key);
            best = commit.place_primary(depth + 1, best);
            if commit.exhausted {
                break;
            }
        }

        best
    }

    /// Restricts secondaries to those touching a primary, then packs them.
    fn pack_secondaries(&mut self, best: Best) -> Best {
        let secondary = self.secondary;
        self.available = 0;
        self.ineligible.clear();

        for &key in secondary {
            let index = key as usize;
            if self.blocked[index] == 0 && self.adjacency[index] > 0 {
                self.available += 1;
            } else {
                self.blocked[index] += 1;
                self.ineligible.push(key);
            }
        }

        let best = self.place_secondary(0, best);

        for &key in &self.ineligible {
            self.blocked[key as usize] -= 1;
        }
        best
    }

    /// Enumerates non-overlapping subsets of secondaries in index order.
    ///
    /// Skipping a placement is implicit: the loop moves on to the next index
    /// after the branch that takes it returns.
    fn place_secondary(&mut self, start: usize, mut best: Best) -> Best {
        self.stats.secondary_nodes += 1;
        if self.out_of_budget() {
            return best;
        }
        if self.available == 0 {
            return self.score_leaf(best);
        }

        let secondary = self.secondary;
        for (index, &key) in secondary.iter().enumerate().skip(start) {
            if self.blocked[key as usize] != 0 {
                continue;
            }
            let mut commit = self.commit_secondary(key);
            best = commit.place_secondary(index + 1, best);
            if commit.exhausted {
                break;
            }
        }

        best
    }

    fn score_leaf(&mut self, best: Best) -> Best {
        self.stats.leaves += 1;
        let score = score::formula(self.plan.primary.len(), self.adjacency_pairs);
        if score <= best.score {
            return best;
        }

        debug_assert_eq!(
            self.adjacency_pairs,
            score::adjacency_pairs(&self.plan, self.relations)
        );
        trace!(
            score,
            primary = ?self.plan.primary,
            secondary = ?self.plan.secondary,
            "improved plan"
        );
        self.stats.improvements.push(score);
        Best {
            score,
            plan: self.plan.clone(),
        }
    }

    fn commit_primary(&mut self, key: PlacementKey) -> PrimaryCommit<'_, 'a> {
        let relations = self.relations;
        // a placement blocks itself so a repeated tile cannot reuse it
        self.blocked[key as usize] += 1;
        for &other in relations.overlaps(key) {
            self.blocked[other as usize] += 1;
        }
        for &secondary in relations.adjacent_secondary(key) {
            self.adjacency[secondary as usize] += 1;
        }
        self.plan.primary.push(key);
        PrimaryCommit { search: self, key }
    }

    fn commit_secondary(&mut self, key: PlacementKey) -> SecondaryCommit<'_, 'a> {
        let relations = self.relations;
        self.block(key);
        for &other in relations.overlaps_secondary(key) {
            self.block(other);
        }
        self.adjacency_pairs += self.adjacency[key as usize] as usize;
        self.plan.secondary.push(key);
        SecondaryCommit { search: self, key }
    }

    #[inline]
    fn block(&mut self, key: PlacementKey) {
        let counter = &mut self.blocked[key as usize];
        if *counter == 0 {
            self.available -= 1;
        }
        *counter += 1;
    }

    #[inline]
    fn unblock(&mut self, key: PlacementKey) {
        let counter = &mut self.blocked[key as usize];
        *counter -= 1;
        if *counter == 0 {
            self.available += 1;
        }
    }
}

/// A committed primary placement, undone when dropped.
struct PrimaryCommit<'s, 'a> {
    search: &'s mut Search<'a>,
    key: PlacementKey,
}

impl Drop for PrimaryCommit<'_, '_> {
    fn drop(&mut self) {
        let key = self.key;
        let search = &mut *self.search;
        let relations = search.relations;
        search.plan.primary.pop();
        for &secondary in relations.adjacent_secondary(key) {
            search.adjacency[secondary as usize] -= 1;
        }
        for &other in relations.overlaps(key) {
            search.blocked[other as usize] -= 1;
        }
        search.blocked[key as usize] -= 1;
    }
}

impl<'a> Deref for PrimaryCommit<'_, 'a> {
    type Target = Search<'a>;

    fn deref(&self) -> &Search<'a> {
        self.search
    }
}

impl<'a> DerefMut for PrimaryCommit<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Search<'a> {
        self.search
    }
}

/// A committed secondary placement, undone when dropped.
struct SecondaryCommit<'s, 'a> {
    search: &'s mut Search<'a>,
    key: PlacementKey,
}

impl Drop for SecondaryCommit<'_, '_> {
    fn drop(&mut self) {
        let key = self.key;
        let search = &mut *self.search;
        let relations = search.relations;
        search.plan.secondary.pop();
        search.adjacency_pairs -= search.adjacency[key as usize] as usize;
        for &other in relations.overlaps_secondary(key) {
            search.unblock(other);
        }
        search.unblock(key);
    }
}

impl<'a> Deref for SecondaryCommit<'_, 'a> {
    type Target = Search<'a>;

    fn deref(&self) -> &Search<'a> {
        self.search
    }
}

impl<'a> DerefMut for SecondaryCommit<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Search<'a> {
        self.search
    }
}
