//! Overlap and adjacency graphs between placements.
//!
//! Compiled once per optimization. Each relation is stored as sorted key
//! lists per placement, both in full and split by the class of the other
//! placement so the search never has to filter while it recurses.

use tracing::debug;

use crate::grid::Grid;
use crate::placement::{PlacementKey, Placements};
use crate::tiles::TileClass;

/// Neighbor lists of one relation, split by class.
#[derive(Debug, Clone, Default)]
struct Edges {
    all: Vec<Vec<PlacementKey>>,
    primary: Vec<Vec<PlacementKey>>,
    secondary: Vec<Vec<PlacementKey>>,
}

impl Edges {
    fn with_capacity(count: usize) -> Self {
        Self {
            all: Vec::with_capacity(count),
            primary: Vec::with_capacity(count),
            secondary: Vec::with_capacity(count),
        }
    }

    fn push(&mut self, mut keys: Vec<PlacementKey>, placements: &Placements) {
        keys.sort_unstable();
        let (primary, secondary): (Vec<_>, Vec<_>) = keys
            .iter()
            .copied()
            .partition(|&key| placements.get(key).class == TileClass::Primary);
        self.all.push(keys);
        self.primary.push(primary);
        self.secondary.push(secondary);
    }

    fn count(&self) -> usize {
        self.all.iter().map(Vec::len).sum()
    }
}

/// Per-placement overlap and adjacency lists.
///
/// - Overlap: the two placements share at least one covered cell.
/// - Adjacency: the two placements do not overlap and a covered cell of one
///   lies in the border of the other.
///
/// Both relations are symmetric and never relate a placement to itself.
#[derive(Debug, Clone)]
pub struct Relations {
    overlaps: Edges,
    adjacent: Edges,
}

impl Relations {
    /// Builds both relations from a cell-to-placement occupancy index.
    pub fn compile(grid: &Grid, placements: &Placements) -> Self {
        let count = placements.len();

        // placements covering each cell
        let mut occupants: Vec<Vec<PlacementKey>> = vec![Vec::new(); grid.cell_count()];
        for placement in placements.iter() {
            for &cell in &placement.covered {
                occupants[cell as usize].push(placement.key);
            }
        }

        // mark[q] == p + 1 records that q was already related to p
        let mut overlap_mark = vec![0u32; count];
        let mut adjacent_mark = vec![0u32; count];
        let mut overlaps = Edges::with_capacity(count);
        let mut adjacent = Edges::with_capacity(count);

        for placement in placements.iter() {
            let key = placement.key;
            let stamp = key + 1;

            let mut overlapping = Vec::new();
            for &cell in &placement.covered {
                for &other in &occupants[cell as usize] {
                    if other != key && overlap_mark[other as usize] != stamp {
                        overlap_mark[other as usize] = stamp;
                        overlapping.push(other);
                    }
                }
            }

            let mut touching = Vec::new();
            for &cell in &placement.border {
                for &other in &occupants[cell as usize] {
                    let other_index = other as usize;
                    if overlap_mark[other_index] != stamp && adjacent_mark[other_index] != stamp {
                        adjacent_mark[other_index] = stamp;
                        touching.push(other);
                    }
                }
            }

            overlaps.push(overlapping, placements);
            adjacent.push(touching, placements);
        }

        debug!(
            placements = count,
            overlap_edges = overlaps.count(),
            adjacency_edges = adjacent.count(),
            "compiled placement relations"
        );

        Self { overlaps, adjacent }
    }

    /// Placements sharing a cell with `key`.
    #[inline]
    pub fn overlaps(&self, key: PlacementKey) -> &[PlacementKey] {
        &self.overlaps.all[key as usize]
    }

    #[inline]
    pub fn overlaps_primary(&self, key: PlacementKey) -> &[PlacementKey] {
        &self.overlaps.primary[key as usize]
    }

    #[inline]
    pub fn overlaps_secondary(&self, key: PlacementKey) -> &[PlacementKey] {
        &self.overlaps.secondary[key as usize]
    }

    /// Placements touching `key` without overlapping it.
    #[inline]
    pub fn adjacent(&self, key: PlacementKey) -> &[PlacementKey] {
        &self.adjacent.all[key as usize]
    }

    #[inline]
    pub fn adjacent_primary(&self, key: PlacementKey) -> &[PlacementKey] {
        &self.adjacent.primary[key as usize]
    }

    #[inline]
    pub fn adjacent_secondary(&self, key: PlacementKey) -> &[PlacementKey] {
        &self.adjacent.secondary[key as usize]
    }

    pub fn is_overlapping(&self, a: PlacementKey, b: PlacementKey) -> bool {
        self.overlaps(a).binary_search(&b).is_ok()
    }

    pub fn is_adjacent(&self, a: PlacementKey, b: PlacementKey) -> bool {
        self.adjacent(a).binary_search(&b).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{demo_catalog, Catalog, TileShape, DEMO_HEIGHT, DEMO_WIDTH};

    fn demo() -> (Grid, Placements, Relations) {
        let grid = Grid::new(DEMO_WIDTH, DEMO_HEIGHT).unwrap();
        let placements = Placements::enumerate(&demo_catalog().unwrap(), &grid).unwrap();
        let relations = Relations::compile(&grid, &placements);
        (grid, placements, relations)
    }

    /// Pairwise reference definitions, checked against the compiled lists.
    fn brute_force(placements: &Placements, a: PlacementKey, b: PlacementKey) -> (bool, bool) {
        let (pa, pb) = (placements.get(a), placements.get(b));
        let overlap = pa.covered.iter().any(|&cell| pb.covers(cell));
        let touches = pa.covered.iter().any(|cell| pb.border.contains(cell));
        (overlap, !overlap && touches)
    }

    #[test]
    fn test_relations_match_pairwise_definition() {
        let (_, placements, relations) = demo();
        let count = placements.len() as PlacementKey;
        for a in 0..count {
            for b in 0..count {
                if a == b {
                    assert!(!relations.is_overlapping(a, b));
                    assert!(!relations.is_adjacent(a, b));
                    continue;
                }
                let (overlap, adjacent) = brute_force(&placements, a, b);
                assert_eq!(relations.is_overlapping(a, b), overlap, "overlap {a} {b}");
                assert_eq!(relations.is_adjacent(a, b), adjacent, "adjacency {a} {b}");
            }
        }
    }

    #[test]
    fn test_relations_are_symmetric() {
        let (_, placements, relations) = demo();
        for a in placements.iter().map(|p| p.key) {
            for &b in relations.adjacent(a) {
                assert!(relations.is_adjacent(b, a), "adjacency {a} -> {b} is one-sided");
            }
            for &b in relations.overlaps(a) {
                assert!(relations.is_overlapping(b, a), "overlap {a} -> {b} is one-sided");
            }
        }
    }

    #[test]
    fn test_class_split_partitions_lists() {
        let (_, placements, relations) = demo();
        for placement in placements.iter() {
            let key = placement.key;
            assert_eq!(
                relations.overlaps_primary(key).len() + relations.overlaps_secondary(key).len(),
                relations.overlaps(key).len()
            );
            assert_eq!(
                relations.adjacent_primary(key).len() + relations.adjacent_secondary(key).len(),
                relations.adjacent(key).len()
            );
            assert!(relations
                .adjacent_secondary(key)
                .iter()
                .all(|&other| placements.get(other).class == TileClass::Secondary));
            assert!(relations
                .overlaps_primary(key)
                .iter()
                .all(|&other| placements.get(other).class == TileClass::Primary));
        }
    }

    #[test]
    fn test_monomino_neighbors() {
        let catalog = Catalog::new(vec![
            TileShape::from_rows("p", TileClass::Primary, &["#"]).unwrap(),
            TileShape::from_rows("s", TileClass::Secondary, &["#"]).unwrap(),
        ])
        .unwrap();
        let grid = Grid::new(3, 3).unwrap();
        let placements = Placements::enumerate(&catalog, &grid).unwrap();
        let relations = Relations::compile(&grid, &placements);

        // primary at the centre cell (1, 1) is key 4; the secondary on the same cell is 13
        assert_eq!(relations.overlaps(4), &[13]);
        assert_eq!(relations.adjacent_secondary(4), &[10, 12, 14, 16]);
        assert_eq!(relations.adjacent_primary(4), &[1, 3, 5, 7]);
    }
}
