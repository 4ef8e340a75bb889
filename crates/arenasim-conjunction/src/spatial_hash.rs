//! Spatial-hash broad phase for O(n) conjunction-pair candidate
//! generation.

use std::collections::{HashMap, HashSet};

use arenasim_core::types::Position;
use arenasim_core::EntityId;

pub type CellIndex = (i64, i64, i64);

/// Uniform grid keyed by cell index; cell size equals the WATCH
/// threshold so any pair within range shares a cell or is adjacent.
pub struct SpatialHash {
    cell_size_m: f64,
    cells: HashMap<CellIndex, Vec<EntityId>>,
}

impl SpatialHash {
    pub fn new(cell_size_m: f64) -> Self {
        Self { cell_size_m, cells: HashMap::new() }
    }

    fn index_of(&self, pos: &Position) -> CellIndex {
        (
            (pos.x / self.cell_size_m).floor() as i64,
            (pos.y / self.cell_size_m).floor() as i64,
            (pos.z / self.cell_size_m).floor() as i64,
        )
    }

    pub fn insert(&mut self, id: EntityId, pos: &Position) {
        self.cells.entry(self.index_of(pos)).or_default().push(id);
    }

    /// Unordered candidate pairs: every entity paired with every other
    /// entity in its own cell or one of the 26 neighboring cells,
    /// de-duplicated by `(min_id, max_id)`.
    pub fn candidate_pairs(&self) -> Vec<(EntityId, EntityId)> {
        let mut seen: HashSet<(EntityId, EntityId)> = HashSet::new();
        let mut out = Vec::new();

        for (&(cx, cy, cz), members) in &self.cells {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let neighbor = (cx + dx, cy + dy, cz + dz);
                        let Some(others) = self.cells.get(&neighbor) else { continue };
                        for a in members {
                            for b in others {
                                if a == b {
                                    continue;
                                }
                                let key = if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
                                if seen.insert(key.clone()) {
                                    out.push(key);
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_within_watch_threshold_is_found_across_adjacent_cells() {
        let mut hash = SpatialHash::new(50_000.0);
        hash.insert("a".to_string(), &Position::new(10_000.0, 0.0, 0.0));
        hash.insert("b".to_string(), &Position::new(60_000.0, 0.0, 0.0));
        let pairs = hash.candidate_pairs();
        assert!(pairs.contains(&("a".to_string(), "b".to_string())));
    }

    #[test]
    fn far_apart_entities_are_not_paired() {
        let mut hash = SpatialHash::new(50_000.0);
        hash.insert("a".to_string(), &Position::new(0.0, 0.0, 0.0));
        hash.insert("b".to_string(), &Position::new(10_000_000.0, 0.0, 0.0));
        assert!(hash.candidate_pairs().is_empty());
    }

    #[test]
    fn pairs_are_deduplicated() {
        let mut hash = SpatialHash::new(50_000.0);
        hash.insert("a".to_string(), &Position::new(0.0, 0.0, 0.0));
        hash.insert("b".to_string(), &Position::new(1_000.0, 0.0, 0.0));
        let pairs = hash.candidate_pairs();
        assert_eq!(pairs.len(), 1);
    }
}
