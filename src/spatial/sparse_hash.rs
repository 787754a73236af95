//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::{EntityId, Vec2};

/// Sparse hash grid bucketing entities by cell
///
/// Rebuilt from scratch whenever sensing runs; entities carry their position
/// so radius queries need no second lookup.
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<(EntityId, Vec2)>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }

    pub fn insert(&mut self, entity: EntityId, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((entity, pos));
    }

    /// Entities within `radius` of `center`, nearest first (ties by id)
    ///
    /// Walks the cells under the radius' bounding box, or the occupied cells
    /// when there are fewer of those, so the cost never exceeds the
    /// population.
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        if !(radius >= 0.0) {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        let (min_x, min_y) = self.cell_coord(Vec2::new(center.x - radius, center.y - radius));
        let (max_x, max_y) = self.cell_coord(Vec2::new(center.x + radius, center.y + radius));

        let mut found: Vec<(OrderedFloat<f32>, EntityId)> = Vec::new();
        let mut scan = |cell: &[(EntityId, Vec2)]| {
            for (entity, pos) in cell {
                let dist_sq = center.distance_squared(pos);
                if dist_sq <= radius_sq {
                    found.push((OrderedFloat(dist_sq), *entity));
                }
            }
        };

        let span = (max_x as i64 - min_x as i64 + 1).saturating_mul(max_y as i64 - min_y as i64 + 1);
        if span > self.cells.len() as i64 {
            for ((cx, cy), cell) in &self.cells {
                if (min_x..=max_x).contains(cx) && (min_y..=max_y).contains(cy) {
                    scan(cell);
                }
            }
        } else {
            for cx in min_x..=max_x {
                for cy in min_y..=max_y {
                    if let Some(cell) = self.cells.get(&(cx, cy)) {
                        scan(cell);
                    }
                }
            }
        }

        found.sort_unstable();
        found.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, entities: impl Iterator<Item = (EntityId, Vec2)>) {
        self.clear();
        for (entity, pos) in entities {
            self.insert(entity, pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_spans_multiple_cells() {
        let mut grid = SparseHashGrid::new(100.0);
        grid.insert(EntityId(1), Vec2::new(400.0, 0.0));
        grid.insert(EntityId(2), Vec2::new(600.0, 0.0));
        grid.insert(EntityId(3), Vec2::new(-350.0, -350.0));

        let found = grid.query_radius(Vec2::ZERO, 500.0);
        assert_eq!(found, vec![EntityId(1), EntityId(3)]);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let mut grid = SparseHashGrid::new(64.0);
        grid.insert(EntityId(1), Vec2::new(500.0, 0.0));
        assert_eq!(grid.query_radius(Vec2::ZERO, 500.0), vec![EntityId(1)]);
    }

    #[test]
    fn test_nearest_first() {
        let mut grid = SparseHashGrid::new(10.0);
        grid.rebuild(
            [
                (EntityId(1), Vec2::new(30.0, 0.0)),
                (EntityId(2), Vec2::new(5.0, 0.0)),
                (EntityId(3), Vec2::new(0.0, -20.0)),
            ]
            .into_iter(),
        );
        assert_eq!(grid.query_radius(Vec2::ZERO, 50.0), vec![EntityId(2), EntityId(3), EntityId(1)]);
    }

    #[test]
    fn test_huge_radius_walks_occupied_cells() {
        let mut grid = SparseHashGrid::new(1.0);
        grid.insert(EntityId(1), Vec2::new(7000.0, 0.0));
        grid.insert(EntityId(2), Vec2::new(-9000.0, 0.0));

        // A bounding-box walk here would visit 256 million cells
        assert_eq!(grid.query_radius(Vec2::ZERO, 8000.0), vec![EntityId(1)]);
        assert_eq!(
            grid.query_radius(Vec2::ZERO, f32::INFINITY),
            vec![EntityId(1), EntityId(2)]
        );
        assert!(grid.query_radius(Vec2::ZERO, f32::NAN).is_empty());
    }

    #[test]
    fn test_occupied_walk_respects_box() {
        let mut grid = SparseHashGrid::new(10.0);
        grid.insert(EntityId(1), Vec2::new(15.0, 15.0));
        grid.insert(EntityId(2), Vec2::new(500.0, 500.0));
        // Box spans 9 cells, more than the 2 occupied ones
        assert_eq!(grid.query_radius(Vec2::new(12.0, 12.0), 10.0), vec![EntityId(1)]);
    }

    #[test]
    fn test_rebuild_clears_old_entries() {
        let mut grid = SparseHashGrid::new(10.0);
        grid.insert(EntityId(1), Vec2::ZERO);
        grid.rebuild(std::iter::empty());
        assert!(grid.is_empty());
        assert!(grid.query_radius(Vec2::ZERO, 100.0).is_empty());
    }
}
