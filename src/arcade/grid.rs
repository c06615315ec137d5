//! Uniform grid broad phase
//!
//! Each live object is hashed into exactly one cell by its center. With cells
//! at least as wide as the largest object diameter, two circles can only
//! overlap if their cells are neighbours, so each object is tested against
//! the 3x3 block around its own cell.

use std::collections::HashMap;

use super::object::GameObject;

type Cell = (i32, i32);

/// Spatial hash over object indices
#[derive(Debug, Clone)]
pub struct CellGrid {
    base_cell_size: f32,
    cell_size: f32,
    cells: HashMap<Cell, Vec<usize>>,
}

impl CellGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        Self {
            base_cell_size: cell_size,
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Cell size used by the last rebuild
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_of(&self, obj: &GameObject) -> Cell {
        (
            (obj.pos.x / self.cell_size).floor() as i32,
            (obj.pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Re-hash every live object. Cell vectors are reused between frames.
    pub fn rebuild(&mut self, objects: &[GameObject]) {
        let widest = objects
            .iter()
            .filter(|o| !o.destroyed)
            .map(|o| o.radius * 2.0)
            .fold(0.0_f32, f32::max);
        self.cell_size = self.base_cell_size.max(widest);

        self.cells.retain(|_, bucket| !bucket.is_empty());
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }

        for (index, obj) in objects.iter().enumerate() {
            if obj.destroyed {
                continue;
            }
            let cell = self.cell_of(obj);
            self.cells.entry(cell).or_default().push(index);
        }
    }

    /// Append every unordered candidate pair `(i, j)` with `i < j`.
    ///
    /// Pairs come out ordered by `i`, so resolution order is deterministic.
    pub fn candidate_pairs(&self, objects: &[GameObject], out: &mut Vec<(usize, usize)>) {
        for (i, obj) in objects.iter().enumerate() {
            if obj.destroyed {
                continue;
            }
            let (cx, cy) = self.cell_of(obj);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                        continue;
                    };
                    out.extend(bucket.iter().filter(|&&j| j > i).map(|&j| (i, j)));
                }
            }
        }
    }

    /// Objects currently hashed
    pub fn occupancy(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::object::ObjectKind;
    use glam::Vec2;

    fn star(id: u32, x: f32, y: f32, radius: f32) -> GameObject {
        GameObject::new(id, ObjectKind::Star, Vec2::new(x, y), radius)
    }

    fn brute_force(objects: &[GameObject]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..objects.len() {
            for j in i + 1..objects.len() {
                if objects[i].overlaps(&objects[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn test_neighbouring_cells_pair_up() {
        let objects = vec![
            star(1, 9.0, 9.0, 2.0),
            star(2, 11.0, 11.0, 2.0),
            star(3, 200.0, 200.0, 2.0),
        ];
        let mut grid = CellGrid::new(10.0);
        grid.rebuild(&objects);

        let mut pairs = Vec::new();
        grid.candidate_pairs(&objects, &mut pairs);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_cell_grows_to_widest_object() {
        let objects = vec![star(1, 0.0, 0.0, 30.0), star(2, 55.0, 0.0, 30.0)];
        let mut grid = CellGrid::new(10.0);
        grid.rebuild(&objects);
        assert_eq!(grid.cell_size(), 60.0);

        let mut pairs = Vec::new();
        grid.candidate_pairs(&objects, &mut pairs);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_destroyed_objects_skipped() {
        let mut objects = vec![star(1, 0.0, 0.0, 2.0), star(2, 1.0, 0.0, 2.0)];
        objects[1].destroyed = true;
        let mut grid = CellGrid::new(10.0);
        grid.rebuild(&objects);
        assert_eq!(grid.occupancy(), 1);
        let mut pairs = Vec::new();
        grid.candidate_pairs(&objects, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        // Deterministic scatter, including negative coordinates
        let objects: Vec<GameObject> = (0..120)
            .map(|i| {
                let x = ((i * 37) % 211) as f32 - 100.0;
                let y = ((i * 53) % 197) as f32 - 90.0;
                star(i, x, y, 3.0 + (i % 4) as f32)
            })
            .collect();
        let mut grid = CellGrid::new(8.0);
        grid.rebuild(&objects);

        let mut candidates = Vec::new();
        grid.candidate_pairs(&objects, &mut candidates);
        let mut overlapping: Vec<(usize, usize)> = candidates
            .into_iter()
            .filter(|&(i, j)| objects[i].overlaps(&objects[j]))
            .collect();
        overlapping.sort_unstable();

        assert_eq!(overlapping, brute_force(&objects));
    }
}
