//! Spatial grid partitioning for efficient neighbor queries.
//!
//! This module provides O(1) cell lookup and O(K) neighbor queries where K is the average
//! neighbors per cell, replacing O(N²) brute-force iteration.
//!
//! ## Cell Size Choice
//!
//! The grid is rebuilt every tick with a cell size derived from the largest
//! live bubble: `cell = 2 · max_size · OVERLAP_MARGIN`, i.e. the widest
//! possible overlap distance.  A pair query then checks only the 3×3 block
//! around a bubble's own cell.  Entries are indices into the world's bubble
//! list, which is stable for the duration of one tick.

use bevy::prelude::*;
use std::collections::HashMap;

/// Smallest cell size accepted; keeps degenerate (zero-size) worlds finite.
const MIN_CELL_SIZE: f32 = 0.01;

/// Uniform hash grid over bubble indices.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    /// Map from cell coordinates to index list
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::with_cell_size(1.0)
    }
}

impl SpatialGrid {
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(MIN_CELL_SIZE),
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Compute grid cell coordinates for a world position
    fn world_to_cell(&self, pos: Vec2) -> (i32, i32) {
        let x = (pos.x / self.cell_size).floor() as i32;
        let y = (pos.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Insert an index at a position. Call after [`Self::rebuild`] or [`Self::clear`].
    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let cell = self.world_to_cell(pos);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Clear all grid data and adopt a new cell size.
    pub fn rebuild(&mut self, cell_size: f32) {
        self.clear();
        self.cell_size = cell_size.max(MIN_CELL_SIZE);
    }

    /// Clear all grid data.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// All indices in cells overlapping the square around `pos` of half-size
    /// `max_distance`.  Results include indices outside the circle — callers
    /// must do the exact distance check themselves.
    pub fn query(&self, pos: Vec2, max_distance: f32) -> impl Iterator<Item = usize> + '_ {
        let cell = self.world_to_cell(pos);
        let r = self.radius_in_cells(max_distance);
        (-r..=r)
            .flat_map(move |dx| (-r..=r).map(move |dy| (cell.0 + dx, cell.1 + dy)))
            .filter_map(move |c| self.cells.get(&c))
            .flat_map(|v| v.iter().copied())
    }

    /// Compute how many cells in each direction we need to check for a given max distance
    fn radius_in_cells(&self, max_distance: f32) -> i32 {
        ((max_distance / self.cell_size).ceil() as i32).max(1)
    }
}
