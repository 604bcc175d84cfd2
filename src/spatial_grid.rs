/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups.
 * It divides the viewport into fixed-size cells, so a radius query only has
 * to look at the 3x3 block of cells around a particle instead of every
 * other particle.
 *
 * The grid is rebuilt from scratch every frame:
 * - Cells are stored in one flat array with a fixed capacity per cell
 * - A full cell silently drops later particles (first-encountered order wins)
 * - Positions outside the grid, e.g. during a resize, are skipped for the frame
 */

use crate::viewport::Bounds;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub cols: usize,
    pub rows: usize,
    capacity: usize,
    // cols * rows * capacity slots; slot k of cell c lives at c * capacity + k
    cells: Vec<usize>,
    counts: Vec<usize>,
    // Particles left out of the last build because their cell was full
    overflow: usize,
    // Particles left out of the last build because they were off the grid
    outside: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, capacity: usize, bounds: Bounds) -> Self {
        let mut grid = Self {
            cell_size,
            cols: 0,
            rows: 0,
            capacity,
            cells: Vec::new(),
            counts: Vec::new(),
            overflow: 0,
            outside: 0,
        };
        grid.resize(bounds);
        grid
    }

    // Grid extents for a viewport; one extra cell absorbs the wrap margin
    pub fn dimensions_for(bounds: Bounds, cell_size: f32) -> (usize, usize) {
        let cols = (bounds.width / cell_size).ceil().max(0.0) as usize + 1;
        let rows = (bounds.height / cell_size).ceil().max(0.0) as usize + 1;
        (cols, rows)
    }

    // Reallocate for new bounds; the next build starts from empty cells
    pub fn resize(&mut self, bounds: Bounds) {
        let (cols, rows) = Self::dimensions_for(bounds, self.cell_size);
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![0; cols * rows * self.capacity];
        self.counts = vec![0; cols * rows];
        self.overflow = 0;
        self.outside = 0;
    }

    // Clear the grid
    pub fn clear(&mut self) {
        self.counts.fill(0);
        self.overflow = 0;
        self.outside = 0;
    }

    // Convert screen coordinates to grid cell coordinates, if they fall on the grid
    #[inline]
    pub fn cell_coords(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let col = (x / self.cell_size).floor();
        let row = (y / self.cell_size).floor();
        // NaN fails both comparisons and is skipped along with off-grid cells
        if !(col >= 0.0 && row >= 0.0) || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    // Insert a particle; returns false when it was left out
    #[inline]
    pub fn insert(&mut self, index: usize, x: f32, y: f32) -> bool {
        let Some((col, row)) = self.cell_coords(x, y) else {
            self.outside += 1;
            return false;
        };
        let cell = row * self.cols + col;
        let count = self.counts[cell];
        if count >= self.capacity {
            self.overflow += 1;
            return false;
        }
        self.cells[cell * self.capacity + count] = index;
        self.counts[cell] = count + 1;
        true
    }

    // Rebuild every cell from the current positions
    pub fn build(&mut self, xs: &[f32], ys: &[f32]) {
        self.clear();
        for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            self.insert(i, x, y);
        }
    }

    // Indices stored in one cell
    #[inline]
    pub fn cell(&self, col: usize, row: usize) -> &[usize] {
        let cell = row * self.cols + col;
        let start = cell * self.capacity;
        &self.cells[start..start + self.counts[cell]]
    }

    // Call f with every particle index in the 3x3 block around (x, y)
    #[inline]
    pub fn for_each_candidate<F: FnMut(usize)>(&self, x: f32, y: f32, mut f: F) {
        let grid_x = (x / self.cell_size).floor();
        let grid_y = (y / self.cell_size).floor();
        if !(grid_x.is_finite() && grid_y.is_finite()) {
            return;
        }
        let grid_x = grid_x as isize;
        let grid_y = grid_y as isize;
        let cols = self.cols as isize;
        let rows = self.rows as isize;

        for y_offset in -1..=1 {
            let check_y = grid_y + y_offset;
            if check_y < 0 || check_y >= rows {
                continue;
            }
            for x_offset in -1..=1 {
                let check_x = grid_x + x_offset;
                if check_x < 0 || check_x >= cols {
                    continue;
                }
                for &j in self.cell(check_x as usize, check_y as usize) {
                    f(j);
                }
            }
        }
    }

    // Collect the neighbors of particle i closer than radius into out.
    // Exact only for radius <= cell_size; farther particles are never seen.
    pub fn query_neighbors(&self, i: usize, xs: &[f32], ys: &[f32], radius: f32, out: &mut Vec<usize>) {
        out.clear();
        let (x, y) = (xs[i], ys[i]);
        let radius_sq = radius * radius;
        self.for_each_candidate(x, y, |j| {
            if j == i {
                return;
            }
            let dx = xs[j] - x;
            let dy = ys[j] - y;
            if dx * dx + dy * dy < radius_sq {
                out.push(j);
            }
        });
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflow(&self) -> usize {
        self.overflow
    }

    pub fn outside(&self) -> usize {
        self.outside
    }

    pub fn occupancy(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.iter().copied()
    }
}
