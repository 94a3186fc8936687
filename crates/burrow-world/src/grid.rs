//! 2D soil grid: terrain layers, tunnel timers and spatial queries.

use burrow_core::{Error, Position, Result};
use serde::{Deserialize, Serialize};

/// Half-width of the box searched by [`Grid::is_near_water`] (7x7)
pub const NEAR_WATER_RADIUS: i32 = 3;
/// Half-width of the box sampled by [`Grid::water_influence`] (11x11)
pub const WATER_INFLUENCE_RADIUS: i32 = 5;
/// Half-width of the box searched by [`Grid::nearest_water`] (21x21)
pub const WATER_SEARCH_RADIUS: i32 = 10;

/// A bounded 2D grid. Row 0 is the surface, rows grow downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    water: Vec<bool>,
    gas_chambers: Vec<bool>,
    tunnels: Vec<u32>,
    tunnel_duration: u32,
}

impl Grid {
    /// Plain soil with no water, gas or tunnels
    pub fn new(width: i32, height: i32, tunnel_duration: u32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let size = width.checked_mul(height).ok_or_else(|| {
            Error::Validation(format!("a {}x{} grid has too many cells", width, height))
        })? as usize;
        Ok(Self {
            width,
            height,
            water: vec![false; size],
            gas_chambers: vec![false; size],
            tunnels: vec![0; size],
            tunnel_duration,
        })
    }

    /// Build a grid from explicit row-major layers
    pub fn from_layers(
        width: i32,
        height: i32,
        water: Vec<bool>,
        gas_chambers: Vec<bool>,
        tunnel_duration: u32,
    ) -> Result<Self> {
        let mut grid = Self::new(width, height, tunnel_duration)?;
        let size = grid.water.len();
        if water.len() != size || gas_chambers.len() != size {
            return Err(Error::Validation(format!(
                "layer sizes ({}, {}) do not match a {}x{} grid",
                water.len(),
                gas_chambers.len(),
                width,
                height
            )));
        }
        if water.iter().zip(&gas_chambers).any(|(w, g)| *w && *g) {
            return Err(Error::Validation(
                "a cell cannot be both water and a gas chamber".to_string(),
            ));
        }
        grid.water = water;
        grid.gas_chambers = gas_chambers;
        Ok(grid)
    }

    pub fn tunnel_duration(&self) -> u32 {
        self.tunnel_duration
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn is_water(&self, pos: Position) -> bool {
        self.index(pos).map_or(false, |i| self.water[i])
    }

    pub fn is_gas_chamber(&self, pos: Position) -> bool {
        self.index(pos).map_or(false, |i| self.gas_chambers[i])
    }

    /// Open soil: in bounds, neither water nor gas chamber
    pub fn is_empty(&self, pos: Position) -> bool {
        self.index(pos)
            .map_or(false, |i| !self.water[i] && !self.gas_chambers[i])
    }

    /// Any water within the 7x7 box centred on `pos`
    pub fn is_near_water(&self, pos: Position) -> bool {
        if !self.is_valid_position(pos) {
            return false;
        }
        self.window(pos, NEAR_WATER_RADIUS).any(|p| self.is_water(p))
    }

    /// Fraction of in-bounds cells in the 11x11 box that are water
    pub fn water_influence(&self, pos: Position) -> f64 {
        if !self.is_valid_position(pos) {
            return 0.0;
        }
        let mut total = 0u32;
        let mut wet = 0u32;
        for p in self.window(pos, WATER_INFLUENCE_RADIUS) {
            total += 1;
            if self.is_water(p) {
                wet += 1;
            }
        }
        if total == 0 {
            0.0
        } else {
            wet as f64 / total as f64
        }
    }

    /// Closest water cell in the 21x21 box; the first one scanned wins ties
    pub fn nearest_water(&self, pos: Position) -> Option<Position> {
        if !self.is_valid_position(pos) {
            return None;
        }
        let mut best: Option<(i32, Position)> = None;
        for p in self.window(pos, WATER_SEARCH_RADIUS) {
            if !self.is_water(p) {
                continue;
            }
            let d = pos.distance_squared(&p);
            if best.map_or(true, |(best_d, _)| d < best_d) {
                best = Some((d, p));
            }
        }
        best.map(|(_, p)| p)
    }

    pub fn has_tunnel_at(&self, pos: Position) -> bool {
        self.index(pos).map_or(false, |i| self.tunnels[i] > 0)
    }

    /// Ticks left before the tunnel at `pos` collapses
    pub fn tunnel_remaining(&self, pos: Position) -> Option<u32> {
        self.index(pos).map(|i| self.tunnels[i])
    }

    /// Re-arm the tunnel timer of a cell. Out-of-bounds is a no-op.
    pub fn mark_tunnel_cell(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.tunnels[i] = self.tunnel_duration;
        }
    }

    /// Mark every cell on the straight line between two cells
    pub fn mark_tunnel_line(&mut self, from: Position, to: Position) {
        for pos in line_cells(from, to) {
            self.mark_tunnel_cell(pos);
        }
    }

    /// Age every tunnel by one tick
    pub fn decay_tunnels(&mut self) {
        for timer in &mut self.tunnels {
            *timer = timer.saturating_sub(1);
        }
    }

    pub(crate) fn set_water(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.water[i] = true;
        }
    }

    pub(crate) fn set_gas_chamber(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            if !self.water[i] {
                self.gas_chambers[i] = true;
            }
        }
    }

    pub fn water_cell_count(&self) -> usize {
        self.water.iter().filter(|w| **w).count()
    }

    pub fn gas_chamber_count(&self) -> usize {
        self.gas_chambers.iter().filter(|g| **g).count()
    }

    pub fn cell_count(&self) -> usize {
        self.water.len()
    }

    pub fn tunnel_count(&self) -> usize {
        self.tunnels.iter().filter(|t| **t > 0).count()
    }

    /// In-bounds cells of the square window centred on `pos`, row by row
    pub fn window(&self, pos: Position, radius: i32) -> impl Iterator<Item = Position> + '_ {
        (-radius..=radius).flat_map(move |dy| {
            (-radius..=radius)
                .map(move |dx| pos.add(dx, dy))
                .filter(move |p| self.is_valid_position(*p))
        })
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.water.len()).map(move |i| self.index_to_pos(i))
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_valid_position(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }
}

/// Cells on the Bresenham line from `from` to `to`, both ends included
pub fn line_cells(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut current = from;
    let mut cells = Vec::with_capacity((dx - dy + 1) as usize);

    loop {
        cells.push(current);
        if current == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_water(cells: &[(i32, i32)]) -> Grid {
        let mut grid = Grid::new(20, 20, 10).unwrap();
        for (x, y) in cells {
            grid.set_water(Position::new(*x, *y));
        }
        grid
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 8, 100).unwrap();
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 8);
        assert_eq!(grid.positions().count(), 80);
        assert!(Grid::new(0, 8, 100).is_err());
        assert!(Grid::new(8, -1, 100).is_err());
    }

    #[test]
    fn test_rejects_overflowing_dimensions() {
        let err = Grid::new(50_000, 50_000, 100).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(Grid::new(20, 20, 10).unwrap().cell_count(), 400);
    }

    #[test]
    fn test_out_of_bounds_queries() {
        let mut grid = Grid::new(10, 10, 100).unwrap();
        let outside = Position::new(-1, 3);

        assert!(!grid.is_valid_position(outside));
        assert!(!grid.is_water(outside));
        assert!(!grid.is_gas_chamber(outside));
        assert!(!grid.is_empty(outside));
        assert!(!grid.is_near_water(outside));
        assert!(!grid.has_tunnel_at(outside));
        assert_eq!(grid.tunnel_remaining(Position::new(10, 0)), None);
        assert_eq!(grid.water_influence(outside), 0.0);
        assert_eq!(grid.nearest_water(outside), None);

        // Mutations out of bounds are ignored
        grid.mark_tunnel_cell(Position::new(3, 10));
        assert_eq!(grid.tunnel_count(), 0);
    }

    #[test]
    fn test_near_water_box() {
        let grid = grid_with_water(&[(10, 10)]);
        assert!(grid.is_near_water(Position::new(13, 13)));
        assert!(grid.is_near_water(Position::new(7, 10)));
        assert!(!grid.is_near_water(Position::new(14, 10)));
        assert!(!grid.is_near_water(Position::new(10, 6)));
    }

    #[test]
    fn test_water_influence() {
        let mut grid = Grid::new(11, 11, 10).unwrap();
        assert_eq!(grid.water_influence(Position::new(5, 5)), 0.0);

        for pos in grid.positions().collect::<Vec<_>>() {
            if pos.x < 6 {
                grid.set_water(pos);
            }
        }
        let influence = grid.water_influence(Position::new(5, 5));
        assert!((influence - 66.0 / 121.0).abs() < 1e-9);

        // Corner cell only samples its in-bounds quarter
        assert_eq!(grid.water_influence(Position::new(0, 0)), 1.0);
    }

    #[test]
    fn test_nearest_water() {
        let grid = grid_with_water(&[(2, 2), (15, 10), (12, 10)]);
        assert_eq!(grid.nearest_water(Position::new(10, 10)), Some(Position::new(12, 10)));
        assert_eq!(grid.nearest_water(Position::new(3, 3)), Some(Position::new(2, 2)));

        // Outside the 21x21 window
        let far = grid_with_water(&[(0, 0)]);
        assert_eq!(far.nearest_water(Position::new(15, 15)), None);
    }

    #[test]
    fn test_nearest_water_tie_takes_first_scanned() {
        let grid = grid_with_water(&[(12, 10), (8, 10), (10, 8)]);
        // (10, 8) is scanned first (smaller row)
        assert_eq!(grid.nearest_water(Position::new(10, 10)), Some(Position::new(10, 8)));
    }

    #[test]
    fn test_tunnel_timer_lifecycle() {
        let mut grid = Grid::new(10, 10, 3).unwrap();
        let pos = Position::new(4, 4);
        grid.mark_tunnel_cell(pos);
        assert_eq!(grid.tunnel_remaining(pos), Some(3));

        grid.decay_tunnels();
        assert_eq!(grid.tunnel_remaining(pos), Some(2));

        grid.mark_tunnel_cell(pos);
        assert_eq!(grid.tunnel_remaining(pos), Some(3));

        for _ in 0..5 {
            grid.decay_tunnels();
        }
        assert_eq!(grid.tunnel_remaining(pos), Some(0));
        assert!(!grid.has_tunnel_at(pos));
    }

    #[test]
    fn test_gas_never_overwrites_water() {
        let mut grid = grid_with_water(&[(1, 1)]);
        grid.set_gas_chamber(Position::new(1, 1));
        grid.set_gas_chamber(Position::new(2, 1));
        assert!(!grid.is_gas_chamber(Position::new(1, 1)));
        assert!(grid.is_gas_chamber(Position::new(2, 1)));
        assert!(!grid.is_empty(Position::new(2, 1)));
        assert!(grid.is_empty(Position::new(3, 1)));
    }

    #[test]
    fn test_from_layers() {
        let mut water = vec![false; 6];
        water[1] = true;
        let mut gas = vec![false; 6];
        gas[4] = true;
        let grid = Grid::from_layers(3, 2, water.clone(), gas.clone(), 5).unwrap();
        assert!(grid.is_water(Position::new(1, 0)));
        assert!(grid.is_gas_chamber(Position::new(1, 1)));

        assert!(Grid::from_layers(3, 3, water.clone(), gas.clone(), 5).is_err());

        let mut clash = gas;
        clash[1] = true;
        assert!(Grid::from_layers(3, 2, water, clash, 5).is_err());
    }

    #[test]
    fn test_line_cells() {
        let start = Position::new(0, 0);
        assert_eq!(line_cells(start, start), vec![start]);
        assert_eq!(
            line_cells(start, Position::new(3, 0)),
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(3, 0)
            ]
        );

        let diagonal = line_cells(Position::new(5, 5), Position::new(2, 7));
        assert_eq!(diagonal.first(), Some(&Position::new(5, 5)));
        assert_eq!(diagonal.last(), Some(&Position::new(2, 7)));
        assert_eq!(diagonal.len(), 4);
    }
}
