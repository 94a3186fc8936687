//! Plant life: roots growing down from the surface and mushrooms spreading
//! through damp soil.

use crate::grid::Grid;
use burrow_core::{FloraConfig, Position};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub position: Position,
    pub alive: bool,
}

impl Root {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn consume(&mut self) {
        self.alive = false;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mushroom {
    pub position: Position,
    pub alive: bool,
}

impl Mushroom {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn consume(&mut self) {
        self.alive = false;
    }
}

/// All plants in the world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flora {
    roots: Vec<Root>,
    mushrooms: Vec<Mushroom>,
}

impl Flora {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    pub fn mushrooms(&self) -> &[Mushroom] {
        &self.mushrooms
    }

    pub fn live_root_count(&self) -> usize {
        self.roots.iter().filter(|r| r.alive).count()
    }

    pub fn live_mushroom_count(&self) -> usize {
        self.mushrooms.iter().filter(|m| m.alive).count()
    }

    pub fn has_root_at(&self, pos: Position) -> bool {
        self.roots.iter().any(|r| r.alive && r.position == pos)
    }

    pub fn has_mushroom_at(&self, pos: Position) -> bool {
        self.mushrooms.iter().any(|m| m.alive && m.position == pos)
    }

    /// Place a root on a dry in-bounds cell that has none yet
    pub fn plant_root(&mut self, grid: &Grid, pos: Position) -> bool {
        if !grid.is_valid_position(pos) || grid.is_water(pos) || self.has_root_at(pos) {
            return false;
        }
        self.roots.push(Root::new(pos));
        true
    }

    /// Place a mushroom on a dry in-bounds cell that has none yet
    pub fn plant_mushroom(&mut self, grid: &Grid, pos: Position) -> bool {
        if !grid.is_valid_position(pos) || grid.is_water(pos) || self.has_mushroom_at(pos) {
            return false;
        }
        self.mushrooms.push(Mushroom::new(pos));
        true
    }

    /// Eat the live root at `pos`, if any
    pub fn consume_root_at(&mut self, pos: Position) -> bool {
        match self.roots.iter_mut().find(|r| r.alive && r.position == pos) {
            Some(root) => {
                root.consume();
                true
            }
            None => false,
        }
    }

    /// Eat the live mushroom at `pos`, if any
    pub fn consume_mushroom_at(&mut self, pos: Position) -> bool {
        match self.mushrooms.iter_mut().find(|m| m.alive && m.position == pos) {
            Some(mushroom) => {
                mushroom.consume();
                true
            }
            None => false,
        }
    }

    /// One growth pass: each root alive at the start of the pass may push a
    /// new root one row down. Returns the number of roots grown.
    pub fn grow_roots(&mut self, grid: &Grid, rng: &mut ChaCha8Rng, config: &FloraConfig) -> u32 {
        let existing = self.roots.len();
        let mut grown = 0;

        for i in 0..existing {
            if !self.roots[i].alive {
                continue;
            }
            if !rng.gen_bool(config.root_growth_probability) {
                continue;
            }
            let below = self.roots[i].position.add(0, 1);
            if below.y > config.max_root_depth {
                continue;
            }
            if self.plant_root(grid, below) {
                trace!(x = below.x, y = below.y, "Root grew");
                grown += 1;
            }
        }

        grown
    }

    /// Per-tick spread: each mushroom may seed a damp neighbouring cell.
    /// Returns the number of new mushrooms.
    pub fn spread_mushrooms(
        &mut self,
        grid: &Grid,
        rng: &mut ChaCha8Rng,
        config: &FloraConfig,
    ) -> u32 {
        let existing = self.mushrooms.len();
        let mut spread = 0;

        for i in 0..existing {
            if !self.mushrooms[i].alive {
                continue;
            }
            if !rng.gen_bool(config.mushroom_spread_probability) {
                continue;
            }
            let target = self.mushrooms[i]
                .position
                .add(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            if grid.is_near_water(target) && self.plant_mushroom(grid, target) {
                trace!(x = target.x, y = target.y, "Mushroom spread");
                spread += 1;
            }
        }

        spread
    }

    /// Drop eaten plants
    pub fn prune(&mut self) {
        self.roots.retain(|r| r.alive);
        self.mushrooms.retain(|m| m.alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn damp_grid() -> Grid {
        let mut grid = Grid::new(12, 12, 10).unwrap();
        grid.set_water(Position::new(6, 6));
        grid
    }

    #[test]
    fn test_plant_rules() {
        let grid = damp_grid();
        let mut flora = Flora::new();

        assert!(flora.plant_root(&grid, Position::new(1, 0)));
        assert!(!flora.plant_root(&grid, Position::new(1, 0)));
        assert!(!flora.plant_root(&grid, Position::new(6, 6)));
        assert!(!flora.plant_root(&grid, Position::new(12, 0)));

        assert!(flora.plant_mushroom(&grid, Position::new(5, 5)));
        assert!(!flora.plant_mushroom(&grid, Position::new(5, 5)));
        // A root and a mushroom may share a cell
        assert!(flora.plant_mushroom(&grid, Position::new(1, 0)));
    }

    #[test]
    fn test_consume_and_prune() {
        let grid = damp_grid();
        let mut flora = Flora::new();
        flora.plant_root(&grid, Position::new(2, 0));
        flora.plant_mushroom(&grid, Position::new(4, 4));

        assert!(flora.consume_root_at(Position::new(2, 0)));
        assert!(!flora.consume_root_at(Position::new(2, 0)));
        assert!(!flora.has_root_at(Position::new(2, 0)));
        assert_eq!(flora.roots().len(), 1);

        assert!(flora.consume_mushroom_at(Position::new(4, 4)));
        flora.prune();
        assert!(flora.roots().is_empty());
        assert!(flora.mushrooms().is_empty());

        // The cell can be replanted once the old root is gone
        assert!(flora.plant_root(&grid, Position::new(2, 0)));
    }

    #[test]
    fn test_roots_grow_down_to_max_depth() {
        let grid = damp_grid();
        let mut flora = Flora::new();
        flora.plant_root(&grid, Position::new(1, 0));
        let config = FloraConfig {
            root_growth_probability: 1.0,
            max_root_depth: 3,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        // A pass only extends roots that existed when it started
        assert_eq!(flora.grow_roots(&grid, &mut rng, &config), 1);
        assert_eq!(flora.live_root_count(), 2);

        for _ in 0..10 {
            flora.grow_roots(&grid, &mut rng, &config);
        }
        assert_eq!(flora.live_root_count(), 4);
        assert!(flora.roots().iter().all(|r| r.position.y <= 3 && r.position.x == 1));
    }

    #[test]
    fn test_roots_do_not_grow_into_water() {
        let mut grid = Grid::new(5, 5, 10).unwrap();
        grid.set_water(Position::new(2, 1));
        let mut flora = Flora::new();
        flora.plant_root(&grid, Position::new(2, 0));
        let config = FloraConfig {
            root_growth_probability: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(flora.grow_roots(&grid, &mut rng, &config), 0);
        assert_eq!(flora.live_root_count(), 1);
    }

    #[test]
    fn test_mushrooms_spread_near_water_only() {
        let grid = damp_grid();
        let mut flora = Flora::new();
        flora.plant_mushroom(&grid, Position::new(5, 6));
        let config = FloraConfig {
            mushroom_spread_probability: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        for _ in 0..200 {
            flora.spread_mushrooms(&grid, &mut rng, &config);
        }

        assert!(flora.live_mushroom_count() > 1);
        for mushroom in flora.mushrooms() {
            assert!(grid.is_near_water(mushroom.position));
            assert!(!grid.is_water(mushroom.position));
        }
        // Every cell holds at most one mushroom
        let mut seen = std::collections::HashSet::new();
        assert!(flora.mushrooms().iter().all(|m| seen.insert(m.position)));
    }

    #[test]
    fn test_no_spread_without_water() {
        let grid = Grid::new(8, 8, 10).unwrap();
        let mut flora = Flora::new();
        flora.plant_mushroom(&grid, Position::new(4, 4));
        let config = FloraConfig {
            mushroom_spread_probability: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        for _ in 0..50 {
            assert_eq!(flora.spread_mushrooms(&grid, &mut rng, &config), 0);
        }
    }
}
