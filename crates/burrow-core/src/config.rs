//! Configuration types for the simulation.

use crate::{Error, Result, Season};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid (row 0 is the surface)
    pub height: i32,
    /// Number of moles placed at world creation
    pub mole_count: u32,
    /// Number of water blobs
    pub water_count: u32,
    /// Smallest water blob diameter
    pub min_water_size: u32,
    /// Largest water blob diameter
    pub max_water_size: u32,
    /// Season of the run
    pub season: Season,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of worms placed near water at world creation
    pub initial_worms: u32,
    /// Number of mushrooms placed near water at world creation
    pub initial_mushrooms: u32,
    /// Chance that a surface cell near water starts with a root (0.0 to 1.0)
    pub surface_root_probability: f64,
    /// Grid cells per gas chamber cluster
    pub cells_per_gas_cluster: u32,
    /// Smallest number of cells in a gas chamber cluster
    pub min_gas_cluster_size: u32,
    /// Largest number of cells in a gas chamber cluster
    pub max_gas_cluster_size: u32,
    /// Rows below the surface that freeze in winter
    pub frozen_depth: i32,
}

impl WorldConfig {
    /// Default world for a season, with the season's water body count
    pub fn for_season(season: Season) -> Self {
        Self {
            season,
            water_count: season.default_water_count(),
            ..Default::default()
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 60,
            mole_count: 34,
            water_count: Season::Spring.default_water_count(),
            min_water_size: 3,
            max_water_size: 8,
            season: Season::Spring,
            seed: 0,
            initial_worms: 30,
            initial_mushrooms: 10,
            surface_root_probability: 0.3,
            cells_per_gas_cluster: 500,
            min_gas_cluster_size: 4,
            max_gas_cluster_size: 8,
            frozen_depth: 5,
        }
    }
}

/// Mole behaviour parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleConfig {
    /// Seconds needed to cross one cell
    pub move_delay: f64,
    /// Hunger added every tick
    pub hunger_per_tick: u32,
    /// Hunger at which the mole starves
    pub max_hunger: u32,
    /// Ticks between reproduction attempts
    pub reproduction_time: u32,
    /// Chance that an attempt produces offspring
    pub reproduction_probability: f64,
    /// Chance to keep digging along the horizontal heading
    pub horizontal_preference: f64,
    /// Chance per decision to perturb the heading
    pub heading_change_probability: f64,
    /// Largest vertical heading nudge per perturbation
    pub vertical_nudge: f64,
    /// Chance to turn around when the next cell is already tunnelled
    pub tunnel_avoidance_probability: f64,
    /// Water influence above which the mole may steer toward water
    pub water_attraction_threshold: f64,
    /// Chance to steer toward water once the threshold is exceeded
    pub water_attraction_probability: f64,
}

impl Default for MoleConfig {
    fn default() -> Self {
        Self {
            move_delay: 0.05,
            hunger_per_tick: 1,
            max_hunger: 3000,
            reproduction_time: 400,
            reproduction_probability: 0.3,
            horizontal_preference: 0.7,
            heading_change_probability: 0.1,
            vertical_nudge: 0.2,
            tunnel_avoidance_probability: 0.8,
            water_attraction_threshold: 0.5,
            water_attraction_probability: 0.6,
        }
    }
}

/// Worm behaviour parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WormConfig {
    /// Age in ticks at which the worm dies
    pub max_age: u32,
    /// Hunger added every tick
    pub hunger_per_tick: u32,
    /// Hunger at which the worm starves
    pub max_hunger: u32,
    /// Ticks between reproduction attempts
    pub reproduction_time: u32,
    /// Chance that an attempt produces offspring
    pub reproduction_probability: f64,
    /// Chance to crawl one cell per tick
    pub move_probability: f64,
    /// Random samples tried when placing offspring
    pub offspring_search_attempts: u32,
}

impl Default for WormConfig {
    fn default() -> Self {
        Self {
            max_age: 2000,
            hunger_per_tick: 1,
            max_hunger: 300,
            reproduction_time: 200,
            reproduction_probability: 0.5,
            move_probability: 0.01,
            offspring_search_attempts: 24,
        }
    }
}

/// Plant growth parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloraConfig {
    /// Seconds between root growth passes
    pub root_growth_interval: f64,
    /// Chance per pass that a root extends one row down
    pub root_growth_probability: f64,
    /// Deepest row a root may reach
    pub max_root_depth: i32,
    /// Chance per tick that a mushroom spreads
    pub mushroom_spread_probability: f64,
}

impl Default for FloraConfig {
    fn default() -> Self {
        Self {
            root_growth_interval: 5.0,
            root_growth_probability: 0.1,
            max_root_depth: 15,
            mushroom_spread_probability: 0.001,
        }
    }
}

/// Hunger removed by each kind of food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodConfig {
    pub worm: u32,
    pub root: u32,
    pub mushroom: u32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            worm: 100,
            root: 50,
            mushroom: 30,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub mole: MoleConfig,
    pub worm: WormConfig,
    pub flora: FloraConfig,
    pub food: FoodConfig,
    /// Ticks a dug cell stays a tunnel without being revisited
    pub tunnel_duration: u32,
    /// Reproduction probability multiplier applied in winter
    pub winter_reproduction_factor: f64,
    /// Ticks between population metric reports
    pub report_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            mole: MoleConfig::default(),
            worm: WormConfig::default(),
            flora: FloraConfig::default(),
            food: FoodConfig::default(),
            tunnel_duration: 100,
            winter_reproduction_factor: 0.2,
            report_interval: 100,
        }
    }
}

impl SimulationConfig {
    pub fn for_season(season: Season) -> Self {
        Self {
            world: WorldConfig::for_season(season),
            ..Default::default()
        }
    }

    /// Reproduction probability scaled for the season
    pub fn seasonal_probability(&self, base: f64) -> f64 {
        if self.world.season == Season::Winter {
            base * self.winter_reproduction_factor
        } else {
            base
        }
    }

    /// Reject parameters that cannot produce a world.
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        if world.width <= 0 || world.height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                world.width, world.height
            )));
        }
        if world.width.checked_mul(world.height).is_none() {
            return Err(Error::Validation(format!(
                "a {}x{} grid has too many cells",
                world.width, world.height
            )));
        }
        if world.min_water_size == 0 || world.min_water_size > world.max_water_size {
            return Err(Error::Validation(format!(
                "water size range [{}, {}] is empty or inverted",
                world.min_water_size, world.max_water_size
            )));
        }
        if world.min_gas_cluster_size > world.max_gas_cluster_size {
            return Err(Error::Validation(format!(
                "gas cluster size range [{}, {}] is inverted",
                world.min_gas_cluster_size, world.max_gas_cluster_size
            )));
        }
        if world.cells_per_gas_cluster == 0 {
            return Err(Error::Validation(
                "cells_per_gas_cluster must be positive".to_string(),
            ));
        }
        if world.frozen_depth < 0 {
            return Err(Error::Validation("frozen_depth must not be negative".to_string()));
        }
        if world.season.is_frozen() && world.frozen_depth >= world.height {
            return Err(Error::Validation(format!(
                "frozen_depth {} leaves no diggable rows in a grid of height {}",
                world.frozen_depth, world.height
            )));
        }
        check_probability("surface_root_probability", world.surface_root_probability)?;

        if !(self.mole.move_delay.is_finite() && self.mole.move_delay > 0.0) {
            return Err(Error::Validation("mole move_delay must be positive".to_string()));
        }
        check_probability("mole.reproduction_probability", self.mole.reproduction_probability)?;
        check_probability("mole.horizontal_preference", self.mole.horizontal_preference)?;
        check_probability(
            "mole.heading_change_probability",
            self.mole.heading_change_probability,
        )?;
        check_probability(
            "mole.tunnel_avoidance_probability",
            self.mole.tunnel_avoidance_probability,
        )?;
        check_probability(
            "mole.water_attraction_probability",
            self.mole.water_attraction_probability,
        )?;
        if !(self.mole.vertical_nudge.is_finite() && self.mole.vertical_nudge >= 0.0) {
            return Err(Error::Validation(
                "mole vertical_nudge must not be negative".to_string(),
            ));
        }
        if self.mole.max_hunger == 0 || self.worm.max_hunger == 0 || self.worm.max_age == 0 {
            return Err(Error::Validation(
                "hunger and age limits must be positive".to_string(),
            ));
        }

        check_probability("worm.reproduction_probability", self.worm.reproduction_probability)?;
        check_probability("worm.move_probability", self.worm.move_probability)?;

        if !(self.flora.root_growth_interval.is_finite() && self.flora.root_growth_interval > 0.0)
        {
            return Err(Error::Validation(
                "root_growth_interval must be positive".to_string(),
            ));
        }
        check_probability("flora.root_growth_probability", self.flora.root_growth_probability)?;
        check_probability(
            "flora.mushroom_spread_probability",
            self.flora.mushroom_spread_probability,
        )?;
        check_probability("winter_reproduction_factor", self.winter_reproduction_factor)?;

        if self.tunnel_duration == 0 {
            return Err(Error::Validation("tunnel_duration must be positive".to_string()));
        }

        Ok(())
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub simulation: SimulationConfig,
    /// Number of ticks to run
    pub ticks: u64,
    /// Simulated seconds per tick
    pub tick_seconds: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            ticks: 10_000,
            tick_seconds: 1.0 / 60.0,
        }
    }
}

impl RunnerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
