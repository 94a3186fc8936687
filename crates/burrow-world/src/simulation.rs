//! Simulation engine: owns every entity and advances the world tick by tick.

use crate::animal::{Animal, Meals};
use crate::flora::{Flora, Mushroom, Root};
use crate::grid::Grid;
use crate::mole::{self, Heading, Mole, MoleContext};
use crate::terrain;
use crate::worm::{self, Worm};
use burrow_core::{
    DeathCause, Error, PopulationStats, Position, Result, Season, SimulationConfig, Species,
    TickSummary,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, event, info, instrument, trace, Level};

pub struct Simulation {
    grid: Grid,
    moles: Vec<Mole>,
    worms: Vec<Worm>,
    flora: Flora,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    tick: u64,
    /// Seconds elapsed since the last root growth pass
    growth_accumulator: f64,
    stats: PopulationStats,
}

impl Simulation {
    /// Generate terrain and populate a fresh world from `config`
    #[instrument(skip(config), fields(season = %config.world.season, seed = config.world.seed))]
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.world.seed);
        let grid = terrain::generate(&config.world, config.tunnel_duration, &mut rng)?;

        let mut sim = Self::from_grid(config, grid, rng)?;
        sim.populate();

        info!(
            event = "world_created",
            width = sim.grid.width,
            height = sim.grid.height,
            moles = sim.moles.len(),
            worms = sim.worms.len(),
            roots = sim.flora.live_root_count(),
            mushrooms = sim.flora.live_mushroom_count(),
            water_cells = sim.grid.water_cell_count(),
            gas_chambers = sim.grid.gas_chamber_count(),
            "World created"
        );
        Ok(sim)
    }

    /// Wrap an existing grid with no animals or plants. The grid must match
    /// the configured dimensions.
    pub fn from_grid(config: SimulationConfig, grid: Grid, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        if grid.width != config.world.width || grid.height != config.world.height {
            return Err(Error::Validation(format!(
                "grid is {}x{} but the world is configured as {}x{}",
                grid.width, grid.height, config.world.width, config.world.height
            )));
        }

        Ok(Self {
            grid,
            moles: Vec::new(),
            worms: Vec::new(),
            flora: Flora::new(),
            config,
            rng,
            tick: 0,
            growth_accumulator: 0.0,
            stats: PopulationStats::new(),
        })
    }

    /// Place the starting moles, worms, roots and mushrooms
    fn populate(&mut self) {
        let world = &self.config.world;
        let min_row = if world.season.is_frozen() {
            world.frozen_depth
        } else {
            0
        };

        for _ in 0..world.mole_count {
            let spot = terrain::sample_open_cell(&self.grid, &mut self.rng, min_row, |p| {
                is_occupied(&self.moles, &self.worms, p)
            });
            match spot {
                Some(pos) => {
                    let heading = Heading::random(&mut self.rng);
                    self.grid.mark_tunnel_cell(pos);
                    self.moles.push(Mole::new(pos, heading));
                }
                None => debug!(species = "mole", "No open cell found, skipping placement"),
            }
        }

        for _ in 0..world.initial_worms {
            let spot = terrain::sample_near_water(&self.grid, &mut self.rng, |p| {
                is_occupied(&self.moles, &self.worms, p)
            });
            match spot {
                Some(pos) => self.worms.push(Worm::new(pos)),
                None => debug!(species = "worm", "No damp cell found, skipping placement"),
            }
        }

        for pos in terrain::surface_roots(&self.grid, &mut self.rng, world.surface_root_probability)
        {
            self.flora.plant_root(&self.grid, pos);
        }

        for _ in 0..world.initial_mushrooms {
            let flora = &self.flora;
            let spot = terrain::sample_near_water(&self.grid, &mut self.rng, |p| {
                flora.has_mushroom_at(p)
            });
            match spot {
                Some(pos) => {
                    self.flora.plant_mushroom(&self.grid, pos);
                }
                None => debug!("No damp cell found for mushroom, skipping placement"),
            }
        }
    }

    /// Add a mole with a random heading. Fails on invalid, water, gas or
    /// frozen cells and on cells that already hold a mole.
    pub fn spawn_mole(&mut self, pos: Position) -> bool {
        let world = &self.config.world;
        if !self.grid.is_empty(pos)
            || (world.season.is_frozen() && pos.y < world.frozen_depth)
            || self.moles.iter().any(|m| m.is_alive() && m.position == pos)
        {
            return false;
        }
        let heading = Heading::random(&mut self.rng);
        self.grid.mark_tunnel_cell(pos);
        self.moles.push(Mole::new(pos, heading));
        true
    }

    /// Add a worm. Fails on invalid, water or gas cells and on cells that
    /// already hold a worm.
    pub fn spawn_worm(&mut self, pos: Position) -> bool {
        if !self.grid.is_empty(pos)
            || self.worms.iter().any(|w| w.is_alive() && w.position == pos)
        {
            return false;
        }
        self.worms.push(Worm::new(pos));
        true
    }

    pub fn plant_root(&mut self, pos: Position) -> bool {
        self.flora.plant_root(&self.grid, pos)
    }

    pub fn plant_mushroom(&mut self, pos: Position) -> bool {
        self.flora.plant_mushroom(&self.grid, pos)
    }

    /// Advance the world by one tick of `delta_time` seconds.
    ///
    /// Moles act before worms, so a mole sharing a cell with a worm gets the
    /// food first. Tunnels age once per tick and roots grow whenever the
    /// accumulated time reaches the growth interval.
    pub fn advance(&mut self, delta_time: f64) -> Result<TickSummary> {
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return Err(Error::Validation(format!(
                "delta_time must be a positive number of seconds, got {}",
                delta_time
            )));
        }

        self.tick += 1;
        let mut summary = TickSummary {
            tick: self.tick,
            ..Default::default()
        };

        self.update_moles(delta_time, &mut summary);
        self.update_worms(&mut summary);

        let spread = self
            .flora
            .spread_mushrooms(&self.grid, &mut self.rng, &self.config.flora);
        self.stats.mushrooms_spread += spread as u64;

        self.grid.decay_tunnels();

        self.growth_accumulator += delta_time;
        if self.growth_accumulator >= self.config.flora.root_growth_interval {
            let grown = self
                .flora
                .grow_roots(&self.grid, &mut self.rng, &self.config.flora);
            self.growth_accumulator = 0.0;
            self.stats.roots_grown += grown as u64;
            summary.roots_grown = grown;
        }

        self.flora.prune();

        summary.live_moles = self.moles.len();
        summary.live_worms = self.worms.len();

        if self.config.report_interval > 0 && self.tick % self.config.report_interval == 0 {
            self.emit_population_metrics();
        }

        Ok(summary)
    }

    /// Advance `ticks` times at a fixed cadence and report the totals
    #[instrument(skip(self), fields(season = %self.config.world.season))]
    pub fn run(&mut self, ticks: u64, delta_time: f64) -> Result<PopulationStats> {
        info!("Starting simulation for {} ticks", ticks);

        for _ in 0..ticks {
            self.advance(delta_time)?;
        }

        self.emit_run_summary();
        Ok(self.stats.clone())
    }

    fn update_moles(&mut self, delta_time: f64, summary: &mut TickSummary) {
        // Moles born this tick join after the pass and act from the next tick
        let existing = self.moles.len();
        let mut births: Vec<Mole> = Vec::new();

        for i in 0..existing {
            if !self.moles[i].is_alive() {
                continue;
            }
            let outcome = {
                let mut ctx = MoleContext {
                    grid: &mut self.grid,
                    worms: &mut self.worms[..],
                    flora: &mut self.flora,
                    config: &self.config,
                    rng: &mut self.rng,
                };
                self.moles[i].update(delta_time, &mut ctx)
            };
            let position = self.moles[i].position;

            self.record_meals(outcome.meals, summary);
            if outcome.meals.worm {
                self.stats.record_death(Species::Worm, DeathCause::Eaten);
                summary.deaths += 1;
                debug!(
                    event = "worm_died",
                    cause = ?DeathCause::Eaten,
                    x = position.x,
                    y = position.y,
                    tick = self.tick,
                    "Worm eaten by mole"
                );
            }

            if let Some(cause) = outcome.death {
                self.stats.record_death(Species::Mole, cause);
                summary.deaths += 1;
                debug!(
                    event = "mole_died",
                    cause = ?cause,
                    x = position.x,
                    y = position.y,
                    tick = self.tick,
                    "Mole died"
                );
                continue;
            }

            if !outcome.attempted_reproduction {
                continue;
            }
            let mut born = None;
            if outcome.wants_offspring {
                let world = &self.config.world;
                born = mole::offspring_cell(
                    position,
                    &self.grid,
                    world.season,
                    world.frozen_depth,
                    |p| {
                        is_occupied(&self.moles, &self.worms, p)
                            || births.iter().any(|m: &Mole| m.position == p)
                    },
                );
            }
            self.stats.record_reproduction_attempt(born.is_some());

            if let Some(cell) = born {
                let heading = Heading::random(&mut self.rng);
                self.grid.mark_tunnel_cell(cell);
                births.push(Mole::new(cell, heading));
                self.stats.record_birth(Species::Mole);
                summary.births += 1;
                trace!(event = "mole_born", x = cell.x, y = cell.y, tick = self.tick, "Mole born");
            }
        }

        self.moles.retain(Mole::is_alive);
        self.moles.extend(births);
    }

    fn update_worms(&mut self, summary: &mut TickSummary) {
        let existing = self.worms.len();
        let attempts = self.config.worm.offspring_search_attempts;
        let mut births: Vec<Worm> = Vec::new();

        for i in 0..existing {
            // Worms eaten this tick were already counted in the mole pass
            if !self.worms[i].is_alive() {
                continue;
            }
            let outcome =
                self.worms[i].update(&self.grid, &mut self.flora, &self.config, &mut self.rng);
            let position = self.worms[i].position;

            self.record_meals(outcome.meals, summary);

            if let Some(cause) = outcome.death {
                self.stats.record_death(Species::Worm, cause);
                summary.deaths += 1;
                debug!(
                    event = "worm_died",
                    cause = ?cause,
                    x = position.x,
                    y = position.y,
                    tick = self.tick,
                    "Worm died"
                );
                continue;
            }

            if !outcome.attempted_reproduction {
                continue;
            }
            let mut born = None;
            if outcome.wants_offspring {
                born = worm::offspring_cell(position, &self.grid, &mut self.rng, attempts, |p| {
                    is_occupied(&self.moles, &self.worms, p)
                        || births.iter().any(|w: &Worm| w.position == p)
                });
            }
            self.stats.record_reproduction_attempt(born.is_some());

            if let Some(cell) = born {
                births.push(Worm::new(cell));
                self.stats.record_birth(Species::Worm);
                summary.births += 1;
                trace!(event = "worm_born", x = cell.x, y = cell.y, tick = self.tick, "Worm born");
            }
        }

        self.worms.retain(Worm::is_alive);
        self.worms.extend(births);
    }

    fn record_meals(&mut self, meals: Meals, summary: &mut TickSummary) {
        for kind in meals.kinds() {
            self.stats.record_meal(kind);
        }
        summary.meals += meals.count();
    }

    fn emit_population_metrics(&self) {
        info!(
            event = "population_metrics",
            tick = self.tick,
            live_moles = self.moles.len(),
            live_worms = self.worms.len(),
            live_roots = self.flora.live_root_count(),
            live_mushrooms = self.flora.live_mushroom_count(),
            tunnel_cells = self.grid.tunnel_count(),
            mole_births = self.stats.mole_births,
            worm_births = self.stats.worm_births,
            mole_deaths = self.stats.mole_deaths.total(),
            worm_deaths = self.stats.worm_deaths.total(),
            reproduction_success_rate = format!("{:.2}%", self.stats.reproduction_success_rate()),
            "Population metrics"
        );

        event!(
            Level::INFO,
            gauge_name = "live_moles",
            gauge_value = self.moles.len(),
            "Live moles gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "live_worms",
            gauge_value = self.worms.len(),
            "Live worms gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "tunnel_cells",
            gauge_value = self.grid.tunnel_count(),
            "Tunnel cells gauge"
        );
    }

    fn emit_run_summary(&self) {
        let stats = &self.stats;
        info!(
            event = "run_summary",
            final_tick = self.tick,
            surviving_moles = self.moles.len(),
            surviving_worms = self.worms.len(),
            mole_births = stats.mole_births,
            worm_births = stats.worm_births,
            moles_starved = stats.mole_deaths.starvation,
            moles_gassed = stats.mole_deaths.gas_chamber,
            worms_eaten = stats.worms_eaten,
            worms_starved = stats.worm_deaths.starvation,
            worms_old_age = stats.worm_deaths.old_age,
            worms_gassed = stats.worm_deaths.gas_chamber,
            roots_eaten = stats.roots_eaten,
            mushrooms_eaten = stats.mushrooms_eaten,
            roots_grown = stats.roots_grown,
            mushrooms_spread = stats.mushrooms_spread,
            "Run complete"
        );

        event!(
            Level::INFO,
            gauge_name = "final_population",
            gauge_value = self.moles.len() + self.worms.len(),
            "Final population gauge"
        );
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn moles(&self) -> &[Mole] {
        &self.moles
    }

    pub fn worms(&self) -> &[Worm] {
        &self.worms
    }

    pub fn roots(&self) -> &[Root] {
        self.flora.roots()
    }

    pub fn mushrooms(&self) -> &[Mushroom] {
        self.flora.mushrooms()
    }

    /// Every animal, moles first
    pub fn animals(&self) -> impl Iterator<Item = Animal<'_>> + '_ {
        self.moles
            .iter()
            .map(Animal::Mole)
            .chain(self.worms.iter().map(Animal::Worm))
    }

    pub fn season(&self) -> Season {
        self.config.world.season
    }

    /// Ticks advanced so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_water(&self, pos: Position) -> bool {
        self.grid.is_water(pos)
    }

    pub fn is_gas_chamber(&self, pos: Position) -> bool {
        self.grid.is_gas_chamber(pos)
    }

    pub fn has_tunnel_at(&self, pos: Position) -> bool {
        self.grid.has_tunnel_at(pos)
    }

    pub fn tunnel_remaining(&self, pos: Position) -> Option<u32> {
        self.grid.tunnel_remaining(pos)
    }
}

/// A live animal already stands on `pos`
fn is_occupied(moles: &[Mole], worms: &[Worm], pos: Position) -> bool {
    moles.iter().any(|m| m.is_alive() && m.position == pos)
        || worms.iter().any(|w| w.is_alive() && w.position == pos)
}
