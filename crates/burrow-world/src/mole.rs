//! Moles: tunnel-digging predators with a persistent heading.
//!
//! A mole is either idle on a cell (`progress == 1.0`) choosing where to dig
//! next, or moving toward `target`, marking every cell it passes as tunnel.

use crate::animal::{feed, Outcome, Vitals};
use crate::flora::Flora;
use crate::grid::Grid;
use crate::worm::Worm;
use burrow_core::{DeathCause, Direction, MoleConfig, Position, Season, SimulationConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Largest magnitude of the vertical heading
pub const MAX_VERTICAL_BIAS: f64 = 0.5;

/// Digging preference that survives between moves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// -1 (west) or 1 (east)
    pub horizontal: i32,
    /// In [-0.5, 0.5]; positive digs deeper
    pub vertical: f64,
}

impl Heading {
    pub fn random(rng: &mut ChaCha8Rng) -> Self {
        Self {
            horizontal: if rng.gen_bool(0.5) { 1 } else { -1 },
            vertical: rng.gen_range(-MAX_VERTICAL_BIAS..=MAX_VERTICAL_BIAS),
        }
    }

    fn vertical_step(&self, rng: &mut ChaCha8Rng) -> i32 {
        if self.vertical > 0.0 {
            1
        } else if self.vertical < 0.0 {
            -1
        } else if rng.gen_bool(0.5) {
            1
        } else {
            -1
        }
    }

    fn reverse(&mut self) {
        self.horizontal = -self.horizontal;
    }

    fn drift(&mut self, rng: &mut ChaCha8Rng, nudge: f64) {
        self.reverse();
        let delta = rng.gen_range(-nudge..=nudge);
        self.vertical = (self.vertical + delta).clamp(-MAX_VERTICAL_BIAS, MAX_VERTICAL_BIAS);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mole {
    /// Last cell the mole fully reached
    pub position: Position,
    /// Cell the mole is digging toward
    pub target: Position,
    /// Fraction of the way from `position` to `target`
    pub progress: f64,
    pub heading: Heading,
    pub vitals: Vitals,
}

/// Everything a mole touches while it updates
pub(crate) struct MoleContext<'a> {
    pub grid: &'a mut Grid,
    pub worms: &'a mut [Worm],
    pub flora: &'a mut Flora,
    pub config: &'a SimulationConfig,
    pub rng: &'a mut ChaCha8Rng,
}

impl Mole {
    pub fn new(position: Position, heading: Heading) -> Self {
        Self {
            position,
            target: position,
            progress: 1.0,
            heading,
            vitals: Vitals::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.vitals.alive
    }

    pub fn is_idle(&self) -> bool {
        self.progress >= 1.0
    }

    /// Continuous cell-space coordinates between `position` and `target`
    pub fn interpolated_position(&self) -> (f64, f64) {
        let p = self.progress.clamp(0.0, 1.0);
        (
            self.position.x as f64 + (self.target.x - self.position.x) as f64 * p,
            self.position.y as f64 + (self.target.y - self.position.y) as f64 * p,
        )
    }

    /// Advance the mole by one tick of `delta_time` seconds
    pub(crate) fn update(&mut self, delta_time: f64, ctx: &mut MoleContext<'_>) -> Outcome {
        if !self.is_alive() {
            return Outcome::default();
        }
        let settings: &SimulationConfig = ctx.config;
        let config = &settings.mole;

        if self.vitals.tick_hunger(config.hunger_per_tick, config.max_hunger) {
            self.vitals.die();
            return Outcome::died(DeathCause::Starvation);
        }

        if self.is_idle() {
            let season = settings.world.season;
            let frozen_depth = settings.world.frozen_depth;
            if let Some(target) =
                self.choose_target(&*ctx.grid, ctx.rng, config, season, frozen_depth)
            {
                self.target = target;
                self.progress = 0.0;
            }
        }

        if !self.is_idle() {
            self.progress = (self.progress + delta_time / config.move_delay).min(1.0);
            let reached = self.cell_at_progress();
            ctx.grid.mark_tunnel_line(self.position, reached);

            if self.is_idle() {
                self.position = self.target;
                if ctx.grid.is_gas_chamber(self.position) {
                    self.vitals.die();
                    return Outcome::died(DeathCause::GasChamber);
                }
            }
        }

        let mut outcome = Outcome::default();
        if self.vitals.tick_reproduction(config.reproduction_time) {
            let probability = settings.seasonal_probability(config.reproduction_probability);
            outcome.attempted_reproduction = true;
            outcome.wants_offspring = ctx.rng.gen_bool(probability);
        }

        outcome.meals = feed(
            &mut self.vitals,
            self.position,
            Some(&mut *ctx.worms),
            ctx.flora,
            &settings.food,
        );
        outcome
    }

    /// Grid cell the mole has dug up to at its current progress
    fn cell_at_progress(&self) -> Position {
        let (x, y) = self.interpolated_position();
        Position::new(x.round() as i32, y.round() as i32)
    }

    /// Pick the next cell to dig into, or `None` to stay put this tick
    fn choose_target(
        &mut self,
        grid: &Grid,
        rng: &mut ChaCha8Rng,
        config: &MoleConfig,
        season: Season,
        frozen_depth: i32,
    ) -> Option<Position> {
        let mut candidate = if rng.gen_bool(config.horizontal_preference) {
            self.position.add(self.heading.horizontal, 0)
        } else {
            self.position.add(0, self.heading.vertical_step(rng))
        };
        candidate = clamp_to_grid(grid, candidate);

        if rng.gen_bool(config.heading_change_probability) {
            self.heading.drift(rng, config.vertical_nudge);
        }

        if grid.has_tunnel_at(candidate) && rng.gen_bool(config.tunnel_avoidance_probability) {
            self.heading.reverse();
            candidate = clamp_to_grid(grid, self.position.add(self.heading.horizontal, 0));
        }

        if grid.water_influence(self.position) > config.water_attraction_threshold
            && rng.gen_bool(config.water_attraction_probability)
        {
            if let Some(water) = grid.nearest_water(self.position) {
                candidate = step_toward(self.position, water);
            }
        }

        if grid.is_water(candidate) {
            candidate = Direction::probe_order()
                .into_iter()
                .map(|d| self.position.step(d))
                .find(|p| grid.is_valid_position(*p) && !grid.is_water(*p))?;
        }

        if season.is_frozen() && candidate.y < frozen_depth {
            return None;
        }
        if candidate == self.position {
            return None;
        }
        Some(candidate)
    }
}

fn clamp_to_grid(grid: &Grid, pos: Position) -> Position {
    Position::new(pos.x.clamp(0, grid.width - 1), pos.y.clamp(0, grid.height - 1))
}

/// One cell from `from` toward `to`, along the axis with the larger gap
fn step_toward(from: Position, to: Position) -> Position {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        from
    } else if dx.abs() >= dy.abs() {
        from.add(dx.signum(), 0)
    } else {
        from.add(0, dy.signum())
    }
}

/// First free orthogonal neighbour for a newborn mole, probing east, west,
/// south, north. Water and gas chambers are skipped, as is the frozen band
/// in winter.
pub(crate) fn offspring_cell<F>(
    parent: Position,
    grid: &Grid,
    season: Season,
    frozen_depth: i32,
    is_occupied: F,
) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    Direction::probe_order()
        .into_iter()
        .map(|d| parent.step(d))
        .find(|p| {
            grid.is_empty(*p)
                && !(season.is_frozen() && p.y < frozen_depth)
                && !is_occupied(*p)
        })
}
