//! Worms: slow foragers that stay close to water.

use crate::animal::{feed, Outcome, Vitals};
use crate::flora::Flora;
use crate::grid::Grid;
use burrow_core::{DeathCause, Direction, Position, SimulationConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Half-width of the box searched for a newborn worm's cell (5x5)
pub const OFFSPRING_RADIUS: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worm {
    pub position: Position,
    /// Ticks since the worm was created
    pub age: u32,
    pub vitals: Vitals,
}

impl Worm {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            age: 0,
            vitals: Vitals::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.vitals.alive
    }

    /// Advance the worm by one tick
    pub(crate) fn update(
        &mut self,
        grid: &Grid,
        flora: &mut Flora,
        config: &SimulationConfig,
        rng: &mut ChaCha8Rng,
    ) -> Outcome {
        if !self.is_alive() {
            return Outcome::default();
        }
        let worm = &config.worm;

        self.age = self.age.saturating_add(1);
        let starved = self.vitals.tick_hunger(worm.hunger_per_tick, worm.max_hunger);
        let due = self.vitals.tick_reproduction(worm.reproduction_time);

        if self.age >= worm.max_age {
            self.vitals.die();
            return Outcome::died(DeathCause::OldAge);
        }
        if starved {
            self.vitals.die();
            return Outcome::died(DeathCause::Starvation);
        }
        if grid.is_gas_chamber(self.position) {
            self.vitals.die();
            return Outcome::died(DeathCause::GasChamber);
        }

        let mut outcome = Outcome {
            meals: feed(&mut self.vitals, self.position, None, flora, &config.food),
            ..Default::default()
        };

        if rng.gen_bool(worm.move_probability) {
            let directions = Direction::probe_order();
            let next = self.position.step(directions[rng.gen_range(0..directions.len())]);
            if grid.is_valid_position(next) && !grid.is_water(next) {
                self.position = next;
                if grid.is_gas_chamber(next) {
                    self.vitals.die();
                    outcome.death = Some(DeathCause::GasChamber);
                    return outcome;
                }
            }
        }

        if due {
            let probability = config.seasonal_probability(worm.reproduction_probability);
            outcome.attempted_reproduction = true;
            outcome.wants_offspring = rng.gen_bool(probability);
        }

        outcome
    }
}

/// Random damp, open, unoccupied cell within the 5x5 box around `parent`.
/// Gives up after `attempts` samples.
pub(crate) fn offspring_cell<F>(
    parent: Position,
    grid: &Grid,
    rng: &mut ChaCha8Rng,
    attempts: u32,
    is_occupied: F,
) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    for _ in 0..attempts {
        let candidate = parent.add(
            rng.gen_range(-OFFSPRING_RADIUS..=OFFSPRING_RADIUS),
            rng.gen_range(-OFFSPRING_RADIUS..=OFFSPRING_RADIUS),
        );
        if grid.is_empty(candidate)
            && grid.is_near_water(candidate)
            && !is_occupied(candidate)
        {
            return Some(candidate);
        }
    }
    None
}
