//! State and behaviour shared by every animal: hunger, reproduction
//! bookkeeping and eating whatever shares the animal's cell.

use crate::flora::Flora;
use crate::mole::Mole;
use crate::worm::Worm;
use burrow_core::{DeathCause, FoodConfig, FoodKind, Position, Species};
use serde::{Deserialize, Serialize};

/// Counters every animal carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub hunger: u32,
    pub reproduction_counter: u32,
    pub alive: bool,
}

impl Vitals {
    pub fn new() -> Self {
        Self {
            hunger: 0,
            reproduction_counter: 0,
            alive: true,
        }
    }

    /// Add one tick of hunger. Returns true once the animal has starved.
    pub fn tick_hunger(&mut self, rate: u32, max: u32) -> bool {
        self.hunger = self.hunger.saturating_add(rate);
        self.hunger >= max
    }

    /// Feeding never drives hunger below zero
    pub fn relieve_hunger(&mut self, amount: u32) {
        self.hunger = self.hunger.saturating_sub(amount);
    }

    /// Count one tick toward the next reproduction attempt. Returns true when
    /// an attempt is due, resetting the counter.
    pub fn tick_reproduction(&mut self, threshold: u32) -> bool {
        self.reproduction_counter = self.reproduction_counter.saturating_add(1);
        if self.reproduction_counter >= threshold {
            self.reproduction_counter = 0;
            true
        } else {
            false
        }
    }

    pub fn die(&mut self) {
        self.alive = false;
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new()
    }
}

/// What an animal ate this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Meals {
    pub worm: bool,
    pub root: bool,
    pub mushroom: bool,
}

impl Meals {
    pub fn kinds(&self) -> impl Iterator<Item = FoodKind> {
        [
            (self.worm, FoodKind::Worm),
            (self.root, FoodKind::Root),
            (self.mushroom, FoodKind::Mushroom),
        ]
        .into_iter()
        .filter_map(|(eaten, kind)| eaten.then_some(kind))
    }

    pub fn count(&self) -> u32 {
        self.kinds().count() as u32
    }
}

/// Result of one animal's tick, resolved by the orchestrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub death: Option<DeathCause>,
    /// A reproduction attempt was made this tick
    pub attempted_reproduction: bool,
    /// The attempt succeeded and offspring should be placed
    pub wants_offspring: bool,
    pub meals: Meals,
}

impl Outcome {
    pub fn died(cause: DeathCause) -> Self {
        Self {
            death: Some(cause),
            ..Default::default()
        }
    }
}

/// Eat everything edible at `at`. Pass `prey` to let the eater hunt worms.
pub fn feed(
    vitals: &mut Vitals,
    at: Position,
    prey: Option<&mut [Worm]>,
    flora: &mut Flora,
    food: &FoodConfig,
) -> Meals {
    let mut meals = Meals::default();

    if let Some(worms) = prey {
        if let Some(worm) = worms.iter_mut().find(|w| w.is_alive() && w.position == at) {
            worm.vitals.die();
            vitals.relieve_hunger(food.worm);
            meals.worm = true;
        }
    }

    if flora.consume_root_at(at) {
        vitals.relieve_hunger(food.root);
        meals.root = true;
    }

    if flora.consume_mushroom_at(at) {
        vitals.relieve_hunger(food.mushroom);
        meals.mushroom = true;
    }

    meals
}

/// Borrowed view over either kind of animal
#[derive(Debug, Clone, Copy)]
pub enum Animal<'a> {
    Mole(&'a Mole),
    Worm(&'a Worm),
}

impl<'a> Animal<'a> {
    pub fn species(&self) -> Species {
        match self {
            Animal::Mole(_) => Species::Mole,
            Animal::Worm(_) => Species::Worm,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Animal::Mole(mole) => mole.position,
            Animal::Worm(worm) => worm.position,
        }
    }

    pub fn vitals(&self) -> &'a Vitals {
        match self {
            Animal::Mole(mole) => &mole.vitals,
            Animal::Worm(worm) => &worm.vitals,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.vitals().alive
    }
}
