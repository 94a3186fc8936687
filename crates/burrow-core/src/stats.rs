//! Population statistics tracked across a run.

use crate::{DeathCause, FoodKind, Species};
use serde::{Deserialize, Serialize};

/// Death tallies for one species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathTally {
    pub starvation: u64,
    pub old_age: u64,
    pub gas_chamber: u64,
    pub eaten: u64,
}

impl DeathTally {
    pub fn record(&mut self, cause: DeathCause) {
        match cause {
            DeathCause::Starvation => self.starvation += 1,
            DeathCause::OldAge => self.old_age += 1,
            DeathCause::GasChamber => self.gas_chamber += 1,
            DeathCause::Eaten => self.eaten += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.starvation + self.old_age + self.gas_chamber + self.eaten
    }
}

/// Running totals for the whole simulation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub mole_births: u64,
    pub worm_births: u64,
    pub mole_deaths: DeathTally,
    pub worm_deaths: DeathTally,
    pub worms_eaten: u64,
    pub roots_eaten: u64,
    pub mushrooms_eaten: u64,
    pub roots_grown: u64,
    pub mushrooms_spread: u64,
    pub reproduction_attempts: u64,
    pub reproduction_successes: u64,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_birth(&mut self, species: Species) {
        match species {
            Species::Mole => self.mole_births += 1,
            Species::Worm => self.worm_births += 1,
        }
    }

    pub fn record_death(&mut self, species: Species, cause: DeathCause) {
        match species {
            Species::Mole => self.mole_deaths.record(cause),
            Species::Worm => self.worm_deaths.record(cause),
        }
    }

    pub fn record_meal(&mut self, food: FoodKind) {
        match food {
            FoodKind::Worm => self.worms_eaten += 1,
            FoodKind::Root => self.roots_eaten += 1,
            FoodKind::Mushroom => self.mushrooms_eaten += 1,
        }
    }

    pub fn record_reproduction_attempt(&mut self, succeeded: bool) {
        self.reproduction_attempts += 1;
        if succeeded {
            self.reproduction_successes += 1;
        }
    }

    /// Share of reproduction attempts that produced offspring, in percent
    pub fn reproduction_success_rate(&self) -> f64 {
        if self.reproduction_attempts > 0 {
            (self.reproduction_successes as f64 / self.reproduction_attempts as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// What changed during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: u64,
    pub births: u32,
    pub deaths: u32,
    pub meals: u32,
    pub roots_grown: u32,
    pub live_moles: usize,
    pub live_worms: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_death_tally() {
        let mut stats = PopulationStats::new();
        stats.record_death(Species::Worm, DeathCause::Eaten);
        stats.record_death(Species::Worm, DeathCause::OldAge);
        stats.record_death(Species::Mole, DeathCause::GasChamber);

        assert_eq!(stats.worm_deaths.total(), 2);
        assert_eq!(stats.worm_deaths.eaten, 1);
        assert_eq!(stats.mole_deaths.gas_chamber, 1);
        assert_eq!(stats.mole_deaths.starvation, 0);
    }

    #[test]
    fn test_reproduction_rate() {
        let mut stats = PopulationStats::new();
        assert_eq!(stats.reproduction_success_rate(), 0.0);

        stats.record_reproduction_attempt(true);
        stats.record_reproduction_attempt(false);
        stats.record_reproduction_attempt(false);
        stats.record_reproduction_attempt(true);
        assert_eq!(stats.reproduction_attempts, 4);
        assert!((stats.reproduction_success_rate() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_meals_and_births() {
        let mut stats = PopulationStats::new();
        stats.record_meal(FoodKind::Root);
        stats.record_meal(FoodKind::Root);
        stats.record_meal(FoodKind::Mushroom);
        stats.record_birth(Species::Mole);

        assert_eq!(stats.roots_eaten, 2);
        assert_eq!(stats.mushrooms_eaten, 1);
        assert_eq!(stats.worms_eaten, 0);
        assert_eq!(stats.mole_births, 1);
    }
}
