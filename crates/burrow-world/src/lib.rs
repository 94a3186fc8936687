//! Underground ecosystem engine.
//!
//! A 2D soil grid where moles dig tunnels and hunt, worms forage near water,
//! roots and mushrooms grow, and hidden gas chambers kill whatever walks in.

pub mod grid;
pub mod terrain;
pub mod flora;
pub mod animal;
pub mod mole;
pub mod worm;
pub mod simulation;

pub use grid::Grid;
pub use flora::{Flora, Mushroom, Root};
pub use animal::{Animal, Vitals};
pub use mole::{Heading, Mole};
pub use worm::Worm;
pub use simulation::Simulation;
