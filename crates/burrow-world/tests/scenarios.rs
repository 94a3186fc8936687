//! End-to-end behaviour of the simulation engine.

use burrow_core::{Position, Season, SimulationConfig};
use burrow_world::{terrain, Grid, Simulation};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn staged_config(width: i32, height: i32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.width = width;
    config.world.height = height;
    config.world.mole_count = 0;
    config.world.initial_worms = 0;
    config.world.initial_mushrooms = 0;
    config
}

fn small_world(season: Season, seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::for_season(season);
    config.world.width = 40;
    config.world.height = 30;
    config.world.mole_count = 12;
    config.world.initial_worms = 15;
    config.world.seed = seed;
    config
}

#[test]
fn worm_dies_of_old_age_on_schedule() {
    let mut config = staged_config(10, 10);
    config.worm.max_age = 500;
    config.worm.max_hunger = 10_000;
    config.worm.reproduction_probability = 0.0;
    config.worm.move_probability = 0.0;

    let mut water = vec![false; 100];
    water[5 * 10 + 6] = true;
    let grid = Grid::from_layers(10, 10, water, vec![false; 100], config.tunnel_duration).unwrap();
    let mut sim = Simulation::from_grid(config, grid, ChaCha8Rng::seed_from_u64(1)).unwrap();
    assert!(sim.spawn_worm(Position::new(5, 5)));

    for _ in 0..499 {
        sim.advance(1.0).unwrap();
    }
    assert_eq!(sim.worms().len(), 1);
    assert_eq!(sim.worms()[0].age, 499);

    sim.advance(1.0).unwrap();
    assert!(sim.worms().is_empty());
    assert_eq!(sim.stats().worm_deaths.old_age, 1);
}

#[test]
fn mole_eats_before_worm_on_shared_cell() {
    let mut config = staged_config(5, 5);
    config.mole.reproduction_probability = 0.0;
    let grid = Grid::new(5, 5, config.tunnel_duration).unwrap();
    let mut sim = Simulation::from_grid(config, grid, ChaCha8Rng::seed_from_u64(2)).unwrap();

    let cell = Position::new(2, 2);
    assert!(sim.spawn_mole(cell));
    assert!(sim.spawn_worm(cell));
    assert!(sim.plant_root(cell));

    // A short tick keeps the mole on its cell while it feeds
    sim.advance(0.01).unwrap();

    assert_eq!(sim.moles()[0].position, cell);
    assert!(sim.roots().is_empty());
    assert!(sim.worms().is_empty());
    let stats = sim.stats();
    assert_eq!(stats.roots_eaten, 1);
    assert_eq!(stats.worms_eaten, 1);
    assert_eq!(stats.worm_deaths.eaten, 1);
}

#[test]
fn dry_world_has_no_damp_life() {
    let mut config = SimulationConfig::default();
    config.world.water_count = 0;
    config.world.seed = 5;
    let sim = Simulation::new(config).unwrap();
    let grid = sim.grid();

    assert_eq!(grid.water_cell_count(), 0);
    for pos in grid.positions() {
        assert!(!grid.is_water(pos));
        assert!(!grid.is_near_water(pos));
    }
    assert!(sim.worms().is_empty());
    assert!(sim.roots().is_empty());
    assert!(sim.mushrooms().is_empty());
    assert!(!sim.moles().is_empty());
}

#[test]
fn tunnel_collapses_after_duration() {
    let duration = 100;
    let mut grid = Grid::new(10, 10, duration).unwrap();
    let cell = Position::new(3, 3);
    grid.mark_tunnel_cell(cell);

    for _ in 0..duration - 1 {
        grid.decay_tunnels();
    }
    assert!(grid.has_tunnel_at(cell));
    assert_eq!(grid.tunnel_remaining(cell), Some(1));

    grid.decay_tunnels();
    assert!(!grid.has_tunnel_at(cell));
    assert_eq!(grid.tunnel_remaining(cell), Some(0));
}

#[test]
fn same_seed_same_world() {
    let run = || {
        let mut sim = Simulation::new(small_world(Season::Autumn, 77)).unwrap();
        for _ in 0..200 {
            sim.advance(1.0 / 60.0).unwrap();
        }
        sim
    };
    let a = run();
    let b = run();

    assert_eq!(a.grid(), b.grid());
    assert_eq!(a.moles(), b.moles());
    assert_eq!(a.worms(), b.worms());
    assert_eq!(a.roots(), b.roots());
    assert_eq!(a.mushrooms(), b.mushrooms());
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn roots_never_grow_past_max_depth() {
    let mut config = staged_config(10, 20);
    config.flora.root_growth_interval = 0.1;
    config.flora.root_growth_probability = 1.0;
    config.flora.max_root_depth = 6;
    let grid = Grid::new(10, 20, config.tunnel_duration).unwrap();
    let mut sim = Simulation::from_grid(config, grid, ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert!(sim.plant_root(Position::new(3, 0)));
    assert!(sim.plant_root(Position::new(4, 0)));

    for _ in 0..50 {
        sim.advance(0.1).unwrap();
    }
    assert_eq!(sim.roots().len(), 14);
    assert!(sim.roots().iter().all(|r| r.position.y <= 6));
    assert!(sim.roots().iter().any(|r| r.position.y == 6));
}

#[test]
fn surface_roots_only_grow_near_water() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut config = small_world(Season::Summer, 4);
    config.world.water_count = 3;
    let grid = terrain::generate(&config.world, config.tunnel_duration, &mut rng).unwrap();

    for pos in terrain::surface_roots(&grid, &mut rng, 1.0) {
        assert_eq!(pos.y, 0);
        assert!(grid.is_near_water(pos));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn entities_stay_in_bounds(seed in any::<u64>()) {
        let mut sim = Simulation::new(small_world(Season::Spring, seed)).unwrap();
        for _ in 0..120 {
            let summary = sim.advance(1.0 / 30.0).unwrap();
            prop_assert_eq!(summary.live_moles, sim.moles().len());
            for animal in sim.animals() {
                prop_assert!(animal.is_alive());
                prop_assert!(sim.grid().is_valid_position(animal.position()));
                prop_assert!(!sim.is_water(animal.position()));
            }
            for mole in sim.moles() {
                prop_assert!(mole.vitals.hunger < sim.config().mole.max_hunger);
                prop_assert!(sim.grid().is_valid_position(mole.target));
            }
            for worm in sim.worms() {
                prop_assert!(worm.age < sim.config().worm.max_age);
                prop_assert!(worm.vitals.hunger < sim.config().worm.max_hunger);
            }
        }
    }

    #[test]
    fn winter_moles_stay_below_frozen_band(seed in any::<u64>()) {
        let mut sim = Simulation::new(small_world(Season::Winter, seed)).unwrap();
        let floor = sim.config().world.frozen_depth;
        for mole in sim.moles() {
            prop_assert!(mole.position.y >= floor);
        }
        for _ in 0..150 {
            sim.advance(1.0 / 30.0).unwrap();
            for mole in sim.moles() {
                prop_assert!(mole.position.y >= floor);
                prop_assert!(mole.target.y >= floor);
            }
        }
    }

    #[test]
    fn water_never_changes(seed in any::<u64>()) {
        let mut sim = Simulation::new(small_world(Season::Summer, seed)).unwrap();
        let before: Vec<Position> = sim.grid().positions().filter(|p| sim.is_water(*p)).collect();
        for _ in 0..100 {
            sim.advance(1.0 / 60.0).unwrap();
        }
        let after: Vec<Position> = sim.grid().positions().filter(|p| sim.is_water(*p)).collect();
        prop_assert_eq!(before, after);
    }
}
