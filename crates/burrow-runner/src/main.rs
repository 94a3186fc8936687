//! Headless host: builds a world and drives it at a fixed cadence.

mod telemetry;

use anyhow::{Context, Result};
use burrow_core::{RunnerConfig, Season};
use burrow_world::Simulation;
use tracing::info;

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config(std::env::args().nth(1).as_deref())?;
    let config = apply_overrides(
        config,
        std::env::var("BURROW_SEASON").ok(),
        std::env::var("BURROW_SEED").ok(),
    )?;

    info!(
        season = %config.simulation.world.season,
        seed = config.simulation.world.seed,
        ticks = config.ticks,
        tick_seconds = config.tick_seconds,
        "Starting burrow runner"
    );

    let mut sim = Simulation::new(config.simulation.clone())?;
    let stats = sim.run(config.ticks, config.tick_seconds)?;

    info!(
        moles = sim.moles().len(),
        worms = sim.worms().len(),
        roots = sim.roots().len(),
        mushrooms = sim.mushrooms().len(),
        births = stats.mole_births + stats.worm_births,
        deaths = stats.mole_deaths.total() + stats.worm_deaths.total(),
        "Runner finished"
    );
    Ok(())
}

/// Read a JSON config from `path`, or fall back to the defaults
fn load_config(path: Option<&str>) -> Result<RunnerConfig> {
    match path {
        Some(path) => RunnerConfig::from_json_file(path)
            .with_context(|| format!("loading config file {}", path)),
        None => Ok(RunnerConfig::default()),
    }
}

/// Apply environment overrides. A season override also brings that
/// season's water body count.
fn apply_overrides(
    mut config: RunnerConfig,
    season: Option<String>,
    seed: Option<String>,
) -> Result<RunnerConfig> {
    if let Some(season) = season {
        let season: Season = season.parse()?;
        config.simulation.world.season = season;
        config.simulation.world.water_count = season.default_water_count();
    }
    if let Some(seed) = seed {
        config.simulation.world.seed = seed
            .parse()
            .with_context(|| format!("BURROW_SEED must be an unsigned integer, got {}", seed))?;
    }
    Ok(config)
}
