//! World generation: water bodies, gas chambers and starting placements.

use crate::grid::Grid;
use burrow_core::{Position, Result, WorldConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Rejection sampling budget for a single placement
pub const PLACEMENT_ATTEMPTS: u32 = 100;

/// Generate the static terrain layers for a world
pub fn generate(config: &WorldConfig, tunnel_duration: u32, rng: &mut ChaCha8Rng) -> Result<Grid> {
    let mut grid = Grid::new(config.width, config.height, tunnel_duration)?;
    generate_water(
        &mut grid,
        rng,
        config.water_count,
        config.min_water_size,
        config.max_water_size,
    );
    generate_gas_chambers(&mut grid, rng, config);

    debug!(
        water_cells = grid.water_cell_count(),
        gas_chambers = grid.gas_chamber_count(),
        "Terrain generated"
    );
    Ok(grid)
}

/// Scatter `count` circular water blobs. A cell is wet when its distance to
/// the blob centre is at most half the blob size.
pub fn generate_water(
    grid: &mut Grid,
    rng: &mut ChaCha8Rng,
    count: u32,
    min_size: u32,
    max_size: u32,
) {
    for _ in 0..count {
        let center = Position::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        let size = rng.gen_range(min_size..=max_size);
        let radius = size as f64 / 2.0;
        let reach = radius.ceil() as i32;

        let cells: Vec<Position> = grid
            .window(center, reach)
            .filter(|p| (p.distance_squared(&center) as f64).sqrt() <= radius)
            .collect();
        for pos in cells {
            grid.set_water(pos);
        }
    }
}

/// Hide clusters of gas chambers in dry soil, one cluster per
/// `cells_per_gas_cluster` cells.
pub fn generate_gas_chambers(grid: &mut Grid, rng: &mut ChaCha8Rng, config: &WorldConfig) {
    let clusters = grid.cell_count() / config.cells_per_gas_cluster as usize;

    for _ in 0..clusters {
        let mut cursor = Position::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        let members = rng.gen_range(config.min_gas_cluster_size..=config.max_gas_cluster_size);

        for _ in 0..members {
            if grid.is_valid_position(cursor) && !grid.is_water(cursor) {
                grid.set_gas_chamber(cursor);
            }
            cursor = cursor.add(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
        }
    }
}

/// Random open cell near water that `is_taken` does not reject
pub fn sample_near_water<F>(grid: &Grid, rng: &mut ChaCha8Rng, is_taken: F) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    for _ in 0..PLACEMENT_ATTEMPTS {
        let pos = Position::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        if grid.is_near_water(pos) && grid.is_empty(pos) && !is_taken(pos) {
            return Some(pos);
        }
    }
    None
}

/// Random open cell at or below `min_row` that `is_taken` does not reject
pub fn sample_open_cell<F>(
    grid: &Grid,
    rng: &mut ChaCha8Rng,
    min_row: i32,
    is_taken: F,
) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    if min_row >= grid.height {
        return None;
    }
    let min_row = min_row.max(0);
    for _ in 0..PLACEMENT_ATTEMPTS {
        let pos = Position::new(rng.gen_range(0..grid.width), rng.gen_range(min_row..grid.height));
        if grid.is_empty(pos) && !is_taken(pos) {
            return Some(pos);
        }
    }
    None
}

/// Surface cells that start with a root: near water, dry, picked independently
pub fn surface_roots(grid: &Grid, rng: &mut ChaCha8Rng, probability: f64) -> Vec<Position> {
    let mut roots = Vec::new();
    for x in 0..grid.width {
        let pos = Position::new(x, 0);
        if grid.is_near_water(pos) && !grid.is_water(pos) && rng.gen_bool(probability) {
            roots.push(pos);
        }
    }
    roots
}
