//! Decorators placed on top of the finished terrain: trees, mushrooms,
//! cacti and single-block props.
//!
//! Placement never looks outside the chunk. Columns too close to an edge for
//! a decorator's footprint are skipped, so trees never straddle chunks.

use fastrand::Rng;

use crate::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{BlockGrid, CHUNK_WIDTH},
};

use super::{biome::Biome, Column};

const CACTUS_CHANCE: f32 = 0.9875;
const MUSHROOM_CHANCE: f32 = 0.9875;
const TREE_CHANCE: f32 = 0.99;
const DARK_TREE_CHANCE: f32 = 0.95;
const PUMPKIN_CHANCE: f32 = 0.99;
const LANTERN_CHANCE: f32 = 0.9975;
const WATERMELON_CHANCE: f32 = 0.9995;

#[derive(Clone, Copy)]
struct TreeKind {
    log: BlockType,
    leaf: BlockType,
}

const OAK: TreeKind = TreeKind {
    log: BlockType::OAK_LOG,
    leaf: BlockType::OAK_LEAF,
};
const DARK: TreeKind = TreeKind {
    log: BlockType::DARK_LOG,
    leaf: BlockType::DARK_LEAF,
};
const BIRCH: TreeKind = TreeKind {
    log: BlockType::BIRCH_LOG,
    leaf: BlockType::BIRCH_LEAF,
};

fn is_empty(grid: &BlockGrid, x: i32, y: i32, z: i32) -> bool {
    grid.try_get(x, y, z) == Some(BlockType::EMPTY)
}

fn is_sand(grid: &BlockGrid, x: i32, y: i32, z: i32) -> bool {
    grid.try_get(x, y, z) == Some(BlockType::SAND)
}

/// Whether a footprint reaching `margin` cells sideways fits inside the chunk.
fn fits(x: i32, z: i32, margin: i32) -> bool {
    x - margin >= 0 && z - margin >= 0 && x + margin < CHUNK_WIDTH && z + margin < CHUNK_WIDTH
}

/// Decorates every column of `grid`.
///
/// `columns` must be in x-major order; one density value is drawn per column
/// from `rng` and some biomes draw more, so the same order and seed always
/// yield the same decorations.
pub fn decorate(grid: &mut BlockGrid, columns: &[Column], rng: &mut Rng) {
    for column in columns {
        let density = rng.f32();
        let (x, h, z) = (column.x, column.height, column.z);

        match column.biome {
            Biome::Desert => {
                if density > CACTUS_CHANCE && is_empty(grid, x, h, z) {
                    grid.try_set(x, h, z, BlockType::CACTUS);
                }
            }
            Biome::Marsh => {
                if fits(x, z, 1) && rng.f32() > MUSHROOM_CHANCE && is_empty(grid, x, h + 2, z) {
                    plant_mushroom(grid, x, h, z);
                }
            }
            Biome::OakForest => {
                if fits(x, z, 2)
                    && rng.f32() > TREE_CHANCE
                    && is_empty(grid, x, h + 4, z)
                    && !is_sand(grid, x, h - 1, z)
                {
                    plant_tree(grid, x, h, z, OAK);
                }
            }
            Biome::DarkForest => {
                if fits(x, z, 2) {
                    if rng.f32() > DARK_TREE_CHANCE
                        && is_empty(grid, x, h + 4, z)
                        && !is_sand(grid, x, h - 1, z)
                    {
                        plant_tree(grid, x, h, z, DARK);
                    }
                    if rng.f32() > PUMPKIN_CHANCE
                        && is_empty(grid, x, h, z)
                        && !is_sand(grid, x, h - 1, z)
                    {
                        grid.try_set(x, h, z, BlockType::PUMPKIN);
                    }
                }
            }
            Biome::BirchForest => {
                if fits(x, z, 2) && rng.f32() > TREE_CHANCE && is_empty(grid, x, h + 4, z) {
                    plant_tree(grid, x, h, z, BIRCH);
                }
            }
            Biome::SnowPeak => {
                if rng.f32() > LANTERN_CHANCE && is_empty(grid, x, h, z) {
                    grid.try_set(x, h, z, BlockType::LANTERN);
                }
            }
            Biome::Plain => {
                if rng.f32() > WATERMELON_CHANCE && is_empty(grid, x, h, z) {
                    grid.try_set(x, h, z, BlockType::WATERMELON);
                }
            }
            Biome::Mountain | Biome::Lake => {}
        }
    }
}

/// A four-cell stem topped by a 3×3 cap.
fn plant_mushroom(grid: &mut BlockGrid, x: i32, h: i32, z: i32) {
    for dy in 0..4 {
        grid.try_set(x, h + dy, z, BlockType::MUSHSTEM);
    }
    for dx in -1..=1 {
        for dz in -1..=1 {
            grid.try_set(x + dx, h + 4, z + dz, BlockType::MUSHHEAD);
        }
    }
}

/// A five-log trunk under four layers of leaves, widest two below the top.
fn plant_tree(grid: &mut BlockGrid, x: i32, h: i32, z: i32, kind: TreeKind) {
    for dx in -1..=1 {
        for dz in -1..=1 {
            if dx != 0 || dz != 0 {
                grid.try_set(x + dx, h + 5, z + dz, kind.leaf);
            }
            grid.try_set(x + dx, h + 4, z + dz, kind.leaf);
        }
    }

    for dx in -2..=2_i32 {
        for dz in -2..=2_i32 {
            if dx.abs() != 2 || dz.abs() != 2 {
                grid.try_set(x + dx, h + 3, z + dz, kind.leaf);
            }
        }
    }

    for (dx, dz) in [(-2, -2), (-2, 2), (2, -2), (2, 2)] {
        grid.try_set(x + dx, h + 2, z + dz, kind.leaf);
    }

    // trunk last so it is never overwritten by the crown
    for dy in 0..5 {
        grid.try_set(x, h + dy, z, kind.log);
    }
}
