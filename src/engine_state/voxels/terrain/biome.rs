//! Biome classification and surface fill.

use crate::{
    core::TerrainConfig,
    engine_state::voxels::{block::block_type::BlockType, chunk::BlockGrid},
};

use super::ColumnSample;

/// Climate tag of one column. Drives surface material and vegetation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Grass with the odd watermelon.
    Plain,
    /// Bare stone.
    Mountain,
    /// Sand with cacti.
    Desert,
    /// Stone capped with snow above the snow line, with lanterns.
    SnowPeak,
    /// Mushland with giant mushrooms.
    Marsh,
    /// Grass with oak trees.
    OakForest,
    /// Grass with dark oak trees and pumpkins.
    DarkForest,
    /// Humid high ground: grass with birch trees.
    BirchForest,
    /// A Plain column at or below the water line, flooded.
    Lake,
}

/// Classifies column `(x, z)` of `grid` and fills its surface band from sea
/// level up to `sample.height - 1`.
///
/// The column's stone base and water band must already be in place: the
/// plains rule turns water cells into sand.
pub fn fill_column(
    grid: &mut BlockGrid,
    x: i32,
    z: i32,
    sample: &ColumnSample,
    config: &TerrainConfig,
) -> Biome {
    let ColumnSample {
        weirdness,
        humidity,
        height,
    } = *sample;
    let surface = config.sea_level..height;

    if weirdness < 0.5 {
        let mut biome = Biome::Mountain;
        for y in surface {
            if humidity < 0.5 {
                grid.try_set(x, y, z, BlockType::STONE);
            } else {
                grid.try_set(x, y, z, BlockType::GRASS_BLOCK);
                biome = Biome::BirchForest;
            }
        }
        if weirdness < 0.4 && height > config.snow_line {
            grid.try_set(x, height - 1, z, BlockType::SNOW);
            biome = Biome::SnowPeak;
        }
        return biome;
    }

    if humidity < 0.5 && height < 160 {
        for y in surface {
            grid.try_set(x, y, z, BlockType::SAND);
        }
        return Biome::Desert;
    }

    let mut biome = Biome::Plain;
    for y in surface {
        if grid.try_get(x, y, z) == Some(BlockType::WATER) {
            grid.try_set(x, y, z, BlockType::SAND);
        } else {
            grid.try_set(x, y, z, BlockType::GRASS_BLOCK);
            if humidity > 0.9 {
                biome = Biome::DarkForest;
            } else if humidity > 0.8 {
                biome = Biome::OakForest;
            }
        }
    }

    if humidity > 0.98 && height < 150 && grid.try_get(x, height - 1, z) != Some(BlockType::SAND) {
        for depth in 1..=3 {
            grid.try_set(x, height - depth, z, BlockType::MUSHLAND);
        }
        return Biome::Marsh;
    }

    if biome == Biome::Plain && height <= config.water_top {
        return Biome::Lake;
    }
    biome
}
