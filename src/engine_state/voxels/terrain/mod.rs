//! # Terrain Generation
//!
//! [`Generator::generate`] maps a chunk coordinate to a fully populated
//! [`BlockGrid`]. It runs in four passes over the 16 × 16 columns:
//!
//! 1. **Base fill**: bedrock at `y = 0`, stone up to sea level, then water
//!    into any empty cell of the sea band.
//! 2. **Surface fill**: classify the column into a [`Biome`] from its
//!    weirdness, humidity and height and fill the surface material.
//! 3. **Caves**: hollow out cells where 3-D noise falls under a threshold,
//!    flooding with lava deep down and with water next to water.
//! 4. **Vegetation**: seeded random decorators per biome.
//!
//! The generator holds no mutable state. The same coordinate and seed always
//! produce the same grid, on any thread.

pub mod biome;
pub mod noise_field;
pub mod vegetation;

use fastrand::Rng;
use log::debug;

use crate::{
    core::TerrainConfig,
    engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{BlockGrid, ChunkCoord, CHUNK_WIDTH},
    },
};

pub use biome::Biome;
use noise_field::{mix, NoiseField};

/// Climate and height of one world column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSample {
    /// See [`NoiseField::weirdness`].
    pub weirdness: f64,
    /// See [`NoiseField::humidity`].
    pub humidity: f64,
    /// First cell above the surface.
    pub height: i32,
}

/// A classified column of one chunk, in chunk-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Local x, `0..16`.
    pub x: i32,
    /// Local z, `0..16`.
    pub z: i32,
    /// First cell above the surface.
    pub height: i32,
    /// What the surface pass decided for the column.
    pub biome: Biome,
}

/// Deterministic terrain generator. Equal seeds and configs give equal
/// chunks.
pub struct Generator {
    config: TerrainConfig,
    field: NoiseField,
}

impl Generator {
    /// Builds the noise sources from `config.seed`.
    pub fn new(config: TerrainConfig) -> Self {
        Generator {
            field: NoiseField::new(config.seed),
            config,
        }
    }

    /// Parameters the generator was built with.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Samples the climate and blended height of world column `(x, z)`.
    pub fn sample_column(&self, x: i32, z: i32) -> ColumnSample {
        let (wx, wz) = (x as f64, z as f64);
        let weirdness = self.field.weirdness(wx, wz);
        let humidity = self.field.humidity(wx, wz);
        let heights = self.field.heights(wx, wz);

        let blended = mix(heights.peak, mix(heights.low, heights.mid, humidity), weirdness);
        ColumnSample {
            weirdness,
            humidity,
            height: blended as i32 + self.config.sea_level,
        }
    }

    /// Builds the cells of the chunk at `coord`.
    pub fn generate(&self, coord: ChunkCoord) -> BlockGrid {
        let start = web_time::Instant::now();

        let mut grid = BlockGrid::new();
        let columns = self.fill_surface(coord, &mut grid);
        self.carve_caves(coord, &mut grid);

        let seed = (coord.key() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ self.config.seed as u64;
        vegetation::decorate(&mut grid, &columns, &mut Rng::with_seed(seed));

        debug!("Generated chunk ({}, {}) in {:?}", coord.x, coord.z, start.elapsed());
        grid
    }

    /// Runs the base and surface passes for every column, x-major.
    ///
    /// # Returns
    /// The classified columns, in the order vegetation expects them.
    pub fn fill_surface(&self, coord: ChunkCoord, grid: &mut BlockGrid) -> Vec<Column> {
        let mut columns = Vec::with_capacity((CHUNK_WIDTH * CHUNK_WIDTH) as usize);
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                let sample = self.sample_column(coord.x + x, coord.z + z);
                self.fill_base(grid, x, z);
                let biome = biome::fill_column(grid, x, z, &sample, &self.config);
                columns.push(Column {
                    x,
                    z,
                    height: sample.height,
                    biome,
                });
            }
        }
        columns
    }

    fn fill_base(&self, grid: &mut BlockGrid, x: i32, z: i32) {
        grid.try_set(x, 0, z, BlockType::BEDROCK);
        for y in 1..self.config.sea_level {
            grid.try_set(x, y, z, BlockType::STONE);
        }
        for y in self.config.sea_level..=self.config.water_top {
            if grid.try_get(x, y, z) == Some(BlockType::EMPTY) {
                grid.try_set(x, y, z, BlockType::WATER);
            }
        }
    }

    /// Hollows out caves from sea level down to `y = 1`.
    pub fn carve_caves(&self, coord: ChunkCoord, grid: &mut BlockGrid) {
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in (1..=self.config.sea_level).rev() {
                    let density = self.field.cave_density(
                        (coord.x + x) as f64,
                        y as f64,
                        (coord.z + z) as f64,
                    );
                    if density >= self.config.cave_threshold {
                        continue;
                    }

                    let fill = if y <= self.config.lava_ceiling {
                        BlockType::LAVA
                    } else if self.touches_water(grid, x, y, z) {
                        BlockType::WATER
                    } else {
                        BlockType::EMPTY
                    };
                    grid.try_set(x, y, z, fill);
                }
            }
        }
    }

    /// Whether a carved cell would open onto water: the column is flooded
    /// just above sea level, the cell above is water, or a lateral neighbor
    /// inside this chunk is water.
    fn touches_water(&self, grid: &BlockGrid, x: i32, y: i32, z: i32) -> bool {
        let is_water = |x, y, z| grid.try_get(x, y, z) == Some(BlockType::WATER);
        is_water(x, self.config.sea_level + 1, z)
            || is_water(x, y + 1, z)
            || [(1, 0), (-1, 0), (0, 1), (0, -1)]
                .into_iter()
                .any(|(dx, dz)| is_water(x + dx, y, z + dz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> Generator {
        Generator::new(TerrainConfig::default())
    }

    #[test]
    fn test_generation_is_deterministic() {
        let coord = ChunkCoord { x: 0, z: 0 };
        let a = generator().generate(coord);
        let b = generator().generate(coord);
        assert!(a == b);

        let elsewhere = ChunkCoord { x: -48, z: 112 };
        assert!(generator().generate(elsewhere) == generator().generate(elsewhere));
    }

    #[test]
    fn test_no_gaps_below_sea_level_after_surface_fill() {
        let generator = generator();
        let sea_level = generator.config().sea_level;
        for coord in [
            ChunkCoord { x: 0, z: 0 },
            ChunkCoord { x: 320, z: -160 },
            ChunkCoord { x: -1024, z: 2048 },
        ] {
            let mut grid = BlockGrid::new();
            generator.fill_surface(coord, &mut grid);
            for x in 0..16 {
                for z in 0..16 {
                    for y in 1..sea_level as usize {
                        assert_ne!(grid.get(x, y, z), BlockType::EMPTY, "gap at {x},{y},{z}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_bedrock_floor_survives_caves() {
        let grid = generator().generate(ChunkCoord { x: 64, z: 64 });
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(grid.get(x, 0, z), BlockType::BEDROCK);
            }
        }
    }

    #[test]
    fn test_deep_caves_hold_lava_not_air() {
        let generator = generator();
        let ceiling = generator.config().lava_ceiling as usize;
        for coord in [ChunkCoord { x: 0, z: 0 }, ChunkCoord { x: 512, z: 512 }] {
            let grid = generator.generate(coord);
            for x in 0..16 {
                for z in 0..16 {
                    for y in 1..=ceiling {
                        let cell = grid.get(x, y, z);
                        assert!(
                            cell == BlockType::STONE || cell == BlockType::LAVA,
                            "unexpected {cell:?} at {x},{y},{z}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_columns_are_x_major() {
        let mut grid = BlockGrid::new();
        let columns = generator().fill_surface(ChunkCoord { x: 0, z: 0 }, &mut grid);
        assert_eq!(columns.len(), 256);
        assert_eq!((columns[0].x, columns[0].z), (0, 0));
        assert_eq!((columns[1].x, columns[1].z), (0, 1));
        assert_eq!((columns[16].x, columns[16].z), (1, 0));
    }

    #[test]
    fn test_seed_changes_terrain() {
        let coord = ChunkCoord { x: 0, z: 0 };
        let mut config = TerrainConfig::default();
        config.seed = 99;
        let reseeded = Generator::new(config).generate(coord);
        assert!(reseeded != generator().generate(coord));
    }
}
