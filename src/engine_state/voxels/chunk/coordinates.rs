//! # Chunk and Zone Coordinates
//!
//! Chunks are addressed by their minimum world corner `(x, z)`, a multiple of
//! 16. Zones group 4×4 chunks and are addressed by their minimum corner, a
//! multiple of 64. Both pack into one `i64` map key: `x` in the high 32 bits,
//! `z` in the low 32 bits.
//!
//! Stepping between chunks or zones wraps at the `i32` limits, so the world
//! is a torus about four billion cells across. Both widths divide 2³², which
//! keeps wrapped coordinates aligned.

use cgmath::Point3;

/// Width (x and z) of a chunk in cells.
pub const CHUNK_WIDTH: i32 = 16;
/// Height of a chunk in cells.
pub const CHUNK_HEIGHT: i32 = 256;
/// Number of cells in one chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_WIDTH) as usize;
/// Width of a zone in cells.
pub const ZONE_WIDTH: i32 = 64;
/// Chunks along one side of a zone.
pub const CHUNKS_PER_ZONE_SIDE: i32 = ZONE_WIDTH / CHUNK_WIDTH;

/// Packs a coordinate pair into a single 64-bit key.
pub fn encode_key(x: i32, z: i32) -> i64 {
    ((x as i64) << 32) | (z as u32 as i64)
}

/// Inverse of [`encode_key`]. The low half is sign-extended back to `z`.
pub fn decode_key(key: i64) -> (i32, i32) {
    ((key >> 32) as i32, key as i32)
}

/// Minimum corner of a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// World x of the corner, a multiple of 16.
    pub x: i32,
    /// World z of the corner, a multiple of 16.
    pub z: i32,
}

impl ChunkCoord {
    /// Coordinate of the chunk holding world column `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        ChunkCoord {
            x: x.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
            z: z.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
        }
    }

    /// Arena map key of this chunk.
    pub fn key(self) -> i64 {
        encode_key(self.x, self.z)
    }

    /// Inverse of [`ChunkCoord::key`].
    pub fn from_key(key: i64) -> Self {
        let (x, z) = decode_key(key);
        ChunkCoord { x, z }
    }

    /// The chunk `CHUNK_WIDTH` cells away along `(dx, dz)`, in chunk steps.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        ChunkCoord {
            x: self.x.wrapping_add(dx.wrapping_mul(CHUNK_WIDTH)),
            z: self.z.wrapping_add(dz.wrapping_mul(CHUNK_WIDTH)),
        }
    }

    /// Zone this chunk belongs to.
    pub fn zone(self) -> ZoneCoord {
        ZoneCoord::containing(self.x, self.z)
    }

    /// World position of the chunk's minimum corner at `y = 0`.
    pub fn origin(self) -> Point3<i32> {
        Point3::new(self.x, 0, self.z)
    }
}

/// Minimum corner of a zone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ZoneCoord {
    /// World x of the corner, a multiple of 64.
    pub x: i32,
    /// World z of the corner, a multiple of 64.
    pub z: i32,
}

impl ZoneCoord {
    /// Zone holding world column `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        ZoneCoord {
            x: x.div_euclid(ZONE_WIDTH) * ZONE_WIDTH,
            z: z.div_euclid(ZONE_WIDTH) * ZONE_WIDTH,
        }
    }

    /// Zone holding an observer at `position`. Only `x` and `z` matter;
    /// positions beyond the `i32` range clamp to the outermost zone.
    pub fn of_position(position: Point3<f32>) -> Self {
        Self::containing(position.x.floor() as i32, position.z.floor() as i32)
    }

    /// Key recorded in the world's set of generated zones.
    pub fn key(self) -> i64 {
        encode_key(self.x, self.z)
    }

    /// Inverse of [`ZoneCoord::key`].
    pub fn from_key(key: i64) -> Self {
        let (x, z) = decode_key(key);
        ZoneCoord { x, z }
    }

    /// The 16 chunks of this zone, x-major.
    pub fn chunks(self) -> impl Iterator<Item = ChunkCoord> {
        let base = ChunkCoord { x: self.x, z: self.z };
        (0..CHUNKS_PER_ZONE_SIDE)
            .flat_map(move |dx| (0..CHUNKS_PER_ZONE_SIDE).map(move |dz| base.offset(dx, dz)))
    }

    /// Every zone in the `(2 * radius + 1)²` square centered on this one.
    pub fn zones_around(self, radius: i32) -> Vec<ZoneCoord> {
        let radius = radius.max(0);
        let side = 2 * radius as usize + 1;
        let mut zones = Vec::with_capacity(side * side);
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                zones.push(ZoneCoord {
                    x: self.x.wrapping_add(dx.wrapping_mul(ZONE_WIDTH)),
                    z: self.z.wrapping_add(dz.wrapping_mul(ZONE_WIDTH)),
                });
            }
        }
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let samples = [
            (0, 0),
            (16, -16),
            (-1, -1),
            (i32::MIN, i32::MAX),
            (i32::MAX, i32::MIN),
            (-64, -(1 << 30)),
            (123_456, -987_654),
        ];
        for (x, z) in samples {
            assert_eq!(decode_key(encode_key(x, z)), (x, z));
        }
    }

    #[test]
    fn test_key_round_trip_pseudo_random() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..10_000 {
            let (x, z) = (rng.i32(..), rng.i32(..));
            assert_eq!(decode_key(encode_key(x, z)), (x, z));
        }
    }

    #[test]
    fn test_distinct_coords_give_distinct_keys() {
        assert_ne!(encode_key(0, -1), encode_key(-1, 0));
        assert_ne!(encode_key(1, 0), encode_key(0, 1));
    }

    #[test]
    fn test_containing_floors_toward_negative_infinity() {
        assert_eq!(ChunkCoord::containing(-1, 15), ChunkCoord { x: -16, z: 0 });
        assert_eq!(ChunkCoord::containing(16, -16), ChunkCoord { x: 16, z: -16 });
        assert_eq!(ZoneCoord::containing(-1, 63), ZoneCoord { x: -64, z: 0 });
        assert_eq!(
            ZoneCoord::of_position(Point3::new(-0.5, 80.0, 64.0)),
            ZoneCoord { x: -64, z: 64 }
        );
    }

    #[test]
    fn test_zone_has_sixteen_chunks() {
        let zone = ZoneCoord { x: -64, z: 128 };
        let chunks: Vec<ChunkCoord> = zone.chunks().collect();

        assert_eq!(chunks.len(), 16);
        assert!(chunks.iter().all(|c| c.zone() == zone));
        assert_eq!(chunks[0], ChunkCoord { x: -64, z: 128 });
        assert_eq!(chunks[15], ChunkCoord { x: -16, z: 176 });
    }

    #[test]
    fn test_zones_around_is_a_square_window() {
        let zones = ZoneCoord { x: 0, z: 0 }.zones_around(4);
        assert_eq!(zones.len(), 81);
        assert!(zones.contains(&ZoneCoord { x: -256, z: 256 }));
        assert!(!zones.contains(&ZoneCoord { x: 320, z: 0 }));
        assert_eq!(ZoneCoord { x: 0, z: 0 }.zones_around(0).len(), 1);
    }

    #[test]
    fn test_stepping_wraps_at_the_world_edge() {
        let far = ZoneCoord::of_position(Point3::new(f32::MAX, 100.0, -f32::MAX));
        assert_eq!(far, ZoneCoord { x: i32::MAX - 63, z: i32::MIN });

        let zones = far.zones_around(1);
        assert_eq!(zones.len(), 9);
        assert!(zones.contains(&ZoneCoord { x: i32::MIN, z: i32::MAX - 63 }));
        assert!(zones.iter().all(|z| z.x % ZONE_WIDTH == 0 && z.z % ZONE_WIDTH == 0));

        let edge = ChunkCoord { x: i32::MAX - 15, z: 0 };
        assert_eq!(edge.offset(1, 0), ChunkCoord { x: i32::MIN, z: 0 });
        assert_eq!(ChunkCoord { x: i32::MIN, z: 0 }.offset(-1, 0), edge);
    }
}
