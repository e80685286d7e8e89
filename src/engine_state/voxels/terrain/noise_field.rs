//! Seeded noise fields behind the terrain shape.
//!
//! All samples are pure functions of world coordinates and the seed, so a
//! chunk generated twice comes out identical no matter which worker ran it.

use std::f64::consts::PI;

use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex, Perlin};

const HEIGHT_OCTAVES: usize = 4;
const HEIGHT_BASE_FREQUENCY: f64 = 128.0;
const WARP_STRENGTH: f64 = 75.0;
const CAVE_SCALE: f64 = 32.0;

/// Hermite interpolation between `edge0` and `edge1`, clamped to `[0, 1]`.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend from `a` (at `t = 0`) to `b` (at `t = 1`).
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Rotates `(x, z)` by `turns · π` radians and divides by `scale`.
fn rotate_and_scale(x: f64, z: f64, turns: f64, scale: f64) -> [f64; 2] {
    let (sin, cos) = (PI * turns).sin_cos();
    [(x * cos - z * sin) / scale, (x * sin + z * cos) / scale]
}

/// The three candidate surface heights of a column, before blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heights {
    /// Steep profile, used where weirdness is low.
    pub peak: f64,
    /// Rolling profile for humid ground.
    pub mid: f64,
    /// Flattened profile for dry ground.
    pub low: f64,
}

/// The seeded noise sources behind every terrain decision.
pub struct NoiseField {
    climate: OpenSimplex,
    height: Perlin,
    cave: OpenSimplex,
    warp: Fbm<Perlin>,
}

impl NoiseField {
    /// Derives all four sources from `seed`.
    pub fn new(seed: u32) -> Self {
        NoiseField {
            climate: OpenSimplex::new(seed),
            height: Perlin::new(seed.wrapping_add(1)),
            cave: OpenSimplex::new(seed.wrapping_add(2)),
            warp: Fbm::<Perlin>::new(seed.wrapping_add(3))
                .set_octaves(6)
                .set_frequency(5.0),
        }
    }

    /// Mountain-versus-lowland classifier in `[0, 1]`.
    pub fn weirdness(&self, x: f64, z: f64) -> f64 {
        let raw = self.climate.get(rotate_and_scale(x, z, 0.25, 200.0));
        smoothstep(0.05, 0.75, raw * 0.5 + 0.5)
    }

    /// Dry-versus-wet classifier in `[0, 1]`.
    pub fn humidity(&self, x: f64, z: f64) -> f64 {
        let raw = self.climate.get(rotate_and_scale(x, z, 0.33, 128.0));
        smoothstep(0.1, 0.8, raw * 0.5 + 0.5)
    }

    fn warp(&self, x: f64, z: f64) -> f64 {
        self.warp.get([x, z]) * 0.5 + 0.5
    }

    /// Peak, mid and low heights, all shaped from the same warped octave sum.
    pub fn heights(&self, x: f64, z: f64) -> Heights {
        let offset_x = self.warp(x / 256.0, z / 256.0);
        let offset_z = self.warp(x / 300.0, z / 300.0) + 1000.0;
        let warped_x = x + offset_x * WARP_STRENGTH;
        let warped_z = z + offset_z * WARP_STRENGTH;

        let mut h = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = HEIGHT_BASE_FREQUENCY;
        for _ in 0..HEIGHT_OCTAVES {
            h += self.height.get([warped_x / frequency, warped_z / frequency]) * amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        let s = smoothstep(0.0, 0.75, (h + 1.0) * 0.5);
        Heights {
            peak: (15.0 + s * s * 100.0).floor(),
            mid: (15.0 + h * 75.0).floor(),
            low: (15.0 + h * 50.0).floor(),
        }
    }

    /// Cave density at a world cell, remapped to roughly `[0, 1]`.
    pub fn cave_density(&self, x: f64, y: f64, z: f64) -> f64 {
        self.cave.get([x / CAVE_SCALE, y / CAVE_SCALE, z / CAVE_SCALE]) * 0.5 + 0.5
    }
}
