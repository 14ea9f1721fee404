//! # Noise Field
//!
//! A deterministic 2D fractal height function. Each heightmap layer is a sum of Perlin
//! octaves where the frequency triples and the amplitude is multiplied by the layer's
//! persistence at every octave.
//!
//! The world seed does not reseed the Perlin permutation. Instead two offsets, one per
//! axis, are pulled out of alternating 16-bit fields of the seed and added to the global
//! coordinate before scaling, so different seeds look at different parts of the same
//! field. Sampling always uses global block coordinates, which keeps heights continuous
//! across chunk borders.

use noise::{NoiseFn, Perlin};

/// Permutation seed of the underlying Perlin generator. Changing it changes every world.
pub const NOISE_PERMUTATION_SEED: u32 = 0;
/// Base scale from block coordinates to noise space.
pub const NOISE_BASE_SCALE: f64 = 0.01;
/// Frequency multiplier between consecutive octaves.
pub const OCTAVE_FREQUENCY_GROWTH: f64 = 3.0;

/// Parameters of one heightmap layer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NoiseLayer {
    pub amplitude: f64,
    pub frequency: f64,
    pub persistence: f64,
    pub octaves: u32,
}

impl NoiseLayer {
    pub const fn new(amplitude: f64, frequency: f64, persistence: f64, octaves: u32) -> Self {
        Self {
            amplitude,
            frequency,
            persistence,
            octaves,
        }
    }

    /// The same layer with its amplitude scaled.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            amplitude: self.amplitude * factor,
            ..self
        }
    }
}

/// A seeded view of the Perlin field.
#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
    offset_x: f64,
    offset_z: f64,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let (offset_x, offset_z) = seed_offsets(seed);
        Self {
            perlin: Perlin::new(NOISE_PERMUTATION_SEED),
            offset_x,
            offset_z,
        }
    }

    /// Fractal height at a global column, truncated toward zero.
    pub fn height(&self, global_x: i32, global_z: i32, layer: NoiseLayer) -> i32 {
        let x = (global_x as f64 + self.offset_x) * NOISE_BASE_SCALE;
        let z = (global_z as f64 + self.offset_z) * NOISE_BASE_SCALE;

        let mut amplitude = layer.amplitude;
        let mut frequency = layer.frequency;
        let mut total = 0.0;
        for _ in 0..layer.octaves {
            total += amplitude * self.sample(x * frequency, z * frequency);
            frequency *= OCTAVE_FREQUENCY_GROWTH;
            amplitude *= layer.persistence;
        }

        total as i32
    }

    /// One Perlin sample remapped from `[-1, 1]` to `[0, 1]`.
    fn sample(&self, x: f64, z: f64) -> f64 {
        (self.perlin.get([x, z]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Splits the seed into four 16-bit fields; x takes fields 0 and 2, z takes 1 and 3.
/// The upper field only contributes its low 4 bits, giving 20-bit offsets.
fn seed_offsets(seed: u64) -> (f64, f64) {
    let field = |n: u32| (seed >> (16 * n)) & 0xFFFF;
    let offset_x = field(0) | (field(2) & 0xF) << 16;
    let offset_z = field(1) | (field(3) & 0xF) << 16;
    (offset_x as f64, offset_z as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROCK: NoiseLayer = NoiseLayer::new(16.0, 0.4, 0.4, 4);

    #[test]
    fn same_seed_same_heights() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        for (x, z) in [(0, 0), (-17, 300), (1024, -2048)] {
            assert_eq!(a.height(x, z, ROCK), b.height(x, z, ROCK));
        }
    }

    #[test]
    fn heights_stay_within_octave_sum() {
        let field = NoiseField::new(7);
        let max = 16.0 * (1.0 + 0.4 + 0.16 + 0.064);
        for x in (-200..200).step_by(13) {
            for z in (-200..200).step_by(17) {
                let h = field.height(x, z, ROCK);
                assert!(h >= 0 && h as f64 <= max, "height {h} out of range");
            }
        }
    }

    #[test]
    fn seeds_shift_rather_than_rescale() {
        let (ax, az) = seed_offsets(0x0003_0002_0001_0000);
        assert_eq!(ax, (0x0000 | 0x2 << 16) as f64);
        assert_eq!(az, (0x0001 | 0x3 << 16) as f64);

        // A field seeded with offset (dx, 0) agrees with the unseeded field shifted by dx.
        let shifted = NoiseField::new(5);
        let origin = NoiseField::new(0);
        assert_eq!(shifted.height(0, 0, ROCK), origin.height(5, 0, ROCK));
    }

    #[test]
    fn neighbouring_columns_are_continuous() {
        let field = NoiseField::new(99);
        for x in -64..64 {
            let a = field.height(x, 10, ROCK);
            let b = field.height(x + 1, 10, ROCK);
            assert!((a - b).abs() <= 2, "jump between {x} and {}", x + 1);
        }
    }
}
