//! Lightweight xorshift32 PRNG with the 2D helpers the factory needs

use glam::Vec2;
use std::f32::consts::TAU;

pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Fold a 64-bit seed (scope id, clock bits) into the 32-bit state
    pub fn from_seed_u64(seed: u64) -> Self {
        Self::new((seed ^ (seed >> 32)) as u32)
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // 24 mantissa bits, so the result can never round up to 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Symmetric jitter in [-spread, spread)
    pub fn jitter(&mut self, spread: f32) -> f32 {
        self.range(-spread, spread)
    }

    /// True with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p.clamp(0.0, 1.0)
    }

    /// Uniform index in [0, len); 0 when `len` is 0
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.index(items.len()))
        }
    }

    /// Random angle in [0, 2π)
    pub fn angle(&mut self) -> f32 {
        self.range(0.0, TAU)
    }

    /// Random unit direction vector
    pub fn unit_circle(&mut self) -> Vec2 {
        Vec2::from_angle(self.angle())
    }

    /// Uniform point inside a disc of `radius` around the origin
    pub fn in_disc(&mut self, radius: f32) -> Vec2 {
        if radius <= 0.0 {
            return Vec2::ZERO;
        }
        self.unit_circle() * radius * self.next_f32().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = ParticleRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn index_stays_in_bounds() {
        let mut rng = ParticleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.index(3) < 3);
        }
        assert_eq!(rng.index(0), 0);
        assert!(rng.pick::<u8>(&[]).is_none());
    }

    #[test]
    fn chance_extremes() {
        let mut rng = ParticleRng::new(5);
        assert!((0..100).all(|_| !rng.chance(0.0)));
        assert!((0..100).all(|_| rng.chance(1.0)));
    }

    #[test]
    fn disc_points_inside_radius() {
        let mut rng = ParticleRng::new(123);
        for _ in 0..200 {
            assert!(rng.in_disc(4.0).length() <= 4.0 + 1e-4);
            assert!((rng.unit_circle().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn zero_seed_is_remapped() {
        let mut rng = ParticleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }
}
