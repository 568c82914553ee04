//! Источники случайности (spread cone, recoil jitter)
//!
//! Вся логика, которой нужен random, принимает `&mut impl RandomSource`:
//! в симуляции это seeded `DeterministicRng`, в тестах — `ScriptedRandom`.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform float sampling в заданном диапазоне
pub trait RandomSource {
    /// Значение в `[min, max]`. При `min >= max` возвращает `min`.
    fn range(&mut self, min: f32, max: f32) -> f32;
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl RandomSource for DeterministicRng {
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Test double: выдаёт заранее заданные доли диапазона по кругу
///
/// `0.0` → min, `1.0` → max, `0.5` → середина.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    fractions: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(fractions: Vec<f32>) -> Self {
        Self { fractions, cursor: 0 }
    }

    /// Всегда середина диапазона
    pub fn midpoint() -> Self {
        Self::new(vec![0.5])
    }

    /// Сколько значений уже выдано
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn range(&mut self, min: f32, max: f32) -> f32 {
        let fraction = if self.fractions.is_empty() {
            0.5
        } else {
            self.fractions[self.cursor % self.fractions.len()]
        };
        self.cursor += 1;

        if min >= max {
            return min;
        }
        min + (max - min) * fraction.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_rng_same_seed() {
        let mut a = DeterministicRng::new(7);
        let mut b = DeterministicRng::new(7);

        for _ in 0..32 {
            assert_eq!(a.range(-1.5, 1.5), b.range(-1.5, 1.5));
        }
    }

    #[test]
    fn test_deterministic_rng_bounds() {
        let mut rng = DeterministicRng::new(99);

        for _ in 0..1000 {
            let value = rng.range(0.8, 1.0);
            assert!((0.8..=1.0).contains(&value), "value = {}", value);
        }

        // Вырожденный диапазон
        assert_eq!(rng.range(2.0, 2.0), 2.0);
    }

    #[test]
    fn test_scripted_random_cycles() {
        let mut rng = ScriptedRandom::new(vec![0.0, 1.0]);

        assert_eq!(rng.range(-2.0, 2.0), -2.0);
        assert_eq!(rng.range(-2.0, 2.0), 2.0);
        assert_eq!(rng.range(0.0, 10.0), 0.0);
        assert_eq!(rng.draws(), 3);
    }
}
