//! Seedable linear congruential generator
//!
//! `seed <- (seed * 9301 + 49297) mod 233280`, output `seed / 233280`.
//! Small and weak, but the sequence for a given seed is fixed, which is all
//! walk generation and example search need.

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233280;

/// Source of uniform numbers in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcgRng {
    seed: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeded from the current Unix time in milliseconds
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    /// Explicit seed if given, clock otherwise
    pub fn from_optional(seed: Option<u64>) -> Self {
        seed.map(Self::new).unwrap_or_else(Self::from_clock)
    }
}

impl RandomSource for LcgRng {
    fn next_f64(&mut self) -> f64 {
        // Reducing first keeps the product inside u64 for any seed
        self.seed = ((self.seed % MODULUS) * MULTIPLIER + INCREMENT) % MODULUS;
        self.seed as f64 / MODULUS as f64
    }
}

pub fn clock_seed() -> u64 {
    chrono::Utc::now().timestamp_millis().unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence() {
        let mut rng = LcgRng::new(42);
        // (42 * 9301 + 49297) % 233280 = 206659
        assert_eq!(rng.next_f64(), 206659.0 / 233280.0);
        // (206659 * 9301 + 49297) % 233280 = 190736
        assert_eq!(rng.next_f64(), 190736.0 / 233280.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = LcgRng::new(7);
        let mut b = LcgRng::new(7);
        for _ in 0..20 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn test_values_in_unit_interval() {
        let mut rng = LcgRng::new(u64::MAX);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_next_index_in_range() {
        let mut rng = LcgRng::new(3);
        for _ in 0..100 {
            assert!(rng.next_index(4) < 4);
        }
    }
}
