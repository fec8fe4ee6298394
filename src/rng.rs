//! Cryptographically secure randomness for game outcomes.
//!
//! Every draw comes from the OS CSPRNG through [`OsEntropy`]. Integers are
//! produced with rejection sampling over the minimal number of random bytes
//! covering the range, so there is no modulo bias; shuffles are Fisher-Yates
//! driven by those draws. If the entropy source fails the draw fails with
//! [`CasinoError::EntropyUnavailable`] - there is deliberately no fallback to
//! a weaker generator.

use crate::errors::{CasinoError, CasinoResult};
use rand_core::{OsRng, RngCore};
use std::collections::VecDeque;

/// Raw entropy seam. Production code uses [`OsEntropy`]; tests script the
/// byte stream with [`ScriptedEntropy`].
pub trait EntropySource: Send {
    fn fill(&mut self, dest: &mut [u8]) -> CasinoResult<()>;
}

/// OS CSPRNG-backed entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> CasinoResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CasinoError::EntropyUnavailable(e.to_string()))
    }
}

/// Deterministic entropy for tests. Draws consume the scripted bytes in
/// order; running out of script surfaces as `EntropyUnavailable`, which also
/// exercises the no-fallback failure mode.
#[derive(Debug, Clone)]
pub struct ScriptedEntropy {
    bytes: VecDeque<u8>,
}

impl ScriptedEntropy {
    pub fn from_bytes(bytes: impl Into<VecDeque<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// A script of `count` copies of `byte`.
    pub fn repeat(byte: u8, count: usize) -> Self {
        Self {
            bytes: std::iter::repeat(byte).take(count).collect(),
        }
    }
}

impl EntropySource for ScriptedEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> CasinoResult<()> {
        for slot in dest.iter_mut() {
            *slot = self.bytes.pop_front().ok_or_else(|| {
                CasinoError::EntropyUnavailable("scripted entropy exhausted".into())
            })?;
        }
        Ok(())
    }
}

impl EntropySource for Box<dyn EntropySource> {
    fn fill(&mut self, dest: &mut [u8]) -> CasinoResult<()> {
        self.as_mut().fill(dest)
    }
}

/// Uniform integer and permutation source for the outcome engine.
pub struct SecureRandom<E: EntropySource = OsEntropy> {
    entropy: E,
}

impl SecureRandom<OsEntropy> {
    pub fn new() -> Self {
        Self { entropy: OsEntropy }
    }
}

impl Default for SecureRandom<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntropySource> SecureRandom<E> {
    pub fn with_entropy(entropy: E) -> Self {
        Self { entropy }
    }

    /// Uniform integer in `[min, max]` inclusive.
    ///
    /// Draws the minimal number of bytes whose value space covers the range,
    /// rejects draws that fall in the biased tail of the space, and redraws.
    pub fn random_int(&mut self, min: u64, max: u64) -> CasinoResult<u64> {
        if min > max {
            return Err(CasinoError::InvalidRequest(format!(
                "empty random range [{}, {}]",
                min, max
            )));
        }
        let range = (max - min) as u128 + 1;
        if range == 1 {
            return Ok(min);
        }

        let bits = 128 - (range - 1).leading_zeros();
        let bytes_needed = ((bits + 7) / 8) as usize;
        let space = 1u128 << (8 * bytes_needed as u32);
        // Accept only values below the largest multiple of `range` that fits
        // in the byte space; everything above it would skew the modulus.
        let keep = space - (space % range);

        let mut buf = [0u8; 8];
        loop {
            self.entropy.fill(&mut buf[..bytes_needed])?;
            let mut value: u128 = 0;
            for &b in &buf[..bytes_needed] {
                value = (value << 8) | b as u128;
            }
            if value < keep {
                return Ok(min + (value % range) as u64);
            }
        }
    }

    /// In-place Fisher-Yates shuffle; uniform over permutations.
    pub fn shuffle<T>(&mut self, items: &mut [T]) -> CasinoResult<()> {
        for i in (1..items.len()).rev() {
            let j = self.random_int(0, i as u64)? as usize;
            items.swap(i, j);
        }
        Ok(())
    }

    /// Uniform sample of `count` distinct integers from `[min, max]`,
    /// via a partial Fisher-Yates over the candidate pool.
    pub fn draw_unique(&mut self, count: usize, min: u64, max: u64) -> CasinoResult<Vec<u64>> {
        if min > max {
            return Err(CasinoError::InvalidRequest(format!(
                "empty draw range [{}, {}]",
                min, max
            )));
        }
        let mut pool: Vec<u64> = (min..=max).collect();
        if count > pool.len() {
            return Err(CasinoError::InvalidRequest(format!(
                "cannot draw {} unique values from a pool of {}",
                count,
                pool.len()
            )));
        }
        for i in 0..count {
            let j = self.random_int(i as u64, (pool.len() - 1) as u64)? as usize;
            pool.swap(i, j);
        }
        pool.truncate(count);
        Ok(pool)
    }

    /// Bernoulli draw with probability expressed in basis points (0..=10000).
    pub fn chance(&mut self, probability_bp: u32) -> CasinoResult<bool> {
        if probability_bp == 0 {
            return Ok(false);
        }
        if probability_bp >= 10_000 {
            return Ok(true);
        }
        Ok(self.random_int(0, 9_999)? < probability_bp as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_int_stays_in_range() {
        let mut rng = SecureRandom::new();
        for _ in 0..10_000 {
            let v = rng.random_int(1, 80).unwrap();
            assert!((1..=80).contains(&v));
        }
    }

    #[test]
    fn random_int_degenerate_range() {
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::from_bytes(vec![]));
        // Single-value range needs no entropy at all.
        assert_eq!(rng.random_int(7, 7).unwrap(), 7);
        assert!(rng.random_int(5, 3).is_err());
    }

    #[test]
    fn random_int_is_uniform_chi_square() {
        // Chi-square goodness of fit over [0, 9] with 100k draws.
        // 9 degrees of freedom; critical value at alpha = 0.001 is 27.88.
        const TRIALS: u64 = 100_000;
        const BUCKETS: usize = 10;
        let mut rng = SecureRandom::new();
        let mut counts = [0u64; BUCKETS];
        for _ in 0..TRIALS {
            counts[rng.random_int(0, (BUCKETS - 1) as u64).unwrap() as usize] += 1;
        }
        let expected = TRIALS as f64 / BUCKETS as f64;
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum();
        assert!(chi2 < 27.88, "chi-square statistic too large: {}", chi2);
    }

    #[test]
    fn rejection_sampling_skips_biased_tail() {
        // Range of 7 over one byte keeps values < 252. A script of 252, 253
        // and then 6 must reject the first two draws and accept the third.
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::from_bytes(vec![252, 253, 6]));
        assert_eq!(rng.random_int(0, 6).unwrap(), 6);
    }

    #[test]
    fn entropy_failure_is_not_absorbed() {
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::from_bytes(vec![1]));
        assert_eq!(rng.random_int(0, 6).unwrap(), 1);
        let err = rng.random_int(0, 6).unwrap_err();
        assert!(matches!(err, CasinoError::EntropyUnavailable(_)));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SecureRandom::new();
        let mut items: Vec<u32> = (0..52).collect();
        rng.shuffle(&mut items).unwrap();
        let unique: HashSet<u32> = items.iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn draw_unique_produces_distinct_values_in_range() {
        let mut rng = SecureRandom::new();
        let drawn = rng.draw_unique(20, 1, 80).unwrap();
        assert_eq!(drawn.len(), 20);
        let unique: HashSet<u64> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), 20);
        assert!(drawn.iter().all(|n| (1..=80).contains(n)));
    }

    #[test]
    fn draw_unique_rejects_oversized_request() {
        let mut rng = SecureRandom::new();
        assert!(rng.draw_unique(10, 1, 5).is_err());
    }

    #[test]
    fn zeroed_entropy_pins_draws_to_minimum() {
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::repeat(0, 64));
        assert_eq!(rng.random_int(3, 9).unwrap(), 3);
        let drawn = rng.draw_unique(5, 1, 80).unwrap();
        assert_eq!(drawn, vec![1, 2, 3, 4, 5]);
    }
}
