//! xorshift64* random number generator
//!
//! Fast, high-quality PRNG that is deterministic and suitable for
//! simulation purposes. Same seed, same sequence: stochastic discrete
//! sub-models (contact draws) reproduce exactly under replay, which is
//! what makes checkpoint/resume and regression tests possible.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// Owned by the Director and handed to sub-models during `advance`.
/// All randomness in the simulator MUST go through this type.
///
/// # Example
/// ```
/// use multilevel_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let p = rng.next_f64();
/// assert!((0.0..1.0).contains(&p));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires nonzero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli draw with success probability `p` (clamped to [0, 1])
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Binomial draw: number of successes in `n` Bernoulli trials
    ///
    /// Per-trial sampling, O(n). Population sizes in the coupled models
    /// are small enough that a per-individual draw per round is cheap.
    pub fn binomial(&mut self, n: u64, p: f64) -> u64 {
        let p = p.clamp(0.0, 1.0);
        if p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        let mut successes = 0;
        for _ in 0..n {
            if self.next_f64() < p {
                successes += 1;
            }
        }
        successes
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// A new `RngManager::new(state)` continues the exact sequence.
    pub fn get_state(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "zero seed should be converted to 1");
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);
        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!((0.0..1.0).contains(&val), "value {val} outside [0.0, 1.0)");
        }
    }

    #[test]
    fn test_deterministic_sequence() {
        let mut rng1 = RngManager::new(99999);
        let mut rng2 = RngManager::new(99999);
        for _ in 0..100 {
            assert_eq!(rng1.next(), rng2.next());
        }
    }

    #[test]
    fn test_binomial_bounds() {
        let mut rng = RngManager::new(7);
        assert_eq!(rng.binomial(100, 0.0), 0);
        assert_eq!(rng.binomial(100, 1.0), 100);
        let draws = rng.binomial(100, 0.5);
        assert!(draws <= 100);
    }

    #[test]
    fn test_state_resumes_sequence() {
        let mut rng = RngManager::new(42);
        rng.next();
        rng.next();

        let mut resumed = RngManager::new(rng.get_state());
        let mut original = rng.clone();
        for _ in 0..50 {
            assert_eq!(original.next(), resumed.next());
        }
    }
}
