//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Reproducing a simulation run byte-for-byte (R1/R2)
//! - Testing the initial account distribution (S4)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use casterly_core::rng::CasterlyRng;
///
/// let mut rng = CasterlyRng::new(12345);
/// let value = rng.next_u64();
/// let range_value = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasterlyRng {
    state: u64,
}

impl CasterlyRng {
    /// Create a new RNG with given seed. A zero seed is not a valid xorshift
    /// state, so it is mapped to 1.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Derive a seed from a simulation id, per §4.6: seed = simulation_id.
    /// Takes the first 8 bytes of the UUID, big-endian, as a u64.
    pub fn from_simulation_id(simulation_id: Uuid) -> Self {
        let bytes = simulation_id.as_bytes();
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&bytes[0..8]);
        Self::new(u64::from_be_bytes(seed_bytes))
    }

    /// Generate next random u64 value, advancing internal state.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate a random value in range [min, max).
    ///
    /// # Panics
    /// Panics if min >= max.
    pub fn range(&mut self, min: usize, max: usize) -> usize {
        assert!(min < max, "min must be less than max");
        let value = self.next_u64();
        let range_size = (max - min) as u64;
        min + (value % range_size) as usize
    }

    /// Get current RNG state (for checkpointing/replay).
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Fisher-Yates shuffle, in place, using this generator. Deterministic
    /// given the generator's current state.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        if items.len() < 2 {
            return;
        }
        for i in (1..items.len()).rev() {
            let j = self.range(0, i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = CasterlyRng::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        let mut rng = CasterlyRng::new(12345);
        rng.range(100, 50);
    }

    #[test]
    fn test_deterministic_sequence() {
        let mut rng1 = CasterlyRng::new(99999);
        let mut rng2 = CasterlyRng::new(99999);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_shuffle_deterministic_and_permutes() {
        let mut items1: Vec<u32> = (0..20).collect();
        let mut items2: Vec<u32> = (0..20).collect();

        CasterlyRng::new(42).shuffle(&mut items1);
        CasterlyRng::new(42).shuffle(&mut items2);

        assert_eq!(items1, items2, "same seed must produce same shuffle");

        let mut sorted = items1.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>(), "shuffle must be a permutation");
    }

    #[test]
    fn test_from_simulation_id_is_deterministic() {
        let id = Uuid::parse_str("5f2f2a1a-0000-0000-0000-000000000000").unwrap();
        let mut rng1 = CasterlyRng::from_simulation_id(id);
        let mut rng2 = CasterlyRng::from_simulation_id(id);
        assert_eq!(rng1.next_u64(), rng2.next_u64());
    }

    proptest! {
        /// Any non-zero seed yields a shuffle that is (a) a permutation of
        /// the input and (b) exactly reproducible from the same seed — the
        /// R1/R2 determinism contract, checked across many seeds rather
        /// than a handful of fixed ones.
        #[test]
        fn prop_shuffle_is_deterministic_permutation(seed in 1u64..u64::MAX, len in 0usize..50) {
            let original: Vec<u32> = (0..len as u32).collect();

            let mut a = original.clone();
            CasterlyRng::new(seed).shuffle(&mut a);
            let mut b = original.clone();
            CasterlyRng::new(seed).shuffle(&mut b);
            prop_assert_eq!(&a, &b);

            let mut sorted = a.clone();
            sorted.sort();
            prop_assert_eq!(sorted, original);
        }
    }
}
