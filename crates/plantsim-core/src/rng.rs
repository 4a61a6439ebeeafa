//! Deterministic PRNG used by the default metrics deriver for market noise.
//!
//! SplitMix64: 8 bytes of state, trivially serializable, identical output on
//! every platform, so a seeded training run can be replayed exactly.

use crate::fixed::Fixed64;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in [0, 1).
    pub fn next_unit(&mut self) -> Fixed64 {
        // The upper 32 bits become the fractional part of a Q32.32 value.
        Fixed64::from_bits((self.next_u64() >> 32) as i64)
    }

    /// Uniform value in [low, high). Returns `low` when the range is empty.
    pub fn next_in(&mut self, low: Fixed64, high: Fixed64) -> Fixed64 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.next_unit()
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}
