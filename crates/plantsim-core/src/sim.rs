//! Step bookkeeping types shared by the simulation aggregate.
//!
//! A simulation runs for at most [`MAX_STEPS`] discrete rounds. Parameters
//! and results are tracked on two independent counters; [`AdvanceResult`]
//! reports where each one landed after a call to `Simulation::advance_step`.

use crate::fixed::Fixed64;

/// One discrete round of the simulation, numbered from 1.
pub type Step = u32;

/// The step every simulation starts at.
pub const FIRST_STEP: Step = 1;

/// The step ceiling. No parameters or results exist beyond it.
pub const MAX_STEPS: Step = 4;

// ---------------------------------------------------------------------------
// Advance result
// ---------------------------------------------------------------------------

/// Outcome of a successful `Simulation::advance_step()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceResult {
    /// The result step this call targeted.
    pub result_step: Step,

    /// Whether results were derived. `false` means the call was an
    /// idempotent no-op because results for `result_step` already existed.
    pub derived: bool,

    /// Step of the parameters snapshot cloned forward, if one was created.
    pub parameters_step: Option<Step>,
}

impl AdvanceResult {
    pub(crate) fn unchanged(result_step: Step) -> Self {
        Self {
            result_step,
            derived: false,
            parameters_step: None,
        }
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// Deterministic FNV-1a (64-bit) hash used to fingerprint a configuration
/// snapshot. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    /// Strings are length-prefixed so adjacent fields cannot alias.
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write(s.as_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }

    /// Finalize into big-endian bytes.
    pub fn finish_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
