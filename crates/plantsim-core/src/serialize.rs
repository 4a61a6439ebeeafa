//! Binary snapshots of a whole simulation.
//!
//! A snapshot is a `bitcode` blob holding a versioned header followed by the
//! simulation's full history. The header is validated before the restored
//! simulation is handed back.

use crate::sim::Step;
use crate::simulation::Simulation;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a simulation snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x504C_5331;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Completed steps at the time the snapshot was taken.
    pub completed_steps: Step,
}

impl SnapshotHeader {
    pub fn new(completed_steps: Step) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            completed_steps,
        }
    }

    pub fn validate(&self) -> Result<(), RestoreError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(RestoreError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(RestoreError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(RestoreError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SimulationSnapshot {
    header: SnapshotHeader,
    simulation: Simulation,
}

/// Decode only to inspect the header. bitcode has no partial decode, so the
/// whole payload is read.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, RestoreError> {
    let snapshot: SimulationSnapshot =
        bitcode::deserialize(data).map_err(|e| RestoreError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

impl Simulation {
    pub fn save_snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let snapshot = SimulationSnapshot {
            header: SnapshotHeader::new(self.completed_steps()),
            simulation: self.clone(),
        };
        let bytes =
            bitcode::serialize(&snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))?;
        debug!(simulation = %self.id, bytes = bytes.len(), "snapshot saved");
        Ok(bytes)
    }

    /// Restore a simulation. Rejects blobs with a foreign magic number or a
    /// different format version.
    pub fn restore_snapshot(data: &[u8]) -> Result<Self, RestoreError> {
        let snapshot: SimulationSnapshot =
            bitcode::deserialize(data).map_err(|e| RestoreError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        Ok(snapshot.simulation)
    }
}
