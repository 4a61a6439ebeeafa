//! Serde data file structs for catalog reference data.
//!
//! These structs define the on-disk format for improvements and workplaces.
//! Everything except the id is optional, so hand-written files stay short.
//! They are converted into engine types by the catalog loader.

use plantsim_core::fixed::{Fixed64, f64_to_fixed64};
use plantsim_core::graph::Workplace;
use plantsim_core::improvement::LeanImprovement;
use serde::Deserialize;

// ===========================================================================
// Improvements
// ===========================================================================

/// A lean or production improvement in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ImprovementData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cost: i64,
    /// Fractional gain, e.g. `0.05` for 5%.
    #[serde(default)]
    pub efficiency_gain: f64,
}

impl ImprovementData {
    /// Gain as fixed-point, or `None` when it is not a finite number in
    /// `[0, 1]`.
    pub fn gain(&self) -> Option<Fixed64> {
        if self.efficiency_gain.is_finite() && (0.0..=1.0).contains(&self.efficiency_gain) {
            Some(f64_to_fixed64(self.efficiency_gain))
        } else {
            None
        }
    }

    pub fn into_improvement(self, gain: Fixed64) -> LeanImprovement {
        let name = self.name.unwrap_or_else(|| self.id.clone());
        LeanImprovement {
            implementation_cost: self.cost,
            efficiency_gain: gain,
            ..LeanImprovement::new(self.id, name)
        }
    }
}

// ===========================================================================
// Workplaces
// ===========================================================================

/// A workplace in a data file. Staff and equipment are never read from
/// files; seeding starts every workplace unassigned.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkplaceData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub qualification: u32,
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
}

impl From<WorkplaceData> for Workplace {
    fn from(data: WorkplaceData) -> Self {
        Workplace {
            required_speciality: data.speciality,
            required_qualification: data.qualification,
            required_stages: data.stages,
            x: data.x,
            y: data.y,
            ..Workplace::new(data.id, data.name)
        }
    }
}
