use crate::fixed::Fixed64;
use crate::id::{ImprovementId, identity_keyed};
use serde::{Deserialize, Serialize};

/// A quality certificate the plant can work towards. Compared and hashed by
/// `certificate_type` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub certificate_type: String,
    pub is_obtained: bool,
    pub implementation_cost: i64,
    pub implementation_time_days: u32,
}

identity_keyed!(Certification, certificate_type);

impl Certification {
    pub fn new(certificate_type: impl Into<String>) -> Self {
        Self {
            certificate_type: certificate_type.into(),
            is_obtained: false,
            implementation_cost: 0,
            implementation_time_days: 0,
        }
    }
}

/// A togglable efficiency initiative. Looked up by `improvement_id`, but
/// compared structurally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeanImprovement {
    pub improvement_id: ImprovementId,
    pub name: String,
    pub is_implemented: bool,
    pub implementation_cost: i64,
    /// Fractional efficiency gain when implemented, e.g. 0.05 for 5%.
    pub efficiency_gain: Fixed64,
}

impl LeanImprovement {
    pub fn new(improvement_id: impl Into<ImprovementId>, name: impl Into<String>) -> Self {
        Self {
            improvement_id: improvement_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// A copy with the implemented flag cleared, as catalogs are seeded.
    pub fn reset(&self) -> Self {
        Self {
            is_implemented: false,
            ..self.clone()
        }
    }
}

/// Sum of the efficiency gains of implemented improvements.
pub fn implemented_gain<'a>(improvements: impl IntoIterator<Item = &'a LeanImprovement>) -> Fixed64 {
    improvements
        .into_iter()
        .filter(|i| i.is_implemented)
        .fold(Fixed64::ZERO, |acc, i| acc.saturating_add(i.efficiency_gain))
}
