//! Objective weights shared by the exact and genetic paths.

use serde::{Deserialize, Serialize};

/// Caller-supplied objective weights.
///
/// Overtime is heaviest, continuity and base return are medium,
/// preferences are lightest. `stability` only affects the genetic path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    /// Weight on overtime beyond weekly caps.
    pub overtime: f64,
    /// Weight on workload dispersion.
    pub fairness: f64,
    /// Weight on day-off and sector preference breaches.
    pub preference: f64,
    /// Weight on ending a day away from base.
    pub base_return: f64,
    /// Weight on routing continuity breaks.
    pub continuity: f64,
    /// Weight on preserving baseline assignments.
    pub stability: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            overtime: 100.0,
            fairness: 10.0,
            preference: 1.0,
            base_return: 50.0,
            continuity: 75.0,
            stability: 300.0,
        }
    }
}

impl ObjectiveWeights {
    /// Sets the overtime weight.
    pub fn with_overtime(mut self, w: f64) -> Self {
        self.overtime = w;
        self
    }

    /// Sets the fairness weight.
    pub fn with_fairness(mut self, w: f64) -> Self {
        self.fairness = w;
        self
    }

    /// Sets the preference weight.
    pub fn with_preference(mut self, w: f64) -> Self {
        self.preference = w;
        self
    }

    /// Sets the base-return weight.
    pub fn with_base_return(mut self, w: f64) -> Self {
        self.base_return = w;
        self
    }

    /// Sets the continuity weight.
    pub fn with_continuity(mut self, w: f64) -> Self {
        self.continuity = w;
        self
    }

    /// Sets the stability weight.
    pub fn with_stability(mut self, w: f64) -> Self {
        self.stability = w;
        self
    }
}
