//! Pipeline layout problem instances

use crate::network::{NodeId, Position};
use crate::{GeonetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative tolerance for the demand balance
const BALANCE_TOLERANCE: f64 = 1e-9;

/// A pipeline network design problem
///
/// Terminals are sources (negative demand) or sinks (positive demand) at
/// fixed positions. Pipes come in the listed diameters, each with a cost per
/// unit length, and node pressures must stay within the given bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance<N: NodeId> {
    /// Position of every terminal
    pub terminal_positions: BTreeMap<N, Position>,
    /// Demand per terminal, supply when negative; missing terminals have none
    pub demand: BTreeMap<N, f64>,
    /// Available pipe diameters in increasing order
    pub diameters: Vec<f64>,
    /// Cost per unit length for each diameter
    pub costs: Vec<f64>,
    /// Lower pressure bound
    pub pressure_min: f64,
    /// Upper pressure bound
    pub pressure_max: f64,
    /// Weymouth pressure drop constant
    pub weymouth_c: f64,
}

impl<N: NodeId> Instance<N> {
    /// Demand of one terminal (zero if not listed)
    pub fn demand_of(&self, node: &N) -> f64 {
        self.demand.get(node).copied().unwrap_or(0.0)
    }

    /// Total supply, i.e. the sum of all negative demands negated
    pub fn total_supply(&self) -> f64 {
        -self.demand.values().filter(|&&d| d < 0.0).sum::<f64>()
    }

    /// Validate the instance
    pub fn validate(&self) -> Result<()> {
        if let Some(stray) = self.demand.keys().find(|n| !self.terminal_positions.contains_key(n)) {
            return Err(GeonetError::UnknownNode(format!("{:?} has demand but no position", stray)));
        }

        if self.demand.values().any(|d| !d.is_finite()) {
            return Err(GeonetError::InvalidConfig("Demands must be finite".to_string()));
        }
        let net: f64 = self.demand.values().sum();
        let scale: f64 = self.demand.values().map(|d| d.abs()).sum::<f64>().max(1.0);
        if net.abs() > BALANCE_TOLERANCE * scale {
            return Err(GeonetError::InvalidConfig(format!("Flow not balanced: net demand {}", net)));
        }

        if self.diameters.is_empty() {
            return Err(GeonetError::InvalidConfig("No pipe diameters given".to_string()));
        }
        if self.diameters.iter().any(|&d| !(d > 0.0 && d.is_finite())) {
            return Err(GeonetError::InvalidConfig("Diameters must be positive".to_string()));
        }
        if self.diameters.windows(2).any(|w| w[0] >= w[1]) {
            return Err(GeonetError::InvalidConfig(
                "Diameters must be strictly increasing".to_string(),
            ));
        }

        if self.costs.len() != self.diameters.len() {
            return Err(GeonetError::InvalidConfig(format!(
                "{} costs for {} diameters",
                self.costs.len(),
                self.diameters.len()
            )));
        }
        if self.costs.iter().any(|&c| !(c >= 0.0 && c.is_finite())) {
            return Err(GeonetError::InvalidConfig("Costs must be non-negative".to_string()));
        }

        if !(self.pressure_min > 0.0 && self.pressure_min < self.pressure_max) {
            return Err(GeonetError::InvalidConfig(format!(
                "Pressure range [{}, {}] must be positive and non-empty",
                self.pressure_min, self.pressure_max
            )));
        }
        if !(self.weymouth_c > 0.0) {
            return Err(GeonetError::InvalidConfig("Weymouth constant must be positive".to_string()));
        }

        Ok(())
    }
}
