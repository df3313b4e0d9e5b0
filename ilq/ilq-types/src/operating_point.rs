//! Nominal trajectories ("operating points").

use nalgebra::DVector;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// A nominal state-and-control trajectory about which dynamics are
/// linearized and costs quadraticized.
///
/// `xs[k]` is the joint state at step `k`; `us[k][i]` is player `i`'s
/// control at step `k`. Both run over the full horizon. The solver keeps two
/// of these and swaps them each iteration instead of reallocating.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperatingPoint {
    /// Joint states, one per time step.
    pub xs: Vec<DVector<f64>>,
    /// Per-player controls, one list per time step.
    pub us: Vec<Vec<DVector<f64>>>,
    /// Initial time of the trajectory.
    pub t0: f64,
}

impl OperatingPoint {
    /// Create a zero trajectory with the given shapes.
    #[must_use]
    pub fn zeros(horizon: usize, x_dim: usize, u_dims: &[usize], t0: f64) -> Self {
        Self {
            xs: (0..horizon).map(|_| DVector::zeros(x_dim)).collect(),
            us: (0..horizon)
                .map(|_| u_dims.iter().map(|&du| DVector::zeros(du)).collect())
                .collect(),
            t0,
        }
    }

    /// Number of time steps in the trajectory.
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.xs.len()
    }

    /// Number of players.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.us.first().map_or(0, Vec::len)
    }

    /// Absolute time of step `k` under the given step size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time(&self, k: usize, time_step: f64) -> f64 {
        self.t0 + k as f64 * time_step
    }

    /// Exchange contents with another operating point.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Check lengths and per-step shapes.
    pub fn validate(&self, horizon: usize, x_dim: usize, u_dims: &[usize]) -> Result<()> {
        if self.xs.len() != horizon || self.us.len() != horizon {
            return Err(GameError::dimension_mismatch(format!(
                "operating point covers {} state / {} control steps, expected {horizon}",
                self.xs.len(),
                self.us.len()
            )));
        }
        for (k, (x, us)) in self.xs.iter().zip(&self.us).enumerate() {
            if x.len() != x_dim {
                return Err(GameError::dimension_mismatch(format!(
                    "state at step {k} has length {}, expected {x_dim}",
                    x.len()
                )));
            }
            if us.len() != u_dims.len() {
                return Err(GameError::dimension_mismatch(format!(
                    "step {k} carries {} controls, expected {}",
                    us.len(),
                    u_dims.len()
                )));
            }
            for (i, (u, &du)) in us.iter().zip(u_dims).enumerate() {
                if u.len() != du {
                    return Err(GameError::dimension_mismatch(format!(
                        "control {i} at step {k} has length {}, expected {du}",
                        u.len()
                    )));
                }
            }
        }
        Ok(())
    }
}
