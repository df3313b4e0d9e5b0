//! Affine time-varying feedback strategies.

use nalgebra::{DMatrix, DVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// Affine time-varying feedback for a single player.
///
/// At time step `k` the strategy maps a deviation `δx` from the nominal
/// state to a control:
///
/// ```text
/// u(k) = u_ref(k) − P(k)·δx − α(k)
/// ```
///
/// where `u_ref(k)` is the nominal control the deviation is measured
/// against. Positive offsets `α` therefore shift the control in the
/// decreasing direction; the LQ recursion produces offsets with the matching
/// sign.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Strategy {
    /// Feedback gains, one `u_dim × x_dim` matrix per time step.
    pub ps: Vec<DMatrix<f64>>,
    /// Affine offsets, one `u_dim` vector per time step.
    pub alphas: Vec<DVector<f64>>,
}

impl Strategy {
    /// Create a zero strategy (zero gains and offsets) over a horizon.
    #[must_use]
    pub fn zeros(horizon: usize, x_dim: usize, u_dim: usize) -> Self {
        Self {
            ps: (0..horizon).map(|_| DMatrix::zeros(u_dim, x_dim)).collect(),
            alphas: (0..horizon).map(|_| DVector::zeros(u_dim)).collect(),
        }
    }

    /// Number of time steps this strategy covers.
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.ps.len()
    }

    /// Apply the feedback law at time step `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k` is out of range or the argument dimensions disagree
    /// with the stored gains.
    #[must_use]
    pub fn apply(&self, k: usize, delta_x: &DVector<f64>, u_ref: &DVector<f64>) -> DVector<f64> {
        u_ref - &self.ps[k] * delta_x - &self.alphas[k]
    }

    /// Check lengths and per-step shapes against the expected horizon, joint
    /// state dimension, and this player's control dimension.
    pub fn validate(&self, horizon: usize, x_dim: usize, u_dim: usize) -> Result<()> {
        if self.ps.len() != horizon || self.alphas.len() != horizon {
            return Err(GameError::dimension_mismatch(format!(
                "strategy covers {} gain / {} offset steps, expected {horizon}",
                self.ps.len(),
                self.alphas.len()
            )));
        }
        for (k, (p, alpha)) in self.ps.iter().zip(&self.alphas).enumerate() {
            if p.nrows() != u_dim || p.ncols() != x_dim {
                return Err(GameError::dimension_mismatch(format!(
                    "gain at step {k} is {}x{}, expected {u_dim}x{x_dim}",
                    p.nrows(),
                    p.ncols()
                )));
            }
            if alpha.len() != u_dim {
                return Err(GameError::dimension_mismatch(format!(
                    "offset at step {k} has length {}, expected {u_dim}",
                    alpha.len()
                )));
            }
        }
        Ok(())
    }
}
