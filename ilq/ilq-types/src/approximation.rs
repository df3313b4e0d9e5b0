//! Local approximations rebuilt every solver iteration.
//!
//! [`LinearDynamicsApproximation`] holds the discrete-time Jacobians of the
//! dynamics at one point of the operating trajectory; one instance exists
//! per time step. [`QuadraticCostApproximation`] holds one player's
//! second-order cost expansion at the same point, with a Hessian/gradient
//! block for the state and for every player's control.

use nalgebra::{DMatrix, DVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Discrete-time linearization `x' ≈ A·x + Σ_i B_i·u_i` of the joint
/// dynamics at one trajectory point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearDynamicsApproximation {
    /// State transition matrix, `x_dim × x_dim`.
    pub a: DMatrix<f64>,
    /// Per-player control matrices, each `x_dim × u_dim_i`.
    pub bs: Vec<DMatrix<f64>>,
}

impl LinearDynamicsApproximation {
    /// Create an approximation with identity `A` and zero `B_i`, the
    /// baseline for `A ≈ I + Δt·∂f/∂x`, `B_i ≈ Δt·∂f/∂u_i`.
    #[must_use]
    pub fn identity(x_dim: usize, u_dims: &[usize]) -> Self {
        Self {
            a: DMatrix::identity(x_dim, x_dim),
            bs: u_dims.iter().map(|&du| DMatrix::zeros(x_dim, du)).collect(),
        }
    }

    /// Number of players in this approximation.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.bs.len()
    }
}

/// One player's quadratic cost expansion at a trajectory point.
///
/// The expansion keeps the block structure of the stage cost: a state block
/// and one block per controller. Blocks for controls the cost does not
/// depend on stay zero. Cross blocks between state and control do not
/// appear.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuadraticCostApproximation {
    /// State Hessian `Q`, `x_dim × x_dim`.
    pub state_hess: DMatrix<f64>,
    /// State gradient `l`, length `x_dim`.
    pub state_grad: DVector<f64>,
    /// Control Hessians `R_j`, indexed by player `j`.
    pub control_hess: Vec<DMatrix<f64>>,
    /// Control gradients `r_j`, indexed by player `j`.
    pub control_grad: Vec<DVector<f64>>,
}

impl QuadraticCostApproximation {
    /// Create a zero expansion with the given shapes.
    #[must_use]
    pub fn zeros(x_dim: usize, u_dims: &[usize]) -> Self {
        Self {
            state_hess: DMatrix::zeros(x_dim, x_dim),
            state_grad: DVector::zeros(x_dim),
            control_hess: u_dims.iter().map(|&du| DMatrix::zeros(du, du)).collect(),
            control_grad: u_dims.iter().map(|&du| DVector::zeros(du)).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_linearization() {
        let lin = LinearDynamicsApproximation::identity(3, &[2, 1]);
        assert_eq!(lin.num_players(), 2);
        assert_eq!(lin.a, DMatrix::identity(3, 3));
        assert_eq!(lin.bs[0].shape(), (3, 2));
        assert_eq!(lin.bs[1].shape(), (3, 1));
        assert!(lin.bs.iter().all(|b| b.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_zero_quadraticization() {
        let quad = QuadraticCostApproximation::zeros(4, &[2, 2]);
        assert_eq!(quad.state_hess.shape(), (4, 4));
        assert_eq!(quad.state_grad.len(), 4);
        assert_eq!(quad.control_hess.len(), 2);
        assert_eq!(quad.control_grad[1].len(), 2);
    }
}
