//! Closed-form solution of time-varying N-player LQ games.
//!
//! Given linearized dynamics and quadraticized costs along a trajectory,
//! [`solve_lq_game`] runs the coupled Riccati recursion backward in time and
//! returns every player's affine feedback. The feedback Nash optimality
//! conditions couple the players at each step: stacking the gains row-wise,
//!
//! ```text
//! S(k)·P(k) = Y_P(k),    S(k)·α(k) = Y_α(k)
//! ```
//!
//! with diagonal blocks `S_ii = R_ii + B_iᵀ·Z_i·B_i`, off-diagonal blocks
//! `S_ij = B_iᵀ·Z_i·B_j`, and right-hand sides `[Y_P]_i = B_iᵀ·Z_i·A`,
//! `[Y_α]_i = B_iᵀ·ζ_i + r_ii`. One LU factorization of `S(k)` serves both
//! systems. `S` is generally non-symmetric and not block-diagonal; cross
//! Hessians `R_ij` enter the cost-to-go propagation.
//!
//! The cost-to-go matrices are initialized to zero beyond the horizon
//! (`Z_i(T) = 0`, `ζ_i(T) = 0`), so the stage-`T−1` quadratic acts as the
//! boundary condition. With a single player the recursion reduces to the
//! classical discrete-time Riccati solution.

use nalgebra::{DMatrix, DVector};

use ilq_types::{
    GameError, LinearDynamicsApproximation, QuadraticCostApproximation, Result, Strategy,
};

use crate::dynamics::DynamicalSystem;
use crate::linalg::{lu_factor_in_place, lu_solve_factored_multi};

/// Diagonal shift applied to the coupling matrix when its factorization
/// fails with the raw blocks. Per-Hessian flooring has already run during
/// quadraticization; this is the last resort before reporting failure.
const COUPLING_REGULARIZATION: f64 = 1e-6;

/// Solve the time-varying LQ game defined by `linearization` and
/// `quadraticization`, producing one affine feedback strategy per player
/// such that `u_i(k) = u_ref,i(k) − P_i(k)·δx(k) − α_i(k)` is a feedback
/// Nash equilibrium of the approximate game.
///
/// `quadraticization[k][i]` is player `i`'s expansion at step `k`.
///
/// # Errors
///
/// Returns [`GameError::SingularCoupling`] if the block coupling matrix at
/// some step cannot be factored even after diagonal regularization, and
/// [`GameError::DimensionMismatch`] if the inputs disagree on horizon or
/// player count.
pub fn solve_lq_game(
    dynamics: &dyn DynamicalSystem,
    linearization: &[LinearDynamicsApproximation],
    quadraticization: &[Vec<QuadraticCostApproximation>],
) -> Result<Vec<Strategy>> {
    let horizon = linearization.len();
    let num_players = dynamics.num_players();
    let x_dim = dynamics.x_dim();
    let u_dims = dynamics.u_dims();
    let total_u = dynamics.total_u_dim();

    if horizon == 0 || quadraticization.len() != horizon {
        return Err(GameError::dimension_mismatch(format!(
            "linearization covers {horizon} steps, quadraticization {}",
            quadraticization.len()
        )));
    }
    if quadraticization[0].len() != num_players {
        return Err(GameError::dimension_mismatch(format!(
            "quadraticization carries {} players, dynamics has {num_players}",
            quadraticization[0].len()
        )));
    }

    // Row offset of each player's block in the stacked control space.
    let mut u_offsets = Vec::with_capacity(num_players);
    let mut offset = 0;
    for &du in &u_dims {
        u_offsets.push(offset);
        offset += du;
    }

    // Cost-to-go beyond the horizon is zero.
    let mut z: Vec<DMatrix<f64>> = (0..num_players)
        .map(|_| DMatrix::zeros(x_dim, x_dim))
        .collect();
    let mut zeta: Vec<DVector<f64>> = (0..num_players).map(|_| DVector::zeros(x_dim)).collect();

    let mut strategies: Vec<Strategy> = u_dims
        .iter()
        .map(|&du| Strategy::zeros(horizon, x_dim, du))
        .collect();

    // Preallocated per-step workspaces. `rhs` stacks [Y_P | Y_α] so one
    // factorization solves for gains and offsets together.
    let mut s = DMatrix::zeros(total_u, total_u);
    let mut s_factors = DMatrix::zeros(total_u, total_u);
    let mut rhs = DMatrix::zeros(total_u, x_dim + 1);
    let mut piv = vec![0usize; total_u];
    let mut f = DMatrix::zeros(x_dim, x_dim);
    let mut beta = DVector::zeros(x_dim);

    for k in (0..horizon).rev() {
        let lin = &linearization[k];
        let quads = &quadraticization[k];

        // Assemble the coupling system.
        for i in 0..num_players {
            let bt_z = lin.bs[i].transpose() * &z[i];
            let (off_i, du_i) = (u_offsets[i], u_dims[i]);

            for j in 0..num_players {
                let block = if i == j {
                    &quads[i].control_hess[i] + &bt_z * &lin.bs[i]
                } else {
                    &bt_z * &lin.bs[j]
                };
                s.view_mut((off_i, u_offsets[j]), (du_i, u_dims[j]))
                    .copy_from(&block);
            }

            rhs.view_mut((off_i, 0), (du_i, x_dim))
                .copy_from(&(&bt_z * &lin.a));
            rhs.view_mut((off_i, x_dim), (du_i, 1)).copy_from(
                &(lin.bs[i].transpose() * &zeta[i] + &quads[i].control_grad[i]),
            );
        }

        // Factor once; fall back to a diagonal shift before giving up.
        s_factors.copy_from(&s);
        if lu_factor_in_place(&mut s_factors, &mut piv).is_err() {
            tracing::warn!(
                time_step = k,
                "coupling matrix near-singular, retrying with diagonal shift"
            );
            s_factors.copy_from(&s);
            for d in 0..total_u {
                s_factors[(d, d)] += COUPLING_REGULARIZATION;
            }
            if lu_factor_in_place(&mut s_factors, &mut piv).is_err() {
                return Err(GameError::SingularCoupling { time_step: k });
            }
        }
        lu_solve_factored_multi(&s_factors, &piv, &mut rhs);

        for (i, strategy) in strategies.iter_mut().enumerate() {
            let (off_i, du_i) = (u_offsets[i], u_dims[i]);
            strategy.ps[k].copy_from(&rhs.view((off_i, 0), (du_i, x_dim)));
            for r in 0..du_i {
                strategy.alphas[k][r] = rhs[(off_i + r, x_dim)];
            }
        }

        // Closed-loop dynamics under the new feedback.
        f.copy_from(&lin.a);
        beta.fill(0.0);
        for (i, strategy) in strategies.iter().enumerate() {
            f -= &lin.bs[i] * &strategy.ps[k];
            beta -= &lin.bs[i] * &strategy.alphas[k];
        }

        // Propagate cost-to-go backward.
        for i in 0..num_players {
            let mut new_zeta = &quads[i].state_grad + f.transpose() * (&zeta[i] + &z[i] * &beta);
            let mut new_z = &quads[i].state_hess + f.transpose() * &z[i] * &f;
            for (j, strategy) in strategies.iter().enumerate() {
                let p_j = &strategy.ps[k];
                let alpha_j = &strategy.alphas[k];
                new_zeta +=
                    p_j.transpose() * (&quads[i].control_hess[j] * alpha_j - &quads[i].control_grad[j]);
                new_z += p_j.transpose() * &quads[i].control_hess[j] * p_j;
            }
            zeta[i] = new_zeta;
            z[i] = new_z;
        }
    }

    Ok(strategies)
}
