//! Forward rollout and trajectory cost accumulation.
//!
//! [`compute_operating_point`] applies the current affine strategies through
//! the true nonlinear dynamics, regenerating the nominal trajectory the next
//! iteration linearizes about. [`trajectory_costs`] and
//! [`compute_strategy_costs`] accumulate each player's total cost along a
//! trajectory, with the risk-sensitive `log(Σ e^{a·c})/a` reshaping when
//! exponentiation is enabled.

use nalgebra::DVector;

use ilq_types::{GameError, OperatingPoint, Result, Strategy};

use crate::cost::PlayerCost;
use crate::dynamics::DynamicalSystem;

/// Roll the strategies forward through the true dynamics from `x0`,
/// writing the resulting trajectory into `current`.
///
/// At each step the state deviation from `last` feeds every player's
/// feedback law, `u_i = u_ref,i − P_i·δx − α_i`; with `open_loop` the
/// deviation is ignored and the strategies reduce to their offset terms.
/// The final state is recorded but not integrated past the horizon.
pub fn compute_operating_point(
    dynamics: &dyn DynamicalSystem,
    x0: &DVector<f64>,
    time_step: f64,
    open_loop: bool,
    last: &OperatingPoint,
    strategies: &[Strategy],
    current: &mut OperatingPoint,
) {
    let horizon = last.horizon();
    current.t0 = last.t0;

    let mut x = x0.clone();
    for k in 0..horizon {
        let t = last.time(k, time_step);
        let delta_x = if open_loop {
            DVector::zeros(x.len())
        } else {
            &x - &last.xs[k]
        };

        for (i, strategy) in strategies.iter().enumerate() {
            current.us[k][i] = strategy.apply(k, &delta_x, &last.us[k][i]);
        }
        current.xs[k].copy_from(&x);

        if k + 1 < horizon {
            x = dynamics.integrate(t, time_step, &x, &current.us[k]);
        }
    }
}

/// Accumulate each player's total cost along an operating point.
///
/// With exponentiation enabled the per-step costs enter as `e^{a·c_k}` and
/// the total is reported as `log(Σ)/a`, which must be positive. All players
/// must agree on whether (and how strongly) they are exponentiated.
pub fn trajectory_costs(
    player_costs: &[PlayerCost],
    operating_point: &OperatingPoint,
    time_step: f64,
) -> Result<Vec<f64>> {
    let exponential_constant = shared_exponential_constant(player_costs)?;

    let mut totals = vec![0.0; player_costs.len()];
    for k in 0..operating_point.horizon() {
        let t = operating_point.time(k, time_step);
        let x = &operating_point.xs[k];
        let us = &operating_point.us[k];
        for (total, cost) in totals.iter_mut().zip(player_costs) {
            let c = cost.evaluate(t, x, us);
            *total += match exponential_constant {
                Some(a) => (a * c).exp(),
                None => c,
            };
        }
    }

    if let Some(a) = exponential_constant {
        for total in &mut totals {
            if *total <= 0.0 {
                return Err(GameError::NonPositiveCost { total: *total });
            }
            *total = total.ln() / a;
        }
    }
    Ok(totals)
}

/// Compute each player's total cost for a set of strategies: roll the
/// strategies out from `x0` against `operating_point`, then accumulate
/// costs along the resulting trajectory.
pub fn compute_strategy_costs(
    dynamics: &dyn DynamicalSystem,
    player_costs: &[PlayerCost],
    strategies: &[Strategy],
    operating_point: &OperatingPoint,
    x0: &DVector<f64>,
    time_step: f64,
    open_loop: bool,
) -> Result<Vec<f64>> {
    let mut rolled = OperatingPoint::zeros(
        operating_point.horizon(),
        dynamics.x_dim(),
        &dynamics.u_dims(),
        operating_point.t0,
    );
    compute_operating_point(
        dynamics,
        x0,
        time_step,
        open_loop,
        operating_point,
        strategies,
        &mut rolled,
    );
    trajectory_costs(player_costs, &rolled, time_step)
}

/// The exponentiation constant shared by every player, or `None` when all
/// are risk-neutral.
///
/// # Errors
///
/// Returns an invalid-configuration error when players disagree.
pub fn shared_exponential_constant(player_costs: &[PlayerCost]) -> Result<Option<f64>> {
    let first = player_costs
        .first()
        .and_then(PlayerCost::exponential_constant);
    for cost in player_costs {
        if cost.exponential_constant() != first {
            return Err(GameError::invalid_config(
                "all players must share the same exponential constant",
            ));
        }
    }
    Ok(first)
}
