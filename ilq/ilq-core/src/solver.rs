//! The iterative LQ game solver.
//!
//! Each iteration rolls the current strategies through the true nonlinear
//! dynamics, linearizes the dynamics and quadraticizes every player's cost
//! about the resulting operating point, solves the induced time-varying LQ
//! game in closed form, and damps the update through the configured
//! [`StrategyModifier`]. Iteration stops when successive operating points
//! agree elementwise within tolerance, or at the iteration cap (reported as
//! a timeout, not a failure).
//!
//! All per-iteration buffers — both operating points, the linearization and
//! quadraticization tables — are allocated once up front; the two operating
//! points are swapped each iteration.

use nalgebra::DVector;

use ilq_types::{
    GameError, LinearDynamicsApproximation, OperatingPoint, QuadraticCostApproximation, Result,
    SolverLog, SolverParams, Strategy,
};

use crate::cost::PlayerCost;
use crate::dynamics::DynamicalSystem;
use crate::lq_game::solve_lq_game;
use crate::modifier::{AlphaScaler, ModifyContext, StrategyModifier};
use crate::rollout::{compute_operating_point, shared_exponential_constant, trajectory_costs};

/// Result of a successful solve.
#[derive(Debug, Clone)]
pub struct SolverOutput {
    /// The final nominal trajectory.
    pub operating_point: OperatingPoint,
    /// The final feedback strategies, one per player.
    pub strategies: Vec<Strategy>,
    /// Total trajectory cost per player along the final operating point.
    pub player_costs: Vec<f64>,
    /// Whether successive operating points met the tolerance. `false` means
    /// the iteration cap was reached first (a convergence timeout).
    pub converged: bool,
    /// Number of outer iterations performed.
    pub iterations: usize,
}

/// Iterative LQ game solver over shared dynamics and player costs.
pub struct IlqSolver<'a> {
    dynamics: &'a dyn DynamicalSystem,
    player_costs: &'a [PlayerCost],
    params: SolverParams,
    modifier: Box<dyn StrategyModifier>,
    num_time_steps: usize,
}

impl std::fmt::Debug for IlqSolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IlqSolver")
            .field("params", &self.params)
            .field("num_time_steps", &self.num_time_steps)
            .finish_non_exhaustive()
    }
}

impl<'a> IlqSolver<'a> {
    /// Create a solver. The default modifier scales offsets by the
    /// configured `initial_alpha_scaling`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the parameters are invalid, the
    /// cost count disagrees with the player count, or players disagree on
    /// risk sensitivity.
    pub fn new(
        dynamics: &'a dyn DynamicalSystem,
        player_costs: &'a [PlayerCost],
        params: SolverParams,
    ) -> Result<Self> {
        params.validate()?;
        if player_costs.len() != dynamics.num_players() {
            return Err(GameError::dimension_mismatch(format!(
                "{} player costs for {} players",
                player_costs.len(),
                dynamics.num_players()
            )));
        }
        shared_exponential_constant(player_costs)?;

        let modifier = Box::new(AlphaScaler::new(params.initial_alpha_scaling));
        let num_time_steps = params.num_time_steps();
        Ok(Self {
            dynamics,
            player_costs,
            params,
            modifier,
            num_time_steps,
        })
    }

    /// Replace the strategy modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Box<dyn StrategyModifier>) -> Self {
        self.modifier = modifier;
        self
    }

    /// Number of discrete time steps per solve.
    #[must_use]
    pub fn num_time_steps(&self) -> usize {
        self.num_time_steps
    }

    /// Solver parameters in use.
    #[must_use]
    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Run the iteration from `x0`, seeded with an initial operating point
    /// and initial strategies. Each iterate is appended to `log` when one
    /// is supplied.
    ///
    /// # Errors
    ///
    /// Shape disagreements surface as configuration errors before the first
    /// iteration. During iteration, a singular coupling matrix or an
    /// exhausted step-size search aborts the solve; the last valid iterate
    /// remains available through the log.
    pub fn solve(
        &self,
        x0: &DVector<f64>,
        initial_operating_point: OperatingPoint,
        initial_strategies: Vec<Strategy>,
        mut log: Option<&mut SolverLog>,
    ) -> Result<SolverOutput> {
        let horizon = self.num_time_steps;
        let x_dim = self.dynamics.x_dim();
        let u_dims = self.dynamics.u_dims();
        let dt = self.params.time_step;

        if x0.len() != x_dim {
            return Err(GameError::dimension_mismatch(format!(
                "initial state has length {}, dynamics expects {x_dim}",
                x0.len()
            )));
        }
        initial_operating_point.validate(horizon, x_dim, &u_dims)?;
        if initial_strategies.len() != u_dims.len() {
            return Err(GameError::dimension_mismatch(format!(
                "{} initial strategies for {} players",
                initial_strategies.len(),
                u_dims.len()
            )));
        }
        for (i, strategy) in initial_strategies.iter().enumerate() {
            strategy.validate(horizon, x_dim, u_dims[i])?;
        }

        // Double-buffered operating points plus per-step approximation
        // tables, allocated once and reused across iterations.
        let mut current = initial_operating_point;
        let mut last = OperatingPoint::zeros(horizon, x_dim, &u_dims, current.t0);
        let mut strategies = initial_strategies;
        let mut linearization: Vec<LinearDynamicsApproximation> =
            vec![LinearDynamicsApproximation::identity(x_dim, &u_dims); horizon];
        let mut quadraticization: Vec<Vec<QuadraticCostApproximation>> =
            vec![vec![QuadraticCostApproximation::zeros(x_dim, &u_dims); u_dims.len()]; horizon];

        let mut player_cost_totals = trajectory_costs(self.player_costs, &current, dt)?;
        if let Some(log) = log.as_deref_mut() {
            log.add_iterate(current.clone(), strategies.clone(), player_cost_totals.clone());
        }

        let mut iterations = 0;
        let converged = loop {
            if iterations > 0 && self.has_converged(&last, &current) {
                break true;
            }
            if iterations >= self.params.max_iterations {
                tracing::debug!(iterations, "iteration cap reached, reporting timeout");
                break false;
            }
            iterations += 1;

            last.swap(&mut current);
            compute_operating_point(
                self.dynamics,
                x0,
                dt,
                self.params.open_loop,
                &last,
                &strategies,
                &mut current,
            );

            for k in 0..horizon {
                let t = current.time(k, dt);
                linearization[k] = self.dynamics.linearize(t, dt, &current.xs[k], &current.us[k]);
                for (i, cost) in self.player_costs.iter().enumerate() {
                    quadraticization[k][i] = cost.quadraticize(t, &current.xs[k], &current.us[k]);
                }
            }

            strategies = solve_lq_game(self.dynamics, &linearization, &quadraticization)?;

            let ctx = ModifyContext {
                dynamics: self.dynamics,
                player_costs: self.player_costs,
                params: &self.params,
                x0,
                operating_point: &current,
            };
            self.modifier.modify(&ctx, &mut strategies)?;

            player_cost_totals = trajectory_costs(self.player_costs, &current, dt)?;
            tracing::debug!(
                iteration = iterations,
                player_costs = ?player_cost_totals,
                "solver iterate"
            );
            if let Some(log) = log.as_deref_mut() {
                log.add_iterate(current.clone(), strategies.clone(), player_cost_totals.clone());
            }
        };

        Ok(SolverOutput {
            operating_point: current,
            strategies,
            player_costs: player_cost_totals,
            converged,
            iterations,
        })
    }

    /// Elementwise trajectory stability test: every state and every
    /// player's control must agree within tolerance at every time step.
    fn has_converged(&self, last: &OperatingPoint, current: &OperatingPoint) -> bool {
        let tol = self.params.convergence_tolerance;
        for k in 0..current.horizon() {
            if (&current.xs[k] - &last.xs[k]).amax() > tol {
                return false;
            }
            for (u_current, u_last) in current.us[k].iter().zip(&last.us[k]) {
                if (u_current - u_last).amax() > tol {
                    return false;
                }
            }
        }
        true
    }
}
