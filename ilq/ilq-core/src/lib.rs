//! Iterative linear-quadratic solvers for N-player dynamic games.
//!
//! This crate turns a nonlinear nonzero-sum dynamic game — shared dynamics,
//! one cost functional per player, an initial joint state — into a profile
//! of affine feedback strategies that approximates a feedback Nash
//! equilibrium, together with the nominal trajectory those strategies
//! produce.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       IlqSolver                          │
//! │  rollout → linearize + quadraticize → LQ solve → damp    │
//! └──────────────┬───────────────────────────┬───────────────┘
//!                │                           │
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │      solve_lq_game        │  │     StrategyModifier     │
//! │  coupled Riccati, one     │  │  α-scaling, trust region │
//! │  factorization per step   │  │  or backtracking search  │
//! └───────────────────────────┘  └──────────────────────────┘
//! ```
//!
//! Dynamics enter through [`DynamicalSystem`] (with
//! [`ConcatenatedSystem`] stacking independent per-player subsystems and
//! [`LinearSystem`] as the exact surrogate for feedback-linearizable
//! problems), costs through [`PlayerCost`] built from [`CostTerm`]s.
//!
//! # Quick Start
//!
//! ```
//! use ilq_core::{IlqSolver, LinearSystem, PlayerCost};
//! use ilq_types::{OperatingPoint, SolverParams, Strategy};
//! use nalgebra::{DMatrix, DVector};
//!
//! # fn main() -> ilq_types::Result<()> {
//! // Single player, double-integrator dynamics, no costs: the zero
//! // strategy is already optimal and the solve converges right away.
//! let dynamics = LinearSystem::new(
//!     DMatrix::from_row_slice(2, 2, &[1.0, 0.1, 0.0, 1.0]),
//!     vec![DMatrix::from_row_slice(2, 1, &[0.0, 0.1])],
//! )?;
//! let costs = vec![PlayerCost::new(0, "P1")];
//! let params = SolverParams::with_horizon(1.0, 0.1);
//! let solver = IlqSolver::new(&dynamics, &costs, params)?;
//!
//! let horizon = solver.num_time_steps();
//! let out = solver.solve(
//!     &DVector::zeros(2),
//!     OperatingPoint::zeros(horizon, 2, &[1], 0.0),
//!     vec![Strategy::zeros(horizon, 2, 1)],
//!     None,
//! )?;
//! assert!(out.converged);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,       // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,           // mul_add style changes aren't always clearer
    clippy::neg_cmp_op_on_partial_ord,  // !(x >= y) is intentional for NaN rejection
    clippy::too_many_lines,             // The recursion and the outer loop have many steps
    clippy::doc_markdown,               // Not all technical terms need backticks
    clippy::too_many_arguments,         // Rollout entry points mirror their call sites
)]

pub mod cost;
pub mod dynamics;
pub mod linalg;
pub mod lq_game;
pub mod modifier;
pub mod rollout;
pub mod solver;

pub use cost::{CostTerm, PlayerCost};
pub use dynamics::{
    ConcatenatedSystem, DynamicalSystem, LinearSystem, SinglePlayerDynamics, rk4_step,
};
pub use linalg::psd_floor;
pub use lq_game::solve_lq_game;
pub use modifier::{AlphaScaler, LineSearch, ModifyContext, StrategyModifier};
pub use rollout::{
    compute_operating_point, compute_strategy_costs, shared_exponential_constant, trajectory_costs,
};
pub use solver::{IlqSolver, SolverOutput};

// Re-export the data types for convenience.
pub use ilq_types::{
    GameError, LinearDynamicsApproximation, OperatingPoint, QuadraticCostApproximation, Result,
    SolverIterate, SolverLog, SolverParams, Strategy,
};
