//! Core types for iterative linear-quadratic game solvers.
//!
//! This crate provides the foundational types for N-player dynamic game
//! solvers:
//!
//! - [`Strategy`] - Affine time-varying feedback for a single player
//! - [`OperatingPoint`] - Nominal state-and-control trajectory
//! - [`LinearDynamicsApproximation`] - Discrete-time dynamics Jacobians
//! - [`QuadraticCostApproximation`] - Per-player quadratic cost expansion
//! - [`SolverParams`] - Horizon, step size, damping, convergence settings
//! - [`SolverLog`] - Append-only record of solver iterates
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no dynamics, no cost evaluation,
//! no recursion. They're the common language between:
//!
//! - Game solvers (the coupled Riccati recursion and its outer loop)
//! - Dynamics models (vehicles, point masses, linear surrogates)
//! - Cost libraries (tracking, control-effort, proximity terms)
//! - Logging and replay (serialized iterate trajectories)
//!
//! # Example
//!
//! ```
//! use ilq_types::{OperatingPoint, Strategy};
//! use nalgebra::DVector;
//!
//! // A zero strategy over 10 steps for a 4-state, 2-control player.
//! let strategy = Strategy::zeros(10, 4, 2);
//! let u_ref = DVector::from_element(2, 1.0);
//! let delta_x = DVector::zeros(4);
//!
//! // With zero gains and offsets, feedback returns the reference control.
//! assert_eq!(strategy.apply(0, &delta_x, &u_ref), u_ref);
//!
//! let op = OperatingPoint::zeros(10, 4, &[2], 0.0);
//! assert_eq!(op.horizon(), 10);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,    // Error docs added where non-obvious
)]

mod approximation;
mod config;
mod error;
mod log;
mod operating_point;
mod strategy;

pub use approximation::{LinearDynamicsApproximation, QuadraticCostApproximation};
pub use config::SolverParams;
pub use error::GameError;
pub use log::{SolverIterate, SolverLog};
pub use operating_point::OperatingPoint;
pub use strategy::Strategy;

/// Result type for game solver operations.
pub type Result<T> = std::result::Result<T, GameError>;
