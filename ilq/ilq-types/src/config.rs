//! Solver configuration.
//!
//! [`SolverParams`] gathers every knob the iterative LQ game solver
//! recognizes: horizon discretization, iteration and convergence limits,
//! step damping, and risk sensitivity.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for an iterative LQ game solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverParams {
    /// Time horizon in seconds. The number of discrete time steps is
    /// `ceil(time_horizon / time_step)`.
    pub time_horizon: f64,
    /// Integration step in seconds.
    pub time_step: f64,
    /// Outer-loop iteration cap. Reaching it is reported as a convergence
    /// timeout, not a failure.
    pub max_iterations: usize,
    /// Elementwise tolerance on successive operating points, applied to both
    /// states and controls.
    pub convergence_tolerance: f64,
    /// Initial damping applied to the affine strategy offsets.
    pub initial_alpha_scaling: f64,
    /// Optional cap on the infinity norm of each player's offsets; the
    /// modifier rescales to meet it. `None` disables the cap.
    pub trust_region_size: Option<f64>,
    /// Shared risk-sensitivity constant; `0` disables exponentiation.
    pub exponential_constant: f64,
    /// Uniform weight used when constructing quadratic control-effort costs.
    pub control_cost_weight: f64,
    /// Open-loop rollout: ignore state deviations when applying feedback.
    pub open_loop: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            time_horizon: 10.0,
            time_step: 0.1,
            max_iterations: 50,
            convergence_tolerance: 0.1,
            initial_alpha_scaling: 0.05,
            trust_region_size: None,
            exponential_constant: 0.0,
            control_cost_weight: 1.0,
            open_loop: false,
        }
    }
}

impl SolverParams {
    /// Create parameters with the given horizon and step, other fields at
    /// their defaults.
    #[must_use]
    pub fn with_horizon(time_horizon: f64, time_step: f64) -> Self {
        Self {
            time_horizon,
            time_step,
            ..Default::default()
        }
    }

    /// Set the iteration cap.
    #[must_use]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    #[must_use]
    pub fn convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    /// Set the initial offset damping.
    #[must_use]
    pub fn alpha_scaling(mut self, scaling: f64) -> Self {
        self.initial_alpha_scaling = scaling;
        self
    }

    /// Cap the infinity norm of strategy offsets.
    #[must_use]
    pub fn trust_region(mut self, size: f64) -> Self {
        self.trust_region_size = Some(size);
        self
    }

    /// Set the shared risk-sensitivity constant.
    #[must_use]
    pub fn exponential_constant(mut self, a: f64) -> Self {
        self.exponential_constant = a;
        self
    }

    /// Use open-loop rollouts.
    #[must_use]
    pub fn open_loop(mut self) -> Self {
        self.open_loop = true;
        self
    }

    /// Number of discrete time steps spanned by the horizon.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn num_time_steps(&self) -> usize {
        (self.time_horizon / self.time_step).ceil() as usize
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(crate::GameError::invalid_config(format!(
                "time step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if !self.time_horizon.is_finite() || self.time_horizon < self.time_step {
            return Err(crate::GameError::invalid_config(
                "time horizon must cover at least one time step",
            ));
        }
        if self.max_iterations == 0 {
            return Err(crate::GameError::invalid_config(
                "max iterations must be at least 1",
            ));
        }
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance <= 0.0 {
            return Err(crate::GameError::invalid_config(
                "convergence tolerance must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.initial_alpha_scaling) || self.initial_alpha_scaling == 0.0 {
            return Err(crate::GameError::invalid_config(format!(
                "alpha scaling must lie in (0, 1], got {}",
                self.initial_alpha_scaling
            )));
        }
        if let Some(size) = self.trust_region_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(crate::GameError::invalid_config(
                    "trust region size must be positive",
                ));
            }
        }
        if !self.exponential_constant.is_finite() || self.exponential_constant < 0.0 {
            return Err(crate::GameError::invalid_config(
                "exponential constant must be non-negative",
            ));
        }
        Ok(())
    }
}
