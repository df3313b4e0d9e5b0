//! Error types for game solver operations.

use thiserror::Error;

/// Errors that can occur while setting up or running a game solve.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    /// Strategies, operating point, dynamics, or costs disagree on shape.
    #[error("dimension mismatch: {context}")]
    DimensionMismatch {
        /// Description of the disagreeing shapes.
        context: String,
    },

    /// Invalid solver configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// The block coupling matrix was singular despite regularization, so the
    /// LQ step cannot proceed.
    #[error("coupling matrix singular at time step {time_step}")]
    SingularCoupling {
        /// Time step at which factorization failed.
        time_step: usize,
    },

    /// Step-size control could not find a usable scaling above its floor.
    #[error("step-size search exhausted below floor {floor}")]
    StepSizeFloor {
        /// The smallest scaling that was tried.
        floor: f64,
    },

    /// Exponentiated trajectory cost accumulation requires a positive total.
    #[error("exponentiated trajectory cost must be positive, got {total}")]
    NonPositiveCost {
        /// The offending accumulated total.
        total: f64,
    },
}

impl GameError {
    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(context: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a shape or configuration error (fatal before
    /// iteration starts).
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::InvalidConfig { .. }
        )
    }

    /// Check if this is a numerical failure of the LQ step.
    #[must_use]
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::SingularCoupling { .. })
    }
}
