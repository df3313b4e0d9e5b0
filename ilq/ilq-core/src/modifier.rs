//! Step control for the LQ update.
//!
//! The LQ solve returns a full Newton-like step; applying it verbatim can
//! leave the region where the linear-quadratic approximation is trusted.
//! A [`StrategyModifier`] damps the update before the next rollout. Both
//! variants only touch the affine offsets — gains pass through unchanged —
//! and both preserve lengths and dimensions.

use nalgebra::DVector;

use ilq_types::{GameError, OperatingPoint, Result, SolverParams, Strategy};

use crate::cost::PlayerCost;
use crate::dynamics::DynamicalSystem;
use crate::rollout::compute_strategy_costs;

/// Everything a modifier may consult while damping the update.
pub struct ModifyContext<'a> {
    /// The game dynamics, for trial rollouts.
    pub dynamics: &'a dyn DynamicalSystem,
    /// Every player's cost, for merit evaluation.
    pub player_costs: &'a [PlayerCost],
    /// Solver configuration (damping and trust-region knobs).
    pub params: &'a SolverParams,
    /// Initial joint state of the solve.
    pub x0: &'a DVector<f64>,
    /// The operating point the next rollout will deviate from.
    pub operating_point: &'a OperatingPoint,
}

/// Damps candidate strategies in place after each LQ solve.
pub trait StrategyModifier: Send + Sync {
    /// Modify `strategies` so the next rollout stays near the trusted
    /// region. Implementations must not change the feedback gains.
    fn modify(&self, ctx: &ModifyContext<'_>, strategies: &mut [Strategy]) -> Result<()>;
}

/// Fixed multiplicative damping of the offsets, with an optional cap on
/// their infinity norm.
///
/// With scaling `1` and no cap this is the identity.
pub struct AlphaScaler {
    scaling: f64,
}

impl AlphaScaler {
    /// Create a scaler with the given fixed `γ ∈ (0, 1]`.
    #[must_use]
    pub fn new(scaling: f64) -> Self {
        Self { scaling }
    }
}

impl StrategyModifier for AlphaScaler {
    fn modify(&self, ctx: &ModifyContext<'_>, strategies: &mut [Strategy]) -> Result<()> {
        for strategy in strategies.iter_mut() {
            for alpha in &mut strategy.alphas {
                *alpha *= self.scaling;
            }
        }

        if let Some(cap) = ctx.params.trust_region_size {
            for strategy in strategies.iter_mut() {
                let max_offset = strategy
                    .alphas
                    .iter()
                    .map(|alpha| alpha.amax())
                    .fold(0.0_f64, f64::max);
                if max_offset > cap {
                    let shrink = cap / max_offset;
                    for alpha in &mut strategy.alphas {
                        *alpha *= shrink;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Backtracking line search on the offset scaling.
///
/// Starting from the configured initial scaling, the candidate offsets are
/// scaled, rolled out through the true dynamics, and accepted when the
/// summed player costs do not exceed those of the current operating point.
/// Each rejection halves the scaling; falling below the floor aborts the
/// solve.
pub struct LineSearch {
    floor: f64,
}

impl LineSearch {
    /// Default smallest scaling tried before giving up.
    pub const DEFAULT_FLOOR: f64 = 1e-3;

    /// Create a line search with the default floor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            floor: Self::DEFAULT_FLOOR,
        }
    }

    /// Create a line search with a custom floor.
    #[must_use]
    pub fn with_floor(floor: f64) -> Self {
        Self { floor }
    }
}

impl Default for LineSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyModifier for LineSearch {
    fn modify(&self, ctx: &ModifyContext<'_>, strategies: &mut [Strategy]) -> Result<()> {
        let baseline: f64 = crate::rollout::trajectory_costs(
            ctx.player_costs,
            ctx.operating_point,
            ctx.params.time_step,
        )?
        .iter()
        .sum();

        let mut scaling = ctx.params.initial_alpha_scaling;
        loop {
            let mut trial = strategies.to_vec();
            for strategy in &mut trial {
                for alpha in &mut strategy.alphas {
                    *alpha *= scaling;
                }
            }

            let merit: f64 = compute_strategy_costs(
                ctx.dynamics,
                ctx.player_costs,
                &trial,
                ctx.operating_point,
                ctx.x0,
                ctx.params.time_step,
                ctx.params.open_loop,
            )?
            .iter()
            .sum();

            if merit <= baseline {
                tracing::debug!(scaling, merit, baseline, "line search accepted");
                for (out, accepted) in strategies.iter_mut().zip(trial) {
                    *out = accepted;
                }
                return Ok(());
            }

            scaling *= 0.5;
            if scaling < self.floor {
                return Err(GameError::StepSizeFloor { floor: self.floor });
            }
            tracing::debug!(scaling, merit, baseline, "line search halved");
        }
    }
}
