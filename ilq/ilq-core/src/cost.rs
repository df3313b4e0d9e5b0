//! Player cost interface: evaluation, quadraticization, risk sensitivity.
//!
//! A [`PlayerCost`] is a sum of [`CostTerm`]s, each depending on either the
//! joint state or one player's control. Quadraticization expands the stage
//! cost to second order about a trajectory point, keeping that block
//! structure, and floors the spectrum of the state Hessian and the player's
//! own-control Hessian so the downstream LQ recursion sees
//! positive-definite blocks even where the raw cost is concave (proximity
//! penalties inside their margin, for example).

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use ilq_types::QuadraticCostApproximation;

use crate::linalg::psd_floor;

/// Smallest eigenvalue allowed in a regularized cost Hessian.
const HESSIAN_FLOOR: f64 = 1e-4;

/// A single additive cost term.
///
/// `input` is whatever slice of the game the term depends on: the joint
/// state for state costs, a single player's control for control costs.
pub trait CostTerm: Send + Sync {
    /// Evaluate this term.
    fn evaluate(&self, t: f64, input: &DVector<f64>) -> f64;

    /// Accumulate this term's Hessian and gradient at `input` into the
    /// running sums.
    fn quadraticize(
        &self,
        t: f64,
        input: &DVector<f64>,
        hess: &mut DMatrix<f64>,
        grad: &mut DVector<f64>,
    );
}

/// One player's total cost: state terms, per-controller control terms, and
/// an optional shared risk-sensitivity constant.
pub struct PlayerCost {
    name: String,
    player: usize,
    state_costs: Vec<Arc<dyn CostTerm>>,
    control_costs: Vec<(usize, Arc<dyn CostTerm>)>,
    exponential_constant: Option<f64>,
}

impl PlayerCost {
    /// Create an empty cost for the given player.
    #[must_use]
    pub fn new(player: usize, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            player,
            state_costs: Vec::new(),
            control_costs: Vec::new(),
            exponential_constant: None,
        }
    }

    /// The player this cost belongs to.
    #[must_use]
    pub fn player(&self) -> usize {
        self.player
    }

    /// Human-readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a term depending on the joint state.
    pub fn add_state_cost(&mut self, cost: Arc<dyn CostTerm>) {
        self.state_costs.push(cost);
    }

    /// Add a term depending on `player`'s control. Terms on other players'
    /// controls are allowed and produce cross blocks in the
    /// quadraticization.
    pub fn add_control_cost(&mut self, player: usize, cost: Arc<dyn CostTerm>) {
        self.control_costs.push((player, cost));
    }

    /// Enable risk sensitivity with constant `a`; `a ≤ 0` disables it.
    pub fn set_exponential_constant(&mut self, a: f64) {
        self.exponential_constant = (a > 0.0).then_some(a);
    }

    /// The risk-sensitivity constant, if enabled.
    #[must_use]
    pub fn exponential_constant(&self) -> Option<f64> {
        self.exponential_constant
    }

    /// Raw stage cost: the sum of all terms at `(t, x, us)`.
    ///
    /// Risk sensitivity does not enter here; exponentiation is applied by
    /// trajectory-cost accumulation and by [`PlayerCost::quadraticize`].
    #[must_use]
    pub fn evaluate(&self, t: f64, x: &DVector<f64>, us: &[DVector<f64>]) -> f64 {
        let state: f64 = self.state_costs.iter().map(|c| c.evaluate(t, x)).sum();
        let control: f64 = self
            .control_costs
            .iter()
            .map(|(j, c)| c.evaluate(t, &us[*j]))
            .sum();
        state + control
    }

    /// Second-order expansion of the (possibly exponentiated) stage cost at
    /// `(t, x, us)`.
    ///
    /// When exponentiated, the transform `H ← e^{a·c̃}(a·H + a²·g·gᵀ)`,
    /// `g ← a·e^{a·c̃}·g` is applied per block, with the scalar factor
    /// computed once from the total stage cost `c̃`. The state Hessian and
    /// the own-control Hessian are then floored to stay positive-definite.
    #[must_use]
    pub fn quadraticize(
        &self,
        t: f64,
        x: &DVector<f64>,
        us: &[DVector<f64>],
    ) -> QuadraticCostApproximation {
        let u_dims: Vec<usize> = us.iter().map(DVector::len).collect();
        let mut quad = QuadraticCostApproximation::zeros(x.len(), &u_dims);

        for cost in &self.state_costs {
            cost.quadraticize(t, x, &mut quad.state_hess, &mut quad.state_grad);
        }
        for (j, cost) in &self.control_costs {
            cost.quadraticize(t, &us[*j], &mut quad.control_hess[*j], &mut quad.control_grad[*j]);
        }

        if let Some(a) = self.exponential_constant {
            let scale = (a * self.evaluate(t, x, us)).exp();
            exponentiate_block(&mut quad.state_hess, &mut quad.state_grad, a, scale);
            for (hess, grad) in quad.control_hess.iter_mut().zip(&mut quad.control_grad) {
                exponentiate_block(hess, grad, a, scale);
            }
        }

        psd_floor(&mut quad.state_hess, HESSIAN_FLOOR);
        psd_floor(&mut quad.control_hess[self.player], HESSIAN_FLOOR);
        quad
    }
}

/// Replace `(H, g)` by the expansion of `exp(a·c)`:
/// `H ← scale·(a·H + a²·g·gᵀ)`, `g ← a·scale·g`, with
/// `scale = e^{a·c̃}` precomputed by the caller.
fn exponentiate_block(hess: &mut DMatrix<f64>, grad: &mut DVector<f64>, a: f64, scale: f64) {
    let outer = &*grad * grad.transpose();
    *hess = (&*hess * a + outer * (a * a)) * scale;
    *grad *= a * scale;
}
