//! Car dynamics with steering-rate control.

use nalgebra::{DMatrix, DVector};

use ilq_core::SinglePlayerDynamics;

/// Car with 5 states and 2 controls.
///
/// State is `[px, py, theta, phi, v]` with `phi` the front-wheel angle;
/// control is `[omega, a]` with `omega` the steering *rate*:
///
/// ```text
/// ṗx = v·cos θ
/// ṗy = v·sin θ
/// θ̇  = v·tan φ / L
/// φ̇  = ω
/// v̇  = a
/// ```
///
/// `L` is the inter-axle distance.
#[derive(Debug, Clone, Copy)]
pub struct Car5D {
    inter_axle: f64,
}

impl Car5D {
    /// Index of the x position.
    pub const PX: usize = 0;
    /// Index of the y position.
    pub const PY: usize = 1;
    /// Index of the heading.
    pub const THETA: usize = 2;
    /// Index of the front-wheel angle.
    pub const PHI: usize = 3;
    /// Index of the speed.
    pub const V: usize = 4;

    /// Index of the steering-rate control.
    pub const OMEGA: usize = 0;
    /// Index of the acceleration control.
    pub const A: usize = 1;

    /// Create a car with the given inter-axle distance.
    #[must_use]
    pub fn new(inter_axle: f64) -> Self {
        Self { inter_axle }
    }
}

impl SinglePlayerDynamics for Car5D {
    fn x_dim(&self) -> usize {
        5
    }

    fn u_dim(&self) -> usize {
        2
    }

    fn xdot(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        let theta = x[Self::THETA];
        let phi = x[Self::PHI];
        let v = x[Self::V];
        DVector::from_vec(vec![
            v * theta.cos(),
            v * theta.sin(),
            v * phi.tan() / self.inter_axle,
            u[Self::OMEGA],
            u[Self::A],
        ])
    }

    fn jacobian_x(&self, _t: f64, x: &DVector<f64>, _u: &DVector<f64>) -> DMatrix<f64> {
        let theta = x[Self::THETA];
        let phi = x[Self::PHI];
        let v = x[Self::V];
        let cos_phi = phi.cos();

        let mut fx = DMatrix::zeros(5, 5);
        fx[(Self::PX, Self::THETA)] = -v * theta.sin();
        fx[(Self::PX, Self::V)] = theta.cos();
        fx[(Self::PY, Self::THETA)] = v * theta.cos();
        fx[(Self::PY, Self::V)] = theta.sin();
        fx[(Self::THETA, Self::PHI)] = v / (self.inter_axle * cos_phi * cos_phi);
        fx[(Self::THETA, Self::V)] = phi.tan() / self.inter_axle;
        fx
    }

    fn jacobian_u(&self, _t: f64, _x: &DVector<f64>, _u: &DVector<f64>) -> DMatrix<f64> {
        let mut fu = DMatrix::zeros(5, 2);
        fu[(Self::PHI, Self::OMEGA)] = 1.0;
        fu[(Self::V, Self::A)] = 1.0;
        fu
    }
}
