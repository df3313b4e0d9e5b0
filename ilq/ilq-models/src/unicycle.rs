//! Planar unicycle dynamics.

use nalgebra::{DMatrix, DVector};

use ilq_core::SinglePlayerDynamics;

/// Kinematic unicycle with 4 states and 2 controls.
///
/// State is `[px, py, theta, v]`, control is `[omega, a]`, and the dynamics
/// are
///
/// ```text
/// ṗx = v·cos θ
/// ṗy = v·sin θ
/// θ̇  = ω
/// v̇  = a
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Unicycle4D;

impl Unicycle4D {
    /// Index of the x position.
    pub const PX: usize = 0;
    /// Index of the y position.
    pub const PY: usize = 1;
    /// Index of the heading.
    pub const THETA: usize = 2;
    /// Index of the speed.
    pub const V: usize = 3;

    /// Index of the turn-rate control.
    pub const OMEGA: usize = 0;
    /// Index of the acceleration control.
    pub const A: usize = 1;
}

impl SinglePlayerDynamics for Unicycle4D {
    fn x_dim(&self) -> usize {
        4
    }

    fn u_dim(&self) -> usize {
        2
    }

    fn xdot(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        let theta = x[Self::THETA];
        let v = x[Self::V];
        DVector::from_vec(vec![
            v * theta.cos(),
            v * theta.sin(),
            u[Self::OMEGA],
            u[Self::A],
        ])
    }

    fn jacobian_x(&self, _t: f64, x: &DVector<f64>, _u: &DVector<f64>) -> DMatrix<f64> {
        let theta = x[Self::THETA];
        let v = x[Self::V];
        let mut fx = DMatrix::zeros(4, 4);
        fx[(Self::PX, Self::THETA)] = -v * theta.sin();
        fx[(Self::PX, Self::V)] = theta.cos();
        fx[(Self::PY, Self::THETA)] = v * theta.cos();
        fx[(Self::PY, Self::V)] = theta.sin();
        fx
    }

    fn jacobian_u(&self, _t: f64, _x: &DVector<f64>, _u: &DVector<f64>) -> DMatrix<f64> {
        let mut fu = DMatrix::zeros(4, 2);
        fu[(Self::THETA, Self::OMEGA)] = 1.0;
        fu[(Self::V, Self::A)] = 1.0;
        fu
    }
}
