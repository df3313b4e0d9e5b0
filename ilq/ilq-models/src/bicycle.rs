//! Kinematic bicycle dynamics.

use nalgebra::{DMatrix, DVector};

use ilq_core::SinglePlayerDynamics;

/// Kinematic bicycle with 4 states and 2 controls.
///
/// State is `[px, py, theta, v]`, control is `[delta, a]` with `delta` the
/// front-wheel steering angle:
///
/// ```text
/// ṗx = v·cos θ
/// ṗy = v·sin θ
/// θ̇  = v·tan δ / L
/// v̇  = a
/// ```
///
/// `L` is the inter-axle distance.
#[derive(Debug, Clone, Copy)]
pub struct Bicycle4D {
    inter_axle: f64,
}

impl Bicycle4D {
    /// Index of the x position.
    pub const PX: usize = 0;
    /// Index of the y position.
    pub const PY: usize = 1;
    /// Index of the heading.
    pub const THETA: usize = 2;
    /// Index of the speed.
    pub const V: usize = 3;

    /// Index of the steering-angle control.
    pub const DELTA: usize = 0;
    /// Index of the acceleration control.
    pub const A: usize = 1;

    /// Create a bicycle with the given inter-axle distance.
    #[must_use]
    pub fn new(inter_axle: f64) -> Self {
        Self { inter_axle }
    }
}

impl SinglePlayerDynamics for Bicycle4D {
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
            v * u[Self::DELTA].tan() / self.inter_axle,
            u[Self::A],
        ])
    }

    fn jacobian_x(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DMatrix<f64> {
        let theta = x[Self::THETA];
        let v = x[Self::V];
        let mut fx = DMatrix::zeros(4, 4);
        fx[(Self::PX, Self::THETA)] = -v * theta.sin();
        fx[(Self::PX, Self::V)] = theta.cos();
        fx[(Self::PY, Self::THETA)] = v * theta.cos();
        fx[(Self::PY, Self::V)] = theta.sin();
        fx[(Self::THETA, Self::V)] = u[Self::DELTA].tan() / self.inter_axle;
        fx
    }

    fn jacobian_u(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DMatrix<f64> {
        let v = x[Self::V];
        let cos_delta = u[Self::DELTA].cos();
        let mut fu = DMatrix::zeros(4, 2);
        fu[(Self::THETA, Self::DELTA)] = v / (self.inter_axle * cos_delta * cos_delta);
        fu[(Self::V, Self::A)] = 1.0;
        fu
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_util::check_jacobians;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_steering_goes_straight() {
        let bike = Bicycle4D::new(2.5);
        let x = DVector::from_vec(vec![0.0, 0.0, 0.0, 3.0]);
        let u = DVector::zeros(2);
        let xdot = bike.xdot(0.0, &x, &u);
        assert_relative_eq!(xdot[Bicycle4D::THETA], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobians_match_finite_difference() {
        let bike = Bicycle4D::new(2.5);
        let x = DVector::from_vec(vec![0.5, 1.5, -0.3, 2.0]);
        let u = DVector::from_vec(vec![0.2, 0.5]);
        check_jacobians(&bike, &x, &u);
    }
}
