//! Dynamics interfaces: multi-player systems, concatenation, RK4.
//!
//! A joint system is either a [`ConcatenatedSystem`] stacking independent
//! per-player subsystems (each a [`SinglePlayerDynamics`]), or any other
//! implementation of [`DynamicalSystem`], such as the time-invariant
//! [`LinearSystem`] surrogate used for feedback-linearizable problems.
//!
//! The discrete-time Jacobians returned by `linearize` follow the
//! first-order convention `A ≈ I + Δt·∂f/∂x`, `B_i ≈ Δt·∂f/∂u_i`, which
//! matches the forward integrator's local accuracy. The Jacobians must
//! describe the same map that `integrate` applies during rollout; the
//! iteration is not expected to converge otherwise.

use nalgebra::{DMatrix, DVector};

use ilq_types::{GameError, LinearDynamicsApproximation, Result};

/// Continuous-time dynamics of a single player's subsystem,
/// `ẋ = f(t, x, u)` with analytic Jacobians.
pub trait SinglePlayerDynamics: Send + Sync {
    /// State dimension of this subsystem.
    fn x_dim(&self) -> usize;

    /// Control dimension of this subsystem.
    fn u_dim(&self) -> usize;

    /// Time derivative of the state.
    fn xdot(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64>;

    /// Continuous-time Jacobian `∂f/∂x`, `x_dim × x_dim`.
    fn jacobian_x(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DMatrix<f64>;

    /// Continuous-time Jacobian `∂f/∂u`, `x_dim × u_dim`.
    fn jacobian_u(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DMatrix<f64>;
}

/// A multi-player discrete-time dynamical system.
pub trait DynamicalSystem: Send + Sync {
    /// Joint state dimension.
    fn x_dim(&self) -> usize;

    /// Number of players.
    fn num_players(&self) -> usize;

    /// Control dimension of the given player.
    fn u_dim(&self, player: usize) -> usize;

    /// Advance the joint state by one discrete time step under the given
    /// per-player controls.
    fn integrate(&self, t: f64, dt: f64, x: &DVector<f64>, us: &[DVector<f64>]) -> DVector<f64>;

    /// Discrete-time Jacobians of [`DynamicalSystem::integrate`] about
    /// `(x, us)`.
    fn linearize(
        &self,
        t: f64,
        dt: f64,
        x: &DVector<f64>,
        us: &[DVector<f64>],
    ) -> LinearDynamicsApproximation;

    /// Control dimensions of every player, in order.
    fn u_dims(&self) -> Vec<usize> {
        (0..self.num_players()).map(|i| self.u_dim(i)).collect()
    }

    /// Sum of all players' control dimensions.
    fn total_u_dim(&self) -> usize {
        (0..self.num_players()).map(|i| self.u_dim(i)).sum()
    }
}

/// One fourth-order Runge-Kutta step of `ẋ = f(t, x)`.
pub fn rk4_step<F>(f: F, t: f64, dt: f64, x: &DVector<f64>) -> DVector<f64>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let half_dt = 0.5 * dt;
    let k1 = f(t, x);
    let k2 = f(t + half_dt, &(x + &k1 * half_dt));
    let k3 = f(t + half_dt, &(x + &k2 * half_dt));
    let k4 = f(t + dt, &(x + &k3 * dt));
    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Joint system formed by stacking independent per-player subsystems.
///
/// The joint state is the concatenation of subsystem states, so the
/// continuous Jacobian is block diagonal and each player's control matrix
/// only touches that player's rows.
pub struct ConcatenatedSystem {
    subsystems: Vec<Box<dyn SinglePlayerDynamics>>,
    x_offsets: Vec<usize>,
    x_dim: usize,
}

impl ConcatenatedSystem {
    /// Stack the given subsystems into a joint system, one per player.
    #[must_use]
    pub fn new(subsystems: Vec<Box<dyn SinglePlayerDynamics>>) -> Self {
        let mut x_offsets = Vec::with_capacity(subsystems.len());
        let mut x_dim = 0;
        for sub in &subsystems {
            x_offsets.push(x_dim);
            x_dim += sub.x_dim();
        }
        Self {
            subsystems,
            x_offsets,
            x_dim,
        }
    }

    /// Index of the first state dimension belonging to `player`.
    #[must_use]
    pub fn x_offset(&self, player: usize) -> usize {
        self.x_offsets[player]
    }

    fn stacked_xdot(&self, t: f64, x: &DVector<f64>, us: &[DVector<f64>]) -> DVector<f64> {
        let mut xdot = DVector::zeros(self.x_dim);
        for (i, sub) in self.subsystems.iter().enumerate() {
            let offset = self.x_offsets[i];
            let x_i = x.rows(offset, sub.x_dim()).into_owned();
            let xdot_i = sub.xdot(t, &x_i, &us[i]);
            xdot.rows_mut(offset, sub.x_dim()).copy_from(&xdot_i);
        }
        xdot
    }
}

impl DynamicalSystem for ConcatenatedSystem {
    fn x_dim(&self) -> usize {
        self.x_dim
    }

    fn num_players(&self) -> usize {
        self.subsystems.len()
    }

    fn u_dim(&self, player: usize) -> usize {
        self.subsystems[player].u_dim()
    }

    fn integrate(&self, t: f64, dt: f64, x: &DVector<f64>, us: &[DVector<f64>]) -> DVector<f64> {
        rk4_step(|tau, state| self.stacked_xdot(tau, state, us), t, dt, x)
    }

    fn linearize(
        &self,
        t: f64,
        dt: f64,
        x: &DVector<f64>,
        us: &[DVector<f64>],
    ) -> LinearDynamicsApproximation {
        let mut lin = LinearDynamicsApproximation::identity(self.x_dim, &self.u_dims());
        for (i, sub) in self.subsystems.iter().enumerate() {
            let offset = self.x_offsets[i];
            let n = sub.x_dim();
            let x_i = x.rows(offset, n).into_owned();

            let fx = sub.jacobian_x(t, &x_i, &us[i]);
            let mut a_block = lin.a.view_mut((offset, offset), (n, n));
            for r in 0..n {
                for c in 0..n {
                    a_block[(r, c)] += dt * fx[(r, c)];
                }
            }

            let fu = sub.jacobian_u(t, &x_i, &us[i]);
            lin.bs[i]
                .view_mut((offset, 0), (n, sub.u_dim()))
                .copy_from(&(fu * dt));
        }
        lin
    }
}

/// Time-invariant linear multi-player system `x' = A·x + Σ_i B_i·u_i`.
///
/// `integrate` applies the exact discrete-time map (the step size is
/// already baked into `A` and `B_i`), so the linearization is exact and a
/// single LQ solve recovers the equilibrium — the surrogate used for
/// feedback-linearizable problems.
pub struct LinearSystem {
    a: DMatrix<f64>,
    bs: Vec<DMatrix<f64>>,
}

impl LinearSystem {
    /// Create a linear system from its transition and control matrices.
    pub fn new(a: DMatrix<f64>, bs: Vec<DMatrix<f64>>) -> Result<Self> {
        if a.nrows() != a.ncols() {
            return Err(GameError::dimension_mismatch(format!(
                "transition matrix is {}x{}, expected square",
                a.nrows(),
                a.ncols()
            )));
        }
        for (i, b) in bs.iter().enumerate() {
            if b.nrows() != a.nrows() {
                return Err(GameError::dimension_mismatch(format!(
                    "control matrix {i} has {} rows, expected {}",
                    b.nrows(),
                    a.nrows()
                )));
            }
        }
        Ok(Self { a, bs })
    }
}

impl DynamicalSystem for LinearSystem {
    fn x_dim(&self) -> usize {
        self.a.nrows()
    }

    fn num_players(&self) -> usize {
        self.bs.len()
    }

    fn u_dim(&self, player: usize) -> usize {
        self.bs[player].ncols()
    }

    fn integrate(&self, _t: f64, _dt: f64, x: &DVector<f64>, us: &[DVector<f64>]) -> DVector<f64> {
        let mut next = &self.a * x;
        for (b, u) in self.bs.iter().zip(us) {
            next += b * u;
        }
        next
    }

    fn linearize(
        &self,
        _t: f64,
        _dt: f64,
        _x: &DVector<f64>,
        _us: &[DVector<f64>],
    ) -> LinearDynamicsApproximation {
        LinearDynamicsApproximation {
            a: self.a.clone(),
            bs: self.bs.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Scalar subsystem ẋ = -x + u, with known closed form.
    struct Decay;

    impl SinglePlayerDynamics for Decay {
        fn x_dim(&self) -> usize {
            1
        }
        fn u_dim(&self) -> usize {
            1
        }
        fn xdot(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
            DVector::from_element(1, -x[0] + u[0])
        }
        fn jacobian_x(&self, _t: f64, _x: &DVector<f64>, _u: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_element(1, 1, -1.0)
        }
        fn jacobian_u(&self, _t: f64, _x: &DVector<f64>, _u: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_element(1, 1, 1.0)
        }
    }

    #[test]
    fn test_rk4_matches_exponential_decay() {
        // ẋ = -x from x(0) = 1: x(dt) = exp(-dt).
        let x0 = DVector::from_element(1, 1.0);
        let x1 = rk4_step(|_t, x| -x.clone(), 0.0, 0.1, &x0);
        assert_relative_eq!(x1[0], (-0.1_f64).exp(), epsilon = 1e-8);
    }

    #[test]
    fn test_concatenated_stacks_states() {
        let system = ConcatenatedSystem::new(vec![Box::new(Decay), Box::new(Decay)]);
        assert_eq!(system.x_dim(), 2);
        assert_eq!(system.num_players(), 2);
        assert_eq!(system.total_u_dim(), 2);
        assert_eq!(system.x_offset(1), 1);

        let x = DVector::from_vec(vec![1.0, 2.0]);
        let us = vec![DVector::zeros(1), DVector::zeros(1)];
        let next = system.integrate(0.0, 0.1, &x, &us);

        // Each block decays independently.
        assert_relative_eq!(next[0], (-0.1_f64).exp(), epsilon = 1e-8);
        assert_relative_eq!(next[1], 2.0 * (-0.1_f64).exp(), epsilon = 1e-8);
    }

    #[test]
    fn test_linearize_matches_finite_difference() {
        let system = ConcatenatedSystem::new(vec![Box::new(Decay), Box::new(Decay)]);
        let x = DVector::from_vec(vec![0.3, -0.7]);
        let us = vec![
            DVector::from_element(1, 0.2),
            DVector::from_element(1, -0.1),
        ];
        let dt = 0.1;
        let lin = system.linearize(0.0, dt, &x, &us);

        let eps = 1e-6;
        for c in 0..2 {
            let mut x_plus = x.clone();
            x_plus[c] += eps;
            let mut x_minus = x.clone();
            x_minus[c] -= eps;
            let fd = (system.integrate(0.0, dt, &x_plus, &us)
                - system.integrate(0.0, dt, &x_minus, &us))
                / (2.0 * eps);
            for r in 0..2 {
                // First-order A vs fourth-order integrator: agreement to O(dt²).
                assert_relative_eq!(lin.a[(r, c)], fd[r], epsilon = 1e-2);
            }
        }
    }

    #[test]
    fn test_linear_system_exact() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.1, 0.0, 1.0]);
        let b = DMatrix::from_row_slice(2, 1, &[0.0, 0.1]);
        let system = LinearSystem::new(a.clone(), vec![b.clone()]).unwrap();

        let x = DVector::from_vec(vec![1.0, 2.0]);
        let us = vec![DVector::from_element(1, 3.0)];
        let next = system.integrate(0.0, 0.1, &x, &us);
        assert_relative_eq!(next[0], 1.2, epsilon = 1e-12);
        assert_relative_eq!(next[1], 2.3, epsilon = 1e-12);

        let lin = system.linearize(0.0, 0.1, &x, &us);
        assert_eq!(lin.a, a);
        assert_eq!(lin.bs[0], b);
    }

    #[test]
    fn test_linear_system_rejects_bad_shapes() {
        assert!(LinearSystem::new(DMatrix::zeros(2, 3), vec![]).is_err());
        assert!(LinearSystem::new(DMatrix::identity(2, 2), vec![DMatrix::zeros(3, 1)]).is_err());
    }
}
