//! Quadratic cost terms.

use nalgebra::{DMatrix, DVector};

use ilq_core::CostTerm;

/// Quadratic penalty `0.5·w·(input_d − nominal)²`, either on a single
/// dimension of the input or summed over the whole input vector.
#[derive(Debug, Clone, Copy)]
pub struct QuadraticCost {
    weight: f64,
    dimension: Option<usize>,
    nominal: f64,
}

impl QuadraticCost {
    /// Penalize one dimension of the input.
    #[must_use]
    pub fn on_dimension(weight: f64, dimension: usize, nominal: f64) -> Self {
        Self {
            weight,
            dimension: Some(dimension),
            nominal,
        }
    }

    /// Penalize every dimension of the input against the same nominal.
    #[must_use]
    pub fn on_all(weight: f64, nominal: f64) -> Self {
        Self {
            weight,
            dimension: None,
            nominal,
        }
    }
}

impl CostTerm for QuadraticCost {
    fn evaluate(&self, _t: f64, input: &DVector<f64>) -> f64 {
        match self.dimension {
            Some(d) => {
                let delta = input[d] - self.nominal;
                0.5 * self.weight * delta * delta
            }
            None => {
                0.5 * self.weight
                    * input
                        .iter()
                        .map(|v| (v - self.nominal) * (v - self.nominal))
                        .sum::<f64>()
            }
        }
    }

    fn quadraticize(
        &self,
        _t: f64,
        input: &DVector<f64>,
        hess: &mut DMatrix<f64>,
        grad: &mut DVector<f64>,
    ) {
        match self.dimension {
            Some(d) => {
                hess[(d, d)] += self.weight;
                grad[d] += self.weight * (input[d] - self.nominal);
            }
            None => {
                for d in 0..input.len() {
                    hess[(d, d)] += self.weight;
                    grad[d] += self.weight * (input[d] - self.nominal);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_dimension() {
        let cost = QuadraticCost::on_dimension(2.0, 1, 0.5);
        let input = DVector::from_vec(vec![9.0, 1.5, 9.0]);
        assert_relative_eq!(cost.evaluate(0.0, &input), 1.0, epsilon = 1e-12);

        let mut hess = DMatrix::zeros(3, 3);
        let mut grad = DVector::zeros(3);
        cost.quadraticize(0.0, &input, &mut hess, &mut grad);
        assert_relative_eq!(hess[(1, 1)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(hess[(0, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(grad[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_whole_vector() {
        let cost = QuadraticCost::on_all(1.0, 0.0);
        let input = DVector::from_vec(vec![3.0, -4.0]);
        assert_relative_eq!(cost.evaluate(0.0, &input), 12.5, epsilon = 1e-12);

        let mut hess = DMatrix::zeros(2, 2);
        let mut grad = DVector::zeros(2);
        cost.quadraticize(0.0, &input, &mut hess, &mut grad);
        assert_relative_eq!(grad[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(grad[1], -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let cost = QuadraticCost::on_all(1.7, 0.3);
        let input = DVector::from_vec(vec![1.0, -2.0]);
        let mut hess = DMatrix::zeros(2, 2);
        let mut grad = DVector::zeros(2);
        cost.quadraticize(0.0, &input, &mut hess, &mut grad);

        let eps = 1e-6;
        for d in 0..2 {
            let mut plus = input.clone();
            plus[d] += eps;
            let mut minus = input.clone();
            minus[d] -= eps;
            let fd = (cost.evaluate(0.0, &plus) - cost.evaluate(0.0, &minus)) / (2.0 * eps);
            assert_relative_eq!(grad[d], fd, epsilon = 1e-6);
        }
    }
}
