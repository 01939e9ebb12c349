//! Finite-difference linearizations for checking analytic Jacobian blocks.

use nalgebra::{DMatrix, DVector};
use nf_core::Real;

use crate::error::SolverResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferenceScheme {
    Forward,
    /// Twice the residual evaluations, second-order accurate.
    Central,
}

/// Perturbation of one state component: relative for large values, absolute near zero.
fn step(value: Real, epsilon: Real) -> Real {
    epsilon * value.abs().max(1.0)
}

/// ∂residual/∂state by perturbing one conserved component at a time.
pub fn difference_jacobian<F>(
    state: &DVector<Real>,
    residual: F,
    epsilon: Real,
    scheme: DifferenceScheme,
) -> SolverResult<DMatrix<Real>>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    let base = residual(state)?;
    let mut jac = DMatrix::zeros(base.len(), state.len());

    for (col, &value) in state.iter().enumerate() {
        let h = step(value, epsilon);
        let mut plus = state.clone();
        plus[col] += h;

        let column = match scheme {
            DifferenceScheme::Forward => (residual(&plus)? - &base) / h,
            DifferenceScheme::Central => {
                let mut minus = state.clone();
                minus[col] -= h;
                (residual(&plus)? - residual(&minus)?) / (2.0 * h)
            }
        };
        jac.set_column(col, &column);
    }

    Ok(jac)
}

pub fn finite_difference_jacobian<F>(
    state: &DVector<Real>,
    residual: F,
    epsilon: Real,
) -> SolverResult<DMatrix<Real>>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    difference_jacobian(state, residual, epsilon, DifferenceScheme::Forward)
}

pub fn central_difference_jacobian<F>(
    state: &DVector<Real>,
    residual: F,
    epsilon: Real,
) -> SolverResult<DMatrix<Real>>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    difference_jacobian(state, residual, epsilon, DifferenceScheme::Central)
}

/// Largest entry-wise |a − b| / max(|b|, floor).
pub fn max_relative_error(analytic: &DMatrix<Real>, reference: &DMatrix<Real>, floor: Real) -> Real {
    analytic
        .iter()
        .zip(reference.iter())
        .map(|(a, b)| (a - b).abs() / b.abs().max(floor))
        .fold(0.0, Real::max)
}
