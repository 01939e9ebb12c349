//! Newtonian stress tensor helpers.

use nf_core::vector::{self, Vec3};
use nf_core::{MAX_DIM, Real};

pub type Tensor = [[Real; MAX_DIM]; MAX_DIM];

/// τ_ij = μ(∂v_i/∂x_j + ∂v_j/∂x_i) − ⅔ δ_ij (μ ∇·v + ρk)
pub fn stress_tensor(
    n_dim: usize,
    velocity_gradient: &[Vec3; MAX_DIM],
    viscosity: Real,
    density: Real,
    tke: Real,
) -> Tensor {
    let div: Real = (0..n_dim).map(|d| velocity_gradient[d][d]).sum();
    let mut tau = [[0.0; MAX_DIM]; MAX_DIM];
    for i in 0..n_dim {
        for j in 0..n_dim {
            tau[i][j] = viscosity * (velocity_gradient[i][j] + velocity_gradient[j][i]);
        }
        tau[i][i] -= 2.0 / 3.0 * (viscosity * div + density * tke);
    }
    tau
}

/// Traction τ·n.
pub fn traction(n_dim: usize, tau: &Tensor, normal: &Vec3) -> Vec3 {
    let mut out = vector::ZERO;
    for i in 0..n_dim {
        out[i] = vector::dot(n_dim, &tau[i], normal);
    }
    out
}

/// Wall-tangential part of the traction for a unit normal.
pub fn tangential_traction(n_dim: usize, tau: &Tensor, unit_normal: &Vec3) -> Vec3 {
    vector::tangential(n_dim, &traction(n_dim, tau, unit_normal), unit_normal)
}

/// Rescale the tensor so its wall-tangential traction magnitude equals `tau_wall`.
///
/// A tensor with no tangential traction is left unchanged.
pub fn rescale_to_wall_shear(n_dim: usize, tau: &mut Tensor, unit_normal: &Vec3, tau_wall: Real) {
    let current = vector::norm(n_dim, &tangential_traction(n_dim, tau, unit_normal));
    if !(current > 0.0) {
        return;
    }
    let scale = tau_wall / current;
    for row in tau.iter_mut().take(n_dim) {
        for v in row.iter_mut().take(n_dim) {
            *v *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shear(dudy: Real) -> [Vec3; MAX_DIM] {
        let mut g = [vector::ZERO; MAX_DIM];
        g[0][1] = dudy;
        g
    }

    #[test]
    fn simple_shear_gives_off_diagonal_stress() {
        let tau = stress_tensor(2, &shear(3.0), 2.0, 1.0, 0.0);
        assert_eq!(tau[0][1], 6.0);
        assert_eq!(tau[1][0], 6.0);
        assert_eq!(tau[0][0], 0.0);
    }

    #[test]
    fn dilatation_and_tke_only_touch_diagonal() {
        let mut g = [vector::ZERO; MAX_DIM];
        g[0][0] = 1.0;
        g[1][1] = 1.0;
        let tau = stress_tensor(2, &g, 1.0, 3.0, 0.5);
        let expected = 2.0 - 2.0 / 3.0 * (2.0 + 1.5);
        assert!((tau[0][0] - expected).abs() < 1e-14);
        assert_eq!(tau[0][1], 0.0);
    }

    #[test]
    fn rescale_hits_target_wall_shear() {
        let mut tau = stress_tensor(2, &shear(2.0), 1.0, 1.0, 0.0);
        let n = [0.0, 1.0, 0.0];
        rescale_to_wall_shear(2, &mut tau, &n, 5.0);
        let t = tangential_traction(2, &tau, &n);
        assert!((vector::norm(2, &t) - 5.0).abs() < 1e-12);
    }
}
