//! Edge viscous flux and its Jacobian.

use nalgebra::{DMatrix, DVector};
use nf_core::vector::{self, Vec3};
use nf_core::{MAX_DIM, Real};
use nf_fluids::{FluidModel, PrimitiveGradient, PrimitiveState};

use crate::stress;

/// Viscous residual of one edge plus its derivatives w.r.t. both endpoint states.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFlux {
    pub residual: DVector<Real>,
    pub jacobian_i: DMatrix<Real>,
    pub jacobian_j: DMatrix<Real>,
}

impl EdgeFlux {
    pub fn zeros(n_var: usize) -> Self {
        Self {
            residual: DVector::zeros(n_var),
            jacobian_i: DMatrix::zeros(n_var, n_var),
            jacobian_j: DMatrix::zeros(n_var, n_var),
        }
    }
}

/// Everything the numerics need about one edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeInput<'a> {
    pub n_dim: usize,
    /// Area-weighted normal pointing from i to j.
    pub normal: &'a Vec3,
    pub coord: [&'a Vec3; 2],
    pub primitive: [&'a PrimitiveState; 2],
    pub gradient: [&'a PrimitiveGradient; 2],
    /// Turbulence kinetic energy; zero when the model carries none.
    pub tke: [Real; 2],
    /// Wall shear stress from the wall function; zero when unset.
    pub tau_wall: [Real; 2],
}

/// Viscous flux scheme on an edge.
pub trait ViscousNumerics: Send + Sync {
    fn name(&self) -> &str;

    /// Residual and, if `implicit`, the two Jacobian blocks.
    fn compute(&self, edge: &EdgeInput<'_>, implicit: bool) -> EdgeFlux;
}

/// Averaged-gradient viscous flux with a thin-shear-layer Jacobian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragedGradient {
    gamma: Real,
    gas_constant: Real,
    cp: Real,
    prandtl_lam: Real,
    prandtl_turb: Real,
}

impl AveragedGradient {
    pub fn new(fluid: &dyn FluidModel) -> Self {
        Self {
            gamma: fluid.gamma(),
            gas_constant: fluid.gas_constant(),
            cp: fluid.cp(),
            prandtl_lam: fluid.prandtl_lam(),
            prandtl_turb: fluid.prandtl_turb(),
        }
    }

    fn conductivity(&self, mu: Real, mu_t: Real) -> Real {
        self.cp * (mu / self.prandtl_lam + mu_t / self.prandtl_turb)
    }
}

fn mean(a: Real, b: Real) -> Real {
    0.5 * (a + b)
}

/// Average of two gradients with the edge-direction component replaced by
/// the finite difference along the edge.
fn corrected_gradient(
    n_dim: usize,
    grad_i: &Vec3,
    grad_j: &Vec3,
    value_i: Real,
    value_j: Real,
    dx: &Vec3,
    dist2: Real,
) -> Vec3 {
    let mut g = vector::ZERO;
    for d in 0..n_dim {
        g[d] = mean(grad_i[d], grad_j[d]);
    }
    let correction = (value_j - value_i) - vector::dot(n_dim, &g, dx);
    for d in 0..n_dim {
        g[d] += correction * dx[d] / dist2;
    }
    g
}

impl ViscousNumerics for AveragedGradient {
    fn name(&self) -> &str {
        "averaged_gradient"
    }

    fn compute(&self, edge: &EdgeInput<'_>, implicit: bool) -> EdgeFlux {
        let n_dim = edge.n_dim;
        let n_var = nf_core::n_var(n_dim);
        let mut flux = EdgeFlux::zeros(n_var);

        let Some((area, unit)) = vector::unit(n_dim, edge.normal) else {
            return flux;
        };
        let dx = vector::delta(n_dim, edge.coord[0], edge.coord[1]);
        let dist2 = vector::squared_norm(n_dim, &dx);
        if !(dist2 > 0.0) {
            return flux;
        }

        let [pi, pj] = edge.primitive;
        let [gi, gj] = edge.gradient;

        let mut vel_grad = [vector::ZERO; MAX_DIM];
        for k in 0..n_dim {
            vel_grad[k] = corrected_gradient(
                n_dim,
                &gi.velocity[k],
                &gj.velocity[k],
                pi.velocity[k],
                pj.velocity[k],
                &dx,
                dist2,
            );
        }
        let temp_grad = corrected_gradient(
            n_dim,
            &gi.temperature,
            &gj.temperature,
            pi.temperature,
            pj.temperature,
            &dx,
            dist2,
        );

        let mu = mean(pi.laminar_viscosity, pj.laminar_viscosity);
        let mu_t = mean(pi.eddy_viscosity, pj.eddy_viscosity);
        let rho = mean(pi.density, pj.density);
        let tke = mean(edge.tke[0], edge.tke[1]);
        let mut vel = vector::ZERO;
        for d in 0..n_dim {
            vel[d] = mean(pi.velocity[d], pj.velocity[d]);
        }

        let mut tau = stress::stress_tensor(n_dim, &vel_grad, mu + mu_t, rho, tke);
        if edge.tau_wall[0] > 0.0 && edge.tau_wall[1] > 0.0 {
            let target = mean(edge.tau_wall[0], edge.tau_wall[1]);
            stress::rescale_to_wall_shear(n_dim, &mut tau, &unit, target);
        }

        let k = self.conductivity(mu, mu_t);
        let traction = stress::traction(n_dim, &tau, edge.normal);
        for d in 0..n_dim {
            flux.residual[d + 1] = traction[d];
        }
        flux.residual[n_dim + 1] = vector::dot(n_dim, &traction, &vel)
            + k * vector::dot(n_dim, &temp_grad, edge.normal);

        if !implicit {
            return flux;
        }

        // Thin shear layer: ∂v/∂x ≈ (v_j − v_i) n / d
        let dist = dist2.sqrt();
        let factor = (mu + mu_t) * area / (rho * dist);
        let mut m = [[0.0; MAX_DIM]; MAX_DIM];
        for a in 0..n_dim {
            for b in 0..n_dim {
                m[a][b] = unit[a] * unit[b] / 3.0;
            }
            m[a][a] += 1.0;
        }
        let mut pi_vec = vector::ZERO;
        for a in 0..n_dim {
            pi_vec[a] = vector::dot(n_dim, &m[a], &vel);
        }

        let jj = &mut flux.jacobian_j;
        let energy = n_dim + 1;
        for a in 0..n_dim {
            jj[(a + 1, 0)] = -factor * pi_vec[a];
            for b in 0..n_dim {
                jj[(a + 1, b + 1)] = factor * m[a][b];
            }
        }
        jj[(energy, 0)] = -factor * vector::dot(n_dim, &pi_vec, &vel);
        for b in 0..n_dim {
            jj[(energy, b + 1)] = factor * pi_vec[b];
        }

        let gm1 = self.gamma - 1.0;
        let r = self.gas_constant;
        let temperature = mean(pi.temperature, pj.temperature);
        let cond = k * area / dist;
        let sq_vel = vector::squared_norm(n_dim, &vel);
        let dt_drho = (-temperature + gm1 / r * 0.5 * sq_vel) / rho;
        jj[(energy, 0)] += cond * dt_drho;
        for b in 0..n_dim {
            jj[(energy, b + 1)] -= cond * gm1 * vel[b] / (r * rho);
        }
        jj[(energy, energy)] += cond * gm1 / (r * rho);

        flux.jacobian_i = -flux.jacobian_j.clone();
        flux
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_fluids::IdealGas;

    fn state(u: Real, t: Real) -> PrimitiveState {
        PrimitiveState {
            temperature: t,
            velocity: [u, 0.0, 0.0],
            pressure: 1e5,
            density: 1.2,
            laminar_viscosity: 1.8e-5,
            ..Default::default()
        }
    }

    fn flux(pi: &PrimitiveState, pj: &PrimitiveState, tau_wall: [Real; 2]) -> EdgeFlux {
        let gas = IdealGas::air();
        let g = PrimitiveGradient::default();
        let normal = [0.0, 0.5, 0.0];
        let xi = [0.0, 0.0, 0.0];
        let xj = [0.0, 0.1, 0.0];
        AveragedGradient::new(&gas).compute(
            &EdgeInput {
                n_dim: 2,
                normal: &normal,
                coord: [&xi, &xj],
                primitive: [pi, pj],
                gradient: [&g, &g],
                tke: [0.0; 2],
                tau_wall,
            },
            true,
        )
    }

    #[test]
    fn shear_between_nodes_gives_momentum_flux() {
        let f = flux(&state(0.0, 300.0), &state(1.0, 300.0), [0.0; 2]);
        // τ_xy = μ du/dy = 1.8e-5 * 10, times area 0.5
        assert!((f.residual[1] - 1.8e-5 * 10.0 * 0.5).abs() < 1e-15);
        assert_eq!(f.residual[0], 0.0);
        assert!(f.residual[2].abs() < 1e-15);
    }

    #[test]
    fn uniform_state_has_no_flux() {
        let s = state(3.0, 300.0);
        let f = flux(&s, &s, [0.0; 2]);
        assert!(f.residual.iter().all(|v| v.abs() < 1e-15));
    }

    #[test]
    fn wall_shear_rescales_momentum_flux() {
        let f = flux(&state(0.0, 300.0), &state(1.0, 300.0), [2.0, 2.0]);
        assert!((f.residual[1] - 2.0 * 0.5).abs() < 1e-12);

        let one_sided = flux(&state(0.0, 300.0), &state(1.0, 300.0), [2.0, 0.0]);
        assert!((one_sided.residual[1] - 1.8e-5 * 10.0 * 0.5).abs() < 1e-15);
    }

    #[test]
    fn jacobian_blocks_are_opposite() {
        let f = flux(&state(0.5, 290.0), &state(1.0, 310.0), [0.0; 2]);
        assert_eq!(f.jacobian_i, -f.jacobian_j.clone());
        assert!(f.jacobian_j[(1, 1)] > 0.0);
        assert!(f.jacobian_j.row(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn heat_flows_down_the_temperature_gradient() {
        let f = flux(&state(0.0, 300.0), &state(0.0, 310.0), [0.0; 2]);
        assert!(f.residual[3] > 0.0);
    }
}
