//! Law-of-the-wall shear stress model.
//!
//! For every vertex of a viscous wall, reconstruct the wall shear stress from
//! the tangential velocity at the nearest interior node, using Spalding's
//! universal profile with the White–Christoph compressible outer form. The
//! solve is a bounded, under-relaxed fixed-point iteration per vertex.

use nf_core::vector::{self, Vec3};
use nf_core::{MarkerId, Real};
use nf_mesh::Mesh;
use rayon::prelude::*;

use crate::config::{RecoveryPrandtl, SolverConfig, WallFunctionConfig};
use crate::error::{SolverError, SolverResult};
use crate::flow::FlowField;
use crate::stress;

/// Near-wall inputs of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallShearInput {
    /// Tangential velocity magnitude at the normal neighbor.
    pub tangential_velocity: Real,
    /// Pressure at the normal neighbor.
    pub pressure: Real,
    /// Temperature at the normal neighbor.
    pub temperature: Real,
    /// Distance between the wall node and its normal neighbor.
    pub distance: Real,
    /// Laminar viscosity at the wall node.
    pub laminar_viscosity: Real,
    /// Starting guess, usually the resolved tangential wall stress.
    pub seed: Real,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallShearOutcome {
    pub tau_wall: Real,
    pub iterations: usize,
    pub converged: bool,
}

/// Per-vertex fixed-point solve for the wall shear stress.
#[derive(Debug, Clone, Copy)]
pub struct WallShearStressModel {
    params: WallFunctionConfig,
    gas_constant: Real,
    cp: Real,
    recovery: Real,
}

impl WallShearStressModel {
    pub fn new(config: &SolverConfig) -> Self {
        let prandtl = match config.wall_function.recovery_prandtl {
            RecoveryPrandtl::Laminar => config.prandtl_lam,
            RecoveryPrandtl::Turbulent => config.prandtl_turb,
        };
        Self {
            params: config.wall_function,
            gas_constant: config.gas_constant,
            cp: config.cp(),
            recovery: prandtl.powf(1.0 / 3.0),
        }
    }

    /// Recovery factor r = Pr^(1/3).
    pub fn recovery(&self) -> Real {
        self.recovery
    }

    /// Crocco–Busemann wall temperature.
    pub fn wall_temperature(&self, temperature: Real, tangential_velocity: Real) -> Real {
        temperature + self.recovery * tangential_velocity * tangential_velocity / (2.0 * self.cp)
    }

    pub fn solve(&self, input: &WallShearInput) -> WallShearOutcome {
        let u = input.tangential_velocity;
        let d = input.distance;
        let mu = input.laminar_viscosity;
        let done = |tau_wall, iterations, converged| WallShearOutcome {
            tau_wall,
            iterations,
            converged,
        };

        if !(u > 0.0) || !(d > 0.0) {
            return done(0.0, 0, true);
        }

        let t_wall = self.wall_temperature(input.temperature, u);
        let rho_wall = input.pressure / (self.gas_constant * t_wall);
        if !(rho_wall > 0.0 && rho_wall.is_finite()) {
            return done(0.0, 0, false);
        }

        let mut tau = if input.seed > 0.0 && input.seed.is_finite() {
            input.seed
        } else {
            mu * u / d
        };
        if !(tau > 0.0 && tau.is_finite()) {
            return done(0.0, 0, false);
        }

        let WallFunctionConfig {
            max_iterations,
            tolerance,
            relaxation,
            kappa,
            b,
            ..
        } = self.params;
        let exp_kb = (-kappa * b).exp();

        let mut last_diff = Real::INFINITY;
        for pass in 1..=max_iterations {
            let u_tau = (tau / rho_wall).sqrt();
            let u_plus = u / u_tau;

            // Nichols & Nelson; beta = 0 for adiabatic walls
            let gam = self.recovery * u_tau * u_tau / (2.0 * self.cp * t_wall);
            let beta = 0.0;
            let q = (beta * beta + 4.0 * gam).sqrt();
            let phi = (-beta / q).asin();
            let arg = ((2.0 * gam * u_plus - beta) / q).clamp(-1.0, 1.0);
            let y_plus_white = ((kappa / gam.sqrt()) * (arg.asin() - phi)).exp() * exp_kb;

            let kup = kappa * u_plus;
            let y_plus =
                u_plus + y_plus_white - exp_kb * (1.0 + kup * (1.0 + 0.5 * kup + kup * kup / 6.0));

            let tau_new = (y_plus * mu / d).powi(2) / rho_wall;
            if !tau_new.is_finite() {
                tracing::debug!(tau, "non-finite wall shear update, keeping current value");
                return done(tau, pass, false);
            }

            last_diff = (tau_new - tau).abs();
            tau += relaxation * (tau_new - tau);
            if last_diff < tolerance {
                return done(tau, pass, true);
            }
        }

        tracing::warn!(
            tau_wall = tau,
            diff = last_diff,
            max_iterations,
            "wall shear stress has not converged"
        );
        done(tau, max_iterations, false)
    }

    /// Gather the inputs of one wall vertex from the flow field.
    pub fn gather(
        &self,
        mesh: &Mesh,
        field: &FlowField,
        vertex: &nf_mesh::Vertex,
    ) -> Option<WallShearInput> {
        let n_dim = mesh.n_dim();
        let (_, outward) = vector::unit(n_dim, &vertex.normal)?;
        let unit: Vec3 = vector::scale(n_dim, &outward, -1.0);

        let wall = &field.primitive[vertex.node.idx()];
        let neighbor = &field.primitive[vertex.normal_neighbor.idx()];
        let vel_t = vector::tangential(n_dim, &neighbor.velocity, &unit);

        let tau = stress::stress_tensor(
            n_dim,
            &field.gradient[vertex.node.idx()].velocity,
            wall.laminar_viscosity,
            wall.density,
            0.0,
        );
        let seed = vector::norm(n_dim, &stress::tangential_traction(n_dim, &tau, &unit));

        Some(WallShearInput {
            tangential_velocity: vector::norm(n_dim, &vel_t),
            pressure: neighbor.pressure,
            temperature: neighbor.temperature,
            distance: mesh.wall_normal_distance(vertex),
            laminar_viscosity: wall.laminar_viscosity,
            seed,
        })
    }

    /// Update `tau_wall` at every owned vertex of the given wall markers.
    ///
    /// Returns the number of vertices that did not converge.
    pub fn update(
        &self,
        mesh: &Mesh,
        walls: &[MarkerId],
        field: &mut FlowField,
    ) -> SolverResult<usize> {
        let mut unconverged = 0;
        for &marker_id in walls {
            let marker = mesh.marker(marker_id).ok_or_else(|| SolverError::ProblemSetup {
                what: format!("wall marker {marker_id} not on mesh"),
            })?;

            let shared: &FlowField = field;
            let results: Vec<(usize, WallShearOutcome)> = marker
                .vertices
                .par_iter()
                .filter(|v| mesh.nodes()[v.node.idx()].domain)
                .filter_map(|v| {
                    let input = self.gather(mesh, shared, v)?;
                    Some((v.node.idx(), self.solve(&input)))
                })
                .collect();

            for (node, outcome) in results {
                field.tau_wall[node] = outcome.tau_wall;
                unconverged += usize::from(!outcome.converged);
            }
        }
        Ok(unconverged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> WallShearStressModel {
        let config = SolverConfig {
            gas_constant: 287.0,
            gamma: 1.4,
            ..Default::default()
        };
        WallShearStressModel::new(&config)
    }

    fn laminar_input(seed: Real) -> WallShearInput {
        WallShearInput {
            tangential_velocity: 0.01,
            pressure: 1e5,
            temperature: 290.0,
            distance: 1e-6,
            laminar_viscosity: 1.8e-5,
            seed,
        }
    }

    #[test]
    fn zero_tangential_velocity_gives_zero_shear() {
        let mut input = laminar_input(1.0);
        input.tangential_velocity = 0.0;
        let out = model().solve(&input);
        assert_eq!(out.tau_wall, 0.0);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn laminar_sublayer_converges_to_linear_profile() {
        let exact = 1.8e-5 * 0.01 / 1e-6;
        let out = model().solve(&laminar_input(exact * 1.000_001));
        assert!(out.converged);
        assert!(((out.tau_wall - exact) / exact).abs() < 1e-4);
    }

    #[test]
    fn invalid_seed_falls_back_to_laminar_estimate() {
        let exact = 1.8e-5 * 0.01 / 1e-6;
        let out = model().solve(&laminar_input(Real::NAN));
        assert!(out.converged);
        assert!(((out.tau_wall - exact) / exact).abs() < 1e-4);
    }

    #[test]
    fn recovery_factor_follows_selected_prandtl() {
        let mut config = SolverConfig::default();
        config.wall_function.recovery_prandtl = RecoveryPrandtl::Turbulent;
        let m = WallShearStressModel::new(&config);
        assert!((m.recovery() - config.prandtl_turb.powf(1.0 / 3.0)).abs() < 1e-15);
    }
}
