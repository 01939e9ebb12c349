//! Node-wise derived quantities: primitive state, vorticity and strain rate,
//! and the Roe low-dissipation coefficient.

use nf_core::vector::{self, Vec3};
use nf_core::{MAX_DIM, NodeId, Real};
use nf_fluids::FluidModel;
use nf_mesh::Mesh;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{RoeDissipation, SolverConfig};
use crate::couplings::TurbulenceSource;
use crate::error::SolverResult;
use crate::flow::FlowField;
use crate::reductions::{AllReduce, MaxReduction, Reduction};

/// Global maxima of the velocity-gradient invariants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FlowMonitor {
    pub max_vorticity: Real,
    pub max_strain: Real,
}

/// Derives primitive and secondary variables from the conserved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveStateUpdater {
    tke_needed: bool,
    hybrid: bool,
}

impl PrimitiveStateUpdater {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            tke_needed: config.turbulence.needs_tke(),
            hybrid: config.hybrid_rans_les,
        }
    }

    /// Refresh every node and return how many came out non-physical.
    ///
    /// Non-physical nodes are counted, not corrected.
    pub fn update(
        &self,
        fluid: &dyn FluidModel,
        turbulence: Option<&dyn TurbulenceSource>,
        field: &mut FlowField,
    ) -> usize {
        let n_dim = field.n_dim();
        let n_var = field.n_var();
        let tke_needed = self.tke_needed;
        let hybrid = self.hybrid;
        let conserved = &field.conserved;

        field
            .primitive
            .par_iter_mut()
            .zip(field.secondary.par_iter_mut())
            .zip(field.turb_ke.par_iter_mut())
            .zip(field.hybrid_length_scale.par_iter_mut())
            .enumerate()
            .map(|(n, (((primitive, secondary), tke), length_scale))| {
                let node = NodeId::from_usize(n);
                let eddy = turbulence.map_or(0.0, |t| t.eddy_viscosity(node));
                let derived = fluid.derive(n_dim, &conserved[n * n_var..(n + 1) * n_var], eddy);
                *primitive = derived.primitive;
                *secondary = derived.secondary;

                if let Some(t) = turbulence {
                    if tke_needed {
                        *tke = t.turbulent_kinetic_energy(node);
                    }
                    if hybrid {
                        if let Some(l) = t.hybrid_length_scale(node) {
                            *length_scale = l;
                        }
                    }
                }
                usize::from(!derived.admissible)
            })
            .sum()
    }
}

/// Vorticity of a velocity gradient `g[i][j] = ∂v_i/∂x_j`.
pub fn vorticity(n_dim: usize, g: &[Vec3; MAX_DIM]) -> Vec3 {
    let z = g[1][0] - g[0][1];
    if n_dim == 3 {
        [g[2][1] - g[1][2], g[0][2] - g[2][0], z]
    } else {
        [0.0, 0.0, z]
    }
}

/// Strain-rate magnitude sqrt(2 S_ij S_ij) of the deviatoric strain.
pub fn strain_magnitude(n_dim: usize, g: &[Vec3; MAX_DIM]) -> Real {
    let div: Real = (0..n_dim).map(|d| g[d][d]).sum();
    let third = div / 3.0;
    let mut sum: Real = (0..n_dim).map(|d| (g[d][d] - third).powi(2)).sum();
    if n_dim == 2 {
        // Out-of-plane normal strain
        sum += third * third;
    }
    sum += 2.0 * (0.5 * (g[0][1] + g[1][0])).powi(2);
    if n_dim == 3 {
        sum += 2.0 * (0.5 * (g[0][2] + g[2][0])).powi(2);
        sum += 2.0 * (0.5 * (g[1][2] + g[2][1])).powi(2);
    }
    (2.0 * sum).sqrt()
}

/// Store vorticity and strain magnitude per node and return the global maxima.
pub fn set_vorticity_strain(field: &mut FlowField, comm: &dyn AllReduce) -> FlowMonitor {
    let n_dim = field.n_dim();
    let (local_w, local_s) = field
        .gradient
        .par_iter()
        .zip(field.vorticity.par_iter_mut())
        .zip(field.strain_mag.par_iter_mut())
        .map(|((gradient, w), s)| {
            *w = vorticity(n_dim, &gradient.velocity);
            *s = strain_magnitude(n_dim, &gradient.velocity);
            (MaxReduction(vector::norm(3, w)), MaxReduction(*s))
        })
        .reduce(
            || (MaxReduction::IDENTITY, MaxReduction::IDENTITY),
            |a, b| (a.0.merge(b.0), a.1.merge(b.1)),
        );

    FlowMonitor {
        max_vorticity: comm.reduce_max(local_w.value().max(0.0)),
        max_strain: comm.reduce_max(local_s.value().max(0.0)),
    }
}

const KAPPA_FD: Real = 0.41;

fn fd_coefficient(nu_total: Real, grad_norm: Real, wall_distance: Real) -> Real {
    let uijuij = grad_norm.max(1e-10);
    let r_d = nu_total / (uijuij * KAPPA_FD * KAPPA_FD * wall_distance * wall_distance);
    1.0 - (8.0 * r_d).powi(3).tanh()
}

/// Inputs of the NTS blending function at one node.
#[derive(Debug, Clone, Copy)]
struct NtsInput {
    nu_total: Real,
    vorticity: Real,
    strain: Real,
    delta: Real,
    des_constant: Real,
    inverse_time_scale: Real,
}

fn nts_coefficient(p: NtsInput) -> Real {
    const CH1: i32 = 3;
    const CH2: Real = 1.0;
    const CH3: Real = 2.0;
    const SIGMA_MAX: Real = 1.0;
    let cnu = Real::powf(0.09, 1.5);

    let omega = p.vorticity;
    let s = p.strain;
    let baux = CH3 * omega * s.max(omega) / ((s * s + omega * omega) * 0.5).max(1e-20);
    let gaux = baux.powi(4).tanh().max(Real::MIN_POSITIVE);
    let kaux = ((omega * omega + s * s) * 0.5).sqrt().max(0.1 * p.inverse_time_scale);
    let lturb = (p.nu_total / (cnu * kaux)).sqrt();
    let aaux = CH2 * ((p.des_constant * p.delta / lturb) / gaux - 0.5).max(0.0);
    SIGMA_MAX * aaux.powi(CH1).tanh()
}

/// Fill the Roe low-dissipation coefficient for the configured model.
///
/// NTS variants read the vorticity and strain fields, so those must be current.
pub fn set_roe_dissipation(
    mesh: &Mesh,
    config: &SolverConfig,
    field: &mut FlowField,
) -> SolverResult<()> {
    field.check_mesh(mesh)?;
    let kind = config.roe_dissipation;
    if kind == RoeDissipation::None {
        return Ok(());
    }
    let n_dim = field.n_dim();
    let nodes = mesh.nodes();
    let primitive = &field.primitive;
    let gradient = &field.gradient;
    let vort = &field.vorticity;
    let strain = &field.strain_mag;

    field
        .roe_dissipation
        .par_iter_mut()
        .enumerate()
        .for_each(|(n, value)| {
            let p = &primitive[n];
            let nu_total = (p.laminar_viscosity + p.eddy_viscosity) / p.density;
            *value = match kind {
                RoeDissipation::Fd | RoeDissipation::FdDucros => fd_coefficient(
                    nu_total,
                    gradient[n].velocity_gradient_norm(n_dim),
                    nodes[n].wall_distance,
                ),
                RoeDissipation::Nts | RoeDissipation::NtsDucros => nts_coefficient(NtsInput {
                    nu_total,
                    vorticity: vector::norm(3, &vort[n]),
                    strain: strain[n],
                    delta: nodes[n].max_length,
                    des_constant: config.des_constant,
                    inverse_time_scale: config.inverse_time_scale,
                }),
                RoeDissipation::None => *value,
            };
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reductions::SerialReducer;

    fn shear(dudy: Real) -> [Vec3; MAX_DIM] {
        let mut g = [vector::ZERO; MAX_DIM];
        g[0][1] = dudy;
        g
    }

    #[test]
    fn simple_shear_invariants() {
        let g = shear(4.0);
        assert_eq!(vorticity(2, &g), [0.0, 0.0, -4.0]);
        assert!((strain_magnitude(2, &g) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rigid_rotation_has_no_strain() {
        let mut g = [vector::ZERO; MAX_DIM];
        g[0][1] = -1.0;
        g[1][0] = 1.0;
        assert_eq!(strain_magnitude(3, &g), 0.0);
        assert_eq!(vorticity(3, &g), [0.0, 0.0, 2.0]);
    }

    #[test]
    fn maxima_are_reduced() {
        let mut field = FlowField::new(2, 3);
        field.gradient[1].velocity = shear(2.0);
        field.gradient[2].velocity = shear(-5.0);
        let monitor = set_vorticity_strain(&mut field, &SerialReducer);
        assert!((monitor.max_vorticity - 5.0).abs() < 1e-12);
        assert!((monitor.max_strain - 5.0).abs() < 1e-12);
        assert_eq!(field.vorticity[0], vector::ZERO);
    }

    #[test]
    fn fd_coefficient_limits() {
        // Far from walls the coefficient tends to one, at the wall to zero.
        assert!(fd_coefficient(1.5e-5, 100.0, 1.0) > 0.999);
        assert!(fd_coefficient(1.5e-5, 100.0, 1e-6) < 1e-6);
    }

    #[test]
    fn nts_coefficient_is_bounded() {
        let value = nts_coefficient(NtsInput {
            nu_total: 1.5e-5,
            vorticity: 10.0,
            strain: 10.0,
            delta: 0.01,
            des_constant: 0.65,
            inverse_time_scale: 1.0,
        });
        assert!((0.0..=1.0).contains(&value));
    }
}
