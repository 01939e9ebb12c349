//! Energy-equation terms of a moving no-slip wall.

use nf_core::vector::{self, Vec3};
use nf_core::{MAX_DIM, Real};

use crate::stress;

/// Local state at a moving wall vertex.
#[derive(Debug, Clone, Copy)]
pub struct MovingWallInput<'a> {
    pub n_dim: usize,
    /// Unit normal pointing into the fluid.
    pub unit_normal: &'a Vec3,
    pub grid_velocity: &'a Vec3,
    pub velocity_gradient: &'a [Vec3; MAX_DIM],
    /// Laminar plus eddy viscosity.
    pub total_viscosity: Real,
    pub area: Real,
    pub density: Real,
    pub pressure: Real,
    /// Distance to the normal neighbor.
    pub distance: Real,
    pub gamma: Real,
}

/// Add the pressure work p (v_g·n) A and shear work (τ·v_g)·n A of a moving wall.
///
/// When `energy_row` is given, the analytic pressure-term derivatives and a
/// thin-layer approximation of the shear term are added to it.
pub fn add_moving_wall_contribution(
    input: &MovingWallInput<'_>,
    energy_row: Option<&mut [Real]>,
    res_conv: &mut Real,
    res_visc: &mut Real,
) {
    let n_dim = input.n_dim;
    let vg = input.grid_velocity;
    let n = input.unit_normal;
    let proj_grid_vel = input.area * vector::dot(n_dim, vg, n);

    let tau = stress::stress_tensor(
        n_dim,
        input.velocity_gradient,
        input.total_viscosity,
        input.density,
        0.0,
    );
    let mut tau_vel = vector::ZERO;
    for i in 0..n_dim {
        tau_vel[i] = vector::dot(n_dim, &tau[i], vg);
    }

    *res_conv += input.pressure * proj_grid_vel;
    *res_visc += vector::dot(n_dim, &tau_vel, n) * input.area;

    let Some(row) = energy_row else {
        return;
    };

    let gm1 = input.gamma - 1.0;
    let vg2 = vector::squared_norm(n_dim, vg);
    row[0] += 0.5 * gm1 * vg2 * proj_grid_vel;
    for k in 0..n_dim {
        row[k + 1] += -gm1 * vg[k] * proj_grid_vel;
    }
    row[n_dim + 1] += gm1 * proj_grid_vel;

    let theta2 = 1.0;
    let factor = input.total_viscosity * input.area / (input.density * input.distance);

    if n_dim == 2 {
        let thetax = theta2 + n[0] * n[0] / 3.0;
        let thetay = theta2 + n[1] * n[1] / 3.0;
        let etaz = n[0] * n[1] / 3.0;

        let pix = vg[0] * thetax + vg[1] * etaz;
        let piy = vg[0] * etaz + vg[1] * thetay;

        row[0] += factor * (-pix * vg[0] + piy * vg[1]);
        row[1] += factor * pix;
        row[2] += factor * piy;
    } else {
        let thetax = theta2 + n[0] * n[0] / 3.0;
        let thetay = theta2 + n[1] * n[1] / 3.0;
        let thetaz = theta2 + n[2] * n[2] / 3.0;
        let etaz = n[0] * n[1] / 3.0;
        let etax = n[1] * n[2] / 3.0;
        let etay = n[0] * n[2] / 3.0;

        let pix = vg[0] * thetax + vg[1] * etaz + vg[2] * etay;
        let piy = vg[0] * etaz + vg[1] * thetay + vg[2] * etax;
        let piz = vg[0] * etay + vg[1] * etax + vg[2] * thetaz;

        row[0] += factor * (-pix * vg[0] + piy * vg[1] + piz * vg[2]);
        row[1] += factor * pix;
        row[2] += factor * piy;
        row[3] += factor * piz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> [Vec3; MAX_DIM] {
        let mut g = [vector::ZERO; MAX_DIM];
        g[0][1] = 40.0;
        g[1][0] = -3.0;
        g
    }

    fn input<'a>(
        n_dim: usize,
        n: &'a Vec3,
        vg: &'a Vec3,
        g: &'a [Vec3; MAX_DIM],
    ) -> MovingWallInput<'a> {
        MovingWallInput {
            n_dim,
            unit_normal: n,
            grid_velocity: vg,
            velocity_gradient: g,
            total_viscosity: 1.8e-5,
            area: 0.1,
            density: 1.2,
            pressure: 1e5,
            distance: 0.01,
            gamma: 1.4,
        }
    }

    #[test]
    fn zero_grid_velocity_adds_nothing() {
        let g = gradient();
        for n_dim in [2, 3] {
            let n = [0.0, 1.0, 0.0];
            let vg = vector::ZERO;
            let mut row = vec![0.0; n_dim + 2];
            let (mut conv, mut visc) = (0.0, 0.0);
            add_moving_wall_contribution(
                &input(n_dim, &n, &vg, &g),
                Some(&mut row),
                &mut conv,
                &mut visc,
            );
            assert_eq!(conv, 0.0);
            assert_eq!(visc, 0.0);
            assert!(row.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn normal_grid_motion_does_pressure_work() {
        let g = [vector::ZERO; MAX_DIM];
        let n = [0.0, 1.0, 0.0];
        let vg = [0.0, 2.0, 0.0];
        let (mut conv, mut visc) = (0.0, 0.0);
        add_moving_wall_contribution(&input(2, &n, &vg, &g), None, &mut conv, &mut visc);
        assert!((conv - 1e5 * 2.0 * 0.1).abs() < 1e-9);
        assert_eq!(visc, 0.0);
    }

    #[test]
    fn tangential_grid_motion_does_shear_work() {
        let g = gradient();
        let n = [0.0, 1.0, 0.0];
        let vg = [1.5, 0.0, 0.0];
        let (mut conv, mut visc) = (0.0, 0.0);
        let mut row = vec![0.0; 4];
        add_moving_wall_contribution(
            &input(2, &n, &vg, &g),
            Some(&mut row),
            &mut conv,
            &mut visc,
        );
        assert_eq!(conv, 0.0);
        // τ_xy = μ (40 − 3)
        let expected = 1.8e-5 * 37.0 * 1.5 * 0.1;
        assert!((visc - expected).abs() < 1e-15);
        let factor = 1.8e-5 * 0.1 / (1.2 * 0.01);
        assert!((row[1] - factor * 1.5).abs() < 1e-15);
        assert!((row[0] + factor * 1.5 * 1.5).abs() < 1e-15);
    }
}
