//! Spreading and interpolation share one stencil and are adjoint

use diffib_core::field::EulerField;
use diffib_core::geometry::Geometry;
use diffib_core::kernel::DeltaKernel;
use diffib_core::tests::test_helpers::{approx_eq, approx_eq_vec, cube_field, fill_velocity};
use diffib_core::transfer::{interpolate_at, interpolate_velocity, spread_into_field};
use glam::{DVec3, IVec3};

fn geom() -> Geometry {
    Geometry::new(DVec3::ZERO, DVec3::splat(0.5)).unwrap()
}

fn scalar(cell: IVec3) -> f64 {
    0.1 * cell.x as f64 + 0.2 * (cell.y * cell.y) as f64 - 0.05 * cell.z as f64
}

fn textured_field() -> EulerField {
    let mut field = cube_field(16);
    let cells: Vec<IVec3> = field.valid_cells().collect();
    for cell in cells {
        for c in 0..3 {
            field.set(cell, c, scalar(cell));
        }
    }
    field
}

/// Σ_n φ(n − frac)² along one axis
fn self_overlap(kernel: DeltaKernel, frac: f64) -> f64 {
    (-3..=3)
        .map(|n| kernel.profile(n as f64 + 0.5 - frac).powi(2))
        .sum()
}

#[test]
fn test_spread_and_interpolate_are_adjoint() {
    for kernel in [DeltaKernel::FourPoint, DeltaKernel::ThreePoint] {
        let g = geom();
        let pos = DVec3::new(3.87, 4.12, 3.3);
        let force = DVec3::new(1.5, -0.5, 2.0);

        let mut field = textured_field();
        spread_into_field(&[pos], &[force], &mut field, 3, &g, kernel);
        let gathered = interpolate_at(pos, &field, 0, &g, kernel);

        for c in 0..3 {
            let pairing: f64 = field
                .component(3 + c)
                .iter()
                .zip(field.component(c))
                .map(|(f, u)| f * u)
                .sum();
            assert!(
                approx_eq(pairing, force[c] * gathered[c], 1e-10),
                "{kernel:?} component {c}: {pairing} vs {}",
                force[c] * gathered[c]
            );
        }
    }
}

#[test]
fn test_round_trip_returns_force_scaled_by_self_overlap() {
    for kernel in [DeltaKernel::FourPoint, DeltaKernel::ThreePoint] {
        let g = geom();
        let cell = IVec3::new(7, 8, 7);
        let frac = DVec3::new(0.5, 0.25, 0.9);
        let pos = g.origin + g.dx * (cell.as_dvec3() + frac);

        let mut field = cube_field(16);
        spread_into_field(&[pos], &[DVec3::ONE], &mut field, 0, &g, kernel);
        let back = interpolate_at(pos, &field, 0, &g, kernel);

        let expected =
            self_overlap(kernel, frac.x) * self_overlap(kernel, frac.y) * self_overlap(kernel, frac.z);
        assert!(expected > 0.0);
        assert!(approx_eq_vec(back, DVec3::splat(expected), 1e-12), "{kernel:?}: {back:?}");
    }
}

#[test]
fn test_three_point_reproduces_uniform_velocity() {
    let g = geom();
    let mut field = cube_field(16);
    let u0 = DVec3::new(0.3, -1.2, 0.05);
    fill_velocity(&mut field, 0, u0);
    let positions = [DVec3::new(2.2, 3.9, 4.01), DVec3::new(5.0, 5.0, 5.0)];
    for u in interpolate_velocity(&positions, &field, 0, &g, DeltaKernel::ThreePoint) {
        assert!(approx_eq_vec(u, u0, 1e-12), "{u:?}");
    }
}

#[test]
fn test_overlapping_markers_accumulate() {
    let g = geom();
    let pos = DVec3::new(4.1, 4.1, 4.1);
    let mut once = cube_field(16);
    spread_into_field(&[pos], &[DVec3::Z], &mut once, 3, &g, DeltaKernel::FourPoint);
    let mut twice = cube_field(16);
    spread_into_field(&[pos, pos], &[DVec3::Z, DVec3::Z], &mut twice, 3, &g, DeltaKernel::FourPoint);

    for (a, b) in once.component(5).iter().zip(twice.component(5)) {
        assert!(approx_eq(2.0 * a, *b, 1e-14));
    }
}

#[test]
fn test_parallel_spread_of_many_markers_is_order_independent() {
    let g = geom();
    let positions: Vec<DVec3> = (0..400)
        .map(|i| {
            let t = i as f64 * 0.017;
            DVec3::new(4.0 + t.sin(), 4.0 + (2.0 * t).cos(), 4.0 + 0.5 * t.sin() * t.cos())
        })
        .collect();
    let forces: Vec<DVec3> = (0..400).map(|i| DVec3::new(1.0, i as f64 * 0.01, -0.5)).collect();

    let mut forward = cube_field(16);
    spread_into_field(&positions, &forces, &mut forward, 3, &g, DeltaKernel::ThreePoint);

    let rev_pos: Vec<DVec3> = positions.iter().rev().copied().collect();
    let rev_force: Vec<DVec3> = forces.iter().rev().copied().collect();
    let mut reversed = cube_field(16);
    spread_into_field(&rev_pos, &rev_force, &mut reversed, 3, &g, DeltaKernel::ThreePoint);

    for c in 3..6 {
        for (a, b) in forward.component(c).iter().zip(reversed.component(c)) {
            assert!(approx_eq(*a, *b, 1e-10));
        }
    }
}
