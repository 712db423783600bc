//! The stencil weights of a marker must integrate to one

use diffib_core::field::{EulerField, ForceAccumulator};
use diffib_core::geometry::Geometry;
use diffib_core::kernel::DeltaKernel;
use diffib_core::tests::test_helpers::approx_eq;
use diffib_core::transfer::spread_forces;
use glam::{DVec3, IVec3};

fn spread_total(pos: DVec3, kernel: DeltaKernel) -> f64 {
    let geom = Geometry::new(DVec3::new(-1.0, 0.5, 2.0), DVec3::splat(0.25)).unwrap();
    let field = EulerField::new(IVec3::ZERO, IVec3::splat(11), 2, 6).unwrap();
    let acc = ForceAccumulator::for_field(&field);
    spread_forces(&[pos], &[DVec3::X], &field, &acc, &geom, kernel);
    (0..acc.n_points()).map(|p| acc.load(p, 0)).sum()
}

fn node(cell: IVec3) -> DVec3 {
    let geom = Geometry::new(DVec3::new(-1.0, 0.5, 2.0), DVec3::splat(0.25)).unwrap();
    geom.cell_center(cell)
}

#[test]
fn test_four_point_sums_to_one_on_node() {
    let total = spread_total(node(IVec3::new(5, 6, 5)), DeltaKernel::FourPoint);
    assert!(approx_eq(total, 1.0, 1e-12), "total = {total}");
}

#[test]
fn test_three_point_sums_to_one_on_node() {
    let total = spread_total(node(IVec3::new(5, 6, 5)), DeltaKernel::ThreePoint);
    assert!(approx_eq(total, 1.0, 1e-12), "total = {total}");
}

#[test]
fn test_three_point_sums_to_one_between_nodes() {
    let pos = node(IVec3::new(5, 5, 6)) + DVec3::new(0.07, -0.11, 0.03);
    let total = spread_total(pos, DeltaKernel::ThreePoint);
    assert!(approx_eq(total, 1.0, 1e-12), "total = {total}");
}

#[test]
fn test_four_point_gap_drops_weight_between_nodes() {
    // 0.3 cells off-node along x: the node at 0.7 cells falls in the zero gap
    let pos = node(IVec3::new(5, 5, 5)) + DVec3::new(0.3 * 0.25, 0.0, 0.0);
    let total = spread_total(pos, DeltaKernel::FourPoint);
    assert!(total > 0.5 && total < 0.7, "total = {total}");
}

#[test]
fn test_weights_follow_axis_product() {
    let k = DeltaKernel::FourPoint;
    let h = 0.25;
    let w3 = k.weight(0.0, h) * k.weight(h, h) * k.weight(-h, h);
    assert!(approx_eq(w3 * h * h * h, 0.5 * 0.25 * 0.25, 1e-12));
}
