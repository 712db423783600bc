//! Marker <-> grid transfer operators
//!
//! Both operators visit the same 5x5x5 stencil around the marker's
//! containing cell and weight each node by the separable 3-D kernel times
//! the cell volume, so spreading and interpolation are adjoint.

use crate::error::{IbError, IbResult};
use crate::field::{EulerField, ForceAccumulator};
use crate::geometry::Geometry;
use crate::kernel::{DeltaKernel, STENCIL_HALF_WIDTH};
use glam::{DVec3, IVec3};
use rayon::prelude::*;

/// Precomputed per-axis weights of one marker's stencil
struct Stencil {
    base: IVec3,
    wx: [f64; 5],
    wy: [f64; 5],
    wz: [f64; 5],
}

impl Stencil {
    fn new(pos: DVec3, geom: &Geometry, kernel: DeltaKernel) -> Self {
        let base = geom.containing_cell(pos);
        let axis = |axis: usize| {
            let mut w = [0.0; 5];
            for (slot, off) in (-STENCIL_HALF_WIDTH..=STENCIL_HALF_WIDTH).enumerate() {
                let node = geom.origin[axis] + (base[axis] + off) as f64 * geom.dx[axis]
                    + 0.5 * geom.dx[axis];
                w[slot] = kernel.weight(pos[axis] - node, geom.dx[axis]);
            }
            w
        };
        Self {
            base,
            wx: axis(0),
            wy: axis(1),
            wz: axis(2),
        }
    }

    /// `(cell, weight)` for every stencil node, x fastest.
    fn nodes(&self) -> impl Iterator<Item = (IVec3, f64)> + '_ {
        (0..5).flat_map(move |c| {
            (0..5).flat_map(move |b| {
                (0..5).map(move |a| {
                    let off = IVec3::new(a as i32, b as i32, c as i32)
                        - IVec3::splat(STENCIL_HALF_WIDTH);
                    (self.base + off, self.wx[a] * self.wy[b] * self.wz[c])
                })
            })
        })
    }
}

/// First cell of `pos`'s stencil that `field` cannot address, if any.
pub fn stencil_overflow(pos: DVec3, field: &EulerField, geom: &Geometry) -> Option<IVec3> {
    let base = geom.containing_cell(pos);
    let half = IVec3::splat(STENCIL_HALF_WIDTH);
    [base - half, base + half]
        .into_iter()
        .find(|corner| !field.contains(*corner))
}

/// Check every marker of `body` against the field's addressable region.
pub fn check_stencils(
    body: usize,
    positions: &[DVec3],
    field: &EulerField,
    geom: &Geometry,
) -> IbResult<()> {
    for (marker, pos) in positions.iter().enumerate() {
        if let Some(cell) = stencil_overflow(*pos, field, geom) {
            return Err(IbError::StencilOutOfBounds { body, marker, cell });
        }
    }
    Ok(())
}

/// Gather the 3-component block at `first` onto one marker.
pub fn interpolate_at(
    pos: DVec3,
    field: &EulerField,
    first: usize,
    geom: &Geometry,
    kernel: DeltaKernel,
) -> DVec3 {
    let stencil = Stencil::new(pos, geom, kernel);
    let vol = geom.cell_volume();
    let (u, v, w) = (field.component(first), field.component(first + 1), field.component(first + 2));
    stencil
        .nodes()
        .filter(|(_, weight)| *weight != 0.0)
        .fold(DVec3::ZERO, |acc, (cell, weight)| {
            let p = field.point_index(cell);
            acc + DVec3::new(u[p], v[p], w[p]) * (weight * vol)
        })
}

/// Scatter one marker's force density into the accumulator.
pub fn spread_at(
    pos: DVec3,
    force: DVec3,
    field: &EulerField,
    acc: &ForceAccumulator,
    geom: &Geometry,
    kernel: DeltaKernel,
) {
    let stencil = Stencil::new(pos, geom, kernel);
    let vol = geom.cell_volume();
    for (cell, weight) in stencil.nodes().filter(|(_, weight)| *weight != 0.0) {
        let p = field.point_index(cell);
        let f = force * (weight * vol);
        acc.add(p, 0, f.x);
        acc.add(p, 1, f.y);
        acc.add(p, 2, f.z);
    }
}

/// Interpolate the velocity block onto all markers in parallel.
pub fn interpolate_velocity(
    positions: &[DVec3],
    field: &EulerField,
    velocity_component: usize,
    geom: &Geometry,
    kernel: DeltaKernel,
) -> Vec<DVec3> {
    positions
        .par_iter()
        .map(|pos| interpolate_at(*pos, field, velocity_component, geom, kernel))
        .collect()
}

/// Spread marker forces into `acc` in parallel; overlapping stencils
/// meet in the accumulator's atomic adds.
pub fn spread_forces(
    positions: &[DVec3],
    forces: &[DVec3],
    field: &EulerField,
    acc: &ForceAccumulator,
    geom: &Geometry,
    kernel: DeltaKernel,
) {
    positions
        .par_iter()
        .zip(forces.par_iter())
        .for_each(|(pos, force)| spread_at(*pos, *force, field, acc, geom, kernel));
}

/// Spread forces straight into the field's force block.
pub fn spread_into_field(
    positions: &[DVec3],
    forces: &[DVec3],
    field: &mut EulerField,
    force_component: usize,
    geom: &Geometry,
    kernel: DeltaKernel,
) {
    let acc = ForceAccumulator::for_field(field);
    spread_forces(positions, forces, field, &acc, geom, kernel);
    field.add_accumulated(force_component, &acc);
}
