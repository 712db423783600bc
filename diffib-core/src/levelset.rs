//! Solid volume fraction from a nodal level set (negative inside the body).

use crate::error::{IbError, IbResult};
use crate::field::EulerField;
use crate::geometry::Geometry;
use glam::{DVec3, IVec3};
use rayon::prelude::*;

#[inline]
fn heaviside(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Signed distance to a sphere sampled at the corners of cells `lo..=hi`.
///
/// Node `n` sits at `origin + n * dx`; the returned field's box is `lo..=hi + 1`.
pub fn sphere_level_set(
    center: DVec3,
    radius: f64,
    lo: IVec3,
    hi: IVec3,
    geom: &Geometry,
) -> IbResult<EulerField> {
    let mut phi = EulerField::new(lo, hi + IVec3::ONE, 0, 1)?;
    let nodes: Vec<IVec3> = phi.valid_cells().collect();
    for node in nodes {
        let x = geom.origin + geom.dx * node.as_dvec3();
        phi.set(node, 0, (x - center).length() - radius);
    }
    Ok(phi)
}

/// Write into `pvf[comp]` the fraction of each valid cell covered by the
/// negative region of the nodal level set `phi`.
pub fn nodal_phi_to_pvf(pvf: &mut EulerField, comp: usize, phi: &EulerField) -> IbResult<()> {
    if !phi.contains(pvf.lo()) || !phi.contains(pvf.hi() + IVec3::ONE) {
        return Err(IbError::config(
            "nodal level set does not cover the corners of every cell",
        ));
    }
    let cells: Vec<IVec3> = pvf.valid_cells().collect();
    let values: Vec<f64> = cells
        .par_iter()
        .map(|cell| {
            let mut num = 0.0;
            let mut den = 0.0;
            for dz in 0..2 {
                for dy in 0..2 {
                    for dx in 0..2 {
                        let v = phi.get(*cell + IVec3::new(dx, dy, dz), 0);
                        num += -v * heaviside(-v);
                        den += v.abs();
                    }
                }
            }
            num / (den + 1e-12)
        })
        .collect();
    for (cell, value) in cells.into_iter().zip(values) {
        pvf.set(cell, comp, value);
    }
    Ok(())
}
