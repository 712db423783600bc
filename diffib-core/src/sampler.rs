//! Lagrangian surface sampling of a sphere
//!
//! Markers follow a generalized spiral: marker `k` of `M` sits at height
//! `H_k = -1 + 2k/(M-1)` and its azimuth advances by
//! `3.809 / sqrt(M) / sqrt(1 - H_k²)` from the previous marker, so the
//! index -> surface point mapping depends only on `M`.

use crate::body::RigidBody;
use glam::DVec3;
use std::f64::consts::TAU;

const SPIRAL_STEP: f64 = 3.809;

/// Unit directions of the `count` markers (`count >= 2`).
pub fn spiral_directions(count: usize) -> Vec<DVec3> {
    let m = count as f64;
    let mut phi = 0.0_f64;
    (0..count)
        .map(|k| {
            let h = -1.0 + 2.0 * k as f64 / (m - 1.0);
            let theta = h.clamp(-1.0, 1.0).acos();
            if k == 0 || k == count - 1 {
                phi = 0.0;
            } else {
                phi = (phi + SPIRAL_STEP / m.sqrt() / (1.0 - h * h).sqrt()) % TAU;
            }
            DVec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            )
        })
        .collect()
}

/// Marker positions on a sphere of `radius` around `center`.
pub fn sample_sphere(center: DVec3, radius: f64, count: usize) -> Vec<DVec3> {
    spiral_directions(count)
        .into_iter()
        .map(|dir| center + radius * dir)
        .collect()
}

/// Marker positions for the body's current pose.
pub fn marker_positions(body: &RigidBody) -> Vec<DVec3> {
    sample_sphere(body.center, body.radius, body.marker_count())
}
