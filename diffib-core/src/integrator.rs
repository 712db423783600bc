use crate::body::RigidBody;
use glam::DVec3;
use rayon::prelude::*;

/// Net hydrodynamic load of a body: `ΣF·dv` and `Σ(x − c) × F·dv`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyLoad {
    pub force: DVec3,
    pub torque: DVec3,
}

/// Sum marker forces and moments about the body center.
pub fn body_load(body: &RigidBody, positions: &[DVec3]) -> BodyLoad {
    let dv = body.dv();
    let center = body.center;
    let (force, torque) = positions
        .par_iter()
        .zip(body.markers.force.par_iter())
        .map(|(pos, f)| (*f * dv, (*pos - center).cross(*f) * dv))
        .reduce(
            || (DVec3::ZERO, DVec3::ZERO),
            |a, b| (a.0 + b.0, a.1 + b.1),
        );
    BodyLoad { force, torque }
}

/// Advance the body's velocity and pose from the marker forces of the
/// previous macro step, then re-derive each marker's force from the new state.
///
/// `positions` are the markers sampled at the pose before this update.
pub fn step(body: &mut RigidBody, positions: &[DVec3], fluid_density: f64, dt: f64, alpha: f64) -> BodyLoad {
    let load = body_load(body, positions);
    let contrast = body.density - fluid_density;

    let old_velocity = body.velocity;
    let old_omega = body.omega;
    body.velocity -= 2.0 * alpha * dt / body.volume() / contrast * load.force;
    body.omega -= 2.0 * alpha * dt * body.density / body.moment_scale() / contrast * load.torque;

    body.center += alpha * dt * (body.velocity + old_velocity);
    body.varphi += alpha * dt * (body.omega + old_omega);

    let scale = body.density / dt;
    let omega = body.omega;
    let center = body.center;
    let markers = &mut body.markers;
    markers
        .force
        .par_iter_mut()
        .zip(markers.velocity.par_iter())
        .zip(positions.par_iter())
        .for_each(|((f, u), pos)| {
            *f = scale * (*u + omega.cross(center - *pos));
        });

    load
}
