//! Per-step body diagnostics
//!
//! Reports what the last macro step did to each body: the hydrodynamic
//! load used by the rigid update and how far the markers still slip
//! relative to the body after the final correction.

use crate::body::RigidBody;
use crate::integrator::BodyLoad;
use glam::DVec3;
use std::fmt;

/// State of one body after a macro step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyReport {
    pub index: usize,
    pub center: DVec3,
    pub velocity: DVec3,
    pub omega: DVec3,
    /// Load of the previous step's marker forces
    pub load: BodyLoad,
    /// Largest `|U_body − U_marker|` seen by the last sub-iteration
    pub max_slip: f64,
}

impl BodyReport {
    pub fn new(index: usize, body: &RigidBody, load: BodyLoad) -> Self {
        Self {
            index,
            center: body.center,
            velocity: body.velocity,
            omega: body.omega,
            load,
            max_slip: max_slip(body),
        }
    }
}

/// Largest slip between the body's translational velocity and its markers.
pub fn max_slip(body: &RigidBody) -> f64 {
    body.markers
        .velocity
        .iter()
        .map(|u| (body.velocity - *u).length())
        .fold(0.0, f64::max)
}

fn fmt_vec(v: DVec3) -> String {
    format!("({:.6e}, {:.6e}, {:.6e})", v.x, v.y, v.z)
}

impl fmt::Display for BodyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "body {}: center = {}, velocity = {}, omega = {}, force = {}, max slip = {:.3e}",
            self.index,
            fmt_vec(self.center),
            fmt_vec(self.velocity),
            fmt_vec(self.omega),
            fmt_vec(self.load.force),
            self.max_slip
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_slip() {
        let mut body = RigidBody::new(DVec3::ZERO, 0.2, 2.0, 0.1).unwrap();
        body.velocity = DVec3::X;
        body.markers.velocity.fill(DVec3::X);
        body.markers.velocity[3] = DVec3::new(1.0, 0.5, 0.0);
        assert!((max_slip(&body) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_report_display_mentions_index() {
        let body = RigidBody::new(DVec3::ZERO, 0.2, 2.0, 0.1).unwrap();
        let report = BodyReport::new(4, &body, BodyLoad::default());
        assert!(report.to_string().starts_with("body 4:"));
    }
}
