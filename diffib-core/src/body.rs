use crate::error::{IbError, IbResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of surface markers for a sphere of `radius` on cells of width `h`.
pub fn marker_count(radius: f64, h: f64) -> usize {
    let ratio = radius / h;
    (PI / 3.0 * (12.0 * ratio * ratio)).floor() as usize
}

/// Volume associated with each of `count` markers: a shell of thickness `h`
/// around the sphere, split evenly.
pub fn marker_volume(radius: f64, h: f64, count: usize) -> f64 {
    PI * h / 3.0 / count as f64 * (12.0 * radius * radius + h * h)
}

/// Transient per-marker attributes, indexed like the surface sample
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    /// Velocity interpolated from the field
    pub velocity: Vec<DVec3>,
    /// Corrective force per unit volume
    pub force: Vec<DVec3>,
}

impl MarkerSet {
    pub fn zeroed(count: usize) -> Self {
        Self {
            velocity: vec![DVec3::ZERO; count],
            force: vec![DVec3::ZERO; count],
        }
    }

    pub fn len(&self) -> usize {
        self.force.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }
}

/// A rigid immersed sphere
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub center: DVec3,
    pub velocity: DVec3,
    pub omega: DVec3,
    /// Running integral of angular velocity (not a rotation)
    pub varphi: DVec3,
    pub radius: f64,
    pub density: f64,
    marker_count: usize,
    dv: f64,
    pub markers: MarkerSet,
}

impl RigidBody {
    /// Create a body at rest, sizing its marker sample from `h`.
    pub fn new(center: DVec3, radius: f64, density: f64, h: f64) -> IbResult<Self> {
        if !(h.is_finite() && h > 0.0) {
            return Err(IbError::degenerate(format!(
                "cell size must be positive, got {h}"
            )));
        }
        if !(radius.is_finite() && radius >= h) {
            return Err(IbError::degenerate(format!(
                "radius {radius} is below one cell width {h}"
            )));
        }
        if !(density.is_finite() && density > 0.0) {
            return Err(IbError::config(format!(
                "body density must be positive, got {density}"
            )));
        }
        if !center.is_finite() {
            return Err(IbError::config("body center must be finite"));
        }
        let count = marker_count(radius, h);
        if count < 2 {
            return Err(IbError::config(format!(
                "sphere of radius {radius} yields {count} marker(s), need at least 2"
            )));
        }
        Ok(Self {
            center,
            velocity: DVec3::ZERO,
            omega: DVec3::ZERO,
            varphi: DVec3::ZERO,
            radius,
            density,
            marker_count: count,
            dv: marker_volume(radius, h, count),
            markers: MarkerSet::zeroed(count),
        })
    }

    pub fn marker_count(&self) -> usize {
        self.marker_count
    }

    pub fn dv(&self) -> f64 {
        self.dv
    }

    /// Solid volume `4/3 π a³`.
    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }

    /// Rotational momentum scale of a solid sphere, `8/15 π ρ a⁵`.
    pub fn moment_scale(&self) -> f64 {
        8.0 * PI * self.density * self.radius.powi(5) / 15.0
    }

    pub fn record(&self) -> BodyRecord {
        BodyRecord {
            center: self.center,
            velocity: self.velocity,
            omega: self.omega,
            varphi: self.varphi,
            radius: self.radius,
            density: self.density,
            marker_count: self.marker_count,
            dv: self.dv,
        }
    }

    /// Rebuild a body from a persisted record. Marker attributes start at zero.
    pub fn from_record(record: &BodyRecord) -> IbResult<Self> {
        if record.marker_count < 2 {
            return Err(IbError::config(format!(
                "record has {} marker(s), need at least 2",
                record.marker_count
            )));
        }
        if !(record.dv.is_finite() && record.dv > 0.0) {
            return Err(IbError::config("record marker volume must be positive"));
        }
        if !(record.density.is_finite() && record.density > 0.0) {
            return Err(IbError::config("record density must be positive"));
        }
        if !(record.radius.is_finite() && record.radius > 0.0) {
            return Err(IbError::degenerate("record radius must be positive"));
        }
        for (name, v) in [
            ("center", record.center),
            ("velocity", record.velocity),
            ("omega", record.omega),
            ("varphi", record.varphi),
        ] {
            if !v.is_finite() {
                return Err(IbError::config(format!(
                    "record {name} must be finite, got {v}"
                )));
            }
        }
        Ok(Self {
            center: record.center,
            velocity: record.velocity,
            omega: record.omega,
            varphi: record.varphi,
            radius: record.radius,
            density: record.density,
            marker_count: record.marker_count,
            dv: record.dv,
            markers: MarkerSet::zeroed(record.marker_count),
        })
    }
}

/// Restart record: the full body state, without marker positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub center: DVec3,
    pub velocity: DVec3,
    pub omega: DVec3,
    pub varphi: DVec3,
    pub radius: f64,
    pub density: f64,
    pub marker_count: usize,
    pub dv: f64,
}
