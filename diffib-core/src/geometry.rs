//! Grid metrics for the coupling level
//!
//! Cells are addressed by integer index; cell `i` spans
//! `[origin + i*dx, origin + (i+1)*dx)` and field values live at cell centers.

use crate::error::{IbError, IbResult};
use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Coordinate system of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordSystem {
    #[default]
    Cartesian,
    /// Axisymmetric: x is the radius, y the axis. z is unused.
    Rz,
}

/// Cell size, physical origin and coordinate system of one grid level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub origin: DVec3,
    pub dx: DVec3,
    #[serde(default)]
    pub coord: CoordSystem,
}

impl Geometry {
    /// Cartesian geometry, rejecting non-positive or non-finite spacing.
    pub fn new(origin: DVec3, dx: DVec3) -> IbResult<Self> {
        Self::with_coord(origin, dx, CoordSystem::Cartesian)
    }

    pub fn with_coord(origin: DVec3, dx: DVec3, coord: CoordSystem) -> IbResult<Self> {
        let geom = Self { origin, dx, coord };
        geom.validate()?;
        Ok(geom)
    }

    pub fn validate(&self) -> IbResult<()> {
        for (axis, h) in self.dx.to_array().into_iter().enumerate() {
            if !(h.is_finite() && h > 0.0) {
                return Err(IbError::degenerate(format!(
                    "cell spacing along axis {axis} must be positive, got {h}"
                )));
            }
        }
        if !self.origin.is_finite() {
            return Err(IbError::degenerate("domain origin must be finite"));
        }
        Ok(())
    }

    /// Cell width used for marker sizing (x direction).
    pub fn cell_size(&self) -> f64 {
        self.dx.x
    }

    /// Volume of one Cartesian cell, the quadrature weight of the transfers.
    pub fn cell_volume(&self) -> f64 {
        self.dx.x * self.dx.y * self.dx.z
    }

    /// Index of the cell containing `pos`.
    pub fn containing_cell(&self, pos: DVec3) -> IVec3 {
        ((pos - self.origin) / self.dx).floor().as_ivec3()
    }

    pub fn cell_center(&self, cell: IVec3) -> DVec3 {
        self.origin + self.dx * (cell.as_dvec3() + DVec3::splat(0.5))
    }

    pub fn lo_edge(&self, index: i32, dir: usize) -> f64 {
        self.origin[dir] + self.dx[dir] * index as f64
    }

    pub fn hi_edge(&self, index: i32, dir: usize) -> f64 {
        self.origin[dir] + self.dx[dir] * (index + 1) as f64
    }

    /// Physical volume of `cell` in this coordinate system.
    pub fn volume(&self, cell: IVec3) -> f64 {
        match self.coord {
            CoordSystem::Cartesian => self.cell_volume(),
            CoordSystem::Rz => {
                let r_lo = self.lo_edge(cell.x, 0);
                let r_hi = self.hi_edge(cell.x, 0);
                PI * self.dx.y * (r_hi * r_hi - r_lo * r_lo)
            }
        }
    }

    /// Area of the low face of `cell` normal to `dir`.
    pub fn area_lo(&self, cell: IVec3, dir: usize) -> IbResult<f64> {
        self.face_area(cell, dir, self.lo_edge(cell.x, 0))
    }

    /// Area of the high face of `cell` normal to `dir`.
    pub fn area_hi(&self, cell: IVec3, dir: usize) -> IbResult<f64> {
        self.face_area(cell, dir, self.hi_edge(cell.x, 0))
    }

    fn face_area(&self, cell: IVec3, dir: usize, radial_face: f64) -> IbResult<f64> {
        match (self.coord, dir) {
            (CoordSystem::Cartesian, 0) => Ok(self.dx.y * self.dx.z),
            (CoordSystem::Cartesian, 1) => Ok(self.dx.x * self.dx.z),
            (CoordSystem::Cartesian, 2) => Ok(self.dx.x * self.dx.y),
            (CoordSystem::Rz, 0) => Ok(2.0 * PI * self.dx.y * radial_face),
            (CoordSystem::Rz, 1) => {
                let r_lo = self.lo_edge(cell.x, 0);
                let r_hi = self.hi_edge(cell.x, 0);
                Ok(PI * (r_hi * r_hi - r_lo * r_lo))
            }
            _ => Err(IbError::config(format!(
                "no face direction {dir} in {:?} coordinates",
                self.coord
            ))),
        }
    }
}
