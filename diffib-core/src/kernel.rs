//! Regularized delta functions used by the marker <-> grid transfers.

use serde::{Deserialize, Serialize};

/// Half-width, in cells, of the transfer stencil around a marker's cell.
pub const STENCIL_HALF_WIDTH: i32 = 2;

/// Regularized delta function variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKernel {
    #[default]
    FourPoint,
    ThreePoint,
}

impl DeltaKernel {
    /// One-dimensional kernel profile at normalized distance `r = |d| / h`.
    pub fn profile(self, r: f64) -> f64 {
        let r = r.abs();
        match self {
            // Only [0, 0.5) and [1, 2) carry weight; [0.5, 1) falls through to zero.
            DeltaKernel::FourPoint => {
                if r < 0.5 {
                    (3.0 - 2.0 * r + (1.0 + 4.0 * r - 4.0 * r * r).sqrt()) / 8.0
                } else if (1.0..2.0).contains(&r) {
                    (5.0 - 2.0 * r - (-7.0 + 12.0 * r - 4.0 * r * r).sqrt()) / 8.0
                } else {
                    0.0
                }
            }
            DeltaKernel::ThreePoint => {
                if r < 0.5 {
                    (1.0 + (1.0 - 3.0 * r * r).sqrt()) / 3.0
                } else if r < 1.5 {
                    let s = 1.0 - r;
                    (5.0 - 3.0 * r - (1.0 - 3.0 * s * s).sqrt()) / 6.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Weight between a field node and a marker separated by `distance`
    /// along one axis with cell width `h`.
    #[inline]
    pub fn weight(self, distance: f64, h: f64) -> f64 {
        self.profile(distance / h) / h
    }
}
