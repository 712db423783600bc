pub mod body;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod forcing;
pub mod geometry;
pub mod integrator;
pub mod kernel;
pub mod levelset;
pub mod sampler;
pub mod transfer;

pub use body::{BodyRecord, MarkerSet, RigidBody};
pub use config::{ForcingParams, IbConfig};
pub use diagnostics::BodyReport;
pub use error::{IbError, IbResult};
pub use field::{EulerField, ForceAccumulator};
pub use forcing::{ImmersedBoundary, MarkerState};
pub use geometry::{CoordSystem, Geometry};
pub use integrator::BodyLoad;
pub use kernel::DeltaKernel;
