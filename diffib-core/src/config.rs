//! Engine configuration

use crate::error::{IbError, IbResult};
use crate::field::EulerField;
use crate::kernel::DeltaKernel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-step direct-forcing controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcingParams {
    pub kernel: DeltaKernel,
    /// Fixed number of correction sub-iterations per macro step
    pub sub_iterations: u32,
    /// Relaxation coefficient of the rigid-body update, in (0, 1]
    pub relaxation: f64,
}

impl Default for ForcingParams {
    fn default() -> Self {
        Self {
            kernel: DeltaKernel::FourPoint,
            sub_iterations: 3,
            relaxation: 0.5,
        }
    }
}

impl ForcingParams {
    pub fn validate(&self) -> IbResult<()> {
        if self.sub_iterations == 0 {
            return Err(IbError::config("sub_iterations must be at least 1"));
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(IbError::config(format!(
                "relaxation must lie in (0, 1], got {}",
                self.relaxation
            )));
        }
        Ok(())
    }
}

/// Immersed-boundary engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IbConfig {
    pub forcing: ForcingParams,
    pub fluid_density: f64,
    /// First of the three force components in the field
    pub force_component: usize,
    /// First of the three velocity components in the field
    pub velocity_component: usize,
}

impl Default for IbConfig {
    fn default() -> Self {
        Self {
            forcing: ForcingParams::default(),
            fluid_density: 1.0,
            force_component: 3,
            velocity_component: 0,
        }
    }
}

impl IbConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> IbResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: IbConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IbResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> IbResult<()> {
        self.forcing.validate()?;
        if !(self.fluid_density.is_finite() && self.fluid_density > 0.0) {
            return Err(IbError::config(format!(
                "fluid_density must be positive, got {}",
                self.fluid_density
            )));
        }
        let (f, v) = (self.force_component, self.velocity_component);
        if f.abs_diff(v) < 3 {
            return Err(IbError::config(format!(
                "force block {f}..{} overlaps velocity block {v}..{}",
                f + 3,
                v + 3
            )));
        }
        Ok(())
    }

    /// Check that `field` holds both component blocks.
    pub fn check_field(&self, field: &EulerField) -> IbResult<()> {
        let needed = self.force_component.max(self.velocity_component) + 3;
        if field.n_comp() < needed {
            return Err(IbError::config(format!(
                "field has {} components, need at least {needed}",
                field.n_comp()
            )));
        }
        Ok(())
    }
}
