use glam::IVec3;
use thiserror::Error;

/// Errors raised by the immersed-boundary engine
#[derive(Debug, Error)]
pub enum IbError {
    /// Inconsistent or out-of-range configuration / body input
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Geometry or time step that makes the transfer operators meaningless
    #[error("numerical degeneracy: {message}")]
    Degenerate { message: String },

    /// A marker's stencil reaches past the field's ghost region
    #[error(
        "marker {marker} of body {body} needs cell ({}, {}, {}) outside the field's ghost region",
        cell.x, cell.y, cell.z
    )]
    StencilOutOfBounds {
        body: usize,
        marker: usize,
        cell: IVec3,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl IbError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::Degenerate {
            message: message.into(),
        }
    }
}

pub type IbResult<T> = Result<T, IbError>;
