use glam::UVec2;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FluidError {
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("field dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: UVec2, found: UVec2 },
    #[error("failed to allocate a field of {cells} cells")]
    Allocation { cells: usize },
}
