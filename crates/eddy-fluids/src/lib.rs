pub use boundary::{Boundary, Component};
pub use error::FluidError;
pub use field::Field;
pub use scene::Scene;
pub use stable::{StableFluid2D, StableFluid2DParams};
pub use stats::{FluidStats, ACTIVE_DENSITY_THRESHOLD};

pub mod boundary;
pub mod error;
pub mod field;
pub mod scene;
pub mod stable;
pub mod stats;

pub trait Fluid<const D: usize> {
    /// Advances the simulation by one time step.
    fn step(&mut self) -> Result<(), FluidError>;

    /// Zeroes the simulation state, keeping its dimensions and coefficients.
    fn reset(&mut self);

    /// Simulated seconds covered by one call to [`Fluid::step`].
    fn delta_time(&self) -> f32;

    /// Size of the grid, in cells.
    fn grid_size(&self) -> [u32; D];
}
