//! Grid-based "stable fluids" solver: semi-Lagrangian advection, implicit diffusion and
//! pressure projection on a single collocated grid.

pub mod advect;
pub mod diffuse;
pub mod fluid_2d;
pub mod project;

pub use advect::advect;
pub use diffuse::{diffuse, diffuse_velocity};
pub use fluid_2d::{StableFluid2D, StableFluid2DParams};
pub use project::project;
