use crate::{error::FluidError, Fluid};

/// Owns a fluid and keeps track of how far it has been advanced.
pub struct Scene<const D: usize, F> {
    /// The fluid for this scene.
    pub fluid: F,
    /// Number of completed steps.
    frame: u64,
    /// Simulated seconds covered by the completed steps.
    elapsed: f32,
}

impl<const D: usize, F: Fluid<D>> Scene<D, F> {
    #[inline(always)]
    pub fn new(fluid: F) -> Self {
        Self {
            fluid,
            frame: 0,
            elapsed: 0.0,
        }
    }

    #[inline(always)]
    pub fn size(&self) -> [u32; D] {
        self.fluid.grid_size()
    }

    #[inline(always)]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline(always)]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Steps the fluid once. The frame counter only advances when the step succeeds.
    pub fn step(&mut self) -> Result<(), FluidError> {
        self.fluid.step()?;

        self.frame += 1;
        self.elapsed += self.fluid.delta_time();

        Ok(())
    }

    pub fn reset(&mut self) {
        self.fluid.reset();
        self.frame = 0;
        self.elapsed = 0.0;
    }
}
