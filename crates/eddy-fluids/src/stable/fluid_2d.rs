use glam::{UVec2, Vec2};
use ndarray::azip;
use tracing::{info, trace};

use crate::{
    boundary::{self, Boundary, Component},
    error::FluidError,
    field::Field,
    stats::FluidStats,
    Fluid,
};

use super::{advect::advect, diffuse::{diffuse, diffuse_velocity}, project::project};

/// Smallest grid that still has an interior cell.
pub const MIN_GRID_SIZE: u32 = 3;

#[derive(Debug, Clone)]
pub struct StableFluid2D {
    /// Size of the grid, in cells.
    grid_size: UVec2,

    /// Grid velocities in the X direction.
    velocity_x: Field,
    /// Grid velocities in the Y direction.
    velocity_y: Field,
    /// Previous grid velocities in the X direction. Scratch space for a single step.
    velocity_prev_x: Field,
    /// Previous grid velocities in the Y direction. Scratch space for a single step.
    velocity_prev_y: Field,
    /// Dye density carried by the flow.
    density: Field,
    /// Previous density. Scratch space for a single step.
    density_prev: Field,
    /// Pressure solved during projection.
    pressure: Field,
    /// Velocity divergence computed during projection.
    divergence: Field,

    params: StableFluid2DParams,
}

impl StableFluid2D {
    /// Allocates a zeroed fluid of `width * height` cells.
    ///
    /// Fails if either dimension is below [`MIN_GRID_SIZE`] or any buffer cannot be allocated.
    /// Buffers that were already allocated are released before the error is returned.
    pub fn new(width: u32, height: u32, params: StableFluid2DParams) -> Result<Self, FluidError> {
        if width < MIN_GRID_SIZE || height < MIN_GRID_SIZE {
            return Err(FluidError::InvalidDimensions { width, height });
        }

        let fluid = Self {
            grid_size: UVec2::new(width, height),
            velocity_x: Field::new(width, height)?,
            velocity_y: Field::new(width, height)?,
            velocity_prev_x: Field::new(width, height)?,
            velocity_prev_y: Field::new(width, height)?,
            density: Field::new(width, height)?,
            density_prev: Field::new(width, height)?,
            pressure: Field::new(width, height)?,
            divergence: Field::new(width, height)?,
            params,
        };

        info!(
            width,
            height,
            delta_time = params.delta_time,
            viscosity = params.viscosity,
            diffusion_rate = params.diffusion_rate,
            relaxation_iters = params.relaxation_iters,
            "created stable fluid"
        );

        Ok(fluid)
    }

    pub fn size(&self) -> UVec2 {
        self.grid_size
    }

    pub fn params(&self) -> &StableFluid2DParams {
        &self.params
    }

    /// Replaces the simulation coefficients. The grid keeps its dimensions and contents.
    pub fn set_params(&mut self, params: StableFluid2DParams) {
        self.params = params;
    }

    /// Adds `amount` of density at a cell. Does nothing outside the grid.
    pub fn add_density(&mut self, x: i32, y: i32, amount: f32) {
        self.density.add(x, y, amount);
    }

    /// Adds a velocity impulse at a cell. Does nothing outside the grid.
    pub fn add_velocity(&mut self, x: i32, y: i32, dx: f32, dy: f32) {
        self.velocity_x.add(x, y, dx);
        self.velocity_y.add(x, y, dy);
    }

    pub fn sample_density(&self, x: i32, y: i32) -> f32 {
        self.density.get(x, y)
    }

    pub fn sample_velocity(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(self.velocity_x.get(x, y), self.velocity_y.get(x, y))
    }

    pub fn density(&self) -> &Field {
        &self.density
    }

    pub fn velocity_x(&self) -> &Field {
        &self.velocity_x
    }

    pub fn velocity_y(&self) -> &Field {
        &self.velocity_y
    }

    /// Summarizes the current state. Cells with density above `threshold` count as active.
    pub fn stats(&self, threshold: f32) -> FluidStats {
        FluidStats::collect(
            &self.density,
            &self.density_prev,
            &self.velocity_x,
            &self.velocity_y,
            threshold,
        )
    }

    fn fields_mut(&mut self) -> [&mut Field; 8] {
        [
            &mut self.velocity_x,
            &mut self.velocity_y,
            &mut self.velocity_prev_x,
            &mut self.velocity_prev_y,
            &mut self.density,
            &mut self.density_prev,
            &mut self.pressure,
            &mut self.divergence,
        ]
    }

    fn enforce_boundaries(&mut self) -> Result<(), FluidError> {
        boundary::apply_velocity(&mut self.velocity_x, &mut self.velocity_y)?;
        boundary::apply_scalar(&mut self.density);
        Ok(())
    }

    fn store_velocity(&mut self) -> Result<(), FluidError> {
        self.velocity_prev_x.copy_from(&self.velocity_x)?;
        self.velocity_prev_y.copy_from(&self.velocity_y)
    }

    fn diffuse_velocity(&mut self) -> Result<(), FluidError> {
        diffuse_velocity(
            &mut self.velocity_x,
            &self.velocity_prev_x,
            &mut self.velocity_y,
            &self.velocity_prev_y,
            self.params.viscosity,
            self.params.delta_time,
            self.params.relaxation_iters,
        )
    }

    fn project(&mut self) -> Result<(), FluidError> {
        project(
            &mut self.velocity_x,
            &mut self.velocity_y,
            &mut self.pressure,
            &mut self.divergence,
            self.params.relaxation_iters,
        )
    }

    fn advect_velocity(&mut self) -> Result<(), FluidError> {
        let dt = self.params.delta_time;

        advect(
            &mut self.velocity_x,
            &self.velocity_prev_x,
            &self.velocity_prev_x,
            &self.velocity_prev_y,
            dt,
            Boundary::Velocity(Component::X),
        )?;

        advect(
            &mut self.velocity_y,
            &self.velocity_prev_y,
            &self.velocity_prev_x,
            &self.velocity_prev_y,
            dt,
            Boundary::Velocity(Component::Y),
        )
    }

    /// Accelerates every cell holding more than `gravity_threshold` density.
    fn apply_gravity(&mut self) -> Result<(), FluidError> {
        let dv = self.params.gravity * self.params.delta_time;
        let threshold = self.params.gravity_threshold;

        if dv != Vec2::ZERO {
            azip!((
                u in self.velocity_x.data_mut(),
                v in self.velocity_y.data_mut(),
                &d in self.density.data()
            ) {
                if d > threshold {
                    *u += dv.x;
                    *v += dv.y;
                }
            });
        }

        boundary::apply_velocity(&mut self.velocity_x, &mut self.velocity_y)
    }

    fn diffuse_density(&mut self) -> Result<(), FluidError> {
        self.density_prev.copy_from(&self.density)?;

        diffuse(
            &mut self.density,
            &self.density_prev,
            self.params.diffusion_rate,
            self.params.delta_time,
            self.params.relaxation_iters,
            Boundary::Scalar,
        )
    }

    fn advect_density(&mut self) -> Result<(), FluidError> {
        self.density_prev.copy_from(&self.density)?;

        advect(
            &mut self.density,
            &self.density_prev,
            &self.velocity_x,
            &self.velocity_y,
            self.params.delta_time,
            Boundary::Scalar,
        )
    }
}

impl Fluid<2> for StableFluid2D {
    fn delta_time(&self) -> f32 {
        self.params.delta_time
    }

    fn grid_size(&self) -> [u32; 2] {
        self.grid_size.into()
    }

    /// Advances the simulation by one `delta_time`.
    fn step(&mut self) -> Result<(), FluidError> {
        self.store_velocity()?;
        self.diffuse_velocity()?;
        self.enforce_boundaries()?;
        self.project()?;

        self.store_velocity()?;
        self.advect_velocity()?;
        self.enforce_boundaries()?;

        self.apply_gravity()?;
        self.enforce_boundaries()?;
        self.project()?;

        self.diffuse_density()?;
        self.enforce_boundaries()?;

        self.advect_density()?;
        self.enforce_boundaries()?;

        trace!(total_density = self.density.sum(), "stepped stable fluid");

        Ok(())
    }

    /// Zeroes every field without reallocating. Coefficients are kept.
    fn reset(&mut self) {
        for field in self.fields_mut() {
            field.clear();
        }

        info!("reset stable fluid");
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableFluid2DParams {
    /// Simulated seconds per step.
    pub delta_time: f32,
    /// Diffusion coefficient of the velocity field.
    pub viscosity: f32,
    /// Diffusion coefficient of the density field.
    pub diffusion_rate: f32,
    /// Gauss-Seidel passes for both diffusion and the pressure solve. A fixed budget, there is
    /// no convergence test.
    pub relaxation_iters: usize,
    /// Velocity gained per second by cells holding fluid. `+y` points down the grid rows.
    pub gravity: Vec2,
    /// Gravity only acts on cells whose density exceeds this.
    pub gravity_threshold: f32,
}

impl Default for StableFluid2DParams {
    fn default() -> Self {
        Self {
            delta_time: 0.016,
            viscosity: 0.01,
            diffusion_rate: 0.001,
            relaxation_iters: 40,
            gravity: Vec2::new(0.0, 0.001),
            gravity_threshold: 0.001,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn fluid(width: u32, height: u32) -> StableFluid2D {
        StableFluid2D::new(width, height, StableFluid2DParams::default()).unwrap()
    }

    fn all_fields(fluid: &StableFluid2D) -> [&Field; 8] {
        [
            &fluid.velocity_x,
            &fluid.velocity_y,
            &fluid.velocity_prev_x,
            &fluid.velocity_prev_y,
            &fluid.density,
            &fluid.density_prev,
            &fluid.pressure,
            &fluid.divergence,
        ]
    }

    #[test]
    fn rejects_grids_without_interior() {
        let params = StableFluid2DParams::default();
        assert_eq!(
            StableFluid2D::new(2, 10, params).unwrap_err(),
            FluidError::InvalidDimensions { width: 2, height: 10 }
        );
        assert!(StableFluid2D::new(10, 0, params).is_err());
        assert!(StableFluid2D::new(3, 3, params).is_ok());
    }

    #[test]
    fn all_fields_share_the_grid_size() {
        let fluid = fluid(12, 7);
        for field in all_fields(&fluid) {
            assert_eq!(field.size(), UVec2::new(12, 7));
            assert!(field.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn stepping_an_empty_fluid_keeps_every_field_zero() {
        let mut fluid = fluid(9, 7);
        for _ in 0..5 {
            fluid.step().unwrap();
        }

        for field in all_fields(&fluid) {
            assert!(field.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn impulses_accumulate() {
        let mut fluid = fluid(10, 10);
        fluid.add_density(5, 5, 100.0);
        fluid.add_velocity(3, 3, 10.0, 20.0);
        fluid.add_velocity(3, 3, 1.0, -5.0);

        assert_eq!(fluid.sample_density(5, 5), 100.0);
        assert_eq!(fluid.sample_velocity(3, 3), Vec2::new(11.0, 15.0));
    }

    #[test]
    fn impulses_outside_the_grid_are_ignored() {
        let mut fluid = fluid(6, 6);
        fluid.add_density(-1, 2, 5.0);
        fluid.add_velocity(6, 0, 1.0, 1.0);

        assert!(all_fields(&fluid).iter().all(|f| f.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn gravity_only_acts_on_dense_cells() {
        let mut fluid = fluid(8, 8);
        fluid.add_density(3, 3, 1.0);
        fluid.apply_gravity().unwrap();

        let dv = fluid.params.gravity.y * fluid.params.delta_time;
        assert_relative_eq!(fluid.velocity_y.get(3, 3), dv);
        assert_eq!(fluid.velocity_y.get(5, 5), 0.0);
        assert_eq!(fluid.velocity_x.get(3, 3), 0.0);
    }

    #[test]
    fn disabled_gravity_leaves_velocity_alone() {
        let params = StableFluid2DParams {
            gravity: Vec2::ZERO,
            ..Default::default()
        };
        let mut fluid = StableFluid2D::new(8, 8, params).unwrap();
        fluid.add_density(3, 3, 1.0);
        fluid.apply_gravity().unwrap();

        assert_eq!(fluid.velocity_y.sum(), 0.0);
    }

    #[test]
    fn reset_clears_every_field() {
        let mut fluid = fluid(10, 10);
        fluid.add_density(5, 5, 100.0);
        fluid.add_velocity(3, 3, 10.0, 20.0);
        fluid.step().unwrap();
        fluid.reset();

        for field in all_fields(&fluid) {
            assert!(field.iter().all(|&v| v == 0.0));
        }
        assert_eq!(fluid.params(), &StableFluid2DParams::default());
        assert_eq!(fluid.size(), UVec2::new(10, 10));
    }

    #[test]
    fn step_moves_density_with_the_flow() {
        let params = StableFluid2DParams {
            gravity: Vec2::ZERO,
            ..Default::default()
        };
        let mut fluid = StableFluid2D::new(20, 20, params).unwrap();
        for _ in 0..5 {
            fluid.add_density(5, 10, 10.0);
            fluid.add_velocity(5, 10, 200.0, 0.0);
            fluid.step().unwrap();
        }

        let right: f32 = (6..10).map(|x| fluid.sample_density(x, 10)).sum();
        let left: f32 = (1..5).map(|x| fluid.sample_density(x, 10)).sum();
        assert!(right > left, "right {right} left {left}");
    }

    #[test]
    fn set_params_keeps_contents() {
        let mut fluid = fluid(6, 6);
        fluid.add_density(2, 2, 4.0);
        fluid.set_params(StableFluid2DParams {
            viscosity: 0.5,
            ..Default::default()
        });

        assert_eq!(fluid.params().viscosity, 0.5);
        assert_eq!(fluid.sample_density(2, 2), 4.0);
    }
}
