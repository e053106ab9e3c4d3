use crate::field::Field;

/// Density below this is treated as empty when counting active cells.
pub const ACTIVE_DENSITY_THRESHOLD: f32 = 0.01;

/// Whole-grid totals used for monitoring a running simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FluidStats {
    pub total_density: f32,
    pub max_density: f32,
    /// Number of cells whose density exceeds the threshold passed to [`FluidStats::collect`].
    pub active_cells: usize,
    /// Total of the density scratch buffer, i.e. the density before the last advection.
    pub total_density_prev: f32,
    pub velocity_x_abs_total: f32,
    pub velocity_y_abs_total: f32,
}

impl FluidStats {
    pub fn collect(
        density: &Field,
        density_prev: &Field,
        velocity_x: &Field,
        velocity_y: &Field,
        threshold: f32,
    ) -> Self {
        let mut total_density = 0.0;
        let mut max_density: f32 = 0.0;
        let mut active_cells = 0;

        for &d in density.iter() {
            total_density += d;
            max_density = max_density.max(d);
            if d > threshold {
                active_cells += 1;
            }
        }

        Self {
            total_density,
            max_density,
            active_cells,
            total_density_prev: density_prev.sum(),
            velocity_x_abs_total: velocity_x.abs_sum(),
            velocity_y_abs_total: velocity_y.abs_sum(),
        }
    }
}
