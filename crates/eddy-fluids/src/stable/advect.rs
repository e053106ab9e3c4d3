use glam::Vec2;

use crate::{boundary::Boundary, error::FluidError, field::{ensure_same_size, Field}};

/// Margin kept between a back-traced position and the last sample so bilinear lookups stay
/// inside the grid.
pub const TRACE_EPSILON: f32 = 0.001;

/// Semi-Lagrangian transport of `src` into `dest` along the velocity field `(u, v)`.
///
/// Every cell of `dest` is traced backwards by `dt` through the velocity sampled at that cell,
/// the trace is clamped to `[0, size - 1 - TRACE_EPSILON]` and `src` is bilinearly resampled
/// there. `dest` is fully overwritten, then `boundary` is applied to it.
pub fn advect(
    dest: &mut Field,
    src: &Field,
    u: &Field,
    v: &Field,
    dt: f32,
    boundary: Boundary,
) -> Result<(), FluidError> {
    ensure_same_size(dest, src)?;
    ensure_same_size(dest, u)?;
    ensure_same_size(dest, v)?;

    dest.clear();

    let max = dest.size().as_vec2() - (1.0 + TRACE_EPSILON);

    for y in 0..dest.height() as i32 {
        for x in 0..dest.width() as i32 {
            let vel = Vec2::new(u.get(x, y), v.get(x, y));
            let prev = (Vec2::new(x as f32, y as f32) - dt * vel).max(Vec2::ZERO).min(max);

            dest.set(x, y, src.sample_bilinear(prev));
        }
    }

    boundary.apply(dest);

    Ok(())
}
