use crate::{
    boundary,
    error::FluidError,
    field::{ensure_same_size, Field},
};

/// Removes the divergent part of the velocity field `(u, v)`.
///
/// Computes the central-difference divergence into `divergence`, solves `∇²p = divergence` for
/// `pressure` with `iterations` Gauss-Seidel passes starting from zero, then subtracts `∇p` from
/// the velocity. Scalar edges are reapplied after the divergence and after every pressure pass;
/// velocity walls are reapplied to the corrected field.
pub fn project(
    u: &mut Field,
    v: &mut Field,
    pressure: &mut Field,
    divergence: &mut Field,
    iterations: usize,
) -> Result<(), FluidError> {
    ensure_same_size(u, v)?;
    ensure_same_size(u, pressure)?;
    ensure_same_size(u, divergence)?;

    let w = u.width() as i32;
    let h = u.height() as i32;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            divergence.set(x, y, central_divergence(u, v, x, y));
        }
    }
    boundary::apply_scalar(divergence);

    pressure.clear();

    for _iter in 0..iterations {
        relax_pressure(pressure, divergence);
        boundary::apply_scalar(pressure);
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let grad_x = 0.5 * (pressure.get(x + 1, y) - pressure.get(x - 1, y));
            let grad_y = 0.5 * (pressure.get(x, y + 1) - pressure.get(x, y - 1));

            u.set(x, y, u.get(x, y) - grad_x);
            v.set(x, y, v.get(x, y) - grad_y);
        }
    }
    boundary::apply_velocity(u, v)?;

    Ok(())
}

#[inline]
fn central_divergence(u: &Field, v: &Field, x: i32, y: i32) -> f32 {
    0.5 * ((u.get(x + 1, y) - u.get(x - 1, y)) + (v.get(x, y + 1) - v.get(x, y - 1)))
}

/// One Gauss-Seidel sweep of `∇²p = divergence` over the interior cells.
fn relax_pressure(pressure: &mut Field, divergence: &Field) {
    let w = pressure.width() as i32;
    let h = pressure.height() as i32;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let p = (pressure.neighbor_sum(x, y) - divergence.get(x, y)) / 4.0;
            pressure.set(x, y, p);
        }
    }
}
