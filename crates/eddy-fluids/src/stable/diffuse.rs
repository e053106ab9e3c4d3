use crate::{
    boundary::{self, Boundary},
    error::FluidError,
    field::{ensure_same_size, Field},
};

/// Implicit diffusion of `src` into `dest`, solving `dest = src + coeff * dt * ∇²dest` with a
/// fixed number of in-place Gauss-Seidel passes.
///
/// `dest` starts as a copy of `src`; a non-positive coefficient leaves it there. `boundary` is
/// reapplied after every pass so each sweep reads consistent edge values.
pub fn diffuse(
    dest: &mut Field,
    src: &Field,
    coeff: f32,
    dt: f32,
    iterations: usize,
    boundary: Boundary,
) -> Result<(), FluidError> {
    dest.copy_from(src)?;

    if coeff <= 0.0 {
        return Ok(());
    }

    let a = coeff * dt;
    let denom = 1.0 + 4.0 * a;

    for _iter in 0..iterations {
        relax(dest, src, a, denom);
        boundary.apply(dest);
    }

    Ok(())
}

/// Diffuses both velocity components with a shared viscosity, correcting the velocity walls
/// after every pass.
pub fn diffuse_velocity(
    u: &mut Field,
    u_src: &Field,
    v: &mut Field,
    v_src: &Field,
    viscosity: f32,
    dt: f32,
    iterations: usize,
) -> Result<(), FluidError> {
    ensure_same_size(u, u_src)?;
    ensure_same_size(u, v)?;
    ensure_same_size(u, v_src)?;

    u.copy_from(u_src)?;
    v.copy_from(v_src)?;

    if viscosity <= 0.0 {
        return Ok(());
    }

    let a = viscosity * dt;
    let denom = 1.0 + 4.0 * a;

    for _iter in 0..iterations {
        relax(u, u_src, a, denom);
        relax(v, v_src, a, denom);
        boundary::apply_velocity(u, v)?;
    }

    Ok(())
}

/// One Gauss-Seidel sweep over the interior cells.
fn relax(dest: &mut Field, src: &Field, a: f32, denom: f32) {
    let w = dest.width() as i32;
    let h = dest.height() as i32;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let value = (src.get(x, y) + a * dest.neighbor_sum(x, y)) / denom;
            dest.set(x, y, value);
        }
    }
}
