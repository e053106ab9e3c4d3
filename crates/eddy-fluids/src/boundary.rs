use crate::{error::FluidError, field::{ensure_same_size, Field}};

/// Which edge rule to apply to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Border cells copy their interior neighbour (no flux through the wall).
    Scalar,
    /// One component of a velocity field. The wall-normal component is negated (no
    /// penetration) and the tangential component is copied (free slip).
    Velocity(Component),
}

/// The component of a velocity field a [`Field`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    X,
    Y,
}

impl Boundary {
    /// Overwrites the border of `field` from its interior neighbours. Corners become the
    /// average of their two edge neighbours.
    pub fn apply(self, field: &mut Field) {
        // Left/right walls are normal to x, top/bottom walls are normal to y.
        let (sign_columns, sign_rows) = match self {
            Boundary::Scalar => (1.0, 1.0),
            Boundary::Velocity(Component::X) => (-1.0, 1.0),
            Boundary::Velocity(Component::Y) => (1.0, -1.0),
        };

        apply_edges(field, sign_columns, sign_rows);
        average_corners(field);
    }
}

pub fn apply_scalar(field: &mut Field) {
    Boundary::Scalar.apply(field);
}

/// Applies solid-wall, free-slip edges to a velocity field given as its two components.
pub fn apply_velocity(u: &mut Field, v: &mut Field) -> Result<(), FluidError> {
    ensure_same_size(u, v)?;

    Boundary::Velocity(Component::X).apply(u);
    Boundary::Velocity(Component::Y).apply(v);

    Ok(())
}

fn apply_edges(field: &mut Field, sign_columns: f32, sign_rows: f32) {
    let w = field.width() as i32;
    let h = field.height() as i32;

    for x in 0..w {
        field.set(x, 0, sign_rows * field.get(x, 1));
        field.set(x, h - 1, sign_rows * field.get(x, h - 2));
    }

    for y in 0..h {
        field.set(0, y, sign_columns * field.get(1, y));
        field.set(w - 1, y, sign_columns * field.get(w - 2, y));
    }
}

fn average_corners(field: &mut Field) {
    let w = field.width() as i32;
    let h = field.height() as i32;

    field.set(0, 0, 0.5 * (field.get(1, 0) + field.get(0, 1)));
    field.set(w - 1, 0, 0.5 * (field.get(w - 2, 0) + field.get(w - 1, 1)));
    field.set(0, h - 1, 0.5 * (field.get(1, h - 1) + field.get(0, h - 2)));
    field.set(w - 1, h - 1, 0.5 * (field.get(w - 2, h - 1) + field.get(w - 1, h - 2)));
}
