use glam::{UVec2, Vec2};
use ndarray::Array2;

use crate::error::FluidError;

/// A dense 2D grid of `f32` samples stored row-major.
///
/// Reads outside the grid never fail: they are reflected back across the nearest edge and
/// clamped, so stencils near the border need no bounds branches. Writes outside the grid are
/// dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Samples indexed by `(y, x)`.
    data: Array2<f32>,
    width: u32,
    height: u32,
}

impl Field {
    /// Creates a zeroed field of `width * height` samples. Both dimensions must fit in an `i32`,
    /// the coordinate type used for reads and writes.
    pub fn new(width: u32, height: u32) -> Result<Self, FluidError> {
        let max = i32::MAX as u32;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(FluidError::InvalidDimensions { width, height });
        }

        let cells = (width as usize)
            .checked_mul(height as usize)
            .ok_or(FluidError::InvalidDimensions { width, height })?;

        let mut samples = Vec::new();
        samples
            .try_reserve_exact(cells)
            .map_err(|_| FluidError::Allocation { cells })?;
        samples.resize(cells, 0.0);

        let data = Array2::from_shape_vec((height as usize, width as usize), samples)
            .map_err(|_| FluidError::InvalidDimensions { width, height })?;

        Ok(Self { data, width, height })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// The raw samples, indexed by `(y, x)`.
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array2<f32> {
        &mut self.data
    }

    /// All samples in row-major order. Fields are always stored contiguously, so this is only
    /// empty for a field that owns no samples.
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().unwrap_or_default()
    }

    /// Iterates over all samples in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Returns the sample at `(x, y)`, reflecting out-of-range coordinates back into the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        let x = reflect(x, self.width as i32);
        let y = reflect(y, self.height as i32);
        self.data[(y as usize, x as usize)]
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: f32) {
        if self.contains(x, y) {
            self.data[(y as usize, x as usize)] = value;
        }
    }

    #[inline]
    pub fn add(&mut self, x: i32, y: i32, amount: f32) {
        if self.contains(x, y) {
            self.data[(y as usize, x as usize)] += amount;
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Copies every sample of `other` into `self`. Fails without writing anything when the
    /// shapes differ.
    pub fn copy_from(&mut self, other: &Field) -> Result<(), FluidError> {
        ensure_same_size(self, other)?;
        self.data.assign(&other.data);
        Ok(())
    }

    /// Bilinearly interpolates the four samples surrounding `p`.
    ///
    /// Neighbours one past the last row or column resolve through [`Field::get`]. Positions
    /// outside `[0, width) x [0, height)` sample as `0.0`; callers are expected to clamp first.
    pub fn sample_bilinear(&self, p: Vec2) -> f32 {
        let in_range = p.x >= 0.0
            && p.y >= 0.0
            && p.x < self.width as f32
            && p.y < self.height as f32;

        if !in_range {
            return 0.0;
        }

        let x0 = p.x as i32;
        let y0 = p.y as i32;
        let x1 = x0 + 1;
        let y1 = y0 + 1;

        let tx = p.x - x0 as f32;
        let ty = p.y - y0 as f32;

        let top = self.get(x0, y0) * (1.0 - tx) + self.get(x1, y0) * tx;
        let bottom = self.get(x0, y1) * (1.0 - tx) + self.get(x1, y1) * tx;

        top * (1.0 - ty) + bottom * ty
    }

    /// Five-point Laplacian: the sum of the four orthogonal neighbours minus four times the
    /// center.
    #[inline]
    pub fn laplacian(&self, x: i32, y: i32) -> f32 {
        self.neighbor_sum(x, y) - 4.0 * self.get(x, y)
    }

    #[inline]
    pub(crate) fn neighbor_sum(&self, x: i32, y: i32) -> f32 {
        self.get(x - 1, y) + self.get(x + 1, y) + self.get(x, y - 1) + self.get(x, y + 1)
    }

    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn abs_sum(&self) -> f32 {
        self.data.iter().map(|v| v.abs()).sum()
    }
}

#[inline]
fn reflect(c: i32, n: i32) -> i32 {
    let mut c = c.saturating_abs();
    if c >= n {
        c = (n - 1) - (c - (n - 1));
    }
    c.clamp(0, n - 1)
}

pub(crate) fn ensure_same_size(a: &Field, b: &Field) -> Result<(), FluidError> {
    if a.size() == b.size() {
        Ok(())
    } else {
        Err(FluidError::DimensionMismatch {
            expected: a.size(),
            found: b.size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn new_field_is_zeroed() {
        let field = Field::new(7, 4).unwrap();
        assert_eq!(field.size(), UVec2::new(7, 4));
        assert_eq!(field.iter().count(), 28);
        assert!(field.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_sized_field_is_rejected() {
        assert_eq!(
            Field::new(0, 5),
            Err(FluidError::InvalidDimensions { width: 0, height: 5 })
        );
    }

    #[test]
    fn dimensions_beyond_i32_are_rejected() {
        let too_wide = i32::MAX as u32 + 1;
        assert_eq!(
            Field::new(too_wide, 1),
            Err(FluidError::InvalidDimensions { width: too_wide, height: 1 })
        );
        assert!(Field::new(1, u32::MAX).is_err());
    }

    #[test]
    fn samples_are_row_major() {
        let mut field = Field::new(3, 2).unwrap();
        field.set(2, 0, 1.0);
        field.set(0, 1, 2.0);

        let flat: Vec<f32> = field.iter().copied().collect();
        assert_eq!(flat, vec![0.0, 0.0, 1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn set_and_get() {
        let mut field = Field::new(5, 5).unwrap();
        field.set(2, 2, 42.0);
        assert_eq!(field.get(2, 2), 42.0);
    }

    #[test]
    fn out_of_range_reads_reflect() {
        let mut field = Field::new(5, 5).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                field.set(x, y, (10 * y + x) as f32);
            }
        }

        assert_eq!(field.get(-1, 0), field.get(1, 0));
        assert_eq!(field.get(5, 2), field.get(3, 2));
        assert_eq!(field.get(2, -2), field.get(2, 2));
        assert_eq!(field.get(2, 6), field.get(2, 2));
        assert_eq!(field.get(100, -100), field.get(0, 0));
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let mut field = Field::new(4, 4).unwrap();
        field.set(1, 1, 3.0);
        let before = field.clone();

        field.set(-1, 0, 9.0);
        field.set(4, 0, 9.0);
        field.add(0, 4, 9.0);
        field.add(0, -7, 9.0);

        assert_eq!(field, before);
    }

    #[test]
    fn add_accumulates() {
        let mut field = Field::new(5, 5).unwrap();
        field.add(1, 1, 5.0);
        field.add(1, 1, 3.0);
        assert_eq!(field.get(1, 1), 8.0);
    }

    #[test]
    fn clear_zeroes_every_sample() {
        let mut field = Field::new(5, 5).unwrap();
        field.set(2, 2, 42.0);
        field.clear();
        assert_eq!(field.get(2, 2), 0.0);
        assert_eq!(field.sum(), 0.0);
    }

    #[test]
    fn copy_from_requires_matching_shape() {
        let mut dest = Field::new(4, 4).unwrap();
        let mut src = Field::new(4, 4).unwrap();
        src.set(3, 1, 2.5);

        dest.copy_from(&src).unwrap();
        assert_eq!(dest, src);

        let other = Field::new(4, 5).unwrap();
        let err = dest.copy_from(&other).unwrap_err();
        assert_eq!(
            err,
            FluidError::DimensionMismatch {
                expected: UVec2::new(4, 4),
                found: UVec2::new(4, 5),
            }
        );
        assert_eq!(dest.get(3, 1), 2.5);
    }

    #[test]
    fn bilinear_sampling_interpolates_between_cells() {
        let mut field = Field::new(4, 4).unwrap();
        field.set(1, 1, 1.0);
        field.set(2, 1, 3.0);
        field.set(1, 2, 5.0);
        field.set(2, 2, 7.0);

        assert_relative_eq!(field.sample_bilinear(Vec2::new(1.0, 1.0)), 1.0);
        assert_relative_eq!(field.sample_bilinear(Vec2::new(1.5, 1.0)), 2.0);
        assert_relative_eq!(field.sample_bilinear(Vec2::new(1.0, 1.5)), 3.0);
        assert_relative_eq!(field.sample_bilinear(Vec2::new(1.5, 1.5)), 4.0);
        assert_relative_eq!(field.sample_bilinear(Vec2::new(1.25, 1.75)), 4.5);
    }

    #[test]
    fn bilinear_sampling_outside_grid_is_zero() {
        let mut field = Field::new(3, 3).unwrap();
        field.data_mut().fill(1.0);

        assert_eq!(field.sample_bilinear(Vec2::new(-0.1, 1.0)), 0.0);
        assert_eq!(field.sample_bilinear(Vec2::new(1.0, 3.0)), 0.0);
        assert_eq!(field.sample_bilinear(Vec2::new(f32::NAN, 1.0)), 0.0);
    }

    #[test]
    fn bilinear_sampling_at_last_column_reflects_neighbor() {
        let mut field = Field::new(3, 3).unwrap();
        field.set(1, 0, 2.0);
        field.set(2, 0, 4.0);

        // The neighbour at x = 3 reflects to x = 1.
        assert_relative_eq!(field.sample_bilinear(Vec2::new(2.5, 0.0)), 3.0);
    }

    #[test]
    fn laplacian_of_single_spike() {
        let mut field = Field::new(5, 5).unwrap();
        field.set(2, 2, 1.0);

        assert_relative_eq!(field.laplacian(2, 2), -4.0);
        assert_relative_eq!(field.laplacian(1, 2), 1.0);
        assert_relative_eq!(field.laplacian(1, 1), 0.0);
    }

    #[test]
    fn reductions() {
        let mut field = Field::new(3, 3).unwrap();
        field.set(0, 0, -2.0);
        field.set(1, 1, 5.0);

        assert_relative_eq!(field.sum(), 3.0);
        assert_relative_eq!(field.max(), 5.0);
        assert_relative_eq!(field.abs_sum(), 7.0);
    }
}
