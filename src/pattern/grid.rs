use crate::buffer::{Geometry, Mask};
use ndarray::Array2;

/// Unit-intensity grid lines on a black background.
///
/// `floor(extent / spacing)` lines are drawn per axis, at offsets
/// `0, spacing, 2 * spacing, ...`. A trailing partial cell gets no line, so
/// every line starts a full cell.
pub fn generate_grid(geometry: Geometry, spacing: u32) -> Mask {
    let _span = tracing::debug_span!("generate_grid").entered();

    let spacing = spacing.max(1) as usize;
    let mut grid = Array2::zeros((geometry.height, geometry.width));

    for col in 0..geometry.width / spacing {
        grid.column_mut(col * spacing).fill(1.0);
    }

    for row in 0..geometry.height / spacing {
        grid.row_mut(row * spacing).fill(1.0);
    }

    grid
}
