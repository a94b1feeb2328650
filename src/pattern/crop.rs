use crate::buffer::{Geometry, Mask};
use ndarray::{s, Array2};

/// Notch depths in band units, cycled along each edge
const NOTCH_DEPTHS: [usize; 7] = [1, 3, 2, 4, 1, 2, 3];

/// White stencil with ragged black notches cut into all four edges.
///
/// Edges are split into equal segments; each segment is cut to a depth taken
/// from a fixed cycle, with a different phase per edge so the four borders
/// do not mirror each other.
pub fn generate_crop_mask(geometry: Geometry) -> Mask {
    let _span = tracing::debug_span!("generate_crop_mask").entered();

    let Geometry { height, width } = geometry;
    let mut mask = Array2::ones((height, width));
    if geometry.is_empty() {
        return mask;
    }

    let short_side = height.min(width);
    let band = (short_side / 48).max(1);
    let segment = (short_side / 16).max(2);
    let depth = |index: usize, phase: usize| band * NOTCH_DEPTHS[(index + phase) % NOTCH_DEPTHS.len()];

    for (i, x0) in (0..width).step_by(segment).enumerate() {
        let x1 = (x0 + segment).min(width);
        let top = depth(i, 0).min(height);
        let bottom = depth(i, 3).min(height);

        mask.slice_mut(s![..top, x0..x1]).fill(0.0);
        mask.slice_mut(s![height - bottom.., x0..x1]).fill(0.0);
    }

    for (i, y0) in (0..height).step_by(segment).enumerate() {
        let y1 = (y0 + segment).min(height);
        let left = depth(i, 1).min(width);
        let right = depth(i, 5).min(width);

        mask.slice_mut(s![y0..y1, ..left]).fill(0.0);
        mask.slice_mut(s![y0..y1, width - right..]).fill(0.0);
    }

    mask
}
