use super::{resize_bilinear, Geometry, Mask};
use ndarray::{Array2, CowArray, Ix2};

/// Bring `buffer` to `target` geometry.
///
/// Absent history becomes zeros; a buffer already at `target` is borrowed
/// without copying; anything else is bilinearly resized into a new buffer.
pub fn reconcile(buffer: Option<&Mask>, target: Geometry) -> CowArray<'_, f32, Ix2> {
    match buffer {
        None => CowArray::from(Array2::zeros((target.height, target.width))),
        Some(buffer) if Geometry::of(buffer) == target => CowArray::from(buffer.view()),
        Some(buffer) => {
            tracing::debug!("Reconciling {} buffer to {}", Geometry::of(buffer), target);
            CowArray::from(resize_bilinear(buffer, target, false))
        }
    }
}
