//! Exponential feedback between the current mask and the previous frame's,
//! producing light trails that fade out over successive frames.

use crate::buffer::{reconcile, Geometry, Mask};
use ndarray::Zip;

/// Blend `current` with `previous`, weighting the new mask by `decay_rate`.
///
/// `1 - decay_rate` of the previous frame persists. Missing history counts
/// as zeros and history at another geometry is resized first. The result is
/// clipped to [0, 1].
pub fn blend(current: &Mask, previous: Option<&Mask>, decay_rate: f32) -> Mask {
    let _span = tracing::debug_span!("feedback").entered();

    let history = reconcile(previous, Geometry::of(current));
    let persistence = 1.0 - decay_rate;

    Zip::from(current)
        .and(&history)
        .map_collect(|&now, &before| (now * decay_rate + before * persistence).clamp(0.0, 1.0))
}
