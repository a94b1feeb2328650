//! Final frame assembly: light grid, glow and tint under the trail mask.

use crate::buffer::{pad_to_match, reconcile, Geometry, Mask, RgbBuffer};
use crate::config::Color;
use crate::pattern::Patterns;
use ndarray::{Axis, Zip};

/// Colour and stencil choices for one composite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeStyle {
    pub tint: Color,
    pub ambient: Color,
    pub crop_enabled: bool,
}

/// Composite `mask` over the grid patterns and centre the result in `viewport`.
///
/// Per pixel: `clip(grid * ambient + grid * mask * glow * tint, 0, 1)`, then
/// multiplied by the crop stencil when enabled. Patterns at another geometry
/// are resized to the mask first.
pub fn compose(mask: &Mask, patterns: &Patterns, style: &CompositeStyle, viewport: Geometry) -> RgbBuffer {
    let _span = tracing::debug_span!("compose").entered();

    let geometry = Geometry::of(mask);
    let grid = reconcile(Some(&patterns.grid), geometry);
    let glow = reconcile(Some(&patterns.glow), geometry);

    let tint = style.tint.channels();
    let ambient = style.ambient.channels();

    let mut frame = RgbBuffer::zeros((geometry.height, geometry.width, 3));
    Zip::from(frame.lanes_mut(Axis(2)))
        .and(&grid)
        .and(&glow)
        .and(mask)
        .for_each(|mut pixel, &grid, &glow, &mask| {
            let lit = grid * mask * glow;
            for (channel, value) in pixel.iter_mut().enumerate() {
                *value = (grid * ambient[channel] + lit * tint[channel]).clamp(0.0, 1.0);
            }
        });

    if style.crop_enabled {
        let crop = reconcile(Some(&patterns.crop), geometry);
        Zip::from(frame.lanes_mut(Axis(2)))
            .and(&crop)
            .for_each(|mut pixel, &stencil| pixel.mapv_inplace(|v| v * stencil));
    }

    let _pad_span = tracing::debug_span!("pad").entered();
    pad_to_match(frame, viewport)
}

/// Greyscale view of a mask, for inspecting the trail directly
pub fn mask_to_rgb(mask: &Mask, viewport: Geometry) -> RgbBuffer {
    let rgb = RgbBuffer::from_shape_fn((mask.nrows(), mask.ncols(), 3), |(y, x, _)| {
        mask[[y, x]].clamp(0.0, 1.0)
    });

    pad_to_match(rgb, viewport)
}
