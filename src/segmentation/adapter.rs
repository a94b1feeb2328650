use super::preprocess::Preprocessor;
use super::types::{OutputStride, SegmentationModel};
use crate::buffer::{resize_bilinear, strip_padding, Geometry, Mask, Padding};
use anyhow::{Context, Result};
use image::RgbImage;

/// Binary person mask for `frame` at `target` geometry.
///
/// The frame is letterboxed into the model's input, scored, and the scores
/// are mapped back through the same letterbox before thresholding. Model
/// failures propagate to the caller untouched.
pub fn segment<M>(
    model: &mut M,
    frame: &RgbImage,
    stride: OutputStride,
    target: Geometry,
    threshold: f32,
) -> Result<Mask>
where
    M: SegmentationModel + ?Sized,
{
    let _span = tracing::debug_span!("segment").entered();

    let input_geometry = model.input_geometry();
    let (padded, padding) = Preprocessor::new(input_geometry).resize_and_pad(frame);

    let _infer_span = tracing::debug_span!("inference").entered();
    let scores = model
        .predict(&padded, stride)
        .context("Segmentation model inference failed")?;
    drop(_infer_span);

    Ok(scores_to_mask(&scores, input_geometry, padding, target, threshold))
}

/// Map model scores back to caller geometry and threshold them
///
/// Steps:
/// 1. Upsample scores to the padded model input
/// 2. Strip the letterbox padding
/// 3. Resize the remaining region to `target`
/// 4. Scores at or above `threshold` become 1.0, the rest 0.0
pub fn scores_to_mask(
    scores: &Mask,
    input_geometry: Geometry,
    padding: Padding,
    target: Geometry,
    threshold: f32,
) -> Mask {
    let _span = tracing::debug_span!("postprocess").entered();

    let full = resize_bilinear(scores, input_geometry, true);
    let inner = strip_padding(full.view(), padding);
    let mut mask = resize_bilinear(&inner, target, true);

    apply_threshold(&mut mask, threshold);
    mask
}

/// Binarise in place; the boundary value counts as foreground
pub fn apply_threshold(mask: &mut Mask, threshold: f32) {
    mask.mapv_inplace(|v| if v >= threshold { 1.0 } else { 0.0 });
}
