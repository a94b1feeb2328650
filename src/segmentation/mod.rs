mod adapter;
mod onnx;
mod preprocess;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

pub use adapter::{apply_threshold, scores_to_mask, segment};
pub use onnx::{squeeze_scores, OnnxSegmenter};
pub use preprocess::Preprocessor;
pub use types::{OutputStride, SegmentationModel};

use crate::buffer::Geometry;
use anyhow::Result;

/// Create the default segmentation model (ONNX)
pub fn create_default_model(
    model_path: &str,
    geometry: Geometry,
    stride: OutputStride,
) -> Result<Box<dyn SegmentationModel>> {
    let model = OnnxSegmenter::new(model_path, geometry, stride)?;
    Ok(Box::new(model))
}
