use super::preprocess::Preprocessor;
use super::types::{OutputStride, SegmentationModel};
use crate::buffer::{Geometry, Mask};
use crate::error::SegmentationError;
use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;

/// Person segmentation backed by an ONNX export of a MobileNet body
/// segmentation network.
///
/// The export has a fixed input geometry and a single output stride baked
/// in. Its first output holds per-pixel foreground logits.
pub struct OnnxSegmenter {
    session: Session,
    geometry: Geometry,
    stride: OutputStride,
}

impl OnnxSegmenter {
    /// Create a new segmenter from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `geometry` - Input (height, width) the model was exported with
    /// * `stride` - Output stride the model was exported with
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        geometry: Geometry,
        stride: OutputStride,
    ) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading segmentation model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!(
            "Segmentation model loaded: input {}, output stride {}",
            geometry,
            stride
        );

        Ok(Self {
            session,
            geometry,
            stride,
        })
    }
}

impl SegmentationModel for OnnxSegmenter {
    fn predict(&mut self, input: &RgbImage, stride: OutputStride) -> Result<Mask> {
        if stride != self.stride {
            return Err(SegmentationError::UnsupportedStride {
                requested: stride.as_u32(),
                supported: self.stride.as_u32(),
            }
            .into());
        }

        let actual = Geometry::new(input.height() as usize, input.width() as usize);
        if actual != self.geometry {
            return Err(SegmentationError::InputGeometry {
                expected: self.geometry,
                actual,
            }
            .into());
        }

        let tensor = Preprocessor::to_input_tensor(input);
        let shape = [1usize, 3, self.geometry.height, self.geometry.width];
        let input_value = Tensor::from_array((shape, tensor.into_raw_vec()))?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .context("Failed to run inference")?;

        let (shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();

        let mut scores = squeeze_scores(&dims, logits)?;
        scores.mapv_inplace(sigmoid);
        Ok(scores)
    }

    fn input_geometry(&self) -> Geometry {
        self.geometry
    }
}

/// Reduce a single-channel score tensor to `[height, width]`.
///
/// Accepts `[H, W]`, `[1, H, W]`, NCHW `[1, 1, H, W]` and NHWC `[1, H, W, 1]`.
pub fn squeeze_scores(dims: &[usize], data: &[f32]) -> Result<Mask, SegmentationError> {
    let spatial = match *dims {
        [h, w] => (h, w),
        [1, h, w] => (h, w),
        [1, 1, h, w] => (h, w),
        [1, h, w, 1] => (h, w),
        _ => return Err(SegmentationError::ScoreShape(dims.to_vec())),
    };

    Array2::from_shape_vec(spatial, data.to_vec())
        .map_err(|_| SegmentationError::ScoreShape(dims.to_vec()))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
