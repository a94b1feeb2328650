//! Deterministic model doubles for exercising the pipeline without ONNX.

use super::types::{OutputStride, SegmentationModel};
use crate::buffer::{Geometry, Mask};
use anyhow::{anyhow, Result};
use image::RgbImage;
use ndarray::Array2;

/// Returns the same score everywhere
pub struct ConstantModel {
    pub geometry: Geometry,
    pub score: f32,
}

impl SegmentationModel for ConstantModel {
    fn predict(&mut self, _input: &RgbImage, stride: OutputStride) -> Result<Mask> {
        let scores = stride.score_geometry(self.geometry);
        Ok(Array2::from_elem((scores.height, scores.width), self.score))
    }

    fn input_geometry(&self) -> Geometry {
        self.geometry
    }
}

/// Fails every inference, like a lost device
pub struct FailingModel {
    pub geometry: Geometry,
}

impl SegmentationModel for FailingModel {
    fn predict(&mut self, _input: &RgbImage, _stride: OutputStride) -> Result<Mask> {
        Err(anyhow!("device lost"))
    }

    fn input_geometry(&self) -> Geometry {
        self.geometry
    }
}
