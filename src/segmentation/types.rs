use crate::buffer::{Geometry, Mask};
use crate::error::ConfigError;
use anyhow::Result;
use image::RgbImage;
use std::fmt;
use std::str::FromStr;

/// Downsampling factor between the model input and its score map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStride {
    Eight,
    Sixteen,
    ThirtyTwo,
}

impl OutputStride {
    pub fn as_u32(self) -> u32 {
        match self {
            OutputStride::Eight => 8,
            OutputStride::Sixteen => 16,
            OutputStride::ThirtyTwo => 32,
        }
    }

    /// Score map geometry for a model input of `input` geometry
    pub fn score_geometry(self, input: Geometry) -> Geometry {
        let stride = self.as_u32() as usize;
        Geometry::new(
            input.height.saturating_sub(1) / stride + 1,
            input.width.saturating_sub(1) / stride + 1,
        )
    }
}

impl fmt::Display for OutputStride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

impl FromStr for OutputStride {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "8" => Ok(OutputStride::Eight),
            "16" => Ok(OutputStride::Sixteen),
            "32" => Ok(OutputStride::ThirtyTwo),
            other => Err(ConfigError::Stride(other.to_string())),
        }
    }
}

/// Trait for person segmentation models
/// Allows swapping between backends (ONNX, test doubles, ...)
pub trait SegmentationModel {
    /// Score a frame already letterboxed to `input_geometry()`
    ///
    /// # Returns
    /// * Foreground probabilities in [0, 1] at the stride's score resolution
    fn predict(&mut self, input: &RgbImage, stride: OutputStride) -> Result<Mask>;

    /// Fixed (height, width) the model accepts
    fn input_geometry(&self) -> Geometry;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_geometry_follows_stride() {
        let input = Geometry::new(353, 257);
        assert_eq!(OutputStride::Eight.score_geometry(input), Geometry::new(45, 33));
        assert_eq!(OutputStride::Sixteen.score_geometry(input), Geometry::new(23, 17));
        assert_eq!(OutputStride::ThirtyTwo.score_geometry(input), Geometry::new(12, 9));
    }

    #[test]
    fn stride_parses_from_cli_text() {
        assert_eq!("16".parse::<OutputStride>(), Ok(OutputStride::Sixteen));
        assert_eq!(
            "12".parse::<OutputStride>(),
            Err(ConfigError::Stride("12".to_string()))
        );
    }
}
