mod webcam;

pub use webcam::WebcamCapture;

use crate::buffer::Geometry;
use anyhow::Result;
use image::RgbImage;

/// Trait for camera capture sources
pub trait CaptureSource {
    /// Capture the most recent frame
    fn capture_frame(&mut self) -> Result<RgbImage>;

    /// Geometry of captured frames
    fn resolution(&self) -> Geometry;
}
