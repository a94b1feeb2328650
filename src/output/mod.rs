mod loopback;
mod png_dump;

pub use loopback::V4L2Output;
pub use png_dump::PngDumpOutput;

use crate::buffer::{Geometry, RgbBuffer};
use anyhow::Result;
use image::{Rgb, RgbImage};

/// Trait for output destinations
pub trait OutputSink {
    /// Present a finished frame, optionally mirrored left-to-right
    fn write_frame(&mut self, frame: &RgbBuffer, mirror: bool) -> Result<()>;

    /// Get the expected output geometry
    fn resolution(&self) -> Geometry;
}

/// Quantise a [0, 1] RGB buffer to 8-bit, mirroring columns if asked.
///
/// The mirror is a display-only flip of the whole finished frame, so the grid
/// and crop stencil flip along with the subject. Trail math upstream always
/// runs in camera coordinates.
pub fn buffer_to_image(buffer: &RgbBuffer, mirror: bool) -> RgbImage {
    let (height, width, _) = buffer.dim();

    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let y = y as usize;
        let x = if mirror {
            width - 1 - x as usize
        } else {
            x as usize
        };

        Rgb([
            to_u8(buffer[[y, x, 0]]),
            to_u8(buffer[[y, x, 1]]),
            to_u8(buffer[[y, x, 2]]),
        ])
    })
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantises_and_mirrors() {
        let mut buffer = RgbBuffer::zeros((1, 3, 3));
        buffer[[0, 0, 0]] = 1.0;
        buffer[[0, 2, 2]] = 0.5;

        let plain = buffer_to_image(&buffer, false);
        assert_eq!(plain.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(plain.get_pixel(2, 0), &Rgb([0, 0, 128]));

        let mirrored = buffer_to_image(&buffer, true);
        assert_eq!(mirrored.get_pixel(2, 0), &Rgb([255, 0, 0]));
        assert_eq!(mirrored.get_pixel(0, 0), &Rgb([0, 0, 128]));
    }
}
