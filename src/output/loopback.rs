use super::{buffer_to_image, OutputSink};
use crate::buffer::{Geometry, RgbBuffer};
use anyhow::{Context, Result};
use image::RgbImage;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use v4l::video::Output;
use v4l::{Device, Format, FourCC};

/// Presents frames on a v4l2loopback device as YUYV
pub struct V4L2Output {
    _device: Device,
    file: File,
    width: u32,
    height: u32,
}

impl V4L2Output {
    pub fn new<P: AsRef<Path>>(device_path: P, width: u32, height: u32) -> Result<Self> {
        let path = device_path.as_ref();
        tracing::info!(
            "Opening v4l2loopback device at {} ({}x{})",
            path.display(),
            width,
            height
        );

        let device = Device::with_path(path)
            .with_context(|| format!("Failed to open v4l2 device at {}", path.display()))?;

        let requested = Format::new(width, height, FourCC::new(b"YUYV"));
        let applied = Output::set_format(&device, &requested)
            .context("Failed to set v4l2loopback output format")?;
        if applied.width != width || applied.height != height {
            tracing::warn!(
                "v4l2loopback accepted {}x{} instead of {}x{}",
                applied.width,
                applied.height,
                width,
                height
            );
        }

        // v4l2loopback accepts raw frame data written to the device file
        let file = File::options()
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open v4l2loopback device at {}", path.display()))?;

        tracing::info!("v4l2loopback device opened successfully");

        Ok(Self {
            _device: device,
            file,
            width,
            height,
        })
    }
}

/// Pack RGB pixels into YUYV, sharing chroma between horizontal pairs
pub fn rgb_to_yuyv(image: &RgbImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut packed = Vec::with_capacity((width * height * 2) as usize);

    for row in image.rows() {
        let pixels: Vec<_> = row.collect();
        for pair in pixels.chunks(2) {
            let left = pair[0];
            let right = pair.get(1).copied().unwrap_or(left);

            let (y0, u0, v0) = rgb_to_yuv(left.0);
            let (y1, u1, v1) = rgb_to_yuv(right.0);

            packed.extend_from_slice(&[
                y0,
                ((u0 as u16 + u1 as u16) / 2) as u8,
                y1,
                ((v0 as u16 + v1 as u16) / 2) as u8,
            ]);
        }
    }

    packed
}

/// BT.601 RGB to YUV
fn rgb_to_yuv([r, g, b]: [u8; 3]) -> (u8, u8, u8) {
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = -0.147 * r - 0.289 * g + 0.436 * b + 128.0;
    let v = 0.615 * r - 0.515 * g - 0.100 * b + 128.0;

    (
        y.round().clamp(0.0, 255.0) as u8,
        u.round().clamp(0.0, 255.0) as u8,
        v.round().clamp(0.0, 255.0) as u8,
    )
}

impl OutputSink for V4L2Output {
    fn write_frame(&mut self, frame: &RgbBuffer, mirror: bool) -> Result<()> {
        let image = buffer_to_image(frame, mirror);

        // Padding already matched the viewport; only a device that refused
        // the requested format needs a resize here
        let image = if image.dimensions() != (self.width, self.height) {
            image::imageops::resize(
                &image,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            )
        } else {
            image
        };

        self.file
            .write_all(&rgb_to_yuyv(&image))
            .context("Failed to write frame to v4l2loopback device")?;

        Ok(())
    }

    fn resolution(&self) -> Geometry {
        Geometry::new(self.height as usize, self.width as usize)
    }
}
