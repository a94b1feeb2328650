use super::{buffer_to_image, OutputSink};
use crate::buffer::{Geometry, RgbBuffer};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Writes every `every`th presented frame to a directory as PNG
pub struct PngDumpOutput {
    dir: PathBuf,
    every: u64,
    frame_index: u64,
    geometry: Geometry,
}

impl PngDumpOutput {
    pub fn new<P: Into<PathBuf>>(dir: P, every: u64, geometry: Geometry) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create dump directory {}", dir.display()))?;

        tracing::info!(
            "Dumping every {} frame(s) at {} to {}",
            every.max(1),
            geometry,
            dir.display()
        );

        Ok(Self {
            dir,
            every: every.max(1),
            frame_index: 0,
            geometry,
        })
    }
}

impl OutputSink for PngDumpOutput {
    fn write_frame(&mut self, frame: &RgbBuffer, mirror: bool) -> Result<()> {
        let index = self.frame_index;
        self.frame_index += 1;

        if index % self.every != 0 {
            return Ok(());
        }

        let path = self.dir.join(format!("frame_{index:06}.png"));
        buffer_to_image(frame, mirror)
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn resolution(&self) -> Geometry {
        self.geometry
    }
}
