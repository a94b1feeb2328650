//! Per-frame processing: segment, trail, composite, pad.

use crate::buffer::{Geometry, Mask, RgbBuffer};
use crate::compositor::{compose, mask_to_rgb, CompositeStyle};
use crate::config::EffectParameters;
use crate::feedback::blend;
use crate::pattern::PatternCache;
use crate::segmentation::{segment, SegmentationModel};
use anyhow::Result;
use image::RgbImage;
use std::time::{Duration, Instant};

/// What a processed frame presents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameView {
    /// The light-grid composite
    #[default]
    Composite,
    /// The decayed trail mask as greyscale
    Mask,
}

/// Wall-clock time spent in each stage of one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub segment: Duration,
    pub composite: Duration,
}

/// A finished frame ready for presentation
#[derive(Debug)]
pub struct ProcessedFrame {
    pub buffer: RgbBuffer,
    pub timings: StageTimings,
}

/// Consecutive abandoned frames between reports
pub const FAILURE_REPORT_INTERVAL: u64 = 30;

/// Counts abandoned frames so a persistent fault is reported once per streak
/// instead of on every tick
#[derive(Debug, Default)]
pub struct FrameFailures {
    total: u64,
    streak: u64,
}

impl FrameFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an abandoned frame. Returns true when this failure should be
    /// logged: the first of a streak, then every `FAILURE_REPORT_INTERVAL`.
    pub fn record(&mut self) -> bool {
        self.total += 1;
        self.streak += 1;
        self.streak == 1 || self.streak % FAILURE_REPORT_INTERVAL == 0
    }

    /// A frame completed. Returns the length of the streak it ended.
    pub fn recover(&mut self) -> u64 {
        std::mem::take(&mut self.streak)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn streak(&self) -> u64 {
        self.streak
    }
}

/// Time left to sleep so one loop iteration lasts `period`
pub fn frame_delay(elapsed: Duration, period: Duration) -> Duration {
    period.saturating_sub(elapsed)
}

/// State carried from one frame to the next
#[derive(Debug, Default)]
pub struct PipelineState {
    previous_mask: Option<Mask>,
    patterns: PatternCache,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trail mask produced by the last successful frame
    pub fn previous_mask(&self) -> Option<&Mask> {
        self.previous_mask.as_ref()
    }

    /// Run one frame through the pipeline.
    ///
    /// On error nothing is committed: the trail history stays as the previous
    /// successful frame left it, so the next frame proceeds independently.
    pub fn process_frame<M>(
        &mut self,
        model: &mut M,
        frame: &RgbImage,
        params: &EffectParameters,
        viewport: Geometry,
        view: FrameView,
    ) -> Result<ProcessedFrame>
    where
        M: SegmentationModel + ?Sized,
    {
        let frame_geometry = Geometry::new(frame.height() as usize, frame.width() as usize);
        let geometry = params.viewport_mode.compose_geometry(frame_geometry, viewport);

        let segment_start = Instant::now();
        let raw = segment(
            model,
            frame,
            params.output_stride,
            geometry,
            params.threshold,
        )?;
        let segment_time = segment_start.elapsed();

        let composite_start = Instant::now();
        let mask = blend(&raw, self.previous_mask.as_ref(), params.decay_rate);

        let buffer = match view {
            FrameView::Composite => {
                let patterns = self.patterns.get(geometry, params.spacing);
                let style = CompositeStyle {
                    tint: params.tint,
                    ambient: params.ambient,
                    crop_enabled: params.crop_enabled,
                };
                compose(&mask, patterns, &style, viewport)
            }
            FrameView::Mask => mask_to_rgb(&mask, viewport),
        };
        let composite_time = composite_start.elapsed();

        self.previous_mask = Some(mask);

        Ok(ProcessedFrame {
            buffer,
            timings: StageTimings {
                segment: segment_time,
                composite: composite_time,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportMode;
    use crate::segmentation::testing::{ConstantModel, FailingModel};

    fn params() -> EffectParameters {
        EffectParameters {
            crop_enabled: false,
            ..Default::default()
        }
    }

    fn lit_model() -> ConstantModel {
        ConstantModel {
            geometry: Geometry::new(64, 48),
            score: 0.9,
        }
    }

    #[test]
    fn first_frame_stores_decayed_history() {
        let mut state = PipelineState::new();
        let frame = RgbImage::new(40, 30);

        let out = state
            .process_frame(&mut lit_model(), &frame, &params(), Geometry::new(30, 40), FrameView::Composite)
            .expect("frame");

        assert_eq!(out.buffer.dim(), (30, 40, 3));
        let history = state.previous_mask().expect("history");
        assert_eq!(history.dim(), (30, 40));
        assert!(history.iter().all(|&v| (v - 0.3).abs() < 1e-6));
    }

    #[test]
    fn trail_accumulates_across_frames() {
        let mut state = PipelineState::new();
        let frame = RgbImage::new(40, 30);
        let viewport = Geometry::new(30, 40);

        for _ in 0..2 {
            state
                .process_frame(&mut lit_model(), &frame, &params(), viewport, FrameView::Mask)
                .expect("frame");
        }

        // 0.3 + 0.3 * 0.7
        let history = state.previous_mask().expect("history");
        assert!(history.iter().all(|&v| (v - 0.51).abs() < 1e-5));
    }

    #[test]
    fn failed_frame_leaves_history_untouched() {
        let mut state = PipelineState::new();
        let frame = RgbImage::new(40, 30);
        let viewport = Geometry::new(30, 40);

        state
            .process_frame(&mut lit_model(), &frame, &params(), viewport, FrameView::Composite)
            .expect("frame");
        let before = state.previous_mask().cloned();

        let mut failing = FailingModel {
            geometry: Geometry::new(64, 48),
        };
        let result = state.process_frame(&mut failing, &frame, &params(), viewport, FrameView::Composite);

        assert!(result.is_err());
        assert_eq!(state.previous_mask().cloned(), before);
    }

    #[test]
    fn resolution_change_reconciles_history() {
        let mut state = PipelineState::new();
        let viewport = Geometry::new(60, 80);

        state
            .process_frame(&mut lit_model(), &RgbImage::new(40, 30), &params(), viewport, FrameView::Composite)
            .expect("small frame");
        let out = state
            .process_frame(&mut lit_model(), &RgbImage::new(80, 60), &params(), viewport, FrameView::Composite)
            .expect("large frame");

        assert_eq!(out.buffer.dim(), (60, 80, 3));
        assert_eq!(state.previous_mask().map(|m| m.dim()), Some((60, 80)));
    }

    #[test]
    fn fit_mode_fills_viewport() {
        let mut state = PipelineState::new();
        let params = EffectParameters {
            viewport_mode: ViewportMode::Fit,
            ..params()
        };

        let out = state
            .process_frame(&mut lit_model(), &RgbImage::new(40, 30), &params, Geometry::new(60, 100), FrameView::Mask)
            .expect("frame");

        assert_eq!(out.buffer.dim(), (60, 100, 3));
        assert_eq!(state.previous_mask().map(|m| m.dim()), Some((60, 80)));
        // Letterbox columns stay black.
        assert_eq!(out.buffer[[30, 5, 0]], 0.0);
        assert!(out.buffer[[30, 50, 0]] > 0.0);
    }

    #[test]
    fn persistent_failure_is_reported_once_per_interval() {
        let mut failures = FrameFailures::new();

        let reported: Vec<u64> = (1..=61).filter(|_| failures.record()).collect();
        assert_eq!(reported, vec![1, 30, 60]);
        assert_eq!(failures.streak(), 61);
        assert_eq!(failures.total(), 61);
    }

    #[test]
    fn recovery_ends_the_streak() {
        let mut failures = FrameFailures::new();
        failures.record();
        failures.record();

        assert_eq!(failures.recover(), 2);
        assert_eq!(failures.streak(), 0);
        assert!(failures.record());
        assert_eq!(failures.total(), 3);
    }

    #[test]
    fn delay_fills_the_rest_of_the_period() {
        let period = Duration::from_millis(33);

        assert_eq!(frame_delay(Duration::from_millis(10), period), Duration::from_millis(23));
        assert_eq!(frame_delay(Duration::ZERO, period), period);
        assert_eq!(frame_delay(Duration::from_millis(50), period), Duration::ZERO);
    }
}
