use anyhow::{Context, Result};
use clap::Parser;
use lightgrid::buffer::Geometry;
use lightgrid::capture::{CaptureSource, WebcamCapture};
use lightgrid::config::{require_geometry, Color, EffectParameters, ViewportMode};
use lightgrid::output::{OutputSink, PngDumpOutput, V4L2Output};
use lightgrid::pipeline::{frame_delay, FrameFailures, FrameView, PipelineState};
use lightgrid::segmentation::{self, OutputStride, SegmentationModel};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Output v4l2loopback device path
    #[arg(short, long, default_value = "/dev/video10")]
    output_device: String,

    /// Write PNG frames to this directory instead of a v4l2loopback device
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Keep one PNG out of this many frames when dumping
    #[arg(long, default_value_t = 30)]
    dump_every: u64,

    /// Capture resolution width
    #[arg(long, default_value_t = 640)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 480)]
    capture_height: u32,

    /// Viewport width; composited frames are centred in it
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value_t = 720)]
    viewport_height: u32,

    /// Compose at camera geometry or scale to fit the viewport
    #[arg(long, value_enum, default_value_t = ViewportMode::Native)]
    viewport_mode: ViewportMode,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path to person segmentation model (ONNX file)
    #[arg(long)]
    model: String,

    /// Model input height
    #[arg(long, default_value_t = 353)]
    model_height: u32,

    /// Model input width
    #[arg(long, default_value_t = 257)]
    model_width: u32,

    /// Output stride the model was exported with (8, 16 or 32)
    #[arg(long, default_value = "16")]
    output_stride: OutputStride,

    /// Scores at or above this count as foreground
    #[arg(long, default_value_t = 0.5)]
    threshold: f32,

    /// Weight of the new mask per frame; lower values leave longer trails
    #[arg(long, default_value_t = 0.3)]
    decay: f32,

    /// Grid spacing in pixels
    #[arg(long, default_value_t = 13)]
    spacing: u32,

    /// Glow colour as r,g,b in [0, 1]
    #[arg(long, default_value = "1,0,0.1")]
    tint: Color,

    /// Brightness of the unlit grid
    #[arg(long, default_value_t = 0.2)]
    ambient_opacity: f32,

    /// Disable the ragged border stencil
    #[arg(long)]
    no_crop: bool,

    /// Present frames unmirrored
    #[arg(long)]
    no_mirror: bool,

    /// Show the trail mask (grayscale) instead of the light grid
    #[arg(long)]
    show_mask: bool,
}

impl Args {
    fn effect_parameters(&self) -> EffectParameters {
        EffectParameters {
            decay_rate: self.decay,
            spacing: self.spacing,
            tint: self.tint,
            ambient: Color::gray(self.ambient_opacity),
            crop_enabled: !self.no_crop,
            viewport_mode: self.viewport_mode,
            mirror: !self.no_mirror,
            threshold: self.threshold,
            output_stride: self.output_stride,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let params = args.effect_parameters();
    params.validate().context("Invalid effect parameters")?;

    let viewport = require_geometry(
        "viewport",
        Geometry::new(args.viewport_height as usize, args.viewport_width as usize),
    )?;
    let model_geometry = require_geometry(
        "model input",
        Geometry::new(args.model_height as usize, args.model_width as usize),
    )?;

    tracing::info!("Lightgrid starting");
    tracing::info!("Capture: {}x{}", args.capture_width, args.capture_height);
    tracing::info!("Viewport: {} ({:?})", viewport, params.viewport_mode);
    tracing::info!("Target FPS: {}", args.fps);
    tracing::info!(
        "Effect: decay={}, spacing={}, tint={}, ambient={}, crop={}, mirror={}",
        params.decay_rate,
        params.spacing,
        params.tint,
        params.ambient,
        params.crop_enabled,
        params.mirror
    );

    // Camera failure is fatal: the pipeline never starts without frames
    let mut capture = match WebcamCapture::new(
        args.input_device,
        args.capture_width,
        args.capture_height,
        args.fps,
    ) {
        Ok(capture) => capture,
        Err(err) => {
            tracing::error!("No usable camera: {:#}", err);
            return Err(err.context("Failed to initialize webcam capture"));
        }
    };

    let mut output: Box<dyn OutputSink> = match &args.dump_dir {
        Some(dir) => Box::new(PngDumpOutput::new(dir, args.dump_every, viewport)?),
        None => Box::new(
            V4L2Output::new(
                &args.output_device,
                viewport.width as u32,
                viewport.height as u32,
            )
            .context("Failed to initialize v4l2loopback output")?,
        ),
    };

    tracing::info!("Loading segmentation model from {}", args.model);
    let mut model =
        segmentation::create_default_model(&args.model, model_geometry, params.output_stride)
            .context("Failed to load segmentation model")?;

    let view = if args.show_mask {
        FrameView::Mask
    } else {
        FrameView::Composite
    };

    run_pipeline(
        &mut capture,
        output.as_mut(),
        model.as_mut(),
        &params,
        viewport,
        view,
        args.fps,
    )
}

fn run_pipeline<C, O, M>(
    capture: &mut C,
    output: &mut O,
    model: &mut M,
    params: &EffectParameters,
    viewport: Geometry,
    view: FrameView,
    target_fps: u32,
) -> Result<()>
where
    C: CaptureSource + ?Sized,
    O: OutputSink + ?Sized,
    M: SegmentationModel + ?Sized,
{
    let frame_duration = Duration::from_secs_f32(1.0 / target_fps.max(1) as f32);
    let mut state = PipelineState::new();
    let mut failures = FrameFailures::new();

    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_segment_time = Duration::ZERO;
    let mut total_composite_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!(
        "Starting main pipeline loop (camera {}, output {})",
        capture.resolution(),
        output.resolution()
    );
    tracing::info!("Press Ctrl+C to stop");

    loop {
        let loop_start = Instant::now();

        // An abandoned frame still falls through to the rate limiter
        'frame: {
            // Capture frame
            let capture_start = Instant::now();
            let frame = match capture.capture_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    abandon(&mut failures, &err);
                    break 'frame;
                }
            };
            total_capture_time += capture_start.elapsed();

            // Parameters are fixed for the whole frame
            let snapshot = *params;

            let processed =
                match state.process_frame(&mut *model, &frame, &snapshot, viewport, view) {
                    Ok(processed) => processed,
                    Err(err) => {
                        abandon(&mut failures, &err);
                        break 'frame;
                    }
                };
            total_segment_time += processed.timings.segment;
            total_composite_time += processed.timings.composite;

            // Output frame
            let output_start = Instant::now();
            output
                .write_frame(&processed.buffer, snapshot.mirror)
                .context("Failed to write frame")?;
            total_output_time += output_start.elapsed();

            let streak = failures.recover();
            if streak > 0 {
                tracing::info!("Recovered after {} abandoned frame(s)", streak);
            }

            frame_count += 1;

            // Log stats every 30 frames
            if frame_count % 30 == 0 {
                let avg_ms = |total: Duration| total.as_secs_f64() * 1000.0 / frame_count as f64;
                let avg_capture_ms = avg_ms(total_capture_time);
                let avg_segment_ms = avg_ms(total_segment_time);
                let avg_composite_ms = avg_ms(total_composite_time);
                let avg_output_ms = avg_ms(total_output_time);
                let total_ms = avg_capture_ms + avg_segment_ms + avg_composite_ms + avg_output_ms;

                tracing::info!(
                    "Frame {}: capture={:.1}ms, segment={:.1}ms, composite={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}, abandoned={}",
                    frame_count,
                    avg_capture_ms,
                    avg_segment_ms,
                    avg_composite_ms,
                    avg_output_ms,
                    total_ms,
                    1000.0 / total_ms,
                    failures.total()
                );
            }
        }

        // Frame rate limiting
        let delay = frame_delay(loop_start.elapsed(), frame_duration);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

fn abandon(failures: &mut FrameFailures, err: &anyhow::Error) {
    if failures.record() {
        if failures.streak() == 1 {
            tracing::warn!("Abandoning frame: {:#}", err);
        } else {
            tracing::warn!("Still abandoning frames ({} in a row): {:#}", failures.streak(), err);
        }
    }
}
