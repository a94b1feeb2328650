use crate::buffer::Geometry;
use thiserror::Error;

/// Invalid effect or startup parameters, rejected before the first frame
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("decay rate must be strictly between 0 and 1, got {0}")]
    DecayRate(f32),

    #[error("pattern spacing must be at least 1 pixel")]
    ZeroSpacing,

    #[error("{name} channel must be within [0, 1], got {value}")]
    ColorChannel { name: &'static str, value: f32 },

    #[error("segmentation threshold must be within [0, 1], got {0}")]
    Threshold(f32),

    #[error("{name} geometry must be non-empty, got {geometry}")]
    EmptyGeometry {
        name: &'static str,
        geometry: Geometry,
    },

    #[error("cannot parse colour {0:?}, expected \"r,g,b\"")]
    ColorSyntax(String),

    #[error("unsupported output stride {0}, expected 8, 16 or 32")]
    Stride(String),
}

/// Violations of the segmentation model's call contract
#[derive(Debug, Error, PartialEq)]
pub enum SegmentationError {
    #[error("model was exported for output stride {supported}, not {requested}")]
    UnsupportedStride { requested: u32, supported: u32 },

    #[error("model expects {expected} input, got {actual}")]
    InputGeometry { expected: Geometry, actual: Geometry },

    #[error("cannot interpret score tensor of shape {0:?} as a single-channel map")]
    ScoreShape(Vec<usize>),
}
