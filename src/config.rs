//! Effect parameters read once per frame, plus the colour type they use.

use crate::buffer::Geometry;
use crate::error::ConfigError;
use crate::segmentation::OutputStride;
use std::fmt;
use std::str::FromStr;

/// Linear RGB colour with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }

    pub fn channels(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        match self.channels().into_iter().find(|v| !(0.0..=1.0).contains(v)) {
            Some(value) => Err(ConfigError::ColorChannel { name, value }),
            None => Ok(()),
        }
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    /// Parses `"r,g,b"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = s
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::ColorSyntax(s.to_string()))?;

        match channels[..] {
            [r, g, b] => Ok(Color::new(r, g, b)),
            _ => Err(ConfigError::ColorSyntax(s.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Which geometry frames are composited at before padding to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewportMode {
    /// Camera frame geometry
    Native,
    /// Largest camera-aspect geometry that fits the viewport
    Fit,
}

impl ViewportMode {
    pub fn compose_geometry(self, frame: Geometry, viewport: Geometry) -> Geometry {
        match self {
            ViewportMode::Native => frame,
            ViewportMode::Fit => frame.fit_within(viewport),
        }
    }
}

/// Everything that shapes a frame's look
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    /// Weight of the new mask; `1 - decay_rate` of the trail persists
    pub decay_rate: f32,
    /// Grid spacing in pixels
    pub spacing: u32,
    /// Colour of lit grid glow
    pub tint: Color,
    /// Colour of the always-visible unlit grid
    pub ambient: Color,
    pub crop_enabled: bool,
    pub viewport_mode: ViewportMode,
    /// Mirror the presented frame horizontally
    pub mirror: bool,
    pub threshold: f32,
    pub output_stride: OutputStride,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            decay_rate: 0.3,
            spacing: 13,
            tint: Color::new(1.0, 0.0, 0.1),
            ambient: Color::gray(0.2),
            crop_enabled: true,
            viewport_mode: ViewportMode::Native,
            mirror: true,
            threshold: 0.5,
            output_stride: OutputStride::Sixteen,
        }
    }
}

impl EffectParameters {
    /// Reject parameter combinations the pipeline cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.decay_rate > 0.0 && self.decay_rate < 1.0) {
            return Err(ConfigError::DecayRate(self.decay_rate));
        }
        if self.spacing == 0 {
            return Err(ConfigError::ZeroSpacing);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        self.tint.validate("tint")?;
        self.ambient.validate("ambient")?;
        Ok(())
    }
}

/// Fail fast on a zero-sized geometry
pub fn require_geometry(name: &'static str, geometry: Geometry) -> Result<Geometry, ConfigError> {
    if geometry.is_empty() {
        Err(ConfigError::EmptyGeometry { name, geometry })
    } else {
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EffectParameters::default().validate(), Ok(()));
    }

    #[test]
    fn decay_rate_must_be_open_unit_interval() {
        for decay_rate in [0.0, 1.0, -0.1, f32::NAN] {
            let params = EffectParameters {
                decay_rate,
                ..Default::default()
            };
            assert!(matches!(params.validate(), Err(ConfigError::DecayRate(_))));
        }
    }

    #[test]
    fn zero_spacing_is_rejected() {
        let params = EffectParameters {
            spacing: 0,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::ZeroSpacing));
    }

    #[test]
    fn out_of_range_tint_is_rejected() {
        let params = EffectParameters {
            tint: Color::new(1.5, 0.0, 0.0),
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::ColorChannel {
                name: "tint",
                value: 1.5
            })
        );
    }

    #[test]
    fn color_parses_from_comma_list() {
        assert_eq!("1, 0, .1".parse::<Color>(), Ok(Color::new(1.0, 0.0, 0.1)));
        assert!("1,0".parse::<Color>().is_err());
        assert!("red".parse::<Color>().is_err());
    }

    #[test]
    fn fit_mode_scales_into_viewport() {
        let frame = Geometry::new(480, 640);
        let viewport = Geometry::new(720, 1280);

        assert_eq!(ViewportMode::Native.compose_geometry(frame, viewport), frame);
        assert_eq!(
            ViewportMode::Fit.compose_geometry(frame, viewport),
            Geometry::new(720, 960)
        );
    }

    #[test]
    fn empty_geometry_fails_fast() {
        assert!(require_geometry("viewport", Geometry::new(0, 10)).is_err());
        assert_eq!(
            require_geometry("viewport", Geometry::new(5, 10)),
            Ok(Geometry::new(5, 10))
        );
    }
}
