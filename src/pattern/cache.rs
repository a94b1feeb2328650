use super::{generate_crop_mask, generate_glow, generate_grid};
use crate::buffer::{Geometry, Mask};

/// The three static patterns a frame is composited against
#[derive(Debug, Clone)]
pub struct Patterns {
    pub grid: Mask,
    pub glow: Mask,
    pub crop: Mask,
}

#[derive(Debug)]
struct CachedPatterns {
    geometry: Geometry,
    spacing: u32,
    patterns: Patterns,
}

/// Last generated patterns, keyed by the geometry and spacing that made them
#[derive(Debug, Default)]
pub struct PatternCache {
    cached: Option<CachedPatterns>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patterns for `geometry` and `spacing`, regenerating whatever is stale.
    ///
    /// The crop stencil only depends on geometry and survives a spacing change.
    pub fn get(&mut self, geometry: Geometry, spacing: u32) -> &Patterns {
        let entry = match self.cached.take() {
            Some(cached) if cached.geometry == geometry && cached.spacing == spacing => cached,
            previous => {
                tracing::debug!(
                    "Regenerating patterns for {} with spacing {}",
                    geometry,
                    spacing
                );

                let crop = match previous {
                    Some(previous) if previous.geometry == geometry => previous.patterns.crop,
                    _ => generate_crop_mask(geometry),
                };

                CachedPatterns {
                    geometry,
                    spacing,
                    patterns: Patterns {
                        grid: generate_grid(geometry, spacing),
                        glow: generate_glow(geometry, spacing),
                        crop,
                    },
                }
            }
        };

        &self.cached.insert(entry).patterns
    }
}
