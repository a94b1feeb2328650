//! Procedural background patterns: the light grid, its glow bloom, and the
//! decorative crop stencil.

mod cache;
mod crop;
mod glow;
mod grid;

pub use cache::{PatternCache, Patterns};
pub use crop::generate_crop_mask;
pub use glow::{generate_glow, glow_disks, Disk, GLOW_FALLOFF_POWER};
pub use grid::generate_grid;
