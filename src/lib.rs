//! Light-grid webcam effect: a person mask from a segmentation model lights
//! up a procedural grid, leaving fading trails as the subject moves.

pub mod buffer;
pub mod capture;
pub mod compositor;
pub mod config;
pub mod error;
pub mod feedback;
pub mod output;
pub mod pattern;
pub mod pipeline;
pub mod segmentation;
