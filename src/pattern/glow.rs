use crate::buffer::{Geometry, Mask};
use ndarray::Array2;

/// Exponent applied to the accumulated glow to sharpen its falloff
pub const GLOW_FALLOFF_POWER: i32 = 5;

/// (spacing divisor, opacity) for each stacked disk, innermost first
const GLOW_LAYERS: [(f32, f32); 4] = [(7.0, 1.0), (6.0, 0.9), (3.0, 0.7), (2.0, 0.6)];

/// One soft-edged disk stamped at every grid intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub radius: f32,
    pub opacity: f32,
}

/// Disks drawn around each intersection for a grid of `spacing`
pub fn glow_disks(spacing: u32) -> [Disk; 4] {
    let spacing = spacing.max(1) as f32;
    GLOW_LAYERS.map(|(divisor, opacity)| Disk {
        radius: spacing / divisor,
        opacity,
    })
}

/// Bloom pattern peaking at every grid intersection.
///
/// Intersections follow `generate_grid`: `floor(extent / spacing)` lines per
/// axis starting at zero.
///
/// Disks composite with source-over onto black, so overlapping disks
/// saturate towards one instead of summing past it.
pub fn generate_glow(geometry: Geometry, spacing: u32) -> Mask {
    let _span = tracing::debug_span!("generate_glow").entered();

    let disks = glow_disks(spacing);
    let step = spacing.max(1) as usize;
    let mut glow = Array2::zeros((geometry.height, geometry.width));

    for col in 0..geometry.width / step {
        for row in 0..geometry.height / step {
            for disk in &disks {
                stamp(&mut glow, row * step, col * step, *disk);
            }
        }
    }

    glow.mapv_inplace(|v: f32| v.powi(GLOW_FALLOFF_POWER));
    glow
}

/// Composite a white disk over `canvas`, antialiased over one pixel at the rim
fn stamp(canvas: &mut Mask, cy: usize, cx: usize, disk: Disk) {
    let (height, width) = canvas.dim();
    let reach = (disk.radius + 0.5).ceil() as usize;

    let y_range = cy.saturating_sub(reach)..(cy + reach + 1).min(height);
    let x_range = cx.saturating_sub(reach)..(cx + reach + 1).min(width);

    for y in y_range {
        for x in x_range.clone() {
            let dy = y as f32 - cy as f32;
            let dx = x as f32 - cx as f32;
            let coverage = (disk.radius + 0.5 - dx.hypot(dy)).clamp(0.0, 1.0);
            if coverage == 0.0 {
                continue;
            }

            let alpha = coverage * disk.opacity;
            let value = &mut canvas[[y, x]];
            *value += alpha * (1.0 - *value);
        }
    }
}
