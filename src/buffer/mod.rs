//! Frame-scoped numeric buffers and the helpers that keep their shapes in
//! agreement before any elementwise combination.

mod reconcile;
mod resize;

pub use reconcile::reconcile;
pub use resize::{pad_to_match, resize_bilinear, strip_padding};

use ndarray::{Array2, Array3, ArrayBase, Data, Dimension};
use std::fmt;

/// Single-channel foreground strength, `[height, width]`, values in `[0, 1]`
pub type Mask = Array2<f32>;

/// Composited colour frame, `[height, width, 3]`, values in `[0, 1]`
pub type RgbBuffer = Array3<f32>;

/// Height/width pair describing a buffer's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub height: usize,
    pub width: usize,
}

impl Geometry {
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Geometry of the first two axes of any ndarray buffer
    pub fn of<S, D>(buffer: &ArrayBase<S, D>) -> Self
    where
        S: Data,
        D: Dimension,
    {
        let shape = buffer.shape();
        Self::new(
            shape.first().copied().unwrap_or(0),
            shape.get(1).copied().unwrap_or(0),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// Largest geometry with this aspect ratio that fits inside `bounds`
    pub fn fit_within(self, bounds: Geometry) -> Geometry {
        if self.is_empty() || bounds.is_empty() {
            return bounds;
        }

        let scale = f64::min(
            bounds.height as f64 / self.height as f64,
            bounds.width as f64 / self.width as f64,
        );

        let height = ((self.height as f64 * scale).round() as usize).clamp(1, bounds.height);
        let width = ((self.width as f64 * scale).round() as usize).clamp(1, bounds.width);

        Geometry::new(height, width)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rows/columns added on each side of a buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Padding {
    /// Centred padding that grows `current` to `target`.
    ///
    /// Each axis gets `floor(extra / 2)` before and the remainder after, so an
    /// odd difference leaves the extra row/column on the bottom/right. Axes
    /// where `current` is already at least `target` get no padding.
    pub fn centered(current: Geometry, target: Geometry) -> Self {
        let (top, bottom) = split(target.height.saturating_sub(current.height));
        let (left, right) = split(target.width.saturating_sub(current.width));
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    pub fn vertical(&self) -> usize {
        self.top + self.bottom
    }

    pub fn horizontal(&self) -> usize {
        self.left + self.right
    }

    pub fn is_zero(&self) -> bool {
        self.vertical() == 0 && self.horizontal() == 0
    }
}

fn split(extra: usize) -> (usize, usize) {
    let before = extra / 2;
    (before, extra - before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn geometry_of_reads_leading_axes() {
        let rgb = Array3::<f32>::zeros((4, 7, 3));
        assert_eq!(Geometry::of(&rgb), Geometry::new(4, 7));
    }

    #[test]
    fn padding_splits_odd_difference_with_remainder_after() {
        let padding = Padding::centered(Geometry::new(5, 10), Geometry::new(8, 13));
        assert_eq!(padding.top, 1);
        assert_eq!(padding.bottom, 2);
        assert_eq!(padding.left, 1);
        assert_eq!(padding.right, 2);
    }

    #[test]
    fn padding_is_zero_when_already_large_enough() {
        let padding = Padding::centered(Geometry::new(10, 10), Geometry::new(8, 10));
        assert!(padding.is_zero());
    }

    #[test]
    fn fit_within_keeps_aspect() {
        let fitted = Geometry::new(480, 640).fit_within(Geometry::new(1080, 1920));
        assert_eq!(fitted, Geometry::new(1080, 1440));

        let tall = Geometry::new(640, 480).fit_within(Geometry::new(720, 1280));
        assert_eq!(tall, Geometry::new(720, 540));
    }

    proptest::proptest! {
        #[test]
        fn padding_always_reaches_target(
            h in 1usize..200, w in 1usize..200, dh in 0usize..100, dw in 0usize..100,
        ) {
            let current = Geometry::new(h, w);
            let target = Geometry::new(h + dh, w + dw);
            let padding = Padding::centered(current, target);

            proptest::prop_assert_eq!(padding.top, dh / 2);
            proptest::prop_assert_eq!(padding.left, dw / 2);
            proptest::prop_assert_eq!(padding.top + padding.bottom + h, target.height);
            proptest::prop_assert_eq!(padding.left + padding.right + w, target.width);
        }
    }
}
