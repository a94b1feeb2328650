use super::{Geometry, Mask, Padding, RgbBuffer};
use ndarray::{s, Array2, Array3, ArrayBase, ArrayView2, Data, Ix2};

/// Bilinear resize of a single-channel buffer.
///
/// With `align_corners` the corner samples of source and target coincide;
/// otherwise target pixel `i` samples source position `i * in / out`.
pub fn resize_bilinear<S>(src: &ArrayBase<S, Ix2>, target: Geometry, align_corners: bool) -> Mask
where
    S: Data<Elem = f32>,
{
    let (in_h, in_w) = src.dim();
    if in_h == 0 || in_w == 0 || target.is_empty() {
        return Array2::zeros((target.height, target.width));
    }

    let rows = taps(in_h, target.height, align_corners);
    let cols = taps(in_w, target.width, align_corners);

    Array2::from_shape_fn((target.height, target.width), |(y, x)| {
        let row = rows[y];
        let col = cols[x];

        let top = lerp(src[[row.lo, col.lo]], src[[row.lo, col.hi]], col.frac);
        let bottom = lerp(src[[row.hi, col.lo]], src[[row.hi, col.hi]], col.frac);
        lerp(top, bottom, row.frac)
    })
}

/// View of `src` with `padding` removed from each side
pub fn strip_padding(src: ArrayView2<'_, f32>, padding: Padding) -> ArrayView2<'_, f32> {
    let (h, w) = src.dim();
    let bottom = h.saturating_sub(padding.bottom).max(padding.top.min(h));
    let right = w.saturating_sub(padding.right).max(padding.left.min(w));
    src.slice_move(s![padding.top.min(h)..bottom, padding.left.min(w)..right])
}

/// Centre `buffer` in a zero canvas of `target` geometry.
///
/// Smaller axes are padded by `Padding::centered`; larger axes are
/// centre-cropped with the same floor split. A buffer already at `target` is
/// returned as-is.
pub fn pad_to_match(buffer: RgbBuffer, target: Geometry) -> RgbBuffer {
    let current = Geometry::of(&buffer);
    if current == target {
        return buffer;
    }

    let channels = buffer.dim().2;
    let (dst_y, src_y, rows) = place(current.height, target.height);
    let (dst_x, src_x, cols) = place(current.width, target.width);

    let mut out = Array3::zeros((target.height, target.width, channels));
    out.slice_mut(s![dst_y..dst_y + rows, dst_x..dst_x + cols, ..])
        .assign(&buffer.slice(s![src_y..src_y + rows, src_x..src_x + cols, ..]));
    out
}

/// (destination offset, source offset, span) for one axis
fn place(current: usize, target: usize) -> (usize, usize, usize) {
    if current <= target {
        ((target - current) / 2, 0, current)
    } else {
        (0, (current - target) / 2, target)
    }
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    lo: usize,
    hi: usize,
    frac: f32,
}

fn taps(in_len: usize, out_len: usize, align_corners: bool) -> Vec<Tap> {
    let scale = if align_corners && out_len > 1 {
        (in_len - 1) as f32 / (out_len - 1) as f32
    } else {
        in_len as f32 / out_len as f32
    };

    (0..out_len)
        .map(|i| {
            let pos = i as f32 * scale;
            let lo = (pos.floor() as usize).min(in_len - 1);
            let hi = (lo + 1).min(in_len - 1);
            Tap {
                lo,
                hi,
                frac: (pos - lo as f32).clamp(0.0, 1.0),
            }
        })
        .collect()
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn resize_to_same_geometry_is_identity() {
        let src = array![[0.0, 0.5], [1.0, 0.25]];
        let out = resize_bilinear(&src, Geometry::new(2, 2), false);
        assert_eq!(out, src);
    }

    #[test]
    fn align_corners_preserves_corner_values() {
        let src = array![[0.0, 1.0], [1.0, 0.0]];
        let out = resize_bilinear(&src, Geometry::new(5, 5), true);
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 4]], 1.0);
        assert_eq!(out[[4, 0]], 1.0);
        assert_eq!(out[[4, 4]], 0.0);
        assert!((out[[2, 2]] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn upsample_interpolates_between_samples() {
        let src = array![[0.0, 1.0]];
        let out = resize_bilinear(&src, Geometry::new(1, 4), false);
        assert_eq!(out, array![[0.0, 0.5, 1.0, 1.0]]);
    }

    #[test]
    fn strip_padding_removes_each_side() {
        let src = Array2::from_shape_fn((6, 5), |(y, x)| (y * 10 + x) as f32);
        let padding = Padding {
            top: 1,
            bottom: 2,
            left: 2,
            right: 0,
        };
        let inner = strip_padding(src.view(), padding);
        assert_eq!(inner.dim(), (3, 3));
        assert_eq!(inner[[0, 0]], 12.0);
        assert_eq!(inner[[2, 2]], 34.0);
    }

    #[test]
    fn pad_to_match_centres_with_floor_offset() {
        let buffer = Array3::from_elem((2, 3, 3), 1.0f32);
        let padded = pad_to_match(buffer, Geometry::new(5, 6));

        assert_eq!(padded.dim(), (5, 6, 3));
        // top = floor(3/2) = 1, left = floor(3/2) = 1
        assert_eq!(padded[[0, 1, 0]], 0.0);
        assert_eq!(padded[[1, 1, 0]], 1.0);
        assert_eq!(padded[[2, 3, 2]], 1.0);
        assert_eq!(padded[[3, 1, 0]], 0.0);
        assert_eq!(padded[[1, 4, 0]], 0.0);
        assert_eq!(padded.sum(), 18.0);
    }

    #[test]
    fn pad_to_match_crops_oversized_axes() {
        let buffer = Array3::from_shape_fn((2, 6, 1), |(_, x, _)| x as f32);
        let fitted = pad_to_match(buffer, Geometry::new(4, 4));

        assert_eq!(fitted.dim(), (4, 4, 1));
        assert_eq!(fitted[[1, 0, 0]], 1.0);
        assert_eq!(fitted[[1, 3, 0]], 4.0);
        assert_eq!(fitted[[0, 0, 0]], 0.0);
    }
}
