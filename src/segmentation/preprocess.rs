use crate::buffer::{Geometry, Padding};
use image::{imageops, RgbImage};
use ndarray::Array4;

/// Letterboxes camera frames into the model's fixed input geometry
pub struct Preprocessor {
    target: Geometry,
}

impl Preprocessor {
    pub fn new(target: Geometry) -> Self {
        Self { target }
    }

    /// Resize `image` to fit the model input and pad the rest with black
    ///
    /// Steps:
    /// 1. Resize to the largest size with the frame's aspect that fits
    /// 2. Centre on a black canvas of the model geometry
    ///
    /// Returns the padded image and the padding applied on each side, in
    /// model-input pixels.
    pub fn resize_and_pad(&self, image: &RgbImage) -> (RgbImage, Padding) {
        let _span = tracing::debug_span!("resize_and_pad").entered();

        let source = Geometry::new(image.height() as usize, image.width() as usize);
        let fitted = source.fit_within(self.target);
        let padding = Padding::centered(fitted, self.target);

        if source == self.target {
            return (image.clone(), padding);
        }

        let resized = if fitted != source {
            imageops::resize(
                image,
                fitted.width as u32,
                fitted.height as u32,
                imageops::FilterType::Triangle,
            )
        } else {
            image.clone()
        };

        let mut padded = RgbImage::new(self.target.width as u32, self.target.height as u32);
        imageops::replace(&mut padded, &resized, padding.left as i64, padding.top as i64);

        (padded, padding)
    }

    /// Convert an RGB image into an NCHW tensor normalised to [-1, 1]
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn to_input_tensor(image: &RgbImage) -> Array4<f32> {
        let (width, height) = image.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in image.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] =
                    pixel[channel] as f32 / 127.5 - 1.0;
            }
        }

        tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn wide_frame_is_padded_top_and_bottom() {
        let frame = RgbImage::from_pixel(16, 8, Rgb([255, 255, 255]));
        let (padded, padding) = Preprocessor::new(Geometry::new(16, 16)).resize_and_pad(&frame);

        assert_eq!(padded.dimensions(), (16, 16));
        assert_eq!(
            padding,
            Padding {
                top: 4,
                bottom: 4,
                left: 0,
                right: 0
            }
        );
        assert_eq!(padded.get_pixel(5, 3), &Rgb([0, 0, 0]));
        assert_eq!(padded.get_pixel(5, 4), &Rgb([255, 255, 255]));
        assert_eq!(padded.get_pixel(5, 12), &Rgb([0, 0, 0]));
    }

    #[test]
    fn matching_frame_needs_no_padding() {
        let frame = RgbImage::from_pixel(8, 12, Rgb([10, 20, 30]));
        let (padded, padding) = Preprocessor::new(Geometry::new(12, 8)).resize_and_pad(&frame);

        assert!(padding.is_zero());
        assert_eq!(padded, frame);
    }

    #[test]
    fn tensor_is_nchw_and_centred_on_zero() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(1, 0, Rgb([255, 0, 0]));

        let tensor = Preprocessor::to_input_tensor(&frame);
        assert_eq!(tensor.shape(), &[1, 3, 1, 2]);
        assert_eq!(tensor[[0, 0, 0, 0]], -1.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], -1.0);
    }
}
