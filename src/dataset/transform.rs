//! Image-to-tensor conversion applied when tiles are fetched.

use image::{DynamicImage, GenericImageView, Pixel};
use ndarray::Array3;

/// Function turning a decoded image into the sample handed to training.
pub type ImageTransform<T> = Box<dyn Fn(DynamicImage) -> T + Send + Sync>;

/// Convert an image into a channel-first `(C, H, W)` tensor scaled to `[0, 1]`.
///
/// The channel count follows the image: 1 for luma, 2 for luma + alpha, 3 for
/// RGB and 4 for RGBA.
pub fn to_tensor(image: DynamicImage) -> Array3<f32> {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => planes(&image.to_luma32f()),
        (false, true) => planes(&image.to_luma_alpha32f()),
        (true, false) => planes(&image.to_rgb32f()),
        (true, true) => planes(&image.to_rgba32f()),
    }
}

fn planes<I>(image: &I) -> Array3<f32>
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = f32>,
{
    let (width, height) = image.dimensions();
    let channels = usize::from(<I::Pixel as Pixel>::CHANNEL_COUNT);
    let mut tensor = Array3::<f32>::zeros((channels, height as usize, width as usize));
    for (x, y, pixel) in image.pixels() {
        for (c, &value) in pixel.channels().iter().enumerate() {
            tensor[[c, y as usize, x as usize]] = value.clamp(0.0, 1.0);
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn rgb_becomes_three_planes() {
        let mut img = RgbImage::from_pixel(2, 3, Rgb([0, 0, 0]));
        img.put_pixel(1, 2, Rgb([255, 0, 51]));
        let tensor = to_tensor(DynamicImage::ImageRgb8(img));
        assert_eq!(tensor.dim(), (3, 3, 2));
        assert_eq!(tensor[[0, 2, 1]], 1.0);
        assert_eq!(tensor[[1, 2, 1]], 0.0);
        assert!((tensor[[2, 2, 1]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 0]], 0.0);
    }

    #[test]
    fn gray_keeps_single_channel() {
        let img = GrayImage::from_pixel(4, 1, Luma([255]));
        let tensor = to_tensor(DynamicImage::ImageLuma8(img));
        assert_eq!(tensor.dim(), (1, 1, 4));
        assert!(tensor.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn alpha_is_kept() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let tensor = to_tensor(DynamicImage::ImageRgba8(img));
        assert_eq!(tensor.dim(), (4, 1, 1));
    }
}
