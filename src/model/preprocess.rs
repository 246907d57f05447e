//! Image preprocessing
//!
//! Turns uploaded bytes into the `(1, 3, H, W)` float tensor the ViT expects:
//! decode, convert to RGB, resize to the exact input size, scale to `[0, 1]`
//! and normalize per channel with the ImageNet statistics.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

use super::inference::InferenceError;

/// ViT-B/16 input resolution
pub const INPUT_SIZE: u32 = 224;

/// ImageNet channel means (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode an uploaded image of any supported format into 8-bit RGB.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, InferenceError> {
    if bytes.is_empty() {
        return Err(InferenceError::InvalidImage("empty upload".to_string()));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| InferenceError::InvalidImage(e.to_string()))?;

    Ok(image.to_rgb8())
}

/// Per-channel affine normalization: `out = pixel * alpha + beta`.
///
/// `alpha = scale / std` and `beta = -mean / std`, so a pixel `p` in
/// `0..=255` becomes `(p * scale - mean) / std`.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalize {
    pub alpha: [f32; 3],
    pub beta: [f32; 3],
}

impl Normalize {
    /// # Errors
    ///
    /// Returns `InferenceError::Tensor` if `scale <= 0`, if `mean` or `std`
    /// do not have exactly three entries, or if any `std` entry is `<= 0`.
    pub fn new(scale: f32, mean: &[f32], std: &[f32]) -> Result<Self, InferenceError> {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(InferenceError::Tensor(format!(
                "scale must be a positive number, got {scale}"
            )));
        }
        if mean.len() != 3 {
            return Err(InferenceError::Tensor(
                "mean must have exactly 3 elements for RGB".to_string(),
            ));
        }
        if std.len() != 3 {
            return Err(InferenceError::Tensor(
                "std must have exactly 3 elements for RGB".to_string(),
            ));
        }
        if let Some((i, s)) = std.iter().enumerate().find(|(_, s)| **s <= 0.0) {
            return Err(InferenceError::Tensor(format!(
                "standard deviation at index {i} must be greater than 0, got {s}"
            )));
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }

        Ok(Self { alpha, beta })
    }

    /// ImageNet statistics with `1/255` scaling
    pub fn imagenet() -> Self {
        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = (1.0 / 255.0) / IMAGENET_STD[c];
            beta[c] = -IMAGENET_MEAN[c] / IMAGENET_STD[c];
        }
        Self { alpha, beta }
    }

    #[inline]
    pub fn apply(&self, channel: usize, value: u8) -> f32 {
        value as f32 * self.alpha[channel] + self.beta[channel]
    }
}

impl Default for Normalize {
    fn default() -> Self {
        Self::imagenet()
    }
}

/// Resize + normalize into an NCHW batch of one.
#[derive(Debug, Clone)]
pub struct ImageTransform {
    pub width: u32,
    pub height: u32,
    pub filter: FilterType,
    pub normalize: Normalize,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            width: INPUT_SIZE,
            height: INPUT_SIZE,
            // bilinear, same as torchvision's default Resize interpolation
            filter: FilterType::Triangle,
            normalize: Normalize::imagenet(),
        }
    }
}

impl ImageTransform {
    /// Resize (aspect ratio not preserved) and normalize.
    pub fn apply(&self, image: &RgbImage) -> Array4<f32> {
        let resized = if image.dimensions() == (self.width, self.height) {
            image.clone()
        } else {
            imageops::resize(image, self.width, self.height, self.filter)
        };

        let norm = &self.normalize;
        Array4::from_shape_fn(
            (1, 3, self.height as usize, self.width as usize),
            |(_, c, y, x)| {
                let pixel = resized.get_pixel(x as u32, y as u32);
                norm.apply(c, pixel[c])
            },
        )
    }

    /// Decode raw upload bytes and apply the transform.
    pub fn prepare(&self, bytes: &[u8]) -> Result<Array4<f32>, InferenceError> {
        let image = decode_rgb(bytes)?;
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "Decoded upload"
        );
        Ok(self.apply(&image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), format)
            .expect("encode test image");
        buf
    }

    #[test]
    fn test_normalize_rejects_invalid_params() {
        assert!(Normalize::new(0.0, &IMAGENET_MEAN, &IMAGENET_STD).is_err());
        assert!(Normalize::new(1.0 / 255.0, &[0.5, 0.5], &IMAGENET_STD).is_err());
        assert!(Normalize::new(1.0 / 255.0, &IMAGENET_MEAN, &[0.2, 0.0, 0.2]).is_err());
        assert!(Normalize::new(1.0 / 255.0, &IMAGENET_MEAN, &[0.2, 0.2, 0.2, 0.2]).is_err());
    }

    #[test]
    fn test_imagenet_matches_explicit_params() {
        let explicit = Normalize::new(1.0 / 255.0, &IMAGENET_MEAN, &IMAGENET_STD).unwrap();
        assert_eq!(explicit, Normalize::imagenet());
    }

    #[test]
    fn test_normalize_extremes() {
        let norm = Normalize::imagenet();
        for c in 0..3 {
            let low = norm.apply(c, 0);
            let high = norm.apply(c, 255);
            assert!((low - (-IMAGENET_MEAN[c] / IMAGENET_STD[c])).abs() < 1e-5);
            assert!((high - ((1.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c])).abs() < 1e-5);
        }
    }

    #[test]
    fn test_output_shape_independent_of_input_size() {
        let transform = ImageTransform::default();
        for (w, h) in [(1, 1), (37, 512), (640, 480), (224, 224)] {
            let image = RgbImage::from_pixel(w, h, Rgb([10, 20, 30]));
            let tensor = transform.apply(&image);
            assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        }
    }

    #[test]
    fn test_channel_planes_are_rgb_order() {
        let transform = ImageTransform::default();
        let image = RgbImage::from_pixel(50, 80, Rgb([255, 0, 128]));
        let tensor = transform.apply(&image);
        let norm = Normalize::imagenet();

        // uniform input stays uniform after resampling
        assert!((tensor[[0, 0, 100, 100]] - norm.apply(0, 255)).abs() < 1e-4);
        assert!((tensor[[0, 1, 5, 200]] - norm.apply(1, 0)).abs() < 1e-4);
        assert!((tensor[[0, 2, 223, 0]] - norm.apply(2, 128)).abs() < 1e-4);
    }

    #[test]
    fn test_pixel_position_preserved_at_native_size() {
        let transform = ImageTransform::default();
        let mut image = RgbImage::from_pixel(224, 224, Rgb([0, 0, 0]));
        image.put_pixel(7, 3, Rgb([255, 255, 255]));

        let tensor = transform.apply(&image);
        let norm = Normalize::imagenet();
        // x is the last axis, y the one before it
        assert!((tensor[[0, 0, 3, 7]] - norm.apply(0, 255)).abs() < 1e-6);
        assert!((tensor[[0, 0, 7, 3]] - norm.apply(0, 0)).abs() < 1e-6);
    }

    #[test]
    fn test_decode_converts_grayscale_and_rgba() {
        let gray = encode(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([200]))),
            ImageFormat::Png,
        );
        let rgb = decode_rgb(&gray).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([200, 200, 200]));

        let rgba = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 40]))),
            ImageFormat::Png,
        );
        let rgb = decode_rgb(&rgba).unwrap();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_rgb(&[]), Err(InferenceError::InvalidImage(_))));
        assert!(matches!(
            decode_rgb(b"definitely not an image"),
            Err(InferenceError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_prepare_jpeg() {
        let jpeg = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([90, 90, 90]))),
            ImageFormat::Jpeg,
        );
        let tensor = ImageTransform::default().prepare(&jpeg).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        assert!(tensor.iter().all(|v| v.is_finite()));
    }
}
