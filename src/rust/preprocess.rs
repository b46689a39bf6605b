use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::{Array4, ArrayView4};

use crate::classifier::ClassifierError;

/// Side length of the square input the classifier was trained on.
pub const INPUT_SIZE: u32 = 224;
/// Colour channels of the classifier input (RGB).
pub const INPUT_CHANNELS: usize = 3;

/// Largest encoded image accepted. Caps the bytes read into memory; decoded
/// dimensions are bounded by the image crate's default limits.
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// A normalized image ready for inference.
///
/// Shape is always `[1, 224, 224, 3]` (batch, height, width, channel) and every
/// value lies in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor(Array4<f32>);

impl ImageTensor {
    /// Decodes raw image bytes and normalizes them for the classifier.
    ///
    /// The image is converted to RGB, resized to 224x224 without preserving
    /// the aspect ratio, and scaled from `0..=255` to `[0.0, 1.0]`.
    ///
    /// # Errors
    /// - `DecodeError` if the bytes are empty, too large, or not a supported image
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClassifierError> {
        if bytes.is_empty() {
            return Err(ClassifierError::DecodeError("Image data is empty".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ClassifierError::DecodeError(format!(
                "Image is too large ({} bytes, max is {})",
                bytes.len(),
                MAX_IMAGE_BYTES
            )));
        }

        let img = image::load_from_memory(bytes)
            .map_err(|e| ClassifierError::DecodeError(format!("Failed to decode image: {}", e)))?;
        Ok(Self::from_image(&img))
    }

    /// Reads an image file and normalizes it.
    ///
    /// # Errors
    /// - `DecodeError` if the file cannot be read or decoded
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            ClassifierError::DecodeError(format!("Failed to open image {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Normalizes an already decoded image.
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = img
            .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
            .to_rgb8();

        let side = INPUT_SIZE as usize;
        let tensor = Array4::from_shape_fn((1, side, side, INPUT_CHANNELS), |(_, y, x, c)| {
            rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });
        Self(tensor)
    }

    /// An all-black input, used to probe models with a dynamic output shape.
    pub fn blank() -> Self {
        let side = INPUT_SIZE as usize;
        Self(Array4::zeros((1, side, side, INPUT_CHANNELS)))
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.0.view()
    }

    pub fn into_inner(self) -> Array4<f32> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_output_shape_and_range() {
        let img = RgbImage::from_fn(640, 320, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let tensor = ImageTensor::from_bytes(&encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)).unwrap();

        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!(tensor.view().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_solid_colour_is_scaled_by_255() {
        let img = RgbImage::from_pixel(50, 80, Rgb([255, 0, 51]));
        let tensor = ImageTensor::from_bytes(&encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)).unwrap();
        let view = tensor.view();

        assert!((view[[0, 10, 10, 0]] - 1.0).abs() < 1e-6);
        assert!(view[[0, 10, 10, 1]].abs() < 1e-6);
        assert!((view[[0, 10, 10, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_becomes_three_channels() {
        let img = GrayImage::from_pixel(30, 30, Luma([102]));
        let tensor = ImageTensor::from_bytes(&encode(DynamicImage::ImageLuma8(img), ImageFormat::Png)).unwrap();
        let view = tensor.view();

        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        for c in 0..3 {
            assert!((view[[0, 100, 100, c]] - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_alpha_channel_is_dropped() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 255, 0, 10]));
        let tensor = ImageTensor::from_bytes(&encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)).unwrap();

        assert_eq!(tensor.shape()[3], 3);
        assert!((tensor.view()[[0, 0, 0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_bytes() {
        let result = ImageTensor::from_bytes(b"definitely not a png");
        assert!(matches!(result, Err(ClassifierError::DecodeError(_))));
    }

    #[test]
    fn test_empty_bytes() {
        assert!(matches!(ImageTensor::from_bytes(&[]), Err(ClassifierError::DecodeError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ImageTensor::from_path("no/such/logo.png");
        assert!(matches!(result, Err(ClassifierError::DecodeError(_))));
    }

    #[test]
    fn test_blank_tensor() {
        let blank = ImageTensor::blank();
        assert_eq!(blank.shape(), &[1, 224, 224, 3]);
        assert!(blank.into_inner().iter().all(|&v| v == 0.0));
    }
}
