#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use logoguard::{BrandCatalog, ClassifierError, ImageTensor, LogoDetector, LogoModel};

/// Returns the same distribution for every image and counts its calls.
#[derive(Debug)]
pub struct FixedModel {
    scores: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedModel {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LogoModel for FixedModel {
    fn output_width(&self) -> usize {
        self.scores.len()
    }

    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        assert_eq!(input.shape(), &[1, 224, 224, 3]);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// A distribution over the built-in catalog with `confidence` on `brand` and
/// the remainder spread evenly over the other brands.
pub fn distribution_for(brand: &str, confidence: f32) -> Vec<f32> {
    let catalog = BrandCatalog::builtin();
    let index = catalog.position(brand).expect("brand in built-in catalog");
    let rest = (1.0 - confidence) / (catalog.len() - 1) as f32;
    (0..catalog.len())
        .map(|i| if i == index { confidence } else { rest })
        .collect()
}

pub fn detector_with(model: Arc<FixedModel>) -> LogoDetector {
    LogoDetector::builder()
        .with_model(model)
        .expect("model not yet set")
        .with_catalog(BrandCatalog::builtin())
        .build()
        .expect("catalog matches model width")
}

pub fn detector_for(brand: &str, confidence: f32) -> LogoDetector {
    detector_with(Arc::new(FixedModel::new(distribution_for(brand, confidence))))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 3) as u8, (y * 5) as u8, 200]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}
