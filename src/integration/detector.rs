//! Trait for object detection inference backends.

use image::RgbImage;

use crate::detection::RawDetection;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the pipeline.
///
/// # Example
///
/// ```ignore
/// use detrack_rs::{Detector, RawDetection};
/// use image::RgbImage;
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl Detector for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, image: &RgbImage, conf_threshold: f32) -> Result<Vec<RawDetection>, Self::Error> {
///         // Run inference and return boxes scoring above `conf_threshold`
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Detector {
    /// Error type for detection failures.
    type Error;

    /// Run inference on an image and return detections.
    ///
    /// # Arguments
    /// * `image` - Frame at processing resolution; any positive size
    /// * `conf_threshold` - Minimum score of returned detections
    ///
    /// # Returns
    /// Detections in `image` pixel coordinates, in detector order.
    fn detect(
        &mut self,
        image: &RgbImage,
        conf_threshold: f32,
    ) -> Result<Vec<RawDetection>, Self::Error>;
}

impl<D: Detector + ?Sized> Detector for &mut D {
    type Error = D::Error;

    fn detect(
        &mut self,
        image: &RgbImage,
        conf_threshold: f32,
    ) -> Result<Vec<RawDetection>, Self::Error> {
        (**self).detect(image, conf_threshold)
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    type Error = D::Error;

    fn detect(
        &mut self,
        image: &RgbImage,
        conf_threshold: f32,
    ) -> Result<Vec<RawDetection>, Self::Error> {
        (**self).detect(image, conf_threshold)
    }
}

/// Helper trait for converting model-specific outputs to `RawDetection`.
///
/// Implement this for your model's output format to enable easy conversion.
pub trait IntoRawDetections {
    /// Convert the output into a vector of raw detections.
    fn into_raw_detections(self) -> Vec<RawDetection>;
}

impl IntoRawDetections for Vec<RawDetection> {
    fn into_raw_detections(self) -> Vec<RawDetection> {
        self
    }
}

/// Rows laid out as `[x1, y1, x2, y2, score, class]`, the usual layout of
/// post-NMS YOLO box tensors.
impl IntoRawDetections for Vec<[f32; 6]> {
    fn into_raw_detections(self) -> Vec<RawDetection> {
        self.into_iter()
            .map(|[x1, y1, x2, y2, score, class]| {
                RawDetection::new(x1, y1, x2, y2, score, class as u32)
            })
            .collect()
    }
}
