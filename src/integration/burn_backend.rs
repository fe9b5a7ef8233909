//! Burn inference backend for object detection.
//!
//! This module provides a `BurnDetector` that implements `Detector`
//! for running object detection models built with the Burn framework.
//!
//! # Example
//!
//! ```ignore
//! use detrack_rs::integration::{BurnDetector, BurnModel, ModelOutput};
//! use burn::backend::NdArray;
//!
//! // Implement BurnModel for your detection model
//! struct MyYoloModel { /* ... */ }
//!
//! impl BurnModel<NdArray> for MyYoloModel {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<ModelOutput> {
//!         // Run inference
//!     }
//! }
//!
//! let model = MyYoloModel::load("model.bin");
//! let detector = BurnDetector::new(model, Default::default());
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array3;
use thiserror::Error;

use crate::detection::{DetectionBuilder, RawDetection};
use crate::geometry::{Resolution, ScalingFactors};
use crate::integration::Detector;

/// Error type for Burn detection failures.
#[derive(Debug, Clone, Error)]
pub enum BurnDetectorError {
    /// Input image has a zero dimension.
    #[error("invalid input dimensions {0}")]
    EmptyInput(Resolution),
    /// Preprocessing failed.
    #[error("preprocessing error: {0}")]
    Preprocessing(String),
}

/// Raw output of the model before thresholding.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Bounding box: [x1, y1, x2, y2] or [cx, cy, w, h] depending on model
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Class ID (optional, for multi-class detection)
    pub class_id: Option<u32>,
}

/// Trait for Burn-based detection models.
///
/// Implement this trait for your specific model architecture.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on the input tensor.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape [batch, channels, height, width]
    ///
    /// # Returns
    /// Vector of model outputs in model-input pixel coordinates.
    fn forward(&self, input: Tensor<B, 4>) -> Vec<ModelOutput>;

    /// Get the expected input size (channels, height, width).
    fn input_size(&self) -> (u32, u32, u32) {
        (3, 640, 640) // Default YOLO input size
    }

    /// Whether bbox output is in XYWH format (vs TLBR).
    fn bbox_is_xywh(&self) -> bool {
        true // Most YOLO variants use XYWH
    }
}

/// Burn-based object detector implementing `Detector`.
pub struct BurnDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
}

impl<B: Backend, M: BurnModel<B>> BurnDetector<B, M> {
    /// Create a new Burn detector with the given model and device.
    pub fn new(model: M, device: B::Device) -> Self {
        Self { model, device }
    }

    fn model_resolution(&self) -> Resolution {
        let (_, height, width) = self.model.input_size();
        Resolution::new(width, height)
    }

    /// Resize an RGB image to the model input and lay it out as a
    /// normalized `[1, C, H, W]` tensor.
    pub fn preprocess(&self, image: &RgbImage) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let input = Resolution::new(image.width(), image.height());
        if input.is_empty() {
            return Err(BurnDetectorError::EmptyInput(input));
        }

        let target = self.model_resolution();
        let resized;
        let pixels = if input == target {
            image
        } else {
            resized = imageops::resize(image, target.width, target.height, FilterType::Triangle);
            &resized
        };

        let hwc = Array3::from_shape_vec(
            (target.height as usize, target.width as usize, 3),
            pixels.as_raw().clone(),
        )
        .map_err(|e| BurnDetectorError::Preprocessing(e.to_string()))?;

        // HWC -> CHW, normalized to [0, 1]
        let data: Vec<f32> = hwc
            .permuted_axes([2, 0, 1])
            .iter()
            .map(|&x| x as f32 / 255.0)
            .collect();

        Ok(
            Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape([
                1,
                3,
                target.height as usize,
                target.width as usize,
            ]),
        )
    }

    /// Threshold model outputs and map them back to `input` coordinates.
    fn postprocess(
        &self,
        outputs: Vec<ModelOutput>,
        input: Resolution,
        conf_threshold: f32,
    ) -> Vec<RawDetection> {
        let factors = ScalingFactors::between(input, self.model_resolution());
        outputs
            .into_iter()
            .filter(|o| o.score >= conf_threshold)
            .map(|o| {
                let builder = DetectionBuilder::new()
                    .score(o.score)
                    .class_id(o.class_id.unwrap_or(0));
                let [a, b, c, d] = o.bbox;
                let raw = if self.model.bbox_is_xywh() {
                    builder.xywh(a, b, c, d).build()
                } else {
                    builder.tlbr(a, b, c, d).build()
                };
                let [x1, y1, x2, y2] = factors.map_tlbr(raw.tlbr());
                RawDetection::new(x1, y1, x2, y2, raw.score, raw.class_id)
            })
            .collect()
    }
}

impl<B: Backend, M: BurnModel<B>> Detector for BurnDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(
        &mut self,
        image: &RgbImage,
        conf_threshold: f32,
    ) -> Result<Vec<RawDetection>, Self::Error> {
        let tensor = self.preprocess(image)?;
        let outputs = self.model.forward(tensor);
        Ok(self.postprocess(
            outputs,
            Resolution::new(image.width(), image.height()),
            conf_threshold,
        ))
    }
}
