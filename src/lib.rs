//! Per-frame detection-to-track pipeline.
//!
//! Frames are acquired from a [`VideoSource`], optionally downscaled for a
//! pluggable [`Detector`], and the detector's boxes are mapped back to the
//! original resolution, gated by class and region of interest, and handed to
//! a pluggable [`MultiTracker`]. Confirmed tracks are drawn onto the original
//! frame before it is presented to a [`FrameSink`].
//!
//! Detection runs on keyframes only; with a skip interval of `n`, every
//! `n`-th frame is a keyframe and the frames in between reuse its detections.

pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod integration;
pub mod pipeline;
pub mod render;
pub mod schedule;

pub use config::{ConfigFile, Overrides, Preset, PresetTable, RunConfig};
pub use detection::{ClassFilter, Detection, DetectionBuilder, DetectionFilter, RawDetection};
pub use error::{BoxError, ConfigError, PipelineError};
pub use geometry::{ProcessingSize, Rect, Resolution, Roi, ScalingFactors};
pub use integration::{
    Detector, FrameSink, IntoRawDetections, MultiTracker, SinkControl, Track, TrackId, VideoSource,
};
pub use pipeline::{CycleReport, RunSummary, Termination, TrackingPipeline};
pub use render::{AnnotationStyle, Annotator, Canvas, ImageCanvas, Overlay};
pub use schedule::{CycleKind, FrameCycleState, FrameScheduler};
