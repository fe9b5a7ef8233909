//! Integration module for connecting detectors, trackers and video I/O with the pipeline.
//!
//! This module provides the traits the pipeline consumes. Concrete detectors,
//! trackers, sources and displays live outside this crate; the optional
//! `burn-backend` feature bundles a Burn detector adapter.

mod detector;
mod stream;
mod tracker;

pub use detector::{Detector, IntoRawDetections};
pub use stream::{FrameSink, SinkControl, VideoSource};
pub use tracker::{MultiTracker, Track, TrackId};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnDetector, BurnDetectorError, BurnModel, ModelOutput};
