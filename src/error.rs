//! Error types for configuration and pipeline runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Resolution;

/// Boxed collaborator error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while resolving a [`RunConfig`](crate::config::RunConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid ROI ({x_min}, {y_min}, {x_max}, {y_max}): minimum must be below maximum on both axes")]
    InvalidRoi {
        x_min: f32,
        y_min: f32,
        x_max: f32,
        y_max: f32,
    },

    #[error("invalid ROI {0:?}: expected x_min,y_min,x_max,y_max")]
    RoiSyntax(String),

    #[error("skip interval must be at least 1")]
    ZeroSkipInterval,

    #[error("resize dimensions must be positive, got {width:?}x{height:?}")]
    ZeroResize {
        width: Option<u32>,
        height: Option<u32>,
    },

    #[error("confidence threshold {0} is outside [0, 1]")]
    Confidence(f32),

    #[error("failed to load font {path}")]
    Font {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

/// Errors that abort a pipeline run.
///
/// Startup variants are raised before the first cycle; the remaining variants
/// wrap a collaborator failure in the middle of a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not open video source {source_name}")]
    SourceUnavailable {
        source_name: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid video dimensions ({0}); the source may be corrupted or in an unsupported format")]
    InvalidResolution(Resolution),

    #[error("could not load detector model {model}")]
    DetectorUnavailable {
        model: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("could not initialize tracker")]
    TrackerUnavailable(#[source] BoxError),

    #[error("could not open frame sink")]
    SinkUnavailable(#[source] BoxError),

    #[error("frame acquisition failed at frame {frame_index}")]
    Source {
        frame_index: u64,
        #[source]
        source: BoxError,
    },

    #[error("detector failed at frame {frame_index}")]
    Detector {
        frame_index: u64,
        #[source]
        source: BoxError,
    },

    #[error("tracker failed at frame {frame_index}")]
    Tracker {
        frame_index: u64,
        #[source]
        source: BoxError,
    },

    #[error("frame sink failed at frame {frame_index}")]
    Sink {
        frame_index: u64,
        #[source]
        source: BoxError,
    },
}

impl PipelineError {
    /// True for failures raised before the processing loop starts.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::SourceUnavailable { .. }
                | Self::InvalidResolution(_)
                | Self::DetectorUnavailable { .. }
                | Self::TrackerUnavailable(_)
                | Self::SinkUnavailable(_)
        )
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
