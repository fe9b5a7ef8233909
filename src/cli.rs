//! Command-line surface and startup sequence.
//!
//! The crate does not ship concrete detectors, trackers or video I/O. A
//! binary implements [`Backends`] for its collaborators and calls [`run`]:
//!
//! ```ignore
//! fn main() -> std::process::ExitCode {
//!     tracing_subscriber::fmt::init();
//!     let args = detrack_rs::cli::Args::parse_args();
//!     detrack_rs::cli::exit_status(&detrack_rs::cli::run(&args, MyBackends::default()))
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ab_glyph::FontArc;
use clap::Parser;
use tracing::info;

use crate::config::{ConfigFile, Overrides, RunConfig};
use crate::error::{BoxError, ConfigError, PipelineError};
use crate::geometry::Roi;
use crate::integration::{Detector, FrameSink, MultiTracker, VideoSource};
use crate::pipeline::{RunSummary, TrackingPipeline};
use crate::render::Annotator;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Detect, track and annotate objects in a video", long_about = None)]
pub struct Args {
    /// Video source to process
    #[arg(long)]
    pub video: PathBuf,

    /// Detector model identifier or path
    #[arg(long)]
    pub model: PathBuf,

    /// Confidence threshold handed to the detector [default: 0.6]
    #[arg(long)]
    pub conf: Option<f32>,

    /// Run detection on every N-th frame [default: 1]
    #[arg(long)]
    pub skip_frames: Option<u32>,

    /// Frame width used for detection
    #[arg(long)]
    pub resize_width: Option<u32>,

    /// Frame height used for detection
    #[arg(long)]
    pub resize_height: Option<u32>,

    /// Only keep these class ids
    #[arg(long, num_args = 1..)]
    pub filter_classes: Option<Vec<u32>>,

    /// Region of interest as x_min,y_min,x_max,y_max
    #[arg(long)]
    pub roi: Option<Roi>,

    /// Caption drawn next to the --roi region
    #[arg(long, requires = "roi")]
    pub roi_label: Option<String>,

    /// TOML config file with defaults and presets
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TrueType font used for labels
    #[arg(long)]
    pub font: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            confidence: self.conf,
            skip_frames: self.skip_frames,
            resize_width: self.resize_width,
            resize_height: self.resize_height,
            classes: self.filter_classes.clone(),
            roi: self.roi.clone().map(|roi| match &self.roi_label {
                Some(label) => roi.with_label(label.clone()),
                None => roi,
            }),
        }
    }

    /// Resolve the run configuration from the config file, flags and presets.
    pub fn resolve_config(&self) -> Result<RunConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        RunConfig::resolve(file, self.overrides(), &self.video.to_string_lossy())
    }
}

/// Factory for the collaborators of a run.
pub trait Backends {
    type Detector: Detector<Error: std::error::Error + Send + Sync + 'static>;
    type Tracker: MultiTracker<Error: std::error::Error + Send + Sync + 'static>;
    type Source: VideoSource<Error: std::error::Error + Send + Sync + 'static>;
    type Sink: FrameSink<Error: std::error::Error + Send + Sync + 'static>;

    fn load_detector(&mut self, model: &Path) -> Result<Self::Detector, BoxError>;

    fn tracker(&mut self) -> Result<Self::Tracker, BoxError>;

    fn open_source(&mut self, video: &Path) -> Result<Self::Source, BoxError>;

    fn open_sink(&mut self) -> Result<Self::Sink, BoxError>;
}

/// Start and drive a run.
///
/// Startup failures (config, model, source, zero-sized frames, sink) abort
/// before the first cycle.
pub fn run<B>(args: &Args, mut backends: B) -> Result<RunSummary, PipelineError>
where
    B: Backends,
    <B::Detector as Detector>::Error: std::error::Error + Send + Sync + 'static,
    <B::Tracker as MultiTracker>::Error: std::error::Error + Send + Sync + 'static,
    <B::Source as VideoSource>::Error: std::error::Error + Send + Sync + 'static,
    <B::Sink as FrameSink>::Error: std::error::Error + Send + Sync + 'static,
{
    let config = args.resolve_config()?;

    let annotator = match &args.font {
        Some(path) => Annotator::new(config.style.clone()).with_font(load_font(path)?),
        None => Annotator::new(config.style.clone()),
    };

    let detector = backends
        .load_detector(&args.model)
        .map_err(|source| PipelineError::DetectorUnavailable {
            model: args.model.clone(),
            source,
        })?;
    let tracker = backends.tracker().map_err(PipelineError::TrackerUnavailable)?;

    let mut source =
        backends
            .open_source(&args.video)
            .map_err(|source| PipelineError::SourceUnavailable {
                source_name: args.video.display().to_string(),
                source,
            })?;

    let resolution = source.resolution();
    let mut pipeline = match TrackingPipeline::new(config, detector, tracker, resolution) {
        Ok(pipeline) => pipeline.with_annotator(annotator),
        Err(err) => {
            source.release();
            return Err(err);
        }
    };

    let sink = match backends.open_sink() {
        Ok(sink) => sink,
        Err(err) => {
            source.release();
            return Err(PipelineError::SinkUnavailable(err));
        }
    };

    info!(video = %args.video.display(), "starting run");
    pipeline.run(source, sink)
}

fn load_font(path: &Path) -> Result<FontArc, ConfigError> {
    let font_error = |source: BoxError| ConfigError::Font {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(|e| font_error(Box::new(e)))?;
    FontArc::try_from_vec(bytes).map_err(|e| font_error(Box::new(e)))
}

/// Map a run result to a process exit status, printing failures to stderr.
///
/// Clean end of stream and user quit exit silently with status 0.
pub fn exit_status(result: &Result<RunSummary, PipelineError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            let mut cause = std::error::Error::source(err);
            while let Some(inner) = cause {
                eprintln!("  caused by: {inner}");
                cause = inner.source();
            }
            ExitCode::from(err.exit_code())
        }
    }
}
