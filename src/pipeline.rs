//! Pipeline for combining detection with tracking.
//!
//! Each cycle runs to completion before the next begins:
//! acquire → resize → detect or reuse → map + filter → track → render → present.

use image::RgbImage;
use image::imageops::{self, FilterType};
use tracing::{debug, info, trace};

use crate::config::RunConfig;
use crate::detection::{Detection, DetectionFilter};
use crate::error::PipelineError;
use crate::geometry::{Resolution, ScalingFactors};
use crate::integration::{Detector, FrameSink, MultiTracker, SinkControl, Track, VideoSource};
use crate::render::{Annotator, Overlay};
use crate::schedule::{CycleKind, FrameScheduler};

/// Outcome of a single cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub frame_index: u64,
    pub kind: CycleKind,
    /// Detections handed to the tracker this cycle
    pub detections: Vec<Detection>,
    /// Tracks reported by the tracker, confirmed or not
    pub tracks: Vec<Track>,
    /// Confirmed tracks drawn onto the frame
    pub tracks_drawn: usize,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    EndOfStream,
    UserQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub keyframes: u64,
    pub termination: Termination,
}

/// A combined pipeline that bundles detection, filtering and tracking.
///
/// Construction validates the source resolution and fixes the processing
/// resolution and scaling factors for the lifetime of the pipeline.
pub struct TrackingPipeline<D: Detector, T: MultiTracker> {
    detector: D,
    tracker: T,
    config: RunConfig,
    filter: DetectionFilter,
    scheduler: FrameScheduler,
    annotator: Annotator,
    original: Resolution,
    processing: Resolution,
    factors: ScalingFactors,
}

impl<D, T> TrackingPipeline<D, T>
where
    D: Detector,
    D::Error: std::error::Error + Send + Sync + 'static,
    T: MultiTracker,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    /// Create a pipeline for a source reporting `source_resolution`.
    ///
    /// Fails with [`PipelineError::InvalidResolution`] when either dimension
    /// is zero.
    pub fn new(
        config: RunConfig,
        detector: D,
        tracker: T,
        source_resolution: Resolution,
    ) -> Result<Self, PipelineError> {
        if source_resolution.is_empty() {
            return Err(PipelineError::InvalidResolution(source_resolution));
        }
        let processing = config.processing.resolve(source_resolution);
        let factors = ScalingFactors::between(source_resolution, processing);

        info!(
            original = %source_resolution,
            processing = %processing,
            confidence = config.confidence,
            skip_interval = config.skip_interval.get(),
            "pipeline configured"
        );

        Ok(Self {
            detector,
            tracker,
            filter: config.detection_filter(),
            scheduler: FrameScheduler::new(config.skip_interval),
            annotator: Annotator::new(config.style.clone()),
            config,
            original: source_resolution,
            processing,
            factors,
        })
    }

    /// Replace the annotator, e.g. to supply a label font.
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    fn needs_resize(&self) -> bool {
        self.processing != self.original
    }

    /// Run one cycle on `frame`, annotating it in place.
    pub fn step(&mut self, frame: &mut RgbImage) -> Result<CycleReport, PipelineError> {
        let kind = self.scheduler.advance();
        let frame_index = self.scheduler.frame_index();

        if kind == CycleKind::Detect {
            let detections = self.detect(frame, frame_index)?;
            self.scheduler.replace_detections(detections);
        }
        let detections = self.scheduler.cached_detections().to_vec();

        let tracks = self
            .tracker
            .update(&detections, frame)
            .map_err(|e| PipelineError::Tracker {
                frame_index,
                source: Box::new(e),
            })?;

        let overlay = Overlay {
            tracks: &tracks,
            roi: self.filter.roi(),
            resized_to: self.needs_resize().then_some(self.processing),
        };
        let tracks_drawn = self.annotator.annotate_frame(frame, &overlay);

        trace!(
            frame_index,
            ?kind,
            detections = detections.len(),
            tracks = tracks.len(),
            tracks_drawn,
            "cycle complete"
        );

        Ok(CycleReport {
            frame_index,
            kind,
            detections,
            tracks,
            tracks_drawn,
        })
    }

    fn detect(&mut self, frame: &RgbImage, frame_index: u64) -> Result<Vec<Detection>, PipelineError> {
        let resized;
        let processing_frame = if self.needs_resize() {
            resized = imageops::resize(
                frame,
                self.processing.width,
                self.processing.height,
                FilterType::Triangle,
            );
            &resized
        } else {
            frame
        };

        let raw = self
            .detector
            .detect(processing_frame, self.config.confidence)
            .map_err(|e| PipelineError::Detector {
                frame_index,
                source: Box::new(e),
            })?;
        let raw_count = raw.len();

        let detections = self.filter.apply(raw, &self.factors);
        debug!(
            frame_index,
            raw = raw_count,
            kept = detections.len(),
            "keyframe detections"
        );
        Ok(detections)
    }

    /// Drive the pipeline until end of stream or a quit request.
    ///
    /// Both `source` and `sink` are released before returning, whether the
    /// run ends cleanly or with an error.
    pub fn run<S, K>(&mut self, mut source: S, mut sink: K) -> Result<RunSummary, PipelineError>
    where
        S: VideoSource,
        S::Error: std::error::Error + Send + Sync + 'static,
        K: FrameSink,
        K::Error: std::error::Error + Send + Sync + 'static,
    {
        let result = self.run_loop(&mut source, &mut sink);
        source.release();
        sink.release();

        if let Ok(summary) = &result {
            info!(
                frames = summary.frames,
                keyframes = summary.keyframes,
                termination = ?summary.termination,
                "run finished"
            );
        }
        result
    }

    fn run_loop<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunSummary, PipelineError>
    where
        S: VideoSource,
        S::Error: std::error::Error + Send + Sync + 'static,
        K: FrameSink,
        K::Error: std::error::Error + Send + Sync + 'static,
    {
        let mut frames = 0;
        let mut keyframes = 0;

        loop {
            let next_index = self.scheduler.frame_index() + 1;
            let Some(mut frame) = source.read_frame().map_err(|e| PipelineError::Source {
                frame_index: next_index,
                source: Box::new(e),
            })?
            else {
                return Ok(RunSummary {
                    frames,
                    keyframes,
                    termination: Termination::EndOfStream,
                });
            };

            let report = self.step(&mut frame)?;
            frames += 1;
            if report.kind == CycleKind::Detect {
                keyframes += 1;
            }

            let control = sink.present(&frame).map_err(|e| PipelineError::Sink {
                frame_index: report.frame_index,
                source: Box::new(e),
            })?;
            if control == SinkControl::Quit {
                return Ok(RunSummary {
                    frames,
                    keyframes,
                    termination: Termination::UserQuit,
                });
            }
        }
    }

    pub fn original_resolution(&self) -> Resolution {
        self.original
    }

    pub fn processing_resolution(&self) -> Resolution {
        self.processing
    }

    pub fn scaling_factors(&self) -> ScalingFactors {
        self.factors
    }

    /// Detections of the most recent keyframe.
    pub fn current_detections(&self) -> &[Detection] {
        self.scheduler.cached_detections()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::RawDetection;
    use crate::geometry::{ProcessingSize, Roi};
    use std::convert::Infallible;

    /// Returns a fixed set of detections and records the images it saw.
    struct MockDetector {
        detections: Vec<RawDetection>,
        seen: Vec<(Resolution, f32)>,
    }

    impl MockDetector {
        fn new(detections: Vec<RawDetection>) -> Self {
            Self {
                detections,
                seen: Vec::new(),
            }
        }
    }

    impl Detector for MockDetector {
        type Error = Infallible;

        fn detect(
            &mut self,
            image: &RgbImage,
            conf_threshold: f32,
        ) -> Result<Vec<RawDetection>, Self::Error> {
            self.seen
                .push((Resolution::new(image.width(), image.height()), conf_threshold));
            Ok(self.detections.clone())
        }
    }

    /// Confirms every detection as its own track.
    #[derive(Default)]
    struct EchoTracker {
        frames_seen: Vec<Resolution>,
    }

    impl MultiTracker for EchoTracker {
        type Error = Infallible;

        fn update(
            &mut self,
            detections: &[Detection],
            frame: &RgbImage,
        ) -> Result<Vec<Track>, Self::Error> {
            self.frames_seen
                .push(Resolution::new(frame.width(), frame.height()));
            Ok(detections
                .iter()
                .enumerate()
                .map(|(i, d)| Track::new(i as u64 + 1, d.bbox, true))
                .collect())
        }
    }

    fn frame(width: u32, height: u32) -> RgbImage {
        RgbImage::new(width, height)
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let result = TrackingPipeline::new(
            RunConfig::default(),
            MockDetector::new(vec![]),
            EchoTracker::default(),
            Resolution::new(0, 0),
        );
        assert!(matches!(result, Err(PipelineError::InvalidResolution(_))));
    }

    #[test]
    fn test_identity_processing_skips_resize() {
        let detector = MockDetector::new(vec![RawDetection::new(1.5, 2.25, 10.75, 20.125, 0.9, 0)]);
        let mut pipeline = TrackingPipeline::new(
            RunConfig::default(),
            detector,
            EchoTracker::default(),
            Resolution::new(64, 48),
        )
        .unwrap();

        assert!(pipeline.scaling_factors().is_identity());
        let report = pipeline.step(&mut frame(64, 48)).unwrap();

        assert_eq!(pipeline.detector().seen, vec![(Resolution::new(64, 48), 0.6)]);
        assert_eq!(report.detections[0].bbox.to_tlbr(), [1.5, 2.25, 10.75, 20.125]);
    }

    #[test]
    fn test_resized_detection_is_mapped_back() {
        let config = RunConfig::default()
            .with_processing(ProcessingSize::new(Some(32), Some(24)).unwrap());
        let detector = MockDetector::new(vec![RawDetection::new(1.0, 2.0, 5.0, 6.0, 0.9, 0)]);
        let mut pipeline =
            TrackingPipeline::new(config, detector, EchoTracker::default(), Resolution::new(64, 48))
                .unwrap();

        let report = pipeline.step(&mut frame(64, 48)).unwrap();

        // Detector sees the shrunk copy, tracker sees the original frame.
        assert_eq!(pipeline.detector().seen[0].0, Resolution::new(32, 24));
        assert_eq!(pipeline.tracker().frames_seen, vec![Resolution::new(64, 48)]);
        assert_eq!(report.detections[0].bbox.to_tlbr(), [2.0, 4.0, 10.0, 12.0]);
    }

    #[test]
    fn test_skip_cycles_reuse_cache() {
        let config = RunConfig::default().with_skip_interval(2).unwrap();
        let detector = MockDetector::new(vec![RawDetection::new(0.0, 0.0, 4.0, 4.0, 0.9, 0)]);
        let mut pipeline =
            TrackingPipeline::new(config, detector, EchoTracker::default(), Resolution::new(16, 16))
                .unwrap();

        let first = pipeline.step(&mut frame(16, 16)).unwrap();
        assert_eq!(first.kind, CycleKind::Reuse);
        assert!(first.detections.is_empty());

        let second = pipeline.step(&mut frame(16, 16)).unwrap();
        assert_eq!(second.kind, CycleKind::Detect);
        assert_eq!(second.detections.len(), 1);

        pipeline.detector_mut().detections.clear();
        let third = pipeline.step(&mut frame(16, 16)).unwrap();
        assert_eq!(third.kind, CycleKind::Reuse);
        assert_eq!(third.detections, second.detections);

        // The detector ran once; the tracker ran every cycle.
        assert_eq!(pipeline.detector().seen.len(), 1);
        assert_eq!(pipeline.tracker().frames_seen.len(), 3);
    }

    #[test]
    fn test_filtered_detections_reach_tracker() {
        let config = RunConfig::default()
            .with_classes([0])
            .with_roi(Roi::new(50.0, 0.0, 1250.0, 700.0).unwrap());
        let detector = MockDetector::new(vec![
            RawDetection::new(100.0, 100.0, 200.0, 200.0, 0.9, 0),
            RawDetection::new(100.0, 100.0, 200.0, 200.0, 0.9, 2),
            RawDetection::new(10.0, 10.0, 60.0, 60.0, 0.9, 0),
        ]);
        let mut pipeline = TrackingPipeline::new(
            config,
            detector,
            EchoTracker::default(),
            Resolution::new(1280, 720),
        )
        .unwrap();

        let report = pipeline.step(&mut frame(1280, 720)).unwrap();
        assert_eq!(report.detections.len(), 1);
        assert_eq!(report.tracks_drawn, 1);
        assert_eq!(pipeline.current_detections(), report.detections.as_slice());
    }
}
