//! Keyframe scheduling and the detection cache reused between keyframes.

use std::num::NonZeroU32;

use crate::detection::Detection;

/// What a cycle does with the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Run the detector and replace the cached detections.
    Detect,
    /// Skip the detector and reuse the cached detections.
    Reuse,
}

/// Cross-cycle state: the frame counter and the most recent keyframe's detections.
#[derive(Debug, Clone, Default)]
pub struct FrameCycleState {
    /// Index of the current frame; 0 before the first frame, then 1, 2, ...
    pub frame_index: u64,
    pub cached_detections: Vec<Detection>,
}

/// Decides per frame whether to detect or reuse.
///
/// Frame `n` (1-based) is a keyframe when `n % skip_interval == 0`. With an
/// interval of 1 every frame is a keyframe. Frames before the first keyframe
/// see an empty cache.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    skip_interval: NonZeroU32,
    state: FrameCycleState,
}

impl FrameScheduler {
    pub fn new(skip_interval: NonZeroU32) -> Self {
        Self {
            skip_interval,
            state: FrameCycleState::default(),
        }
    }

    /// Scheduler that detects on every frame.
    pub fn every_frame() -> Self {
        Self::new(NonZeroU32::MIN)
    }

    pub fn skip_interval(&self) -> NonZeroU32 {
        self.skip_interval
    }

    /// Count a newly acquired frame and decide what this cycle does.
    pub fn advance(&mut self) -> CycleKind {
        self.state.frame_index += 1;
        if self.state.frame_index % u64::from(self.skip_interval.get()) == 0 {
            CycleKind::Detect
        } else {
            CycleKind::Reuse
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.state.frame_index
    }

    pub fn cached_detections(&self) -> &[Detection] {
        &self.state.cached_detections
    }

    /// Replace the cache wholesale with a keyframe's detections.
    pub fn replace_detections(&mut self, detections: Vec<Detection>) {
        self.state.cached_detections = detections;
    }

    pub fn state(&self) -> &FrameCycleState {
        &self.state
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::every_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn interval(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn det(x: f32) -> Detection {
        Detection::new(Rect::new(x, 0.0, 1.0, 1.0), 0.9, 0)
    }

    #[test]
    fn test_every_frame_detects() {
        let mut scheduler = FrameScheduler::every_frame();
        for expected_index in 1..=5 {
            assert_eq!(scheduler.advance(), CycleKind::Detect);
            assert_eq!(scheduler.frame_index(), expected_index);
        }
    }

    #[test]
    fn test_skip_interval_three() {
        let mut scheduler = FrameScheduler::new(interval(3));

        // Frames 1 and 2 reuse the initially empty cache.
        assert_eq!(scheduler.advance(), CycleKind::Reuse);
        assert!(scheduler.cached_detections().is_empty());
        assert_eq!(scheduler.advance(), CycleKind::Reuse);
        assert!(scheduler.cached_detections().is_empty());

        assert_eq!(scheduler.advance(), CycleKind::Detect);
        scheduler.replace_detections(vec![det(3.0)]);

        assert_eq!(scheduler.advance(), CycleKind::Reuse);
        assert_eq!(scheduler.cached_detections(), &[det(3.0)]);
        assert_eq!(scheduler.advance(), CycleKind::Reuse);
        assert_eq!(scheduler.cached_detections(), &[det(3.0)]);

        assert_eq!(scheduler.advance(), CycleKind::Detect);
        assert_eq!(scheduler.frame_index(), 6);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut scheduler = FrameScheduler::every_frame();
        scheduler.advance();
        scheduler.replace_detections(vec![det(1.0), det(2.0)]);
        scheduler.advance();
        scheduler.replace_detections(vec![det(9.0)]);
        assert_eq!(scheduler.cached_detections(), &[det(9.0)]);

        scheduler.advance();
        scheduler.replace_detections(Vec::new());
        assert!(scheduler.state().cached_detections.is_empty());
    }
}
