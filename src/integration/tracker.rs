//! Trait for multi-object trackers and the tracks they report.

use image::RgbImage;

use crate::detection::Detection;
use crate::geometry::Rect;

/// Opaque, stable track identifier assigned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(String);

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A track reported by the tracker, in original-resolution coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub bbox: Rect,
    /// False while the tracker still considers the track tentative
    pub confirmed: bool,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, bbox: Rect, confirmed: bool) -> Self {
        Self {
            id: id.into(),
            bbox,
            confirmed,
        }
    }

    /// Build a track from TLBR corners `(x1, y1, x2, y2)`.
    pub fn from_tlbr(id: impl Into<TrackId>, tlbr: [f32; 4], confirmed: bool) -> Self {
        let [x1, y1, x2, y2] = tlbr;
        Self::new(id, Rect::from_tlbr(x1, y1, x2, y2), confirmed)
    }
}

/// Trait for multi-object trackers.
///
/// The tracker owns track history and identity association. It receives the
/// current detection set every cycle, including skip cycles where the set is
/// reused, together with the original frame for appearance matching.
pub trait MultiTracker {
    /// Error type for tracker failures.
    type Error;

    /// Update the tracker with this cycle's detections.
    ///
    /// Every active track appears at most once in the result.
    fn update(
        &mut self,
        detections: &[Detection],
        frame: &RgbImage,
    ) -> Result<Vec<Track>, Self::Error>;
}

impl<T: MultiTracker + ?Sized> MultiTracker for &mut T {
    type Error = T::Error;

    fn update(
        &mut self,
        detections: &[Detection],
        frame: &RgbImage,
    ) -> Result<Vec<Track>, Self::Error> {
        (**self).update(detections, frame)
    }
}

impl<T: MultiTracker + ?Sized> MultiTracker for Box<T> {
    type Error = T::Error;

    fn update(
        &mut self,
        detections: &[Detection],
        frame: &RgbImage,
    ) -> Result<Vec<Track>, Self::Error> {
        (**self).update(detections, frame)
    }
}
