//! Class and region-of-interest gating for raw detector output.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::detection::{Detection, RawDetection};
use crate::geometry::{Roi, ScalingFactors};

/// Allow-set of class ids. An empty set admits every class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct ClassFilter {
    allowed: HashSet<u32>,
}

impl ClassFilter {
    pub fn new(classes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            allowed: classes.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    #[inline]
    pub fn admits(&self, class_id: u32) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&class_id)
    }

    /// Allowed ids in ascending order.
    pub fn sorted(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.allowed.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl From<Vec<u32>> for ClassFilter {
    fn from(classes: Vec<u32>) -> Self {
        Self::new(classes)
    }
}

impl From<ClassFilter> for Vec<u32> {
    fn from(filter: ClassFilter) -> Self {
        filter.sorted()
    }
}

/// Decides which detections reach the tracker.
///
/// Confidence is not checked here: the detector receives the threshold and
/// only returns boxes above it.
#[derive(Debug, Clone, Default)]
pub struct DetectionFilter {
    classes: Option<ClassFilter>,
    roi: Option<Roi>,
}

impl DetectionFilter {
    pub fn new(classes: Option<ClassFilter>, roi: Option<Roi>) -> Self {
        Self {
            classes: classes.filter(|c| !c.is_empty()),
            roi,
        }
    }

    pub fn roi(&self) -> Option<&Roi> {
        self.roi.as_ref()
    }

    #[inline]
    fn admits_class(&self, class_id: u32) -> bool {
        self.classes.as_ref().is_none_or(|c| c.admits(class_id))
    }

    /// Whether an original-resolution detection passes both gates.
    pub fn admits(&self, detection: &Detection) -> bool {
        self.admits_class(detection.class_id)
            && self.roi.as_ref().is_none_or(|roi| roi.contains(&detection.bbox))
    }

    /// Map raw detections to the original resolution and keep the admitted
    /// ones, preserving input order.
    pub fn apply<I>(&self, raw: I, factors: &ScalingFactors) -> Vec<Detection>
    where
        I: IntoIterator<Item = RawDetection>,
    {
        raw.into_iter()
            .filter(|r| self.admits_class(r.class_id))
            .map(|r| r.to_original(factors))
            .filter(|d| self.roi.as_ref().is_none_or(|roi| roi.contains(&d.bbox)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Resolution;

    fn raw(x1: f32, y1: f32, x2: f32, y2: f32, class_id: u32) -> RawDetection {
        RawDetection::new(x1, y1, x2, y2, 0.9, class_id)
    }

    fn lane() -> Roi {
        Roi::new(50.0, 0.0, 1250.0, 700.0).unwrap()
    }

    #[test]
    fn test_roi_gate() {
        let filter = DetectionFilter::new(None, Some(lane()));
        let kept = filter.apply(
            vec![
                raw(100.0, 100.0, 200.0, 200.0, 0),
                raw(10.0, 10.0, 60.0, 60.0, 0),
                raw(50.0, 0.0, 1250.0, 700.0, 0),
            ],
            &ScalingFactors::IDENTITY,
        );

        let boxes: Vec<[f32; 4]> = kept.iter().map(|d| d.bbox.to_tlbr()).collect();
        assert_eq!(
            boxes,
            vec![[100.0, 100.0, 200.0, 200.0], [50.0, 0.0, 1250.0, 700.0]]
        );
    }

    #[test]
    fn test_class_gate() {
        let filter = DetectionFilter::new(Some(ClassFilter::new([0])), None);
        let low_score = RawDetection::new(0.0, 0.0, 5.0, 5.0, 0.11, 0);
        let kept = filter.apply(
            vec![raw(0.0, 0.0, 10.0, 10.0, 2), low_score],
            &ScalingFactors::IDENTITY,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_id, 0);
        assert_eq!(kept[0].confidence, 0.11);
    }

    #[test]
    fn test_empty_class_set_admits_all() {
        let filter = DetectionFilter::new(Some(ClassFilter::default()), None);
        let kept = filter.apply(
            vec![raw(0.0, 0.0, 1.0, 1.0, 7), raw(0.0, 0.0, 1.0, 1.0, 3)],
            &ScalingFactors::IDENTITY,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_roi_applies_after_scaling() {
        // Inside the ROI at processing resolution, a partial overlap once scaled.
        let factors = ScalingFactors::between(Resolution::new(1280, 720), Resolution::new(640, 360));
        let filter = DetectionFilter::new(None, Some(lane()));
        let kept = filter.apply(
            vec![raw(30.0, 10.0, 100.0, 100.0, 0), raw(20.0, 10.0, 100.0, 100.0, 0)],
            &factors,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bbox.to_tlbr(), [60.0, 20.0, 200.0, 200.0]);
    }

    #[test]
    fn test_order_preserved() {
        let filter = DetectionFilter::new(Some(ClassFilter::new([1, 2])), None);
        let kept = filter.apply(
            vec![
                raw(3.0, 0.0, 4.0, 1.0, 2),
                raw(1.0, 0.0, 2.0, 1.0, 5),
                raw(2.0, 0.0, 3.0, 1.0, 1),
            ],
            &ScalingFactors::IDENTITY,
        );
        let xs: Vec<f32> = kept.iter().map(|d| d.bbox.x).collect();
        assert_eq!(xs, vec![3.0, 2.0]);
    }

    #[test]
    fn test_admits_detection() {
        let filter = DetectionFilter::new(Some(ClassFilter::new([0])), Some(lane()));
        let inside = raw(100.0, 100.0, 200.0, 200.0, 0).to_original(&ScalingFactors::IDENTITY);
        let wrong_class = raw(100.0, 100.0, 200.0, 200.0, 1).to_original(&ScalingFactors::IDENTITY);
        assert!(filter.admits(&inside));
        assert!(!filter.admits(&wrong_class));
    }
}
