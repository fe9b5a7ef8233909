use crate::geometry::{Rect, ScalingFactors};

/// Detector output unit in processing-resolution coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Confidence score, already past the detector's threshold
    pub score: f32,
    pub class_id: u32,
}

impl RawDetection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: u32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            score,
            class_id,
        }
    }

    #[inline]
    pub fn tlbr(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Convert to a [`Detection`] in original-resolution coordinates.
    pub fn to_original(&self, factors: &ScalingFactors) -> Detection {
        let [x1, y1, x2, y2] = factors.map_tlbr(self.tlbr());
        Detection {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            confidence: self.score,
            class_id: self.class_id,
        }
    }
}

/// Detection handed to the tracker, in original-resolution coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Detection confidence score in [0, 1]
    pub confidence: f32,
    pub class_id: u32,
}

impl Detection {
    pub fn new(bbox: Rect, confidence: f32, class_id: u32) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }

    /// Class id as the string label trackers receive.
    pub fn class_label(&self) -> String {
        self.class_id.to_string()
    }
}
