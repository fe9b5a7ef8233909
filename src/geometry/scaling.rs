//! Mapping between the processing resolution and the original resolution.

use std::num::NonZeroU32;

use crate::error::ConfigError;
use crate::geometry::rect::{Rect, Resolution};

/// Per-axis factors that take processing-resolution coordinates back to the
/// original resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingFactors {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl ScalingFactors {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Factors `(original / processing)` for each axis.
    ///
    /// Both resolutions must be non-empty; callers validate this at startup.
    pub fn between(original: Resolution, processing: Resolution) -> Self {
        if original == processing {
            return Self::IDENTITY;
        }
        Self {
            scale_x: original.width as f32 / processing.width as f32,
            scale_y: original.height as f32 / processing.height as f32,
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }

    /// Map `(x1, y1, x2, y2)` corners to the original resolution.
    #[inline]
    pub fn map_tlbr(&self, tlbr: [f32; 4]) -> [f32; 4] {
        if self.is_identity() {
            return tlbr;
        }
        let [x1, y1, x2, y2] = tlbr;
        [
            x1 * self.scale_x,
            y1 * self.scale_y,
            x2 * self.scale_x,
            y2 * self.scale_y,
        ]
    }

    /// Map a box to the original resolution, scaling both corners.
    pub fn map_rect(&self, rect: Rect) -> Rect {
        if self.is_identity() {
            return rect;
        }
        let [x1, y1, x2, y2] = self.map_tlbr(rect.to_tlbr());
        Rect::from_tlbr(x1, y1, x2, y2)
    }
}

impl Default for ScalingFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Requested processing size. A missing dimension falls back to the
/// original frame's dimension; a present one is never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSize {
    width: Option<NonZeroU32>,
    height: Option<NonZeroU32>,
}

impl ProcessingSize {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Result<Self, ConfigError> {
        let nonzero = |dim: Option<u32>| match dim {
            Some(value) => NonZeroU32::new(value)
                .map(Some)
                .ok_or(ConfigError::ZeroResize { width, height }),
            None => Ok(None),
        };
        Ok(Self {
            width: nonzero(width)?,
            height: nonzero(height)?,
        })
    }

    pub fn width(&self) -> Option<u32> {
        self.width.map(NonZeroU32::get)
    }

    pub fn height(&self) -> Option<u32> {
        self.height.map(NonZeroU32::get)
    }

    /// Process at the original resolution.
    pub fn original() -> Self {
        Self::default()
    }

    pub fn resolve(&self, original: Resolution) -> Resolution {
        Resolution {
            width: self.width().unwrap_or(original.width),
            height: self.height().unwrap_or(original.height),
        }
    }
}
