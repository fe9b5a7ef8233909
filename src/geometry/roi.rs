use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::rect::Rect;

/// Region of interest in original-resolution coordinates.
///
/// Immutable once constructed; `x_min < x_max` and `y_min < y_max` always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RoiSpec", into = "RoiSpec")]
pub struct Roi {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
    label: Option<String>,
}

impl Roi {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Result<Self, ConfigError> {
        if !(x_min < x_max && y_min < y_max) {
            return Err(ConfigError::InvalidRoi {
                x_min,
                y_min,
                x_max,
                y_max,
            });
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
            label: None,
        })
    }

    /// Attach the caption drawn next to the ROI overlay.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn x_min(&self) -> f32 {
        self.x_min
    }

    pub fn y_min(&self) -> f32 {
        self.y_min
    }

    pub fn x_max(&self) -> f32 {
        self.x_max
    }

    pub fn y_max(&self) -> f32 {
        self.y_max
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn rect(&self) -> Rect {
        Rect::from_tlbr(self.x_min, self.y_min, self.x_max, self.y_max)
    }

    /// True when `bbox` lies entirely inside the region, boundary inclusive.
    ///
    /// Boxes that only partially overlap are not contained.
    pub fn contains(&self, bbox: &Rect) -> bool {
        let [x1, y1, x2, y2] = bbox.to_tlbr();
        x1 >= self.x_min && x2 <= self.x_max && y1 >= self.y_min && y2 <= self.y_max
    }
}

impl std::str::FromStr for Roi {
    type Err = ConfigError;

    /// Parse `x_min,y_min,x_max,y_max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::RoiSyntax(s.to_string()))?;
        match parts.as_slice() {
            [x_min, y_min, x_max, y_max] => Roi::new(*x_min, *y_min, *x_max, *y_max),
            _ => Err(ConfigError::RoiSyntax(s.to_string())),
        }
    }
}

/// On-disk form of a [`Roi`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiSpec {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TryFrom<RoiSpec> for Roi {
    type Error = ConfigError;

    fn try_from(spec: RoiSpec) -> Result<Self, Self::Error> {
        let roi = Roi::new(spec.x_min, spec.y_min, spec.x_max, spec.y_max)?;
        Ok(match spec.label {
            Some(label) => roi.with_label(label),
            None => roi,
        })
    }
}

impl From<Roi> for RoiSpec {
    fn from(roi: Roi) -> Self {
        Self {
            x_min: roi.x_min,
            y_min: roi.y_min,
            x_max: roi.x_max,
            y_max: roi.y_max,
            label: roi.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane() -> Roi {
        Roi::new(50.0, 0.0, 1250.0, 700.0).unwrap()
    }

    #[test]
    fn test_contains_inside() {
        assert!(lane().contains(&Rect::from_tlbr(100.0, 100.0, 200.0, 200.0)));
    }

    #[test]
    fn test_partial_overlap_rejected() {
        assert!(!lane().contains(&Rect::from_tlbr(10.0, 10.0, 60.0, 60.0)));
        assert!(!lane().contains(&Rect::from_tlbr(1200.0, 600.0, 1300.0, 650.0)));
        assert!(!lane().contains(&Rect::from_tlbr(100.0, 650.0, 200.0, 701.0)));
    }

    #[test]
    fn test_boundary_inclusive() {
        assert!(lane().contains(&Rect::from_tlbr(50.0, 0.0, 1250.0, 700.0)));
    }

    #[test]
    fn test_degenerate_rejected() {
        assert!(Roi::new(100.0, 0.0, 100.0, 10.0).is_err());
        assert!(Roi::new(0.0, 20.0, 10.0, 5.0).is_err());
        assert!(Roi::new(f32::NAN, 0.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn test_parse() {
        let roi: Roi = "50, 0, 1250, 700".parse().unwrap();
        assert_eq!(roi, lane());
        assert!("50,0,1250".parse::<Roi>().is_err());
        assert!("a,b,c,d".parse::<Roi>().is_err());
        assert!("1250,0,50,700".parse::<Roi>().is_err());
    }
}
