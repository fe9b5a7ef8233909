mod rect;
mod roi;
mod scaling;

pub use rect::{Rect, Resolution};
pub use roi::{Roi, RoiSpec};
pub use scaling::{ProcessingSize, ScalingFactors};
