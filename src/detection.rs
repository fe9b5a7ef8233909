//! Detection records and the normalization applied to detector output.

mod builder;
mod filter;
mod types;

pub use builder::DetectionBuilder;
pub use filter::{ClassFilter, DetectionFilter};
pub use types::{Detection, RawDetection};
