//! Annotation of display frames.
//!
//! Rendering always targets the original-resolution frame, never the resized
//! copy the detector sees.

mod annotate;
mod canvas;

pub use annotate::{AnnotationStyle, Annotator, Overlay};
pub use canvas::{Canvas, ImageCanvas};
