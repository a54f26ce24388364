//! Rendering of child output and the header line into a frame.

mod classifier;
pub mod header;
mod runes;

pub use classifier::{Classifier, RenderOutcome};
