//! Correction rules and the text substitution engine.
//!
//! This module holds the business logic that is independent of any file
//! format: the ordered correction map, the built-in presets, and the two
//! renderings (plain output and highlighted display).

pub mod corrections;
pub mod presets;

pub use corrections::{Correction, CorrectionMap};
pub use presets::{Preset, PRESETS};
