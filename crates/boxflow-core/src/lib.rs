//! Core types for the boxflow layout engine.
//!
//! This crate defines the vocabulary shared by every layout participant:
//! - Direction, justification and alignment rules
//! - Per-axis sizing modes
//! - Padding and axis helpers
//! - The error taxonomy

pub mod errors;
pub mod types;

pub use errors::LayoutError;
pub use types::{Alignment, Axis, Direction, Justification, Padding, SizingMode, SizingModes};
