//! Match candidates and best/second-best selection.
//!
//! Includes the validated per-pixel match set for vector matching and the
//! channel table used by template matching.

pub(crate) mod matchset;
pub(crate) mod record;
pub(crate) mod select;
pub(crate) mod template;
