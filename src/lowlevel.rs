//! Building blocks for custom reduction pipelines.
//!
//! These expose the selector, scorer and layout helpers behind the
//! high-level `TemplateMatchingResults` and `VectorMatchingResults` types.
//! Most users should prefer those.

pub use crate::candidate::select::{select, Selection};
pub use crate::grid::scan_coordinates;
pub use crate::library::{
    marker_inputs, peaks_from_best_template, peaks_from_template_grid, phase_name_index,
};
pub use crate::orientation::rotations_from_euler;
pub use crate::reduce::{reduce_template_matching, reduce_vector_matching};
pub use crate::reliability::{orientation_reliability, phase_reliability, score};
