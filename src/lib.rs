//! orimap reduces ranked phase/orientation candidates from diffraction
//! pattern indexing into per-pixel crystallographic maps.
//!
//! For every scan position the best candidate is selected and scored against
//! its runner-ups: a phase reliability against the best candidate of another
//! phase, and an orientation reliability against the next candidate of the
//! same phase. Grids of per-pixel results are then flattened into
//! crystal-map input (phase ids, crystal-to-lab quaternions, coordinates and
//! named properties). Pixel reductions can run in parallel via the `rayon`
//! feature.

mod candidate;
pub mod grid;
pub mod library;
pub mod lowlevel;
pub mod orientation;
pub mod reduce;
pub mod reliability;
pub mod results;
mod trace;
pub mod util;
pub mod xmap;

pub use candidate::matchset::MatchSet;
pub use candidate::record::MatchCandidate;
pub use candidate::template::{TemplateMatch, TemplateMatches, TEMPLATE_CHANNELS};
pub use grid::ScanGrid;
pub use library::{DiffractionLibrary, MarkerLayer, SimulationLibrary};
pub use orientation::Euler;
pub use reduce::{
    crystal_from_template_matching, crystal_from_vector_matching, PixelResult, ReduceConfig,
};
pub use reliability::ReliabilityMetrics;
pub use results::{
    DiffractionVectors, HklAssignment, Hkls, TemplateMatchingResults, VectorMatchingResults,
};
pub use util::{OriMapError, OriMapResult};
pub use xmap::{CrystalMapInput, PropertyTable};
