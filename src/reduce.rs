//! Per-pixel reduction of ranked candidates to one result per scan position.
//!
//! Each pixel is reduced independently by a pure function, so grids can be
//! processed sequentially or, with the `rayon` feature and
//! `ReduceConfig::parallel`, in parallel. Both paths return identical grids
//! in row-major order.

use crate::candidate::matchset::MatchSet;
use crate::candidate::select::select;
use crate::candidate::template::{TemplateMatch, TemplateMatches};
use crate::grid::ScanGrid;
use crate::orientation::Euler;
use crate::reliability::{score, ReliabilityMetrics};
use crate::trace::{trace_event, trace_span};
use crate::util::OriMapResult;

/// Configuration for grid reductions.
#[derive(Clone, Debug, Default)]
pub struct ReduceConfig {
    /// Reduce pixels on the rayon thread pool (requires the `rayon` feature;
    /// ignored otherwise).
    pub parallel: bool,
}

/// Best phase and orientation at one scan position with its metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelResult {
    phase_index: usize,
    orientation: Euler,
    metrics: ReliabilityMetrics,
}

impl PixelResult {
    /// Phase index of the best candidate.
    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    /// Orientation of the best candidate (Bunge, degrees).
    pub fn orientation(&self) -> Euler {
        self.orientation
    }

    /// Fit and reliability metrics.
    pub fn metrics(&self) -> &ReliabilityMetrics {
        &self.metrics
    }
}

/// Reduces the vector-matching candidates of one scan position.
pub fn crystal_from_vector_matching(set: &MatchSet) -> PixelResult {
    let selection = select(set);
    PixelResult {
        phase_index: selection.best.phase_index(),
        orientation: selection.best.euler(),
        metrics: score(&selection),
    }
}

/// Reduces the template-matching table of one scan position.
pub fn crystal_from_template_matching(matches: &TemplateMatches) -> TemplateMatch {
    matches.best()
}

/// Reduces every pixel of a vector-matching grid.
pub fn reduce_vector_matching(
    grid: &ScanGrid<MatchSet>,
    cfg: &ReduceConfig,
) -> ScanGrid<PixelResult> {
    let _span = trace_span!(
        "reduce_vector_matching",
        width = grid.width(),
        height = grid.height(),
        parallel = cfg.parallel
    )
    .entered();
    let out = map_pixels(grid, cfg, crystal_from_vector_matching);
    trace_event!("pixels_reduced", count = out.len());
    out
}

/// Reduces every pixel of a template-matching grid.
pub fn reduce_template_matching(
    grid: &ScanGrid<TemplateMatches>,
    cfg: &ReduceConfig,
) -> ScanGrid<TemplateMatch> {
    let _span = trace_span!(
        "reduce_template_matching",
        width = grid.width(),
        height = grid.height(),
        parallel = cfg.parallel
    )
    .entered();
    let out = map_pixels(grid, cfg, crystal_from_template_matching);
    trace_event!("pixels_reduced", count = out.len());
    out
}

pub(crate) fn map_pixels<T, U, F>(grid: &ScanGrid<T>, cfg: &ReduceConfig, f: F) -> ScanGrid<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        if cfg.parallel {
            return grid.par_map(f);
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = cfg;
    grid.map(f)
}

/// Fallible `map_pixels`; both paths report the error of the lowest failing
/// pixel.
pub(crate) fn try_map_pixels<T, U, F>(
    grid: &ScanGrid<T>,
    cfg: &ReduceConfig,
    f: F,
) -> OriMapResult<ScanGrid<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> OriMapResult<U> + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        if cfg.parallel {
            return grid.try_par_map(f);
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = cfg;
    grid.try_map(f)
}
