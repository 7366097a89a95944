//! Indexation results over a scan and their reduction to crystal maps.
//!
//! `TemplateMatchingResults` holds a ranked template table per pixel and
//! reduces to a crystal map by taking the highest score. `VectorMatchingResults`
//! holds a match set per pixel; its per-pixel reduction and property columns
//! are available, but exporting it as a crystal map is not supported yet.

use crate::candidate::matchset::MatchSet;
use crate::candidate::template::{TemplateMatch, TemplateMatches};
use crate::grid::ScanGrid;
use crate::library::{marker_inputs, peaks_from_template_grid, DiffractionLibrary, MarkerLayer};
use crate::reduce::{reduce_template_matching, reduce_vector_matching, PixelResult, ReduceConfig};
use crate::trace::trace_warn;
use crate::util::{OriMapError, OriMapResult};
use crate::xmap::{CrystalMapInput, PropertyTable};

/// Miller indices of every diffraction vector at every pixel.
pub type Hkls = ScanGrid<Vec<[i32; 3]>>;

/// Template-matching results: a ranked table of matches per pixel.
#[derive(Clone, Debug)]
pub struct TemplateMatchingResults {
    data: ScanGrid<TemplateMatches>,
    cfg: ReduceConfig,
}

impl TemplateMatchingResults {
    /// Wraps a grid of per-pixel template tables.
    pub fn new(data: ScanGrid<TemplateMatches>) -> Self {
        Self {
            data,
            cfg: ReduceConfig::default(),
        }
    }

    /// Replaces the reduction configuration.
    pub fn with_config(mut self, cfg: ReduceConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Per-pixel template tables.
    pub fn data(&self) -> &ScanGrid<TemplateMatches> {
        &self.data
    }

    /// Highest-score match of every pixel.
    pub fn best_matches(&self) -> ScanGrid<TemplateMatch> {
        reduce_template_matching(&self.data, &self.cfg)
    }

    /// Reduces to one phase/orientation/score per pixel.
    pub fn to_crystal_map(&self) -> OriMapResult<CrystalMapInput> {
        Ok(CrystalMapInput::from_template_matches(&self.best_matches()))
    }

    /// Simulated peaks of the best match at every pixel, in-plane only.
    pub fn best_matching_peaks<L>(&self, library: &L) -> OriMapResult<ScanGrid<Vec<[f64; 2]>>>
    where
        L: DiffractionLibrary + Sync + ?Sized,
    {
        peaks_from_template_grid(&self.data, library, 0, &self.cfg)
    }

    /// Marker layers for overlaying the best-match peaks on a signal.
    pub fn marker_inputs<L>(&self, library: &L) -> OriMapResult<Vec<MarkerLayer>>
    where
        L: DiffractionLibrary + Sync + ?Sized,
    {
        marker_inputs(&self.best_matching_peaks(library)?)
    }
}

/// Diffraction vectors of a scan with an optional Miller-index assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffractionVectors {
    /// In-plane vector coordinates per pixel.
    pub vectors: ScanGrid<Vec<[f64; 2]>>,
    /// Miller indices per vector, if assigned.
    pub hkls: Option<Hkls>,
}

impl DiffractionVectors {
    /// Wraps vectors without an hkl assignment.
    pub fn new(vectors: ScanGrid<Vec<[f64; 2]>>) -> Self {
        Self {
            vectors,
            hkls: None,
        }
    }
}

/// Outcome of attaching hkls to diffraction vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HklAssignment {
    /// The target's hkls were set or replaced.
    Assigned,
    /// The target already had hkls and `overwrite` was false; nothing changed.
    Skipped,
}

/// Vector-matching results: a match set per pixel.
#[derive(Clone, Debug)]
pub struct VectorMatchingResults {
    data: ScanGrid<MatchSet>,
    hkls: Option<Hkls>,
    cfg: ReduceConfig,
}

impl VectorMatchingResults {
    /// Wraps a grid of per-pixel match sets.
    pub fn new(data: ScanGrid<MatchSet>) -> Self {
        Self {
            data,
            hkls: None,
            cfg: ReduceConfig::default(),
        }
    }

    /// Attaches the Miller indices found by the matcher.
    pub fn with_hkls(mut self, hkls: Hkls) -> Self {
        self.hkls = Some(hkls);
        self
    }

    /// Replaces the reduction configuration.
    pub fn with_config(mut self, cfg: ReduceConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Per-pixel match sets.
    pub fn data(&self) -> &ScanGrid<MatchSet> {
        &self.data
    }

    /// Miller indices found by the matcher, if any.
    pub fn hkls(&self) -> Option<&Hkls> {
        self.hkls.as_ref()
    }

    /// Best phase, orientation and metrics of every pixel.
    pub fn reduce(&self) -> ScanGrid<PixelResult> {
        reduce_vector_matching(&self.data, &self.cfg)
    }

    /// Per-pixel scalar metrics as named columns.
    ///
    /// Fails with `PropertyKeysMismatch` when some pixels have a
    /// `phase_reliability` or `orientation_reliability` and others do not.
    pub fn properties(&self) -> OriMapResult<PropertyTable> {
        PropertyTable::from_results(&self.reduce())
    }

    /// Crystal-map export for vector matching.
    ///
    /// Always fails with `Unsupported`, before any pixel is read.
    pub fn to_crystal_map(&self) -> OriMapResult<CrystalMapInput> {
        Err(OriMapError::Unsupported {
            operation: "crystal map export of vector-matching results",
        })
    }

    /// Attaches this result's hkls to `vectors`.
    ///
    /// When `vectors` already carries hkls and `overwrite` is false the target
    /// is left untouched, a warning is traced and `Skipped` is returned.
    pub fn get_indexed_diffraction_vectors(
        &self,
        vectors: &mut DiffractionVectors,
        overwrite: bool,
    ) -> HklAssignment {
        if !overwrite && vectors.hkls.is_some() {
            trace_warn!(
                "vectors already carry hkls; pass overwrite=true to replace them",
                overwrite = overwrite
            );
            return HklAssignment::Skipped;
        }
        vectors.hkls = self.hkls.clone();
        HklAssignment::Assigned
    }
}
