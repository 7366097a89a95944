//! Diffraction-library lookup of simulated peaks.
//!
//! The library is an external collaborator; this module fixes the contract
//! (`DiffractionLibrary`), ships a small in-memory implementation, and builds
//! the per-pixel peak lists and marker inputs used to overlay best matches on
//! a signal.

use crate::candidate::template::TemplateMatches;
use crate::grid::ScanGrid;
use crate::orientation::Euler;
use crate::reduce::{try_map_pixels, ReduceConfig};
use crate::util::math::angle_diff_deg;
use crate::util::{OriMapError, OriMapResult};
use std::collections::BTreeMap;

/// Euler angles closer than this (per component, degrees) address the same entry.
pub const ANGLE_TOLERANCE_DEG: f64 = 1e-6;

/// Read-only source of simulated diffraction peaks.
pub trait DiffractionLibrary {
    /// Phase names in library order; a phase index is a position in this list.
    fn phase_names(&self) -> Vec<&str>;

    /// Simulated peak coordinates `(x, y, z)` for a phase and orientation.
    fn simulated_peaks(&self, phase: &str, euler: Euler) -> Option<&[[f64; 3]]>;
}

/// Maps each phase name to its index in library order.
pub fn phase_name_index<L>(library: &L) -> BTreeMap<String, usize>
where
    L: DiffractionLibrary + ?Sized,
{
    library
        .phase_names()
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name.to_string(), idx))
        .collect()
}

#[derive(Clone, Debug)]
struct LibraryEntry {
    euler: Euler,
    peaks: Vec<[f64; 3]>,
}

/// In-memory library of simulations keyed by phase and orientation.
#[derive(Clone, Debug, Default)]
pub struct SimulationLibrary {
    phases: Vec<(String, Vec<LibraryEntry>)>,
}

impl SimulationLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a simulation, registering the phase on first use.
    ///
    /// Returns the phase index.
    pub fn insert(&mut self, phase: &str, euler: Euler, peaks: Vec<[f64; 3]>) -> usize {
        let idx = match self.phases.iter().position(|(name, _)| name == phase) {
            Some(idx) => idx,
            None => {
                self.phases.push((phase.to_string(), Vec::new()));
                self.phases.len() - 1
            }
        };
        self.phases[idx].1.push(LibraryEntry { euler, peaks });
        idx
    }

    /// Number of registered phases.
    pub fn num_phases(&self) -> usize {
        self.phases.len()
    }
}

impl DiffractionLibrary for SimulationLibrary {
    fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn simulated_peaks(&self, phase: &str, euler: Euler) -> Option<&[[f64; 3]]> {
        let (_, entries) = self.phases.iter().find(|(name, _)| name == phase)?;
        entries
            .iter()
            .find(|entry| {
                entry
                    .euler
                    .to_array()
                    .iter()
                    .zip(euler.to_array())
                    .all(|(&a, b)| angle_diff_deg(a, b) <= ANGLE_TOLERANCE_DEG)
            })
            .map(|entry| entry.peaks.as_slice())
    }
}

/// In-plane `(x, y)` coordinates of the simulated peaks of the `rank`-th
/// best template match (rank 0 is the best).
pub fn peaks_from_best_template<L>(
    matches: &TemplateMatches,
    library: &L,
    rank: usize,
) -> OriMapResult<Vec<[f64; 2]>>
where
    L: DiffractionLibrary + ?Sized,
{
    let col = matches
        .nth_best_column(rank)
        .ok_or(OriMapError::IndexOutOfBounds {
            index: rank,
            len: matches.len(),
            context: "template rank",
        })?;
    let best = matches
        .column(col)
        .ok_or(OriMapError::IndexOutOfBounds {
            index: col,
            len: matches.len(),
            context: "template column",
        })?;
    let names = library.phase_names();
    let phase = names
        .get(best.phase_index)
        .copied()
        .ok_or(OriMapError::UnknownPhase {
            phase_index: best.phase_index,
            len: names.len(),
        })?;
    let peaks = library
        .simulated_peaks(phase, best.euler)
        .ok_or_else(|| OriMapError::MissingLibraryEntry {
            phase: phase.to_string(),
            euler_deg: best.euler.to_array(),
        })?;
    Ok(peaks.iter().map(|p| [p[0], p[1]]).collect())
}

/// Peak lists of the `rank`-th best template match for every pixel.
///
/// Fails with the lookup error of the first failing pixel in row-major
/// order.
pub fn peaks_from_template_grid<L>(
    grid: &ScanGrid<TemplateMatches>,
    library: &L,
    rank: usize,
    cfg: &ReduceConfig,
) -> OriMapResult<ScanGrid<Vec<[f64; 2]>>>
where
    L: DiffractionLibrary + Sync + ?Sized,
{
    try_map_pixels(grid, cfg, |matches| {
        peaks_from_best_template(matches, library, rank)
    })
}

/// One overlay layer: the k-th peak of every pixel, NaN where a pixel has
/// fewer than `k + 1` peaks.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerLayer {
    /// Peak x coordinate per pixel.
    pub x: ScanGrid<f64>,
    /// Peak y coordinate per pixel.
    pub y: ScanGrid<f64>,
}

/// Splits per-pixel peak lists into NaN-padded marker layers.
///
/// The number of layers equals the longest peak list.
pub fn marker_inputs(peaks: &ScanGrid<Vec<[f64; 2]>>) -> OriMapResult<Vec<MarkerLayer>> {
    let n_layers = peaks.iter().map(Vec::len).max().unwrap_or(0);
    (0..n_layers)
        .map(|k| -> OriMapResult<MarkerLayer> {
            let coord = |axis: usize| {
                ScanGrid::new(
                    peaks
                        .iter()
                        .map(|list| list.get(k).map_or(f64::NAN, |p| p[axis]))
                        .collect(),
                    peaks.width(),
                    peaks.height(),
                )
            };
            Ok(MarkerLayer {
                x: coord(0)?,
                y: coord(1)?,
            })
        })
        .collect()
}
