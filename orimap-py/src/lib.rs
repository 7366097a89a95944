//! Python bindings for the orimap crystal-map reduction library.
//!
//! This module exposes per-pixel reduction and crystal-map assembly to Python
//! via PyO3, exchanging bulk data as numpy arrays.

use nalgebra::Matrix3;
use numpy::{
    IntoPyArray, PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray3, PyReadonlyArray4,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyNotImplementedError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use orimap::{
    CrystalMapInput, MatchCandidate, MatchSet, OriMapError, PixelResult as RustPixelResult,
    ReduceConfig, ScanGrid, TemplateMatches, TemplateMatchingResults, TEMPLATE_CHANNELS,
};

/// Convert an OriMapError to a Python exception.
fn to_py_err(err: OriMapError) -> PyErr {
    match err {
        OriMapError::Unsupported { .. } => PyNotImplementedError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Best phase, orientation and reliability metrics at one scan position.
#[pyclass]
#[derive(Clone)]
pub struct PixelResult {
    inner: RustPixelResult,
}

#[pymethods]
impl PixelResult {
    /// Phase index of the best candidate.
    #[getter]
    fn phase_index(&self) -> usize {
        self.inner.phase_index()
    }

    /// Bunge Euler angles (phi1, Phi, phi2) in degrees.
    #[getter]
    fn orientation(&self) -> (f64, f64, f64) {
        let e = self.inner.orientation();
        (e.phi1, e.phi, e.phi2)
    }

    #[getter]
    fn match_rate(&self) -> f64 {
        self.inner.metrics().match_rate
    }

    #[getter]
    fn ehkls(&self) -> Vec<f64> {
        self.inner.metrics().ehkls.clone()
    }

    #[getter]
    fn total_error(&self) -> f64 {
        self.inner.metrics().total_error
    }

    /// None when only one phase was matched.
    #[getter]
    fn phase_reliability(&self) -> Option<f64> {
        self.inner.metrics().phase_reliability
    }

    /// None when only one candidate was matched.
    #[getter]
    fn orientation_reliability(&self) -> Option<f64> {
        self.inner.metrics().orientation_reliability
    }

    fn __repr__(&self) -> String {
        let (phi1, phi, phi2) = self.orientation();
        format!(
            "PixelResult(phase_index={}, orientation=({:.2}, {:.2}, {:.2}), total_error={:.4})",
            self.inner.phase_index(),
            phi1,
            phi,
            phi2,
            self.inner.metrics().total_error
        )
    }
}

/// Crystal-map constructor input flattened in row-major scan order.
#[pyclass]
pub struct CrystalMap {
    inner: CrystalMapInput,
}

#[pymethods]
impl CrystalMap {
    /// Scan shape as (height, width).
    #[getter]
    fn shape(&self) -> (usize, usize) {
        let (width, height) = self.inner.scan_shape();
        (height, width)
    }

    #[getter]
    fn phase_id<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<usize>> {
        PyArray1::from_slice(py, self.inner.phase_id())
    }

    /// Crystal-to-lab unit quaternions as an (N, 4) array of (w, x, y, z).
    #[getter]
    fn rotations<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let n = self.inner.len();
        let flat: Vec<f64> = self
            .inner
            .rotations()
            .iter()
            .flat_map(|q| [q.w, q.i, q.j, q.k])
            .collect();
        flat.into_pyarray(py).reshape([n, 4])
    }

    #[getter]
    fn x<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<usize>> {
        PyArray1::from_slice(py, self.inner.x())
    }

    #[getter]
    fn y<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<usize>> {
        PyArray1::from_slice(py, self.inner.y())
    }

    /// Property name to per-pixel values.
    #[getter]
    fn properties<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        let table = self.inner.properties();
        for name in table.names() {
            if let Some(column) = table.get(name) {
                dict.set_item(name, PyArray1::from_slice(py, column))?;
            }
        }
        Ok(dict)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        let (height, width) = self.shape();
        format!("CrystalMap(shape=({height}, {width}))")
    }
}

/// Reduce template-matching results to a crystal map.
///
/// Args:
///     data: float64 array of shape (height, width, 5, n) holding, per pixel,
///         the channels phase, phi1, Phi, phi2 (degrees) and score
///     parallel: Reduce pixels in parallel (default: False)
///
/// Returns:
///     CrystalMap with the highest-score match per pixel
#[pyfunction]
#[pyo3(signature = (data, parallel = false))]
fn template_matching_to_crystal_map(
    data: PyReadonlyArray4<'_, f64>,
    parallel: bool,
) -> PyResult<CrystalMap> {
    let shape = data.shape();
    let (height, width, channels, n) = (shape[0], shape[1], shape[2], shape[3]);
    if channels != TEMPLATE_CHANNELS {
        return Err(PyValueError::new_err(format!(
            "expected {TEMPLATE_CHANNELS} channels on axis 2, got {channels}"
        )));
    }
    let values = data.as_slice()?;
    let per_pixel = TEMPLATE_CHANNELS * n;
    let tables = (0..width * height)
        .map(|i| TemplateMatches::new(values[i * per_pixel..(i + 1) * per_pixel].to_vec(), n))
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_py_err)?;
    let grid = ScanGrid::new(tables, width, height).map_err(to_py_err)?;
    let inner = TemplateMatchingResults::new(grid)
        .with_config(ReduceConfig { parallel })
        .to_crystal_map()
        .map_err(to_py_err)?;
    Ok(CrystalMap { inner })
}

/// Reduce the vector-matching candidates of one scan position.
///
/// Args:
///     phase_index: Phase index per candidate
///     rotations: float64 array of shape (m, 3, 3), crystal-to-lab matrices
///     total_error: Total error per candidate
///     match_rate: Matched fraction per candidate (default: zeros)
///     error_hkls: Per-reflection errors per candidate (default: empty)
///     sort: Group candidates by phase and sort by error first (default: False)
///
/// Returns:
///     PixelResult for the best candidate
#[pyfunction]
#[pyo3(signature = (phase_index, rotations, total_error, match_rate = None, error_hkls = None, sort = false))]
fn crystal_from_vector_matching(
    phase_index: Vec<usize>,
    rotations: PyReadonlyArray3<'_, f64>,
    total_error: Vec<f64>,
    match_rate: Option<Vec<f64>>,
    error_hkls: Option<Vec<Vec<f64>>>,
    sort: bool,
) -> PyResult<PixelResult> {
    let m = phase_index.len();
    let shape = rotations.shape();
    if shape != [m, 3, 3] {
        return Err(PyValueError::new_err(format!(
            "rotations must have shape ({m}, 3, 3), got {shape:?}"
        )));
    }
    if total_error.len() != m
        || match_rate.as_ref().is_some_and(|v| v.len() != m)
        || error_hkls.as_ref().is_some_and(|v| v.len() != m)
    {
        return Err(PyValueError::new_err(
            "per-candidate inputs must all have the same length",
        ));
    }

    let matrices = rotations.as_slice()?;
    let mut candidates = Vec::with_capacity(m);
    for i in 0..m {
        let rotation = Matrix3::from_row_slice(&matrices[i * 9..(i + 1) * 9]);
        let mut cand =
            MatchCandidate::new(phase_index[i], rotation, total_error[i]).map_err(to_py_err)?;
        if let Some(rates) = &match_rate {
            cand = cand.with_match_rate(rates[i]).map_err(to_py_err)?;
        }
        if let Some(errors) = &error_hkls {
            cand = cand.with_error_hkls(errors[i].clone());
        }
        candidates.push(cand);
    }

    let set = if sort {
        MatchSet::sorted(candidates)
    } else {
        MatchSet::new(candidates)
    }
    .map_err(to_py_err)?;
    Ok(PixelResult {
        inner: orimap::crystal_from_vector_matching(&set),
    })
}

/// Python module for orimap crystal-map reduction.
#[pymodule]
fn _orimap(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PixelResult>()?;
    m.add_class::<CrystalMap>()?;
    m.add_function(wrap_pyfunction!(template_matching_to_crystal_map, m)?)?;
    m.add_function(wrap_pyfunction!(crystal_from_vector_matching, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
