//! Assembly of per-pixel results into crystal-map constructor input.

use crate::candidate::template::TemplateMatch;
use crate::grid::ScanGrid;
use crate::orientation::rotations_from_euler;
use crate::reduce::PixelResult;
use crate::util::{OriMapError, OriMapResult};
use nalgebra::UnitQuaternion;
use std::collections::BTreeMap;

/// Property name of the template-matching score.
pub const SCORE: &str = "score";

/// Named per-pixel scalar columns, each in row-major scan order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyTable {
    columns: BTreeMap<String, Vec<f64>>,
}

impl PropertyTable {
    /// Inverts per-pixel metric records into one column per property.
    ///
    /// Every pixel must carry the same property names as the first one;
    /// otherwise `PropertyKeysMismatch` names the first offending pixel.
    pub fn from_results(results: &ScanGrid<PixelResult>) -> OriMapResult<Self> {
        let mut iter = results.iter();
        let Some(first) = iter.next() else {
            return Ok(Self::default());
        };
        let first_props = first.metrics().scalar_properties();
        let keys: Vec<&'static str> = first_props.iter().map(|(name, _)| *name).collect();
        let mut columns: Vec<Vec<f64>> = first_props
            .iter()
            .map(|&(_, value)| {
                let mut col = Vec::with_capacity(results.len());
                col.push(value);
                col
            })
            .collect();

        for (offset, result) in iter.enumerate() {
            let props = result.metrics().scalar_properties();
            let same_keys =
                props.len() == keys.len() && props.iter().zip(&keys).all(|(p, k)| p.0 == *k);
            if !same_keys {
                return Err(OriMapError::PropertyKeysMismatch {
                    index: offset + 1,
                    expected: keys.iter().map(|k| k.to_string()).collect(),
                    found: props.iter().map(|p| p.0.to_string()).collect(),
                });
            }
            for (col, (_, value)) in columns.iter_mut().zip(props) {
                col.push(value);
            }
        }

        Ok(Self {
            columns: keys
                .into_iter()
                .map(str::to_string)
                .zip(columns)
                .collect(),
        })
    }

    /// Adds or replaces a column.
    pub fn insert(&mut self, name: impl Into<String>, column: Vec<f64>) {
        self.columns.insert(name.into(), column);
    }

    /// Returns a column by name.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Property names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if no property is present.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Consumes the table and returns its columns.
    pub fn into_columns(self) -> BTreeMap<String, Vec<f64>> {
        self.columns
    }
}

/// Everything a crystal map needs, flattened in row-major scan order.
#[derive(Clone, Debug, PartialEq)]
pub struct CrystalMapInput {
    width: usize,
    height: usize,
    phase_id: Vec<usize>,
    rotations: Vec<UnitQuaternion<f64>>,
    x: Vec<usize>,
    y: Vec<usize>,
    properties: PropertyTable,
}

impl CrystalMapInput {
    /// Assembles the map input from the best template match per pixel.
    ///
    /// Rotations use the Bunge convention in the crystal-to-lab direction;
    /// the only property is `score`.
    pub fn from_template_matches(best: &ScanGrid<TemplateMatch>) -> Self {
        let phase_id = best.iter().map(|m| m.phase_index).collect();
        let eulers: Vec<_> = best.iter().map(|m| m.euler).collect();
        let rotations = rotations_from_euler(&eulers);
        let (x, y) = best.coordinates();
        let mut properties = PropertyTable::default();
        properties.insert(SCORE, best.iter().map(|m| m.score).collect());
        Self {
            width: best.width(),
            height: best.height(),
            phase_id,
            rotations,
            x,
            y,
            properties,
        }
    }

    /// Scan shape as `(width, height)`.
    pub fn scan_shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of scan positions.
    pub fn len(&self) -> usize {
        self.phase_id.len()
    }

    /// Always `false` for assembled maps.
    pub fn is_empty(&self) -> bool {
        self.phase_id.is_empty()
    }

    /// Phase index per pixel.
    pub fn phase_id(&self) -> &[usize] {
        &self.phase_id
    }

    /// Crystal-to-lab rotation per pixel.
    pub fn rotations(&self) -> &[UnitQuaternion<f64>] {
        &self.rotations
    }

    /// Column index per pixel.
    pub fn x(&self) -> &[usize] {
        &self.x
    }

    /// Row index per pixel.
    pub fn y(&self) -> &[usize] {
        &self.y
    }

    /// Named scalar properties.
    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }
}
