//! Row-major grids of per-pixel values over a 2D scan.
//!
//! `ScanGrid` owns one value per scan position. Row `y` occupies the flat
//! range `y * width .. (y + 1) * width`, so the flat index of `(x, y)` is
//! `y * width + x` and every array derived from a grid follows the same
//! order.

use crate::util::{OriMapError, OriMapResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Owned 2D grid of per-pixel values in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanGrid<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> ScanGrid<T> {
    /// Wraps a row-major buffer of exactly `width * height` values.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> OriMapResult<Self> {
        let expected = required_len(width, height)?;
        if data.len() != expected {
            return Err(OriMapError::LengthMismatch {
                expected,
                got: data.len(),
                context: "scan grid",
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` in row-major order.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> OriMapResult<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        let len = required_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Scan width (fast axis).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Scan height (slow axis).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of scan positions.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`; grids have non-zero dimensions.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major backing slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the grid and returns its row-major values.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterates values in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Returns the value at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Column and row index of every position, in row-major order.
    pub fn coordinates(&self) -> (Vec<usize>, Vec<usize>) {
        scan_coordinates(self.width, self.height)
    }

    /// Applies `f` to every value, keeping the grid shape.
    pub fn map<U, F>(&self, f: F) -> ScanGrid<U>
    where
        F: Fn(&T) -> U,
    {
        ScanGrid {
            data: self.data.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Applies a fallible `f` to every value, stopping at the first error.
    pub fn try_map<U, F>(&self, f: F) -> OriMapResult<ScanGrid<U>>
    where
        F: Fn(&T) -> OriMapResult<U>,
    {
        let data = self.data.iter().map(f).collect::<OriMapResult<Vec<U>>>()?;
        Ok(ScanGrid {
            data,
            width: self.width,
            height: self.height,
        })
    }
}

#[cfg(feature = "rayon")]
impl<T: Sync> ScanGrid<T> {
    /// Parallel `map`; the output keeps row-major order.
    pub fn par_map<U, F>(&self, f: F) -> ScanGrid<U>
    where
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        ScanGrid {
            data: self.data.par_iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Parallel `try_map`; reports the error of the lowest failing index.
    pub fn try_par_map<U, F>(&self, f: F) -> OriMapResult<ScanGrid<U>>
    where
        U: Send,
        F: Fn(&T) -> OriMapResult<U> + Sync + Send,
    {
        let results: Vec<OriMapResult<U>> = self.data.par_iter().map(f).collect();
        let data = results.into_iter().collect::<OriMapResult<Vec<U>>>()?;
        Ok(ScanGrid {
            data,
            width: self.width,
            height: self.height,
        })
    }
}

/// Column (`x`, fast) and row (`y`, slow) index of every scan position.
///
/// Depends only on the scan shape: entry `i` is `(i % width, i / width)`.
pub fn scan_coordinates(width: usize, height: usize) -> (Vec<usize>, Vec<usize>) {
    let len = width * height;
    let mut xs = Vec::with_capacity(len);
    let mut ys = Vec::with_capacity(len);
    for y in 0..height {
        for x in 0..width {
            xs.push(x);
            ys.push(y);
        }
    }
    (xs, ys)
}

fn required_len(width: usize, height: usize) -> OriMapResult<usize> {
    if width == 0 || height == 0 {
        return Err(OriMapError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(OriMapError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::{scan_coordinates, ScanGrid};
    use crate::util::OriMapError;

    #[test]
    fn coordinates_follow_row_major_order() {
        let (xs, ys) = scan_coordinates(3, 2);
        assert_eq!(xs, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(ys, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn get_and_row_use_row_major_layout() {
        let grid = ScanGrid::new((0..6).collect::<Vec<i32>>(), 3, 2).unwrap();
        assert_eq!(grid.get(2, 1), Some(&5));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.row(1), Some(&[3, 4, 5][..]));
        assert_eq!(grid.row(2), None);
    }

    #[test]
    fn from_fn_visits_rows_then_columns() {
        let grid = ScanGrid::from_fn(2, 2, |x, y| (x, y)).unwrap();
        assert_eq!(grid.as_slice(), &[(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            ScanGrid::new(vec![1, 2, 3], 2, 2).err(),
            Some(OriMapError::LengthMismatch {
                expected: 4,
                got: 3,
                context: "scan grid",
            })
        );
        assert_eq!(
            ScanGrid::<u8>::new(Vec::new(), 0, 3).err(),
            Some(OriMapError::InvalidDimensions {
                width: 0,
                height: 3,
            })
        );
    }

    #[test]
    fn try_map_stops_at_first_error() {
        let grid = ScanGrid::new(vec![1, -1, 2, -2], 2, 2).unwrap();
        let err = grid
            .try_map(|&v| {
                if v < 0 {
                    Err(OriMapError::IndexOutOfBounds {
                        index: (-v) as usize,
                        len: 0,
                        context: "test",
                    })
                } else {
                    Ok(v)
                }
            })
            .err();
        assert_eq!(
            err,
            Some(OriMapError::IndexOutOfBounds {
                index: 1,
                len: 0,
                context: "test",
            })
        );
    }
}
