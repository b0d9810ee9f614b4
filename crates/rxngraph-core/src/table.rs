// AttrTable — row-major 2-D table of f32 attributes
//
// Node and edge attributes are stored one row per node (or edge):
//
//   rows = number of nodes/edges, cols = feature dimension
//
// `f32` is the element type the downstream model consumes, so every pool is
// cast to it once at load time. A table may have zero rows (a molecule with
// no edges) and still carries its column count, so an empty edge table is a
// well-defined (0 × dim) value rather than a missing one.

use crate::shape::Shape;
use crate::{Error, Result};

/// Owned row-major attribute table.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrTable {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl AttrTable {
    /// Wrap a flat row-major buffer. `data.len()` must equal `rows * cols`.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self> {
        let expected = Shape::from((rows, cols)).elem_count()?;
        if data.len() != expected {
            return Err(Error::ElementCountMismatch {
                shape: Shape::from((rows, cols)),
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// A table with zero rows and `cols` columns.
    pub fn empty(cols: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols,
        }
    }

    /// Build from a list of equally sized rows.
    pub fn from_rows<R: AsRef<[f32]>>(cols: usize, rows: &[R]) -> Result<Self> {
        let mut data = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                crate::bail!("row {i} has {} columns, expected {cols}", row.len());
            }
            data.extend_from_slice(row);
        }
        Self::new(data, rows.len(), cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        Shape::from((self.rows, self.cols))
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// The flat row-major buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Row `i`, or `None` past the end.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        self.view().row(i)
    }

    /// Borrow the whole table.
    pub fn view(&self) -> AttrView<'_> {
        AttrView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Borrow rows `[lo, hi)` without copying.
    pub fn rows_range(&self, lo: usize, hi: usize) -> Result<AttrView<'_>> {
        if lo > hi || hi > self.rows {
            crate::bail!(
                "row range {lo}..{hi} out of bounds for table with {} rows",
                self.rows
            );
        }
        Ok(AttrView {
            data: &self.data[lo * self.cols..hi * self.cols],
            rows: hi - lo,
            cols: self.cols,
        })
    }
}

/// Borrowed row-major window into an [`AttrTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttrView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> AttrView<'a> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    pub fn row(&self, i: usize) -> Option<&'a [f32]> {
        if i >= self.rows {
            return None;
        }
        Some(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Iterate rows in order. Works for zero-column tables too.
    pub fn iter_rows(&self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let data = self.data;
        let cols = self.cols;
        (0..self.rows).map(move |i| &data[i * cols..(i + 1) * cols])
    }

    /// Copy the window into an owned table.
    pub fn to_table(&self) -> AttrTable {
        AttrTable {
            data: self.data.to_vec(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}
