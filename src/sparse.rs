//! # Sparse binary matrix representation and functions
//!
//! This module implements a representation for sparse binary matrices based on
//! the alist format used to handle LDPC parity check matrices.

use std::borrow::Borrow;
use std::slice::Iter;
use thiserror::Error;

/// Alist parsing error.
///
/// This enum represents the errors that can be found while parsing the alist
/// representation of a sparse matrix.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum AlistError {
    /// The alist header does not contain the matrix dimensions.
    #[error("alist header does not contain the matrix dimensions")]
    InvalidHeader,
    /// The alist does not contain the expected number of lines.
    #[error("alist does not contain the expected number of lines")]
    MissingLines,
    /// A field that should be a number could not be parsed.
    #[error("alist value '{0}' is not a number")]
    InvalidNumber(String),
    /// A column entry references a row outside the matrix.
    #[error("alist entry {entry} is outside the matrix rows (1..={nrows})")]
    EntryOutOfRange {
        /// One-based row index found in the alist.
        entry: usize,
        /// Number of rows declared in the header.
        nrows: usize,
    },
}

/// A sparse binary matrix
///
/// The internal representation for this matrix is based on the alist format:
/// the positions of the one entries are stored for each row and for each
/// column.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SparseMatrix {
    rows: Vec<Vec<usize>>,
    cols: Vec<Vec<usize>>,
}

impl SparseMatrix {
    /// Create a new sparse matrix of a given size
    ///
    /// The matrix is initialized to the zero matrix.
    ///
    /// # Examples
    /// ```
    /// # use fecsim::sparse::SparseMatrix;
    /// let h = SparseMatrix::new(10, 30);
    /// assert_eq!(h.num_rows(), 10);
    /// assert_eq!(h.num_cols(), 30);
    /// ```
    pub fn new(nrows: usize, ncols: usize) -> SparseMatrix {
        use std::iter::repeat_with;
        let rows = repeat_with(Vec::new).take(nrows).collect();
        let cols = repeat_with(Vec::new).take(ncols).collect();
        SparseMatrix { rows, cols }
    }

    /// Returns the number of rows of the matrix
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns of the matrix
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    /// Returns the row weight of `row`
    ///
    /// The row weight is defined as the number of entries equal to one in a
    /// particular row. Rows are indexed starting by zero.
    pub fn row_weight(&self, row: usize) -> usize {
        self.rows[row].len()
    }

    /// Returns the column weight of `col`
    ///
    /// The column weight is defined as the number of entries equal to one in a
    /// particular column. Columns are indexed starting by zero.
    pub fn col_weight(&self, col: usize) -> usize {
        self.cols[col].len()
    }

    /// Returns `true` if the entry corresponding to a particular row and
    /// column is a one
    pub fn contains(&self, row: usize, col: usize) -> bool {
        // typically columns are shorter, so we search in the column
        self.cols[col].contains(&row)
    }

    /// Inserts a one in a particular row and column
    ///
    /// # Examples
    /// ```
    /// # use fecsim::sparse::SparseMatrix;
    /// let mut h = SparseMatrix::new(10, 30);
    /// assert!(!h.contains(3, 7));
    /// h.insert(3, 7);
    /// assert!(h.contains(3, 7));
    /// ```
    pub fn insert(&mut self, row: usize, col: usize) {
        self.rows[row].push(col);
        self.cols[col].push(row);
    }

    /// Inserts ones in particular columns of a row
    ///
    /// The effect is as calling [`SparseMatrix::insert`] on each of the
    /// elements of the iterator `cols`.
    pub fn insert_row<T, S>(&mut self, row: usize, cols: T)
    where
        T: Iterator<Item = S>,
        S: Borrow<usize>,
    {
        for col in cols {
            self.insert(row, *col.borrow());
        }
    }

    /// Inserts ones in particular rows of a column
    ///
    /// This works like [`SparseMatrix::insert_row`].
    pub fn insert_col<T, S>(&mut self, col: usize, rows: T)
    where
        T: Iterator<Item = S>,
        S: Borrow<usize>,
    {
        for row in rows {
            self.insert(*row.borrow(), col);
        }
    }

    /// Returns an [Iterator] over the entries equal to one in a particular row
    pub fn iter_row(&self, row: usize) -> Iter<'_, usize> {
        self.rows[row].iter()
    }

    /// Returns an [Iterator] over the entries equal to one in a particular
    /// column
    pub fn iter_col(&self, col: usize) -> Iter<'_, usize> {
        self.cols[col].iter()
    }

    /// Returns an [Iterator] over all the entries equal to one
    ///
    /// The entries are returned as `(row, column)` tuples in row-major order.
    pub fn iter_all(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(j, row)| row.iter().map(move |&k| (j, k)))
    }

    /// Writes the matrix in alist format to a writer
    ///
    /// # Errors
    /// If a call to `write!()` returns an error, this function returns such an
    /// error.
    pub fn write_alist<W: std::fmt::Write>(&self, w: &mut W) -> std::fmt::Result {
        fn write_line<W: std::fmt::Write, I: Iterator<Item = usize>>(
            w: &mut W,
            values: I,
        ) -> std::fmt::Result {
            for (j, x) in values.enumerate() {
                if j > 0 {
                    write!(w, " ")?;
                }
                write!(w, "{x}")?;
            }
            writeln!(w)
        }

        writeln!(w, "{} {}", self.num_cols(), self.num_rows())?;
        let directions = [&self.cols, &self.rows];
        write_line(
            w,
            directions
                .iter()
                .map(|dir| dir.iter().map(|el| el.len()).max().unwrap_or(0)),
        )?;
        for dir in directions.iter() {
            write_line(w, dir.iter().map(|el| el.len()))?;
        }
        for dir in directions.iter() {
            for el in *dir {
                let mut v = el.clone();
                v.sort_unstable();
                write_line(w, v.iter().map(|x| x + 1))?;
            }
        }
        Ok(())
    }

    /// Returns a [`String`] with the alist representation of the matrix
    pub fn alist(&self) -> String {
        let mut s = String::new();
        self.write_alist(&mut s).unwrap();
        s
    }

    /// Constructs and returns a sparse matrix from its alist representation
    ///
    /// # Errors
    /// `alist` should hold a valid alist representation. If an error is found
    /// while parsing `alist`, an [`AlistError`] describing the problem is
    /// returned.
    pub fn from_alist(alist: &str) -> Result<SparseMatrix, AlistError> {
        fn number(s: &str) -> Result<usize, AlistError> {
            s.parse()
                .map_err(|_| AlistError::InvalidNumber(s.to_string()))
        }

        let mut lines = alist.split('\n');
        let sizes = lines.next().ok_or(AlistError::InvalidHeader)?;
        let mut sizes = sizes.split_whitespace();
        let ncols = number(sizes.next().ok_or(AlistError::InvalidHeader)?)?;
        let nrows = number(sizes.next().ok_or(AlistError::InvalidHeader)?)?;
        let mut h = SparseMatrix::new(nrows, ncols);
        lines.next(); // skip max weights
        lines.next(); // skip column weights
        lines.next(); // skip row weights
        for col in 0..ncols {
            let col_data = lines.next().ok_or(AlistError::MissingLines)?;
            for entry in col_data.split_whitespace() {
                let entry = number(entry)?;
                if !(1..=nrows).contains(&entry) {
                    return Err(AlistError::EntryOutOfRange { entry, nrows });
                }
                h.insert(entry - 1, col);
            }
        }
        // the row section of the alist is redundant and does not need to be
        // processed
        Ok(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert() {
        let mut h = SparseMatrix::new(100, 300);
        assert!(!h.contains(27, 154));
        h.insert(27, 154);
        assert!(h.contains(27, 154));
        assert!(!h.contains(28, 154));
    }

    #[test]
    fn iter_all() {
        let mut h = SparseMatrix::new(3, 4);
        h.insert(0, 1);
        h.insert(2, 0);
        h.insert(2, 3);
        let entries = h.iter_all().collect::<Vec<_>>();
        assert_eq!(&entries, &[(0, 1), (2, 0), (2, 3)]);
    }

    #[test]
    fn test_alist() {
        let mut h = SparseMatrix::new(4, 12);
        for j in 0..4 {
            h.insert(j, j);
            h.insert(j, j + 4);
            h.insert(j, j + 8);
        }
        let expected = "12 4
1 3
1 1 1 1 1 1 1 1 1 1 1 1
3 3 3 3
1
2
3
4
1
2
3
4
1
2
3
4
1 5 9
2 6 10
3 7 11
4 8 12
";
        assert_eq!(h.alist(), expected);

        let h2 = SparseMatrix::from_alist(expected).unwrap();
        assert_eq!(h2.alist(), expected);
    }

    #[test]
    fn alist_errors() {
        assert_eq!(
            SparseMatrix::from_alist("").unwrap_err(),
            AlistError::InvalidHeader
        );
        assert_eq!(
            SparseMatrix::from_alist("6\n").unwrap_err(),
            AlistError::InvalidHeader
        );
        assert_eq!(
            SparseMatrix::from_alist("2 x\n").unwrap_err(),
            AlistError::InvalidNumber("x".to_string())
        );
        // a column entry referencing row 3 of a 2-row matrix
        let bad = "2 2\n1 1\n1 1\n1 1\n3\n1\n";
        assert_eq!(
            SparseMatrix::from_alist(bad).unwrap_err(),
            AlistError::EntryOutOfRange { entry: 3, nrows: 2 }
        );
    }
}
