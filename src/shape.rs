//! Piece shape matrices
//!
//! A shape is a small boolean matrix indexed `(row, col)`, row 0 at the top.
//! Storage is a fixed 4x4 array; only the leading `rows x cols` window is used.

/// Largest extent of any piece along either axis
pub const MAX_EXTENT: usize = 4;

/// One rotation state of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    cells: [[bool; MAX_EXTENT]; MAX_EXTENT],
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Build a shape from rows of 0/1 values.
    ///
    /// Every row must have the same length and neither dimension may exceed
    /// [`MAX_EXTENT`]; both are checked in debug builds only since shapes come
    /// from the static catalog.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len().min(MAX_EXTENT);
        let width = rows.first().map_or(0, |r| r.len()).min(MAX_EXTENT);
        debug_assert!(rows.iter().all(|r| r.len() == width));

        let mut cells = [[false; MAX_EXTENT]; MAX_EXTENT];
        for (r, row) in rows.iter().take(height).enumerate() {
            for (c, &v) in row.iter().take(width).enumerate() {
                cells[r][c] = v != 0;
            }
        }

        Self {
            cells,
            rows: height,
            cols: width,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether `(row, col)` is set. Anything outside the window is unset.
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row][col]
    }

    /// Iterate over the `(row, col)` offsets of every set cell, row-major
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols).filter_map(move |c| self.cells[r][c].then_some((r, c)))
        })
    }

    /// Rotate a quarter turn clockwise: transpose, then reverse each row.
    ///
    /// The result is rotated inside its own bounding box, not around a pivot,
    /// so a `rows x cols` shape becomes `cols x rows` anchored at the same
    /// top-left corner.
    pub fn rotated(&self) -> Self {
        let mut cells = [[false; MAX_EXTENT]; MAX_EXTENT];
        for (i, out_row) in cells.iter_mut().enumerate().take(self.cols) {
            for (j, out) in out_row.iter_mut().enumerate().take(self.rows) {
                *out = self.cells[self.rows - 1 - j][i];
            }
        }

        Self {
            cells,
            rows: self.cols,
            cols: self.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_dimensions() {
        let shape = Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]);
        assert_eq!(shape.rows(), 2);
        assert_eq!(shape.cols(), 3);
        assert!(shape.is_set(1, 1));
        assert!(!shape.is_set(1, 0));
        assert!(!shape.is_set(3, 3));
    }

    #[test]
    fn test_cells_row_major() {
        let shape = Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]);
        let cells: Vec<_> = shape.cells().collect();
        assert_eq!(cells, vec![(0, 1), (0, 2), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_rotate_line_becomes_column() {
        let line = Shape::from_rows(&[&[1, 1, 1, 1]]);
        let rotated = line.rotated();
        assert_eq!(rotated.rows(), 4);
        assert_eq!(rotated.cols(), 1);
        assert_eq!(rotated.cells().count(), 4);
    }

    #[test]
    fn test_rotate_t_clockwise() {
        // ###      .#
        // .#.  ->  ##
        //          .#
        let t = Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]);
        let expected = Shape::from_rows(&[&[0, 1], &[1, 1], &[0, 1]]);
        assert_eq!(t.rotated(), expected);
    }

    #[test]
    fn test_rotate_l_clockwise() {
        // ###      ##
        // #..  ->  .#
        //          .#
        let l = Shape::from_rows(&[&[1, 1, 1], &[1, 0, 0]]);
        let expected = Shape::from_rows(&[&[1, 1], &[0, 1], &[0, 1]]);
        assert_eq!(l.rotated(), expected);
    }
}
