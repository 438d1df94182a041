//! Non-overlapping placement of spanning cells in a fixed-width grid.

/// Rectangle a child occupies in a grid, in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: usize,
    pub y: usize,
    pub column_span: usize,
    pub row_span: usize,
}

/// Occupancy map used to lay out grid items in declaration order.
///
/// Each item takes the first position, scanning rows top to bottom and
/// columns left to right, where its whole rectangle is free. Scanning starts
/// at the first row that still has a free slot, so narrow items placed late
/// back-fill holes left by wide ones.
#[derive(Debug, Clone)]
pub struct GridMatrix {
    columns: usize,
    rows: Vec<Vec<bool>>,
    /// First row with at least one free slot.
    frontier: usize,
}

impl GridMatrix {
    /// Create an empty matrix. A column count of zero is treated as one.
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: Vec::new(),
            frontier: 0,
        }
    }

    /// Column count the matrix was built with.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows touched so far.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Place the next item and return its cell.
    ///
    /// Spans wider than the grid are clamped to the column count; zero spans
    /// count as one.
    pub fn next_element(&mut self, column_span: usize, row_span: usize) -> GridCell {
        let column_span = column_span.clamp(1, self.columns);
        let row_span = row_span.max(1);

        let mut y = self.frontier;
        loop {
            for x in 0..=(self.columns - column_span) {
                if self.is_free(x, y, column_span, row_span) {
                    let cell = GridCell {
                        x,
                        y,
                        column_span,
                        row_span,
                    };
                    self.occupy(cell);
                    return cell;
                }
            }
            y += 1;
        }
    }

    fn is_free(&self, x: usize, y: usize, column_span: usize, row_span: usize) -> bool {
        (y..y + row_span).all(|row| match self.rows.get(row) {
            Some(slots) => slots[x..x + column_span].iter().all(|taken| !taken),
            None => true,
        })
    }

    fn occupy(&mut self, cell: GridCell) {
        let bottom = cell.y + cell.row_span;
        if self.rows.len() < bottom {
            let columns = self.columns;
            self.rows.resize_with(bottom, || vec![false; columns]);
        }
        for row in &mut self.rows[cell.y..bottom] {
            for slot in &mut row[cell.x..cell.x + cell.column_span] {
                *slot = true;
            }
        }
        while self
            .rows
            .get(self.frontier)
            .is_some_and(|row| row.iter().all(|taken| *taken))
        {
            self.frontier += 1;
        }
    }
}
