//! Module `matrix` implements the transactional sparse 0/1 matrix the
//! whole optimizer runs on: rows are links (column 0 holds their cost),
//! value columns are candidate clause columns.

/// the undo log and its checkpoints
mod transaction;

pub use self::transaction::Checkpoint;

use {
    self::transaction::Undo,
    crate::types::*,
    std::{collections::BTreeMap, fmt},
};

pub type RowId = usize;
pub type ColId = usize;

/// column 0 is reserved for the cost/objective coefficients.
pub const COST_COL: ColId = 0;

/// zero tolerance for physically removing cells.
pub const EPS: f64 = 1e-9;

/// One nonzero entry, stored from both axes; `at` is the index on the
/// other axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub at: usize,
    pub val: f64,
}

/// A sparse matrix as dual sorted adjacency lists: every cell appears in
/// its row list (sorted by column) and its column list (sorted by row),
/// with the same value. Emptied lists are dropped from the maps.
#[derive(Clone, Debug, Default)]
pub struct SparseMatrix {
    rows: BTreeMap<RowId, Vec<Cell>>,
    cols: BTreeMap<ColId, Vec<Cell>>,
    log: Vec<Undo>,
    open_marks: Vec<usize>,
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SparseMatrix({} rows, {} cols, {} pending undos)",
            self.rows.len(),
            self.cols.len(),
            self.log.len()
        )
    }
}

impl Instantiate for SparseMatrix {
    fn instantiate(_conf: &Config, _desc: &ModelDescription) -> Self {
        SparseMatrix::default()
    }
}

impl SparseMatrix {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }
    /// the number of candidate columns, cost column excluded.
    pub fn num_value_cols(&self) -> usize {
        self.cols.keys().filter(|c| **c != COST_COL).count()
    }
    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.keys().copied().collect()
    }
    pub fn col_ids(&self) -> Vec<ColId> {
        self.cols.keys().copied().collect()
    }
    pub fn max_col_id(&self) -> ColId {
        self.cols.keys().next_back().copied().unwrap_or(0)
    }
    pub fn row(&self, r: RowId) -> Option<&[Cell]> {
        self.rows.get(&r).map(|v| v.as_slice())
    }
    pub fn col(&self, c: ColId) -> Option<&[Cell]> {
        self.cols.get(&c).map(|v| v.as_slice())
    }

    /// insert a whole row. Duplicate indices and empty cell sets are
    /// programmer errors and fail fast.
    pub fn add_row(&mut self, r: RowId, cells: &[(ColId, f64)]) {
        assert!(!cells.is_empty(), "add_row: empty cell set");
        assert!(!self.rows.contains_key(&r), "add_row: duplicate row {r}");
        for (c, v) in cells.iter() {
            self.insert_cell(r, *c, *v);
        }
        self.check();
    }
    /// insert a whole column; same fail-fast contract as `add_row`.
    pub fn add_col(&mut self, c: ColId, cells: &[(RowId, f64)]) {
        assert!(!cells.is_empty(), "add_col: empty cell set");
        assert!(!self.cols.contains_key(&c), "add_col: duplicate col {c}");
        for (r, v) in cells.iter() {
            self.insert_cell(*r, c, *v);
        }
        self.check();
    }

    pub fn has_elem(&self, r: RowId, c: ColId) -> bool {
        self.rows
            .get(&r)
            .map_or(false, |row| row.iter().any(|cell| cell.at == c))
    }
    /// the value at `(r, c)`, zero when the cell does not exist.
    pub fn elem_val(&self, r: RowId, c: ColId) -> f64 {
        self.rows.get(&r).map_or(0.0, |row| {
            row.iter()
                .find(|cell| cell.at == c)
                .map_or(0.0, |cell| cell.val)
        })
    }
    /// write `(r, c)`; values within `EPS` of zero remove the cell.
    pub fn set_elem(&mut self, r: RowId, c: ColId, v: f64) {
        self.remove_cell(r, c);
        if EPS < v.abs() {
            self.insert_cell(r, c, v);
        }
        self.check();
    }
    pub fn remove_elem(&mut self, r: RowId, c: ColId) {
        self.remove_cell(r, c);
        self.check();
    }

    /// true iff every nonzero column of `a` (cost column aside) also
    /// appears in `b`; a merge-walk over the sorted lists.
    pub fn row_subset(&self, a: RowId, b: RowId) -> bool {
        let (Some(ra), Some(rb)) = (self.rows.get(&a), self.rows.get(&b)) else {
            return false;
        };
        subset_walk(ra, rb, Some(COST_COL))
    }
    /// true iff every nonzero row of `a` also appears in `b`.
    pub fn col_subset(&self, a: ColId, b: ColId) -> bool {
        let (Some(ca), Some(cb)) = (self.cols.get(&a), self.cols.get(&b)) else {
            return false;
        };
        subset_walk(ca, cb, None)
    }

    /// `row /= k`; used only by the simplex pivoting.
    pub fn divide_row_by(&mut self, r: RowId, k: f64) {
        debug_assert!(EPS < k.abs());
        let cells: Vec<Cell> = match self.rows.get(&r) {
            Some(v) => v.clone(),
            None => return,
        };
        for cell in cells {
            self.set_elem(r, cell.at, cell.val / k);
        }
    }
    /// `row1 -= row2 * k`; zero results are physically removed.
    pub fn subtract_row_from_row(&mut self, r1: RowId, r2: RowId, k: f64) {
        let cells: Vec<Cell> = match self.rows.get(&r2) {
            Some(v) => v.clone(),
            None => return,
        };
        for cell in cells {
            let v = self.elem_val(r1, cell.at) - cell.val * k;
            self.set_elem(r1, cell.at, v);
        }
    }

    /// a deep copy with a fresh (empty) transaction log; used to protect
    /// the live matrix from the simplex's destructive pivoting.
    pub fn create_copy(&self) -> SparseMatrix {
        SparseMatrix {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            log: Vec::new(),
            open_marks: Vec::new(),
        }
    }

    /// check that both axes agree on membership and value and stay
    /// sorted; the testable consistency invariant.
    pub fn check_consistency(&self) -> bool {
        for (r, row) in self.rows.iter() {
            if row.is_empty() || !row.windows(2).all(|w| w[0].at < w[1].at) {
                return false;
            }
            for cell in row.iter() {
                let Some(col) = self.cols.get(&cell.at) else {
                    return false;
                };
                if !col
                    .iter()
                    .any(|o| o.at == *r && (o.val - cell.val).abs() <= EPS)
                {
                    return false;
                }
            }
        }
        for (c, col) in self.cols.iter() {
            if col.is_empty() || !col.windows(2).all(|w| w[0].at < w[1].at) {
                return false;
            }
            for cell in col.iter() {
                if (self.elem_val(cell.at, *c) - cell.val).abs() > EPS {
                    return false;
                }
            }
        }
        true
    }

    #[inline]
    fn check(&self) {
        #[cfg(feature = "boundary_check")]
        assert!(self.check_consistency());
    }

    /// splice one cell into both axes, keeping the lists sorted.
    pub(crate) fn insert_cell(&mut self, r: RowId, c: ColId, v: f64) {
        let row = self.rows.entry(r).or_default();
        match row.binary_search_by(|cell| cell.at.cmp(&c)) {
            Ok(_) => panic!("insert_cell: cell ({r},{c}) already present"),
            Err(p) => row.insert(p, Cell { at: c, val: v }),
        }
        let col = self.cols.entry(c).or_default();
        match col.binary_search_by(|cell| cell.at.cmp(&r)) {
            Ok(_) => panic!("insert_cell: cell ({r},{c}) already present"),
            Err(p) => col.insert(p, Cell { at: r, val: v }),
        }
    }
    /// remove one cell from both axes; emptied lists leave the maps.
    pub(crate) fn remove_cell(&mut self, r: RowId, c: ColId) {
        let mut emptied = false;
        if let Some(row) = self.rows.get_mut(&r) {
            if let Ok(p) = row.binary_search_by(|cell| cell.at.cmp(&c)) {
                row.remove(p);
                emptied = row.is_empty();
            } else {
                return;
            }
        } else {
            return;
        }
        if emptied {
            self.rows.remove(&r);
        }
        if let Some(col) = self.cols.get_mut(&c) {
            if let Ok(p) = col.binary_search_by(|cell| cell.at.cmp(&r)) {
                col.remove(p);
            }
            if col.is_empty() {
                self.cols.remove(&c);
            }
        }
    }

    pub(crate) fn log_push(&mut self, u: Undo) {
        self.log.push(u);
    }
    pub(crate) fn log_len(&self) -> usize {
        self.log.len()
    }
    pub(crate) fn log_pop(&mut self) -> Option<Undo> {
        self.log.pop()
    }
    pub(crate) fn marks(&mut self) -> &mut Vec<usize> {
        &mut self.open_marks
    }
    pub(crate) fn take_rows_entry(&mut self, r: RowId) -> Vec<Cell> {
        let cells = self.rows.get(&r).cloned().unwrap_or_default();
        for cell in cells.iter() {
            self.remove_cell(r, cell.at);
        }
        cells
    }
    pub(crate) fn take_cols_entry(&mut self, c: ColId) -> Vec<Cell> {
        let cells = self.cols.get(&c).cloned().unwrap_or_default();
        for cell in cells.iter() {
            self.remove_cell(cell.at, c);
        }
        cells
    }
}

/// every index of `a` (minus `skip`) appears in `b`; O(|a|+|b|).
fn subset_walk(a: &[Cell], b: &[Cell], skip: Option<usize>) -> bool {
    let mut ib = 0;
    'outer: for ca in a.iter() {
        if Some(ca.at) == skip {
            continue;
        }
        while ib < b.len() {
            if b[ib].at == ca.at {
                ib += 1;
                continue 'outer;
            }
            if ca.at < b[ib].at {
                return false;
            }
            ib += 1;
        }
        return false;
    }
    true
}
