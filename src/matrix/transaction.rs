//! The transaction log: reversible row/column detachment in strict LIFO
//! order. This is the sole mechanism by which the branch-and-bound
//! solver tries and undoes a decision without copying the matrix.

use super::{Cell, ColId, RowId, SparseMatrix, COST_COL};

/// one snapshot on the undo stack.
#[derive(Clone, Debug)]
pub(crate) enum Undo {
    Row(RowId, Vec<Cell>),
    Col(ColId, Vec<Cell>),
}

/// A receipt for one detachment. It must be handed back to `restitch`
/// in reverse order of issue; `restitch` panics otherwise, so a branch
/// cannot silently leave the matrix corrupted.
#[derive(Debug)]
#[must_use = "a checkpoint must be restitched, in LIFO order"]
pub struct Checkpoint(pub(crate) usize);

impl SparseMatrix {
    fn mark(&mut self) -> Checkpoint {
        let depth = self.log_len();
        self.marks().push(depth);
        Checkpoint(depth)
    }

    /// Detach row `r` and cascade-detach every value column it touches.
    /// The returned checkpoint restores the pre-call matrix bit for bit.
    pub fn select_row(&mut self, r: RowId) -> Checkpoint {
        let cp = self.mark();
        let touched: Vec<ColId> = self
            .row(r)
            .map(|cells| {
                cells
                    .iter()
                    .map(|c| c.at)
                    .filter(|c| *c != COST_COL)
                    .collect()
            })
            .unwrap_or_default();
        for c in touched {
            self.detach_col(c);
        }
        self.detach_row(r);
        cp
    }

    /// detach row `r` alone, without cascading.
    pub fn unstitch_row(&mut self, r: RowId) -> Checkpoint {
        assert!(self.row(r).is_some(), "unstitch_row: no row {r}");
        let cp = self.mark();
        self.detach_row(r);
        cp
    }

    /// detach column `c` alone, without cascading.
    pub fn unstitch_col(&mut self, c: ColId) -> Checkpoint {
        assert!(self.col(c).is_some(), "unstitch_col: no col {c}");
        let cp = self.mark();
        self.detach_col(c);
        cp
    }

    /// Pop the undo stack back to `cp`, reinserting exactly what was
    /// removed, in reverse order. Panics on out-of-order restitching.
    pub fn restitch(&mut self, cp: Checkpoint) {
        match self.marks().pop() {
            Some(depth) if depth == cp.0 => (),
            _ => panic!("restitch: checkpoints returned out of order"),
        }
        while cp.0 < self.log_len() {
            match self.log_pop().expect("undo stack underflow") {
                Undo::Row(r, cells) => {
                    for cell in cells {
                        self.insert_cell(r, cell.at, cell.val);
                    }
                }
                Undo::Col(c, cells) => {
                    for cell in cells {
                        self.insert_cell(cell.at, c, cell.val);
                    }
                }
            }
        }
        #[cfg(feature = "boundary_check")]
        assert!(self.check_consistency());
    }

    fn detach_row(&mut self, r: RowId) {
        let cells = self.take_rows_entry(r);
        self.log_push(Undo::Row(r, cells));
    }
    fn detach_col(&mut self, c: ColId) {
        let cells = self.take_cols_entry(c);
        self.log_push(Undo::Col(c, cells));
    }
}
