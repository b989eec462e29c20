//! Transactional-matrix stress: random detach trees must restore the
//! matrix exactly, and the dual-axis invariant must hold throughout.

use remend::matrix::{Checkpoint, SparseMatrix, COST_COL};

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

fn random_matrix(rng: &mut XorShift, rows: usize, cols: usize) -> SparseMatrix {
    let mut m = SparseMatrix::default();
    for r in 1..=rows {
        let mut cells = vec![(COST_COL, 1.0 + (rng.next() % 90) as f64 / 10.0)];
        for c in 1..=cols {
            if rng.next() % 3 == 0 {
                cells.push((c, 1.0));
            }
        }
        m.add_row(r, &cells);
    }
    m
}

fn snapshot(m: &SparseMatrix) -> Vec<(usize, usize, u64)> {
    let mut v = Vec::new();
    for r in m.row_ids() {
        for cell in m.row(r).unwrap() {
            v.push((r, cell.at, cell.val.to_bits()));
        }
    }
    v
}

#[test]
fn random_detach_trees_restore_exactly() {
    let mut rng = XorShift(0x5bd1_e995_9e37_79b9);
    for _ in 0..30 {
        let mut m = random_matrix(&mut rng, 8, 10);
        let before = snapshot(&m);
        // a random stack of detachments, up to depth 6
        let mut stack: Vec<Checkpoint> = Vec::new();
        for _ in 0..40 {
            assert!(m.check_consistency());
            let grow = stack.len() < 6 && (stack.is_empty() || rng.next() % 3 != 0);
            if grow {
                let rows = m.row_ids();
                if rows.is_empty() {
                    break;
                }
                let r = rows[(rng.next() as usize) % rows.len()];
                let cp = match rng.next() % 3 {
                    0 => m.select_row(r),
                    1 => m.unstitch_row(r),
                    _ => {
                        let cols = m.col_ids();
                        let c = cols[(rng.next() as usize) % cols.len()];
                        m.unstitch_col(c)
                    }
                };
                stack.push(cp);
            } else if let Some(cp) = stack.pop() {
                m.restitch(cp);
            }
        }
        while let Some(cp) = stack.pop() {
            m.restitch(cp);
        }
        assert!(m.check_consistency());
        assert_eq!(snapshot(&m), before);
    }
}

#[test]
fn select_row_detaches_its_columns() {
    let mut m = SparseMatrix::default();
    m.add_row(1, &[(COST_COL, 1.0), (1, 1.0), (2, 1.0)]);
    m.add_row(2, &[(COST_COL, 2.0), (2, 1.0), (3, 1.0)]);
    let cp = m.select_row(1);
    // columns 1 and 2 are satisfied and gone; column 3 survives
    assert!(m.col(1).is_none());
    assert!(m.col(2).is_none());
    assert!(m.col(3).is_some());
    assert!(m.row(1).is_none());
    assert_eq!(m.num_value_cols(), 1);
    m.restitch(cp);
    assert_eq!(m.num_value_cols(), 3);
    assert!(m.check_consistency());
}

#[test]
#[should_panic(expected = "restitch")]
fn out_of_order_restitch_is_refused() {
    let mut m = SparseMatrix::default();
    m.add_row(1, &[(COST_COL, 1.0), (1, 1.0)]);
    m.add_row(2, &[(COST_COL, 1.0), (1, 1.0)]);
    let first = m.unstitch_row(1);
    let _second = m.unstitch_row(2);
    m.restitch(first);
}
