//! Exact set-cover search: branch-and-bound over the transactional
//! matrix, bounded by the LP relaxation.

use {
    crate::{
        matrix::{RowId, SparseMatrix, COST_COL, EPS},
        simplex::{Relaxation, Simplex},
        state::{Stat, State},
        types::*,
    },
    std::collections::BTreeSet,
};

/// tolerance for calling a relaxation value integral.
const INT_EPS: f64 = 1e-6;

/// The branch-and-bound driver. `best_cost` stays `f64::INFINITY` when
/// no cover exists.
#[derive(Debug)]
pub struct Brancher {
    simplex: Simplex,
    pub best_cost: f64,
    pub best_rows: Vec<RowId>,
}

impl Instantiate for Brancher {
    fn instantiate(conf: &Config, desc: &ModelDescription) -> Self {
        Brancher {
            simplex: Simplex::instantiate(conf, desc),
            best_cost: f64::INFINITY,
            best_rows: Vec::new(),
        }
    }
}

impl Brancher {
    /// Find a minimum-cost row selection covering every value column.
    /// The matrix is mutated destructively during the search and comes
    /// back bit for bit identical.
    pub fn solve(&mut self, m: &mut SparseMatrix, state: &mut State) -> (f64, Vec<RowId>) {
        self.best_cost = f64::INFINITY;
        self.best_rows.clear();
        if m.num_value_cols() == 0 {
            return (0.0, Vec::new());
        }
        let mut chosen: Vec<RowId> = Vec::new();
        self.branch(m, &mut chosen, 0.0, state);
        (self.best_cost, self.best_rows.clone())
    }

    fn branch(
        &mut self,
        m: &mut SparseMatrix,
        chosen: &mut Vec<RowId>,
        partial: f64,
        state: &mut State,
    ) {
        state[Stat::Branch] += 1;
        if m.num_value_cols() == 0 {
            if partial < self.best_cost {
                self.best_cost = partial;
                self.best_rows = chosen.clone();
                state[Stat::Incumbent] += 1;
            }
            return;
        }
        state[Stat::SimplexCall] += 1;
        let relax = self.simplex.relax(m);
        if relax.success {
            if self.best_cost <= partial + relax.cost + EPS {
                state[Stat::Prune] += 1;
                return;
            }
            if let Some(sel) = integral_selection(m, &relax) {
                let cost =
                    partial + sel.iter().map(|r| m.elem_val(*r, COST_COL)).sum::<f64>();
                if cost < self.best_cost {
                    self.best_cost = cost;
                    self.best_rows = chosen.iter().chain(sel.iter()).copied().collect();
                    state[Stat::Incumbent] += 1;
                }
                return;
            }
        }
        let Some(r) = branch_row(m, &relax) else {
            return;
        };
        let r_cost = m.elem_val(r, COST_COL);
        // include: the row pays its cost and satisfies its columns
        let cp = m.select_row(r);
        chosen.push(r);
        self.branch(m, chosen, partial + r_cost, state);
        chosen.pop();
        m.restitch(cp);
        // exclude: a column left with no row can never be satisfied
        let before = m.num_value_cols();
        let cp = m.unstitch_row(r);
        if m.num_value_cols() == before {
            self.branch(m, chosen, partial, state);
        } else {
            state[Stat::Prune] += 1;
        }
        m.restitch(cp);
    }
}

/// The rows at relaxation value one, when every row is integral AND
/// they cover every value column. The coverage guard keeps a degenerate
/// LP vertex from being accepted as a cover.
fn integral_selection(m: &SparseMatrix, relax: &Relaxation) -> Option<Vec<RowId>> {
    let mut sel: BTreeSet<RowId> = BTreeSet::new();
    for r in m.row_ids() {
        let v = relax.soln.get(&r).copied().unwrap_or(0.0);
        if (v - 1.0).abs() <= INT_EPS {
            sel.insert(r);
        } else if INT_EPS < v.abs() {
            return None;
        }
    }
    for c in m.col_ids() {
        if c == COST_COL {
            continue;
        }
        let covered = m
            .col(c)
            .map_or(false, |cells| cells.iter().any(|x| sel.contains(&x.at)));
        if !covered {
            return None;
        }
    }
    Some(sel.into_iter().collect())
}

/// the first row whose relaxation value is not one; any row at all when
/// the relaxation failed or stalled on a degenerate vertex.
fn branch_row(m: &SparseMatrix, relax: &Relaxation) -> Option<RowId> {
    let rows = m.row_ids();
    if relax.success {
        for r in rows.iter() {
            let v = relax.soln.get(r).copied().unwrap_or(0.0);
            if INT_EPS < (v - 1.0).abs() {
                return Some(*r);
            }
        }
    }
    rows.first().copied()
}
