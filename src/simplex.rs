//! Module `simplex` solves the LP relaxation of a candidate matrix with
//! a primal simplex over a throwaway copy.
//!
//! The tableau maximizes the total of the value columns subject to each
//! row's cost bound, so the negated objective at termination is, by LP
//! duality, a lower bound on the cost of any integral row selection
//! covering all columns.

use {
    crate::{
        matrix::{ColId, RowId, SparseMatrix, COST_COL, EPS},
        types::*,
    },
    rand::{rngs::StdRng, Rng, SeedableRng},
    std::collections::HashMap,
};

/// the synthetic objective row appended to the tableau.
const OBJ_ROW: RowId = usize::MAX;

/// The relaxation outcome. When `success` is false the caller must not
/// trust `cost` or `soln` and should treat the branch as unbounded or
/// infeasible.
#[derive(Clone, Debug, Default)]
pub struct Relaxation {
    pub success: bool,
    /// the objective value at termination: a lower bound on the cost of
    /// any integral row selection covering all columns
    pub cost: f64,
    /// slack-shifted map of row id to relaxation value
    pub soln: HashMap<RowId, f64>,
}

/// The LP relaxation oracle; owns the pivot tie-breaking RNG so runs
/// are reproducible under one seed.
#[derive(Debug)]
pub struct Simplex {
    pub iteration_max: usize,
    pub cycle_depth: usize,
    rng: StdRng,
    /// recent pivot positions, newest last
    history: Vec<(RowId, ColId)>,
    pub num_calls: usize,
    pub num_pivots: usize,
}

impl Default for Simplex {
    fn default() -> Self {
        Simplex::instantiate(&Config::default(), &ModelDescription::default())
    }
}

impl Instantiate for Simplex {
    fn instantiate(conf: &Config, _desc: &ModelDescription) -> Self {
        Simplex {
            iteration_max: conf.simplex_iteration_max,
            cycle_depth: conf.simplex_cycle_depth,
            rng: StdRng::seed_from_u64(conf.simplex_seed),
            history: Vec::new(),
            num_calls: 0,
            num_pivots: 0,
        }
    }
}

impl Simplex {
    /// solve the relaxation of `m` (left untouched).
    pub fn relax(&mut self, m: &SparseMatrix) -> Relaxation {
        self.num_calls += 1;
        self.history.clear();
        let mut t = m.create_copy();
        let rows = t.row_ids();
        let value_cols: Vec<ColId> = t.col_ids().into_iter().filter(|c| *c != COST_COL).collect();
        if value_cols.is_empty() {
            // nothing to cover
            return Relaxation {
                success: true,
                cost: 0.0,
                soln: HashMap::new(),
            };
        }
        // objective row: -1 per value column
        let obj: Vec<(ColId, f64)> = value_cols.iter().map(|c| (*c, -1.0)).collect();
        t.add_row(OBJ_ROW, &obj);
        // one slack column per row
        let slack_base = t.max_col_id() + 1;
        let mut slack_of: HashMap<ColId, RowId> = HashMap::new();
        for (k, r) in rows.iter().enumerate() {
            t.add_col(slack_base + k, &[(*r, 1.0)]);
            slack_of.insert(slack_base + k, *r);
        }
        for _ in 0..self.iteration_max {
            let Some(pc) = self.entering_column(&t) else {
                // objective row non-negative everywhere: optimum
                return self.read_solution(&t, &slack_of);
            };
            let Some(pr) = pivot_row(&t, pc) else {
                // no positive ratio: unbounded
                return Relaxation::default();
            };
            if self.cycles(pr, pc) {
                return Relaxation::default();
            }
            self.num_pivots += 1;
            let pv = t.elem_val(pr, pc);
            t.divide_row_by(pr, pv);
            for r in t.row_ids() {
                if r == pr {
                    continue;
                }
                let v = t.elem_val(r, pc);
                if EPS < v.abs() {
                    t.subtract_row_from_row(r, pr, v);
                }
            }
        }
        // iteration cap hit
        Relaxation::default()
    }

    /// most negative objective coefficient; ties by smallest column sum,
    /// then uniformly at random (which also guards against cycling).
    fn entering_column(&mut self, t: &SparseMatrix) -> Option<ColId> {
        let mut best: Vec<ColId> = Vec::new();
        let mut best_coeff = -EPS;
        for c in t.col_ids() {
            if c == COST_COL {
                continue;
            }
            let coeff = t.elem_val(OBJ_ROW, c);
            if coeff < best_coeff - EPS {
                best_coeff = coeff;
                best.clear();
                best.push(c);
            } else if coeff < -EPS && (coeff - best_coeff).abs() <= EPS {
                best.push(c);
            }
        }
        match best.len() {
            0 => None,
            1 => Some(best[0]),
            _ => {
                let sum = |c: ColId| {
                    t.col(c).map_or(0.0, |cells| {
                        cells
                            .iter()
                            .filter(|x| x.at != OBJ_ROW)
                            .map(|x| x.val)
                            .sum()
                    })
                };
                let min = best
                    .iter()
                    .map(|c| sum(*c))
                    .fold(f64::INFINITY, f64::min);
                let slim: Vec<ColId> = best.into_iter().filter(|c| sum(*c) <= min + EPS).collect();
                Some(slim[self.rng.gen_range(0..slim.len())])
            }
        }
    }

    /// declare a cycle when the most recent `n` pivots equal the `n`
    /// before them, for any `n` up to the cycle depth.
    fn cycles(&mut self, pr: RowId, pc: ColId) -> bool {
        self.history.push((pr, pc));
        let h = &self.history;
        for n in 1..=self.cycle_depth {
            if 2 * n <= h.len() && h[h.len() - n..] == h[h.len() - 2 * n..h.len() - n] {
                return true;
            }
        }
        if 2 * self.cycle_depth < h.len() {
            self.history.drain(..h.len() - 2 * self.cycle_depth);
        }
        false
    }

    fn read_solution(&self, t: &SparseMatrix, slack_of: &HashMap<ColId, RowId>) -> Relaxation {
        let mut soln = HashMap::new();
        // a slack's reduced cost at optimum is the dual value of its row
        for (sc, r) in slack_of.iter() {
            let v = t.elem_val(OBJ_ROW, *sc);
            if EPS < v {
                soln.insert(*r, v);
            }
        }
        Relaxation {
            success: true,
            cost: t.elem_val(OBJ_ROW, COST_COL),
            soln,
        }
    }
}

/// minimum positive ratio test over non-objective rows; first improving
/// row found wins a tie.
fn pivot_row(t: &SparseMatrix, pc: ColId) -> Option<RowId> {
    let mut best: Option<(RowId, f64)> = None;
    if let Some(cells) = t.col(pc) {
        for cell in cells.iter() {
            if cell.at == OBJ_ROW || cell.val <= EPS {
                continue;
            }
            let ratio = t.elem_val(cell.at, COST_COL) / cell.val;
            if ratio <= EPS {
                continue;
            }
            match best {
                Some((_, b)) if b <= ratio => (),
                _ => best = Some((cell.at, ratio)),
            }
        }
    }
    best.map(|(r, _)| r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[(RowId, f64, &[ColId])]) -> SparseMatrix {
        let mut m = SparseMatrix::default();
        for (r, cost, cols) in rows {
            let mut cells = vec![(COST_COL, *cost)];
            for c in cols.iter() {
                cells.push((*c, 1.0));
            }
            m.add_row(*r, &cells);
        }
        m
    }

    #[test]
    fn test_single_column_bound() {
        // one column covered by two rows: bound = cheaper row
        let m = matrix(&[(1, 2.0, &[1]), (2, 5.0, &[1])]);
        let mut s = Simplex::default();
        let r = s.relax(&m);
        assert!(r.success);
        assert!((r.cost - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bound_never_exceeds_integral_optimum() {
        // two columns; row 3 covers both for 3.0, rows 1+2 cost 4.0
        let m = matrix(&[
            (1, 2.0, &[1]),
            (2, 2.0, &[2]),
            (3, 3.0, &[1, 2]),
        ]);
        let mut s = Simplex::default();
        let r = s.relax(&m);
        assert!(r.success);
        assert!(r.cost <= 3.0 + 1e-6);
        assert!(0.0 < r.cost);
    }

    #[test]
    fn test_empty_matrix_is_trivial() {
        let m = SparseMatrix::default();
        let mut s = Simplex::default();
        let r = s.relax(&m);
        assert!(r.success);
        assert_eq!(r.cost, 0.0);
        assert!(r.soln.is_empty());
    }

    #[test]
    fn test_relaxation_is_lower_bound_on_covers() {
        // exhaustive check on a small random-ish family
        let m = matrix(&[
            (1, 1.5, &[1, 3]),
            (2, 2.5, &[2]),
            (3, 1.0, &[1]),
            (4, 4.0, &[1, 2, 3]),
        ]);
        let mut s = Simplex::default();
        let r = s.relax(&m);
        assert!(r.success);
        let rows = [(1usize, 1.5), (2, 2.5), (3, 1.0), (4, 4.0)];
        let covers = |mask: usize, col: ColId| -> bool {
            rows.iter().enumerate().any(|(k, (rid, _))| {
                mask & (1 << k) != 0 && m.elem_val(*rid, col) == 1.0
            })
        };
        for mask in 0..16usize {
            if (1..=3).all(|c| covers(mask, c)) {
                let cost: f64 = rows
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| mask & (1 << k) != 0)
                    .map(|(_, (_, w))| *w)
                    .sum();
                assert!(r.cost <= cost + 1e-6, "mask {mask} beat the bound");
            }
        }
    }
}
