//! Violated-rule column generation: extract base rules, resolve them
//! into new candidates under subsumption pruning, and emit the sparse
//! set-cover matrix the solver branches on.

use {
    super::Saturator,
    crate::{
        clause::Clause,
        matrix::{ColId, SparseMatrix, COST_COL},
        model::Model,
        state::{Stat, State},
        types::*,
    },
    std::{
        cmp::{Ordering, Reverse},
        collections::{BinaryHeap, BTreeMap, BTreeSet},
    },
};

/// One emitted candidate column: flipping any of `links` satisfies the
/// clause it came from.
#[derive(Clone, Debug)]
pub struct ColumnRecord {
    pub id: ColId,
    pub links: BTreeSet<LinkId>,
    pub max_rank: usize,
    pub alive: bool,
}

/// queue priority `(score, length, clause order)`, cheapest first.
#[derive(Clone, Debug, Eq, PartialEq)]
struct QueueEntry(Clause);

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .cmp(&other.0.score)
            .then_with(|| self.0.len().cmp(&other.0.len()))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The column generator. One instance runs one generation pass; the
/// growing solver creates a fresh one per outer iteration.
#[derive(Debug, Default)]
pub struct Generator {
    /// emitted columns in emission order; ids start at 1
    pub columns: Vec<ColumnRecord>,
    /// rows retired by domination
    pub dropped_rows: BTreeSet<LinkId>,
    /// per link, the number of base rules it appears in
    ranks: BTreeMap<LinkId, usize>,
    queue: BinaryHeap<Reverse<QueueEntry>>,
    /// satisfied clauses, kept for subsumption until reduction purges them
    satisfied: Vec<Clause>,
    discarded: Vec<Clause>,
    /// ranks below this have been through cooled reduction already
    pub(super) threshold: usize,
    next_col: ColId,
    resolvent_literal_limit: usize,
    subsume_literal_limit: usize,
    generate_loop_limit: usize,
    pub(super) concrete_flip_cost: f64,
}

impl Instantiate for Generator {
    fn instantiate(conf: &Config, _desc: &ModelDescription) -> Self {
        Generator {
            next_col: COST_COL + 1,
            resolvent_literal_limit: conf.resolvent_literal_limit,
            subsume_literal_limit: conf.subsume_literal_limit,
            generate_loop_limit: conf.generate_loop_limit,
            concrete_flip_cost: conf.concrete_flip_cost,
            ..Generator::default()
        }
    }
}

impl Generator {
    /// Run one full generation pass.
    ///
    /// * `data` carries the weights and immutable facts; clause
    ///   satisfaction (hence column membership) is measured against it.
    /// * `base` is the model whose connections ground the premises: the
    ///   reduced complete graph, or the partial base of a growing pass.
    pub fn generate(
        &mut self,
        data: &Model,
        base: &Model,
        rules: &[Clause],
        sat: &Saturator,
        state: &mut State,
    ) -> MaybeInconsistent {
        self.extract_base_rules(data, base, rules, state)?;
        let mut steps = 0usize;
        while let Some(Reverse(QueueEntry(clause))) = self.queue.pop() {
            if state.is_canceled() {
                return Err(SolverError::Canceled);
            }
            steps += 1;
            if self.generate_loop_limit < steps {
                // over budget: emit what is queued, stop resolving
                self.place(data, &clause, state);
                continue;
            }
            if self.threshold < clause.score {
                let threshold = clause.score;
                self.reduce(threshold, data, state);
                self.threshold = threshold;
            }
            if !self.place(data, &clause, state) {
                continue;
            }
            self.resolve_against_queue(data, &clause, sat, state);
        }
        self.reduce(usize::MAX, data, state);
        Ok(())
    }

    /// ground every rule over `base`, simplify against the immutable
    /// facts of `data`, dedup, rank, and queue.
    fn extract_base_rules(
        &mut self,
        data: &Model,
        base: &Model,
        rules: &[Clause],
        state: &mut State,
    ) -> MaybeInconsistent {
        let mut bases: Vec<Clause> = Vec::new();
        for rule in rules.iter() {
            if state.is_canceled() {
                return Err(SolverError::Canceled);
            }
            for inst in rule.satisfied_premise_instances(base) {
                if let Some(c) = inst.simplify(data)? {
                    bases.push(c);
                }
            }
        }
        bases.sort_unstable();
        bases.dedup();
        state[Stat::BaseRule] += bases.len();
        for c in bases.iter() {
            for l in c.links(data) {
                *self.ranks.entry(l).or_insert(0) += 1;
            }
        }
        for mut c in bases {
            self.assign_score(data, &mut c);
            self.queue.push(Reverse(QueueEntry(c)));
        }
        Ok(())
    }

    fn assign_score(&self, data: &Model, c: &mut Clause) {
        let mut lo = usize::MAX;
        let mut hi = 0;
        for l in c.links(data) {
            let r = self.ranks.get(&l).copied().unwrap_or(0);
            lo = lo.min(r);
            hi = hi.max(r);
        }
        c.score = if lo == usize::MAX { 0 } else { lo };
        c.max_score = hi;
    }

    /// File a popped clause: satisfied ones go to the cache, violated
    /// ones become columns. Returns whether the clause stays active as a
    /// resolution source.
    fn place(&mut self, data: &Model, clause: &Clause, state: &mut State) -> bool {
        if clause.is_satisfied(data) {
            self.satisfied.push(clause.clone());
            return true;
        }
        let links: BTreeSet<LinkId> = clause.links(data).into_iter().collect();
        if links.is_empty() {
            return false;
        }
        #[cfg(feature = "trace_generation")]
        println!("c emit column {} for {clause}", self.next_col);
        self.columns.push(ColumnRecord {
            id: self.next_col,
            max_rank: clause.max_score,
            links,
            alive: true,
        });
        self.next_col += 1;
        state[Stat::Column] += 1;
        true
    }

    /// resolve `clause` against everything still queued and push the
    /// resolvents that survive pruning.
    fn resolve_against_queue(
        &mut self,
        data: &Model,
        clause: &Clause,
        sat: &Saturator,
        state: &mut State,
    ) {
        let partners: Vec<Clause> = self
            .queue
            .iter()
            .map(|Reverse(QueueEntry(q))| q.clone())
            .collect();
        for q in partners {
            let Some(mut r) = clause.resolve(&q) else {
                continue;
            };
            if self.resolvent_literal_limit < r.len() {
                continue;
            }
            if self.prune(data, clause, &q, &r, sat) {
                state[Stat::Subsumed] += 1;
                self.discarded.push(r);
                continue;
            }
            self.assign_score(data, &mut r);
            state[Stat::Resolvent] += 1;
            #[cfg(feature = "trace_generation")]
            println!("c resolvent {r}");
            self.queue.push(Reverse(QueueEntry(r)));
        }
    }

    /// the pruning battery a resolvent must survive.
    fn prune(
        &self,
        data: &Model,
        parent1: &Clause,
        parent2: &Clause,
        r: &Clause,
        sat: &Saturator,
    ) -> bool {
        if parent1.subsumes(r) || parent2.subsumes(r) {
            return true;
        }
        if self.implied_by_derivation(data, r, sat) {
            return true;
        }
        let rl: BTreeSet<LinkId> = r.links(data).into_iter().collect();
        if self
            .columns
            .iter()
            .filter(|c| c.alive)
            .any(|c| c.links.is_subset(&rl))
        {
            return true;
        }
        if r.len() <= self.subsume_literal_limit {
            let caches = self
                .queue
                .iter()
                .map(|Reverse(QueueEntry(q))| q)
                .chain(self.satisfied.iter())
                .chain(self.discarded.iter());
            for c in caches {
                if c.len() <= self.subsume_literal_limit && c.subsumes(r) {
                    return true;
                }
            }
        }
        false
    }

    /// A resolvent whose conclusion is derivable from a unifying premise
    /// set contained in its own premises says nothing new.
    fn implied_by_derivation(&self, data: &Model, r: &Clause, sat: &Saturator) -> bool {
        let premises: BTreeSet<LinkId> = r.premise_links(data).into_iter().collect();
        r.conclusion_links(data).iter().any(|l| {
            matches!(sat.derived.get(l),
                Some(super::Premises::Units(ps)) if ps.is_subset(&premises))
        })
    }

    /// the number of base rules `l` appears in.
    pub(super) fn rank(&self, l: LinkId) -> usize {
        self.ranks.get(&l).copied().unwrap_or(0)
    }

    /// the effective link set of a column, dominated rows excluded.
    pub(super) fn effective_links(&self, c: &ColumnRecord) -> BTreeSet<LinkId> {
        c.links
            .difference(&self.dropped_rows)
            .copied()
            .collect()
    }

    /// drop satisfied-cache clauses whose every rank sits below the
    /// reduction threshold; they can no longer subsume anything queued.
    pub(super) fn purge_satisfied(&mut self, threshold: usize) {
        self.satisfied.retain(|c| threshold <= c.max_score);
    }

    /// Assemble the set-cover matrix: one row per surviving link with
    /// its flip cost in column 0 and a unit entry per column using it.
    pub fn build_matrix(&self, data: &Model) -> SparseMatrix {
        let mut per_row: BTreeMap<LinkId, Vec<(ColId, f64)>> = BTreeMap::new();
        for c in self.columns.iter().filter(|c| c.alive) {
            for l in self.effective_links(c) {
                per_row.entry(l).or_default().push((c.id, 1.0));
            }
        }
        let mut m = SparseMatrix::default();
        for (l, mut cells) in per_row {
            let cost = data.flip_cost(l, self.concrete_flip_cost);
            cells.insert(0, (COST_COL, cost));
            m.add_row(l.0, &cells);
        }
        m
    }

    /// links of the matrix rows, for mapping a cover back to flips.
    pub fn row_links(&self) -> Vec<LinkId> {
        let mut v: Vec<LinkId> = self
            .columns
            .iter()
            .filter(|c| c.alive)
            .flat_map(|c| self.effective_links(c))
            .collect();
        v.sort_unstable();
        v.dedup();
        v
    }
}
