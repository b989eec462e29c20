//! Cooled row/column reduction: once every clause touching a rank has
//! left the queue, rows and columns below that rank are frozen and can
//! be checked for domination without racing future resolvents.

use {
    super::generate::Generator,
    crate::{
        model::Model,
        state::{Stat, State},
        types::LinkId,
    },
    std::collections::BTreeSet,
};

impl Generator {
    /// Reduce everything of rank below `threshold`, to a fixpoint:
    ///
    /// * a row is dropped when another row covers a superset of its
    ///   columns strictly cheaper;
    /// * a column is dropped when another column's link set is contained
    ///   in it (the contained one is the harder constraint).
    pub(super) fn reduce(&mut self, threshold: usize, data: &Model, state: &mut State) {
        loop {
            let rows = self.reduce_rows(threshold, data, state);
            let cols = self.reduce_cols(threshold, state);
            if !rows && !cols {
                break;
            }
        }
        self.purge_satisfied(threshold);
    }

    fn reduce_rows(&mut self, threshold: usize, data: &Model, state: &mut State) -> bool {
        // cols_of over effective link sets
        let alive: Vec<(LinkId, BTreeSet<usize>)> = {
            let mut per_row: std::collections::BTreeMap<LinkId, BTreeSet<usize>> =
                std::collections::BTreeMap::new();
            for c in self.columns.iter().filter(|c| c.alive) {
                for l in self.effective_links(c) {
                    per_row.entry(l).or_default().insert(c.id);
                }
            }
            per_row.into_iter().collect()
        };
        let unit = self.concrete_flip_cost;
        let mut changed = false;
        for (r, r_cols) in alive.iter() {
            if threshold <= self.rank(*r) {
                continue;
            }
            let r_cost = data.flip_cost(*r, unit);
            let dominated = alive.iter().any(|(s, s_cols)| {
                s != r && data.flip_cost(*s, unit) < r_cost && r_cols.is_subset(s_cols)
            });
            if dominated {
                #[cfg(feature = "trace_generation")]
                println!("c drop row {r}");
                self.dropped_rows.insert(*r);
                state[Stat::RowDrop] += 1;
                changed = true;
            }
        }
        changed
    }

    fn reduce_cols(&mut self, threshold: usize, state: &mut State) -> bool {
        let snapshot: Vec<(usize, usize, BTreeSet<LinkId>)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.alive)
            .map(|(i, c)| (i, c.max_rank, self.effective_links(c)))
            .collect();
        let mut drop: Vec<usize> = Vec::new();
        for (i, max_rank, links) in snapshot.iter() {
            if threshold <= *max_rank {
                continue;
            }
            let implied = snapshot.iter().any(|(j, _, other)| {
                j != i
                    && !drop.contains(j)
                    && (other.is_subset(links) && (other.len() < links.len() || j < i))
            });
            if implied {
                drop.push(*i);
            }
        }
        for i in drop.iter() {
            #[cfg(feature = "trace_generation")]
            println!("c drop column {}", self.columns[*i].id);
            self.columns[*i].alive = false;
            state[Stat::ColDrop] += 1;
        }
        !drop.is_empty()
    }
}
