//! Assignment enumeration: the single mechanism used both to score
//! clauses and to build candidate columns.

use {
    super::{CLiteral, Clause},
    crate::{model::Model, types::*},
};

/// Which assignments `for_each_assignment` visits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssignFilter {
    /// every concrete assignment
    All,
    /// only assignments whose premises already hold in the model
    PremisesHold,
    /// only assignments whose conclusions all fail in the model
    ConclusionsFail,
}

impl Clause {
    /// the distinct standard variables of this clause, in first-use order.
    fn free_vars(&self) -> Vec<u32> {
        let mut vars = Vec::new();
        for l in self.iter() {
            for t in [l.left, l.right] {
                if let Term::Var(v) = t {
                    if !vars.contains(&v) {
                        vars.push(v);
                    }
                }
            }
        }
        vars
    }

    /// Enumerate every concrete assignment of this clause's free
    /// standard variables over the model's domain, visiting the bound
    /// clause. Functional terms are left unbound; they are resolved by
    /// witness search inside satisfaction tests (and multiplexed before
    /// column building), which is exact for the single-functional-term
    /// case.
    pub fn for_each_assignment<F>(&self, model: &Model, filter: AssignFilter, mut visit: F)
    where
        F: FnMut(&Clause),
    {
        let vars = self.free_vars();
        let n = model.num_elements();
        if vars.is_empty() {
            if self.admits(model, filter) {
                visit(self);
            }
            return;
        }
        // odometer over the domain, one digit per variable
        let mut digits = vec![0usize; vars.len()];
        loop {
            let mut bound = self.clone();
            for (v, e) in vars.iter().zip(digits.iter()) {
                bound = bound.bind(*v, *e);
            }
            if bound.admits(model, filter) {
                visit(&bound);
            }
            let mut k = 0;
            loop {
                if k == digits.len() {
                    return;
                }
                digits[k] += 1;
                if digits[k] < n {
                    break;
                }
                digits[k] = 0;
                k += 1;
            }
        }
    }

    fn admits(&self, model: &Model, filter: AssignFilter) -> bool {
        match filter {
            AssignFilter::All => true,
            AssignFilter::PremisesHold => self
                .premises
                .iter()
                .all(|l| Clause::literal_holds(model, l)),
            AssignFilter::ConclusionsFail => !self
                .conclusions
                .iter()
                .any(|l| Clause::literal_holds(model, l)),
        }
    }

    /// ground instances with satisfied premises: the base-rule extractor.
    pub fn satisfied_premise_instances(&self, model: &Model) -> Vec<Clause> {
        let mut out = Vec::new();
        self.for_each_assignment(model, AssignFilter::PremisesHold, |c| {
            let inst = c.multiplex_functional(model.num_elements());
            if inst.premises.iter().all(|l| literal_ground_holds(model, l)) {
                out.push(inst);
            }
        });
        out.sort_unstable();
        out.dedup();
        out
    }
}

fn literal_ground_holds(model: &Model, l: &CLiteral) -> bool {
    l.link(model).map_or(false, |k| model.is_connected(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Graph;

    fn lit(g: GraphId, l: Term, r: Term) -> CLiteral {
        CLiteral::new(g, l, r)
    }

    #[test]
    fn test_enumerates_whole_domain() {
        let mut m = Model::new(3);
        let g = m.add_graph("r", Graph::concrete(3));
        let c = Clause::new(
            vec![lit(g, Term::Var(0), Term::Var(1))],
            vec![lit(g, Term::Var(1), Term::Var(0))],
        );
        let mut count = 0;
        c.for_each_assignment(&m, AssignFilter::All, |b| {
            assert!(b.is_ground());
            count += 1;
        });
        assert_eq!(count, 9);
    }

    #[test]
    fn test_premise_filter() {
        let mut m = Model::new(3);
        let g = m.add_graph("r", Graph::concrete(3));
        m.add(m.link(g, 0, 1));
        m.add(m.link(g, 1, 2));
        let c = Clause::new(
            vec![lit(g, Term::Var(0), Term::Var(1)), lit(g, Term::Var(1), Term::Var(2))],
            vec![lit(g, Term::Var(0), Term::Var(2))],
        );
        let mut seen = Vec::new();
        c.for_each_assignment(&m, AssignFilter::PremisesHold, |b| {
            seen.push(b.clone());
        });
        // only x=0, y=1, z=2 satisfies both premises
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].premise_links(&m), vec![m.link(g, 0, 1), m.link(g, 1, 2)]);
    }
}
