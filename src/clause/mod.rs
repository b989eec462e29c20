//! Module `clause` implements rule instances: ordered premise and
//! conclusion literals over bound, variable and functional terms.

/// assignment enumeration
mod assign;
/// resolution and subsumption
mod resolve;

pub use self::assign::AssignFilter;

use {
    crate::{model::Model, types::*},
    std::{cmp::Ordering, fmt},
};

/// One literal: `(graph, left term, right term)`. Membership literals
/// carry the same term on both sides.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CLiteral {
    pub graph: GraphId,
    pub left: Term,
    pub right: Term,
}

impl fmt::Display for CLiteral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "g{}({},{})", self.graph, self.left, self.right)
    }
}

impl CLiteral {
    pub fn new(graph: GraphId, left: Term, right: Term) -> Self {
        CLiteral { graph, left, right }
    }
    pub fn is_ground(&self) -> bool {
        self.left.is_ground() && self.right.is_ground()
    }
    pub fn has_functional(&self) -> bool {
        self.left.is_functional() || self.right.is_functional()
    }
    /// the link a ground literal addresses.
    pub fn link(&self, model: &Model) -> Option<LinkId> {
        match (self.left.elem(), self.right.elem()) {
            (Some(i), Some(j)) => Some(model.link(self.graph, i, j)),
            _ => None,
        }
    }
    pub fn bind(&self, var: u32, to: usize) -> CLiteral {
        CLiteral {
            graph: self.graph,
            left: self.left.bind(var, to),
            right: self.right.bind(var, to),
        }
    }
}

/// A rule instance: `premises -> conclusions`.
///
/// Satisfied when some premise is false or some conclusion is true.
/// `score`/`max_score` are the generation-queue ranks, assigned by the
/// processor and ignored by equality and ordering.
#[derive(Clone, Debug, Default)]
pub struct Clause {
    pub premises: Vec<CLiteral>,
    pub conclusions: Vec<CLiteral>,
    pub score: usize,
    pub max_score: usize,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let side = |ls: &[CLiteral]| {
            ls.iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        };
        write!(f, "{} -> {}", side(&self.premises), side(&self.conclusions))
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        self.premises == other.premises && self.conclusions == other.conclusions
    }
}

impl Eq for Clause {}

impl PartialOrd for Clause {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering key `(premise count, length, literal-wise lexicographic)`,
/// used for deduplication and queue priority.
impl Ord for Clause {
    fn cmp(&self, other: &Self) -> Ordering {
        self.premises
            .len()
            .cmp(&other.premises.len())
            .then_with(|| self.len().cmp(&other.len()))
            .then_with(|| self.premises.cmp(&other.premises))
            .then_with(|| self.conclusions.cmp(&other.conclusions))
    }
}

impl Clause {
    pub fn new(premises: Vec<CLiteral>, conclusions: Vec<CLiteral>) -> Self {
        Clause {
            premises,
            conclusions,
            score: 0,
            max_score: 0,
        }
    }
    pub fn len(&self) -> usize {
        self.premises.len() + self.conclusions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.premises.is_empty() && self.conclusions.is_empty()
    }
    pub fn is_ground(&self) -> bool {
        self.iter().all(|l| l.is_ground())
    }
    pub fn iter(&self) -> impl Iterator<Item = &CLiteral> {
        self.premises.iter().chain(self.conclusions.iter())
    }
    pub fn bind(&self, var: u32, to: usize) -> Clause {
        Clause::new(
            self.premises.iter().map(|l| l.bind(var, to)).collect(),
            self.conclusions.iter().map(|l| l.bind(var, to)).collect(),
        )
    }
    /// the link set of a ground clause, sorted and deduplicated; this is
    /// the candidate column an unsatisfied clause induces.
    pub fn links(&self, model: &Model) -> Vec<LinkId> {
        let mut v: Vec<LinkId> = self.iter().filter_map(|l| l.link(model)).collect();
        v.sort_unstable();
        v.dedup();
        v
    }
    /// the links of the premise side only.
    pub fn premise_links(&self, model: &Model) -> Vec<LinkId> {
        let mut v: Vec<LinkId> = self.premises.iter().filter_map(|l| l.link(model)).collect();
        v.sort_unstable();
        v.dedup();
        v
    }
    /// the links of the conclusion side only.
    pub fn conclusion_links(&self, model: &Model) -> Vec<LinkId> {
        let mut v: Vec<LinkId> = self
            .conclusions
            .iter()
            .filter_map(|l| l.link(model))
            .collect();
        v.sort_unstable();
        v.dedup();
        v
    }

    /// Does some assignment of functional terms make `lit` hold in
    /// `model`? Ground literals answer directly; a literal with a
    /// functional term searches existing connections for a witness.
    pub fn literal_holds(model: &Model, lit: &CLiteral) -> bool {
        match (lit.left.elem(), lit.right.elem()) {
            (Some(i), Some(j)) => model.is_connected(model.link(lit.graph, i, j)),
            (Some(i), None) if lit.right.is_functional() => {
                (0..model.num_elements()).any(|j| model.is_connected(model.link(lit.graph, i, j)))
            }
            (None, Some(j)) if lit.left.is_functional() => {
                (0..model.num_elements()).any(|i| model.is_connected(model.link(lit.graph, i, j)))
            }
            // an unresolvable functional pair or a stray variable
            // discards the disjunct
            _ => false,
        }
    }

    /// satisfaction against `model`: some premise false or some
    /// conclusion true, with functional terms resolved by search.
    pub fn is_satisfied(&self, model: &Model) -> bool {
        self.premises.iter().any(|l| !Self::literal_holds(model, l))
            || self
                .conclusions
                .iter()
                .any(|l| Self::literal_holds(model, l))
    }

    /// Simplify against immutable facts of `model`:
    /// * drop premises guaranteed true (forced facts);
    /// * drop conclusions guaranteed false (impossible facts);
    /// * a premise guaranteed false or a conclusion guaranteed true
    ///   satisfies the clause outright (`Ok(None)`);
    /// * a clause reduced to nothing is a contradiction.
    pub fn simplify(&self, model: &Model) -> Result<Option<Clause>, SolverError> {
        let mut premises = Vec::with_capacity(self.premises.len());
        for l in self.premises.iter() {
            if let Some(link) = l.link(model) {
                if model.is_forced(link) {
                    continue;
                }
                if model.is_impossible(link) {
                    return Ok(None);
                }
            }
            premises.push(*l);
        }
        let mut conclusions = Vec::with_capacity(self.conclusions.len());
        for l in self.conclusions.iter() {
            if let Some(link) = l.link(model) {
                if model.is_forced(link) {
                    return Ok(None);
                }
                if model.is_impossible(link) {
                    continue;
                }
            }
            conclusions.push(*l);
        }
        let c = Clause::new(premises, conclusions);
        if c.is_empty() {
            return Err(SolverError::Contradiction(LinkId::default()));
        }
        Ok(Some(c))
    }

    /// Expand each functional conclusion term over the whole domain,
    /// turning the existential into an explicit disjunction of ground
    /// disjuncts. Terms are expanded per literal, exact for the
    /// single-functional-term case; premise-side functional terms are
    /// left to witness search (documented partial behavior).
    pub fn multiplex_functional(&self, n: usize) -> Clause {
        let mut conclusions: Vec<CLiteral> = Vec::new();
        for l in self.conclusions.iter() {
            if !l.has_functional() {
                if !conclusions.contains(l) {
                    conclusions.push(*l);
                }
                continue;
            }
            let mut expanded = vec![*l];
            for v in func_vars(l) {
                let mut next = Vec::with_capacity(expanded.len() * n);
                for lit in expanded.iter() {
                    for e in 0..n {
                        next.push(bind_func(lit, v, e));
                    }
                }
                expanded = next;
            }
            for lit in expanded {
                if !conclusions.contains(&lit) {
                    conclusions.push(lit);
                }
            }
        }
        Clause::new(self.premises.clone(), conclusions)
    }
}

fn func_vars(lit: &CLiteral) -> Vec<u32> {
    let mut vars = Vec::new();
    for t in [lit.left, lit.right] {
        if let Term::Func(v) = t {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
    }
    vars
}

fn bind_func(lit: &CLiteral, v: u32, e: usize) -> CLiteral {
    let f = |t: Term| match t {
        Term::Func(w) if w == v => Term::Elem(e),
        t => t,
    };
    CLiteral {
        graph: lit.graph,
        left: f(lit.left),
        right: f(lit.right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Graph, Weight};

    fn lit(g: GraphId, i: usize, j: usize) -> CLiteral {
        CLiteral::new(g, Term::Elem(i), Term::Elem(j))
    }

    fn chain_model() -> Model {
        let mut m = Model::new(3);
        let g = m.add_graph("r", Graph::weighted(3, -1.0));
        m.set_weight(g, 0, 1, Weight { log_on: -0.1, log_off: -3.0 });
        m.set_weight(g, 1, 2, Weight { log_on: -0.1, log_off: -3.0 });
        m
    }

    #[test]
    fn test_satisfaction() {
        let m = chain_model();
        // r(0,1); r(1,2) -> r(0,2) is violated
        let c = Clause::new(vec![lit(0, 0, 1), lit(0, 1, 2)], vec![lit(0, 0, 2)]);
        assert!(!c.is_satisfied(&m));
        // a false premise satisfies
        let c2 = Clause::new(vec![lit(0, 2, 0)], vec![lit(0, 0, 2)]);
        assert!(c2.is_satisfied(&m));
        // a true conclusion satisfies
        let c3 = Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 1, 2)]);
        assert!(c3.is_satisfied(&m));
    }

    #[test]
    fn test_functional_witness_search() {
        let m = chain_model();
        // r(0, x()) has the witness x = 1
        let c = Clause::new(
            vec![],
            vec![CLiteral::new(0, Term::Elem(0), Term::Func(0))],
        );
        assert!(c.is_satisfied(&m));
        // r(2, x()) has none
        let c2 = Clause::new(
            vec![],
            vec![CLiteral::new(0, Term::Elem(2), Term::Func(0))],
        );
        assert!(!c2.is_satisfied(&m));
    }

    #[test]
    fn test_ordering_key() {
        let a = Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 0, 2)]);
        let b = Clause::new(vec![lit(0, 0, 1), lit(0, 1, 2)], vec![]);
        assert!(a < b); // fewer premises first
        let c = Clause::new(vec![lit(0, 0, 1)], vec![]);
        assert!(c < a); // shorter first
    }

    #[test]
    fn test_simplify_drops_forced_premises() {
        let mut m = chain_model();
        m.set_forced(0, 0, 1, true);
        let c = Clause::new(vec![lit(0, 0, 1), lit(0, 1, 2)], vec![lit(0, 0, 2)]);
        let s = c.simplify(&m).expect("no contradiction").expect("kept");
        assert_eq!(s.premises, vec![lit(0, 1, 2)]);
    }

    #[test]
    fn test_simplify_contradiction() {
        let mut m = chain_model();
        m.set_forced(0, 0, 1, true);
        m.set_forced(0, 0, 2, false);
        let c = Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 0, 2)]);
        assert!(matches!(
            c.simplify(&m),
            Err(SolverError::Contradiction(_))
        ));
    }

    #[test]
    fn test_multiplex_functional() {
        let c = Clause::new(
            vec![lit(0, 0, 1)],
            vec![CLiteral::new(0, Term::Elem(1), Term::Func(0))],
        );
        let out = c.multiplex_functional(3);
        assert!(out.is_ground());
        assert_eq!(out.premises, c.premises);
        // one disjunct per domain element: the existential as a disjunction
        assert_eq!(
            out.conclusions,
            vec![lit(0, 1, 0), lit(0, 1, 1), lit(0, 1, 2)]
        );
    }
}
