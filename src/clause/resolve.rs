//! Resolution between ground clauses and the subsumption order used to
//! prune the generation queue.

use super::{CLiteral, Clause};

impl Clause {
    /// Resolve `self`'s conclusion against `other`'s premise on an
    /// identical ground literal. The resolvent merges the remaining
    /// sides; `None` when no literal matches or the result collapses.
    pub fn resolve_on(&self, other: &Clause) -> Option<Clause> {
        let pivot = self
            .conclusions
            .iter()
            .find(|c| other.premises.contains(c))?;
        let pivot = *pivot;
        let mut premises: Vec<CLiteral> = self.premises.clone();
        for p in other.premises.iter() {
            if *p != pivot && !premises.contains(p) {
                premises.push(*p);
            }
        }
        let mut conclusions: Vec<CLiteral> = self
            .conclusions
            .iter()
            .filter(|c| **c != pivot)
            .copied()
            .collect();
        for c in other.conclusions.iter() {
            if !conclusions.contains(c) {
                conclusions.push(*c);
            }
        }
        // a literal on both sides makes the resolvent a tautology
        if premises.iter().any(|p| conclusions.contains(p)) {
            return None;
        }
        let r = Clause::new(premises, conclusions);
        if r.is_empty() {
            return None;
        }
        Some(r)
    }

    /// try resolution in both orientations, preferring `self` as the
    /// conclusion side.
    pub fn resolve(&self, other: &Clause) -> Option<Clause> {
        self.resolve_on(other).or_else(|| other.resolve_on(self))
    }

    /// `self` subsumes `other` iff every satisfier of `self` satisfies
    /// `other`; for ground clauses that is literal-set inclusion on both
    /// sides.
    pub fn subsumes(&self, other: &Clause) -> bool {
        if other.len() < self.len() {
            return false;
        }
        self.premises
            .iter()
            .all(|p| other.premises.contains(p))
            && self
                .conclusions
                .iter()
                .all(|c| other.conclusions.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::types::{GraphId, Term},
    };

    fn lit(g: GraphId, i: usize, j: usize) -> CLiteral {
        CLiteral::new(g, Term::Elem(i), Term::Elem(j))
    }

    #[test]
    fn test_resolution() {
        // a -> b  and  b -> c  resolve to  a -> c
        let ab = Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 1, 2)]);
        let bc = Clause::new(vec![lit(0, 1, 2)], vec![lit(0, 2, 3)]);
        let r = ab.resolve(&bc).expect("resolvable");
        assert_eq!(r, Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 2, 3)]));
    }

    #[test]
    fn test_resolution_rejects_tautology() {
        // a -> b  and  b -> a  resolve to the tautology  a -> a
        let ab = Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 1, 2)]);
        let ba = Clause::new(vec![lit(0, 1, 2)], vec![lit(0, 0, 1)]);
        assert_eq!(ab.resolve(&ba), None);
    }

    #[test]
    fn test_no_common_literal() {
        let ab = Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 1, 2)]);
        let cd = Clause::new(vec![lit(0, 2, 3)], vec![lit(0, 3, 4)]);
        assert_eq!(ab.resolve(&cd), None);
    }

    #[test]
    fn test_subsumption_is_inclusion() {
        let small = Clause::new(vec![lit(0, 0, 1)], vec![lit(0, 1, 2)]);
        let large = Clause::new(vec![lit(0, 0, 1), lit(0, 2, 2)], vec![lit(0, 1, 2)]);
        assert!(small.subsumes(&large));
        assert!(!large.subsumes(&small));
        assert!(small.subsumes(&small));
    }
}
