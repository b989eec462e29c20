use std::fmt;

/// An argument position inside a clause literal.
///
/// A `Var` ranges over the whole domain on evaluation; a `Func` is an
/// existential ("functional") term resolved by a local search over
/// existing connections. `Elem` is a bound domain element.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    /// a bound domain element
    Elem(usize),
    /// an unbound standard variable, keyed per rule
    Var(u32),
    /// a functional (existential) variable, keyed per rule
    Func(u32),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Elem(e) => write!(f, "{e}"),
            Term::Var(v) => write!(f, "?{v}"),
            Term::Func(v) => write!(f, "?{v}()"),
        }
    }
}

impl Term {
    /// return the bound element, if any.
    #[inline]
    pub fn elem(&self) -> Option<usize> {
        match self {
            Term::Elem(e) => Some(*e),
            _ => None,
        }
    }
    pub fn is_ground(&self) -> bool {
        matches!(self, Term::Elem(_))
    }
    pub fn is_functional(&self) -> bool {
        matches!(self, Term::Func(_))
    }
    /// bind a standard variable; functional terms are left to the
    /// assignment search.
    pub fn bind(&self, var: u32, to: usize) -> Term {
        match self {
            Term::Var(v) if *v == var => Term::Elem(to),
            t => *t,
        }
    }
}
