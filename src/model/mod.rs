//! Module `model` implements named binary relations ("graphs") over a
//! finite domain, and the `Model` holding them.
//!
//! The variant set is closed: concrete (boolean), weighted (log-odds),
//! equality and set-membership graphs, dispatched by exhaustive match.

use {
    crate::types::*,
    std::{collections::BTreeSet, fmt},
};

/// One cell of a weighted graph: `log P` and `log (1 - P)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weight {
    pub log_on: f64,
    pub log_off: f64,
}

impl Weight {
    /// the data says "connected" when being on is the likelier state.
    #[inline]
    pub fn connected(&self) -> bool {
        self.log_off <= self.log_on
    }
    /// log-odds distance, the price of flipping the cell.
    #[inline]
    pub fn flip_cost(&self) -> f64 {
        (self.log_on - self.log_off).abs()
    }
}

/// A named binary relation over the domain.
#[derive(Clone, Debug)]
pub enum Graph {
    /// plain boolean cells
    Concrete { flags: Vec<FlagCell> },
    /// log-odds weighted cells; `base` fills cells never written to
    Weighted {
        flags: Vec<FlagCell>,
        weights: Vec<Weight>,
        base: Weight,
    },
    /// `i == j`, fixed
    Equality,
    /// `i == j && i ∈ members`, fixed
    Membership { members: BTreeSet<usize> },
}

impl Graph {
    pub fn concrete(n: usize) -> Graph {
        Graph::Concrete {
            flags: vec![FlagCell::MUTABLE; n * n],
        }
    }
    /// a weighted graph whose unwritten cells sit at the base log-density.
    pub fn weighted(n: usize, base_density: f64) -> Graph {
        let base = Weight {
            log_on: base_density,
            log_off: 0.0,
        };
        let mut init = FlagCell::MUTABLE;
        init.set(FlagCell::CONNECTED, base.connected());
        Graph::Weighted {
            flags: vec![init; n * n],
            weights: vec![base; n * n],
            base,
        }
    }
    pub fn equality() -> Graph {
        Graph::Equality
    }
    pub fn membership(members: BTreeSet<usize>) -> Graph {
        Graph::Membership { members }
    }
}

/// An ordered collection of named graphs sharing one domain.
///
/// The graph ordering is stable, so a `LinkId` means the same cell in
/// every model copy derived from this one.
#[derive(Clone, Debug, Default)]
pub struct Model {
    codec: LinkCodec,
    names: Vec<String>,
    graphs: Vec<Graph>,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Model({} elements, {} graphs)",
            self.codec.n,
            self.graphs.len()
        )
    }
}

impl Model {
    pub fn new(n: usize) -> Model {
        Model {
            codec: LinkCodec::new(n),
            names: Vec::new(),
            graphs: Vec::new(),
        }
    }
    /// the domain size.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.codec.n
    }
    #[inline]
    pub fn num_graphs(&self) -> usize {
        self.graphs.len()
    }
    #[inline]
    pub fn codec(&self) -> LinkCodec {
        self.codec
    }
    pub fn graph_id(&self, name: &str) -> Option<GraphId> {
        self.names.iter().position(|x| x == name)
    }
    pub fn graph_name(&self, g: GraphId) -> &str {
        &self.names[g]
    }
    pub fn add_graph(&mut self, name: &str, graph: Graph) -> GraphId {
        debug_assert!(self.graph_id(name).is_none());
        self.names.push(name.to_string());
        self.graphs.push(graph);
        self.graphs.len() - 1
    }
    #[inline]
    pub fn link(&self, g: GraphId, i: usize, j: usize) -> LinkId {
        self.codec.encode(g, i, j)
    }
    /// iterate over all link ids of one graph.
    pub fn links_of(&self, g: GraphId) -> impl Iterator<Item = LinkId> + '_ {
        let n = self.codec.n;
        (0..n).flat_map(move |i| (0..n).map(move |j| self.codec.encode(g, i, j)))
    }
    /// iterate over every link id of the model.
    pub fn all_links(&self) -> impl Iterator<Item = LinkId> + '_ {
        (0..self.graphs.len()).flat_map(move |g| self.links_of(g))
    }

    pub fn is_connected(&self, l: LinkId) -> bool {
        let (g, i, j) = self.codec.decode(l);
        let at = i * self.codec.n + j;
        match &self.graphs[g] {
            Graph::Concrete { flags } => flags[at].contains(FlagCell::CONNECTED),
            Graph::Weighted { flags, .. } => flags[at].contains(FlagCell::CONNECTED),
            Graph::Equality => i == j,
            Graph::Membership { members } => i == j && members.contains(&i),
        }
    }
    pub fn is_mutable(&self, l: LinkId) -> bool {
        let (g, i, j) = self.codec.decode(l);
        let at = i * self.codec.n + j;
        match &self.graphs[g] {
            Graph::Concrete { flags } => flags[at].contains(FlagCell::MUTABLE),
            Graph::Weighted { flags, .. } => flags[at].contains(FlagCell::MUTABLE),
            Graph::Equality | Graph::Membership { .. } => false,
        }
    }
    /// an immutable cell which holds: a compulsory fact.
    pub fn is_forced(&self, l: LinkId) -> bool {
        let (g, i, j) = self.codec.decode(l);
        let at = i * self.codec.n + j;
        match &self.graphs[g] {
            Graph::Concrete { flags } | Graph::Weighted { flags, .. } => {
                flags[at].contains(FlagCell::FORCED)
            }
            Graph::Equality => i == j,
            Graph::Membership { members } => i == j && members.contains(&i),
        }
    }
    /// an immutable cell which must never hold.
    pub fn is_impossible(&self, l: LinkId) -> bool {
        let (g, i, j) = self.codec.decode(l);
        let at = i * self.codec.n + j;
        match &self.graphs[g] {
            Graph::Concrete { flags } | Graph::Weighted { flags, .. } => {
                flags[at].contains(FlagCell::IMPOSSIBLE)
            }
            Graph::Equality => i != j,
            Graph::Membership { members } => !(i == j && members.contains(&i)),
        }
    }
    pub fn is_derived(&self, l: LinkId) -> bool {
        let (g, i, j) = self.codec.decode(l);
        let at = i * self.codec.n + j;
        match &self.graphs[g] {
            Graph::Concrete { flags } => flags[at].contains(FlagCell::DERIVED),
            Graph::Weighted { flags, .. } => flags[at].contains(FlagCell::DERIVED),
            Graph::Equality | Graph::Membership { .. } => false,
        }
    }

    fn flags_mut(&mut self, l: LinkId) -> Option<&mut FlagCell> {
        let (g, i, j) = self.codec.decode(l);
        let at = i * self.codec.n + j;
        match &mut self.graphs[g] {
            Graph::Concrete { flags } => Some(&mut flags[at]),
            Graph::Weighted { flags, .. } => Some(&mut flags[at]),
            Graph::Equality | Graph::Membership { .. } => None,
        }
    }
    /// connect a mutable cell; a no-op returning `false` otherwise.
    pub fn add(&mut self, l: LinkId) -> bool {
        if !self.is_mutable(l) || self.is_connected(l) {
            return false;
        }
        if let Some(f) = self.flags_mut(l) {
            f.insert(FlagCell::CONNECTED);
            return true;
        }
        false
    }
    /// disconnect a mutable cell; a no-op returning `false` otherwise.
    pub fn remove(&mut self, l: LinkId) -> bool {
        if !self.is_mutable(l) || !self.is_connected(l) {
            return false;
        }
        if let Some(f) = self.flags_mut(l) {
            f.remove(FlagCell::CONNECTED);
            return true;
        }
        false
    }
    pub fn mark_derived(&mut self, l: LinkId) {
        if let Some(f) = self.flags_mut(l) {
            f.insert(FlagCell::DERIVED);
        }
    }
    /// add every link in `links`; `false` when nothing changed. This is
    /// the growing solver's fixpoint test.
    pub fn add_all(&mut self, links: &[LinkId]) -> bool {
        let mut changed = false;
        for l in links.iter() {
            changed |= self.add(*l);
        }
        changed
    }

    /// the base weight of a weighted graph, if `g` is one.
    pub fn base_weight(&self, g: GraphId) -> Option<Weight> {
        match &self.graphs[g] {
            Graph::Weighted { base, .. } => Some(*base),
            _ => None,
        }
    }
    /// write a weighted cell and refresh its connection flag.
    /// Panics on a non-weighted graph.
    pub fn set_weight(&mut self, g: GraphId, i: usize, j: usize, w: Weight) {
        let at = i * self.codec.n + j;
        match &mut self.graphs[g] {
            Graph::Weighted { flags, weights, .. } => {
                weights[at] = w;
                flags[at].set(FlagCell::CONNECTED, w.connected());
            }
            _ => panic!("set_weight on a non-weighted graph"),
        }
    }
    /// pin a cell to a fixed state: a compulsory or impossible fact.
    pub fn set_forced(&mut self, g: GraphId, i: usize, j: usize, on: bool) {
        let at = i * self.codec.n + j;
        let flags = match &mut self.graphs[g] {
            Graph::Concrete { flags } => flags,
            Graph::Weighted { flags, .. } => flags,
            _ => panic!("set_forced on a fixed graph"),
        };
        flags[at].remove(FlagCell::MUTABLE);
        flags[at].set(FlagCell::CONNECTED, on);
        flags[at].set(FlagCell::FORCED, on);
        flags[at].set(FlagCell::IMPOSSIBLE, !on);
    }

    /// the price of flipping `l` against the data, `+inf` when immutable.
    pub fn flip_cost(&self, l: LinkId, concrete_unit: f64) -> f64 {
        let (g, i, j) = self.codec.decode(l);
        let at = i * self.codec.n + j;
        match &self.graphs[g] {
            Graph::Weighted { flags, weights, .. } => {
                if flags[at].contains(FlagCell::MUTABLE) {
                    weights[at].flip_cost()
                } else {
                    f64::INFINITY
                }
            }
            Graph::Concrete { flags } => {
                if flags[at].contains(FlagCell::MUTABLE) {
                    concrete_unit
                } else {
                    f64::INFINITY
                }
            }
            Graph::Equality | Graph::Membership { .. } => f64::INFINITY,
        }
    }

    /// a boolean copy sharing this model's shape: weighted graphs decay
    /// to concrete ones, fixed graphs are carried over unchanged.
    pub fn concrete_copy(&self) -> Model {
        let graphs = self
            .graphs
            .iter()
            .map(|g| match g {
                Graph::Concrete { flags } => Graph::Concrete {
                    flags: flags.clone(),
                },
                Graph::Weighted { flags, .. } => Graph::Concrete {
                    flags: flags.clone(),
                },
                Graph::Equality => Graph::Equality,
                Graph::Membership { members } => Graph::Membership {
                    members: members.clone(),
                },
            })
            .collect();
        Model {
            codec: self.codec,
            names: self.names.clone(),
            graphs,
        }
    }

    /// description used by `Instantiate` implementors.
    pub fn describe(&self, num_rules: usize, name: &str) -> ModelDescription {
        ModelDescription {
            num_elements: self.num_elements(),
            num_graphs: self.num_graphs(),
            num_rules,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_model() -> (Model, GraphId) {
        let mut m = Model::new(3);
        let g = m.add_graph("r", Graph::weighted(3, -1.0));
        (m, g)
    }

    #[test]
    fn test_weighted_flags_follow_weights() {
        let (mut m, g) = weighted_model();
        let l = m.link(g, 0, 1);
        assert!(!m.is_connected(l));
        m.set_weight(
            g,
            0,
            1,
            Weight {
                log_on: -0.1,
                log_off: -4.0,
            },
        );
        assert!(m.is_connected(l));
        assert!((m.flip_cost(l, 1.0) - 3.9).abs() < 1e-9);
    }

    #[test]
    fn test_immutable_cells_never_change() {
        let (mut m, g) = weighted_model();
        m.set_forced(g, 1, 2, false);
        let l = m.link(g, 1, 2);
        assert!(m.is_impossible(l));
        assert!(!m.add(l));
        assert!(!m.is_connected(l));
        assert_eq!(m.flip_cost(l, 1.0), f64::INFINITY);
    }

    #[test]
    fn test_equality_is_reflexive_and_fixed() {
        let mut m = Model::new(4);
        let e = m.add_graph("eq", Graph::equality());
        for i in 0..4 {
            let l = m.link(e, i, i);
            assert!(m.is_connected(l));
            assert!(!m.is_mutable(l));
            assert!(!m.add(l));
        }
        assert!(!m.is_connected(m.link(e, 0, 1)));
    }

    #[test]
    fn test_concrete_copy_preserves_links() {
        let (mut m, g) = weighted_model();
        m.set_weight(
            g,
            2,
            0,
            Weight {
                log_on: -0.2,
                log_off: -2.0,
            },
        );
        let c = m.concrete_copy();
        assert!(c.is_connected(m.link(g, 2, 0)));
        assert!(!c.is_connected(m.link(g, 0, 2)));
        assert!(c.is_mutable(m.link(g, 0, 2)));
    }
}
