use std::fmt;

/// Index of a graph within a model's stable graph ordering.
pub type GraphId = usize;

/// The universal address of one relation cell: `(graph, i, j)` flattened
/// to a single integer. Models derived from one another share the same
/// shape, so link ids stay comparable across copies.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

impl From<LinkId> for usize {
    #[inline]
    fn from(l: LinkId) -> usize {
        l.0
    }
}

impl From<usize> for LinkId {
    #[inline]
    fn from(u: usize) -> Self {
        LinkId(u)
    }
}

/// The flattening codec. Owned by `Model` and handed to anything that
/// needs to translate between cells and link ids.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LinkCodec {
    /// the domain size
    pub n: usize,
}

impl LinkCodec {
    pub fn new(n: usize) -> Self {
        LinkCodec { n }
    }
    /// flatten `(graph, i, j)` into one integer.
    #[inline]
    pub fn encode(&self, g: GraphId, i: usize, j: usize) -> LinkId {
        debug_assert!(i < self.n && j < self.n);
        LinkId(g * self.n * self.n + i * self.n + j)
    }
    /// the inverse of `encode`.
    #[inline]
    pub fn decode(&self, l: LinkId) -> (GraphId, usize, usize) {
        let nn = self.n * self.n;
        (l.0 / nn, (l.0 % nn) / self.n, l.0 % self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_roundtrip() {
        let codec = LinkCodec::new(7);
        for g in 0..3 {
            for i in 0..7 {
                for j in 0..7 {
                    let l = codec.encode(g, i, j);
                    assert_eq!(codec.decode(l), (g, i, j));
                }
            }
        }
    }

    #[test]
    fn test_codec_is_dense() {
        let codec = LinkCodec::new(4);
        assert_eq!(codec.encode(0, 0, 0), LinkId(0));
        assert_eq!(codec.encode(1, 0, 0), LinkId(16));
        assert_eq!(codec.encode(1, 3, 3), LinkId(31));
    }
}
