/// A stored edge.  `source` and `dest` are the node handles the edge was
/// added with; `label` is always `None` in an unlabelled graph.
///
/// In an undirected graph every logical edge is stored twice, once in each
/// endpoint's adjacency table, with `source` and `dest` swapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge<N, L> {
    pub(super) source: N,
    pub(super) dest: N,
    pub(super) label: Option<L>,
}

impl<N, L> Edge<N, L> {
    pub(super) fn new(source: N, dest: N, label: Option<L>) -> Self {
        Self {
            source,
            dest,
            label,
        }
    }

    pub fn source(&self) -> &N {
        &self.source
    }

    pub fn dest(&self) -> &N {
        &self.dest
    }

    pub fn label(&self) -> Option<&L> {
        self.label.as_ref()
    }

    /// Gets both ends of the edge as a tuple (source, dest).
    pub fn ends(&self) -> (&N, &N) {
        (&self.source, &self.dest)
    }
}
