use crate::alphabet::{Embedding, Symbol};
use crate::Output;

/// Contains the evaluation of a transducer on input words.
pub mod run;

/// Reachability, trimming and structural checks.
pub mod reachable;

/// Human readable renderings (tables and graphviz).
pub mod show;

/// States are addressed by their position in the arena of a [`Transducer`].
pub type StateIndex = usize;

/// Classification of a state. There is no rejecting kind, a state that is not
/// known to be accepting carries no information about acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Kind {
    /// Some example ends in this state, its final output is meaningful.
    Accepting,
    /// No example ends in this state.
    #[default]
    Unknown,
}

/// An edge emits its output when it is traversed and leads to its target. Each edge lives in
/// exactly one slot of the edge table of its source state.
#[derive(Clone, PartialEq, Eq)]
pub struct Edge<O> {
    output: Output<O>,
    target: StateIndex,
}

impl<O: Symbol> Edge<O> {
    /// Creates a new edge.
    pub fn new(output: Output<O>, target: StateIndex) -> Self {
        Self { output, target }
    }

    /// The output that is emitted when the edge is taken.
    pub fn output(&self) -> &Output<O> {
        &self.output
    }

    /// The state the edge leads to.
    pub fn target(&self) -> StateIndex {
        self.target
    }

    pub(crate) fn set_target(&mut self, target: StateIndex) {
        self.target = target;
    }

    pub(crate) fn set_output(&mut self, output: Output<O>) {
        self.output = output;
    }
}

/// A state of a [`Transducer`]. The edge table has one slot per symbol of the embedding,
/// which makes the transducer deterministic by construction.
#[derive(Clone, PartialEq, Eq)]
pub struct State<O> {
    kind: Kind,
    output: Output<O>,
    edges: Box<[Option<Edge<O>>]>,
}

impl<O: Symbol> State<O> {
    /// Creates a state of kind [`Kind::Unknown`] without edges for an alphabet of the given size.
    pub fn new(alphabet_size: usize) -> Self {
        Self {
            kind: Kind::Unknown,
            output: Output::empty(),
            edges: vec![None; alphabet_size].into_boxed_slice(),
        }
    }

    /// The kind of the state.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns true if the state is accepting.
    pub fn is_accepting(&self) -> bool {
        self.kind == Kind::Accepting
    }

    /// The final output, which is only meaningful if the state is accepting.
    pub fn output(&self) -> &Output<O> {
        &self.output
    }

    /// Returns the edge on the symbol with index `symbol`, if it exists.
    pub fn edge(&self, symbol: usize) -> Option<&Edge<O>> {
        self.edges[symbol].as_ref()
    }

    pub(crate) fn edge_mut(&mut self, symbol: usize) -> Option<&mut Edge<O>> {
        self.edges[symbol].as_mut()
    }

    /// Iterates over all present edges together with the index of their symbol.
    pub fn edges(&self) -> impl Iterator<Item = (usize, &Edge<O>)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(sym, edge)| edge.as_ref().map(|e| (sym, e)))
    }

    /// The number of slots in the edge table, this equals the size of the alphabet.
    pub fn slots(&self) -> usize {
        self.edges.len()
    }

    /// The number of present edges.
    pub fn degree(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    pub(crate) fn set_edge(&mut self, symbol: usize, edge: Option<Edge<O>>) -> Option<Edge<O>> {
        std::mem::replace(&mut self.edges[symbol], edge)
    }

    pub(crate) fn set_accepting(&mut self, output: Output<O>) {
        self.kind = Kind::Accepting;
        self.output = output;
    }

    pub(crate) fn set_output(&mut self, output: Output<O>) {
        self.output = output;
    }

    /// Pushes `prefix` back into the state: it is prepended to the output of every outgoing
    /// edge and to the final output if the state is accepting.
    pub(crate) fn prepend(&mut self, prefix: &Output<O>) {
        if prefix.is_empty() {
            return;
        }
        for edge in self.edges.iter_mut().flatten() {
            edge.output = prefix.concat(&edge.output);
        }
        if self.is_accepting() {
            self.output = prefix.concat(&self.output);
        }
    }
}

/// A subsequential transducer stored as an arena of states. Input symbols of type `S` are
/// mapped to edge slots through an [`Embedding`], outputs are sequences of `O`.
///
/// States are never removed from the arena. Learning only redirects edges, so parts of the
/// arena may become unreachable; [`Transducer::trim`] collects the reachable part into a
/// fresh arena.
#[derive(Clone, PartialEq, Eq)]
pub struct Transducer<S: Symbol, O: Symbol> {
    embedding: Embedding<S>,
    states: Vec<State<O>>,
    root: StateIndex,
}

impl<S: Symbol, O: Symbol> Transducer<S, O> {
    /// Creates a transducer consisting only of a root state of kind [`Kind::Unknown`].
    pub fn new(embedding: Embedding<S>) -> Self {
        let root = State::new(embedding.size());
        Self {
            embedding,
            states: vec![root],
            root: 0,
        }
    }

    /// The embedding of input symbols.
    pub fn embedding(&self) -> &Embedding<S> {
        &self.embedding
    }

    /// The index of the initial state.
    pub fn root(&self) -> StateIndex {
        self.root
    }

    /// The number of states in the arena, including unreachable ones.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Gives a reference to the state with the given index.
    ///
    /// # Panics
    /// If the index does not belong to the arena.
    pub fn state(&self, index: StateIndex) -> &State<O> {
        &self.states[index]
    }

    pub(crate) fn state_mut(&mut self, index: StateIndex) -> &mut State<O> {
        &mut self.states[index]
    }

    /// Iterates over all states of the arena with their indices.
    pub fn states(&self) -> impl Iterator<Item = (StateIndex, &State<O>)> + '_ {
        self.states.iter().enumerate()
    }

    /// Returns the edge leaving `source` on the symbol with index `symbol`.
    pub fn edge(&self, source: StateIndex, symbol: usize) -> Option<&Edge<O>> {
        self.states[source].edge(symbol)
    }

    /// Returns the target of the edge leaving `source` on the symbol with index `symbol`.
    pub fn successor(&self, source: StateIndex, symbol: usize) -> Option<StateIndex> {
        self.edge(source, symbol).map(Edge::target)
    }

    /// Adds a new state of kind [`Kind::Unknown`] without edges and returns its index.
    pub fn add_state(&mut self) -> StateIndex {
        self.states.push(State::new(self.embedding.size()));
        self.states.len() - 1
    }

    /// Marks the given state as accepting with the given final output.
    pub fn set_accepting<X: Into<Output<O>>>(&mut self, state: StateIndex, output: X) {
        self.states[state].set_accepting(output.into());
    }

    /// Adds an edge from `source` on `symbol` to `target`, replacing (and returning) the edge
    /// that previously occupied the slot.
    ///
    /// # Panics
    /// If `symbol` is not part of the embedding.
    pub fn add_edge<X: Into<Output<O>>>(
        &mut self,
        source: StateIndex,
        symbol: S,
        output: X,
        target: StateIndex,
    ) -> Option<Edge<O>> {
        let sym = self
            .embedding
            .embed(&symbol)
            .expect("symbol is not part of the embedding");
        self.states[source].set_edge(sym, Some(Edge::new(output.into(), target)))
    }

    pub(crate) fn replace_state(&mut self, index: StateIndex, state: State<O>) {
        self.states[index] = state;
    }
}

#[cfg(test)]
mod tests {
    use super::{Kind, Transducer};
    use crate::prelude::*;

    /// Translates every `a` into `x` and every `b` into `yy`, accepting all words.
    pub fn letter_replacer() -> Transducer<char, char> {
        let mut t = Transducer::new(Embedding::new(['a', 'b']));
        let q = t.root();
        t.set_accepting(q, "");
        t.add_edge(q, 'a', "x", q);
        t.add_edge(q, 'b', "yy", q);
        t
    }

    #[test]
    fn build_by_hand() {
        let mut t: Transducer<char, char> = Transducer::new(Embedding::new(['a', 'b']));
        let q = t.add_state();
        assert_eq!(t.size(), 2);
        assert!(t.add_edge(t.root(), 'a', "x", q).is_none());
        let replaced = t.add_edge(t.root(), 'a', "z", q);
        assert_eq!(
            replaced.map(|e| e.output().clone()),
            Some(Output::from("x"))
        );
        assert_eq!(t.successor(t.root(), 0), Some(q));
        assert_eq!(t.successor(t.root(), 1), None);
        assert_eq!(t.state(q).kind(), Kind::Unknown);
        t.set_accepting(q, "w");
        assert!(t.state(q).is_accepting());
        assert_eq!(t.state(t.root()).degree(), 1);
        assert_eq!(t.state(q).slots(), 2);
    }

    #[test]
    fn prepend_pushes_into_edges_and_final_output() {
        let mut t = letter_replacer();
        let root = t.root();
        t.state_mut(root).prepend(&Output::from("p"));
        assert_eq!(t.edge(root, 0).unwrap().output(), &Output::from("px"));
        assert_eq!(t.edge(root, 1).unwrap().output(), &Output::from("pyy"));
        assert_eq!(t.state(root).output(), &Output::from("p"));
    }
}
