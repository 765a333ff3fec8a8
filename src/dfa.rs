use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;

use crate::alphabet::{Embedding, IntoWord, Symbol};
use crate::math::Set;
use crate::{Show, Transducer};

/// An acceptor for the domain of a transducer that is to be learned. Runs start in
/// [`Self::initial`], and a missing successor means the run has fallen into a rejecting sink
/// from which no accepting state is reachable.
pub trait DomainAcceptor<S: Symbol> {
    /// The type of states of the acceptor.
    type State: Copy + Eq + Hash + Debug;

    /// The state in which every run starts.
    fn initial(&self) -> Self::State;

    /// The successor of `state` on `symbol`, or `None` if the run is rejected from here on.
    fn successor(&self, state: Self::State, symbol: &S) -> Option<Self::State>;

    /// Returns true if `state` is accepting.
    fn is_accepting(&self, state: Self::State) -> bool;

    /// Runs the acceptor on `input` and returns whether it is accepted.
    fn accepts<W: IntoWord<S>>(&self, input: W) -> bool
    where
        Self: Sized,
    {
        input
            .into_word()
            .iter()
            .try_fold(self.initial(), |q, sym| self.successor(q, sym))
            .is_some_and(|q| self.is_accepting(q))
    }
}

impl<S: Symbol, D: DomainAcceptor<S>> DomainAcceptor<S> for &D {
    type State = D::State;

    fn initial(&self) -> Self::State {
        D::initial(self)
    }

    fn successor(&self, state: Self::State, symbol: &S) -> Option<Self::State> {
        D::successor(self, state, symbol)
    }

    fn is_accepting(&self, state: Self::State) -> bool {
        D::is_accepting(self, state)
    }
}

/// A deterministic finite automaton (DFA) stored as a table. It accepts a finite word if it
/// reaches an accepting state, missing transitions reject.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Dfa<S: Symbol> {
    embedding: Embedding<S>,
    accepting: Vec<bool>,
    transitions: Vec<Box<[Option<usize>]>>,
    initial: usize,
}

impl<S: Symbol> Dfa<S> {
    /// Creates a [`DfaBuilder`].
    pub fn builder() -> DfaBuilder<S> {
        DfaBuilder::default()
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.accepting.len()
    }

    /// The embedding of symbols that have transitions.
    pub fn embedding(&self) -> &Embedding<S> {
        &self.embedding
    }

    /// The domain of `transducer` as a DFA, which accepts precisely the inputs on which the
    /// transducer produces an output.
    pub fn domain_of<O: Symbol>(transducer: &Transducer<S, O>) -> Self {
        Dfa {
            embedding: transducer.embedding().clone(),
            accepting: transducer
                .states()
                .map(|(_, state)| state.is_accepting())
                .collect(),
            transitions: transducer
                .states()
                .map(|(_, state)| {
                    (0..state.slots())
                        .map(|i| state.edge(i).map(|e| e.target()))
                        .collect()
                })
                .collect(),
            initial: transducer.root(),
        }
    }

    /// Returns the indices of all accepting states.
    pub fn accepting_states(&self) -> impl Iterator<Item = usize> + '_ {
        self.accepting
            .iter()
            .enumerate()
            .filter_map(|(q, acc)| acc.then_some(q))
    }
}

impl<S: Symbol> DomainAcceptor<S> for Dfa<S> {
    type State = usize;

    fn initial(&self) -> usize {
        self.initial
    }

    fn successor(&self, state: usize, symbol: &S) -> Option<usize> {
        let sym = self.embedding.embed(symbol)?;
        self.transitions[state][sym]
    }

    fn is_accepting(&self, state: usize) -> bool {
        self.accepting[state]
    }
}

/// Helper struct for the construction of a [`Dfa`]. It stores a list of transitions, a list of
/// state colors (`true` for accepting) and an optional default color.
///
/// # Example
///
/// A DFA over `['a', 'b']` accepting the words with an odd number of `a`s.
/// ```
/// use ostia::prelude::*;
///
/// let dfa = DfaBuilder::default()
///     .with_state_colors([false, true])
///     .with_transitions([(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)])
///     .into_dfa(0);
/// assert!(dfa.accepts("ab"));
/// assert!(dfa.accepts("aaba"));
/// assert!(!dfa.accepts("aba"));
/// assert!(!dfa.accepts("abab"));
/// ```
#[derive(Clone, Debug)]
pub struct DfaBuilder<S: Symbol> {
    symbols: Set<S>,
    edges: Vec<(usize, S, usize)>,
    default: Option<bool>,
    colors: Vec<(usize, bool)>,
}

impl<S: Symbol> Default for DfaBuilder<S> {
    fn default() -> Self {
        Self {
            symbols: Set::default(),
            edges: vec![],
            default: None,
            colors: vec![],
        }
    }
}

impl<S: Symbol> DfaBuilder<S> {
    /// Sets the color for states that have no color specified.
    pub fn default_color(mut self, accepting: bool) -> Self {
        self.default = Some(accepting);
        self
    }

    /// By default, the alphabet of the built DFA consists of the symbols that appear on some
    /// transition. This forces additional symbols to be part of it.
    pub fn with_alphabet_symbols<I: IntoIterator<Item = S>>(mut self, symbols: I) -> Self {
        self.symbols.extend(symbols);
        self
    }

    /// Assigns colors to the states in the order in which they are given.
    pub fn with_state_colors<I: IntoIterator<Item = bool>>(self, iter: I) -> Self {
        iter.into_iter()
            .enumerate()
            .fold(self, |acc, (q, accepting)| acc.color(q, accepting))
    }

    /// Assigns the given color to the state with index `q`.
    pub fn color(mut self, q: usize, accepting: bool) -> Self {
        assert!(self.colors.iter().all(|(p, _)| *p != q));
        self.colors.push((q, accepting));
        self
    }

    /// Adds transitions given as `(source, symbol, target)` triples.
    pub fn with_transitions<I: IntoIterator<Item = (usize, S, usize)>>(mut self, iter: I) -> Self {
        self.edges.extend(iter);
        self
    }

    /// Builds the DFA with the given initial state.
    ///
    /// # Panics
    /// If two transitions leave the same state on the same symbol with different targets, or if
    /// some state has no color and no default color is set.
    pub fn into_dfa(self, initial: usize) -> Dfa<S> {
        let embedding: Embedding<S> = self
            .edges
            .iter()
            .map(|(_, sym, _)| *sym)
            .chain(self.symbols)
            .collect();
        let size = self
            .edges
            .iter()
            .flat_map(|(q, _, p)| [*q, *p])
            .chain(self.colors.iter().map(|(q, _)| *q))
            .chain(std::iter::once(initial))
            .max()
            .map_or(0, |max| max + 1);

        let accepting = (0..size)
            .map(|q| {
                self.colors
                    .iter()
                    .find_map(|(p, c)| (*p == q).then_some(*c))
                    .or(self.default)
                    .unwrap_or_else(|| panic!("state {q} has no color and there is no default"))
            })
            .collect_vec();

        let mut transitions = vec![vec![None; embedding.size()].into_boxed_slice(); size];
        for (q, sym, p) in self.edges {
            let idx = embedding
                .embed(&sym)
                .expect("every symbol on a transition is embedded");
            match transitions[q][idx] {
                Some(existing) if existing != p => {
                    panic!(
                        "transitions are not deterministic in state {q} on {}",
                        sym.show()
                    )
                }
                _ => transitions[q][idx] = Some(p),
            }
        }

        Dfa {
            embedding,
            accepting,
            transitions,
            initial,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// Accepts `a(aa)*`, the words of odd length over `a`.
    fn odd_as() -> Dfa<char> {
        DfaBuilder::default()
            .with_state_colors([false, true])
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .into_dfa(0)
    }

    #[test]
    fn dfa_runs() {
        let dfa = odd_as();
        assert_eq!(dfa.size(), 2);
        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("aaa"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("aa"));
        // unknown symbols lead into the rejecting sink
        assert!(!dfa.accepts("ab"));
        assert_eq!(dfa.accepting_states().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn default_color_and_extra_symbols() {
        let dfa = DfaBuilder::default()
            .default_color(true)
            .with_alphabet_symbols(['b'])
            .with_transitions([(0, 'a', 0)])
            .into_dfa(0);
        assert_eq!(dfa.embedding().size(), 2);
        assert!(dfa.accepts("aaa"));
        assert!(!dfa.accepts("b"));
        let by_ref = &dfa;
        assert!(by_ref.accepts(""));
    }

    #[test]
    fn domain_of_a_transducer() {
        let mut t = Transducer::new(Embedding::new(['a', 'b']));
        let q = t.add_state();
        t.add_edge(t.root(), 'a', "x", q);
        t.add_edge(q, 'b', "", t.root());
        t.set_accepting(q, "y");
        let dfa = Dfa::domain_of(&t);
        for input in ["", "a", "ab", "aba", "b", "abb"] {
            assert_eq!(dfa.accepts(input), t.accepts(input));
        }
    }

    #[test]
    #[should_panic]
    fn nondeterminism_panics() {
        DfaBuilder::default()
            .default_color(false)
            .with_transitions([(0, 'a', 0), (0, 'a', 1)])
            .into_dfa(0);
    }
}
