use std::collections::VecDeque;

use bit_set::BitSet;
use itertools::Itertools;

use crate::alphabet::Symbol;
use crate::transducer::{Edge, State, StateIndex, Transducer};
use crate::{math, Output};

impl<S: Symbol, O: Symbol> Transducer<S, O> {
    /// Returns the indices of all states reachable from `from` in breadth-first order, where the
    /// successors of a state are visited in the order of the symbol indices.
    pub fn reachable_from(&self, from: StateIndex) -> Vec<StateIndex> {
        let mut seen = BitSet::with_capacity(self.size());
        let mut order = vec![];
        let mut queue = VecDeque::from([from]);
        seen.insert(from);
        while let Some(q) = queue.pop_front() {
            order.push(q);
            for (_, edge) in self.state(q).edges() {
                if seen.insert(edge.target()) {
                    queue.push_back(edge.target());
                }
            }
        }
        order
    }

    /// Returns the indices of all states reachable from the root, see [`Self::reachable_from`].
    pub fn reachable_state_indices(&self) -> Vec<StateIndex> {
        self.reachable_from(self.root())
    }

    /// Verifies whether the part reachable from `from` is a tree, meaning no state in it is
    /// entered by more than one edge and `from` is not entered at all.
    pub fn is_tree_from(&self, from: StateIndex) -> bool {
        let mut seen = BitSet::with_capacity(self.size());
        let mut stack = vec![from];
        while let Some(q) = stack.pop() {
            if !seen.insert(q) {
                return false;
            }
            stack.extend(self.state(q).edges().map(|(_, e)| e.target()));
        }
        true
    }

    /// Checks [`Self::is_tree_from`] for the root.
    pub fn is_tree(&self) -> bool {
        self.is_tree_from(self.root())
    }

    /// Checks whether every reachable state except for the root is onward, that is the outputs
    /// of its edges together with its final output (if accepting) have no nonempty common
    /// prefix. States with a single edge and no final output trivially qualify if that edge
    /// emits nothing.
    pub fn is_onward(&self) -> bool {
        self.reachable_state_indices()
            .into_iter()
            .filter(|q| *q != self.root())
            .all(|q| self.local_common_prefix(q).is_empty())
    }

    /// The longest common prefix of all outputs leaving the given state, including its final
    /// output if it is accepting.
    pub fn local_common_prefix(&self, state: StateIndex) -> Output<O> {
        local_outputs_prefix(self.state(state))
    }

    /// Collects the states reachable from the root into a fresh arena. States are renumbered in
    /// breadth-first order, so the root of the result has index `0`. This is the canonical
    /// form of a learned transducer.
    pub fn trim(&self) -> Transducer<S, O> {
        let order = self.reachable_state_indices();
        let renaming: math::Map<StateIndex, StateIndex> = order
            .iter()
            .enumerate()
            .map(|(new, old)| (*old, new))
            .collect();

        let mut out = Transducer::new(self.embedding().clone());
        for _ in 1..order.len() {
            out.add_state();
        }
        for (new, old) in order.iter().enumerate() {
            let original = self.state(*old);
            let mut state = State::new(original.slots());
            if original.is_accepting() {
                state.set_accepting(original.output().clone());
            }
            for (sym, edge) in original.edges() {
                state.set_edge(
                    sym,
                    Some(Edge::new(edge.output().clone(), renaming[&edge.target()])),
                );
            }
            out.replace_state(new, state);
        }
        out
    }

    /// Gives for every reachable state one shortest input (in embedded symbols) leading to it.
    pub fn access_words(&self) -> math::Map<StateIndex, Vec<usize>> {
        let mut access: math::Map<StateIndex, Vec<usize>> = math::Map::default();
        access.insert(self.root(), vec![]);
        let mut queue = VecDeque::from([self.root()]);
        while let Some(q) = queue.pop_front() {
            let prefix = access[&q].clone();
            for (sym, edge) in self.state(q).edges() {
                if !access.contains_key(&edge.target()) {
                    access.insert(
                        edge.target(),
                        prefix.iter().copied().chain([sym]).collect_vec(),
                    );
                    queue.push_back(edge.target());
                }
            }
        }
        access
    }
}

pub(crate) fn local_outputs_prefix<O: Symbol>(state: &State<O>) -> Output<O> {
    let finals = state.is_accepting().then(|| state.output());
    Output::longest_common_prefix(state.edges().map(|(_, e)| e.output()).chain(finals))
}
