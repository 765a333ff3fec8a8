use itertools::Itertools;
use tracing::trace;

use crate::alphabet::Symbol;
use crate::math;
use crate::ostia::Blue;
use crate::transducer::{State, StateIndex, Transducer};
use crate::{Output, Show};

/// The speculative outcome of folding a blue state into a red one. It holds modified copies of
/// every state the fold touched, the live transducer is left alone until [`Delta::apply`] is
/// called.
#[derive(Clone, PartialEq, Eq)]
pub struct Delta<O> {
    states: math::Map<StateIndex, State<O>>,
    reached: Vec<Blue>,
    visited: Vec<(StateIndex, StateIndex)>,
}

impl<O> Default for Delta<O> {
    fn default() -> Self {
        Self {
            states: math::Map::default(),
            reached: vec![],
            visited: vec![],
        }
    }
}

impl<O: Symbol> std::fmt::Debug for Delta<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states = self.states.iter().sorted_by_key(|(q, _)| **q).collect_vec();
        f.debug_struct("Delta")
            .field("states", &states)
            .field("reached", &self.reached)
            .field("visited", &self.visited)
            .finish()
    }
}

impl<O: Symbol> Delta<O> {
    /// Gives the state as it looks after the fold, which is either the modified copy or the
    /// untouched state of `transducer`.
    pub fn view<'a, S: Symbol>(
        &'a self,
        transducer: &'a Transducer<S, O>,
        state: StateIndex,
    ) -> &'a State<O> {
        self.states
            .get(&state)
            .unwrap_or_else(|| transducer.state(state))
    }

    fn copy_mut<S: Symbol>(
        &mut self,
        transducer: &Transducer<S, O>,
        state: StateIndex,
    ) -> &mut State<O> {
        self.states
            .entry(state)
            .or_insert_with(|| transducer.state(state).clone())
    }

    /// Iterates over the indices of all states that were copied.
    pub fn touched(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.states.keys().copied()
    }

    /// The edges that red states (or states on the red side of the fold) adopted from the
    /// folded part. Their targets become blue if their source is red.
    pub fn reached(&self) -> &[Blue] {
        &self.reached
    }

    /// Every `(red, blue)` pair of states that the fold aligned, in the order they were
    /// visited. The first pair is the red state and the folded blue state.
    pub fn visited_pairs(&self) -> &[(StateIndex, StateIndex)] {
        &self.visited
    }

    /// Commits the delta by overwriting the states of `transducer` with their copies. Returns
    /// the adopted edges.
    pub fn apply<S: Symbol>(self, transducer: &mut Transducer<S, O>) -> Vec<Blue> {
        for (index, state) in self.states {
            transducer.replace_state(index, state);
        }
        self.reached
    }
}

/// A strategy for folding a blue state into a red state. Returns `None` if the two can not be
/// merged, in which case nothing has changed.
pub trait Fold<S: Symbol, O: Symbol> {
    /// Attempts to fold the target of `blue` into `red`. The edge of `blue` is redirected to
    /// `red` in the returned delta.
    fn fold(&self, transducer: &Transducer<S, O>, red: StateIndex, blue: Blue) -> Option<Delta<O>>;
}

impl<S: Symbol, O: Symbol, F: Fold<S, O>> Fold<S, O> for &F {
    fn fold(&self, transducer: &Transducer<S, O>, red: StateIndex, blue: Blue) -> Option<Delta<O>> {
        F::fold(self, transducer, red, blue)
    }
}

/// The fold of OSTIA. Outputs the red side does not produce are pushed down into the blue
/// side, edges that exist only on the blue side are adopted by the red side, and final
/// outputs must agree wherever both sides are accepting. This generalizes beyond the sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standard;

impl<S: Symbol, O: Symbol> Fold<S, O> for Standard {
    fn fold(&self, transducer: &Transducer<S, O>, red: StateIndex, blue: Blue) -> Option<Delta<O>> {
        let mut delta = Delta::default();
        fold_into(
            transducer,
            &mut delta,
            red,
            &Output::empty(),
            blue.parent,
            blue.symbol,
        )?;
        Some(delta)
    }
}

/// Folds the target of the edge `(parent, symbol)` into `red` after pushing `pushed` into it.
/// Recursion follows the blue side, which is a tree, so it terminates even if the red side
/// has cycles.
fn fold_into<S: Symbol, O: Symbol>(
    transducer: &Transducer<S, O>,
    delta: &mut Delta<O>,
    red: StateIndex,
    pushed: &Output<O>,
    parent: StateIndex,
    symbol: usize,
) -> Option<()> {
    let blue = delta
        .view(transducer, parent)
        .edge(symbol)
        .expect("folded edge must exist")
        .target();
    trace!("aligning {red} with {blue}, pushing {}", pushed.show());
    delta.visited.push((red, blue));
    delta
        .copy_mut(transducer, parent)
        .edge_mut(symbol)
        .expect("folded edge must exist")
        .set_target(red);

    let mut copy = delta.view(transducer, blue).clone();
    copy.prepend(pushed);
    if copy.is_accepting() {
        let red_state = delta.copy_mut(transducer, red);
        if !red_state.is_accepting() {
            red_state.set_accepting(copy.output().clone());
        } else if red_state.output() != copy.output() {
            trace!("final outputs of {red} and {blue} differ");
            return None;
        }
    }
    let blue_edges = copy.edges().map(|(i, e)| (i, e.clone())).collect_vec();
    delta.states.insert(blue, copy);

    for (i, blue_edge) in blue_edges {
        match delta.view(transducer, red).edge(i) {
            None => {
                delta.copy_mut(transducer, red).set_edge(i, Some(blue_edge));
                delta.reached.push(Blue::new(red, i));
            }
            Some(red_edge) => {
                let Some(rest) = blue_edge.output().strip_prefix(red_edge.output()) else {
                    trace!("outputs of {red} and {blue} on {i} are incompatible");
                    return None;
                };
                let next = red_edge.target();
                fold_into(transducer, delta, next, &rest, blue, i)?;
            }
        }
    }
    Some(())
}

/// A fold that only succeeds if the blue state behaves exactly like the red state, i.e. both
/// have the same kind, the same final output and the same edges with the same outputs leading
/// to states that fold in turn. Nothing is pushed or adopted, so no input outside of the sample
/// is ever accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compress;

impl<S: Symbol, O: Symbol> Fold<S, O> for Compress {
    fn fold(&self, transducer: &Transducer<S, O>, red: StateIndex, blue: Blue) -> Option<Delta<O>> {
        let mut delta = Delta::default();
        let target = blue.target(transducer);
        delta
            .copy_mut(transducer, blue.parent)
            .edge_mut(blue.symbol)
            .expect("folded edge must exist")
            .set_target(red);
        let mut visited = vec![];
        if !behaves_equal(transducer, &delta, red, target, &mut visited) {
            return None;
        }
        delta.visited = visited;
        Some(delta)
    }
}

fn behaves_equal<S: Symbol, O: Symbol>(
    transducer: &Transducer<S, O>,
    delta: &Delta<O>,
    red: StateIndex,
    blue: StateIndex,
    visited: &mut Vec<(StateIndex, StateIndex)>,
) -> bool {
    visited.push((red, blue));
    let (r, b) = (delta.view(transducer, red), delta.view(transducer, blue));
    if r.kind() != b.kind() || (r.is_accepting() && r.output() != b.output()) {
        return false;
    }
    (0..r.slots()).all(|i| match (r.edge(i), b.edge(i)) {
        (None, None) => true,
        (Some(x), Some(y)) => {
            x.output() == y.output()
                && behaves_equal(transducer, delta, x.target(), y.target(), visited)
        }
        _ => false,
    })
}
