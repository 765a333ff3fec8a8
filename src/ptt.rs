//! An onward prefix tree transducer (PTT) has one path per distinct input of a sample. The
//! state reached by an input is accepting and, after making the tree onward, every state
//! other than the root emits as much output as early as possible: the outputs leaving a
//! state (including its final output) share no common prefix, because that prefix has been
//! moved onto the edge entering the state.
use tracing::{debug, trace};

use crate::alphabet::Symbol;
use crate::error::LearnError;
use crate::transducer::reachable::local_outputs_prefix;
use crate::transducer::{Edge, StateIndex};
use crate::{Output, Sample, Show, Transducer};

/// Builds the onward prefix tree transducer for the positive examples of `sample`. Negative
/// examples do not contribute to the tree.
///
/// Fails with [`LearnError::InconsistentSample`] if the same input occurs with two different
/// outputs, and with [`LearnError::UnknownSymbol`] if an input uses a symbol that is not part
/// of the sample's embedding.
///
/// # Example
/// ```
/// use ostia::prelude::*;
/// let sample = Sample::from_pairs([("ab", "xy"), ("ac", "xz")]);
/// let ptt = build_ptt(&sample).unwrap();
/// assert_eq!(ptt.size(), 4);
/// assert_eq!(ptt.edge(ptt.root(), 0).unwrap().output(), &Output::from("x"));
/// assert_eq!(ptt.run_str("ac"), Some("xz".to_string()));
/// ```
pub fn build_ptt<S: Symbol, O: Symbol>(
    sample: &Sample<S, O>,
) -> Result<Transducer<S, O>, LearnError> {
    let mut tree = Transducer::new(sample.embedding());
    // the edge entering each state, the root has none
    let mut parents: Vec<Option<(StateIndex, usize)>> = vec![None];

    for (input, output) in sample.positive() {
        let embedded = input
            .iter()
            .map(|sym| {
                tree.embedding()
                    .embed(sym)
                    .ok_or_else(|| LearnError::UnknownSymbol {
                        symbol: sym.show(),
                        input: input.show(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut current = tree.root();
        for sym in embedded {
            current = match tree.successor(current, sym) {
                Some(next) => next,
                None => {
                    let next = tree.add_state();
                    parents.push(Some((current, sym)));
                    tree.state_mut(current)
                        .set_edge(sym, Some(Edge::new(Output::empty(), next)));
                    next
                }
            };
        }

        let state = tree.state(current);
        if state.is_accepting() {
            if state.output().symbols() != output {
                return Err(LearnError::InconsistentSample {
                    input: input.show(),
                    first: state.output().show(),
                    second: output.show(),
                });
            }
            trace!("duplicate example {}", input.show());
            continue;
        }
        trace!(
            "inserting {} -> {} in state {current}",
            input.show(),
            output.show()
        );
        tree.set_accepting(current, output.iter().copied().collect::<Output<O>>());
    }

    make_onward(&mut tree, &parents);
    debug!(
        "built prefix tree with {} states from {} positive examples",
        tree.size(),
        sample.positive().count()
    );
    Ok(tree)
}

/// Pushes outputs towards the root, children first. `parents` gives for every state the
/// source and symbol of the unique edge that enters it.
fn make_onward<S: Symbol, O: Symbol>(
    tree: &mut Transducer<S, O>,
    parents: &[Option<(StateIndex, usize)>],
) {
    for q in tree.reachable_state_indices().into_iter().rev() {
        let Some((parent, sym)) = parents[q] else {
            continue;
        };
        let prefix = local_outputs_prefix(tree.state(q));
        if prefix.is_empty() {
            continue;
        }
        let len = prefix.len();
        let state = tree.state_mut(q);
        for slot in 0..state.slots() {
            if let Some(edge) = state.edge_mut(slot) {
                let stripped = edge.output().suffix(len);
                edge.set_output(stripped);
            }
        }
        if state.is_accepting() {
            let stripped = state.output().suffix(len);
            state.set_output(stripped);
        }
        if let Some(edge) = tree.state_mut(parent).edge_mut(sym) {
            let extended = edge.output().concat(&prefix);
            edge.set_output(extended);
        }
    }
}
