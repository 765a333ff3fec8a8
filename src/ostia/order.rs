use std::cmp::Ordering;

use crate::alphabet::Symbol;
use crate::ostia::Blue;
use crate::transducer::{StateIndex, Transducer};

/// Decides in which order the red states are tried as merge partners for a blue state. The
/// first red state that admits a fold wins, so the order can change the learned transducer
/// but never its consistency with the sample.
pub trait CandidateOrder<S: Symbol, O: Symbol> {
    /// Rearranges `candidates`, which initially lists the red states in the order in which
    /// they were promoted.
    fn arrange(&self, transducer: &Transducer<S, O>, blue: Blue, candidates: &mut [StateIndex]);
}

impl<S: Symbol, O: Symbol, C: CandidateOrder<S, O>> CandidateOrder<S, O> for &C {
    fn arrange(&self, transducer: &Transducer<S, O>, blue: Blue, candidates: &mut [StateIndex]) {
        C::arrange(self, transducer, blue, candidates)
    }
}

/// Tries the red states in the order in which they became red, the root first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryOrder;

impl<S: Symbol, O: Symbol> CandidateOrder<S, O> for DiscoveryOrder {
    fn arrange(
        &self,
        _transducer: &Transducer<S, O>,
        _blue: Blue,
        _candidates: &mut [StateIndex],
    ) {
    }
}

/// Sorts the red states with a comparator that may inspect the transducer and the blue state.
/// The sort is stable, red states that compare equal stay in discovery order.
///
/// # Example
/// ```
/// use ostia::prelude::*;
/// // prefer the most recently promoted red state
/// let learner = Ostia::standard().with_order(CompareWith(
///     |_: &Transducer<char, char>, _: Blue, p: StateIndex, q: StateIndex| q.cmp(&p),
/// ));
/// let learned = learner
///     .learn(&Sample::from_pairs([("a", "x"), ("aa", "xx")]))
///     .unwrap();
/// assert_eq!(learned.run_str("aaa"), Some("xxx".to_string()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompareWith<F>(pub F);

impl<S, O, F> CandidateOrder<S, O> for CompareWith<F>
where
    S: Symbol,
    O: Symbol,
    F: Fn(&Transducer<S, O>, Blue, StateIndex, StateIndex) -> Ordering,
{
    fn arrange(&self, transducer: &Transducer<S, O>, blue: Blue, candidates: &mut [StateIndex]) {
        candidates.sort_by(|p, q| (self.0)(transducer, blue, *p, *q));
    }
}
