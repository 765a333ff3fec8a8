use std::collections::VecDeque;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::alphabet::Symbol;
use crate::dfa::DomainAcceptor;
use crate::error::LearnError;
use crate::math;
use crate::ostia::Delta;
use crate::transducer::{StateIndex, Transducer};
use crate::Show;

/// The domain acceptor that accepts every input. It is the domain of an unconstrained learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Universal;

impl<S: Symbol> DomainAcceptor<S> for Universal {
    type State = ();

    fn initial(&self) {}

    fn successor(&self, _state: (), _symbol: &S) -> Option<()> {
        Some(())
    }

    fn is_accepting(&self, _state: ()) -> bool {
        true
    }
}

/// The reachable part of the product of a transducer with a domain acceptor, stored as the set
/// of domain states each transducer state is paired with. `None` stands for the rejecting
/// sink of the acceptor.
///
/// The product is sound as long as no accepting transducer state is paired with a domain state
/// that is not accepting, which means every input the transducer accepts lies in the domain.
pub struct Product<'d, S: Symbol, D: DomainAcceptor<S>> {
    domain: &'d D,
    pairs: Vec<math::Set<Option<D::State>>>,
    _symbol: PhantomData<S>,
}

/// Domain states that a merge would add to the product, computed by [`Product::speculate`].
pub struct ProductDelta<Q> {
    added: math::Map<StateIndex, math::Set<Option<Q>>>,
}

impl<Q> ProductDelta<Q> {
    /// The number of pairs that would be added.
    pub fn size(&self) -> usize {
        self.added.values().map(|set| set.len()).sum()
    }
}

impl<'d, S: Symbol, D: DomainAcceptor<S>> Product<'d, S, D> {
    /// Computes the product for the given transducer, which usually is a prefix tree. Fails with
    /// [`LearnError::DomainViolation`] if the transducer already accepts an input outside of the
    /// domain.
    pub fn new<O: Symbol>(
        transducer: &Transducer<S, O>,
        domain: &'d D,
    ) -> Result<Self, LearnError> {
        let mut product = Self {
            domain,
            pairs: vec![math::Set::default(); transducer.size()],
            _symbol: PhantomData,
        };
        let mut queue = VecDeque::from([(transducer.root(), Some(domain.initial()))]);
        while let Some((q, d)) = queue.pop_front() {
            if !product.pairs[q].insert(d) {
                continue;
            }
            if transducer.state(q).is_accepting() && !product.is_accepting(d) {
                let witness = transducer
                    .access_words()
                    .get(&q)
                    .map(|word| {
                        word.iter()
                            .map(|sym| transducer.embedding().retrieve(*sym))
                            .collect::<Vec<_>>()
                            .show()
                    })
                    .unwrap_or_default();
                debug!("state {q} is accepting but paired with {d:?}");
                return Err(LearnError::DomainViolation { input: witness });
            }
            for (sym, edge) in transducer.state(q).edges() {
                queue.push_back((edge.target(), product.step(transducer, d, sym)));
            }
        }
        debug!(
            "product with domain has {} pairs",
            product.pairs.iter().map(|set| set.len()).sum::<usize>()
        );
        Ok(product)
    }

    fn is_accepting(&self, d: Option<D::State>) -> bool {
        d.is_some_and(|d| self.domain.is_accepting(d))
    }

    fn step<O: Symbol>(
        &self,
        transducer: &Transducer<S, O>,
        d: Option<D::State>,
        sym: usize,
    ) -> Option<D::State> {
        d.and_then(|d| {
            self.domain
                .successor(d, &transducer.embedding().retrieve(sym))
        })
    }

    /// Returns the domain states that `q` is currently paired with.
    pub fn domain_states(&self, q: StateIndex) -> &math::Set<Option<D::State>> {
        &self.pairs[q]
    }

    /// Checks whether committing `delta` keeps the product sound. The transducer is read as it
    /// looks after the merge, every pair of states the fold aligned shares its domain states,
    /// and the new pairs are propagated along the edges. Returns `None` if some accepting state
    /// would be paired with a domain state that is not accepting.
    pub fn speculate<O: Symbol>(
        &self,
        transducer: &Transducer<S, O>,
        delta: &Delta<O>,
    ) -> Option<ProductDelta<D::State>> {
        let mut partners: math::Map<StateIndex, Vec<StateIndex>> = math::Map::default();
        for (red, blue) in delta.visited_pairs() {
            partners.entry(*red).or_default().push(*blue);
            partners.entry(*blue).or_default().push(*red);
        }

        let mut added: math::Map<StateIndex, math::Set<Option<D::State>>> = math::Map::default();
        // touched states may have gained edges, finality or partners, so their committed pairs
        // are explored again
        let mut queue: VecDeque<(StateIndex, Option<D::State>)> = delta
            .touched()
            .flat_map(|q| self.pairs[q].iter().map(move |d| (q, *d)))
            .collect();

        while let Some((q, d)) = queue.pop_front() {
            let state = delta.view(transducer, q);
            if state.is_accepting() && !self.is_accepting(d) {
                trace!("merge would pair accepting state {q} with {d:?}");
                return None;
            }
            let successors = state
                .edges()
                .map(|(sym, edge)| (edge.target(), self.step(transducer, d, sym)));
            let aligned = partners.get(&q).into_iter().flatten().map(|p| (*p, d));
            for (p, e) in successors.chain(aligned) {
                if !self.pairs[p].contains(&e) && added.entry(p).or_default().insert(e) {
                    queue.push_back((p, e));
                }
            }
        }
        Some(ProductDelta { added })
    }

    /// Commits a delta computed by [`Self::speculate`].
    pub fn apply(&mut self, delta: ProductDelta<D::State>) {
        for (q, set) in delta.added {
            self.pairs[q].extend(set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Product, Universal};
    use crate::prelude::*;

    fn odd_as() -> Dfa<char> {
        DfaBuilder::default()
            .with_state_colors([false, true])
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .into_dfa(0)
    }

    fn odd_sample() -> Sample<char, char> {
        Sample::from_pairs([("a", "x"), ("aaa", "xxx")])
    }

    #[test_log::test]
    fn seed_pairs_follow_the_tree() {
        let ptt = build_ptt(&odd_sample()).unwrap();
        let dfa = odd_as();
        let product = Product::new(&ptt, &dfa).unwrap();
        for (q, expected) in [(0, 0), (1, 1), (2, 0), (3, 1)] {
            let states = product.domain_states(q);
            assert_eq!(states.len(), 1);
            assert!(states.contains(&Some(expected)));
        }
    }

    #[test]
    fn seed_violation_names_a_witness() {
        let sample = Sample::from_pairs([("a", "x"), ("aa", "xx")]);
        let ptt = build_ptt(&sample).unwrap();
        let dfa = odd_as();
        assert_eq!(
            Product::new(&ptt, &dfa).err(),
            Some(LearnError::DomainViolation {
                input: "\"aa\"".to_string()
            })
        );
    }

    #[test_log::test]
    fn generalizing_merge_is_infeasible() {
        let ptt = build_ptt(&odd_sample()).unwrap();
        let dfa = odd_as();
        let product = Product::new(&ptt, &dfa).unwrap();
        // folding state 1 into the root makes the root accepting, but the empty word is not
        // in the domain
        let delta = Standard.fold(&ptt, 0, Blue::new(0, 0)).unwrap();
        assert!(product.speculate(&ptt, &delta).is_none());
    }

    #[test]
    fn feasible_merge_adds_pairs() {
        let mut ptt = build_ptt(&odd_sample()).unwrap();
        let dfa = odd_as();
        let mut product = Product::new(&ptt, &dfa).unwrap();
        // state 3 folds into state 1, both are paired with the accepting domain state only
        let delta = Standard.fold(&ptt, 1, Blue::new(2, 0)).unwrap();
        let speculated = product.speculate(&ptt, &delta).unwrap();
        assert_eq!(speculated.size(), 0);
        product.apply(speculated);
        delta.apply(&mut ptt);
        assert_eq!(ptt.run_str("aaaaa"), Some("xxxxx".to_string()));
        assert!(!ptt.accepts("aa"));
    }

    #[test]
    fn universal_domain_never_objects() {
        let ptt = build_ptt(&odd_sample()).unwrap();
        let product = Product::new(&ptt, &Universal).unwrap();
        let delta = Standard.fold(&ptt, 0, Blue::new(0, 0)).unwrap();
        assert!(product.speculate(&ptt, &delta).is_some());
    }
}
