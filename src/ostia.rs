use std::collections::VecDeque;

use bit_set::BitSet;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::alphabet::Symbol;
use crate::dfa::DomainAcceptor;
use crate::error::LearnError;
use crate::ptt::build_ptt;
use crate::transducer::{StateIndex, Transducer};
use crate::Sample;

/// The folds that merge a blue state into a red state.
pub mod fold;
pub use fold::{Compress, Delta, Fold, Standard};

/// Orders in which red merge candidates are tried.
pub mod order;
pub use order::{CandidateOrder, CompareWith, DiscoveryOrder};

/// The product with a domain acceptor that keeps merges inside the domain.
pub mod domain;
pub use domain::{Product, ProductDelta, Universal};

/// An entry of the blue fringe. It names the edge through which the blue state is entered,
/// which is unique because the part of the transducer below a blue state is still a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Blue {
    /// The red state the edge leaves.
    pub parent: StateIndex,
    /// The index of the symbol the edge is labeled with.
    pub symbol: usize,
}

impl Blue {
    /// Creates a new entry for the edge leaving `parent` on `symbol`.
    pub fn new(parent: StateIndex, symbol: usize) -> Self {
        Self { parent, symbol }
    }

    /// The blue state itself.
    ///
    /// # Panics
    /// If `parent` has no edge on `symbol`.
    pub fn target<S: Symbol, O: Symbol>(&self, transducer: &Transducer<S, O>) -> StateIndex {
        transducer
            .successor(self.parent, self.symbol)
            .expect("blue entries always have an edge")
    }
}

/// The outcome of a single iteration of [`BlueFringe::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The blue state was folded into the red state `red`.
    Merged {
        /// The processed blue entry.
        blue: Blue,
        /// The red state it was folded into.
        red: StateIndex,
    },
    /// No fold was possible and the blue state became red.
    Promoted {
        /// The processed blue entry.
        blue: Blue,
        /// The state that became red.
        state: StateIndex,
    },
}

/// The blue-fringe state merging loop. The states of the transducer are partitioned into red
/// states, whose shape is final, blue states, which are the targets of edges leaving red states,
/// and the remaining (white) states below the blue ones. In every step one blue state is either
/// folded into a red state or promoted to red.
///
/// The fold strategy `F` decides when a merge is possible, `C` decides in which order red states
/// are tried and the optional product with a domain acceptor `D` vetoes merges which would
/// leave the domain.
pub struct BlueFringe<'d, S: Symbol, O: Symbol, F, C = DiscoveryOrder, D = Universal>
where
    D: DomainAcceptor<S>,
{
    transducer: Transducer<S, O>,
    fold: F,
    order: C,
    red: Vec<StateIndex>,
    is_red: BitSet,
    blue: VecDeque<Blue>,
    product: Option<Product<'d, S, D>>,
}

impl<S: Symbol, O: Symbol, F: Fold<S, O>, C: CandidateOrder<S, O>>
    BlueFringe<'static, S, O, F, C, Universal>
{
    /// Starts the loop on `transducer` (usually an onward prefix tree), where the root is the
    /// only red state.
    pub fn new(transducer: Transducer<S, O>, fold: F, order: C) -> Self {
        Self::with_product(transducer, fold, order, None)
    }
}

impl<'d, S, O, F, C, D> BlueFringe<'d, S, O, F, C, D>
where
    S: Symbol,
    O: Symbol,
    F: Fold<S, O>,
    C: CandidateOrder<S, O>,
    D: DomainAcceptor<S>,
{
    /// Like [`BlueFringe::new`], but merges are only committed if the result accepts no input
    /// outside of `domain`. Fails if `transducer` itself already does.
    pub fn constrained(
        transducer: Transducer<S, O>,
        fold: F,
        order: C,
        domain: &'d D,
    ) -> Result<Self, LearnError> {
        let product = Product::new(&transducer, domain)?;
        Ok(Self::with_product(transducer, fold, order, Some(product)))
    }

    fn with_product(
        transducer: Transducer<S, O>,
        fold: F,
        order: C,
        product: Option<Product<'d, S, D>>,
    ) -> Self {
        let mut fringe = Self {
            is_red: BitSet::with_capacity(transducer.size()),
            transducer,
            fold,
            order,
            red: vec![],
            blue: VecDeque::new(),
            product,
        };
        fringe.promote(fringe.transducer.root());
        fringe
    }

    /// The transducer in its current shape, including states that are no longer reachable.
    pub fn transducer(&self) -> &Transducer<S, O> {
        &self.transducer
    }

    /// The red states in the order in which they became red.
    pub fn red(&self) -> &[StateIndex] {
        &self.red
    }

    /// Returns true if `state` is red.
    pub fn is_red(&self, state: StateIndex) -> bool {
        self.is_red.contains(state)
    }

    /// The pending blue entries, the next one to be processed first.
    pub fn blue(&self) -> impl Iterator<Item = Blue> + '_ {
        self.blue.iter().copied()
    }

    /// Returns true if there is no blue state left.
    pub fn is_done(&self) -> bool {
        self.blue.is_empty()
    }

    fn promote(&mut self, state: StateIndex) {
        self.red.push(state);
        self.is_red.insert(state);
        let entries = self
            .transducer
            .state(state)
            .edges()
            .map(|(sym, _)| Blue::new(state, sym))
            .collect_vec();
        self.blue.extend(entries);
    }

    /// Processes the next blue entry. It is folded into the first red state (in the order given
    /// by the [`CandidateOrder`]) for which the fold and the domain product agree, otherwise the
    /// blue state is promoted. Returns `None` if there is nothing left to do.
    pub fn step(&mut self) -> Option<Step> {
        let blue = self.blue.pop_front()?;
        let target = blue.target(&self.transducer);
        debug_assert!(!self.is_red(target), "blue state {target} is already red");

        let mut candidates = self.red.clone();
        self.order.arrange(&self.transducer, blue, &mut candidates);
        for red in candidates {
            let Some(delta) = self.fold.fold(&self.transducer, red, blue) else {
                continue;
            };
            let product_delta = match &self.product {
                Some(product) => match product.speculate(&self.transducer, &delta) {
                    Some(product_delta) => Some(product_delta),
                    None => {
                        trace!("merging {target} into {red} would leave the domain");
                        continue;
                    }
                },
                None => None,
            };

            trace!("merging {target} into {red}");
            if let (Some(product), Some(product_delta)) = (self.product.as_mut(), product_delta) {
                product.apply(product_delta);
            }
            for reached in delta.apply(&mut self.transducer) {
                if self.is_red(reached.parent) {
                    self.blue.push_back(reached);
                }
            }
            return Some(Step::Merged { blue, red });
        }

        trace!("promoting {target}");
        self.promote(target);
        Some(Step::Promoted {
            blue,
            state: target,
        })
    }

    /// Steps until no blue state is left.
    pub fn run(&mut self) {
        while self.step().is_some() {}
        debug!("blue fringe done with {} red states", self.red.len());
    }

    /// Returns the learned transducer, trimmed to the states reachable from the root. These are
    /// exactly the red states once [`Self::run`] has finished.
    pub fn finish(self) -> Transducer<S, O> {
        self.transducer.trim()
    }
}

/// Configures and runs the learner. The fold strategy and the order in which red candidates are
/// tried can be chosen, a domain can be given when learning.
///
/// # Example
/// ```
/// use ostia::prelude::*;
///
/// let sample = Sample::from_pairs([("aa", "bb"), ("aaaa", "bbbb"), ("aaaaaa", "bbbbbb")]);
/// let learned = Ostia::standard().learn(&sample).unwrap();
/// assert_eq!(learned.size(), 2);
/// assert_eq!(learned.run_str("aaaaaaaa"), Some("bbbbbbbb".to_string()));
///
/// let compressed = Ostia::compress().learn(&sample).unwrap();
/// assert_eq!(compressed.run_str("aaaaaaaa"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Ostia<F = Standard, C = DiscoveryOrder> {
    fold: F,
    order: C,
}

impl Ostia<Standard, DiscoveryOrder> {
    /// The standard OSTIA learner, which generalizes beyond the sample.
    pub fn standard() -> Self {
        Self {
            fold: Standard,
            order: DiscoveryOrder,
        }
    }
}

impl Ostia<Compress, DiscoveryOrder> {
    /// The compressing learner, which only merges states that behave identically.
    pub fn compress() -> Self {
        Self {
            fold: Compress,
            order: DiscoveryOrder,
        }
    }
}

impl<F, C> Ostia<F, C> {
    /// Replaces the order in which red states are tried as merge partners.
    pub fn with_order<C2>(self, order: C2) -> Ostia<F, C2> {
        Ostia {
            fold: self.fold,
            order,
        }
    }

    /// Learns a transducer from the positive examples of `sample`.
    pub fn learn<S: Symbol, O: Symbol>(
        &self,
        sample: &Sample<S, O>,
    ) -> Result<Transducer<S, O>, LearnError>
    where
        F: Fold<S, O>,
        C: CandidateOrder<S, O>,
    {
        let ptt = build_ptt(sample)?;
        let mut fringe = BlueFringe::new(ptt, &self.fold, &self.order);
        fringe.run();
        let learned = fringe.finish();
        debug!("learned transducer with {} states", learned.size());
        Ok(learned)
    }

    /// Learns a transducer from the positive examples of `sample` that accepts no input
    /// outside of `domain`. Fails with [`LearnError::DomainViolation`] if some positive example
    /// is not in the domain.
    ///
    /// # Example
    /// ```
    /// use ostia::prelude::*;
    ///
    /// // the words of odd length over `a`
    /// let domain = DfaBuilder::default()
    ///     .with_state_colors([false, true])
    ///     .with_transitions([(0, 'a', 1), (1, 'a', 0)])
    ///     .into_dfa(0);
    /// let sample = Sample::from_pairs([("a", "x"), ("aaa", "xxx")]);
    ///
    /// let unconstrained = Ostia::standard().learn(&sample).unwrap();
    /// assert_eq!(unconstrained.run_str("aa"), Some("xx".to_string()));
    ///
    /// let learned = Ostia::standard().learn_with_domain(&sample, &domain).unwrap();
    /// assert_eq!(learned.run_str("aa"), None);
    /// assert_eq!(learned.run_str("aaaaa"), Some("xxxxx".to_string()));
    /// ```
    pub fn learn_with_domain<S, O, D>(
        &self,
        sample: &Sample<S, O>,
        domain: &D,
    ) -> Result<Transducer<S, O>, LearnError>
    where
        S: Symbol,
        O: Symbol,
        F: Fold<S, O>,
        C: CandidateOrder<S, O>,
        D: DomainAcceptor<S>,
    {
        let ptt = build_ptt(sample)?;
        let mut fringe = BlueFringe::constrained(ptt, &self.fold, &self.order, domain)?;
        fringe.run();
        let learned = fringe.finish();
        debug!(
            "learned transducer with {} states within the domain",
            learned.size()
        );
        Ok(learned)
    }
}

/// Learns a transducer from `sample` with the standard OSTIA algorithm, see [`Ostia::standard`].
pub fn ostia<S: Symbol, O: Symbol>(sample: &Sample<S, O>) -> Result<Transducer<S, O>, LearnError> {
    Ostia::standard().learn(sample)
}

/// Learns a transducer from `sample` that accepts exactly the inputs of the positive examples,
/// see [`Ostia::compress`].
pub fn ostia_compress<S: Symbol, O: Symbol>(
    sample: &Sample<S, O>,
) -> Result<Transducer<S, O>, LearnError> {
    Ostia::compress().learn(sample)
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn doubling() -> Sample<char, char> {
        Sample::from_pairs([("aa", "bb"), ("aaaa", "bbbb"), ("aaaaaa", "bbbbbb")])
    }

    fn odd_as() -> Dfa<char> {
        DfaBuilder::default()
            .with_state_colors([false, true])
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .into_dfa(0)
    }

    fn assert_consistent(learned: &Transducer<char, char>, sample: &Sample<char, char>) {
        for (input, output) in sample.positive() {
            assert_eq!(
                learned.run(input).as_deref(),
                Some(output),
                "wrong output for {}",
                input.show()
            );
        }
    }

    #[test_log::test]
    fn doubling_becomes_a_cycle() {
        let learned = ostia(&doubling()).unwrap();
        assert_eq!(learned.size(), 2);
        let root = learned.root();
        assert!(learned.state(root).is_accepting());
        assert!(learned.state(root).output().is_empty());
        let q = learned.successor(root, 0).unwrap();
        assert_ne!(q, root);
        assert_eq!(learned.edge(root, 0).unwrap().output(), &Output::from("bb"));
        assert_eq!(learned.edge(q, 0).unwrap().output(), &Output::from(""));
        assert_eq!(learned.successor(q, 0), Some(root));
        assert_eq!(learned.run_str("aaaaaaaa"), Some("bbbbbbbb".to_string()));
        assert_eq!(learned.run_str("aaa"), None);
        assert_consistent(&learned, &doubling());
    }

    #[test_log::test]
    fn compress_only_accepts_the_sample() {
        let sample = Sample::from_pairs([("a", "x"), ("aa", "xx"), ("aaaa", "xxxx")])
            .with_negative(["aaa"]);
        let standard = ostia(&sample).unwrap();
        assert_eq!(standard.size(), 1);
        assert_eq!(standard.run_str("aaa"), Some("xxx".to_string()));

        let compressed = ostia_compress(&sample).unwrap();
        assert_consistent(&compressed, &sample);
        assert_eq!(compressed.run_str("aaa"), None);
        assert_eq!(sample.counterexample(&compressed), None);
        assert_eq!(compressed.size(), 5);
    }

    #[test]
    fn compress_merges_equal_subtrees() {
        let sample = Sample::from_pairs([("ab", "x"), ("bb", "x"), ("a", "y"), ("b", "y")]);
        let compressed = ostia_compress(&sample).unwrap();
        assert_consistent(&compressed, &sample);
        for input in ["", "aa", "ba", "abb"] {
            assert_eq!(compressed.run_str(input), None);
        }
        // both first letters lead to the same state
        assert_eq!(compressed.size(), 3);
    }

    #[test_log::test]
    fn domain_promotes_instead_of_generalizing() {
        let sample = Sample::from_pairs([("a", "x"), ("aaa", "xxx")]);
        let domain = odd_as();
        let learned = Ostia::standard()
            .learn_with_domain(&sample, &domain)
            .unwrap();
        assert_consistent(&learned, &sample);
        assert_eq!(learned.size(), 3);
        for n in 0..10 {
            let input = "a".repeat(n);
            match learned.run_str(&input) {
                Some(out) => {
                    assert!(domain.accepts(input.as_str()));
                    assert_eq!(out, "x".repeat(n));
                }
                None => assert!(!domain.accepts(input.as_str())),
            }
        }
    }

    #[test]
    fn domain_violation_is_reported() {
        let sample = Sample::from_pairs([("a", "x"), ("aa", "xx")]);
        let result = Ostia::standard().learn_with_domain(&sample, &odd_as());
        assert!(matches!(result, Err(LearnError::DomainViolation { .. })));
    }

    #[test_log::test]
    fn steps_shrink_the_fringe() {
        let ptt = build_ptt(&doubling()).unwrap();
        let mut fringe = BlueFringe::new(ptt, Standard, DiscoveryOrder);
        let mut steps = vec![];
        let mut last_red = fringe.red().len();
        while let Some(step) = fringe.step() {
            assert!(fringe.red().len() >= last_red);
            last_red = fringe.red().len();
            steps.push(step);
        }
        assert!(fringe.is_done());
        assert_eq!(
            steps,
            vec![
                Step::Promoted {
                    blue: Blue::new(0, 0),
                    state: 1
                },
                Step::Merged {
                    blue: Blue::new(1, 0),
                    red: 0
                },
            ]
        );
        assert_eq!(fringe.red(), &[0, 1]);
        assert!(fringe.red().iter().all(|q| fringe.is_red(*q)));
        let learned = fringe.finish();
        assert!(learned.is_onward());
    }

    #[test]
    fn learned_transducers_are_deterministic_tables() {
        let sample = Sample::from_pairs([("ab", "x"), ("ba", "yy"), ("abab", "xx"), ("", "")]);
        for learned in [ostia(&sample).unwrap(), ostia_compress(&sample).unwrap()] {
            assert!(learned.states().all(|(_, s)| s.slots() == 2));
            assert_eq!(learned.reachable_state_indices().len(), learned.size());
            assert_consistent(&learned, &sample);
        }
    }

    #[test]
    fn inconsistent_samples_fail() {
        let sample = Sample::from_pairs([("a", "x"), ("a", "y")]);
        assert!(matches!(
            ostia(&sample),
            Err(LearnError::InconsistentSample { .. })
        ));
    }

    #[test]
    fn candidate_order_is_respected() {
        let sample = Sample::from_pairs([("a", ""), ("b", ""), ("ab", ""), ("ba", "")]);
        let latest_first = CompareWith(
            |_: &Transducer<char, char>, _: Blue, p: StateIndex, q: StateIndex| q.cmp(&p),
        );
        let learned = Ostia::standard()
            .with_order(latest_first)
            .learn(&sample)
            .unwrap();
        assert_consistent(&learned, &sample);
        let default = ostia(&sample).unwrap();
        assert_consistent(&default, &sample);
    }
}
