//! Library for learning subsequential transducers from examples.
//!
//! A subsequential transducer is a deterministic finite automaton whose edges emit a (possibly empty) sequence of output symbols and whose accepting states append a final output. Running it on an input word follows the unique path of edges labeled with the input symbols, concatenates the outputs along the way and, if the reached state is accepting, appends its final output. Inputs which leave the automaton or end in a state that is not accepting are not in the domain of the transducer.
//!
//! The crate implements the OSTIA family of passive learners. Given a [`Sample`] of input/output pairs, we first build an onward prefix tree transducer (see [`ptt`]), in which every input of the sample has its own path and output is emitted as early as possible. This tree is then collapsed by the blue-fringe state merging algorithm implemented in [`ostia`]: states are partitioned into confirmed (red) states and frontier (blue) states, and each blue state is either folded into a red state or promoted to red itself.
//!
//! There are three flavours of the algorithm
//! - the standard one ([`ostia::Standard`]) generalizes beyond the sample whenever a fold is consistent,
//! - the compress variant ([`ostia::Compress`]) only merges states that behave identically, so the result accepts precisely the inputs of the sample,
//! - the domain constrained variant (see [`ostia::Ostia::learn_with_domain`]) additionally ensures that the learned transducer never accepts an input that is rejected by a given [`DomainAcceptor`].
//!
//! The most important types are
//! - [`Transducer`], an arena of states where each state has one edge slot per symbol of the [`Embedding`],
//! - [`Output`], the immutable output fragments that label edges and accepting states,
//! - [`Ostia`], a builder which configures and runs the learner.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use ostia::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Embedding, Symbol},
        dfa::{Dfa, DfaBuilder, DomainAcceptor},
        error::{LearnError, SampleParseError},
        math,
        ostia::{
            ostia, ostia_compress, Blue, BlueFringe, CandidateOrder, CompareWith, Compress,
            DiscoveryOrder, Fold, Ostia, Standard, Step, Universal,
        },
        output::Output,
        ptt::build_ptt,
        sample::Sample,
        transducer::{Edge, Kind, State, StateIndex, Transducer},
        Show,
    };
}

/// Type aliases for the collections used throughout the crate.
pub mod math;

/// Defines symbols and the embedding of symbols into dense indices.
pub mod alphabet;
pub use alphabet::Embedding;

/// Immutable output fragments.
pub mod output;
pub use output::Output;

/// The arena based transducer that is built and manipulated by the learners.
pub mod transducer;
pub use transducer::Transducer;

/// Samples of input/output examples.
pub mod sample;
pub use sample::Sample;

/// Construction of onward prefix tree transducers.
pub mod ptt;

/// Deterministic finite acceptors, used to constrain the domain of learned transducers.
pub mod dfa;
pub use dfa::{Dfa, DomainAcceptor};

/// Errors that can occur while learning.
pub mod error;
pub use error::LearnError;

/// The blue-fringe state merging algorithm and its variants.
pub mod ostia;
pub use ostia::Ostia;

/// Generation of random transducers and samples. This is feature gated behind the `random` feature.
#[cfg(feature = "random")]
pub mod random;

/// Helper trait which can be used to display states, transitions and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state index that should be
    /// for example q0, q1, q2, ... and for a symbol just the symbol itself.
    /// This is mainly used for debugging purposes.
    fn show(&self) -> String;
    /// Show a collection of the thing, for a sequence of chars this should be "abc"
    /// and for a sequence of numbers it should be [0, 1, 2].
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!(
            "[{}]",
            itertools::Itertools::join(&mut iter.into_iter().map(|x| x.show()), ", ")
        )
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        format!(
            "\"{}\"",
            itertools::Itertools::join(&mut iter.into_iter().map(|sym| sym.to_string()), "")
        )
    }
}

macro_rules! show_integers {
    ($($t:ty),*) => {
        $(
            impl Show for $t {
                fn show(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

show_integers!(usize, u8, u16, u32, u64, i8, i16, i32, i64);

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}
