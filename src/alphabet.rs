use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;

use crate::{math, Show};

/// A symbol of an alphabet, which is also the type of the symbols in a word. Input symbols
/// are embedded into dense indices by an [`Embedding`], output symbols are stored as they are.
pub trait Symbol: PartialEq + Eq + Debug + Copy + Ord + PartialOrd + Hash + Show {}
impl<S: PartialEq + Eq + Debug + Copy + Ord + PartialOrd + Hash + Show> Symbol for S {}

/// Anything that can be turned into a finite word over symbols of type `S`. This is
/// implemented for string slices (over `char`) as well as vectors, slices and arrays.
pub trait IntoWord<S> {
    /// Consumes `self` and produces the sequence of symbols it represents.
    fn into_word(self) -> Vec<S>;
}

impl IntoWord<char> for &str {
    fn into_word(self) -> Vec<char> {
        self.chars().collect()
    }
}

impl IntoWord<char> for String {
    fn into_word(self) -> Vec<char> {
        self.chars().collect()
    }
}

impl<S: Symbol> IntoWord<S> for Vec<S> {
    fn into_word(self) -> Vec<S> {
        self
    }
}

impl<S: Symbol> IntoWord<S> for &Vec<S> {
    fn into_word(self) -> Vec<S> {
        self.clone()
    }
}

impl<S: Symbol> IntoWord<S> for &[S] {
    fn into_word(self) -> Vec<S> {
        self.to_vec()
    }
}

impl<S: Symbol, const N: usize> IntoWord<S> for [S; N] {
    fn into_word(self) -> Vec<S> {
        self.to_vec()
    }
}

/// A bijection between the symbols of an input alphabet and the dense indices `0..size`.
/// Every state of a [`crate::Transducer`] has one edge slot per index, so the embedding
/// determines the shape of the edge tables.
///
/// # Example
/// ```
/// use ostia::prelude::*;
/// let embedding = Embedding::from_iter(['b', 'a', 'b']);
/// assert_eq!(embedding.size(), 2);
/// assert_eq!(embedding.embed(&'a'), Some(0));
/// assert_eq!(embedding.retrieve(1), 'b');
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Embedding<S: Symbol> {
    symbols: math::Bijection<S, usize>,
}

impl<S: Symbol> Embedding<S> {
    /// Creates an embedding which assigns indices in the order in which the (distinct) symbols
    /// are given.
    pub fn new<I: IntoIterator<Item = S>>(symbols: I) -> Self {
        let mut bijection = math::Bijection::new();
        for sym in symbols {
            if !bijection.contains_left(&sym) {
                let idx = bijection.len();
                bijection.insert(sym, idx);
            }
        }
        Self { symbols: bijection }
    }

    /// Returns the number of symbols, which is also the size of every edge table.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if no symbol is embedded.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Gives the dense index of `symbol`, or `None` if it is not part of the alphabet.
    pub fn embed(&self, symbol: &S) -> Option<usize> {
        self.symbols.get_by_left(symbol).copied()
    }

    /// Gives back the symbol with the dense index `index`.
    ///
    /// # Panics
    /// If `index` is not smaller than [`Self::size`], which is a violation of the contract
    /// that indices are only ever produced by [`Self::embed`].
    pub fn retrieve(&self, index: usize) -> S {
        *self
            .symbols
            .get_by_right(&index)
            .expect("symbol index out of range for embedding")
    }

    /// Returns true if the given symbol is embedded.
    pub fn contains(&self, symbol: &S) -> bool {
        self.symbols.contains_left(symbol)
    }

    /// Iterates over all symbols in the order of their indices.
    pub fn universe(&self) -> impl Iterator<Item = S> + '_ {
        self.symbols.right_values().map(|idx| self.retrieve(*idx))
    }

    /// Embeds a whole word, returns `None` if any symbol is unknown.
    pub fn embed_word<'a, I: IntoIterator<Item = &'a S>>(&self, word: I) -> Option<Vec<usize>>
    where
        S: 'a,
    {
        word.into_iter().map(|sym| self.embed(sym)).collect()
    }
}

impl<S: Symbol> FromIterator<S> for Embedding<S> {
    /// Collects the distinct symbols, indices are assigned in increasing order of the symbols.
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter.into_iter().unique().sorted())
    }
}

impl<S: Symbol> Debug for Embedding<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.universe()
                .enumerate()
                .map(|(i, sym)| format!("{}:{}", sym.show(), i))
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedding, IntoWord};

    #[test]
    fn embedding_is_bijective() {
        let embedding = Embedding::new(['c', 'a', 'c', 'b']);
        assert_eq!(embedding.size(), 3);
        for (i, sym) in embedding.universe().enumerate() {
            assert_eq!(embedding.embed(&sym), Some(i));
            assert_eq!(embedding.retrieve(i), sym);
        }
        assert_eq!(embedding.embed(&'c'), Some(0));
        assert_eq!(embedding.embed(&'z'), None);
        assert_eq!(embedding.embed_word(&['a', 'c']), Some(vec![1, 0]));
        assert_eq!(embedding.embed_word(&['a', 'd']), None);
    }

    #[test]
    fn collected_embedding_is_sorted() {
        let embedding: Embedding<u32> = [7, 3, 5, 3].into_iter().collect();
        assert_eq!(embedding.universe().collect::<Vec<_>>(), vec![3, 5, 7]);
        assert_eq!(format!("{:?}", embedding), "{3:0, 5:1, 7:2}");
    }

    #[test]
    #[should_panic]
    fn retrieve_out_of_range() {
        Embedding::new(['a']).retrieve(1);
    }

    #[test]
    fn words_from_strings() {
        assert_eq!("ab".into_word(), vec!['a', 'b']);
        assert_eq!([1u8, 2].into_word(), vec![1, 2]);
    }
}
