use std::fmt::Debug;
use std::rc::Rc;

use crate::Show;

/// An immutable, possibly empty, finite sequence of output symbols. Outputs label the edges
/// of a [`crate::Transducer`] and the accepting states (the final output). They are values:
/// all operations produce new outputs, two outputs are equal if they consist of the same
/// symbols, and cloning only bumps a reference count.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Output<O>(Rc<[O]>);

impl<O> Default for Output<O> {
    fn default() -> Self {
        Self(Rc::from(Vec::new()))
    }
}

impl<O: Clone + Eq> Output<O> {
    /// The empty output.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gives access to the underlying symbols.
    pub fn symbols(&self) -> &[O] {
        &self.0
    }

    /// Returns the concatenation of `self` followed by `rest`.
    pub fn concat(&self, rest: &Output<O>) -> Output<O> {
        if rest.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return rest.clone();
        }
        self.0.iter().chain(rest.0.iter()).cloned().collect()
    }

    /// Returns the length of the longest common prefix of `self` and `other`.
    pub fn common_prefix_len(&self, other: &[O]) -> usize {
        self.0
            .iter()
            .zip(other.iter())
            .take_while(|(l, r)| l == r)
            .count()
    }

    /// Returns the first `len` symbols.
    pub fn prefix(&self, len: usize) -> Output<O> {
        if len >= self.len() {
            return self.clone();
        }
        self.0[..len].iter().cloned().collect()
    }

    /// Returns everything after the first `from` symbols.
    pub fn suffix(&self, from: usize) -> Output<O> {
        if from == 0 {
            return self.clone();
        }
        self.0[from.min(self.len())..].iter().cloned().collect()
    }

    /// If `self` starts with `prefix`, the remainder after the prefix is returned.
    pub fn strip_prefix(&self, prefix: &Output<O>) -> Option<Output<O>> {
        self.0.starts_with(&prefix.0).then(|| self.suffix(prefix.len()))
    }

    /// Computes the longest output that is a prefix of all given outputs. If the iterator
    /// is empty, the result is the empty output.
    pub fn longest_common_prefix<'a, I>(outputs: I) -> Output<O>
    where
        O: 'a,
        I: IntoIterator<Item = &'a Output<O>>,
    {
        let mut outputs = outputs.into_iter();
        let Some(first) = outputs.next() else {
            return Output::empty();
        };
        let len = outputs.fold(first.len(), |len, out| {
            len.min(first.common_prefix_len(out.symbols()))
        });
        first.prefix(len)
    }
}

impl<O> FromIterator<O> for Output<O> {
    fn from_iter<T: IntoIterator<Item = O>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<O> From<Vec<O>> for Output<O> {
    fn from(value: Vec<O>) -> Self {
        Self(Rc::from(value))
    }
}

impl From<&str> for Output<char> {
    fn from(value: &str) -> Self {
        value.chars().collect()
    }
}

impl<O: Show> Show for Output<O> {
    fn show(&self) -> String {
        if self.0.is_empty() {
            return "ε".to_string();
        }
        O::show_collection(self.0.iter())
    }
}

impl<O: Show> Debug for Output<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.show())
    }
}

#[cfg(test)]
mod tests {
    use super::Output;

    fn out(s: &str) -> Output<char> {
        Output::from(s)
    }

    #[test]
    fn concat_and_equality() {
        assert_eq!(out("ab").concat(&out("c")), out("abc"));
        assert_eq!(out("").concat(&out("c")), out("c"));
        assert_eq!(out("ab").concat(&Output::empty()), out("ab"));
        assert_ne!(out("ab"), out("ba"));
        assert!(Output::<char>::empty().is_empty());
    }

    #[test]
    fn prefixes() {
        assert_eq!(out("abc").strip_prefix(&out("ab")), Some(out("c")));
        assert_eq!(out("abc").strip_prefix(&out("")), Some(out("abc")));
        assert_eq!(out("abc").strip_prefix(&out("b")), None);
        assert_eq!(out("ab").strip_prefix(&out("abc")), None);
        assert_eq!(out("abc").suffix(5), out(""));
        assert_eq!(out("abc").prefix(2), out("ab"));
    }

    #[test]
    fn peel_common_prefix() {
        let outputs = [out("abc"), out("abd"), out("ab")];
        assert_eq!(Output::longest_common_prefix(&outputs), out("ab"));
        let outputs = [out("abc"), out("xbd")];
        assert_eq!(Output::longest_common_prefix(&outputs), out(""));
        assert_eq!(Output::<char>::longest_common_prefix([]), out(""));
    }

    #[test]
    fn debug_representation() {
        assert_eq!(format!("{:?}", out("ab")), "\"ab\"");
        assert_eq!(format!("{:?}", out("")), "ε");
    }
}
