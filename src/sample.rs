use std::str::FromStr;

use itertools::Itertools;
use tracing::trace;

use crate::alphabet::{Embedding, IntoWord, Symbol};
use crate::error::SampleParseError;
use crate::{math, Show, Transducer};

/// Represents a finite sample of a transduction: positive examples pair an input with the
/// output it must be translated to, negative examples are inputs that must be rejected.
///
/// Only positive examples shape the learned transducer. Negative examples are kept for
/// validating hypotheses, see [`Sample::counterexample`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Sample<S: Symbol, O: Symbol> {
    positive: Vec<(Vec<S>, Vec<O>)>,
    negative: Vec<Vec<S>>,
    embedding: Option<Embedding<S>>,
}

impl<S: Symbol, O: Symbol> Default for Sample<S, O> {
    fn default() -> Self {
        Self {
            positive: vec![],
            negative: vec![],
            embedding: None,
        }
    }
}

impl<S: Symbol, O: Symbol> Sample<S, O> {
    /// Create a new empty sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sample consisting of the given positive examples.
    pub fn from_pairs<W, V, I>(pairs: I) -> Self
    where
        W: IntoWord<S>,
        V: IntoWord<O>,
        I: IntoIterator<Item = (W, V)>,
    {
        let mut sample = Self::new();
        for (input, output) in pairs {
            sample.insert_positive(input, output);
        }
        sample
    }

    /// Adds the given inputs as negative examples.
    pub fn with_negative<W, I>(mut self, inputs: I) -> Self
    where
        W: IntoWord<S>,
        I: IntoIterator<Item = W>,
    {
        for input in inputs {
            self.insert_negative(input);
        }
        self
    }

    /// Fixes the embedding of input symbols. By default the embedding consists of the
    /// symbols that occur in some input of the sample.
    pub fn with_embedding(mut self, embedding: Embedding<S>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Adds an example: `Some(output)` for a positive and `None` for a negative one.
    pub fn insert<W: IntoWord<S>>(&mut self, input: W, output: Option<Vec<O>>) {
        match output {
            Some(output) => self.insert_positive(input, output),
            None => self.insert_negative(input),
        }
    }

    /// Adds a positive example.
    pub fn insert_positive<W: IntoWord<S>, V: IntoWord<O>>(&mut self, input: W, output: V) {
        self.positive.push((input.into_word(), output.into_word()));
    }

    /// Adds a negative example.
    pub fn insert_negative<W: IntoWord<S>>(&mut self, input: W) {
        self.negative.push(input.into_word());
    }

    /// Gives an iterator over all positive examples.
    pub fn positive(&self) -> impl Iterator<Item = (&[S], &[O])> + '_ {
        self.positive
            .iter()
            .map(|(i, o)| (i.as_slice(), o.as_slice()))
    }

    /// Gives an iterator over all negative examples.
    pub fn negative(&self) -> impl Iterator<Item = &[S]> + '_ {
        self.negative.iter().map(|i| i.as_slice())
    }

    /// Iterates over all examples, positive ones first. Negative examples have no output.
    pub fn examples(&self) -> impl Iterator<Item = (&[S], Option<&[O]>)> + '_ {
        self.positive()
            .map(|(i, o)| (i, Some(o)))
            .chain(self.negative().map(|i| (i, None)))
    }

    /// The total number of examples.
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Returns true if there are no examples at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum length of any input in the sample, `0` if there is none.
    pub fn max_input_len(&self) -> usize {
        self.examples().map(|(i, _)| i.len()).max().unwrap_or(0)
    }

    /// The embedding of input symbols that learning uses, either the one that was fixed with
    /// [`Self::with_embedding`] or the sorted set of symbols occurring in inputs.
    pub fn embedding(&self) -> Embedding<S> {
        match &self.embedding {
            Some(embedding) => embedding.clone(),
            None => self
                .examples()
                .flat_map(|(input, _)| input.iter().copied())
                .collect(),
        }
    }

    /// Tests `hypothesis` against every example and returns the first one it disagrees with,
    /// or `None` if the hypothesis is consistent with the whole sample.
    pub fn counterexample<'a>(
        &'a self,
        hypothesis: &Transducer<S, O>,
    ) -> Option<(&'a [S], Option<&'a [O]>)> {
        self.examples()
            .find(|(input, expected)| !hypothesis.test(*input, *expected))
    }
}

impl Sample<char, char> {
    /// Parses a sample where every line holds one example. A line with one `separator` holds
    /// the input before it and the output after it, a line without separator is a negative
    /// example and blank lines are skipped. A line with more than one separator gives
    /// [`SampleParseError::AmbiguousSeparator`].
    pub fn parse_with_separator(text: &str, separator: char) -> Result<Self, SampleParseError> {
        let mut sample = Sample::new();
        let mut seen: math::Map<Vec<char>, Option<Vec<char>>> = math::Map::default();
        for (idx, line) in text.lines().enumerate() {
            let line_number = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let (input, output) = match line.split(separator).collect_vec()[..] {
                [input] => (input.into_word(), None),
                [input, output] => (input.into_word(), Some(output.into_word())),
                _ => {
                    return Err(SampleParseError::AmbiguousSeparator {
                        line: line_number,
                        separator,
                    })
                }
            };
            if let Some(previous) = seen.get(&input) {
                if previous != &output {
                    return Err(SampleParseError::Inconsistent {
                        line: line_number,
                        input: input.show(),
                    });
                }
                trace!("skipping duplicate example on line {line_number}");
                continue;
            }
            seen.insert(input.clone(), output.clone());
            sample.insert(input, output);
        }
        Ok(sample)
    }
}

impl FromStr for Sample<char, char> {
    type Err = SampleParseError;

    /// Parses tab separated examples, see [`Sample::parse_with_separator`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_separator(s, '\t')
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn build_sample() {
        let sample: Sample<char, char> = Sample::from_pairs([("ab", "x"), ("b", "")])
            .with_negative(["ba"]);
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.positive().count(), 2);
        assert_eq!(
            sample.negative().collect::<Vec<_>>(),
            vec![&['b', 'a'][..]]
        );
        assert_eq!(sample.max_input_len(), 2);
        assert_eq!(
            sample.embedding().universe().collect::<Vec<_>>(),
            vec!['a', 'b']
        );
    }

    #[test]
    fn fixed_embedding() {
        let sample: Sample<char, char> = Sample::from_pairs([("a", "x")])
            .with_embedding(Embedding::new(['c', 'a']));
        assert_eq!(sample.embedding().embed(&'a'), Some(1));
    }

    #[test]
    fn parse_lines() {
        let sample: Sample<char, char> = "ab\txy\na\n\n\tempty\nab\txy".parse().unwrap();
        assert_eq!(sample.positive().count(), 2);
        assert_eq!(sample.negative().count(), 1);
        assert!(sample
            .positive()
            .any(|(i, o)| i.is_empty() && o == ['e', 'm', 'p', 't', 'y']));
    }

    #[test]
    fn parse_custom_separator() {
        let sample = Sample::parse_with_separator("a:b\nc", ':').unwrap();
        assert_eq!(sample.positive().next(), Some((&['a'][..], &['b'][..])));
        assert_eq!(
            Sample::parse_with_separator("a:b:c", ':'),
            Err(SampleParseError::AmbiguousSeparator {
                line: 1,
                separator: ':'
            })
        );
    }

    #[test]
    fn parse_inconsistent() {
        let parsed = "ab\txy\nb\nab\tz".parse::<Sample<char, char>>();
        assert_eq!(
            parsed,
            Err(SampleParseError::Inconsistent {
                line: 3,
                input: "\"ab\"".to_string()
            })
        );
        assert!("b\tx\nb".parse::<Sample<char, char>>().is_err());
    }

    #[test]
    fn counterexamples() {
        let sample: Sample<char, char> =
            Sample::from_pairs([("a", "x"), ("aa", "xx")]).with_negative(["b"]);
        let mut t = Transducer::new(Embedding::new(['a', 'b']));
        t.set_accepting(t.root(), "");
        t.add_edge(t.root(), 'a', "x", t.root());
        assert_eq!(sample.counterexample(&t), None);
        t.add_edge(t.root(), 'b', "", t.root());
        assert_eq!(sample.counterexample(&t), Some((&['b'][..], None)));
    }
}
