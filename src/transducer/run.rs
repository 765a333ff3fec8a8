use crate::alphabet::{IntoWord, Symbol};
use crate::transducer::{StateIndex, Transducer};
use crate::Output;

impl<S: Symbol, O: Symbol> Transducer<S, O> {
    /// Follows the edges labeled with the (already embedded) symbols of `input` starting in
    /// `from`. Returns the reached state together with the concatenation of all edge outputs,
    /// or `None` if some edge is missing.
    pub fn walk_embedded<I>(&self, from: StateIndex, input: I) -> Option<(StateIndex, Vec<O>)>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut current = from;
        let mut output = Vec::new();
        for sym in input {
            let edge = self.edge(current, sym)?;
            output.extend_from_slice(edge.output().symbols());
            current = edge.target();
        }
        Some((current, output))
    }

    /// Runs the transducer on a word of embedded symbols. The outputs of all edges along the
    /// path are concatenated and the final output of the reached state is appended, if that
    /// state is accepting. Otherwise `None` is returned.
    pub fn run_embedded<I>(&self, input: I) -> Option<Vec<O>>
    where
        I: IntoIterator<Item = usize>,
    {
        let (reached, mut output) = self.walk_embedded(self.root(), input)?;
        let state = self.state(reached);
        if !state.is_accepting() {
            return None;
        }
        output.extend_from_slice(state.output().symbols());
        Some(output)
    }

    /// Runs the transducer on `input`, see [`Self::run_embedded`]. Inputs containing a symbol
    /// that is not part of the embedding are not in the domain and yield `None`.
    pub fn run<W: IntoWord<S>>(&self, input: W) -> Option<Vec<O>> {
        let word = input.into_word();
        let embedded = self.embedding().embed_word(&word)?;
        self.run_embedded(embedded)
    }

    /// Returns true if `input` is in the domain of the transducer.
    pub fn accepts<W: IntoWord<S>>(&self, input: W) -> bool {
        self.run(input).is_some()
    }

    /// Tests the transducer as a hypothesis against a labeled example: an `expected` output
    /// of `None` marks an input that must be rejected.
    pub fn test<W: IntoWord<S>>(&self, input: W, expected: Option<&[O]>) -> bool {
        self.run(input).as_deref() == expected
    }

    /// Like [`Self::run`], but the output is collected into an [`Output`].
    pub fn translate<W: IntoWord<S>>(&self, input: W) -> Option<Output<O>> {
        self.run(input).map(Output::from)
    }
}

impl Transducer<char, char> {
    /// Convenience method for transducers between strings.
    pub fn run_str(&self, input: &str) -> Option<String> {
        self.run(input).map(|out| out.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn replacer() -> Transducer<char, char> {
        let mut t = Transducer::new(Embedding::new(['a', 'b']));
        let q = t.add_state();
        t.set_accepting(t.root(), "!");
        t.add_edge(t.root(), 'a', "x", q);
        t.add_edge(q, 'b', "yy", t.root());
        t
    }

    #[test]
    fn run_concatenates_outputs() {
        let t = replacer();
        assert_eq!(t.run_str(""), Some("!".to_string()));
        assert_eq!(t.run_str("ab"), Some("xyy!".to_string()));
        assert_eq!(t.run_str("abab"), Some("xyyxyy!".to_string()));
        assert_eq!(t.run(['a', 'b']), Some(vec!['x', 'y', 'y', '!']));
    }

    #[test]
    fn run_rejects() {
        let t = replacer();
        // ends in a state that is not accepting
        assert_eq!(t.run_str("a"), None);
        // missing edge
        assert_eq!(t.run_str("b"), None);
        // unknown symbol
        assert_eq!(t.run_str("ac"), None);
        assert!(!t.accepts("aa"));
        assert!(t.accepts("ab"));
    }

    #[test]
    fn hypothesis_test() {
        let t = replacer();
        assert!(t.test("ab", Some(&['x', 'y', 'y', '!'])));
        assert!(!t.test("ab", Some(&['x'])));
        assert!(t.test("a", None));
        assert!(!t.test("", None));
        assert_eq!(t.translate("ab"), Some(Output::from("xyy!")));
    }

    #[test]
    fn walk_reports_reached_state() {
        let t = replacer();
        let (reached, out) = t.walk_embedded(t.root(), [0]).unwrap();
        assert_eq!(reached, 1);
        assert_eq!(out, vec!['x']);
        assert!(t.walk_embedded(t.root(), [1]).is_none());
    }
}
