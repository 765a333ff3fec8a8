use thiserror::Error;

/// Errors that abort learning. Rejected merges are not errors, they are part of the normal
/// control flow of the learners and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnError {
    /// The sample accepts an input which the supplied domain rejects, so no transducer can be
    /// consistent with both. Detected before any merge is attempted.
    #[error("training data does not conform to the domain: {input} is accepted by the sample but rejected by the domain")]
    DomainViolation {
        /// An input witnessing the violation.
        input: String,
    },
    /// Two positive examples share their input but disagree on the output.
    #[error("sample is inconsistent: {input} is mapped to both {first} and {second}")]
    InconsistentSample {
        /// The shared input.
        input: String,
        /// The output given first.
        first: String,
        /// The conflicting output.
        second: String,
    },
    /// An input of the sample uses a symbol that the embedding does not know.
    #[error("symbol {symbol} in input {input} is not part of the embedding")]
    UnknownSymbol {
        /// The unknown symbol.
        symbol: String,
        /// The input containing it.
        input: String,
    },
}

/// Errors that can occur while parsing a [`crate::Sample`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleParseError {
    /// An input occurs more than once with different classifications.
    #[error("line {line}: sample is inconsistent, {input} is already classified differently")]
    Inconsistent {
        /// The line (starting at 1) of the second occurrence.
        line: usize,
        /// The offending input.
        input: String,
    },
    /// A separator was given but it occurs more than once on a line.
    #[error("line {line}: expected at most one separator `{separator}`")]
    AmbiguousSeparator {
        /// The line (starting at 1).
        line: usize,
        /// The separator in use.
        separator: char,
    },
}
