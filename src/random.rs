use tracing::debug;

use crate::prelude::*;

/// Gives the first `size` lowercase letters starting at `first`.
fn letters(first: char, size: usize) -> Vec<char> {
    assert!(size <= 26, "at most 26 letters are supported");
    (0..size)
        .map(|i| (first as u8 + i as u8) as char)
        .collect()
}

/// Uses a sprout-like algorithm to generate a random transducer over the first `symbols`
/// letters of the alphabet, emitting the first `outputs` letters. The algorithm is as follows:
/// 1. Start with a single state.
/// 2. For each symbol, go through the existing states in order and with probability
///    `probability` add a back edge to that state.
/// 3. If no back edge was added, we insert an edge to a new state.
/// 4. Repeat until all states and symbols have been treated.
///
/// Every edge emits a random word of length at most `max_output_len` over the `outputs` output
/// letters, every state is accepting with probability one half and then has a random final
/// output as well.
pub fn generate_random_transducer(
    symbols: usize,
    outputs: usize,
    probability: f64,
    max_output_len: usize,
) -> Transducer<char, char> {
    assert!(outputs > 0, "at least one output letter is needed");
    let inputs = letters('a', symbols);
    let output_letters = letters('a', outputs);
    let random_output = || -> Vec<char> {
        (0..fastrand::usize(0..=max_output_len))
            .map(|_| output_letters[fastrand::usize(..output_letters.len())])
            .collect()
    };

    let mut transducer = Transducer::new(Embedding::new(inputs.iter().copied()));
    let mut current = transducer.root();
    while current < transducer.size() {
        if fastrand::bool() {
            transducer.set_accepting(current, random_output());
        }
        'symbols: for sym in &inputs {
            for target in 0..=current {
                if fastrand::f64() < probability {
                    transducer.add_edge(current, *sym, random_output(), target);
                    continue 'symbols;
                }
            }
            // no target was found so we create it
            let target = transducer.add_state();
            transducer.add_edge(current, *sym, random_output(), target);
        }
        current += 1;
    }
    debug!(
        "generated random transducer with {} states",
        transducer.size()
    );
    transducer
}

/// Generate a random `String` over the given symbols. The length of the `String` is drawn
/// uniformly from the range `min_len..=max_len`.
pub fn generate_random_word(symbols: &[char], min_len: usize, max_len: usize) -> String {
    let length = fastrand::usize(min_len..=max_len);
    (0..length)
        .map(|_| symbols[fastrand::usize(..symbols.len())])
        .collect()
}

/// Generate a sample of the behaviour of `target` from `number` random inputs (duplicates are
/// dropped) with lengths drawn uniformly from `min_len..=max_len`. Inputs that `target` accepts
/// become positive examples, all others negative ones.
pub fn generate_random_sample(
    target: &Transducer<char, char>,
    min_len: usize,
    max_len: usize,
    number: usize,
) -> Sample<char, char> {
    let symbols = target.embedding().universe().collect::<Vec<_>>();
    let mut seen = math::Set::default();
    let mut sample = Sample::new().with_embedding(target.embedding().clone());
    for _ in 0..number {
        let word = generate_random_word(&symbols, min_len, max_len);
        if !seen.insert(word.clone()) {
            continue;
        }
        let output = target.run(word.as_str());
        sample.insert(word, output);
    }
    sample
}
