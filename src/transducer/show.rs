use std::fmt::{Debug, Display};

use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::alphabet::Symbol;
use crate::transducer::{Edge, State, Transducer};
use crate::Show;

impl<O: Symbol> Debug for Edge<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{}", self.output().show(), self.target())
    }
}

impl<O: Symbol> Debug for State<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let edges = self
            .edges()
            .map(|(sym, edge)| format!("{sym}:{edge:?}"))
            .join(", ");
        if self.is_accepting() {
            write!(f, "[{}] {{{edges}}}", self.output().show())
        } else {
            write!(f, "[?] {{{edges}}}")
        }
    }
}

impl<S: Symbol, O: Symbol> Transducer<S, O> {
    /// Returns a string representation of the transition table of the reachable part.
    /// Each row is a state, each column a symbol; cells read `output → target`. Accepting
    /// states are highlighted and carry their final output, `-` marks a missing edge.
    pub fn build_transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            ["State".to_string(), "Final".to_string()]
                .into_iter()
                .chain(self.embedding().universe().map(|s| s.show())),
        );
        for q in self.reachable_state_indices() {
            let state = self.state(q);
            let mut row = if state.is_accepting() {
                vec![
                    q.show().bold().green().to_string(),
                    state.output().show(),
                ]
            } else {
                vec![q.show(), "-".to_string()]
            };
            for sym in 0..self.embedding().size() {
                row.push(match self.edge(q, sym) {
                    Some(edge) => format!("{} → {}", edge.output().show(), edge.target()),
                    None => "-".to_string(),
                });
            }
            builder.push_record(row);
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }

    /// Compute the graphviz representation of the reachable part, for more information on the
    /// DOT format, see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    pub fn to_dot(&self) -> String {
        let reachable = self.reachable_state_indices();
        let header = [
            "digraph T {".to_string(),
            "rankdir=LR".to_string(),
            "init [shape=point]".to_string(),
            format!("init -> q{}", self.root()),
        ];
        let states = reachable.iter().map(|q| {
            let state = self.state(*q);
            if state.is_accepting() {
                format!(
                    "q{q} [shape=doublecircle, label=\"{q}/{}\"]",
                    escape(&state.output().show())
                )
            } else {
                format!("q{q} [shape=circle, label=\"{q}\"]")
            }
        });
        let transitions = reachable.iter().flat_map(|q| {
            self.state(*q).edges().map(move |(sym, edge)| {
                format!(
                    "q{q} -> q{} [label=\"{}:{}\"]",
                    edge.target(),
                    escape(&self.embedding().retrieve(sym).show()),
                    escape(&edge.output().show())
                )
            })
        });
        header
            .into_iter()
            .chain(states)
            .chain(transitions)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<S: Symbol, O: Symbol> Display for Transducer<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.build_transition_table())
    }
}

impl<S: Symbol, O: Symbol> Debug for Transducer<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "root {} over {:?}", self.root(), self.embedding())?;
        for (q, state) in self.states() {
            writeln!(f, "{q}: {state:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn echo() -> Transducer<char, char> {
        let mut t = Transducer::new(Embedding::new(['a', 'b']));
        t.set_accepting(t.root(), "");
        t.add_edge(t.root(), 'a', "a", t.root());
        t
    }

    #[test]
    fn dot_lists_states_and_edges() {
        let dot = echo().to_dot();
        assert!(dot.starts_with("digraph T {"));
        assert!(dot.contains("q0 [shape=doublecircle, label=\"0/ε\"]"));
        assert!(dot.contains("q0 -> q0 [label=\"a:\\\"a\\\"\"]"));
        assert!(dot.ends_with('}'));
    }

    #[test]
    fn table_and_debug() {
        let t = echo();
        let table = t.to_string();
        assert!(table.contains("State"));
        assert!(table.contains("→ 0"));
        let debug = format!("{:?}", t);
        assert!(debug.contains("0: [ε] {0:\"a\"→0}"));
    }
}
