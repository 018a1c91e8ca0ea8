/*
    This module recognizes sentences with the CYK algorithm
*/

use log::{debug, trace};

use crate::grammar::*;

/// One way a binary rule produced a chart cell: the span was split after
/// `split` tokens, with `left` covering the first part and `right` the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    pub split: usize,
    pub left: NonterminalId,
    pub right: NonterminalId,
}

// Offsets into the flat cell arenas shared by `Chart` and `Backpointers`.
// Cells are addressed by span length (1-based), span start and nonterminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    tokens: usize,
    nonterminals: usize,
}

impl Layout {
    fn cells(&self) -> usize {
        self.tokens * self.tokens * self.nonterminals
    }

    fn contains(&self, length: usize, start: usize, nonterminal: NonterminalId) -> bool {
        length >= 1 && start + length <= self.tokens && nonterminal < self.nonterminals
    }

    fn offset(&self, length: usize, start: usize, nonterminal: NonterminalId) -> usize {
        ((length - 1) * self.tokens + start) * self.nonterminals + nonterminal
    }
}

/// The recognition table: whether a nonterminal derives the span of
/// `length` tokens beginning at `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    layout: Layout,
    cells: Vec<bool>,
}

impl Chart {
    fn new(layout: Layout) -> Self {
        Chart {
            layout,
            cells: vec![false; layout.cells()],
        }
    }

    pub fn tokens(&self) -> usize {
        self.layout.tokens
    }

    // Spans outside the sentence are never derived
    pub fn get(&self, length: usize, start: usize, nonterminal: NonterminalId) -> bool {
        self.layout.contains(length, start, nonterminal)
            && self.cells[self.layout.offset(length, start, nonterminal)]
    }

    fn set(&mut self, length: usize, start: usize, nonterminal: NonterminalId) {
        let offset = self.layout.offset(length, start, nonterminal);
        self.cells[offset] = true;
    }

    pub fn derived_cells(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }
}

/// Every recorded derivation of every chart cell, laid out like [`Chart`].
///
/// Derivations of a cell are kept in the order they were found: split
/// points left to right, and for each split the binary rules in declaration
/// order. Ambiguous derivations are all kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backpointers {
    layout: Layout,
    cells: Vec<Vec<Derivation>>,
}

impl Backpointers {
    fn new(layout: Layout) -> Self {
        Backpointers {
            layout,
            cells: vec![Vec::new(); layout.cells()],
        }
    }

    fn push(&mut self, length: usize, start: usize, nonterminal: NonterminalId, derivation: Derivation) {
        let offset = self.layout.offset(length, start, nonterminal);
        self.cells[offset].push(derivation);
    }

    pub fn tokens(&self) -> usize {
        self.layout.tokens
    }

    pub fn derivations(&self, length: usize, start: usize, nonterminal: NonterminalId) -> &[Derivation] {
        if self.layout.contains(length, start, nonterminal) {
            &self.cells[self.layout.offset(length, start, nonterminal)]
        } else {
            &[]
        }
    }

    // Derivations recorded for the start symbol over the whole sentence
    pub fn root(&self) -> &[Derivation] {
        self.derivations(self.layout.tokens, 0, START)
    }

    pub fn total(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Accepted(Backpointers),
    Rejected,
}

impl Recognition {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Recognition::Accepted(_))
    }

    // The verdict line written for this sentence
    pub fn verdict(&self) -> &'static str {
        if self.is_accepted() { "1" } else { "0" }
    }
}

fn fill_words<S: AsRef<str>>(grammar: &Grammar, tokens: &[S], chart: &mut Chart) -> bool {
    for (start, token) in tokens.iter().enumerate() {
        let word: &str = token.as_ref();
        let categories = grammar.categories_of(word);
        if categories.is_empty() {
            debug!("no unary rule produces `{}`, rejecting", word);
            return false;
        }
        for &nonterminal in categories {
            chart.set(1, start, nonterminal);
        }
    }
    true
}

fn fill_spans(grammar: &Grammar, chart: &mut Chart, backpointers: &mut Backpointers) {
    let n = chart.tokens();
    for length in 2..=n {
        for start in 0..=n - length {
            for split in 1..length {
                for rule in grammar.binary_rules() {
                    if chart.get(split, start, rule.left) && chart.get(length - split, start + split, rule.right) {
                        chart.set(length, start, rule.lhs);
                        backpointers.push(length, start, rule.lhs, Derivation {
                            split,
                            left: rule.left,
                            right: rule.right,
                        });
                    }
                }
            }
        }
    }
}

/// Runs CYK over `tokens` and returns the filled chart with its
/// backpointers, or `None` when some token has no unary rule.
pub fn fill_chart<S: AsRef<str>>(grammar: &Grammar, tokens: &[S]) -> Option<(Chart, Backpointers)> {
    let layout = Layout {
        tokens: tokens.len(),
        nonterminals: grammar.nonterminal_count(),
    };
    let mut chart = Chart::new(layout);
    let mut backpointers = Backpointers::new(layout);

    if !fill_words(grammar, tokens, &mut chart) {
        return None;
    }
    fill_spans(grammar, &mut chart, &mut backpointers);

    trace!(
        "{} tokens: {} derived cells, {} derivations",
        layout.tokens,
        chart.derived_cells(),
        backpointers.total()
    );
    Some((chart, backpointers))
}

/// Decides whether the start symbol derives the whole of `tokens`.
///
/// An empty sentence is always rejected, as is any sentence containing a
/// token that no unary rule produces.
pub fn recognize<S: AsRef<str>>(grammar: &Grammar, tokens: &[S]) -> Recognition {
    if tokens.is_empty() {
        return Recognition::Rejected;
    }

    match fill_chart(grammar, tokens) {
        Some((chart, backpointers)) if chart.get(tokens.len(), 0, START) => Recognition::Accepted(backpointers),
        _ => Recognition::Rejected,
    }
}
