/*
    This module is for storing and indexing CNF grammars
*/

use fnv::FnvHashMap;
use indexmap::IndexSet;

// Position of a nonterminal in the grammar's symbol table
pub type NonterminalId = usize;

// The start symbol is always registered first
pub const START: NonterminalId = 0;

// A -> word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryRule {
    pub lhs: NonterminalId,
    pub word: String,
}

// A -> B C
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryRule {
    pub lhs: NonterminalId,
    pub left: NonterminalId,
    pub right: NonterminalId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Unary(UnaryRule),
    Binary(BinaryRule),
}

impl Rule {
    pub fn lhs(&self) -> NonterminalId {
        match self {
            Rule::Unary(rule) => rule.lhs,
            Rule::Binary(rule) => rule.lhs,
        }
    }
}

/// A grammar in Chomsky Normal Form.
///
/// Nonterminals are numbered in the order they are first seen, so the start
/// symbol is always [`START`]. Rules keep their declaration order, which is
/// also the order derivations are recorded in during recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    nonterminals: IndexSet<String>,
    unary: Vec<UnaryRule>,
    binary: Vec<BinaryRule>,
    lexicon: FnvHashMap<String, Vec<NonterminalId>>,
}

impl Grammar {
    pub fn new(start_symbol: &str) -> Self {
        let mut nonterminals = IndexSet::new();
        nonterminals.insert(start_symbol.to_string());

        Grammar {
            nonterminals,
            unary: Vec::new(),
            binary: Vec::new(),
            lexicon: FnvHashMap::default(),
        }
    }

    // Returns the id of a nonterminal, registering it if it is new
    pub fn intern(&mut self, name: &str) -> NonterminalId {
        match self.nonterminals.get_index_of(name) {
            Some(id) => id,
            None => self.nonterminals.insert_full(name.to_string()).0,
        }
    }

    pub fn add_unary(&mut self, lhs: &str, word: &str) -> Rule {
        let lhs = self.intern(lhs);
        let rule = UnaryRule { lhs, word: word.to_string() };

        self.lexicon.entry(rule.word.clone()).or_default().push(lhs);
        self.unary.push(rule.clone());
        Rule::Unary(rule)
    }

    pub fn add_binary(&mut self, lhs: &str, left: &str, right: &str) -> Rule {
        let rule = BinaryRule {
            lhs: self.intern(lhs),
            left: self.intern(left),
            right: self.intern(right),
        };

        self.binary.push(rule);
        Rule::Binary(rule)
    }

    pub fn start_symbol(&self) -> &str {
        self.name_of(START).unwrap_or_default()
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.nonterminals.iter().map(String::as_str)
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn index_of(&self, name: &str) -> Option<NonterminalId> {
        self.nonterminals.get_index_of(name)
    }

    pub fn name_of(&self, id: NonterminalId) -> Option<&str> {
        self.nonterminals.get_index(id).map(String::as_str)
    }

    pub fn unary_rules(&self) -> &[UnaryRule] {
        &self.unary
    }

    pub fn binary_rules(&self) -> &[BinaryRule] {
        &self.binary
    }

    /// Nonterminals with a unary rule producing `word`, one entry per rule.
    pub fn categories_of(&self, word: &str) -> &[NonterminalId] {
        self.lexicon.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    // Every rule with the given left-hand side, unary rules first
    pub fn rules_for(&self, lhs: NonterminalId) -> impl Iterator<Item = Rule> + '_ {
        let unary = self.unary.iter()
            .filter(move |rule| rule.lhs == lhs)
            .cloned()
            .map(Rule::Unary);
        let binary = self.binary.iter()
            .filter(move |rule| rule.lhs == lhs)
            .copied()
            .map(Rule::Binary);
        unary.chain(binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Grammar {
        let mut grammar = Grammar::new("S");
        grammar.add_binary("S", "NP", "VP");
        grammar.add_binary("NP", "Det", "N");
        grammar.add_unary("VP", "sees");
        grammar.add_unary("Det", "the");
        grammar.add_unary("N", "dog");
        grammar
    }

    #[test]
    fn start_symbol_is_zero() {
        let grammar = toy();
        assert_eq!(grammar.index_of("S"), Some(START));
        assert_eq!(grammar.start_symbol(), "S");
    }

    #[test]
    fn first_sight_ordering() {
        let grammar = toy();
        assert_eq!(
            grammar.nonterminals().collect::<Vec<_>>(),
            vec!["S", "NP", "VP", "Det", "N"]
        );
    }

    #[test]
    fn intern_is_idempotent() {
        let mut grammar = toy();
        let before = grammar.nonterminal_count();
        assert_eq!(grammar.intern("Det"), 3);
        assert_eq!(grammar.nonterminal_count(), before);
        assert_eq!(grammar.intern("Adj"), before);
    }

    #[test]
    fn lexicon_lookup() {
        let mut grammar = toy();
        grammar.add_unary("VP", "dog");
        assert_eq!(grammar.categories_of("dog"), &[4, 2]);
        assert!(grammar.categories_of("cat").is_empty());
    }

    #[test]
    fn rules_for_lhs() {
        let grammar = toy();
        let rules = grammar.rules_for(START).collect::<Vec<_>>();
        assert_eq!(rules, vec![Rule::Binary(BinaryRule { lhs: 0, left: 1, right: 2 })]);
        assert_eq!(grammar.rules_for(2).map(|rule| rule.lhs()).collect::<Vec<_>>(), vec![2]);
    }
}
