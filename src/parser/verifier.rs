use std::collections::HashSet;

use crate::grammar::{Grammar, NonterminalId, Rule, START};
use super::GrammarErrorType::UndefinedNonterminal;
use super::{GrammarError, GrammarErrors, Location};

pub type LocatedRules = Vec<(Rule, Location)>;

fn defined_nonterminals(rules: &LocatedRules) -> HashSet<NonterminalId> {
    rules.iter()
        .map(|(rule, _)| rule.lhs())
        .chain(std::iter::once(START))
        .collect()
}

// Nonterminals referenced on a right-hand side but never given a rule can
// never derive anything. They are reported once, at their first reference.
pub fn get_undefined_symbols(grammar: &Grammar, rules: &LocatedRules) -> GrammarErrors {
    let defined = defined_nonterminals(rules);
    let mut reported = HashSet::new();

    rules.iter()
        .filter_map(|(rule, location)| match rule {
            Rule::Binary(rule) => Some(([rule.left, rule.right], location)),
            Rule::Unary(_) => None
        })
        .flat_map(|(symbols, location)| symbols.into_iter().map(move |id| (id, location)))
        .filter(|(id, _)| !defined.contains(id))
        .filter(|(id, _)| reported.insert(*id))
        .map(|(id, location)| GrammarError {
            location: location.to_owned(),
            error: UndefinedNonterminal(grammar.name_of(id).unwrap_or_default().to_owned())
        })
        .collect()
}
