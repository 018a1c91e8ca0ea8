/*
    This module generates sentences from a CNF grammar
*/

use rand::prelude::*;

use crate::grammar::*;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum GenerateErrorType {
    // A reachable nonterminal has no rules at all
    #[error("No rule for nonterminal `{0}`")]
    NoProductions(String),
    // Past the depth limit only unary rules may be used, and there are none
    #[error("Nonterminal `{0}` has no unary rule to stop at the depth limit")]
    DepthExceeded(String),
}

pub type GenResult = Result<Vec<String>, GenerateErrorType>;

pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Samples a sentence of the grammar's language, choosing uniformly among
/// the rules of each nonterminal. From `max_depth` on only unary rules are
/// chosen, so the sentence has at most `2^max_depth` words.
pub fn generate<R: Rng + ?Sized>(grammar: &Grammar, rng: &mut R, max_depth: usize) -> GenResult {
    generate_with_override(grammar, START, rng, max_depth)
}

// Generates a sentence derived from the given nonterminal
pub fn generate_with_override<R: Rng + ?Sized>(grammar: &Grammar, start: NonterminalId, rng: &mut R, max_depth: usize) -> GenResult {
    let mut words = Vec::new();
    generate_nonterminal(grammar, start, rng, max_depth, &mut words)?;
    Ok(words)
}

fn name(grammar: &Grammar, nonterminal: NonterminalId) -> String {
    grammar.name_of(nonterminal).unwrap_or_default().to_string()
}

fn generate_nonterminal<R: Rng + ?Sized>(
    grammar: &Grammar,
    nonterminal: NonterminalId,
    rng: &mut R,
    depth: usize,
    words: &mut Vec<String>,
) -> Result<(), GenerateErrorType> {
    let rules = grammar.rules_for(nonterminal)
        .filter(|rule| depth > 0 || matches!(rule, Rule::Unary(_)))
        .collect::<Vec<_>>();

    let rule = match rules.choose(rng) {
        Some(rule) => rule,
        None if grammar.rules_for(nonterminal).next().is_none() => {
            return Err(GenerateErrorType::NoProductions(name(grammar, nonterminal)))
        }
        None => return Err(GenerateErrorType::DepthExceeded(name(grammar, nonterminal))),
    };

    match rule {
        Rule::Unary(rule) => words.push(rule.word.clone()),
        Rule::Binary(rule) => {
            generate_nonterminal(grammar, rule.left, rng, depth - 1, words)?;
            generate_nonterminal(grammar, rule.right, rng, depth - 1, words)?;
        }
    }
    Ok(())
}
