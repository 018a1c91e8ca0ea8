/*
    This module loads CNF grammar files
*/

mod lexer;
mod verifier;

use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};

use crate::error_handling::*;
use crate::grammar::*;
use lexer::*;
use verifier::{get_undefined_symbols, LocatedRules};

#[derive(Debug, thiserror::Error)]
pub enum GrammarErrorType {
    // The file has no non-blank line to take the start symbol from
    #[error("Grammar is empty, expected a start symbol")]
    MissingStartSymbol,
    // The first line is something other than a lone symbol
    #[error("Expected a single start symbol, found `{0}`")]
    InvalidStartSymbol(String),
    // A rule line has no `->`
    #[error("Expected `->` after the left-hand side")]
    MissingArrow,
    // A rule line has more than one `->`
    #[error("Unexpected second `->` encountered")]
    UnexpectedArrow,
    // Nothing before the `->`
    #[error("Rule has no left-hand side")]
    MissingLhs,
    // Several symbols before the `->`
    #[error("Left-hand side `{0}` is not a single symbol")]
    MultipleLhs(String),
    // CNF only allows `A -> word` and `A -> B C`
    #[error("Right-hand side has {0} symbols, expected 1 or 2")]
    WrongArity(usize),
    // A nonterminal is used but never defined
    #[error("Could not find a rule for `{0}`")]
    UndefinedNonterminal(String),
    // There was an issue with reading a file
    #[error("File error: {0}")]
    FileError(std::io::Error),
}

impl ErrorType for GrammarErrorType {}

impl PartialEq for GrammarErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GrammarErrorType::FileError(a), GrammarErrorType::FileError(b)) => a.kind() == b.kind(),
            (GrammarErrorType::InvalidStartSymbol(a), GrammarErrorType::InvalidStartSymbol(b)) => a == b,
            (GrammarErrorType::MultipleLhs(a), GrammarErrorType::MultipleLhs(b)) => a == b,
            (GrammarErrorType::WrongArity(a), GrammarErrorType::WrongArity(b)) => a == b,
            (GrammarErrorType::UndefinedNonterminal(a), GrammarErrorType::UndefinedNonterminal(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

pub type GrammarError = Error<GrammarErrorType>;
pub type GrammarErrors = Errors<GrammarErrorType>;

pub type Result<T> = std::result::Result<T, GrammarErrorType>;
pub type LineResult<T> = std::result::Result<T, GrammarError>;
pub type FileResult<T> = std::result::Result<T, GrammarErrors>;

/// What to do with nonterminals that are used but never defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Refuse to load the grammar.
    Strict,
    /// Log a warning; the symbol stays registered and never derives anything.
    #[default]
    Lenient,
}

#[derive(PartialEq, Debug)]
enum Rhs {
    Word(String),
    Pair(String, String),
}

#[derive(PartialEq, Debug)]
struct RuleLine {
    lhs: String,
    rhs: Rhs,
    location: Location
}

fn io_error(error: std::io::Error, file: &Path) -> GrammarError {
    GrammarError {
        location: Location::file(file.to_path_buf()),
        error: GrammarErrorType::FileError(error)
    }
}

fn parse_start(tokens: &[Token], line: &str) -> Result<String> {
    match tokens {
        [Token::Symbol(symbol)] => Ok(symbol.clone()),
        _ => Err(GrammarErrorType::InvalidStartSymbol(line.to_string()))
    }
}

fn parse_rhs(tokens: &[Token]) -> Result<Rhs> {
    let symbols = tokens.iter().map(|t| match t {
        Token::Arrow => Err(GrammarErrorType::UnexpectedArrow),
        Token::Symbol(s) => Ok(s.clone())
    }).collect::<Result<Vec<_>>>()?;

    match <[String; 2]>::try_from(symbols) {
        Ok([left, right]) => Ok(Rhs::Pair(left, right)),
        Err(mut symbols) if symbols.len() == 1 => Ok(Rhs::Word(symbols.remove(0))),
        Err(symbols) => Err(GrammarErrorType::WrongArity(symbols.len())),
    }
}

fn parse_rule(tokens: &[Token], location: Location) -> Result<RuleLine> {
    let arrow = tokens.iter()
        .position(|t| *t == Token::Arrow)
        .ok_or(GrammarErrorType::MissingArrow)?;

    let lhs = match &tokens[..arrow] {
        [Token::Symbol(s)] => Ok(s.clone()),
        [] => Err(GrammarErrorType::MissingLhs),
        many => Err(GrammarErrorType::MultipleLhs(many.iter()
            .filter_map(|t| match t {
                Token::Symbol(s) => Some(s.as_str()),
                Token::Arrow => None
            })
            .join(" ")))
    }?;

    let rhs = parse_rhs(&tokens[arrow + 1..])?;

    Ok(RuleLine {
        lhs,
        rhs,
        location
    })
}

fn parse_lex_rule(line: &str, location: Location) -> LineResult<RuleLine> {
    parse_rule(&lex_line(line), location.clone())
        .map_err(|error| GrammarError { location, error })
}

fn is_rule_line(line: &String) -> bool {
    !line.trim().is_empty()
}

// Numbers the lines of a source and drops the blank ones. Errors are kept so
// that they get reported
fn numbered_lines<'a, R: BufRead + 'a>(reader: R, path: &'a Path) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    reader
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path)))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

fn grammar_from_rules(start: &str, rule_lines: Vec<RuleLine>) -> (Grammar, LocatedRules) {
    let mut grammar = Grammar::new(start);

    let rules = rule_lines.into_iter()
        .map(|line| {
            let rule = match &line.rhs {
                Rhs::Word(word) => grammar.add_unary(&line.lhs, word),
                Rhs::Pair(left, right) => grammar.add_binary(&line.lhs, left, right),
            };
            (rule, line.location)
        })
        .collect_vec();

    (grammar, rules)
}

fn verify(grammar: Grammar, rules: &LocatedRules, strictness: Strictness) -> FileResult<Grammar> {
    let undefined = get_undefined_symbols(&grammar, rules);

    match strictness {
        Strictness::Strict if !undefined.is_empty() => Err(undefined),
        _ => {
            for error in undefined {
                warn!("{}: {}", error.location, error.error);
            }
            Ok(grammar)
        }
    }
}

/// Builds a grammar from the lines of `reader`, reporting errors against
/// `path`. Every malformed line is reported, not just the first.
pub fn parse_reader<R: BufRead>(reader: R, path: &Path, strictness: Strictness) -> FileResult<Grammar> {
    let mut lines = numbered_lines(reader, path);

    let start = match lines.next() {
        None => return Err(vec![GrammarError {
            location: Location::file(path.to_path_buf()),
            error: GrammarErrorType::MissingStartSymbol
        }]),
        Some((num, line_res)) => line_res.and_then(|line| {
            parse_start(&lex_line(&line), line.trim()).map_err(|error| GrammarError {
                location: Location { file: path.to_path_buf(), line: num },
                error
            })
        })
    };

    let parsed_lines = lines.map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_rule(&line, Location {
            file: path.to_path_buf(),
            line: num
        }))
    });

    let (rule_lines, mut errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    let start = match start {
        Ok(start) if errors.is_empty() => start,
        Ok(_) => return Err(errors),
        Err(error) => {
            errors.insert(0, error);
            return Err(errors);
        }
    };

    let (grammar, rules) = grammar_from_rules(&start, rule_lines);
    debug!(
        "loaded {}: {} nonterminals, {} unary rules, {} binary rules",
        path.display(),
        grammar.nonterminal_count(),
        grammar.unary_rules().len(),
        grammar.binary_rules().len()
    );

    verify(grammar, &rules, strictness)
}

pub fn parse_file(path: &Path, strictness: Strictness) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    parse_reader(std::io::BufReader::new(file), path, strictness)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn at(line: usize) -> Location {
        Location {
            file: PathBuf::new(),
            line
        }
    }

    fn parse_text(text: &str, strictness: Strictness) -> FileResult<Grammar> {
        parse_reader(text.as_bytes(), Path::new(""), strictness)
    }

    #[test]
    fn parse_normal_rule() {
        let tokens = lex_line("S -> NP VP");
        assert_eq!(parse_rule(&tokens, at(2)), Ok(RuleLine {
            lhs: "S".to_string(),
            rhs: Rhs::Pair("NP".to_string(), "VP".to_string()),
            location: at(2)
        }));

        let tokens = lex_line("Det -> the");
        assert_eq!(parse_rule(&tokens, at(3)), Ok(RuleLine {
            lhs: "Det".to_string(),
            rhs: Rhs::Word("the".to_string()),
            location: at(3)
        }));
    }

    #[test]
    fn parse_malformed_rule() {
        let cases = vec![
            ("Det the", GrammarErrorType::MissingArrow),
            ("S->NP VP", GrammarErrorType::MissingArrow),
            ("N -> -> dog", GrammarErrorType::UnexpectedArrow),
            ("-> dog", GrammarErrorType::MissingLhs),
            ("A B -> C", GrammarErrorType::MultipleLhs("A B".to_string())),
            ("NP -> Det N Adj", GrammarErrorType::WrongArity(3)),
            ("NP ->", GrammarErrorType::WrongArity(0)),
        ];

        for (line, answer) in cases {
            assert_eq!(parse_rule(&lex_line(line), at(0)), Err(answer), "{}", line);
        }
    }

    #[test]
    fn parse_malformed_start() {
        assert_eq!(
            parse_start(&lex_line("S -> NP VP"), "S -> NP VP"),
            Err(GrammarErrorType::InvalidStartSymbol("S -> NP VP".to_string()))
        );
        assert_eq!(parse_start(&lex_line("S"), "S"), Ok("S".to_string()));
    }

    #[test]
    fn parse_normal_file() {
        let example_path = PathBuf::from("example_data/toy.cnf");
        let grammar = parse_file(&example_path, Strictness::Strict).unwrap();

        let mut answer = Grammar::new("S");
        answer.add_binary("S", "NP", "VP");
        answer.add_binary("NP", "Det", "N");
        answer.add_unary("VP", "sees");
        answer.add_unary("Det", "the");
        answer.add_unary("N", "dog");

        assert_eq!(grammar, answer);
    }

    #[test]
    fn parse_malformed_file() {
        let example_path = PathBuf::from("example_data/malformed.cnf");
        let errors = parse_file(&example_path, Strictness::Lenient).unwrap_err();

        let located = |line, error| GrammarError {
            location: Location { file: example_path.clone(), line },
            error
        };
        assert_eq!(errors, vec![
            located(3, GrammarErrorType::WrongArity(3)),
            located(6, GrammarErrorType::MissingArrow),
            located(7, GrammarErrorType::UnexpectedArrow),
            located(8, GrammarErrorType::MissingLhs),
        ]);
    }

    #[test]
    fn missing_file() {
        let example_path = PathBuf::from("example_data/does_not_exist.cnf");
        let errors = parse_file(&example_path, Strictness::Lenient).unwrap_err();

        assert_eq!(errors, vec![GrammarError {
            location: Location::file(example_path),
            error: GrammarErrorType::FileError(std::io::ErrorKind::NotFound.into())
        }]);
    }

    #[test]
    fn empty_grammar() {
        assert_eq!(parse_text("\n  \n", Strictness::Lenient).unwrap_err(), vec![GrammarError {
            location: Location::file(PathBuf::new()),
            error: GrammarErrorType::MissingStartSymbol
        }]);
    }

    #[test]
    fn start_symbol_only() {
        let grammar = parse_text("\n\nS\n", Strictness::Strict).unwrap();
        assert_eq!(grammar.nonterminals().collect_vec(), vec!["S"]);
        assert!(grammar.unary_rules().is_empty());
        assert!(grammar.binary_rules().is_empty());
    }

    #[test]
    fn bad_start_reported_with_rule_errors() {
        let errors = parse_text("S -> A B\nA a\n", Strictness::Lenient).unwrap_err();
        assert_eq!(errors, vec![
            GrammarError { location: at(1), error: GrammarErrorType::InvalidStartSymbol("S -> A B".to_string()) },
            GrammarError { location: at(2), error: GrammarErrorType::MissingArrow },
        ]);
    }

    #[test]
    fn rhs_only_symbols_are_registered() {
        let example_path = PathBuf::from("example_data/undefined.cnf");
        let grammar = parse_file(&example_path, Strictness::Lenient).unwrap();

        assert_eq!(grammar.index_of("VP"), Some(2));
        assert_eq!(grammar.binary_rules()[0].right, 2);
    }

    #[test]
    fn strict_rejects_undefined_symbols() {
        let example_path = PathBuf::from("example_data/undefined.cnf");
        let errors = parse_file(&example_path, Strictness::Strict).unwrap_err();

        assert_eq!(errors, vec![GrammarError {
            location: Location { file: example_path, line: 2 },
            error: GrammarErrorType::UndefinedNonterminal("VP".to_string())
        }]);
    }
}
