#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Symbol(String)
}

const ARROW: &str = "->";

pub fn lex_word(word: &str) -> Token {
    if word == ARROW {
        Token::Arrow
    } else {
        Token::Symbol(word.to_string())
    }
}

// Grammar lines are whitespace separated, so lexing never fails
pub fn lex_line(line: &str) -> Vec<Token> {
    line.split_whitespace().map(lex_word).collect()
}
