//! Query tokenizer
//!
//! Splits a raw search string into typed tokens in one left-to-right pass:
//! - `"..."` produces an exact phrase
//! - `` `...` `` produces a literal phrase
//! - bare `and` / `or` (any case) produce operators
//! - anything else separated by whitespace is a word

use serde::Serialize;

/// The kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Word,
    ExactPhrase,
    LiteralPhrase,
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    #[cfg(test)]
    pub fn word(value: impl Into<String>) -> Self {
        Self::new(value, TokenKind::Word)
    }

    #[cfg(test)]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::new(value, TokenKind::ExactPhrase)
    }

    #[cfg(test)]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(value, TokenKind::LiteralPhrase)
    }

    #[cfg(test)]
    pub fn operator(value: impl Into<String>) -> Self {
        Self::new(value, TokenKind::Operator)
    }

    pub fn is_operator(&self) -> bool {
        self.kind == TokenKind::Operator
    }

    /// True for an `or` operator, in any case
    pub fn is_or(&self) -> bool {
        self.is_operator() && self.value.eq_ignore_ascii_case("or")
    }
}

/// Quoting mode the scanner is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Backtick,
}

impl Quote {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Quote::Double),
            '`' => Some(Quote::Backtick),
            _ => None,
        }
    }

    fn delimiter(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Backtick => '`',
        }
    }

    fn kind(self) -> TokenKind {
        match self {
            Quote::Double => TokenKind::ExactPhrase,
            Quote::Backtick => TokenKind::LiteralPhrase,
        }
    }
}

fn is_operator_word(text: &str) -> bool {
    text.eq_ignore_ascii_case("and") || text.eq_ignore_ascii_case("or")
}

/// Emit pending unquoted text as a word or operator
fn flush_bare(tokens: &mut Vec<Token>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        let kind = if is_operator_word(text) {
            TokenKind::Operator
        } else {
            TokenKind::Word
        };
        tokens.push(Token::new(text, kind));
    }
    current.clear();
}

/// Emit a quoted phrase; phrases that trim to nothing are dropped
fn flush_phrase(tokens: &mut Vec<Token>, current: &mut String, quote: Quote) {
    let text = current.trim();
    if !text.is_empty() {
        tokens.push(Token::new(text, quote.kind()));
    }
    current.clear();
}

/// Split a raw query into tokens.
///
/// An unterminated quote is closed implicitly at the end of input.
pub fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut mode: Option<Quote> = None;

    for ch in raw.chars() {
        match mode {
            Some(quote) if ch == quote.delimiter() => {
                flush_phrase(&mut tokens, &mut current, quote);
                mode = None;
            }
            Some(_) => current.push(ch),
            None => {
                if let Some(quote) = Quote::from_char(ch) {
                    flush_bare(&mut tokens, &mut current);
                    mode = Some(quote);
                } else if ch.is_whitespace() {
                    flush_bare(&mut tokens, &mut current);
                } else {
                    current.push(ch);
                }
            }
        }
    }

    match mode {
        Some(quote) => flush_phrase(&mut tokens, &mut current, quote),
        None => flush_bare(&mut tokens, &mut current),
    }

    tokens
}
