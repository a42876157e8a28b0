//! Query builder
//!
//! Validates a token stream and turns it into a [`Query`]: an ordered list
//! of keywords combined with a single AND/OR flag.

use serde::{Deserialize, Serialize};

use crate::core::error::PatternError;
use crate::query::tokenizer::{tokenize, Token, TokenKind};

/// How keywords are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    And,
    Or,
}

/// How a keyword is compared against a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// From a `"double quoted"` phrase: case-insensitive substring
    Exact,
    /// From a `` `backtick` `` phrase: case-insensitive substring
    Literal,
    /// Bare word: must equal one whitespace-delimited token of the line
    Word,
}

/// How bare words are turned into keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordMode {
    /// Bare words match whole tokens only
    #[default]
    Whole,
    /// Bare words match anywhere in the line, like a literal phrase
    Substring,
}

impl std::str::FromStr for WordMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whole" => Ok(WordMode::Whole),
            "substring" => Ok(WordMode::Substring),
            _ => Err(format!("Unknown word mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub value: String,
    pub kind: MatchKind,
}

impl Keyword {
    pub fn new(value: impl Into<String>, kind: MatchKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

/// A validated query. Always holds at least one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    keywords: Vec<Keyword>,
    logic: Logic,
}

impl Query {
    /// Build a query directly from keywords
    pub fn new(keywords: Vec<Keyword>, logic: Logic) -> Result<Self, PatternError> {
        if keywords.is_empty() {
            return Err(PatternError::NoKeywords);
        }
        Ok(Self { keywords, logic })
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }
}

/// Turns tokens into a [`Query`]
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    word_mode: WordMode,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_word_mode(mut self, word_mode: WordMode) -> Self {
        self.word_mode = word_mode;
        self
    }

    /// Validate tokens and build the query
    pub fn build(&self, tokens: &[Token]) -> Result<Query, PatternError> {
        if tokens.is_empty() {
            return Err(PatternError::Empty);
        }

        let last = tokens.len() - 1;
        let mut logic = Logic::And;
        let mut keywords = Vec::with_capacity(tokens.len());

        for (position, token) in tokens.iter().enumerate() {
            let kind = match token.kind {
                TokenKind::Operator => {
                    if position == 0 || position == last {
                        return Err(PatternError::OperatorAtBoundary {
                            operator: token.value.clone(),
                            position,
                        });
                    }
                    if token.is_or() {
                        logic = Logic::Or;
                    }
                    continue;
                }
                TokenKind::ExactPhrase => MatchKind::Exact,
                TokenKind::LiteralPhrase => MatchKind::Literal,
                TokenKind::Word => match self.word_mode {
                    WordMode::Whole => MatchKind::Word,
                    WordMode::Substring => MatchKind::Literal,
                },
            };
            keywords.push(Keyword::new(token.value.clone(), kind));
        }

        Query::new(keywords, logic)
    }

    /// Tokenize and build in one step
    pub fn parse(&self, raw: &str) -> Result<Query, PatternError> {
        self.build(&tokenize(raw))
    }
}

/// Build a query with the default word mode
#[cfg(test)]
pub fn build(tokens: &[Token]) -> Result<Query, PatternError> {
    QueryBuilder::new().build(tokens)
}

/// Tokenize and build a query with the default word mode
#[cfg(test)]
pub fn parse(raw: &str) -> Result<Query, PatternError> {
    QueryBuilder::new().parse(raw)
}
