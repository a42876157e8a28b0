//! Query module - the search pattern language
//!
//! Provides:
//! - tokenizer: raw string to typed tokens
//! - builder: tokens to a validated [`Query`]
//! - matcher: line evaluation against a query

pub mod builder;
pub mod matcher;
pub mod tokenizer;

pub use builder::{Query, QueryBuilder, WordMode};
pub use matcher::LineMatcher;
pub use tokenizer::tokenize;
