//! Explain backend - show how a search pattern is understood

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use crate::core::error::LogError;
use crate::core::model::{ResultItem, ResultSet};
use crate::core::render::{RenderConfig, Renderer};
use crate::query::matcher::matches;
use crate::query::{tokenize, QueryBuilder, WordMode};

/// Tokenize and build `pattern`, optionally evaluating sample lines
pub fn explain(pattern: &str, word_mode: WordMode, samples: &[String]) -> Result<ResultSet, LogError> {
    let tokens = tokenize(pattern);
    let query = QueryBuilder::new()
        .with_word_mode(word_mode)
        .build(&tokens)?;
    debug!(pattern, tokens = tokens.len(), "built query");

    let mut result_set = ResultSet::new();
    result_set.push(ResultItem::query(json!({
        "pattern": pattern,
        "tokens": tokens,
        "query": query,
    })));

    for sample in samples {
        let mut item = ResultItem::line("sample", sample.as_str());
        item.data = Some(json!({ "matches": matches(sample, &query) }));
        result_set.push(item);
    }
    Ok(result_set)
}

/// Run the query command
pub fn run_query(
    pattern: &str,
    word_mode: WordMode,
    samples: &[String],
    render: RenderConfig,
) -> Result<()> {
    let result_set = explain(pattern, word_mode, samples)?;
    Renderer::with_config(render).print(&result_set);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_shows_tokens_and_query() {
        let set = explain(r#""disk full" or timeout"#, WordMode::Whole, &[]).unwrap();
        assert_eq!(set.len(), 1);

        let data = set.items[0].data.as_ref().unwrap();
        assert_eq!(data["tokens"][0]["value"], "disk full");
        assert_eq!(data["tokens"][0]["kind"], "exact_phrase");
        assert_eq!(data["tokens"][1]["kind"], "operator");
        assert_eq!(data["query"]["logic"], "or");
        assert_eq!(data["query"]["keywords"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_explain_evaluates_samples() {
        let samples = vec!["ERROR timeout".to_string(), "ERROR timeouts".to_string()];
        let set = explain("timeout", WordMode::Whole, &samples).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.items[1].data.as_ref().unwrap()["matches"], true);
        assert_eq!(set.items[2].data.as_ref().unwrap()["matches"], false);

        let set = explain("timeout", WordMode::Substring, &samples).unwrap();
        assert_eq!(set.items[2].data.as_ref().unwrap()["matches"], true);
    }

    #[test]
    fn test_explain_rejects_bad_pattern() {
        let err = explain("or error", WordMode::Whole, &[]).unwrap_err();
        assert_eq!(err.code(), "PATTERN_OPERATOR_AT_BOUNDARY");
    }
}
